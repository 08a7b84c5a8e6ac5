#![allow(dead_code)]

use chiral_dns_application::ports::ResponseCache;
use chiral_dns_domain::QuestionKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockResponseCache {
    entries: Arc<Mutex<HashMap<QuestionKey, (Vec<u8>, Option<u32>)>>>,
}

impl MockResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl_of(&self, key: &QuestionKey) -> Option<Option<u32>> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }
}

impl ResponseCache for MockResponseCache {
    fn get(&self, key: &QuestionKey) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(bytes, _)| bytes.clone())
    }

    fn insert(&self, key: QuestionKey, response: Vec<u8>, min_ttl: Option<u32>) {
        self.entries.lock().unwrap().insert(key, (response, min_ttl));
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}
