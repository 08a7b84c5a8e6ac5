use chiral_dns_domain::QuestionKey;

/// Encoded responses keyed by question.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &QuestionKey) -> Option<Vec<u8>>;

    /// `min_ttl` is the smallest TTL among the response's records, `None` when it has none.
    fn insert(&self, key: QuestionKey, response: Vec<u8>, min_ttl: Option<u32>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&self);
}
