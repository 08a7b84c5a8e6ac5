use crate::errors::WireError;
use crate::name::{Label, Name};
use rustc_hash::FxHashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub const HEADER_LENGTH: usize = 12;

/// Largest offset a 14-bit compression pointer can address.
pub const MAX_POINTER_OFFSET: usize = 0x3FFF;

/// A suffix of a name's labels, used as a key in the compression table.
#[derive(Debug, Clone)]
pub struct CompressionEntry {
    labels: Arc<[Label]>,
    start: usize,
}

impl CompressionEntry {
    pub fn new(name: &Name) -> Self {
        Self {
            labels: Arc::clone(name.shared_labels()),
            start: 0,
        }
    }

    /// Drops the most specific label.
    pub fn chop(&self) -> Self {
        Self {
            labels: Arc::clone(&self.labels),
            start: (self.start + 1).min(self.labels.len()),
        }
    }

    pub fn count(&self) -> usize {
        self.labels.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn top_label_len(&self) -> Option<usize> {
        self.labels.get(self.start).map(Label::len)
    }

    fn suffix(&self) -> &[Label] {
        &self.labels[self.start..]
    }
}

impl PartialEq for CompressionEntry {
    fn eq(&self, other: &Self) -> bool {
        self.suffix() == other.suffix()
    }
}

impl Eq for CompressionEntry {}

impl Hash for CompressionEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.suffix().hash(state);
    }
}

/// Compression table for one outbound message.
///
/// Maps each label suffix to the first offset it was written at. Entries are
/// never replaced or removed.
#[derive(Debug, Default)]
pub struct Compressor {
    table: FxHashMap<CompressionEntry, u16>,
}

impl Compressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Offset recorded for the whole of `name`, if any.
    pub fn offset_of(&self, name: &Name) -> Option<u16> {
        self.table.get(&CompressionEntry::new(name)).copied()
    }

    /// Returns `name` as it should be written at `offset`.
    ///
    /// The longest suffix already in the table becomes a pointer. Every suffix
    /// in front of it is recorded at the offset it will occupy.
    pub fn compress(&mut self, name: &Name, offset: usize) -> Result<Name, WireError> {
        if !(HEADER_LENGTH..=MAX_POINTER_OFFSET).contains(&offset) {
            return Err(WireError::OutOfRange(format!(
                "compression offset {} outside {}..={}",
                offset, HEADER_LENGTH, MAX_POINTER_OFFSET
            )));
        }
        if name.is_root() {
            return Ok(name.clone());
        }

        let mut entry = CompressionEntry::new(name);
        let mut cursor = offset;
        while let Some(top) = entry.top_label_len() {
            if let Some(&pointer) = self.table.get(&entry) {
                return Ok(name.compressed(pointer, entry.count()));
            }
            if cursor <= MAX_POINTER_OFFSET {
                self.table.insert(entry.clone(), cursor as u16);
            }
            cursor += top + 1;
            entry = entry.chop();
        }
        Ok(name.clone())
    }
}
