use crate::errors::WireError;
use compact_str::CompactString;
use std::fmt;
use std::hash::{Hash, Hasher};

pub const MAX_LABEL_LENGTH: usize = 63;

/// A single name component, 1 to 63 bytes, compared without regard to ASCII case.
#[derive(Debug, Clone)]
pub struct Label(CompactString);

impl Label {
    pub fn new(text: &str) -> Result<Self, WireError> {
        if text.is_empty() {
            return Err(WireError::InvalidFormat("empty label".to_string()));
        }
        if text.len() > MAX_LABEL_LENGTH {
            return Err(WireError::InvalidFormat(format!(
                "label of {} bytes exceeds {}",
                text.len(),
                MAX_LABEL_LENGTH
            )));
        }
        if text.contains('.') {
            return Err(WireError::InvalidFormat(format!(
                "label '{}' contains a dot",
                text
            )));
        }
        Ok(Self(CompactString::new(text)))
    }

    pub fn from_wire(bytes: &[u8]) -> Result<Self, WireError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| WireError::InvalidFormat("label is not valid UTF-8".to_string()))?;
        Self::new(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.0.len());
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl PartialEq<str> for Label {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
