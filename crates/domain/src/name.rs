//! Domain names in their three shapes: plain, resolved against the zone
//! store, and compressed for transmission.
//!
//! Labels are kept most-specific first (`www`, `example`, `com`). Zone nodes of
//! a resolved name are kept root-ward first, so `zones()[0]` belongs to the
//! last label. Equality and hashing look at the labels only, ignoring ASCII
//! case and the variant.
mod ancestors;
mod label;

pub use ancestors::ZoneAncestors;
pub use label::{Label, MAX_LABEL_LENGTH};

use crate::errors::WireError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_LABELS: usize = 127;

/// Identifier of a zone node in the store. Real nodes are positive.
pub type ZoneId = i64;

pub const ROOT_ZONE: ZoneId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneNode {
    pub id: ZoneId,
    pub wildcard: bool,
}

impl ZoneNode {
    pub fn new(id: ZoneId, wildcard: bool) -> Self {
        Self { id, wildcard }
    }
}

#[derive(Debug, Clone)]
enum NameKind {
    Plain,
    Resolved(Arc<[ZoneNode]>),
    Compressed { pointer: u16, suffix_labels: usize },
}

#[derive(Debug, Clone)]
pub struct Name {
    labels: Arc<[Label]>,
    kind: NameKind,
}

impl Name {
    pub fn root() -> Self {
        Self {
            labels: Arc::from(Vec::new()),
            kind: NameKind::Plain,
        }
    }

    pub fn from_labels(labels: Vec<Label>) -> Result<Self, WireError> {
        if labels.len() > MAX_LABELS {
            return Err(WireError::InvalidFormat(format!(
                "{} labels exceeds the limit of {}",
                labels.len(),
                MAX_LABELS
            )));
        }
        let encoded = labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1;
        if encoded > MAX_NAME_LENGTH {
            return Err(WireError::InvalidFormat(format!(
                "name of {} bytes exceeds {}",
                encoded, MAX_NAME_LENGTH
            )));
        }
        Ok(Self {
            labels: labels.into(),
            kind: NameKind::Plain,
        })
    }

    /// Parses a dotted name. A single trailing dot is optional and `"."` is the root.
    pub fn parse(text: &str) -> Result<Self, WireError> {
        if text == "." {
            return Ok(Self::root());
        }
        let trimmed = text.strip_suffix('.').unwrap_or(text);
        if trimmed.is_empty() {
            return Err(WireError::InvalidFormat("empty name".to_string()));
        }
        let labels = trimmed
            .split('.')
            .map(Label::new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_labels(labels)
    }

    /// Reads a name starting at `start`, following compression pointers.
    ///
    /// Returns the name and the offset just past its encoding at `start`.
    /// Pointers must jump strictly backward.
    pub fn read(buf: &[u8], start: usize) -> Result<(Self, usize), WireError> {
        const MAX_POINTER_HOPS: usize = 64;

        let mut labels = Vec::new();
        let mut pos = start;
        let mut resume_at = None;
        let mut hops = 0;
        let mut encoded = 1usize;

        loop {
            let len_byte = *buf.get(pos).ok_or_else(|| {
                WireError::OutOfRange(format!("name at offset {} runs past end of packet", start))
            })?;
            match len_byte & 0xC0 {
                0x00 => {
                    let len = len_byte as usize;
                    if len == 0 {
                        pos += 1;
                        break;
                    }
                    let bytes = buf.get(pos + 1..pos + 1 + len).ok_or_else(|| {
                        WireError::OutOfRange(format!("label at offset {} is truncated", pos))
                    })?;
                    if labels.len() == MAX_LABELS {
                        return Err(WireError::OutOfRange(format!(
                            "name at offset {} has more than {} labels",
                            start, MAX_LABELS
                        )));
                    }
                    encoded += len + 1;
                    if encoded > MAX_NAME_LENGTH {
                        return Err(WireError::InvalidFormat(format!(
                            "name at offset {} exceeds {} bytes",
                            start, MAX_NAME_LENGTH
                        )));
                    }
                    labels.push(Label::from_wire(bytes)?);
                    pos += 1 + len;
                }
                0xC0 => {
                    let low = *buf.get(pos + 1).ok_or_else(|| {
                        WireError::OutOfRange(format!("pointer at offset {} is truncated", pos))
                    })?;
                    let target = (((len_byte & 0x3F) as usize) << 8) | low as usize;
                    if target >= pos {
                        return Err(WireError::OutOfRange(format!(
                            "pointer at offset {} does not point backward",
                            pos
                        )));
                    }
                    hops += 1;
                    if hops > MAX_POINTER_HOPS {
                        return Err(WireError::OutOfRange(
                            "too many compression pointers".to_string(),
                        ));
                    }
                    if resume_at.is_none() {
                        resume_at = Some(pos + 2);
                    }
                    pos = target;
                }
                _ => {
                    return Err(WireError::InvalidFormat(format!(
                        "unsupported label type {:#04x} at offset {}",
                        len_byte, pos
                    )));
                }
            }
        }

        let name = Self {
            labels: labels.into(),
            kind: NameKind::Plain,
        };
        Ok((name, resume_at.unwrap_or(pos)))
    }

    /// Writes the name, ending with a pointer when compressed and a zero label otherwise.
    pub fn write(&self, out: &mut Vec<u8>) {
        for label in &self.labels[..self.literal_count()] {
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
        match self.compression_pointer() {
            Some(pointer) => out.extend_from_slice(&(0xC000 | pointer).to_be_bytes()),
            None => out.push(0),
        }
    }

    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write(&mut out);
        out
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn label(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub(crate) fn shared_labels(&self) -> &Arc<[Label]> {
        &self.labels
    }

    /// Bytes this name occupies on the wire, accounting for compression.
    pub fn encoded_len(&self) -> usize {
        let literal: usize = self.labels[..self.literal_count()]
            .iter()
            .map(|l| l.len() + 1)
            .sum();
        if self.is_compressed() {
            literal + 2
        } else {
            literal + 1
        }
    }

    /// Bytes this name would occupy without compression.
    pub fn uncompressed_len(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    fn literal_count(&self) -> usize {
        match self.kind {
            NameKind::Compressed { suffix_labels, .. } => self.labels.len() - suffix_labels,
            _ => self.labels.len(),
        }
    }

    // ── resolved names ──────────────────────────────────────────────────────

    /// Attaches zone nodes to the root-ward labels of this name.
    ///
    /// Node ids must be positive and distinct, and there cannot be more nodes
    /// than labels.
    pub fn resolved(&self, zones: Vec<ZoneNode>) -> Result<Self, WireError> {
        if zones.len() > self.labels.len() {
            return Err(WireError::OutOfRange(format!(
                "{} zone nodes for a name of {} labels",
                zones.len(),
                self.labels.len()
            )));
        }
        for (i, node) in zones.iter().enumerate() {
            if node.id <= ROOT_ZONE || zones[..i].iter().any(|n| n.id == node.id) {
                return Err(WireError::OutOfRange(format!(
                    "invalid zone node id {} in resolved name",
                    node.id
                )));
            }
        }
        Ok(Self {
            labels: Arc::clone(&self.labels),
            kind: NameKind::Resolved(zones.into()),
        })
    }

    pub fn zones(&self) -> &[ZoneNode] {
        match &self.kind {
            NameKind::Resolved(zones) => zones,
            _ => &[],
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.kind, NameKind::Resolved(_))
    }

    pub fn resolved_count(&self) -> usize {
        self.zones().len()
    }

    /// True when every label has a zone node. The resolved root qualifies.
    pub fn is_fully_resolved(&self) -> bool {
        self.is_resolved() && self.resolved_count() == self.labels.len()
    }

    /// Zone id of the most specific resolved label, or the root zone.
    pub fn zone_id(&self) -> ZoneId {
        self.zones().last().map_or(ROOT_ZONE, |n| n.id)
    }

    /// True when the most specific resolved label is a wildcard zone.
    pub fn is_star(&self) -> bool {
        self.zones().last().is_some_and(|n| n.wildcard)
    }

    /// The name cut down to its resolved labels.
    pub fn fully_resolved_prefix(&self) -> Self {
        let keep = self.resolved_count();
        let drop = self.labels.len() - keep;
        Self {
            labels: self.labels[drop..].to_vec().into(),
            kind: NameKind::Resolved(self.zones().to_vec().into()),
        }
    }

    /// Drops the most specific label. Zone nodes are kept for the remaining labels.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let labels: Arc<[Label]> = self.labels[1..].to_vec().into();
        let kind = match &self.kind {
            NameKind::Resolved(zones) => {
                let keep = zones.len().min(labels.len());
                NameKind::Resolved(zones[..keep].to_vec().into())
            }
            _ => NameKind::Plain,
        };
        Some(Self { labels, kind })
    }

    /// Zone chain from the fully-resolved prefix toward the root.
    pub fn zone_ancestors(&self) -> ZoneAncestors {
        ZoneAncestors::new(self.fully_resolved_prefix())
    }

    pub fn to_plain(&self) -> Self {
        Self {
            labels: Arc::clone(&self.labels),
            kind: NameKind::Plain,
        }
    }

    // ── compressed names ────────────────────────────────────────────────────

    pub(crate) fn compressed(&self, pointer: u16, suffix_labels: usize) -> Self {
        Self {
            labels: Arc::clone(&self.labels),
            kind: NameKind::Compressed {
                pointer,
                suffix_labels,
            },
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self.kind, NameKind::Compressed { .. })
    }

    pub fn compression_pointer(&self) -> Option<u16> {
        match self.kind {
            NameKind::Compressed { pointer, .. } => Some(pointer),
            _ => None,
        }
    }

    /// Number of trailing labels replaced by the pointer.
    pub fn compressed_labels(&self) -> usize {
        match self.kind {
            NameKind::Compressed { suffix_labels, .. } => suffix_labels,
            _ => 0,
        }
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.labels[..] == other.labels[..]
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.labels[..].hash(state);
    }
}

impl FromStr for Name {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for label in self.labels.iter() {
            write!(f, "{}.", label)?;
        }
        Ok(())
    }
}
