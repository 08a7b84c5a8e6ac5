use super::{Name, ZoneId};

/// Walks a resolved name's zone chain from its deepest resolved label toward
/// the root, one label per step.
///
/// Yields the owner name at each level together with that level's zone id.
/// The root itself (zone 0) is never yielded.
pub struct ZoneAncestors {
    current: Option<Name>,
}

impl ZoneAncestors {
    pub(super) fn new(start: Name) -> Self {
        Self {
            current: Some(start),
        }
    }
}

impl Iterator for ZoneAncestors {
    type Item = (Name, ZoneId);

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.current.take()?;
        if name.is_root() || name.resolved_count() == 0 {
            return None;
        }
        let zone = name.zone_id();
        self.current = name.parent();
        Some((name, zone))
    }
}
