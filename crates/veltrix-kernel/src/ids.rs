//! Entry identifiers and creation timestamps.

use veltrix_types::EntryId;

/// Generate a fresh, collision-resistant entry id (`e_` + UUID v4, no hyphens).
pub fn new_id() -> EntryId {
    EntryId::new(format!("e_{}", uuid::Uuid::new_v4().simple()))
}

/// Current wall-clock time in milliseconds, used as a `createdAt` sort key.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = (0..1000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn id_shape() {
        let id = new_id();
        assert!(id.as_str().starts_with("e_"));
        assert_eq!(id.as_str().len(), 34);
        assert!(!id.as_str().contains('-'));
    }

    #[test]
    fn clock_is_after_2020() {
        assert!(now_millis() > 1_577_836_800_000);
    }
}
