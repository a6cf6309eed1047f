//! Business-reference generation.

use botica_core::ReferenceSource;
use chrono::Utc;
use uuid::Uuid;

/// Clock-based reference source: UTC timestamp plus a random suffix,
/// e.g. `ORD-20250101143022-8f3a1c`.
///
/// The suffix comes from the random tail of a UUIDv7, so references stay
/// unique within the same second.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockReferenceSource;

impl ClockReferenceSource {
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceSource for ClockReferenceSource {
    fn next_reference(&self, prefix: &str) -> String {
        let timestamp = Utc::now().format("%Y%m%d%H%M%S");
        let uuid = Uuid::now_v7().simple().to_string();
        format!("{prefix}-{timestamp}-{}", &uuid[uuid.len() - 6..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn references_carry_the_prefix() {
        let source = ClockReferenceSource::new();
        assert!(source.next_reference("ORD").starts_with("ORD-"));
        assert!(source.next_reference("REC").starts_with("REC-"));
    }

    #[test]
    fn references_are_distinct_in_a_tight_loop() {
        let source = ClockReferenceSource::new();
        let generated: HashSet<String> =
            (0..100).map(|_| source.next_reference("ORD")).collect();
        assert_eq!(generated.len(), 100);
    }
}
