//! Unique business-reference generation port.

/// Produces collision-resistant order/receipt numbers.
///
/// Implementations live in the infrastructure layer (the default one uses a
/// timestamp plus a random suffix); workflows only depend on this trait so
/// tests can substitute a deterministic source.
pub trait ReferenceSource {
    /// Returns the next reference for the given prefix (e.g. `"ORD"`, `"REC"`).
    fn next_reference(&self, prefix: &str) -> String;
}
