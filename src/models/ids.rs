//! Identifier generation shared by every node type.

use ulid::Ulid;

/// Generates a new ULID string.
///
/// Node identifiers are generated client-side and stored as the `id`
/// property, so they never depend on the store's internal node ids.
pub fn generate_ulid() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ulids_are_unique_and_parseable() {
        let a = generate_ulid();
        let b = generate_ulid();
        assert_ne!(a, b);
        assert_eq!(a.len(), 26);
        assert!(Ulid::from_string(&a).is_ok());
    }
}
