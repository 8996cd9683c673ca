//! Test helpers for generating unique test data
//!
//! ULID-suffixed ids keep tests that share a store from colliding.

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("room");
/// let id2 = unique_str("room");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("room-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// `n` distinct user ids sharing one unique stem, in seating order.
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_users;
///
/// let users = unique_users("p", 5);
/// assert_eq!(users.len(), 5);
/// assert!(users[0].ends_with("-0"));
/// ```
pub fn unique_users(prefix: &str, n: usize) -> Vec<String> {
    let stem = unique_str(prefix);
    (0..n).map(|i| format!("{stem}-{i}")).collect()
}
