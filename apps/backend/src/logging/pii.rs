use std::fmt;

/// Hex digits kept from the digest; enough to correlate one user across lines.
const PSEUDONYM_LEN: usize = 12;

/// Stable pseudonym for a user-supplied identifier.
///
/// The same input always maps to the same output, so a player can be
/// followed through the logs without the raw id ever being written.
pub fn pseudonym(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let digest = blake3::hash(input.as_bytes()).to_hex();
    format!("u_{}", &digest.as_str()[..PSEUDONYM_LEN])
}

/// A wrapper that pseudonymises the wrapped id whenever it is formatted.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&pseudonym(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&pseudonym(self.0))
    }
}
