//! Kernel utilities shared across slices.
//! Keep this crate lightweight; it re-exports ergonomic helpers for IDs,
//! config loading, and input validation.
//!
//! ## ID generation
//! Use [`safe_token`] for URL-safe, unambiguous random name parts:
//! ```rust
//! let token = odk_kernel::safe_token(8);
//! assert_eq!(token.len(), 8);
//! ```
//!
//! ## Config loading
//! ```rust,ignore
//! use odk_kernel::config::load_config;
//! let cfg: serde_json::Value = load_config::<serde_json::Value>(Some("orderdesk")).unwrap();
//! ```

pub mod config;
pub mod validate;

pub use nanoid::nanoid;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Generates an unambiguous random token (no visually confusing
/// characters), suitable for object key suffixes.
#[must_use]
pub fn safe_token(len: usize) -> String {
    nanoid!(len, SAFE_ALPHABET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_have_the_requested_length() {
        assert_eq!(safe_token(8).len(), 8);
        assert_eq!(safe_token(21).len(), 21);
    }

    #[test]
    fn tokens_use_the_safe_alphabet() {
        let token = safe_token(64);
        assert!(token.chars().all(|c| SAFE_ALPHABET.contains(&c)));
    }
}
