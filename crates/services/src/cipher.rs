//! # Mock message cipher
//!
//! A reversible obfuscation applied to messages addressed to users who have
//! published a public key. It XORs the text with a SHA-256 keystream derived
//! from that key. This is NOT cryptography: anyone holding the public key can
//! reverse it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

const PREFIX: &str = "qult-mock:";

fn apply(data: &[u8], public_key: &str) -> Vec<u8> {
    let keystream = Sha256::digest(public_key.as_bytes());
    data.iter()
        .zip(keystream.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

pub fn seal(plaintext: &str, public_key: &str) -> String {
    format!("{PREFIX}{}", STANDARD.encode(apply(plaintext.as_bytes(), public_key)))
}

/// Returns `None` if `sealed` was not produced by [`seal`] with this key.
pub fn open(sealed: &str, public_key: &str) -> Option<String> {
    let encoded = sealed.strip_prefix(PREFIX)?;
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(apply(&bytes, public_key)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_text_is_not_plaintext_and_reverses() {
        let sealed = seal("meet me at the board", "pk-alice");
        assert!(sealed.starts_with(PREFIX));
        assert!(!sealed.contains("meet"));
        assert_eq!(open(&sealed, "pk-alice").as_deref(), Some("meet me at the board"));
    }

    #[test]
    fn unsealed_input_is_rejected() {
        assert_eq!(open("hello", "pk"), None);
        assert_eq!(open("qult-mock:***", "pk"), None);
    }
}
