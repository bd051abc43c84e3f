use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
}

impl User {
    /// True when the stored value was written by the plaintext-era store.
    pub fn has_legacy_password(&self) -> bool {
        !is_bcrypt_hash(&self.password_hash)
    }
}

// "$2b$12$" followed by 53 characters of salt and digest.
fn is_bcrypt_hash(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 60
        && matches!(&bytes[..4], b"$2a$" | b"$2b$" | b"$2y$")
        && bytes[4].is_ascii_digit()
        && bytes[5].is_ascii_digit()
        && bytes[6] == b'$'
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success(String),
    UserNotFound,
    WrongPassword,
}
