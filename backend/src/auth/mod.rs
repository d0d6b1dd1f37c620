//! Credential hashing and bearer tokens

pub mod password;
pub mod token;

pub use password::{hash_password, legacy_digest, needs_rehash, verify_password};
pub use token::{Claims, TokenIssuer};
