//! Identity: password hashing and bearer tokens

pub mod password;
pub mod token;

pub use token::{Claims, TokenSigner};
