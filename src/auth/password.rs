//! Password hashing
//!
//! bcrypt with the default cost. Hashing and verification are CPU
//! bound, so both run on the blocking pool.

use crate::error::{ServerError, ServerResult};

const BCRYPT_COST: u32 = 10;

/// Hash a plaintext password
pub async fn hash(password: &str) -> ServerResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| ServerError::Internal(format!("hash task: {}", e)))?
        .map_err(ServerError::from)
}

/// Verify a plaintext password against a stored hash.
///
/// A malformed stored hash verifies as false rather than erroring, so
/// a corrupted record cannot be distinguished from a wrong password by
/// the caller.
pub async fn verify(password: &str, hashed: &str) -> ServerResult<bool> {
    let password = password.to_string();
    let hashed = hashed.to_string();
    let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed))
        .await
        .map_err(|e| ServerError::Internal(format!("verify task: {}", e)))?
        .unwrap_or(false);
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify_round_trip() {
        let hashed = hash("s3cret!").await.unwrap();
        assert_ne!(hashed, "s3cret!");
        assert!(hashed.starts_with("$2"));

        assert!(verify("s3cret!", &hashed).await.unwrap());
        assert!(!verify("wrong", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let a = hash("same").await.unwrap();
        let b = hash("same").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_verify_malformed_hash_is_false() {
        assert!(!verify("anything", "not-a-bcrypt-hash").await.unwrap());
    }
}
