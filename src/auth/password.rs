use crate::error::{ApiError, Result};

/// bcrypt cost used for new hashes; matches the hashes already stored in `users`.
pub const HASH_COST: u32 = 10;

/// Hashes off the async runtime; bcrypt is deliberately slow.
///
/// # Errors
/// Returns an error if hashing fails or the blocking task is cancelled.
pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
}

/// # Errors
/// Returns an error if the stored hash is malformed or the blocking task is cancelled.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Password check task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("Failed to verify password: {e}")))
}
