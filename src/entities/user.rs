//! User entity - Entità utente con metodi per gestione password

use super::ids::UserId;
use bcrypt::{DEFAULT_COST, hash, verify};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub password: String,
}

impl User {
    /// Verify if target_password matches the stored hashed password
    pub fn verify_password(&self, target_password: &str) -> bool {
        verify(target_password, &self.password).unwrap_or(false)
    }

    /// Hash a password using bcrypt with default cost
    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        let hash = hash(password, DEFAULT_COST)?;
        Ok(hash)
    }
}
