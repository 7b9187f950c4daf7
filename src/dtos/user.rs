//! User DTOs - Data Transfer Objects per utenti

use crate::entities::{User, UserId};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// struct per gestire io col client
#[derive(Serialize, Deserialize, Debug)]
pub struct UserDTO {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        // la password non viene mai esposta al client
        Self {
            id: value.user_id,
            email: value.email,
            display_name: value.display_name,
        }
    }
}

/// DTO per creare un nuovo utente (form di sign-up)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    #[validate(length(min = 8, max = 72, message = "Password must be between 8 and 72 characters"))]
    pub password: String,
    #[validate(
        length(min = 1, max = 50, message = "Display name must be between 1 and 50 characters"),
        custom(function = "not_blank")
    )]
    pub display_name: String,
}

// il nome viene salvato senza spazi ai bordi: solo spazi equivale a vuoto
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Display name cannot be blank".into()));
    }
    Ok(())
}

/// DTO per il login (solo email e password)
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginDTO {
    pub email: String,
    pub password: String,
}
