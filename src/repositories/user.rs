//! UserRepository - Directory in memoria degli utenti registrati
//!
//! Sostituisce l'identity provider esterno: assegna un id stabile a ogni
//! account e risolve l'email usata al login.

use super::traits::{Create, Delete, Read};
use super::DirectoryError;
use crate::entities::{User, UserId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI32, Ordering};
use tracing::{info, instrument};

/// Dati per creare un utente (password già hashata)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
}

pub struct UserRepository {
    users: DashMap<UserId, User>,
    // email normalizzata -> id
    by_email: DashMap<String, UserId>,
    next_id: AtomicI32,
}

impl Default for UserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            by_email: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }

    fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let id = *self.by_email.get(&Self::normalize(email))?;
        self.users.get(&id).map(|u| u.value().clone())
    }
}

impl Create<User, NewUser> for UserRepository {
    #[instrument(skip(self, data))]
    async fn create(&self, data: NewUser) -> Result<User, DirectoryError> {
        let email = Self::normalize(&data.email);
        let display_name = data.display_name.trim();
        if display_name.is_empty() {
            return Err(DirectoryError::Validation(
                "display name cannot be blank".to_string(),
            ));
        }
        // la entry tiene il lock dello shard: due registrazioni concorrenti
        // con la stessa email non possono entrambe passare
        match self.by_email.entry(email.clone()) {
            Entry::Occupied(_) => Err(DirectoryError::Conflict(
                "email already registered".to_string(),
            )),
            Entry::Vacant(slot) => {
                let user_id = UserId(self.next_id.fetch_add(1, Ordering::Relaxed));
                let user = User {
                    user_id,
                    email,
                    display_name: display_name.to_string(),
                    password: data.password_hash,
                };
                self.users.insert(user_id, user.clone());
                slot.insert(user_id);
                info!(user_id = %user_id, "User registered");
                Ok(user)
            }
        }
    }
}

impl Read<User, UserId> for UserRepository {
    async fn read(&self, id: &UserId) -> Option<User> {
        self.users.get(id).map(|u| u.value().clone())
    }
}

impl Delete<UserId> for UserRepository {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn delete(&self, id: &UserId) -> Result<(), DirectoryError> {
        let (_, user) = self
            .users
            .remove(id)
            .ok_or(DirectoryError::NotFound("user"))?;
        self.by_email.remove(&user.email);
        info!("User removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            display_name: "Alice".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let repo = UserRepository::new();
        repo.create(new_user("alice@example.com")).await.unwrap();
        let err = repo.create(new_user(" Alice@Example.com ")).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn blank_display_name_is_rejected() {
        let repo = UserRepository::new();
        let err = repo
            .create(NewUser {
                display_name: "   ".to_string(),
                ..new_user("carol@example.com")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Validation(_)));
        assert!(repo.find_by_email("carol@example.com").is_none());
    }

    #[tokio::test]
    async fn lookup_by_email_is_case_insensitive() {
        let repo = UserRepository::new();
        let created = repo.create(new_user("bob@example.com")).await.unwrap();
        let found = repo.find_by_email("BOB@example.com").unwrap();
        assert_eq!(found.user_id, created.user_id);
    }

    #[tokio::test]
    async fn delete_frees_the_email() {
        let repo = UserRepository::new();
        let created = repo.create(new_user("carol@example.com")).await.unwrap();
        repo.delete(&created.user_id).await.unwrap();

        assert!(repo.read(&created.user_id).await.is_none());
        assert!(repo.find_by_email("carol@example.com").is_none());
        assert!(repo.create(new_user("carol@example.com")).await.is_ok());
        assert_eq!(
            repo.delete(&created.user_id).await.unwrap_err(),
            DirectoryError::NotFound("user")
        );
    }
}
