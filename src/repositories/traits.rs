//! Common repository traits
//!
//! This module defines generic interfaces for the in-memory directories.

use super::DirectoryError;

/// Trait for creating new entities in a directory
///
/// # Type Parameters
/// * `Entity` - Type of the returned entity (with ID assigned by the directory)
/// * `CreateData` - Data for creation (without ID, will be automatically generated)
pub trait Create<Entity, CreateData> {
    /// Creates a new entity
    ///
    /// # Returns
    /// * `Ok(Entity)` - Created entity with its new ID
    /// * `Err(DirectoryError)` - Validation or conflict error, nothing is stored
    async fn create(&self, data: CreateData) -> Result<Entity, DirectoryError>;
}

/// Trait for reading a single entity by primary key
///
/// # Type Parameters
/// * `Entity` - Type of the entity to read
/// * `Id` - Type of the primary key (e.g. `UserId`, `CarpoolId`)
pub trait Read<Entity, Id> {
    /// Reads an entity by its primary key
    ///
    /// # Returns
    /// * `Some(Entity)` - Entity found
    /// * `None` - No entity with that ID
    async fn read(&self, id: &Id) -> Option<Entity>;
}

/// Trait for deleting entities
///
/// # Type Parameters
/// * `Id` - Type of the primary key
pub trait Delete<Id> {
    /// Deletes an entity
    ///
    /// # Returns
    /// * `Ok(())` - Deletion successful
    /// * `Err(DirectoryError::NotFound)` - No entity with that ID
    async fn delete(&self, id: &Id) -> Result<(), DirectoryError>;
}
