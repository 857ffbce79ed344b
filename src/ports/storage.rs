//! Storage port: Trait for persistent profile storage.
//!
//! This trait abstracts the storage backend (SQLite) from the application logic.

use crate::domain::{ProfileChanges, UserProfile};

/// Trait for profile storage operations.
pub trait ProfileStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert a new profile.
    ///
    /// # Errors
    /// Returns error if the ID already exists or the write fails.
    fn create(&self, profile: &UserProfile) -> Result<(), Self::Error>;

    /// Load a profile by ID.
    ///
    /// # Returns
    /// `None` if no profile has this ID.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn get(&self, id: &str) -> Result<Option<UserProfile>, Self::Error>;

    /// Apply validated changes to a stored profile and return the result.
    ///
    /// Read, modify and write happen atomically with respect to other
    /// callers of the same store.
    ///
    /// # Returns
    /// `None` if no profile has this ID.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn update(&self, id: &str, changes: &ProfileChanges) -> Result<Option<UserProfile>, Self::Error>;

    /// All profiles, oldest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn list(&self) -> Result<Vec<UserProfile>, Self::Error>;

    /// Number of stored profiles.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn count(&self) -> Result<usize, Self::Error>;
}
