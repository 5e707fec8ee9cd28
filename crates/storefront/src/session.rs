//! Anonymous session identifier.

use rand::Rng;
use tracing::debug;

use crate::storage::{KeyValueStore, StorageError, USER_ID_KEY};

/// Generate a random six-digit user ID.
#[must_use]
pub fn generate_user_id() -> u32 {
    rand::rng().random_range(100_000..1_000_000)
}

/// Write a fresh user ID under the `userId` key and return it.
///
/// The ID is regenerated on every start; nothing reads it back.
///
/// # Errors
///
/// Returns an error if the ID cannot be written.
pub fn start_session(storage: &dyn KeyValueStore) -> Result<u32, StorageError> {
    let user_id = generate_user_id();
    storage.set(USER_ID_KEY, &user_id.to_string())?;
    debug!(user_id, "Session started");
    Ok(user_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_user_id_has_six_digits() {
        for _ in 0..1000 {
            assert_eq!(generate_user_id().to_string().len(), 6);
        }
    }

    #[test]
    fn test_start_session_writes_user_id() {
        let storage = MemoryStore::new();
        let user_id = start_session(&storage).unwrap();
        assert_eq!(storage.get(USER_ID_KEY).unwrap(), Some(user_id.to_string()));
    }
}
