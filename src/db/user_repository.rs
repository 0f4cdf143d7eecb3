use crate::db::Database;
use crate::error::StoreError;
use crate::models::user::{Role, User};
use bincode::{Decode, Encode};
use tracing::info;

const USERS_TREE: &str = "users";

#[derive(Debug, Encode, Decode)]
struct StoredUser {
    id: String,
    username: String,
    password_hash: String,
    roles: Vec<Role>,
    created_at: i64, // epoch micros
}

impl From<&User> for StoredUser {
    fn from(user: &User) -> Self {
        StoredUser {
            id: user.id.clone(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            roles: user.roles.clone(),
            created_at: user.created_at.timestamp_micros(),
        }
    }
}

impl From<StoredUser> for User {
    fn from(stored: StoredUser) -> Self {
        User {
            id: stored.id,
            username: stored.username,
            password_hash: stored.password_hash,
            roles: stored.roles,
            created_at: chrono::DateTime::from_timestamp_micros(stored.created_at)
                .unwrap_or_else(chrono::Utc::now),
        }
    }
}

/// Credential store. Users are keyed by username, the uniqueness key and
/// token subject.
#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        UserRepository { db }
    }

    /// Inserts a new user. The compare-and-swap against an absent key is
    /// the actual uniqueness enforcement point; callers may pre-check with
    /// `find_by_username` as a fast path, but a concurrent duplicate still
    /// surfaces as `StoreError::AlreadyExists` here.
    pub async fn create(&self, user: User) -> Result<User, StoreError> {
        let tree = self.db.db.open_tree(USERS_TREE)?;

        let stored = StoredUser::from(&user);
        let encoded = bincode::encode_to_vec(&stored, bincode::config::standard())?;

        tree.compare_and_swap(
            user.username.as_bytes(),
            None as Option<&[u8]>,
            Some(encoded.as_slice()),
        )?
        .map_err(|_| StoreError::AlreadyExists)?;

        info!(user_id = %user.id, username = %user.username, "User created in database");

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tree = self.db.db.open_tree(USERS_TREE)?;

        match tree.get(username.as_bytes())? {
            Some(data) => {
                let (stored, _): (StoredUser, usize) =
                    bincode::decode_from_slice(&data, bincode::config::standard())?;
                Ok(Some(User::from(stored)))
            }
            None => Ok(None),
        }
    }
}
