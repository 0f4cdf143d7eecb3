use crate::db::user_repository::UserRepository;
use crate::error::{AuthError, StoreError};
use crate::models::user::{Role, User};
use crate::utils::auth::{create_jwt, hash_password, verify_password};
use tracing::{info, warn};

/// Registration and login orchestration. Token issuance happens in exactly
/// one place: `login`. `register` persists the user and then logs in with
/// the same raw credentials.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
}

impl AuthService {
    pub fn new(users: UserRepository) -> Self {
        AuthService { users }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<String, AuthError> {
        validate_credentials(username, password)?;

        // Fast-path pre-check; the store's compare-and-swap insert is the
        // real uniqueness enforcement against concurrent registration.
        if self.users.find_by_username(username).await?.is_some() {
            warn!(username = %username, "Registration failed: username taken");
            return Err(AuthError::UsernameAlreadyExists(username.to_string()));
        }

        let password_hash = hash_password(password).map_err(|_| AuthError::Hash)?;

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash,
            roles: vec![Role::User],
            created_at: chrono::Utc::now(),
        };

        match self.users.create(user).await {
            Ok(_) => {}
            Err(StoreError::AlreadyExists) => {
                warn!(username = %username, "Registration failed: lost race for username");
                return Err(AuthError::UsernameAlreadyExists(username.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        info!(username = %username, "User registered");

        self.login(username, password).await
    }

    /// Unknown username and wrong password collapse to the same error so
    /// responses cannot be used to enumerate accounts.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        validate_credentials(username, password)?;

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            warn!(username = %username, "Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let token = create_jwt(&user.username).map_err(AuthError::Token)?;

        info!(username = %username, "User logged in");

        Ok(token)
    }

    /// Creates the env-configured admin account at startup if it does not
    /// exist yet. The admin-gated documentation routes are unreachable
    /// without it.
    pub async fn seed_admin(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if let Some(existing) = self.users.find_by_username(username).await? {
            if !existing.has_role(Role::Admin) {
                warn!(username = %username, "Configured admin username exists without the ADMIN role");
            }
            return Ok(());
        }

        let password_hash = hash_password(password).map_err(|_| AuthError::Hash)?;
        let admin = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash,
            roles: vec![Role::User, Role::Admin],
            created_at: chrono::Utc::now(),
        };

        match self.users.create(admin).await {
            Ok(_) => {
                info!(username = %username, "Seeded admin user");
                Ok(())
            }
            Err(StoreError::AlreadyExists) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<(), AuthError> {
    if username.trim().is_empty() {
        return Err(AuthError::Validation("Username is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }
    Ok(())
}
