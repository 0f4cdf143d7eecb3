use crate::config::DEFAULT_JWT_SECRET;
use crate::error::TokenError;
use crate::models::user::Claims;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use std::env;

const TOKEN_TTL_HOURS: i64 = 24;

/// Hash a password using Argon2 with a per-hash random salt
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(password_hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

fn jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string())
}

/// Create a JWT for the given subject with the default 24h TTL
pub fn create_jwt(username: &str) -> Result<String, jsonwebtoken::errors::Error> {
    create_jwt_with_ttl(username, chrono::Duration::hours(TOKEN_TTL_HOURS))
}

/// Create a JWT with an explicit TTL
pub fn create_jwt_with_ttl(
    username: &str,
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: username.to_owned(),
        iat: now.timestamp() as usize,
        exp: (now + ttl).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_ref()),
    )
}

/// Decode and validate a JWT. Expiry is the only failure reported
/// distinctly; bad signatures and malformed tokens both collapse to
/// `TokenError::Invalid`.
pub fn decode_jwt(token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_ref()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    Ok(token_data.claims)
}

/// Boolean predicate: token verifies and its subject matches. Never
/// propagates an error.
pub fn is_token_valid(token: &str, expected_subject: &str) -> bool {
    match decode_jwt(token) {
        Ok(claims) => claims.sub == expected_subject,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ENV_LOCK;

    #[test]
    fn test_hash_password_returns_hash() {
        let password = "test_password_123";
        let result = hash_password(password);

        assert!(result.is_ok());
        let hash = result.unwrap();
        assert!(!hash.is_empty());
        assert_ne!(hash, password);
    }

    #[test]
    fn test_hash_password_different_each_time() {
        let password = "test_password_123";
        let hash1 = hash_password(password).unwrap();
        let hash2 = hash_password(password).unwrap();

        // Even with same password, hashes should differ due to salt
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let password = "correct_password";
        let hash = hash_password(password).unwrap();

        assert!(verify_password(password, &hash));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("correct_password").unwrap();

        assert!(!verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_verify_password_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_create_jwt_returns_token() {
        let _lock = ENV_LOCK.lock().unwrap();
        env::set_var("JWT_SECRET", "test-secret-key");

        let token = create_jwt("alice").unwrap();
        assert!(!token.is_empty());
        assert!(token.contains('.'));
    }

    #[test]
    fn test_decode_jwt_valid_token() {
        let _lock = ENV_LOCK.lock().unwrap();
        env::set_var("JWT_SECRET", "test-secret-key");

        let token = create_jwt("alice").unwrap();
        let claims = decode_jwt(&token).unwrap();

        assert_eq!(claims.sub, "alice");
    }

    #[test]
    fn test_decode_jwt_malformed_token() {
        let _lock = ENV_LOCK.lock().unwrap();
        env::set_var("JWT_SECRET", "test-secret-key");

        let result = decode_jwt("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Invalid)));
    }

    #[test]
    fn test_decode_jwt_wrong_secret() {
        let _lock = ENV_LOCK.lock().unwrap();
        env::set_var("JWT_SECRET", "secret1");
        let token = create_jwt("alice").unwrap();

        env::set_var("JWT_SECRET", "secret2");
        let result = decode_jwt(&token);

        assert!(matches!(result, Err(TokenError::Invalid)));
    }

    #[test]
    fn test_decode_jwt_expired_token() {
        let _lock = ENV_LOCK.lock().unwrap();
        env::set_var("JWT_SECRET", "test-secret-key");

        let token = create_jwt_with_ttl("alice", chrono::Duration::seconds(-5)).unwrap();
        let result = decode_jwt(&token);

        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_jwt_expiration_is_future() {
        let _lock = ENV_LOCK.lock().unwrap();
        env::set_var("JWT_SECRET", "test-secret-key");

        let token = create_jwt("alice").unwrap();
        let claims = decode_jwt(&token).unwrap();

        let now = chrono::Utc::now().timestamp() as usize;
        assert!(claims.exp > now);
        assert!(claims.iat <= now);
    }

    #[test]
    fn test_is_token_valid_subject_match() {
        let _lock = ENV_LOCK.lock().unwrap();
        env::set_var("JWT_SECRET", "test-secret-key");

        let token = create_jwt("alice").unwrap();
        assert!(is_token_valid(&token, "alice"));
        assert!(!is_token_valid(&token, "bob"));
    }

    #[test]
    fn test_is_token_valid_never_errors() {
        let _lock = ENV_LOCK.lock().unwrap();
        env::set_var("JWT_SECRET", "test-secret-key");

        assert!(!is_token_valid("garbage", "alice"));
        let expired = create_jwt_with_ttl("alice", chrono::Duration::seconds(-5)).unwrap();
        assert!(!is_token_valid(&expired, "alice"));
    }
}
