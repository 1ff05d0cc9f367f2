use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use regex::Regex;
use std::sync::OnceLock;

use crate::middleware::auth::Claims;

pub const MIN_PASSWORD_LENGTH: usize = 8;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(concat!(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@",
            r"[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?",
            r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
        ))
        .expect("email pattern is valid")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn validate_credentials(email: &str, password: &str) -> Result<(), String> {
    if !is_valid_email(email) {
        return Err("Invalid email address".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn generate_token(
    email: &str,
    user_id: ObjectId,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();

    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(ttl_hours)).timestamp() as usize,
        user_id: user_id.to_hex(),
    };

    let header = Header::new(Algorithm::HS256);
    encode(&header, &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "iat", "sub"]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("traveller@example.com"));
        assert!(!is_valid_email("invalid-email"));
        assert!(!is_valid_email("a@"));
    }

    #[test]
    fn test_credentials_validation() {
        assert!(validate_credentials("traveller@example.com", "longenough").is_ok());
        assert!(validate_credentials("traveller@example.com", "short").is_err());
        assert!(validate_credentials("nope", "longenough").is_err());
    }

    #[test]
    fn test_token_round_trip() {
        let user_id = ObjectId::new();
        let token = generate_token("traveller@example.com", user_id, "secret", 24).unwrap();
        let claims = decode_token(&token, "secret").unwrap();

        assert_eq!(claims.sub, "traveller@example.com");
        assert_eq!(claims.user_id, user_id.to_hex());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_with_wrong_secret_rejected() {
        let token = generate_token("traveller@example.com", ObjectId::new(), "secret", 24).unwrap();
        assert!(decode_token(&token, "other").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = generate_token("traveller@example.com", ObjectId::new(), "secret", -2).unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }
}
