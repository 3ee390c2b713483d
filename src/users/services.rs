use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::password::{hash_secret, verify_secret};
use crate::error::ApiError;
use crate::users::dto::{LoginRequest, RegisterRequest};
use crate::users::repo::User;

const MAX_FIELD_LEN: usize = 50;

const REGISTER_FIELDS_MSG: &str =
    "Username, Password and Email are all necessary fields for registration.";
const LOGIN_FIELDS_MSG: &str = "Username and Password are necessary fields for login.";

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.trim().is_empty())
}

fn check_len(value: &str, field: &'static str) -> Result<(), ApiError> {
    if value.len() > MAX_FIELD_LEN {
        return Err(ApiError::FieldLengthExceeded(field));
    }
    Ok(())
}

fn validate_registration(req: &RegisterRequest) -> Result<(&str, &str, &str), ApiError> {
    let (username, password, email) = match (
        present(&req.username),
        present(&req.password),
        present(&req.email),
    ) {
        (Some(u), Some(p), Some(e)) => (u, p, e),
        _ => return Err(ApiError::UncompletedFields(REGISTER_FIELDS_MSG)),
    };
    check_len(username, "Username")?;
    check_len(password, "Password")?;
    check_len(email, "Email")?;
    Ok((username, password, email))
}

pub async fn register(db: &PgPool, req: &RegisterRequest) -> Result<User, ApiError> {
    let (username, password, email) = validate_registration(req)?;

    if User::find_by_username(db, username).await?.is_some() {
        warn!(username, "registration with taken username");
        return Err(ApiError::UsernameTaken);
    }
    if User::find_by_email(db, email).await?.is_some() {
        warn!(email, "registration with taken email");
        return Err(ApiError::EmailTaken);
    }

    let hash = hash_secret(password)?;
    let user = User::create(db, username, email, &hash).await?;
    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

pub async fn login(db: &PgPool, req: &LoginRequest) -> Result<User, ApiError> {
    let (username, password) = match (present(&req.username), present(&req.password)) {
        (Some(u), Some(p)) => (u, p),
        _ => return Err(ApiError::UncompletedFields(LOGIN_FIELDS_MSG)),
    };

    let user = User::find_by_username(db, username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_secret(password, &user.password_hash) {
        warn!(username, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(username: Option<&str>, password: Option<&str>, email: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            username: username.map(String::from),
            password: password.map(String::from),
            email: email.map(String::from),
        }
    }

    #[test]
    fn registration_requires_all_fields() {
        for bad in [
            req(None, Some("pw"), Some("a@x.com")),
            req(Some("alice"), None, Some("a@x.com")),
            req(Some("alice"), Some("pw"), None),
            req(Some("   "), Some("pw"), Some("a@x.com")),
            req(Some("alice"), Some(""), Some("a@x.com")),
        ] {
            let err = validate_registration(&bad).unwrap_err();
            assert_eq!(err.to_string(), REGISTER_FIELDS_MSG);
        }
    }

    #[test]
    fn registration_caps_field_lengths() {
        let long = "x".repeat(51);
        let err = validate_registration(&req(Some(&long), Some("pw"), Some("a@x.com"))).unwrap_err();
        assert_eq!(err.to_string(), "Username must not exceed 50 characters.");

        let err = validate_registration(&req(Some("alice"), Some(&long), Some("a@x.com")))
            .unwrap_err();
        assert_eq!(err.to_string(), "Password must not exceed 50 characters.");

        let err =
            validate_registration(&req(Some("alice"), Some("pw"), Some(&long))).unwrap_err();
        assert_eq!(err.to_string(), "Email must not exceed 50 characters.");
    }

    #[test]
    fn registration_accepts_max_length_fields() {
        let max = "x".repeat(50);
        let request = req(Some(&max), Some(&max), Some(&max));
        let ok = validate_registration(&request);
        assert!(ok.is_ok());
    }
}
