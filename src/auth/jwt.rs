use base64ct::{Base64, Encoding};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::config::JwtConfig;

/// JWT payload: a time-bounded assertion of a username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
    #[error("signature mismatch")]
    Signature,
}

/// Signing and verification keys, derived once from the base64-encoded
/// secret at startup.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        let secret = match Base64::decode_vec(&cfg.secret) {
            Ok(bytes) => bytes,
            Err(_) => {
                warn!("JWT_SECRET is not valid base64; using raw bytes");
                cfg.secret.as_bytes().to_vec()
            }
        };
        Self {
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
            ttl: Duration::days(cfg.ttl_days),
        }
    }

    pub fn issue(&self, subject: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: (now + self.ttl).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(subject, "jwt issued");
        Ok(token)
    }

    /// Returns the embedded subject. Expiry is checked before the signature,
    /// so an expired token is reported as expired even when its signature
    /// would not verify.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let mut unsigned = Validation::default();
        unsigned.insecure_disable_signature_validation();
        unsigned.validate_exp = false;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &unsigned)
            .map_err(|_| TokenError::Malformed)?;
        if data.claims.exp as i64 <= OffsetDateTime::now_utc().unix_timestamp() {
            return Err(TokenError::Expired);
        }

        let mut validation = Validation::default();
        validation.leeway = 0;
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => {
                debug!(subject = %data.claims.sub, "jwt verified");
                Ok(data.claims.sub)
            }
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                ErrorKind::InvalidSignature => Err(TokenError::Signature),
                _ => Err(TokenError::Malformed),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, ttl_days: i64) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: Base64::encode_string(secret.as_bytes()),
            ttl_days,
        })
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = make_keys("dev-secret", 2);
        let token = keys.issue("alice").expect("issue");
        let subject = keys.verify(&token).expect("verify");
        assert_eq!(subject, "alice");
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret", -1);
        let token = keys.issue("alice").expect("issue");
        assert!(matches!(keys.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let keys = make_keys("dev-secret", 2);
        assert!(matches!(
            keys.verify("not-a-jwt"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn wrong_secret_is_a_signature_error() {
        let keys = make_keys("dev-secret", 2);
        let other = make_keys("other-secret", 2);
        let token = keys.issue("alice").expect("issue");
        assert!(matches!(other.verify(&token), Err(TokenError::Signature)));
    }

    #[test]
    fn expiry_wins_over_bad_signature() {
        let keys = make_keys("dev-secret", -1);
        let other = make_keys("other-secret", 2);
        let token = keys.issue("alice").expect("issue");
        assert!(matches!(other.verify(&token), Err(TokenError::Expired)));
    }
}
