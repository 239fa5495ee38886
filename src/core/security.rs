use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::core::config::Settings;
use crate::db::types::UserRole;
use crate::services::identity::{Identity, MAX_DISPLAY_NAME_CHARS, MAX_USER_ID_CHARS};

#[derive(Debug, Error)]
pub(crate) enum SecurityError {
    #[error("jwt encoding failed")]
    JwtEncoding,
    #[error("jwt decoding failed")]
    JwtDecoding,
    #[error("token subject is empty")]
    EmptySubject,
    #[error("token claim '{0}' is too long")]
    ClaimTooLong(&'static str),
    #[error("unsupported jwt algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Claims issued by the authentication service. The display name and role are
/// carried in the token so quiz operations never need a user lookup.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) name: String,
    pub(crate) role: UserRole,
    pub(crate) exp: i64,
}

impl Claims {
    pub(crate) fn into_identity(self) -> Result<Identity, SecurityError> {
        if self.sub.trim().is_empty() {
            return Err(SecurityError::EmptySubject);
        }
        if self.sub.chars().count() > MAX_USER_ID_CHARS {
            return Err(SecurityError::ClaimTooLong("sub"));
        }
        if self.name.chars().count() > MAX_DISPLAY_NAME_CHARS {
            return Err(SecurityError::ClaimTooLong("name"));
        }
        let display_name = if self.name.trim().is_empty() { self.sub.clone() } else { self.name };
        Ok(Identity { user_id: self.sub, display_name, role: self.role })
    }
}

pub(crate) fn create_access_token(
    identity: &Identity,
    settings: &Settings,
    expires_in: Option<Duration>,
) -> Result<String, SecurityError> {
    let algorithm = algorithm_from_settings(settings)?;
    let expire = OffsetDateTime::now_utc()
        + expires_in.unwrap_or_else(|| {
            Duration::minutes(settings.security().access_token_expire_minutes as i64)
        });

    let claims = Claims {
        sub: identity.user_id.clone(),
        name: identity.display_name.clone(),
        role: identity.role,
        exp: expire.unix_timestamp(),
    };

    encode(
        &jsonwebtoken::Header::new(algorithm),
        &claims,
        &EncodingKey::from_secret(settings.security().secret_key.as_bytes()),
    )
    .map_err(|_| SecurityError::JwtEncoding)
}

pub(crate) fn verify_token(token: &str, settings: &Settings) -> Result<Identity, SecurityError> {
    let algorithm = algorithm_from_settings(settings)?;
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;
    validation.required_spec_claims.insert("exp".to_string());
    validation.required_spec_claims.insert("sub".to_string());

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.security().secret_key.as_bytes()),
        &validation,
    )
    .map_err(|_| SecurityError::JwtDecoding)?
    .claims
    .into_identity()
}

fn algorithm_from_settings(settings: &Settings) -> Result<Algorithm, SecurityError> {
    match settings.security().algorithm.as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(SecurityError::UnsupportedAlgorithm(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn token_carries_identity() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        let settings = Settings::load().expect("settings");

        let identity = Identity::new("user-123", "Ada Lovelace", UserRole::Teacher);
        let token = create_access_token(&identity, &settings, Some(Duration::minutes(1)))
            .expect("token");
        let decoded = verify_token(&token, &settings).expect("identity");

        assert_eq!(decoded, identity);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        let settings = Settings::load().expect("settings");

        let identity = Identity::new("user-123", "Ada", UserRole::Student);
        let token = create_access_token(&identity, &settings, Some(Duration::minutes(-10)))
            .expect("token");

        assert!(matches!(verify_token(&token, &settings), Err(SecurityError::JwtDecoding)));
    }

    #[test]
    fn blank_name_falls_back_to_subject() {
        let claims =
            Claims { sub: "s-1".to_string(), name: " ".to_string(), role: UserRole::Student, exp: 0 };
        let identity = claims.into_identity().expect("identity");
        assert_eq!(identity.display_name, "s-1");
    }

    #[test]
    fn oversized_claims_are_rejected() {
        let claims = Claims {
            sub: "u".repeat(MAX_USER_ID_CHARS + 1),
            name: "Ada".to_string(),
            role: UserRole::Student,
            exp: 0,
        };
        assert!(matches!(claims.into_identity(), Err(SecurityError::ClaimTooLong("sub"))));

        let claims = Claims {
            sub: "s-1".to_string(),
            name: "é".repeat(MAX_DISPLAY_NAME_CHARS + 1),
            role: UserRole::Student,
            exp: 0,
        };
        assert!(matches!(claims.into_identity(), Err(SecurityError::ClaimTooLong("name"))));

        let claims = Claims {
            sub: "u".repeat(MAX_USER_ID_CHARS),
            name: "é".repeat(MAX_DISPLAY_NAME_CHARS),
            role: UserRole::Student,
            exp: 0,
        };
        assert!(claims.into_identity().is_ok());
    }
}
