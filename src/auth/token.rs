use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

use super::AuthError;

/// Claims carried by user bearer tokens
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    artist_id: Option<Value>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    tipo_usuario: Option<String>,
}

/// Subject data extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: i64,
    pub artist_id: Option<i64>,
    pub email: Option<String>,
    pub user_type: Option<String>,
}

/// Verifies HMAC-signed bearer tokens against the configured secret
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // no clock skew; `exp` is checked only when the token carries it
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Checks signature and expiry, then extracts the subject claims
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(classify)?;
        let claims = data.claims;

        let user_id = match claims.user_id.as_ref() {
            None | Some(Value::Null) => {
                tracing::warn!("Token without userId claim");
                return Err(AuthError::InvalidToken("token has no userId".to_string()));
            }
            Some(raw) => claim_as_id(raw).ok_or_else(|| {
                AuthError::InvalidToken("userId claim is not numeric".to_string())
            })?,
        };

        let artist_id = match claims.artist_id.as_ref() {
            None | Some(Value::Null) => None,
            Some(raw) => Some(claim_as_id(raw).ok_or_else(|| {
                AuthError::InvalidToken("artistId claim is not numeric".to_string())
            })?),
        };

        tracing::debug!(
            user_id,
            artist_id = ?artist_id,
            user_type = ?claims.tipo_usuario,
            "Bearer token verified"
        );

        Ok(VerifiedToken {
            user_id,
            artist_id,
            email: claims.email,
            user_type: claims.tipo_usuario,
        })
    }
}

/// Accepts numeric ids and numeric strings
fn claim_as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    let auth_error = match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AuthError::MalformedToken,
        ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => AuthError::UnsupportedToken,
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::InvalidToken(format!("missing required claim '{}'", claim))
        }
        ErrorKind::ImmatureSignature
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject => AuthError::InvalidToken(err.to_string()),
        _ => {
            tracing::error!(error = %err, "Unexpected error verifying token");
            return AuthError::Internal(err.to_string());
        }
    };

    tracing::warn!(error = %err, code = auth_error.code(), "Bearer token rejected");
    auth_error
}
