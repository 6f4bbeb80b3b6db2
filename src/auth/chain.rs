use axum::http::{header::AUTHORIZATION, HeaderMap};
use subtle::ConstantTimeEq;

use super::{AuthError, Identity, TokenVerifier};

/// HTTP header carrying the shared inter-service secret
pub const SERVICE_TOKEN_HEADER: &str = "x-service-token";

const BEARER_PREFIX: &str = "Bearer ";

/// One step of the authentication chain
///
/// `Ok(None)` means the strategy does not apply to this request and the next one
/// should run. `Ok(Some(_))` and `Err(_)` both end the chain.
pub trait AuthStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn authenticate(&self, headers: &HeaderMap) -> Result<Option<Identity>, AuthError>;
}

/// Accepts requests presenting the configured `X-Service-Token`
pub struct ServiceTokenStrategy {
    expected: String,
}

impl ServiceTokenStrategy {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl AuthStrategy for ServiceTokenStrategy {
    fn name(&self) -> &'static str {
        "service_token"
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<Option<Identity>, AuthError> {
        let Some(value) = headers.get(SERVICE_TOKEN_HEADER) else {
            return Ok(None);
        };

        if value.is_empty() {
            return Ok(None);
        }

        if bool::from(value.as_bytes().ct_eq(self.expected.as_bytes())) {
            tracing::debug!("Service-to-service authentication established");
            Ok(Some(Identity::Service))
        } else {
            tracing::warn!("Invalid service token presented");
            Err(AuthError::InvalidServiceToken)
        }
    }
}

/// Verifies `Authorization: Bearer <token>` user credentials
pub struct BearerTokenStrategy {
    verifier: TokenVerifier,
}

impl BearerTokenStrategy {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }
}

impl AuthStrategy for BearerTokenStrategy {
    fn name(&self) -> &'static str {
        "bearer_token"
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<Option<Identity>, AuthError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.strip_prefix(BEARER_PREFIX));

        let Some(token) = token else {
            tracing::debug!("No bearer token in request");
            return Ok(None);
        };

        let verified = self.verifier.verify(token.trim())?;

        Ok(Some(Identity::User {
            user_id: verified.user_id,
            artist_id: verified.artist_id,
        }))
    }
}

/// Ordered list of strategies; the first one that answers wins
pub struct AuthChain {
    strategies: Vec<Box<dyn AuthStrategy>>,
}

impl AuthChain {
    /// Standard chain: service token first, then user bearer token
    pub fn new(service_token: &str, jwt_secret: &str) -> Self {
        Self::with_strategies(vec![
            Box::new(ServiceTokenStrategy::new(service_token)),
            Box::new(BearerTokenStrategy::new(TokenVerifier::new(jwt_secret))),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn AuthStrategy>>) -> Self {
        Self { strategies }
    }

    /// Resolves the caller identity for one request
    pub fn resolve(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        for strategy in &self.strategies {
            if let Some(identity) = strategy.authenticate(headers)? {
                tracing::debug!(strategy = strategy.name(), identity = ?identity, "Caller authenticated");
                return Ok(identity);
            }
        }

        Ok(Identity::Unauthenticated)
    }
}
