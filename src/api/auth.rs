//! Bearer token authorization for the job endpoints.
//!
//! Handlers opt in by taking a [`ReadAccess`] argument. The extractor pulls
//! the `Authorization: Bearer <jwt>` header, verifies the HS256 signature,
//! expiry and the configured issuer/audience, then requires the configured
//! scope in the token's `scp` (or `scope`) claim.
//!
//! ```rust,ignore
//! #[get("/{id}")]
//! async fn get_job(_access: ReadAccess, ...) -> Result<HttpResponse, ApiError> { ... }
//! ```

use actix_web::{dev::Payload, http::{header, StatusCode}, web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use futures_util::future::{ready, Ready};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::error::{Domain, ErrorBody};
use crate::config::AuthConfig;

/// Claims read from an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Space separated scopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Claims {
    fn has_scope(&self, required: &str) -> bool {
        self.scp
            .iter()
            .chain(self.scope.iter())
            .flat_map(|s| s.split_whitespace())
            .any(|s| s == required)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is missing")]
    MissingAuthorization,

    #[error("Authorization header is not a bearer token")]
    MalformedAuthorization,

    #[error("Access token rejected: {0}")]
    InvalidToken(String),

    #[error("Access token expired")]
    TokenExpired,

    #[error("Access token lacks scope '{0}'")]
    InsufficientScope(String),

    #[error("Token validation is not configured")]
    NotConfigured,
}

impl AuthError {
    fn reason(&self) -> &'static str {
        match self {
            AuthError::InsufficientScope(_) => "AU-2",
            AuthError::NotConfigured => "AU-3",
            _ => "AU-1",
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InsufficientScope(_) => StatusCode::FORBIDDEN,
            AuthError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let token = match status {
            StatusCode::FORBIDDEN => "FORBIDDEN",
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            _ => "AUTH_CONFIG",
        };
        let body = ErrorBody::new(status, self.to_string(), token, self.reason())
            .with_domain(Domain::Tenant);

        let mut response = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            response.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        response.json(body)
    }
}

/// Verifies access tokens against the configured key and scope
#[derive(Clone)]
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
    scope: String,
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match &config.issuer {
            Some(issuer) => validation.set_issuer(&[issuer]),
            None => validation.iss = None,
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            scope: config.scope.clone(),
        }
    }

    /// Validate a raw `Authorization` header value
    pub fn authorize(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        let header = header.ok_or(AuthError::MissingAuthorization)?;
        // scheme name is case-insensitive
        let token = header
            .trim()
            .split_once(' ')
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
            .map(|(_, token)| token.trim())
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MalformedAuthorization)?;

        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?
            .claims;

        if !claims.has_scope(&self.scope) {
            return Err(AuthError::InsufficientScope(self.scope.clone()));
        }

        Ok(claims)
    }
}

/// Proof that the caller presented a token carrying the read scope
#[derive(Debug, Clone)]
pub struct ReadAccess {
    pub subject: String,
}

impl FromRequest for ReadAccess {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(validator) = req.app_data::<web::Data<TokenValidator>>() else {
            warn!("No TokenValidator registered, rejecting {}", req.path());
            return ready(Err(AuthError::NotConfigured));
        };

        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .map(|h| h.to_str().map_err(|_| AuthError::MalformedAuthorization));

        let result = match header.transpose() {
            Ok(value) => validator.authorize(value),
            Err(e) => Err(e),
        };

        ready(match result {
            Ok(claims) => {
                debug!("Authorized {} for {}", claims.sub, req.path());
                Ok(ReadAccess { subject: claims.sub })
            }
            Err(e) => {
                warn!("Rejected request to {}: {}", req.path(), e);
                Err(e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn config() -> AuthConfig {
        AuthConfig {
            secret: SECRET.to_string(),
            issuer: Some("https://issuer.example".to_string()),
            audience: None,
            scope: "read".to_string(),
        }
    }

    fn token(secret: &str, scp: Option<&str>, exp_offset: i64, iss: &str) -> String {
        let claims = Claims {
            sub: "user-1".to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
            iss: Some(iss.to_string()),
            aud: None,
            scp: scp.map(str::to_string),
            scope: None,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    #[test]
    fn accepts_token_with_scope() {
        let validator = TokenValidator::new(&config());
        let header = bearer(&token(SECRET, Some("write read"), 600, "https://issuer.example"));

        let claims = validator.authorize(Some(&header)).unwrap();
        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn rejects_missing_and_malformed_headers() {
        let validator = TokenValidator::new(&config());

        assert!(matches!(validator.authorize(None), Err(AuthError::MissingAuthorization)));
        assert!(matches!(
            validator.authorize(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::MalformedAuthorization)
        ));
        assert!(matches!(validator.authorize(Some("Bearer ")), Err(AuthError::MalformedAuthorization)));
    }

    #[test]
    fn rejects_wrong_signature_issuer_and_expiry() {
        let validator = TokenValidator::new(&config());

        let forged = bearer(&token("other-secret", Some("read"), 600, "https://issuer.example"));
        let foreign = bearer(&token(SECRET, Some("read"), 600, "https://elsewhere.example"));
        let expired = bearer(&token(SECRET, Some("read"), -3600, "https://issuer.example"));

        assert!(matches!(validator.authorize(Some(&forged)), Err(AuthError::InvalidToken(_))));
        assert!(matches!(validator.authorize(Some(&foreign)), Err(AuthError::InvalidToken(_))));
        assert!(matches!(validator.authorize(Some(&expired)), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let validator = TokenValidator::new(&config());
        let token = token(SECRET, Some("read"), 600, "https://issuer.example");

        assert!(validator.authorize(Some(&format!("bearer {}", token))).is_ok());
        assert!(validator.authorize(Some(&format!("BEARER {}", token))).is_ok());
    }

    #[test]
    fn unauthorized_carries_challenge_header() {
        let response = AuthError::MissingAuthorization.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

        let response = AuthError::InsufficientScope("read".to_string()).error_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn missing_scope_is_forbidden() {
        let validator = TokenValidator::new(&config());
        let header = bearer(&token(SECRET, Some("write"), 600, "https://issuer.example"));

        let err = validator.authorize(Some(&header)).unwrap_err();
        assert!(matches!(err, AuthError::InsufficientScope(_)));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn scope_claim_is_accepted_as_fallback() {
        let claims = Claims {
            sub: "s".to_string(),
            exp: 0,
            iss: None,
            aud: None,
            scp: None,
            scope: Some("openid read".to_string()),
        };
        assert!(claims.has_scope("read"));
        assert!(!claims.has_scope("rea"));
    }
}
