use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::Value;
use thiserror::Error;

use crate::config::SigningConfig;
use crate::services::auth::claims::{Claims, TokenClaims, UserRole};
use crate::services::auth::error_code::AuthErrorKind;

pub const BEARER_PREFIX: &str = "Bearer ";

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Errors returned by token decoding + claim validation.
#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("jwt signature verification failed")]
    Signature(#[source] jsonwebtoken::errors::Error),
    #[error("jwt has expired")]
    Expired(#[source] jsonwebtoken::errors::Error),
    #[error("jwt algorithm is not supported")]
    Unsupported(#[source] jsonwebtoken::errors::Error),
    #[error("jwt header declares an unknown algorithm")]
    UnknownAlgorithm,
    #[error("jwt is missing a required claim")]
    MissingRequired(#[source] jsonwebtoken::errors::Error),
    #[error("jwt could not be decoded")]
    Malformed(#[source] jsonwebtoken::errors::Error),
    #[error("missing or empty '{0}' claim")]
    MissingClaim(&'static str),
    #[error("invalid 'sub' (expected integer user id): {0}")]
    InvalidSubject(String),
    #[error("unknown 'userRole': {0}")]
    UnknownRole(String),
    #[error("'{0}' claim has the wrong JSON type")]
    WrongType(&'static str),
    #[error("'{0}' is not a representable timestamp")]
    InvalidTimestamp(&'static str),
    #[error("failed to sign jwt")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

impl ClaimsError {
    /// Failure category reported to the client.
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            Self::Signature(_) => AuthErrorKind::InvalidSignature,
            Self::Expired(_) => AuthErrorKind::ExpiredToken,
            Self::Unsupported(_) | Self::UnknownAlgorithm => AuthErrorKind::UnsupportedToken,
            Self::MissingRequired(_)
            | Self::MissingClaim(_)
            | Self::InvalidSubject(_)
            | Self::UnknownRole(_)
            | Self::WrongType(_)
            | Self::InvalidTimestamp(_) => AuthErrorKind::InvalidClaims,
            Self::Malformed(_) | Self::Encode(_) => AuthErrorKind::InvalidToken,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for ClaimsError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            JwtErrorKind::InvalidSignature => Self::Signature(e),
            JwtErrorKind::ExpiredSignature => Self::Expired(e),
            JwtErrorKind::InvalidAlgorithm
            | JwtErrorKind::InvalidAlgorithmName
            | JwtErrorKind::MissingAlgorithm => Self::Unsupported(e),
            JwtErrorKind::MissingRequiredClaim(_) => Self::MissingRequired(e),
            _ => Self::Malformed(e),
        }
    }
}

/// Strip the `Bearer ` scheme if present. A bare token passes through.
pub fn strip_bearer(raw: &str) -> &str {
    raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw).trim()
}

/// HS256 token codec.
///
/// Built once from [`SigningConfig`] and shared read-only across requests.
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct ClaimsCodec {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl std::fmt::Debug for ClaimsCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimsCodec")
            .field("validation", &self.validation)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl ClaimsCodec {
    pub fn new(signing: &SigningConfig) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_aud = false;
        validation.leeway = signing.leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(&signing.secret),
            encoding_key: EncodingKey::from_secret(&signing.secret),
            validation,
            ttl_seconds: signing.ttl_seconds,
        }
    }

    /// Verify a token and turn its payload into [`Claims`].
    ///
    /// `raw` may still carry the `Bearer ` prefix.
    pub fn decode(&self, raw: &str) -> Result<Claims, ClaimsError> {
        let token = strip_bearer(raw);

        if let Err(err) = jsonwebtoken::decode_header(token) {
            if header_declares_foreign_alg(token) {
                return Err(ClaimsError::UnknownAlgorithm);
            }
            return Err(err.into());
        }

        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;

        validate(data.claims)
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, ClaimsError> {
        let mut header = Header::new(ALGORITHM);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &TokenClaims::from(claims), &self.encoding_key)
            .map_err(ClaimsError::Encode)
    }

    /// Sign a fresh token valid for the configured TTL.
    pub fn issue(
        &self,
        user_id: i64,
        email: Option<String>,
        role: UserRole,
    ) -> Result<String, ClaimsError> {
        let now = Utc::now();
        let ttl = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        let claims = Claims {
            user_id,
            email,
            role,
            issued_at: Some(now),
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        self.encode(&claims)
    }
}

fn validate(raw: TokenClaims) -> Result<Claims, ClaimsError> {
    let user_id = subject(raw.sub)?;

    let role = match raw.user_role {
        Some(Value::String(role)) => role
            .parse::<UserRole>()
            .map_err(|e| ClaimsError::UnknownRole(e.0))?,
        Some(other) => return Err(ClaimsError::UnknownRole(other.to_string())),
        None => return Err(ClaimsError::MissingClaim("userRole")),
    };

    let email = match raw.email {
        Some(Value::String(email)) => Some(email),
        Some(_) => return Err(ClaimsError::WrongType("email")),
        None => None,
    };

    let exp = raw.exp.ok_or(ClaimsError::MissingClaim("exp"))?;
    let expires_at = timestamp(&exp, "exp")?;
    let issued_at = raw.iat.map(|iat| timestamp(&iat, "iat")).transpose()?;

    Ok(Claims {
        user_id,
        email,
        role,
        issued_at,
        expires_at,
    })
}

// `sub` is normally a decimal string; a bare JSON integer is read as the same id.
fn subject(sub: Option<Value>) -> Result<i64, ClaimsError> {
    match sub {
        Some(Value::String(sub)) if !sub.trim().is_empty() => sub
            .trim()
            .parse::<i64>()
            .map_err(|_| ClaimsError::InvalidSubject(sub.clone())),
        Some(Value::String(_)) | None => Err(ClaimsError::MissingClaim("sub")),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| ClaimsError::InvalidSubject(n.to_string())),
        Some(other) => Err(ClaimsError::InvalidSubject(other.to_string())),
    }
}

// NumericDate: integer seconds, fractional values are rounded.
fn timestamp(value: &Value, claim: &'static str) -> Result<DateTime<Utc>, ClaimsError> {
    let secs = value
        .as_i64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.round() as i64)
        })
        .ok_or(ClaimsError::WrongType(claim))?;
    DateTime::from_timestamp(secs, 0).ok_or(ClaimsError::InvalidTimestamp(claim))
}

// A header that is valid JSON with a string `alg` we cannot parse (e.g. "none")
// is a supported-format question, not a malformed token.
fn header_declares_foreign_alg(token: &str) -> bool {
    let Some((header, _)) = token.split_once('.') else {
        return false;
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(header) else {
        return false;
    };
    serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|v| v.get("alg").map(|alg| alg.is_string()))
        .unwrap_or(false)
}
