//! Auth failure kinds and the status/message table they render with.
//!
//! The table is closed: adding a kind without an entry is a compile error
//! (the `match` in [`AuthErrorKind::entry`] is exhaustive).

use std::fmt;

use axum::http::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    TokenRequired,
    InvalidClaims,
    InvalidSignature,
    ExpiredToken,
    UnsupportedToken,
    InvalidToken,
    /// Produced by the authorization phase, rendered without the envelope.
    AuthorizationDenied,
}

/// HTTP status + user-facing message for one [`AuthErrorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorEntry {
    pub status: StatusCode,
    pub message: &'static str,
}

impl AuthErrorKind {
    pub const fn entry(self) -> ErrorEntry {
        let (status, message) = match self {
            Self::TokenRequired => (StatusCode::BAD_REQUEST, "A JWT token is required."),
            Self::InvalidClaims => (StatusCode::BAD_REQUEST, "The JWT claims are invalid."),
            Self::InvalidSignature => (StatusCode::UNAUTHORIZED, "The JWT signature is invalid."),
            Self::ExpiredToken => (StatusCode::UNAUTHORIZED, "The JWT token has expired."),
            Self::UnsupportedToken => (StatusCode::BAD_REQUEST, "The JWT token is not supported."),
            Self::InvalidToken => (StatusCode::BAD_REQUEST, "The JWT token is invalid."),
            Self::AuthorizationDenied => (
                StatusCode::FORBIDDEN,
                "Administrator privileges are required.",
            ),
        };
        ErrorEntry { status, message }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TokenRequired => "TOKEN_REQUIRED",
            Self::InvalidClaims => "INVALID_CLAIMS",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::ExpiredToken => "EXPIRED_TOKEN",
            Self::UnsupportedToken => "UNSUPPORTED_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::AuthorizationDenied => "AUTHORIZATION_DENIED",
        }
    }

    /// Authentication kinds are rendered with the `{status, code, message}` envelope.
    pub const fn uses_envelope(self) -> bool {
        !matches!(self, Self::AuthorizationDenied)
    }
}

pub fn lookup(kind: AuthErrorKind) -> ErrorEntry {
    kind.entry()
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper-snake name of a status code, e.g. `BAD_REQUEST`.
pub fn status_name(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_ascii_uppercase()
        .replace([' ', '-'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AuthErrorKind; 7] = [
        AuthErrorKind::TokenRequired,
        AuthErrorKind::InvalidClaims,
        AuthErrorKind::InvalidSignature,
        AuthErrorKind::ExpiredToken,
        AuthErrorKind::UnsupportedToken,
        AuthErrorKind::InvalidToken,
        AuthErrorKind::AuthorizationDenied,
    ];

    #[test]
    fn statuses_match_the_catalog() {
        assert_eq!(lookup(AuthErrorKind::TokenRequired).status, StatusCode::BAD_REQUEST);
        assert_eq!(lookup(AuthErrorKind::InvalidClaims).status, StatusCode::BAD_REQUEST);
        assert_eq!(lookup(AuthErrorKind::InvalidSignature).status, StatusCode::UNAUTHORIZED);
        assert_eq!(lookup(AuthErrorKind::ExpiredToken).status, StatusCode::UNAUTHORIZED);
        assert_eq!(lookup(AuthErrorKind::UnsupportedToken).status, StatusCode::BAD_REQUEST);
        assert_eq!(lookup(AuthErrorKind::InvalidToken).status, StatusCode::BAD_REQUEST);
        assert_eq!(lookup(AuthErrorKind::AuthorizationDenied).status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn every_kind_has_a_message_and_unique_code() {
        let mut codes: Vec<_> = ALL.iter().map(|k| k.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ALL.len());

        for kind in ALL {
            assert!(!lookup(kind).message.is_empty(), "{kind} has no message");
        }
    }

    #[test]
    fn only_authorization_denied_skips_the_envelope() {
        for kind in ALL {
            assert_eq!(kind.uses_envelope(), kind != AuthErrorKind::AuthorizationDenied);
        }
    }

    #[test]
    fn status_names_are_upper_snake() {
        assert_eq!(status_name(StatusCode::BAD_REQUEST), "BAD_REQUEST");
        assert_eq!(status_name(StatusCode::UNAUTHORIZED), "UNAUTHORIZED");
        assert_eq!(status_name(StatusCode::FORBIDDEN), "FORBIDDEN");
    }
}
