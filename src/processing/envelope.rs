//! # Authentication Envelope
//!
//! The message is tagged before framing so the decoder knows whether it is protected:
//!
//! | Variant           | Serialized form          |
//! |-------------------|--------------------------|
//! | `Authenticated`   | `AUTH:<code>:<message>`  |
//! | `Unauthenticated` | `NOAUTH:<message>`       |
//! | `Bare`            | `<message>`              |
//!
//! `Bare` is what the untagged legacy encoder produced. Anything that fails to parse as a
//! tagged envelope also degrades to `Bare`, so non-steganographic images decode to
//! best-effort noise instead of an error.
//!
//! The auth code is a plaintext label stored next to the message. It gates the UI flow and
//! protects nothing cryptographically; it is drawn from `rand::thread_rng`, which is not a
//! CSPRNG.

use std::fmt;

use rand::Rng;

use crate::error::{Result, StegoError};

const AUTH_TAG: &str = "AUTH:";
const NOAUTH_TAG: &str = "NOAUTH:";

/// Number of digits in an authentication code.
pub const AUTH_CODE_DIGITS: usize = 4;

/// A 4-digit decimal authentication code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthCode(String);

impl AuthCode {
    /// Draws a code uniformly from `1000..=9999`.
    pub fn generate() -> Self {
        let n: u16 = rand::thread_rng().gen_range(1000..=9999);
        AuthCode(n.to_string())
    }

    /// Parses a user-supplied code. Exactly four ASCII digits are accepted.
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.len() == AUTH_CODE_DIGITS && code.bytes().all(|b| b.is_ascii_digit()) {
            Ok(AuthCode(code.to_string()))
        } else {
            Err(StegoError::InvalidAuthCode(format!(
                "expected {} decimal digits",
                AUTH_CODE_DIGITS
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the caller wants done about authentication when wrapping a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    /// Tag the message `NOAUTH:`.
    None,
    /// Generate a fresh code.
    Generate,
    /// Reuse a code the caller already holds.
    Use(AuthCode),
}

impl AuthRequest {
    pub fn from_flags(auth_requested: bool, existing: Option<AuthCode>) -> Self {
        match (auth_requested, existing) {
            (false, _) => AuthRequest::None,
            (true, Some(code)) => AuthRequest::Use(code),
            (true, None) => AuthRequest::Generate,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthRequest::None)
    }
}

/// A parsed message envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    Authenticated { code: String, message: String },
    Unauthenticated { message: String },
    Bare { message: String },
}

impl Envelope {
    /// Parses raw decoded text into an envelope. Never fails.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(AUTH_TAG) {
            let mut parts = raw.splitn(3, ':');
            // The tag itself is always the first part.
            let _tag = parts.next();
            if let (Some(code), Some(message)) = (parts.next(), parts.next()) {
                return Envelope::Authenticated {
                    code: code.to_string(),
                    message: message.to_string(),
                };
            }
        } else if let Some(message) = raw.strip_prefix(NOAUTH_TAG) {
            return Envelope::Unauthenticated {
                message: message.to_string(),
            };
        }

        Envelope::Bare {
            message: raw.to_string(),
        }
    }

    /// The text that gets framed.
    pub fn serialize(&self) -> String {
        match self {
            Envelope::Authenticated { code, message } => {
                format!("{}{}:{}", AUTH_TAG, code, message)
            }
            Envelope::Unauthenticated { message } => format!("{}{}", NOAUTH_TAG, message),
            Envelope::Bare { message } => message.clone(),
        }
    }
}

/// Outcome of unwrapping an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unwrapped {
    /// The message is protected and no code was supplied. Neither the message nor the stored
    /// code is exposed.
    Pending,
    /// The message is available. `authenticated` is set when a code was checked.
    Revealed { message: String, authenticated: bool },
}

/// Number of characters the envelope adds in front of a message.
pub fn envelope_overhead(has_auth: bool) -> usize {
    if has_auth {
        AUTH_TAG.len() + AUTH_CODE_DIGITS + 1
    } else {
        NOAUTH_TAG.len()
    }
}

/// Wraps a message in an `AUTH:` or `NOAUTH:` envelope.
///
/// Returns the serialized text and, for authenticated requests, the code the caller must
/// keep for later verification.
pub fn wrap_envelope(message: &str, auth: AuthRequest) -> (String, Option<AuthCode>) {
    match auth {
        AuthRequest::None => {
            let envelope = Envelope::Unauthenticated {
                message: message.to_string(),
            };
            (envelope.serialize(), None)
        }
        AuthRequest::Generate => wrap_authenticated(message, AuthCode::generate()),
        AuthRequest::Use(code) => wrap_authenticated(message, code),
    }
}

fn wrap_authenticated(message: &str, code: AuthCode) -> (String, Option<AuthCode>) {
    let envelope = Envelope::Authenticated {
        code: code.as_str().to_string(),
        message: message.to_string(),
    };
    (envelope.serialize(), Some(code))
}

/// The untagged legacy form: the message as is.
pub fn wrap_legacy(message: &str) -> String {
    Envelope::Bare {
        message: message.to_string(),
    }
    .serialize()
}

/// Parses `raw` and applies the authentication rules.
///
/// # Errors
/// - `AuthenticationError` if the message is protected and `supplied` differs from the stored
///   code
pub fn unwrap_envelope(raw: &str, supplied: Option<&str>) -> Result<Unwrapped> {
    match Envelope::parse(raw) {
        Envelope::Authenticated { code, message } => match supplied {
            None => Ok(Unwrapped::Pending),
            Some(given) if given == code => Ok(Unwrapped::Revealed {
                message,
                authenticated: true,
            }),
            Some(_) => Err(StegoError::AuthenticationError),
        },
        Envelope::Unauthenticated { message } | Envelope::Bare { message } => {
            Ok(Unwrapped::Revealed {
                message,
                authenticated: false,
            })
        }
    }
}
