//! Webhook signature verification.
//!
//! Two signing conventions are accepted on the same endpoint:
//!
//! | Scheme | Header | Format | MAC |
//! |--------|--------|--------|-----|
//! | [`SignatureScheme::GitHub`] | `X-Hub-Signature` | `sha1=<40 hex>` | HMAC-SHA1 |
//! | [`SignatureScheme::Gitea`] | `X-Gitea-Signature` | `<64 hex>` | HMAC-SHA256 |
//!
//! Both schemes share the same secret key. Signatures are compared as
//! lowercase hex strings in constant time; uppercase hex is rejected.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Header carrying the GitHub-style HMAC-SHA1 signature.
pub const GITHUB_SIGNATURE_HEADER: &str = "x-hub-signature";

/// Header carrying the Gitea-style HMAC-SHA256 signature.
pub const GITEA_SIGNATURE_HEADER: &str = "x-gitea-signature";

// ============================================================================
// Secret Key
// ============================================================================

/// Shared secret used as the HMAC key for both signature schemes.
///
/// The key bytes are wiped from memory when the value is dropped and are
/// never printed through `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wrap the given secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    /// Returns `true` when the secret has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<String> for SecretKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// Security: Don't expose secrets in debug output
impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretKey").field(&"<REDACTED>").finish()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Reasons a request fails authentication.
///
/// The `Display` text of each variant is sent verbatim to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// Neither signature header carried a value.
    #[error("missing signature header (X-Hub-Signature or X-Gitea-Signature)")]
    Missing,

    /// A signature header was present but malformed or did not match.
    #[error("invalid signature header")]
    Invalid,
}

// ============================================================================
// Schemes
// ============================================================================

/// Supported webhook signing conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// `X-Hub-Signature: sha1=<hex>`
    GitHub,

    /// `X-Gitea-Signature: <hex>`
    Gitea,
}

impl SignatureScheme {
    /// Name of the header carrying this scheme's signature.
    pub fn header_name(&self) -> &'static str {
        match self {
            Self::GitHub => GITHUB_SIGNATURE_HEADER,
            Self::Gitea => GITEA_SIGNATURE_HEADER,
        }
    }

    /// Textual prefix in front of the hex digest.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::GitHub => "sha1=",
            Self::Gitea => "",
        }
    }

    /// Exact length of a well-formed header value, prefix included.
    pub fn signature_len(&self) -> usize {
        match self {
            // 40 hex digits plus "sha1=" prefix
            Self::GitHub => 45,
            // 64 hex digits, without any prefix
            Self::Gitea => 64,
        }
    }

    /// Structural check performed before any MAC is computed.
    ///
    /// `signature` must already be trimmed.
    pub fn check_format(&self, signature: &str) -> Result<(), SignatureError> {
        if signature.is_empty() {
            return Err(SignatureError::Missing);
        }
        if signature.len() != self.signature_len() {
            return Err(SignatureError::Invalid);
        }
        Ok(())
    }

    /// Compute the header value a holder of `secret_key` would send for `body`.
    pub fn sign(&self, secret_key: &SecretKey, body: &[u8]) -> Result<String, SignatureError> {
        let digest = match self {
            Self::GitHub => {
                let mut mac = Hmac::<Sha1>::new_from_slice(secret_key.as_bytes())
                    .map_err(|_| SignatureError::Invalid)?;
                mac.update(body);
                hex::encode(mac.finalize().into_bytes())
            }
            Self::Gitea => {
                let mut mac = Hmac::<Sha256>::new_from_slice(secret_key.as_bytes())
                    .map_err(|_| SignatureError::Invalid)?;
                mac.update(body);
                hex::encode(mac.finalize().into_bytes())
            }
        };
        Ok(format!("{}{}", self.prefix(), digest))
    }

    /// Verify a raw header value against `body`.
    pub fn verify(
        &self,
        secret_key: &SecretKey,
        header_value: Option<&str>,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        let signature = header_value.map(str::trim).unwrap_or_default();
        self.check_format(signature)?;

        let expected = self.sign(secret_key, body)?;
        if bool::from(signature.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(())
        } else {
            Err(SignatureError::Invalid)
        }
    }
}

impl std::fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "github"),
            Self::Gitea => write!(f, "gitea"),
        }
    }
}

// ============================================================================
// Verification entry points
// ============================================================================

/// Verify an `X-Hub-Signature` header value (`sha1=<hex>`, HMAC-SHA1).
pub fn verify_github_style(
    secret_key: &SecretKey,
    header_value: Option<&str>,
    body: &[u8],
) -> Result<(), SignatureError> {
    SignatureScheme::GitHub.verify(secret_key, header_value, body)
}

/// Verify an `X-Gitea-Signature` header value (`<hex>`, HMAC-SHA256).
pub fn verify_gitea_style(
    secret_key: &SecretKey,
    header_value: Option<&str>,
    body: &[u8],
) -> Result<(), SignatureError> {
    SignatureScheme::Gitea.verify(secret_key, header_value, body)
}

/// Authenticate a request carrying either signature header.
///
/// The GitHub-style header is tried first. The Gitea-style header is only
/// consulted when the GitHub-style one is absent; a malformed or mismatched
/// GitHub-style signature fails immediately.
///
/// Returns the scheme that authenticated the request.
pub fn verify_request(
    secret_key: &SecretKey,
    github_header: Option<&str>,
    gitea_header: Option<&str>,
    body: &[u8],
) -> Result<SignatureScheme, SignatureError> {
    match verify_github_style(secret_key, github_header, body) {
        Ok(()) => Ok(SignatureScheme::GitHub),
        Err(SignatureError::Missing) => {
            verify_gitea_style(secret_key, gitea_header, body).map(|()| SignatureScheme::Gitea)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
