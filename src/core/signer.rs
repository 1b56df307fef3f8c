//! JWT assertion signing for the OAuth2 service-account flow.
//!
//! The assertion is a standard RS256 JWT:
//!
//! ```text
//! base64url({"typ":"JWT","alg":"RS256"}) . base64url(claims) . base64url(signature)
//! ```
//!
//! where the signature is RSA PKCS#1 v1.5 with SHA-256 over the first two segments.

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, get_current_timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::credentials::ServiceAccountCredential;

/// OAuth scope requested for the access token
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Lifetime of a signed assertion in seconds
pub const ASSERTION_LIFETIME_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum SignerError {
    /// The PEM could not be parsed as an RSA private key
    #[error("failed to import private key: {0}")]
    KeyImport(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign assertion: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Claim set of the JWT-bearer assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

impl AssertionClaims {
    /// Claims for `client_email` addressed to the token endpoint `audience`,
    /// valid from `issued_at` for [`ASSERTION_LIFETIME_SECS`].
    pub fn new(client_email: &str, audience: &str, issued_at: u64) -> Self {
        Self {
            iss: client_email.to_string(),
            scope: CLOUD_PLATFORM_SCOPE.to_string(),
            aud: audience.to_string(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        }
    }
}

/// Sign `claims` with the RSA key in `private_key_pem` and return the compact JWT.
///
/// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`) PEM.
/// A key that cannot be imported yields [`SignerError::KeyImport`]; retrying will
/// not help.
pub fn sign_assertion(
    claims: &AssertionClaims,
    private_key_pem: &str,
) -> Result<String, SignerError> {
    let key =
        EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(SignerError::KeyImport)?;

    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &key).map_err(SignerError::Signing)
}

/// Build and sign a fresh assertion for `credential`, issued now.
pub fn assertion_for(
    credential: &ServiceAccountCredential,
    audience: &str,
) -> Result<String, SignerError> {
    let claims = AssertionClaims::new(&credential.client_email, audience, get_current_timestamp());
    sign_assertion(&claims, &credential.private_key_pem)
}
