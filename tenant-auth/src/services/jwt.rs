use chrono::Utc;
use jsonwebtoken::{
    crypto, decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::models::{Identity, Role, UserId};
use crate::services::AuthError;

/// Issues and validates HS256 identity tokens.
///
/// Holds no mutable state; clone it freely across request tasks.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_ms: i64,
}

/// Token payload.
///
/// Full tokens carry every field. Minimal tokens (see
/// [`JwtService::issue_for`]) carry only `sub`, `username`, `iat` and `exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID, or the username for minimal tokens)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impersonation: Option<bool>,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    pub fn impersonation(&self) -> bool {
        self.impersonation.unwrap_or(false)
    }
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        tracing::info!(
            expiration_ms = config.expiration_ms,
            "JWT service initialized with HS256"
        );

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiration_ms: config.expiration_ms,
        }
    }

    /// Issue a token carrying the full identity.
    pub fn issue(
        &self,
        subject_id: UserId,
        email: &str,
        role: Role,
        impersonation: bool,
        username: &str,
    ) -> Result<String, AuthError> {
        let (iat, exp) = self.window();

        let claims = Claims {
            sub: subject_id.to_string(),
            email: Some(email.to_string()),
            username: username.to_string(),
            role: Some(role),
            impersonation: Some(impersonation),
            iat,
            exp,
        };

        self.sign(&claims)
    }

    /// Issue a token for a caller known only by username.
    pub fn issue_for<I: Identity + ?Sized>(&self, identity: &I) -> Result<String, AuthError> {
        let (iat, exp) = self.window();

        let claims = Claims {
            sub: identity.username().to_string(),
            email: None,
            username: identity.username().to_string(),
            role: None,
            impersonation: None,
            iat,
            exp,
        };

        self.sign(&claims)
    }

    /// Verify the signature, then the expiry, and return the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verify_signature(token)?;

        if Utc::now().timestamp() >= claims.exp {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }

    pub fn extract_username(&self, token: &str) -> Result<String, AuthError> {
        Ok(self.decode(token)?.username)
    }

    pub fn extract_subject(&self, token: &str) -> Result<String, AuthError> {
        Ok(self.decode(token)?.sub)
    }

    /// `None` for minimal tokens.
    pub fn extract_role(&self, token: &str) -> Result<Option<Role>, AuthError> {
        Ok(self.decode(token)?.role)
    }

    /// `Ok(false)` only on username mismatch. Expired tokens are reported as
    /// [`AuthError::ExpiredToken`] so callers can tell "stale" from "wrong".
    pub fn is_valid<I: Identity + ?Sized>(
        &self,
        token: &str,
        expected: &I,
    ) -> Result<bool, AuthError> {
        let claims = self.decode(token)?;
        Ok(claims.username == expected.username())
    }

    /// Boolean form of [`Self::is_valid`] for callers that do not care why a
    /// token was refused.
    pub fn check<I: Identity + ?Sized>(&self, token: &str, expected: &I) -> bool {
        match self.is_valid(token, expected) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::debug!(reason = %e, "Token refused");
                false
            }
        }
    }

    /// Seconds until the token expires.
    pub fn time_until_expiration(&self, token: &str) -> Result<i64, AuthError> {
        let claims = self.decode(token)?;
        Ok(claims.exp - Utc::now().timestamp())
    }

    /// Configured token lifetime in seconds (for client info).
    pub fn expiration_seconds(&self) -> i64 {
        self.expiration_ms / 1000
    }

    /// `exp` is rounded up to the whole second so a token never expires
    /// before `now + expiration`. Non-positive lifetimes round down and are
    /// expired on issue.
    fn window(&self) -> (i64, i64) {
        let now = Utc::now();
        let exp_ms = now.timestamp_millis() + self.expiration_ms;
        let exp = if self.expiration_ms > 0 {
            (exp_ms + 999).div_euclid(1000)
        } else {
            exp_ms.div_euclid(1000)
        };
        (now.timestamp(), exp)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }

    /// Structure first, then the MAC. Expiry is left to `decode` so that it
    /// is only reported for tokens whose signature holds.
    fn verify_signature(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        let claims = self.read_claims(token)?;

        if header.alg != Algorithm::HS256 {
            return Err(AuthError::Signature);
        }

        let (message, signature) = token.rsplit_once('.').ok_or(AuthError::MalformedToken)?;
        match crypto::verify(signature, message.as_bytes(), &self.decoding_key, Algorithm::HS256) {
            Ok(true) => Ok(claims),
            Ok(false) => Err(AuthError::Signature),
            Err(_) => Err(AuthError::MalformedToken),
        }
    }

    /// Decode the payload without trusting it.
    fn read_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::MalformedToken)
    }
}
