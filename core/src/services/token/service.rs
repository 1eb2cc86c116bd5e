//! Access token minting and verification
//!
//! Token wire format: `base64url(header) . base64url(claims) .
//! base64url(hmac_sha256(secret, first_two_segments))`, all segments
//! unpadded. The header is the fixed string `{"alg":"HS256","typ":"JWT"}`
//! and is covered by the signature, so it is not re-parsed on verify.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use ak_shared::config::TokenPolicy;

use crate::domain::entities::Claims;
use crate::errors::{DomainError, DomainResult, TokenError};

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// A minted token together with its claims
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token: String,
    pub claims: Claims,
    /// Lifetime in seconds, as granted
    pub expires_in: i64,
}

/// Stateless token signer and verifier
#[derive(Debug, Clone)]
pub struct TokenService {
    secret: String,
    issuer: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
    register_token_expiry: i64,
}

impl TokenService {
    pub fn new(policy: &TokenPolicy) -> Self {
        Self {
            secret: policy.secret.clone(),
            issuer: policy.issuer.clone(),
            access_token_expiry: policy.access_token_expiry,
            refresh_token_expiry: policy.refresh_token_expiry,
            register_token_expiry: policy.register_token_expiry,
        }
    }

    /// Lifetime granted to freshly registered accounts
    pub fn register_expiry(&self) -> i64 {
        self.register_token_expiry
    }

    /// Lifetime granted on login; longer when the client asked to be
    /// remembered
    pub fn login_expiry(&self, remember_me: bool) -> i64 {
        if remember_me {
            self.refresh_token_expiry
        } else {
            self.access_token_expiry
        }
    }

    /// Mint a token for the given subject, valid for `expires_in` seconds
    pub fn mint(
        &self,
        user_id: i64,
        username: &str,
        mobile: &str,
        expires_in: i64,
    ) -> DomainResult<MintedToken> {
        self.mint_at(user_id, username, mobile, expires_in, Utc::now())
    }

    /// Mint with an explicit issue instant
    pub fn mint_at(
        &self,
        user_id: i64,
        username: &str,
        mobile: &str,
        expires_in: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<MintedToken> {
        let claims = Claims {
            user_id,
            username: username.to_string(),
            mobile: mobile.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + expires_in,
            iss: self.issuer.clone(),
        };

        let payload = serde_json::to_string(&claims)
            .map_err(|e| DomainError::internal(format!("claims serialization failed: {e}")))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER),
            URL_SAFE_NO_PAD.encode(&payload)
        );
        let signature = self.sign(signing_input.as_bytes())?;

        Ok(MintedToken {
            token: format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)),
            claims,
            expires_in,
        })
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify against an explicit instant
    ///
    /// The signature is checked before the claims are even parsed, so a
    /// forged payload is rejected without being deserialized.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (header, payload, signature) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(p), Some(s), None) if !h.is_empty() && !p.is_empty() => (h, p, s),
                _ => return Err(TokenError::InvalidFormat),
            };

        let presented = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::InvalidSignature)?;
        let expected = self
            .sign(format!("{header}.{payload}").as_bytes())
            .map_err(|_| TokenError::InvalidSignature)?;
        if presented.len() != expected.len() || !constant_time_eq(&presented, &expected) {
            return Err(TokenError::InvalidSignature);
        }

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::InvalidClaims)?;
        let claims: Claims =
            serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::InvalidClaims)?;

        if claims.is_expired_at(now.timestamp()) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, input: &[u8]) -> DomainResult<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| DomainError::internal(format!("hmac key rejected: {e}")))?;
        mac.update(input);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}
