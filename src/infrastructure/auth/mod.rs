// Auth module - delegated identity verification
use crate::core::session::UserId;
use crate::domain::error::{FocusError, FocusResult};
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Identity established for a connection after credential verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: UserId,
}

/// Credential verification collaborator. The gateway hands over the opaque
/// credential presented at connection time and trusts the verdict; nothing
/// else in the engine ever inspects credentials.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> FocusResult<VerifiedIdentity>;
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    user_id: String,
    expires_at: u64,
}

/// Verifier for shared-secret bearer tokens of the form
/// `base64(claims).hex(sha256(secret || base64(claims)))`.
pub struct SharedSecretVerifier {
    secret: Vec<u8>,
}

impl SharedSecretVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    /// Mint a token for local development and tests. Production issuance
    /// belongs to the auth service, not this daemon.
    pub fn issue(&self, user_id: &str, ttl: Duration) -> FocusResult<String> {
        if user_id.is_empty() {
            return Err(FocusError::InvalidInput("user id must not be empty".to_string()));
        }
        let expires_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .saturating_add(ttl.as_secs());
        let claims = TokenClaims {
            user_id: user_id.to_string(),
            expires_at,
        };
        let body = serde_json::to_vec(&claims)
            .map_err(|e| FocusError::Protocol(format!("failed to encode claims: {}", e)))?;
        let payload = base64::engine::general_purpose::STANDARD.encode(body);
        let signature = self.sign(&payload);
        Ok(format!("{}.{}", payload, signature))
    }

    fn sign(&self, payload: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(payload.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl IdentityVerifier for SharedSecretVerifier {
    async fn verify(&self, credential: &str) -> FocusResult<VerifiedIdentity> {
        let (payload, signature) = credential
            .split_once('.')
            .ok_or_else(|| FocusError::Auth("malformed token".to_string()))?;
        if self.sign(payload) != signature {
            return Err(FocusError::Auth("invalid signature".to_string()));
        }
        let body = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|_| FocusError::Auth("invalid payload encoding".to_string()))?;
        let claims: TokenClaims = serde_json::from_slice(&body)
            .map_err(|_| FocusError::Auth("invalid claims".to_string()))?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        if claims.expires_at <= now {
            return Err(FocusError::Auth("token expired".to_string()));
        }
        if claims.user_id.is_empty() {
            return Err(FocusError::Auth("missing user id".to_string()));
        }
        Ok(VerifiedIdentity {
            user_id: claims.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> SharedSecretVerifier {
        SharedSecretVerifier::new("test-secret")
    }

    #[tokio::test]
    async fn test_issue_and_verify_round_trip() {
        let verifier = verifier();
        let token = verifier.issue("user-42", Duration::from_secs(3600)).unwrap();

        let identity = verifier.verify(&token).await.unwrap();
        assert_eq!(identity.user_id, "user-42");
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let verifier = verifier();
        let token = verifier.issue("user-42", Duration::from_secs(0)).unwrap();

        let result = verifier.verify(&token).await;
        assert!(matches!(result, Err(FocusError::Auth(_))));
    }

    #[tokio::test]
    async fn test_tampered_signature_rejected() {
        let verifier = verifier();
        let token = verifier.issue("user-42", Duration::from_secs(3600)).unwrap();
        let (payload, _) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", payload, "0".repeat(64));

        assert!(verifier.verify(&forged).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let token = verifier().issue("user-42", Duration::from_secs(3600)).unwrap();
        let other = SharedSecretVerifier::new("different-secret");

        assert!(other.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_tokens_rejected() {
        let verifier = verifier();
        assert!(verifier.verify("").await.is_err());
        assert!(verifier.verify("no-separator").await.is_err());
        assert!(verifier.verify("not-base64!!.deadbeef").await.is_err());
    }

    #[test]
    fn test_issue_rejects_empty_user() {
        let result = verifier().issue("", Duration::from_secs(60));
        assert!(matches!(result, Err(FocusError::InvalidInput(_))));
    }
}
