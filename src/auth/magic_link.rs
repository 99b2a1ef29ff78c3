use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use regex::Regex;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::auth::token_store::TokenStore;
use crate::error::AuthError;
use crate::models::{MagicLinkToken, SessionCredential};

/// How long a delivered link stays redeemable.
const MAGIC_LINK_TTL_MINUTES: i64 = 15;
/// Lifetime of the session issued on a successful redemption.
const SESSION_TTL_DAYS: i64 = 7;

/// A freshly issued link, ready for email delivery. The raw token must
/// only be surfaced to callers in development mode.
#[derive(Debug, Clone)]
pub struct MagicLink {
    pub token: String,
    pub link_url: Url,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

pub struct MagicLinkService {
    store: Arc<dyn TokenStore>,
    base_url: Url,
    email_regex: Regex,
}

impl MagicLinkService {
    pub fn new(store: Arc<dyn TokenStore>, base_url: Url) -> Self {
        Self {
            store,
            base_url,
            email_regex: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap(),
        }
    }

    /// Generates a single-use token for `email` and stores it with a
    /// 15-minute expiry. Delivery of the link is the caller's concern.
    pub async fn issue(&self, email: &str, now: DateTime<Utc>) -> Result<MagicLink, AuthError> {
        let email = email.trim().to_lowercase();
        if !self.email_regex.is_match(&email) {
            return Err(AuthError::InvalidEmail(email));
        }

        let token = generate_token();
        let expires_at = now + Duration::minutes(MAGIC_LINK_TTL_MINUTES);

        self.store
            .insert(MagicLinkToken {
                token: token.clone(),
                email: email.clone(),
                expires_at,
            })
            .await;

        let mut link_url = self.base_url.clone();
        link_url.set_path("/api/auth/verify");
        link_url.query_pairs_mut().append_pair("token", &token);

        info!("Issued magic link for {} (expires {})", email, expires_at);

        Ok(MagicLink {
            token,
            link_url,
            email,
            expires_at,
        })
    }

    /// Redeems a token. The token is consumed whatever the outcome, so any
    /// second attempt, concurrent or later, observes `InvalidToken`.
    pub async fn verify(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionCredential, AuthError> {
        let entry = self.store.take(token).await.ok_or(AuthError::InvalidToken)?;

        if entry.is_expired(now) {
            warn!("Rejected expired magic link for {}", entry.email);
            return Err(AuthError::ExpiredToken);
        }

        info!("Magic link redeemed for {}", entry.email);

        Ok(SessionCredential {
            token: generate_token(),
            email: entry.email,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
        })
    }
}

/// 32 bytes of CSPRNG output, URL-safe base64. 256 bits of entropy.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; 32] = rng.gen();
    general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}
