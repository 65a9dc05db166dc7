use crate::{credentials::ServiceAccountKey, error::DriveError};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Create/edit access to files this client creates. Nothing else in the
/// user's Drive is visible to the token.
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Google rejects assertions valid for longer than one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are renewed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign the RS256 JWT presented to the token endpoint.
pub fn build_assertion(
    key: &ServiceAccountKey,
    scope: &str,
    issued_at: i64,
) -> Result<String, DriveError> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let claims = Claims {
        iss: key.client_email.clone(),
        scope: scope.to_string(),
        aud: key.token_uri.clone(),
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| DriveError::InvalidCredentials(format!("private_key: {}", e)))?;

    encode(&header, &claims, &signing_key).map_err(|e| DriveError::Token(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    pub fn new(value: String, lifetime: Duration, now: Instant) -> Self {
        Self {
            value,
            expires_at: now + lifetime,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// True while the token stays valid beyond the refresh margin.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN < self.expires_at
    }
}

/// Exchanges signed assertions for bearer tokens and caches the result.
pub struct TokenSource {
    key: ServiceAccountKey,
    scope: String,
    http: Client,
    cached: Option<AccessToken>,
}

impl TokenSource {
    pub fn new(key: ServiceAccountKey, scope: String, http: Client) -> Self {
        Self {
            key,
            scope,
            http,
            cached: None,
        }
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Current bearer token, fetching a new one when the cached token is
    /// missing or about to expire.
    pub fn token(&mut self) -> Result<&str, DriveError> {
        let fresh = self
            .cached
            .as_ref()
            .is_some_and(|t| t.is_fresh(Instant::now()));

        if !fresh {
            let token = self.fetch()?;
            self.cached = Some(token);
        }

        self.cached
            .as_ref()
            .map(AccessToken::value)
            .ok_or_else(|| DriveError::Token("no access token cached".to_string()))
    }

    fn fetch(&self) -> Result<AccessToken, DriveError> {
        let assertion = build_assertion(&self.key, &self.scope, Utc::now().timestamp())?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{} ({})", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(DriveError::Token(format!("HTTP {}: {}", status.as_u16(), reason)));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        tracing::debug!(expires_in = parsed.expires_in, "Access token issued");

        Ok(AccessToken::new(
            parsed.access_token,
            Duration::from_secs(parsed.expires_in),
            Instant::now(),
        ))
    }
}
