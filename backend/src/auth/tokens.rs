use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

use super::cookies;

const TYP_ACCESS: &str = "access";
const TYP_REFRESH: &str = "refresh";

/// Authenticated caller identity derived from a verified access token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// What the session resolver concluded about a request.
#[derive(Debug, Clone)]
pub enum SessionState {
    Authenticated(Session),
    Anonymous,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Freshly minted access + refresh tokens, ready to be set as cookies.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Result of resolving a request's cookies: the session state, plus a
/// rotated token pair when the credentials were refreshed.
#[derive(Debug)]
pub struct Resolution {
    pub state: SessionState,
    pub refreshed: Option<TokenPair>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iss: String,
    typ: String,
    exp: u64,
    iat: u64,
}

/// Verifies and re-issues the HS256 session cookies shared with the
/// identity provider. Tokens are never persisted server-side.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    refresh_margin: Duration,
    access_cookie: String,
    refresh_cookie: String,
    secure_cookies: bool,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            access_ttl: Duration::seconds(config.access_ttl_secs as i64),
            refresh_ttl: Duration::seconds(config.refresh_ttl_secs as i64),
            refresh_margin: Duration::seconds(config.refresh_margin_secs as i64),
            access_cookie: config.access_cookie.clone(),
            refresh_cookie: config.refresh_cookie.clone(),
            secure_cookies: config.secure_cookies,
        }
    }

    /// Resolves the request's cookies into a session.
    ///
    /// A valid access token authenticates the request directly; when its
    /// remaining lifetime is inside the refresh margin a rotated pair is
    /// minted alongside. A missing, malformed or expired access token falls
    /// through to the refresh token, which mints a rotated pair on success.
    /// Anything else is anonymous. This never fails the request.
    pub fn resolve(&self, headers: &HeaderMap) -> Resolution {
        if let Some(token) = cookies::request_cookie(headers, &self.access_cookie) {
            if let Some(claims) = self.decode(&token, TYP_ACCESS) {
                if let Some(expires_at) = DateTime::from_timestamp(claims.exp as i64, 0) {
                    let refreshed = if expires_at - Utc::now() <= self.refresh_margin {
                        self.mint(&claims.sub, &claims.email)
                    } else {
                        None
                    };
                    return Resolution {
                        state: SessionState::Authenticated(Session {
                            user_id: claims.sub,
                            email: claims.email,
                            expires_at,
                        }),
                        refreshed,
                    };
                }
            }
        }

        if let Some(token) = cookies::request_cookie(headers, &self.refresh_cookie) {
            if let Some(claims) = self.decode(&token, TYP_REFRESH) {
                if let Some(pair) = self.mint(&claims.sub, &claims.email) {
                    return Resolution {
                        state: SessionState::Authenticated(Session {
                            user_id: claims.sub,
                            email: claims.email,
                            expires_at: Utc::now() + self.access_ttl,
                        }),
                        refreshed: Some(pair),
                    };
                }
            }
        }

        Resolution {
            state: SessionState::Anonymous,
            refreshed: None,
        }
    }

    /// Mints an access + refresh token pair for the given identity.
    pub fn issue_pair(&self, user_id: &str, email: &str) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        Ok(TokenPair {
            access: self.encode_token(user_id, email, TYP_ACCESS, now, self.access_ttl)?,
            refresh: self.encode_token(user_id, email, TYP_REFRESH, now, self.refresh_ttl)?,
        })
    }

    /// Appends both Set-Cookie headers for a minted pair.
    pub fn append_cookies(&self, headers: &mut HeaderMap, pair: &TokenPair) {
        headers.append(
            header::SET_COOKIE,
            cookies::build(
                &self.access_cookie,
                &pair.access,
                self.access_ttl.num_seconds(),
                self.secure_cookies,
            ),
        );
        headers.append(
            header::SET_COOKIE,
            cookies::build(
                &self.refresh_cookie,
                &pair.refresh,
                self.refresh_ttl.num_seconds(),
                self.secure_cookies,
            ),
        );
    }

    fn decode(&self, token: &str, expected_typ: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        // No clock leeway; the refresh margin is the only slack.
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).ok()?;
        if data.claims.typ != expected_typ {
            return None;
        }
        Some(data.claims)
    }

    fn mint(&self, user_id: &str, email: &str) -> Option<TokenPair> {
        match self.issue_pair(user_id, email) {
            Ok(pair) => Some(pair),
            Err(e) => {
                tracing::warn!("Failed to mint token pair for {}: {}", user_id, e);
                None
            }
        }
    }

    fn encode_token(
        &self,
        user_id: &str,
        email: &str,
        typ: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iss: self.issuer.clone(),
            typ: typ.to_string(),
            exp: (now + ttl).timestamp() as u64,
            iat: now.timestamp() as u64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-at-least-32-bytes-long";
    const TEST_ISSUER: &str = "giftday-test";

    fn test_service() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            issuer: TEST_ISSUER.to_string(),
            access_ttl_secs: 3600,
            refresh_ttl_secs: 1209600,
            refresh_margin_secs: 60,
            access_cookie: "giftday_access".to_string(),
            refresh_cookie: "giftday_refresh".to_string(),
            secure_cookies: false,
        })
    }

    fn mint_raw(secret: &str, issuer: &str, typ: &str, expires_in_secs: i64) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: "user-1".to_string(),
            email: "one@example.com".to_string(),
            iss: issuer.to_string(),
            typ: typ.to_string(),
            exp: (now + Duration::seconds(expires_in_secs)).timestamp() as u64,
            iat: now.timestamp() as u64,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn headers_with_cookies(cookies: &[(&str, &str)]) -> HeaderMap {
        let joined = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        let mut headers = HeaderMap::new();
        headers.insert("cookie", joined.parse().unwrap());
        headers
    }

    #[test]
    fn test_resolve_without_cookies_is_anonymous() {
        let resolution = test_service().resolve(&HeaderMap::new());
        assert!(!resolution.state.is_authenticated());
        assert!(resolution.refreshed.is_none());
    }

    #[test]
    fn test_resolve_valid_access_token() {
        let service = test_service();
        let pair = service.issue_pair("user-1", "one@example.com").unwrap();
        let headers = headers_with_cookies(&[("giftday_access", &pair.access)]);

        let resolution = service.resolve(&headers);
        match resolution.state {
            SessionState::Authenticated(session) => {
                assert_eq!(session.user_id, "user-1");
                assert_eq!(session.email, "one@example.com");
                assert!(session.expires_at > Utc::now());
            }
            SessionState::Anonymous => panic!("expected authenticated session"),
        }
        // Fresh token, well outside the refresh margin.
        assert!(resolution.refreshed.is_none());
    }

    #[test]
    fn test_resolve_garbage_access_token_is_anonymous() {
        let service = test_service();
        let headers = headers_with_cookies(&[("giftday_access", "not-a-jwt")]);
        assert!(!service.resolve(&headers).state.is_authenticated());
    }

    #[test]
    fn test_resolve_rejects_foreign_signature() {
        let service = test_service();
        let forged = mint_raw("another-secret-of-sufficient-size!", TEST_ISSUER, "access", 3600);
        let headers = headers_with_cookies(&[("giftday_access", &forged)]);
        assert!(!service.resolve(&headers).state.is_authenticated());
    }

    #[test]
    fn test_resolve_rejects_wrong_issuer() {
        let service = test_service();
        let token = mint_raw(TEST_SECRET, "someone-else", "access", 3600);
        let headers = headers_with_cookies(&[("giftday_access", &token)]);
        assert!(!service.resolve(&headers).state.is_authenticated());
    }

    #[test]
    fn test_resolve_rejects_refresh_token_in_access_cookie() {
        let service = test_service();
        let token = mint_raw(TEST_SECRET, TEST_ISSUER, "refresh", 3600);
        let headers = headers_with_cookies(&[("giftday_access", &token)]);
        assert!(!service.resolve(&headers).state.is_authenticated());
    }

    #[test]
    fn test_resolve_expired_access_with_valid_refresh_rotates() {
        let service = test_service();
        let expired = mint_raw(TEST_SECRET, TEST_ISSUER, "access", -300);
        let refresh = mint_raw(TEST_SECRET, TEST_ISSUER, "refresh", 86400);
        let headers = headers_with_cookies(&[
            ("giftday_access", &expired),
            ("giftday_refresh", &refresh),
        ]);

        let resolution = service.resolve(&headers);
        match resolution.state {
            SessionState::Authenticated(session) => assert_eq!(session.user_id, "user-1"),
            SessionState::Anonymous => panic!("expected refresh to authenticate"),
        }
        let pair = resolution.refreshed.expect("expected a rotated pair");

        // The rotated pair stands on its own.
        let headers = headers_with_cookies(&[("giftday_access", &pair.access)]);
        assert!(service.resolve(&headers).state.is_authenticated());
    }

    #[test]
    fn test_resolve_expired_access_and_refresh_is_anonymous() {
        let service = test_service();
        let expired_access = mint_raw(TEST_SECRET, TEST_ISSUER, "access", -300);
        let expired_refresh = mint_raw(TEST_SECRET, TEST_ISSUER, "refresh", -300);
        let headers = headers_with_cookies(&[
            ("giftday_access", &expired_access),
            ("giftday_refresh", &expired_refresh),
        ]);

        let resolution = service.resolve(&headers);
        assert!(!resolution.state.is_authenticated());
        assert!(resolution.refreshed.is_none());
    }

    #[test]
    fn test_resolve_rejects_access_token_in_refresh_cookie() {
        let service = test_service();
        let access = mint_raw(TEST_SECRET, TEST_ISSUER, "access", 3600);
        let headers = headers_with_cookies(&[("giftday_refresh", &access)]);
        assert!(!service.resolve(&headers).state.is_authenticated());
    }

    #[test]
    fn test_resolve_near_expiry_access_mints_fresh_pair() {
        let service = test_service();
        let token = mint_raw(TEST_SECRET, TEST_ISSUER, "access", 30);
        let headers = headers_with_cookies(&[("giftday_access", &token)]);

        let resolution = service.resolve(&headers);
        assert!(resolution.state.is_authenticated());
        let pair = resolution.refreshed.expect("expected near-expiry refresh");

        let headers = headers_with_cookies(&[("giftday_access", &pair.access)]);
        let rotated = service.resolve(&headers);
        assert!(rotated.state.is_authenticated());
        assert!(rotated.refreshed.is_none());
    }

    #[test]
    fn test_append_cookies_sets_both() {
        let service = test_service();
        let pair = service.issue_pair("user-1", "one@example.com").unwrap();

        let mut headers = HeaderMap::new();
        service.append_cookies(&mut headers, &pair);

        let values: Vec<_> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(values.len(), 2);
        assert!(values[0].starts_with("giftday_access="));
        assert!(values[1].starts_with("giftday_refresh="));
        assert!(values.iter().all(|v| v.contains("HttpOnly")));
    }
}
