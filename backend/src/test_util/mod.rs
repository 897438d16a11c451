use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::config::{
    AuthConfig, Config, CorsConfig, DatabaseConfig, LoggingConfig, RoutesConfig,
};
use crate::models::{Gift, User};
use crate::{AppState, GiftStore, PathPolicy, TokenService};

pub const TEST_JWT_SECRET: &str = "test-secret-at-least-32-bytes-long";

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 8080,
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            issuer: "giftday-test".to_string(),
            access_ttl_secs: 3600,
            refresh_ttl_secs: 1209600,
            refresh_margin_secs: 60,
            access_cookie: "giftday_access".to_string(),
            refresh_cookie: "giftday_refresh".to_string(),
            secure_cookies: false,
        },
        database: DatabaseConfig {
            url: ":memory:".to_string(),
        },
        routes: RoutesConfig::default(),
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        cors: CorsConfig {
            origins: "*".to_string(),
        },
    }
}

pub fn create_test_state() -> Arc<AppState> {
    let config = test_config();
    let tokens = TokenService::new(&config.auth);
    let store = GiftStore::new(&config.database.url).expect("Failed to open test store");
    let policy = PathPolicy::new(&config.routes);

    Arc::new(AppState {
        config,
        tokens,
        store,
        policy,
    })
}

pub fn seed_user(state: &AppState, id: &str, email: &str, is_admin: bool) -> User {
    let user = User {
        id: id.to_string(),
        email: email.to_string(),
        birthday: None,
        is_admin,
        created_at: Utc::now(),
    };
    state.store.insert_user(&user).expect("Failed to seed user");
    user
}

pub fn seed_gift(state: &AppState, name: &str) -> Gift {
    state
        .store
        .create_gift(
            name.to_string(),
            format!("{name} description"),
            Some(format!("https://example.com/{name}.jpg")),
        )
        .expect("Failed to seed gift")
}

/// Cookie header value carrying a fresh session for the given user.
pub fn session_cookie(state: &AppState, user_id: &str, email: &str) -> String {
    let pair = state
        .tokens
        .issue_pair(user_id, email)
        .expect("Failed to mint token pair");
    format!("{}={}", state.config.auth.access_cookie, pair.access)
}

/// Cookie header value with an expired access token and a valid refresh
/// token, the state a returning browser is usually in.
pub fn stale_session_cookie(state: &AppState, user_id: &str, email: &str) -> String {
    let expired = mint_token(&state.config.auth, user_id, email, "access", -300);
    let refresh = mint_token(&state.config.auth, user_id, email, "refresh", 86400);
    format!(
        "{}={}; {}={}",
        state.config.auth.access_cookie, expired, state.config.auth.refresh_cookie, refresh
    )
}

#[derive(serde::Serialize)]
struct TestClaims {
    sub: String,
    email: String,
    iss: String,
    typ: String,
    exp: u64,
    iat: u64,
}

pub fn mint_token(
    config: &AuthConfig,
    user_id: &str,
    email: &str,
    typ: &str,
    expires_in_secs: i64,
) -> String {
    let now = Utc::now();
    let claims = TestClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iss: config.issuer.clone(),
        typ: typ.to_string(),
        exp: (now + Duration::seconds(expires_in_secs)).timestamp() as u64,
        iat: now.timestamp() as u64,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .expect("Failed to encode JWT")
}
