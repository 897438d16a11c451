use axum::http::{HeaderMap, HeaderValue};

/// Extracts a named cookie from the request's Cookie header.
pub fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name {
                return Some(v[1..].to_string());
            }
        }
    }
    None
}

/// Builds a Set-Cookie value: HttpOnly, SameSite=Lax, scoped to path /.
///
/// Values are JWTs, which only contain header-safe characters.
pub fn build(name: &str, value: &str, max_age_secs: i64, secure: bool) -> HeaderValue {
    let secure_attr = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}{secure_attr}"
    ))
    .unwrap()
}
