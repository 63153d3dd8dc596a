//! Refresh-token cookie handling
//!
//! The refresh token never appears in a response body; it is set as an
//! HttpOnly cookie on login/refresh and cleared on logout.

use axum::http::{header, HeaderMap, HeaderValue};
use cookie::{time::Duration, Cookie, SameSite};
use recicla_core::AuthConfig;

/// Cookie name for the refresh token
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Build the `Set-Cookie` value that stores a refresh token
///
/// HttpOnly, SameSite=Lax, Path=/, Max-Age = refresh lifetime, Secure per
/// configuration.
pub fn refresh_cookie(token: &str, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(config.refresh_max_age_secs()))
        .build()
}

/// Build the `Set-Cookie` value that removes the refresh cookie
pub fn clear_refresh_cookie(config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .build()
}

/// Render a cookie as a `Set-Cookie` header value
pub fn set_cookie_header(cookie: &Cookie<'_>) -> Option<HeaderValue> {
    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// Extract the refresh token from the request `Cookie` headers
///
/// Empty values count as absent.
pub fn extract_refresh_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == REFRESH_COOKIE_NAME && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_attributes() {
        let config = AuthConfig::default();
        let cookie = refresh_cookie("a.b.c", &config);

        assert_eq!(cookie.name(), REFRESH_COOKIE_NAME);
        assert_eq!(cookie.value(), "a.b.c");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(15 * 86_400)));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_secure_flag_follows_config() {
        let config = AuthConfig {
            cookie_secure: true,
            ..Default::default()
        };
        let header = set_cookie_header(&refresh_cookie("t", &config)).unwrap();
        let header = header.to_str().unwrap();

        assert!(header.contains("Secure"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let header = set_cookie_header(&clear_refresh_cookie(&AuthConfig::default())).unwrap();
        let header = header.to_str().unwrap();

        assert!(header.starts_with("refresh_token=;"));
        assert!(header.contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_refresh_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; refresh_token=x.y.z; lang=pt"),
        );
        assert_eq!(extract_refresh_token(&headers), Some("x.y.z".to_string()));
    }

    #[test]
    fn test_extract_refresh_token_missing_or_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_refresh_token(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("refresh_token="));
        assert_eq!(extract_refresh_token(&headers), None);
    }
}
