/// Token cookies
///
/// Both tokens travel as `HttpOnly`, `Secure`, `SameSite=None` cookies
/// scoped to the API path.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
pub const COOKIE_PATH: &str = "/api";

fn token_cookie(name: &'static str, value: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(name, value)
        .http_only(true)
        .path(COOKIE_PATH)
        .max_age(Duration::seconds(max_age_seconds))
        .same_site(SameSite::None)
        .secure(true)
        .finish()
}

pub fn access_token_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    token_cookie(ACCESS_TOKEN_COOKIE, token, max_age_seconds)
}

pub fn refresh_token_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    token_cookie(REFRESH_TOKEN_COOKIE, token, max_age_seconds)
}

/// Cookie instructing the browser to drop `name`
pub fn expired_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = token_cookie(name, String::new(), 0);
    cookie.make_removal();
    cookie
}

/// Access and refresh token values sent with the request, if any
pub fn token_pair(req: &HttpRequest) -> (Option<String>, Option<String>) {
    let value = |name| req.cookie(name).map(|c| c.value().to_string());
    (value(ACCESS_TOKEN_COOKIE), value(REFRESH_TOKEN_COOKIE))
}
