use std::collections::HashMap;

use tower_cookies::{
    Cookie, Cookies,
    cookie::{
        SameSite,
        time::{Duration, OffsetDateTime},
    },
};

/// The name of the cookie carrying the session token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// How long the browser keeps the login cookie.
pub const LOGIN_COOKIE_MAX_AGE_DAYS: i64 = 7;

/// Read access to the cookies sent with a request.
pub trait CookieSource {
    fn cookie_value(&self, name: &str) -> Option<String>;
}

impl CookieSource for Cookies {
    fn cookie_value(&self, name: &str) -> Option<String> {
        self.get(name).map(|cookie| cookie.value().to_string())
    }
}

impl CookieSource for HashMap<String, String> {
    fn cookie_value(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Moves the session token in and out of the `access_token` cookie.
///
/// The only place that builds that cookie: login sets it, logout clears it,
/// the guard reads it.
#[derive(Debug, Clone, Copy)]
pub struct CookieTransport {
    secure: bool,
}

impl CookieTransport {
    /// Creates a transport; `secure` adds the `Secure` attribute.
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, value);
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Strict);
        cookie.set_path("/");
        cookie
    }

    /// The cookie set on successful login.
    pub fn login_cookie(&self, token: String) -> Cookie<'static> {
        let mut cookie = self.base_cookie(token);
        cookie.set_max_age(Duration::days(LOGIN_COOKIE_MAX_AGE_DAYS));
        cookie
    }

    /// The cookie that makes the browser drop the session.
    pub fn logout_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.base_cookie(String::new());
        cookie.set_max_age(Duration::ZERO);
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie
    }

    /// Reads the session token, `None` when no session cookie was sent.
    pub fn extract_token<S>(&self, source: &S) -> Option<String>
    where
        S: CookieSource + ?Sized,
    {
        source
            .cookie_value(ACCESS_TOKEN_COOKIE)
            .filter(|value| !value.is_empty())
    }

    /// Adds the login cookie to the outgoing response.
    pub fn set_login(&self, cookies: &Cookies, token: String) {
        cookies.add(self.login_cookie(token));
    }

    /// Adds the clearing cookie to the outgoing response.
    ///
    /// Uses `add` rather than `remove`: `remove` emits nothing when the
    /// request carried no cookie, and sign-out must always clear.
    pub fn clear(&self, cookies: &Cookies) {
        cookies.add(self.logout_cookie());
    }
}
