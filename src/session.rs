//! Signed-in session derived from a browser cookie header

use crate::error::{Error, Result};

const UID_COOKIE: &str = "DedeUserID";
const CSRF_COOKIE: &str = "bili_jct";

/// Credentials of the signed-in account
///
/// The raw cookie header is forwarded on credentialed requests. The CSRF token
/// is the `bili_jct` cookie and the account id is `DedeUserID`.
#[derive(Clone)]
pub struct Session {
    uid: u64,
    csrf_token: String,
    cookie_header: String,
}

impl Session {
    /// Parse a `Cookie` header (`name=value; name=value`)
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the account id or CSRF token is missing,
    /// or the account id is not numeric.
    pub fn from_cookie_header(header: &str) -> Result<Self> {
        let csrf_token = cookie_value(header, CSRF_COOKIE)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                Error::config(format!("cookie has no {CSRF_COOKIE} value"), "session.cookie")
            })?;

        let uid = cookie_value(header, UID_COOKIE)
            .ok_or_else(|| {
                Error::config(format!("cookie has no {UID_COOKIE} value"), "session.cookie")
            })?
            .parse::<u64>()
            .map_err(|e| Error::config(format!("{UID_COOKIE} is not numeric: {e}"), "session.cookie"))?;

        Ok(Self {
            uid,
            csrf_token: csrf_token.to_string(),
            cookie_header: header.trim().to_string(),
        })
    }

    /// Account id of the signed-in user
    pub fn uid(&self) -> u64 {
        self.uid
    }

    /// CSRF token required on state-changing requests
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// Header value for the `Cookie` request header
    pub fn cookie_header(&self) -> &str {
        &self.cookie_header
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("uid", &self.uid)
            .field("csrf_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.trim())
    })
}
