use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CallbackError {
    #[error("Authentication failed: {0}")]
    Denied(String),

    #[error("No authentication token received. Please try logging in again.")]
    MissingToken,

    #[error("Invalid callback URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Extract the bearer token from the OAuth callback URL.
///
/// The backend redirects to `<app>/login/callback?token=...` on success and
/// `?error=...` on failure. An `error` parameter wins over a `token`.
pub fn parse_callback(callback_url: &str) -> Result<String, CallbackError> {
    let url = Url::parse(callback_url.trim())?;

    let mut token = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => return Err(CallbackError::Denied(value.into_owned())),
            "token" if !value.trim().is_empty() => token = Some(value.trim().to_string()),
            _ => {}
        }
    }

    token.ok_or(CallbackError::MissingToken)
}
