use url::Url;

use crate::error::ValidationError;

/// True iff `input` parses as a URL whose scheme is http or https.
pub fn is_valid_url(input: &str) -> bool {
    Url::parse(input)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Trim and check a user-entered URL. Returns the trimmed URL to submit.
pub fn validate_url_input(raw: &str) -> Result<String, ValidationError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    if !is_valid_url(url) {
        return Err(ValidationError::InvalidUrl);
    }
    Ok(url.to_string())
}
