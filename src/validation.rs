//! Input checks shared by the registration, company and invite endpoints.

use regex::Regex;
use std::sync::LazyLock;

use crate::shared::AppError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static HTTP_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+").expect("url pattern is valid"));

pub const MIN_PASSWORD_LEN: usize = 6;

pub const COMPANY_SIZES: [&str; 4] = ["1-10", "11-50", "51-200", "200+"];

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_http_url(url: &str) -> bool {
    HTTP_URL_RE.is_match(url)
}

pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Returns the trimmed value, or a 400 with `message` when it is missing or blank
pub fn required(value: Option<&str>, message: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::BadRequest(message.to_string())),
    }
}

pub fn required_email(value: Option<&str>, message: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if is_valid_email(v) => Ok(v.to_string()),
        _ => Err(AppError::BadRequest(message.to_string())),
    }
}

pub fn password(value: Option<&str>) -> Result<String, AppError> {
    match value {
        Some(v) if v.chars().count() >= MIN_PASSWORD_LEN => Ok(v.to_string()),
        _ => Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ))),
    }
}

/// Empty strings from form posts are stored as NULL
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("jane@example.com", true)]
    #[case("first.last+tag@sub.example.co", true)]
    #[case("no-at-sign.example.com", false)]
    #[case("missing@tld", false)]
    #[case("spaces in@example.com", false)]
    #[case("", false)]
    fn test_is_valid_email(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_valid_email(input), expected);
    }

    #[rstest]
    #[case("https://acme.io", true)]
    #[case("http://acme.io/careers", true)]
    #[case("ftp://acme.io", false)]
    #[case("acme.io", false)]
    #[case("https://", false)]
    fn test_is_http_url(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_http_url(input), expected);
    }

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required(Some("  Acme "), "name").unwrap(), "Acme");
        assert!(matches!(
            required(Some("   "), "Name is required"),
            Err(AppError::BadRequest(msg)) if msg == "Name is required"
        ));
        assert!(required(None, "Name is required").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(password(Some("12345")).is_err());
        assert!(password(None).is_err());
        assert_eq!(password(Some("123456")).unwrap(), "123456");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("".to_string())), None);
        assert_eq!(non_blank(Some(" ".to_string())), None);
        assert_eq!(non_blank(Some("x".to_string())), Some("x".to_string()));
    }
}
