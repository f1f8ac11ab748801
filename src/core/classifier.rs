//! Cell classification
//!
//! Pure predicates over a single string value. The table view uses them to decorate
//! cells, and website discovery in the enrichment pipeline shares the same URL rules.
//! Nothing here performs I/O or fails; unmatched input classifies as plain text.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    /// National (`0X`) or international (`+33`, `0033`, `33`) numbers: a leading digit
    /// 1-9 followed by four digit pairs, optionally separated by spaces, dots or dashes.
    static ref PHONE_RE: Regex =
        Regex::new(r"(?:(?:\+|00)?33|0)\s*[1-9](?:[\s.-]*[0-9]{2}){4}").unwrap();
    static ref URL_RE: Regex = Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*$").unwrap();
    /// `label.label...tld`: labels of 1-63 alphanumerics/hyphens, no hyphen at either end
    static ref DOMAIN_RE: Regex = Regex::new(
        r"(?i)^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$"
    )
    .unwrap();
    static ref LOOSE_PHONE_RE: Regex = Regex::new(r"^\+?[0-9][0-9\s-]+[0-9]$").unwrap();
}

/// Country calling code of the default numbering scheme
const COUNTRY_CODE: &str = "33";
/// Significant digits after the country or trunk prefix
const SIGNIFICANT_DIGITS: usize = 9;

/// Classification of a table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellKind {
    /// Phone number, normalized to `+33XXXXXXXXX`
    Phone(String),
    /// Absolute http(s) URL
    Url(String),
    PlainText,
}

impl CellKind {
    pub fn label(&self) -> &'static str {
        match self {
            CellKind::Phone(_) => "phone",
            CellKind::Url(_) => "url",
            CellKind::PlainText => "text",
        }
    }

    /// Link to open for this cell, if any
    pub fn link(&self) -> Option<String> {
        match self {
            CellKind::Phone(number) => Some(whatsapp_link(number)),
            CellKind::Url(url) => Some(url.clone()),
            CellKind::PlainText => None,
        }
    }
}

/// Classify one cell value
pub fn classify(value: &str) -> CellKind {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return CellKind::PlainText;
    }

    if let Some(candidate) = find_phone(trimmed) {
        if is_valid_phone_number(candidate) {
            return CellKind::Phone(format_phone_number(candidate));
        }
    }

    if URL_RE.is_match(trimmed) || is_domain_like(trimmed) {
        let formatted = format_url(trimmed);
        if is_valid_url(&formatted) {
            return CellKind::Url(formatted);
        }
    }

    CellKind::PlainText
}

/// First phone-shaped substring that is not immediately followed by another digit
pub fn find_phone(text: &str) -> Option<&str> {
    let mut start = 0;
    while start <= text.len() {
        let m = PHONE_RE.find_at(text, start)?;
        let followed_by_digit = text[m.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());
        if !followed_by_digit {
            return Some(m.as_str());
        }
        start = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Significant digits once the international (`0033`, `33`) or trunk (`0`) prefix is removed
fn national_part(digits: &str) -> Option<&str> {
    let international = format!("00{COUNTRY_CODE}");
    digits
        .strip_prefix(international.as_str())
        .or_else(|| digits.strip_prefix(COUNTRY_CODE))
        .or_else(|| digits.strip_prefix('0'))
}

/// Normalize a phone number to `+33` followed by its significant digits
pub fn format_phone_number(phone: &str) -> String {
    let digits = digits_only(phone);
    let national = national_part(&digits).unwrap_or(&digits);
    let end = national.len().min(SIGNIFICANT_DIGITS);
    format!("+{COUNTRY_CODE}{}", &national[..end])
}

/// Exactly nine significant digits with a leading 1-9 after a recognised prefix
pub fn is_valid_phone_number(phone: &str) -> bool {
    let digits = digits_only(phone);
    match national_part(&digits) {
        Some(national) => {
            national.len() == SIGNIFICANT_DIGITS
                && national.starts_with(|c: char| ('1'..='9').contains(&c))
        }
        None => false,
    }
}

/// Deep link opening a chat with the number
pub fn whatsapp_link(formatted_phone: &str) -> String {
    format!("https://wa.me/{}", digits_only(formatted_phone))
}

/// Value starts with an explicit `http://` or `https://` scheme
pub fn has_http_scheme(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Bare `label.tld` style token
pub fn is_domain_like(value: &str) -> bool {
    DOMAIN_RE.is_match(value)
}

/// Prefix `https://` when the value carries no scheme
pub fn format_url(value: &str) -> String {
    let trimmed = value.trim();
    if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Parses as an absolute http(s) URL whose host looks routable
pub fn is_valid_url(value: &str) -> bool {
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host_str() {
        Some(host) => host.contains('.') || host == "localhost",
        None => false,
    }
}

/// Candidate for website fetching: explicit http(s) scheme and none of the
/// disallowed markers (compared case-insensitively).
pub fn is_fetchable_url<S: AsRef<str>>(value: &str, disallowed_markers: &[S]) -> bool {
    if !has_http_scheme(value) {
        return false;
    }
    let lower = value.to_lowercase();
    !disallowed_markers
        .iter()
        .any(|marker| !marker.as_ref().is_empty() && lower.contains(&marker.as_ref().to_lowercase()))
}

/// Display classification used by the detail view's data tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailValueKind {
    Email,
    Url,
    Phone,
    Text,
}

impl DetailValueKind {
    pub fn of(value: &str) -> Self {
        if value.contains('@') {
            DetailValueKind::Email
        } else if value.starts_with("http") {
            DetailValueKind::Url
        } else if LOOSE_PHONE_RE.is_match(value) {
            DetailValueKind::Phone
        } else {
            DetailValueKind::Text
        }
    }

    /// Link target for a value of this kind
    pub fn href(&self, value: &str) -> Option<String> {
        match self {
            DetailValueKind::Email => Some(format!("mailto:{value}")),
            DetailValueKind::Url => Some(value.to_string()),
            DetailValueKind::Phone => Some(format!("tel:{value}")),
            DetailValueKind::Text => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone_number() {
        assert_eq!(format_phone_number("0612345678"), "+33612345678");
        assert_eq!(format_phone_number("+33 6 12 34 56 78"), "+33612345678");
        assert_eq!(format_phone_number("0033 6 12 34 56 78"), "+33612345678");
        assert_eq!(format_phone_number("06.12.34.56.78"), "+33612345678");
    }

    #[test]
    fn test_is_valid_phone_number() {
        assert!(is_valid_phone_number("+33 6 12 34 56 78"));
        assert!(is_valid_phone_number("0612345678"));
        assert!(is_valid_phone_number("01-23-45-67-89"));
        assert!(!is_valid_phone_number("12345"));
        assert!(!is_valid_phone_number("0012345678"));
        assert!(!is_valid_phone_number("061234567"));
        assert!(!is_valid_phone_number(""));
    }

    #[test]
    fn test_find_phone_rejects_trailing_digit() {
        assert_eq!(find_phone("call 06 12 34 56 78 now"), Some("06 12 34 56 78"));
        assert_eq!(find_phone("061234567899"), None);
        assert_eq!(find_phone("no number here"), None);
    }

    #[test]
    fn test_classify_phone() {
        assert_eq!(
            classify("  06 12 34 56 78 "),
            CellKind::Phone("+33612345678".to_string())
        );
        assert_eq!(classify("12345"), CellKind::PlainText);
    }

    #[test]
    fn test_classify_urls_and_domains() {
        assert_eq!(
            classify("https://example.com/about"),
            CellKind::Url("https://example.com/about".to_string())
        );
        assert_eq!(
            classify("example.com"),
            CellKind::Url("https://example.com".to_string())
        );
        assert_eq!(
            classify("shop.example.co.uk"),
            CellKind::Url("https://shop.example.co.uk".to_string())
        );
        assert_eq!(classify("-bad-.com"), CellKind::PlainText);
        assert_eq!(classify("hello world"), CellKind::PlainText);
        assert_eq!(classify("3.14"), CellKind::PlainText);
        assert_eq!(classify(""), CellKind::PlainText);
    }

    #[test]
    fn test_domain_label_length() {
        let long_label = "a".repeat(64);
        assert!(!is_domain_like(&format!("{long_label}.com")));
        let ok_label = "a".repeat(63);
        assert!(is_domain_like(&format!("{ok_label}.com")));
        assert!(is_domain_like("a.io"));
    }

    #[test]
    fn test_is_fetchable_url() {
        let markers = ["bing"];
        assert!(is_fetchable_url("https://acme.fr", &markers));
        assert!(is_fetchable_url("HTTP://ACME.FR", &markers));
        assert!(!is_fetchable_url("https://www.bing.com/search?q=acme", &markers));
        assert!(!is_fetchable_url("https://www.BING.com/ck/a?", &markers));
        assert!(!is_fetchable_url("acme.fr", &markers));
        assert!(!is_fetchable_url("ftp://acme.fr", &markers));
    }

    #[test]
    fn test_whatsapp_link() {
        let kind = classify("0612345678");
        assert_eq!(kind.link().as_deref(), Some("https://wa.me/33612345678"));
        assert_eq!(kind.label(), "phone");
    }

    #[test]
    fn test_detail_value_kind() {
        assert_eq!(DetailValueKind::of("jane@acme.fr"), DetailValueKind::Email);
        assert_eq!(DetailValueKind::of("https://acme.fr"), DetailValueKind::Url);
        assert_eq!(DetailValueKind::of("+33 6 12-34"), DetailValueKind::Phone);
        assert_eq!(DetailValueKind::of("Acme"), DetailValueKind::Text);
        assert_eq!(
            DetailValueKind::Email.href("jane@acme.fr").as_deref(),
            Some("mailto:jane@acme.fr")
        );
        assert_eq!(DetailValueKind::Text.href("Acme"), None);
    }
}
