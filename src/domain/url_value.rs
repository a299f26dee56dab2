//! URL value object used for return-path links.
//!
//! Every input is resolved against a fixed placeholder origin so relative
//! paths such as `/app/page?x=1` parse the same way absolute URLs do. When
//! the value is written back out it keeps the most compact equivalent form:
//! relative inputs stay relative, absolute inputs keep their host.

use std::fmt;
use std::sync::LazyLock;
use url::Url;

/// Origin that relative inputs are resolved against. Never leaks into output
/// unless the caller spelled it out in the input.
pub const PLACEHOLDER_ORIGIN: &str = "http://www.example.com";

const PLACEHOLDER_HOST: &str = "www.example.com";

static PLACEHOLDER: LazyLock<Url> =
    LazyLock::new(|| Url::parse(PLACEHOLDER_ORIGIN).expect("placeholder origin is a valid URL"));

/// Returned when an input cannot be read as a URL or path at all.
#[derive(Debug, thiserror::Error)]
#[error("Invalid URL '{input}': {source}")]
pub struct InvalidUrlError {
    pub input: String,
    #[source]
    pub source: url::ParseError,
}

/// A single URL, relative or absolute, with query parameter access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlValue {
    raw: String,
    parsed: Url,
    names_placeholder: bool,
}

impl UrlValue {
    /// Parses `input` relative to [`PLACEHOLDER_ORIGIN`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUrlError`] when the input is not syntactically a URL,
    /// for example an absolute URL whose host contains illegal characters.
    pub fn parse(input: &str) -> Result<Self, InvalidUrlError> {
        let parsed = PLACEHOLDER.join(input).map_err(|source| InvalidUrlError {
            input: input.to_string(),
            source,
        })?;

        let names_placeholder =
            parsed.host_str() == Some(PLACEHOLDER_HOST) && has_authority(input);

        Ok(Self {
            raw: input.to_string(),
            parsed,
            names_placeholder,
        })
    }

    /// The input exactly as it was given.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Percent-encoded path component, always starting with `/` for web URLs.
    pub fn path(&self) -> &str {
        self.parsed.path()
    }

    /// True when the value carries no real host and serializes as path + query.
    pub fn is_relative(&self) -> bool {
        self.parsed.host_str() == Some(PLACEHOLDER_HOST) && !self.names_placeholder
    }

    /// True when both values point at the same host (or both are relative)
    /// and the same path. Query and fragment are ignored.
    pub fn same_location(&self, other: &UrlValue) -> bool {
        if self.is_relative() != other.is_relative() {
            return false;
        }
        if !self.is_relative() && self.parsed.origin() != other.parsed.origin() {
            return false;
        }
        self.path() == other.path()
    }

    /// Reads the first value of query parameter `name`.
    pub fn get_param(&self, name: &str) -> Option<String> {
        self.parsed
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Sets query parameter `name` to `value`.
    ///
    /// The first existing occurrence is overwritten in place and any further
    /// duplicates are dropped; otherwise the parameter is appended. Unrelated
    /// parameters keep their order.
    pub fn set_param(&mut self, name: &str, value: &str) -> &mut Self {
        let mut replaced = false;
        let mut pairs: Vec<(String, String)> = Vec::new();

        for (key, current) in self.parsed.query_pairs().into_owned() {
            if key != name {
                pairs.push((key, current));
            } else if !replaced {
                pairs.push((key, value.to_string()));
                replaced = true;
            }
        }

        if !replaced {
            pairs.push((name.to_string(), value.to_string()));
        }

        self.parsed.query_pairs_mut().clear().extend_pairs(pairs);
        self
    }
}

/// True when `input` names a host of its own: an absolute URL with a scheme,
/// or a protocol-relative `//host/...` reference.
fn has_authority(input: &str) -> bool {
    let trimmed = input.trim_start();
    let mut lead = trimmed.chars().take(2);
    let protocol_relative = matches!(
        (lead.next(), lead.next()),
        (Some('/' | '\\'), Some('/' | '\\'))
    );
    protocol_relative || Url::parse(trimmed).is_ok()
}

impl fmt::Display for UrlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_relative() {
            return f.write_str(self.parsed.as_str());
        }

        f.write_str(self.parsed.path())?;
        match self.parsed.query() {
            Some(query) if !query.is_empty() => write!(f, "?{}", query),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_stays_relative() {
        let url = UrlValue::parse("/app-name/some-page").unwrap();
        assert!(url.is_relative());
        assert_eq!(url.to_string(), "/app-name/some-page");
    }

    #[test]
    fn test_relative_path_keeps_query() {
        let url = UrlValue::parse("/search?q=rust&lang=en").unwrap();
        assert_eq!(url.to_string(), "/search?q=rust&lang=en");
    }

    #[test]
    fn test_relative_drops_empty_query_and_fragment() {
        assert_eq!(UrlValue::parse("/page?").unwrap().to_string(), "/page");
        assert_eq!(UrlValue::parse("/page#top").unwrap().to_string(), "/page");
    }

    #[test]
    fn test_path_without_leading_slash_resolves_from_root() {
        let url = UrlValue::parse("feedback").unwrap();
        assert_eq!(url.to_string(), "/feedback");
    }

    #[test]
    fn test_external_absolute_url_is_preserved() {
        let url = UrlValue::parse("https://service.gov.uk/start?x=1").unwrap();
        assert!(!url.is_relative());
        assert_eq!(url.to_string(), "https://service.gov.uk/start?x=1");
    }

    #[test]
    fn test_protocol_relative_url_is_absolute() {
        let url = UrlValue::parse("//other.example.org/landing").unwrap();
        assert!(!url.is_relative());
        assert_eq!(url.to_string(), "http://other.example.org/landing");
    }

    #[test]
    fn test_explicit_placeholder_host_is_kept() {
        let url = UrlValue::parse("http://WWW.EXAMPLE.COM/page").unwrap();
        assert!(!url.is_relative());
        assert_eq!(url.to_string(), "http://www.example.com/page");
    }

    #[test]
    fn test_protocol_relative_placeholder_host_is_kept() {
        let url = UrlValue::parse("//www.example.com/page").unwrap();
        assert!(!url.is_relative());
        assert_eq!(url.to_string(), "http://www.example.com/page");
    }

    #[test]
    fn test_placeholder_host_in_query_stays_relative() {
        let url = UrlValue::parse("/search?site=www.example.com").unwrap();
        assert!(url.is_relative());
        assert_eq!(url.to_string(), "/search?site=www.example.com");
    }

    #[test]
    fn test_placeholder_host_in_path_stays_relative() {
        let url = UrlValue::parse("/links/www.example.com").unwrap();
        assert!(url.is_relative());
        assert_eq!(url.to_string(), "/links/www.example.com");
    }

    #[test]
    fn test_raw_is_untouched() {
        let url = UrlValue::parse("/a b").unwrap();
        assert_eq!(url.raw(), "/a b");
        assert_eq!(url.to_string(), "/a%20b");
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let result = UrlValue::parse("http://exa mple.com/");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().input, "http://exa mple.com/");
    }

    #[test]
    fn test_unterminated_ipv6_host_is_rejected() {
        assert!(UrlValue::parse("http://[::1/page").is_err());
    }

    #[test]
    fn test_set_param_appends_to_empty_query() {
        let mut url = UrlValue::parse("/app/feedback").unwrap();
        url.set_param("f_t", "abc");
        assert_eq!(url.to_string(), "/app/feedback?f_t=abc");
    }

    #[test]
    fn test_set_param_preserves_unrelated_params_in_order() {
        let mut url = UrlValue::parse("/feedback?b=2&a=1").unwrap();
        url.set_param("f_t", "tok");
        assert_eq!(url.to_string(), "/feedback?b=2&a=1&f_t=tok");
    }

    #[test]
    fn test_set_param_overwrites_existing_value() {
        let mut url = UrlValue::parse("/feedback?f_t=old&x=1&f_t=older").unwrap();
        url.set_param("f_t", "new");
        assert_eq!(url.to_string(), "/feedback?f_t=new&x=1");
    }

    #[test]
    fn test_set_param_chains() {
        let mut url = UrlValue::parse("/feedback").unwrap();
        let out = url.set_param("a", "1").set_param("b", "2").to_string();
        assert_eq!(out, "/feedback?a=1&b=2");
    }

    #[test]
    fn test_set_param_on_absolute_url() {
        let mut url = UrlValue::parse("https://forms.example.org/feedback?lang=cy").unwrap();
        url.set_param("f_t", "tok");
        assert_eq!(
            url.to_string(),
            "https://forms.example.org/feedback?lang=cy&f_t=tok"
        );
    }

    #[test]
    fn test_set_param_encodes_value() {
        let mut url = UrlValue::parse("/feedback").unwrap();
        url.set_param("q", "a b/c");
        assert_eq!(url.to_string(), "/feedback?q=a+b%2Fc");
        assert_eq!(url.get_param("q").as_deref(), Some("a b/c"));
    }

    #[test]
    fn test_get_param() {
        let url = UrlValue::parse("/page?something=monkeys&f_t=abc%3D").unwrap();
        assert_eq!(url.get_param("something").as_deref(), Some("monkeys"));
        assert_eq!(url.get_param("f_t").as_deref(), Some("abc="));
        assert_eq!(url.get_param("missing"), None);
    }

    #[test]
    fn test_same_location_ignores_query() {
        let a = UrlValue::parse("/app/feedback?f_t=abc").unwrap();
        let b = UrlValue::parse("/app/feedback").unwrap();
        let c = UrlValue::parse("/app/other").unwrap();
        assert!(a.same_location(&b));
        assert!(!a.same_location(&c));
    }

    #[test]
    fn test_same_location_distinguishes_hosts() {
        let a = UrlValue::parse("https://a.example.org/feedback").unwrap();
        let b = UrlValue::parse("https://b.example.org/feedback").unwrap();
        let c = UrlValue::parse("/feedback").unwrap();
        assert!(!a.same_location(&b));
        assert!(!a.same_location(&c));
    }
}
