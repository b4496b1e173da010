//! Format checks for the `format` keyword

use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime};
use jsv_core::JsonPointer;
use regex::Regex;
use url::Url;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const HOSTNAME_PATTERN: &str =
    r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$";
const UUID_PATTERN: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

/// Signature of a format check
///
/// A check receives the string value and returns a complete failure
/// message when the value does not conform.
pub type FormatCheck = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Named format checks applied by the `format` keyword
///
/// Unknown format names are ignored during validation unless strict
/// format checking is enabled in the configuration.
#[derive(Clone)]
pub struct FormatRegistry {
    checks: HashMap<String, FormatCheck>,
}

impl FormatRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in checks
    ///
    /// Covers `date-time`, `date`, `time`, `email`, `hostname`, `ipv4`,
    /// `ipv6`, `uri`, `uri-reference`, `uuid`, `json-pointer`, and `regex`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("date-time", Arc::new(check_date_time));
        registry.register("date", Arc::new(check_date));
        registry.register("time", Arc::new(check_time));
        registry.register("email", regex_check(EMAIL_PATTERN, "email address"));
        registry.register("hostname", hostname_check());
        registry.register("ipv4", Arc::new(check_ipv4));
        registry.register("ipv6", Arc::new(check_ipv6));
        registry.register("uri", Arc::new(check_uri));
        registry.register("uri-reference", Arc::new(check_uri_reference));
        registry.register("uuid", regex_check(UUID_PATTERN, "UUID"));
        registry.register("json-pointer", Arc::new(check_json_pointer));
        registry.register("regex", Arc::new(check_regex));
        registry
    }

    /// Register a check under a format name, replacing any existing one
    pub fn register(&mut self, name: impl Into<String>, check: FormatCheck) {
        self.checks.insert(name.into(), check);
    }

    /// Check registered for a format name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormatCheck> {
        self.checks.get(name)
    }

    /// Whether a check is registered for the name
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Registered format names in sorted order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.names())
            .finish()
    }
}

fn check_date_time(value: &str) -> Result<(), String> {
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|_| format!("Value '{value}' is not a valid RFC 3339 date-time"))
}

fn check_date(value: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| format!("Value '{value}' is not a valid date"))
}

fn check_time(value: &str) -> Result<(), String> {
    if value.parse::<NaiveTime>().is_ok() {
        return Ok(());
    }
    // Offset forms are checked by anchoring the time to an arbitrary date.
    DateTime::parse_from_rfc3339(&format!("1970-01-01T{value}"))
        .map(|_| ())
        .map_err(|_| format!("Value '{value}' is not a valid time"))
}

fn check_ipv4(value: &str) -> Result<(), String> {
    value
        .parse::<Ipv4Addr>()
        .map(|_| ())
        .map_err(|_| format!("Value '{value}' is not a valid IPv4 address"))
}

fn check_ipv6(value: &str) -> Result<(), String> {
    value
        .parse::<Ipv6Addr>()
        .map(|_| ())
        .map_err(|_| format!("Value '{value}' is not a valid IPv6 address"))
}

fn check_uri(value: &str) -> Result<(), String> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|_| format!("Value '{value}' is not a valid URI"))
}

fn check_uri_reference(value: &str) -> Result<(), String> {
    if Url::parse(value).is_ok() {
        return Ok(());
    }
    let joined = Url::parse("https://example.com/").and_then(|base| base.join(value));
    joined
        .map(|_| ())
        .map_err(|_| format!("Value '{value}' is not a valid URI reference"))
}

fn check_json_pointer(value: &str) -> Result<(), String> {
    JsonPointer::parse(value)
        .map(|_| ())
        .map_err(|_| format!("Value '{value}' is not a valid JSON pointer"))
}

fn check_regex(value: &str) -> Result<(), String> {
    Regex::new(value)
        .map(|_| ())
        .map_err(|_| format!("Value '{value}' is not a valid regular expression"))
}

fn regex_check(pattern: &'static str, describe: &'static str) -> FormatCheck {
    let compiled = Regex::new(pattern).ok();
    Arc::new(move |value: &str| match &compiled {
        Some(regex) if regex.is_match(value) => Ok(()),
        _ => Err(format!("Value '{value}' is not a valid {describe}")),
    })
}

fn hostname_check() -> FormatCheck {
    let labels = regex_check(HOSTNAME_PATTERN, "hostname");
    Arc::new(move |value: &str| {
        if value.len() > 253 {
            return Err(format!("Value '{value}' is not a valid hostname"));
        }
        labels(value)
    })
}
