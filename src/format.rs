//! String format hints for field previews

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$").unwrap()
});

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}(\.\d+)?$").unwrap());

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static IPV4_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,3}\.){3}\d{1,3}$").unwrap());

static IPV6_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(([0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}|([0-9a-fA-F]{1,4}:){1,7}:|([0-9a-fA-F]{1,4}:){1,6}:[0-9a-fA-F]{1,4})$").unwrap()
});

/// A recognised string format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Date,
    DateTime,
    Time,
    Email,
    Uuid,
    Uri,
    Ipv4,
    Ipv6,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Date => "date",
            Format::DateTime => "date-time",
            Format::Time => "time",
            Format::Email => "email",
            Format::Uuid => "uuid",
            Format::Uri => "uri",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
        }
    }

    /// Detect the format of a single string.
    pub fn detect(value: &str) -> Option<Format> {
        let len = value.len();
        if len == 0 {
            return None;
        }

        // Cheap byte checks gate each regex
        if ["http://", "https://", "ftp://", "file://"]
            .iter()
            .any(|scheme| value.starts_with(scheme) && len > scheme.len())
        {
            return Some(Format::Uri);
        }

        let bytes = value.as_bytes();

        if len == 10 && bytes[4] == b'-' && bytes[7] == b'-' && DATE_REGEX.is_match(value) {
            return Some(Format::Date);
        }

        if len >= 19 && matches!(bytes[10], b'T' | b' ') && DATETIME_REGEX.is_match(value) {
            return Some(Format::DateTime);
        }

        if len > 5 && len < 255 && value.contains('@') && EMAIL_REGEX.is_match(value) {
            return Some(Format::Email);
        }

        if len == 36 && bytes[8] == b'-' && UUID_REGEX.is_match(value) {
            return Some(Format::Uuid);
        }

        if len >= 8 && value.contains(':') && TIME_REGEX.is_match(value) {
            return Some(Format::Time);
        }

        if len < 16 && value.contains('.') && is_ipv4(value) {
            return Some(Format::Ipv4);
        }

        if value.contains(':') && IPV6_REGEX.is_match(value) {
            return Some(Format::Ipv6);
        }

        None
    }

    /// The format shared by every string in `values`.
    ///
    /// Returns `None` if any value is not a string, any string has no
    /// recognised format, or the strings disagree.
    pub fn common<'a, I>(values: I) -> Option<Format>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut common = None;

        for value in values {
            let Value::String(s) = value else {
                return None;
            };
            let detected = Format::detect(s)?;
            match common {
                None => common = Some(detected),
                Some(seen) if seen != detected => return None,
                Some(_) => {}
            }
        }

        common
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_ipv4(s: &str) -> bool {
    IPV4_REGEX.is_match(s) && s.split('.').all(|part| part.parse::<u8>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect() {
        assert_eq!(Format::detect("2021-01-01"), Some(Format::Date));
        assert_eq!(Format::detect("2021-01-01T10:00:00Z"), Some(Format::DateTime));
        assert_eq!(Format::detect("10:00:00"), Some(Format::Time));
        assert_eq!(Format::detect("test@example.com"), Some(Format::Email));
        assert_eq!(
            Format::detect("550E8400-e29b-41d4-a716-446655440000"),
            Some(Format::Uuid)
        );
        assert_eq!(Format::detect("https://example.com"), Some(Format::Uri));
        assert_eq!(Format::detect("192.168.0.1"), Some(Format::Ipv4));
        assert_eq!(Format::detect("999.1.1.1"), None);
        assert_eq!(Format::detect("plain text"), None);
        assert_eq!(Format::detect(""), None);
    }

    #[test]
    fn test_common_format() {
        let dates = [json!("2021-01-01"), json!("2022-12-31")];
        assert_eq!(Format::common(&dates), Some(Format::Date));

        let mixed = [json!("2021-01-01"), json!("a@b.io")];
        assert_eq!(Format::common(&mixed), None);

        let not_strings = [json!(1)];
        assert_eq!(Format::common(&not_strings), None);

        let empty: [Value; 0] = [];
        assert_eq!(Format::common(&empty), None);
    }
}
