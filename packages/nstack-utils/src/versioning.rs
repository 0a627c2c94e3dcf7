use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

static VERSION_NUMBER_STRICT_MATCH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(\.\d+)+([.|\-|+|_| ]*[A-Za-z0-9]+)*").unwrap());

static VERSION_NUMBER_MATCH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(\.\d+)*([.|\-|+|_| ]*[A-Za-z0-9]+)*").unwrap());

/// An application version as reported by the host or the service.
///
/// Ordering is semantic (`1.10.0 > 1.9.0`). A string without a numeric
/// version component is malformed; malformed versions compare equal to
/// everything, so they can never make one version look newer than another.
#[derive(Debug, Clone)]
pub struct Version {
    string: String,
}

impl Version {
    pub fn new(string: impl Into<String>) -> Self {
        Version {
            string: string.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.string
    }

    pub fn is_valid(&self) -> bool {
        self.get_valid_version().is_some()
    }

    pub fn get_valid_version(&self) -> Option<String> {
        let version_string = VERSION_NUMBER_STRICT_MATCH_REGEX
            .find(&self.string)
            .or_else(|| VERSION_NUMBER_MATCH_REGEX.find(&self.string))
            .map(|match_str| match_str.as_str());
        version_string.and_then(|version_string| {
            version_compare::Version::from(version_string).map(|v| v.to_string())
        })
    }

    /// Semantic comparison; `Equal` when either side is malformed.
    pub fn compare(&self, other: &Self) -> Ordering {
        let (Some(version), Some(other_version)) =
            (self.get_valid_version(), other.get_valid_version())
        else {
            return Ordering::Equal;
        };
        match (
            version_compare::Version::from(&version),
            version_compare::Version::from(&other_version),
        ) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        }
    }

    pub fn is_newer_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Greater
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string)
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Version::new(value)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}
