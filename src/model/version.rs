// src/model/version.rs
//! Versioned semantic vocabulary of a data file.
//!
//! The standard version is an attribute of the whole file, looked up once at
//! parse time and threaded into every per-record computation that needs it.
//! Several classification rules change meaning across versions.

/// Default version assumed when a file carries no `version` attribute.
pub const DEFAULT_VERSION: &str = "1.01";

/// The closed set of 1.x releases; these use the legacy vocabulary names.
const V1_FAMILY: [&str; 5] = ["1.01", "1.02", "1.03", "1.04", "1.05"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    raw: String,
    parsed: Option<(u32, u32)>,
}

impl Version {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let parsed = trimmed.split_once('.').and_then(|(major, minor)| {
            Some((major.parse().ok()?, minor.parse().ok()?))
        });
        Version {
            raw: trimmed.to_string(),
            parsed,
        }
    }

    #[must_use]
    pub fn default_version() -> Self {
        Version::parse(DEFAULT_VERSION)
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// True for the literal 1.x family, which selects the legacy sector
    /// vocabulary identifiers.
    #[must_use]
    pub fn is_v1_family(&self) -> bool {
        V1_FAMILY.contains(&self.raw.as_str())
    }

    /// True from standard version 2.02 onwards. Unparseable versions never
    /// qualify.
    #[must_use]
    pub fn at_least_2_02(&self) -> bool {
        match self.parsed {
            Some((major, minor)) => major > 2 || (major == 2 && minor >= 2),
            None => false,
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::default_version()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
