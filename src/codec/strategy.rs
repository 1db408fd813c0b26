//! Encoding Strategy Module
//!
//! Format plus compression choice, with its textual form (`json+zlib`, `csv`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Suffix marking a zlib-compressed strategy.
const ZLIB_SUFFIX: &str = "+zlib";

// == Format ==
/// Text serialization used for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// JSON array of objects or array of arrays
    Json,
    /// Header-less CSV, decodes to array rows
    Csv,
    /// CSV with a header record, decodes to object rows
    CsvHeader,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
            Format::CsvHeader => "csv-header",
        }
    }
}

// == Strategy ==
/// How a table is turned into a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Strategy {
    pub format: Format,
    pub compressed: bool,
}

impl Strategy {
    pub const fn new(format: Format, compressed: bool) -> Self {
        Self { format, compressed }
    }

    /// Compressed JSON, the default for blob storage.
    pub const fn json_zlib() -> Self {
        Self::new(Format::Json, true)
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::json_zlib()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format.as_str())?;
        if self.compressed {
            f.write_str(ZLIB_SUFFIX)?;
        }
        Ok(())
    }
}

impl FromStr for Strategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let (format, compressed) = match normalized.strip_suffix(ZLIB_SUFFIX) {
            Some(base) => (base, true),
            None => (normalized.as_str(), false),
        };

        let format = match format {
            "json" => Format::Json,
            "csv" => Format::Csv,
            "csv-header" => Format::CsvHeader,
            _ => {
                return Err(CacheError::InvalidRequest(format!(
                    "Unknown encoding '{}'",
                    s
                )))
            }
        };

        Ok(Self::new(format, compressed))
    }
}

impl TryFrom<String> for Strategy {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Strategy> for String {
    fn from(strategy: Strategy) -> Self {
        strategy.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Strategy::new(Format::Json, false).to_string(), "json");
        assert_eq!(Strategy::new(Format::Csv, true).to_string(), "csv+zlib");
        assert_eq!(
            Strategy::new(Format::CsvHeader, true).to_string(),
            "csv-header+zlib"
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!("json+zlib".parse::<Strategy>().unwrap(), Strategy::json_zlib());
        assert_eq!(
            " CSV-Header ".parse::<Strategy>().unwrap(),
            Strategy::new(Format::CsvHeader, false)
        );
    }

    #[test]
    fn test_parse_unknown() {
        let result = "xml+zlib".parse::<Strategy>();
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Strategy::new(Format::Csv, true)).unwrap();
        assert_eq!(json, r#""csv+zlib""#);

        let parsed: Strategy = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(parsed, Strategy::new(Format::Json, false));

        assert!(serde_json::from_str::<Strategy>(r#""yaml""#).is_err());
    }
}
