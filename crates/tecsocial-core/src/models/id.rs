use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier as the backend sends it: sometimes a number, sometimes a string.
///
/// Equality is by display form, so `7` and `"7"` name the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Num(i64),
    Str(String),
}

impl Id {
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Num(n) => write!(f, "{}", n),
            Id::Str(s) => f.write_str(s),
        }
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Id::Num(a), Id::Num(b)) => a == b,
            (Id::Str(a), Id::Str(b)) => a == b,
            _ => self.as_key() == other.as_key(),
        }
    }
}

impl Eq for Id {}

/// Numeric text becomes `Num`, anything else `Str`.
impl FromStr for Id {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>().map(Id::Num).unwrap_or_else(|_| Id::Str(s.to_string())))
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Num(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::Str(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::Str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_and_string_ids_compare_equal() {
        assert_eq!(Id::from(7), Id::from("7"));
        assert_ne!(Id::from(7), Id::from("8"));
    }

    #[test]
    fn test_parse_from_text() {
        assert_eq!("42".parse::<Id>().unwrap(), Id::Num(42));
        assert_eq!("u-42".parse::<Id>().unwrap(), Id::Str("u-42".to_string()));
    }

    #[test]
    fn test_deserialize_either_form() {
        let ids: Vec<Id> = serde_json::from_str(r#"[12, "abc"]"#).unwrap();
        assert_eq!(ids[0], Id::Num(12));
        assert_eq!(ids[1], Id::Str("abc".to_string()));
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[12,"abc"]"#);
    }
}
