use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse an options object. An empty or whitespace-only string is treated
/// as "no options" and yields the type's default.
pub fn from_json<T>(json: &str) -> Result<T, SettingsError>
where
    T: DeserializeOwned + Default,
{
    if json.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(json)?)
}

/// Numbers in markup options are often written as strings (`"offset": "20"`).
/// Accepts either and truncates a string the way `parseInt` would: leading
/// integer digits, anything after is ignored.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => parse_int_prefix(&s),
    })
}

fn parse_int_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<f64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int_prefix_matches_js() {
        assert_eq!(parse_int_prefix("20"), Some(20.0));
        assert_eq!(parse_int_prefix("  -15px"), Some(-15.0));
        assert_eq!(parse_int_prefix("12.9"), Some(12.0));
        assert_eq!(parse_int_prefix("px"), None);
    }

    #[test]
    fn blank_json_is_default() {
        let value: Vec<u8> = from_json("   ").unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let result: Result<Vec<u8>, _> = from_json("{not json");
        assert!(matches!(result, Err(SettingsError::Json(_))));
    }
}
