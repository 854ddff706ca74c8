use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use orderflow_core::{DomainError, ValueObject};

/// Short human-presentable code customers use to ask about a delivery.
///
/// Always `TrackingCode::LEN` uppercase hexadecimal characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingCode(String);

impl TrackingCode {
    pub const LEN: usize = 8;

    /// Derive a fresh code from a random (v4) UUID.
    pub fn generate() -> Self {
        let mut code = Uuid::new_v4().simple().to_string();
        code.truncate(Self::LEN);
        code.make_ascii_uppercase();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TrackingCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == Self::LEN
            && s
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c));
        if !valid {
            return Err(DomainError::invalid_id(format!(
                "TrackingCode: expected {} uppercase hex characters, got {s:?}",
                Self::LEN
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for TrackingCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TrackingCode> for String {
    fn from(value: TrackingCode) -> Self {
        value.0
    }
}

impl core::fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for TrackingCode {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_well_formed() {
        for _ in 0..100 {
            let code = TrackingCode::generate();
            assert_eq!(code.as_str().len(), TrackingCode::LEN);
            assert!(code.as_str().parse::<TrackingCode>().is_ok(), "{code}");
        }
    }

    #[test]
    fn parse_rejects_lowercase_and_wrong_length() {
        for bad in ["abcdef12", "ABC", "ABCDEF123", "GHIJKLMN", ""] {
            let err = bad.parse::<TrackingCode>().unwrap_err();
            assert!(matches!(err, DomainError::InvalidId(_)), "{bad}");
        }
    }

    #[test]
    fn serde_validates_on_the_way_in() {
        let code: TrackingCode = serde_json::from_str("\"0A1B2C3D\"").unwrap();
        assert_eq!(code.as_str(), "0A1B2C3D");
        assert!(serde_json::from_str::<TrackingCode>("\"nope\"").is_err());
    }
}
