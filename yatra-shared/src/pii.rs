use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps customer contact data so it never lands in log output.
///
/// `Debug` and `Display` print a redacted form; serialization still writes the
/// real value because API responses need it.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Masked<T>(pub T);

impl<T: AsRef<str>> Masked<T> {
    /// Keeps the first character and the domain of an email, e.g. `a***@x.com`.
    fn redacted(&self) -> String {
        let value = self.0.as_ref();
        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() => {
                let first: String = local.chars().take(1).collect();
                format!("{}***@{}", first, domain)
            }
            _ => "********".to_string(),
        }
    }
}

impl<T: AsRef<str>> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl<T: AsRef<str>> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_redacted_in_logs() {
        let email = Masked("alice@example.com".to_string());
        assert_eq!(format!("{}", email), "a***@example.com");
        assert_eq!(format!("{:?}", email), "a***@example.com");
    }

    #[test]
    fn test_non_email_fully_masked() {
        let phone = Masked("9876543210");
        assert_eq!(phone.to_string(), "********");
    }

    #[test]
    fn test_serializes_real_value() {
        let email = Masked("a@x.com".to_string());
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"a@x.com\"");
    }
}
