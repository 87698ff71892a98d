use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl FromStr for Scheme {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(EtlError::InvalidConfigValueError {
                field: "scheme".to_string(),
                value: other.to_string(),
                reason: "Unsupported URL scheme, expected http or https".to_string(),
            }),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => f.write_str("http"),
            Scheme::Https => f.write_str("https"),
        }
    }
}

/// Where the user directory lives and how to authenticate against it.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: String,
    pub token: String,
}

impl Endpoint {
    pub fn new(
        scheme: Scheme,
        host: impl Into<String>,
        port: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            scheme,
            host: host.into(),
            port: port.into(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&format!("{}://{}:{}/", self.scheme, self.host, self.port))?;
        Ok(url)
    }
}

// The token must never end up in logs.
impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token", &"***")
            .finish()
    }
}

/// The subset of a directory user object we care about.
///
/// Every field is required: a response lacking any of them fails to decode
/// and the row it belongs to is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Identity {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn display_value(&self, field: DisplayField) -> String {
        match field {
            DisplayField::Username => self.username.clone(),
            DisplayField::FullName => {
                let full_name = self.full_name();
                if full_name.trim().is_empty() {
                    self.username.clone()
                } else {
                    full_name
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayField {
    #[default]
    Username,
    FullName,
}

impl DisplayField {
    pub fn from_full_name_flag(full_name: bool) -> Self {
        if full_name {
            DisplayField::FullName
        } else {
            DisplayField::Username
        }
    }
}

/// Outcome of one lookup that reached the directory and got a JSON answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Unresolved { reason: String },
}

/// Everything the pipeline needs for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub input_path: String,
    pub output_path: String,
    pub column: String,
    pub display: DisplayField,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub rows_read: u64,
    pub rows_written: u64,
    pub rows_skipped: u64,
    pub output: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(first: &str, last: &str) -> Identity {
        Identity {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    #[test]
    fn test_username_mode_ignores_names() {
        let user = identity("Alice", "Smith");
        assert_eq!(user.display_value(DisplayField::Username), "alice");
    }

    #[test]
    fn test_full_name_mode() {
        let user = identity("Alice", "Smith");
        assert_eq!(user.display_value(DisplayField::FullName), "Alice Smith");
    }

    #[test]
    fn test_full_name_falls_back_to_username() {
        let user = identity("", "");
        assert_eq!(user.display_value(DisplayField::FullName), "alice");

        let user = identity("  ", "");
        assert_eq!(user.display_value(DisplayField::FullName), "alice");
    }

    #[test]
    fn test_partial_full_name_is_kept() {
        let user = identity("Alice", "");
        assert_eq!(user.display_value(DisplayField::FullName), "Alice ");
    }

    #[test]
    fn test_identity_requires_email() {
        let body = r#"{"username":"alice","first_name":"","last_name":""}"#;
        assert!(serde_json::from_str::<Identity>(body).is_err());
    }

    #[test]
    fn test_identity_ignores_extra_fields() {
        let body = r#"{"id":"u1","username":"alice","email":"a@x","first_name":"A","last_name":"B","roles":"system_user"}"#;
        let user: Identity = serde_json::from_str(body).unwrap();
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("https".parse::<Scheme>().unwrap(), Scheme::Https);
        assert!("HTTP".parse::<Scheme>().is_err());
    }

    #[test]
    fn test_endpoint_debug_hides_token() {
        let endpoint = Endpoint::new(Scheme::Http, "localhost", "8065", "secret-token");
        let rendered = format!("{:?}", endpoint);
        assert!(!rendered.contains("secret-token"));
        assert_eq!(
            endpoint.base_url().unwrap().as_str(),
            "http://localhost:8065/"
        );
    }
}
