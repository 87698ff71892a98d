use crate::utils::error::{EtlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_scheme(field_name: &str, scheme: &str) -> Result<()> {
    match scheme {
        "http" | "https" => Ok(()),
        other => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: other.to_string(),
            reason: "Unsupported URL scheme, expected http or https".to_string(),
        }),
    }
}

pub fn validate_port(field_name: &str, port: &str) -> Result<()> {
    let value: u32 = port
        .trim()
        .parse()
        .map_err(|_| EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: port.to_string(),
            reason: "Port must be a number".to_string(),
        })?;
    validate_range(field_name, value, 1, 65535)
}

/// Checks that scheme, host and port assemble into a usable base URL.
pub fn validate_endpoint(field_name: &str, scheme: &str, host: &str, port: &str) -> Result<()> {
    let candidate = format!("{}://{}:{}/", scheme, host, port);
    match Url::parse(&candidate) {
        Ok(url) if url.host_str().is_some() => Ok(()),
        Ok(_) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: host.to_string(),
            reason: "URL has no host".to_string(),
        }),
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: host.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Runs every check and reports all failures at once, so a user fixing a
/// command line sees every missing parameter in one go.
pub fn collect_errors(checks: Vec<Result<()>>) -> Result<()> {
    let messages: Vec<String> = checks
        .into_iter()
        .filter_map(|check| check.err().map(|e| e.to_string()))
        .collect();

    match messages.len() {
        0 => Ok(()),
        _ => Err(EtlError::ValidationError {
            message: messages.join("; "),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_scheme() {
        assert!(validate_scheme("scheme", "http").is_ok());
        assert!(validate_scheme("scheme", "https").is_ok());
        assert!(validate_scheme("scheme", "ftp").is_err());
        assert!(validate_scheme("scheme", "").is_err());
    }

    #[test]
    fn test_validate_port() {
        assert!(validate_port("port", "8065").is_ok());
        assert!(validate_port("port", "0").is_err());
        assert!(validate_port("port", "70000").is_err());
        assert!(validate_port("port", "http").is_err());
    }

    #[test]
    fn test_validate_endpoint() {
        assert!(validate_endpoint("url", "https", "chat.example.com", "443").is_ok());
        assert!(validate_endpoint("url", "http", "localhost", "8065").is_ok());
        assert!(validate_endpoint("url", "http", "bad host", "8065").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("column", "user_id").is_ok());
        assert!(matches!(
            validate_non_empty_string("column", "   "),
            Err(EtlError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_collect_errors_joins_messages() {
        let result = collect_errors(vec![
            Ok(()),
            validate_non_empty_string("token", ""),
            validate_path("infile", ""),
        ]);
        match result {
            Err(EtlError::ValidationError { message }) => {
                assert!(message.contains("token"));
                assert!(message.contains("Path cannot be empty"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
