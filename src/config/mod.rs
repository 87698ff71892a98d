pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::{ConfigProvider, Endpoint};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::fmt;

pub const DEFAULT_PORT: &str = "8065";
pub const DEFAULT_SCHEME: &str = "http";

/// Command line options. Connection settings fall back to the `MM_*`
/// environment variables when not given as flags.
#[cfg(feature = "cli")]
#[derive(Clone, Parser)]
#[command(name = "userid-etl")]
#[command(about = "Replace Mattermost user IDs in a CSV column with usernames or full names")]
pub struct CliConfig {
    /// The URL of the Mattermost instance (without the HTTP scheme)
    #[arg(long, env = "MM_URL", default_value = "")]
    pub url: String,

    /// The TCP port used by Mattermost
    #[arg(long, env = "MM_PORT", default_value = DEFAULT_PORT)]
    pub port: String,

    /// The HTTP scheme to be used (http/https)
    #[arg(long, env = "MM_SCHEME", default_value = DEFAULT_SCHEME)]
    pub scheme: String,

    /// The auth token used to connect to Mattermost
    #[arg(long, env = "MM_TOKEN", default_value = "", hide_env_values = true)]
    pub token: String,

    /// The name of the CSV file to be processed
    #[arg(long, default_value = "")]
    pub infile: String,

    /// The name of the output file that the CSV should be written to
    #[arg(long, default_value = "")]
    pub outfile: String,

    /// The name of the column within the CSV file that contains the user ID
    #[arg(long, default_value = "")]
    pub column: String,

    /// Return the full name of the Mattermost user instead of the username (if a full name is available)
    #[arg(long)]
    pub fullname: bool,

    /// Enable debug output
    #[arg(long, env = "MM_DEBUG")]
    pub debug: bool,

    /// Log CPU and memory usage of the run
    #[arg(long)]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("url", &self.url)
            .field("port", &self.port)
            .field("scheme", &self.scheme)
            .field("token", &"***")
            .field("infile", &self.infile)
            .field("outfile", &self.outfile)
            .field("column", &self.column)
            .field("fullname", &self.fullname)
            .field("debug", &self.debug)
            .field("monitor", &self.monitor)
            .finish()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let mut checks = vec![
            validation::validate_non_empty_string("url (--url or MM_URL)", &self.url),
            validation::validate_non_empty_string("token (--token or MM_TOKEN)", &self.token),
            validation::validate_scheme("scheme (--scheme or MM_SCHEME)", &self.scheme),
            validation::validate_port("port (--port or MM_PORT)", &self.port),
            validation::validate_non_empty_string("infile (--infile)", &self.infile),
            validation::validate_path("infile (--infile)", &self.infile),
            validation::validate_non_empty_string("outfile (--outfile)", &self.outfile),
            validation::validate_path("outfile (--outfile)", &self.outfile),
            validation::validate_non_empty_string("column (--column)", &self.column),
        ];
        if !self.url.trim().is_empty() {
            checks.push(validation::validate_endpoint(
                "url (--url or MM_URL)",
                &self.scheme,
                &self.url,
                &self.port,
            ));
        }
        validation::collect_errors(checks)
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn endpoint(&self) -> Result<Endpoint> {
        Ok(Endpoint::new(
            self.scheme.parse()?,
            self.url.trim(),
            self.port.trim(),
            self.token.clone(),
        ))
    }

    fn input_path(&self) -> &str {
        &self.infile
    }

    fn output_path(&self) -> &str {
        &self.outfile
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn full_name(&self) -> bool {
        self.fullname
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::core::{DisplayField, Scheme};
    use crate::utils::error::EtlError;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["userid-etl"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    fn complete() -> CliConfig {
        parse(&[
            "--url",
            "chat.example.com",
            "--scheme",
            "https",
            "--port",
            "443",
            "--token",
            "secret",
            "--infile",
            "in.csv",
            "--outfile",
            "out.csv",
            "--column",
            "user_id",
            "--fullname",
        ])
    }

    #[test]
    fn test_complete_command_line_is_valid() {
        let config = complete();
        assert!(config.validate().is_ok());

        let endpoint = config.endpoint().unwrap();
        assert_eq!(endpoint.scheme, Scheme::Https);
        assert_eq!(endpoint.host, "chat.example.com");

        let settings = config.run_settings();
        assert_eq!(settings.column, "user_id");
        assert_eq!(settings.display, DisplayField::FullName);
    }

    #[test]
    fn test_missing_parameters_are_reported_together() {
        let mut config = complete();
        config.infile.clear();
        config.column.clear();

        match config.validate() {
            Err(EtlError::ValidationError { message }) => {
                assert!(message.contains("infile"));
                assert!(message.contains("column"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_bad_scheme_is_rejected() {
        let mut config = complete();
        config.scheme = "ftp".to_string();
        assert!(config.validate().is_err());
        assert!(config.endpoint().is_err());
    }

    #[test]
    fn test_debug_output_hides_token() {
        let rendered = format!("{:?}", complete());
        assert!(!rendered.contains("secret"));
    }
}
