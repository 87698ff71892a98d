use crate::config::{DEFAULT_PORT, DEFAULT_SCHEME};
use crate::core::{ConfigProvider, Endpoint};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    pub directory: DirectoryConfig,
    pub table: TableConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Clone, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    pub host: String,
    #[serde(default = "default_port", deserialize_with = "port_as_string")]
    pub port: String,
    pub token: String,
}

impl fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    pub input: String,
    pub output: String,
    pub column: String,
    pub full_name: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub verbose: Option<bool>,
    pub log_format: Option<String>,
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

fn default_port() -> String {
    DEFAULT_PORT.to_string()
}

// Accept both `port = 8065` and `port = "8065"`.
fn port_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u64),
        Text(String),
    }

    Ok(match Port::deserialize(deserializer)? {
        Port::Number(n) => n.to_string(),
        Port::Text(s) => s,
    })
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MM_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn verbose(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        let dir = &self.directory;
        let mut checks = vec![
            validation::validate_non_empty_string("directory.host", &dir.host),
            validation::validate_scheme("directory.scheme", &dir.scheme),
            validation::validate_port("directory.port", &dir.port),
            validation::validate_path("table.input", &self.table.input),
            validation::validate_path("table.output", &self.table.output),
            validation::validate_non_empty_string("table.column", &self.table.column),
        ];

        // An unset variable is left as `${NAME}`, which is never a real token.
        if dir.token.trim().is_empty() || dir.token.starts_with("${") {
            checks.push(Err(EtlError::MissingConfigError {
                field: "directory.token".to_string(),
            }));
        }

        if !dir.host.trim().is_empty() {
            checks.push(validation::validate_endpoint(
                "directory.host",
                &dir.scheme,
                &dir.host,
                &dir.port,
            ));
        }

        validation::collect_errors(checks)
    }
}

impl ConfigProvider for TomlConfig {
    fn endpoint(&self) -> Result<Endpoint> {
        Ok(Endpoint::new(
            self.directory.scheme.parse()?,
            self.directory.host.trim(),
            self.directory.port.trim(),
            self.directory.token.clone(),
        ))
    }

    fn input_path(&self) -> &str {
        &self.table.input
    }

    fn output_path(&self) -> &str {
        &self.table.output
    }

    fn column(&self) -> &str {
        &self.table.column
    }

    fn full_name(&self) -> bool {
        self.table.full_name.unwrap_or(false)
    }
}
