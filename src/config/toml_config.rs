use crate::config::AppConfig;
use crate::utils::error::{PriEvalError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 設定檔內容，所有欄位皆可省略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub services: Option<ServicesConfig>,
    pub preview: Option<PreviewConfig>,
    pub settings: Option<SettingsConfig>,
    pub placeholders: Option<PlaceholderConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub compliance_endpoint: Option<String>,
    pub metrics_endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewConfig {
    pub policy_chars: Option<usize>,
    pub data_rows: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsConfig {
    pub encryption_type: Option<String>,
    pub distribution_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceholderConfig {
    pub mode: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PriEvalError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PriEvalError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${COMPLIANCE_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PriEvalError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 把檔案中有設定的值寫入 `config`
    pub fn apply_to(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(services) = &self.services {
            if let Some(endpoint) = &services.compliance_endpoint {
                config.compliance_endpoint = endpoint.clone();
            }
            if let Some(endpoint) = &services.metrics_endpoint {
                config.metrics_endpoint = endpoint.clone();
            }
            if let Some(seconds) = services.timeout_seconds {
                config.timeout = Some(Duration::from_secs(seconds));
            }
        }

        if let Some(preview) = &self.preview {
            if let Some(chars) = preview.policy_chars {
                config.preview.policy_chars = chars;
            }
            if let Some(rows) = preview.data_rows {
                config.preview.data_rows = rows;
            }
        }

        if let Some(settings) = &self.settings {
            if let Some(value) = &settings.encryption_type {
                config.settings.encryption_type = parse_field("settings.encryption_type", value)?;
            }
            if let Some(value) = &settings.distribution_type {
                config.settings.distribution_type =
                    parse_field("settings.distribution_type", value)?;
            }
        }

        if let Some(mode) = self.placeholders.as_ref().and_then(|p| p.mode.as_ref()) {
            config.placeholder_mode = parse_field("placeholders.mode", mode)?;
        }

        Ok(())
    }

    pub fn to_app_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::default();
        self.apply_to(&mut config)?;
        Ok(config)
    }
}

fn parse_field<T: FromStr<Err = String>>(field: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|reason| PriEvalError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason,
        })
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.to_app_config()?.validate()
    }
}
