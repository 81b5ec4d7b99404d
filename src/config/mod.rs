pub mod cli;
pub mod toml_config;

use crate::core::placeholders::PlaceholderMode;
use crate::core::preview::PreviewOptions;
use crate::core::{ConfigProvider, PrivacySettings};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::time::Duration;

#[cfg(feature = "cli")]
use crate::core::{DistributionType, EncryptionType};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

pub const DEFAULT_COMPLIANCE_ENDPOINT: &str = "http://127.0.0.1:8001/gdpr/evaluate";
pub const DEFAULT_METRICS_ENDPOINT: &str = "http://127.0.0.1:8000/calcul";

pub const POLICY_EXTENSIONS: &[&str] = &["txt", "pdf", "doc", "docx"];
pub const DATA_EXTENSIONS: &[&str] = &["csv", "json", "xls", "xlsx"];

/// 合併預設值、設定檔與命令列之後的最終配置
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub compliance_endpoint: String,
    pub metrics_endpoint: String,
    pub timeout: Option<Duration>,
    pub preview: PreviewOptions,
    pub settings: PrivacySettings,
    pub placeholder_mode: PlaceholderMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            compliance_endpoint: DEFAULT_COMPLIANCE_ENDPOINT.to_string(),
            metrics_endpoint: DEFAULT_METRICS_ENDPOINT.to_string(),
            timeout: None,
            preview: PreviewOptions::default(),
            settings: PrivacySettings::default(),
            placeholder_mode: PlaceholderMode::default(),
        }
    }
}

impl ConfigProvider for AppConfig {
    fn compliance_endpoint(&self) -> &str {
        &self.compliance_endpoint
    }

    fn metrics_endpoint(&self) -> &str {
        &self.metrics_endpoint
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_endpoint("compliance_endpoint", &self.compliance_endpoint)?;
        validation::validate_endpoint("metrics_endpoint", &self.metrics_endpoint)?;
        if let Some(timeout) = self.timeout {
            validation::validate_range("timeout_seconds", timeout.as_secs(), 1, 3600)?;
        }
        validation::validate_positive_number("preview.policy_chars", self.preview.policy_chars, 1)?;
        validation::validate_positive_number("preview.data_rows", self.preview.data_rows, 1)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "prieval")]
#[command(about = "Evaluate a privacy policy and a data sample against the PriEval services")]
pub struct CliConfig {
    /// Privacy policy document (txt, pdf, doc, docx)
    #[arg(long)]
    pub policy: String,

    /// Data sample (csv, json, xls, xlsx)
    #[arg(long)]
    pub data: String,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub compliance_endpoint: Option<String>,

    #[arg(long)]
    pub metrics_endpoint: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// asymmetric, symmetric, hybrid or none
    #[arg(long)]
    pub encryption: Option<EncryptionType>,

    /// centralized, federated or distributed
    #[arg(long)]
    pub distribution: Option<DistributionType>,

    /// Use deterministic placeholder values instead of random ones
    #[arg(long)]
    pub fixed_placeholders: bool,

    /// Write the evaluation result as JSON to this path instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print the file previews before evaluating
    #[arg(long)]
    pub show_preview: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 預設值 → 設定檔 → 命令列參數，後者覆蓋前者
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?.to_app_config()?,
            None => AppConfig::default(),
        };

        if let Some(endpoint) = &self.compliance_endpoint {
            config.compliance_endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.metrics_endpoint {
            config.metrics_endpoint = endpoint.clone();
        }
        if let Some(seconds) = self.timeout_seconds {
            config.timeout = Some(Duration::from_secs(seconds));
        }
        if let Some(encryption) = self.encryption {
            config.settings.encryption_type = encryption;
        }
        if let Some(distribution) = self.distribution {
            config.settings.distribution_type = distribution;
        }
        if self.fixed_placeholders {
            config.placeholder_mode = PlaceholderMode::Fixed;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("policy", &self.policy)?;
        validation::validate_file_extension("policy", &self.policy, POLICY_EXTENSIONS)?;
        validation::validate_path("data", &self.data)?;
        validation::validate_file_extension("data", &self.data, DATA_EXTENSIONS)?;
        if let Some(output) = &self.output {
            validation::validate_path("output", output)?;
        }
        Ok(())
    }
}
