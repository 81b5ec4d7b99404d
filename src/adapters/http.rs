use crate::core::{ConfigProvider, EvaluationBackend, UploadedFile};
use crate::domain::services::{ComplianceReport, PrivacyMetricsReport};
use crate::utils::error::{PriEvalError, Result, ServiceKind};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// 以 multipart 表單呼叫兩個評估服務
#[derive(Debug, Clone)]
pub struct HttpEvaluationBackend {
    client: Client,
    compliance_endpoint: String,
    metrics_endpoint: String,
}

impl HttpEvaluationBackend {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| PriEvalError::ConfigError {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            compliance_endpoint: config.compliance_endpoint().to_string(),
            metrics_endpoint: config.metrics_endpoint().to_string(),
        })
    }

    async fn post_file<T: DeserializeOwned>(
        &self,
        service: ServiceKind,
        endpoint: &str,
        field: &'static str,
        file: &UploadedFile,
    ) -> Result<T> {
        let part = Part::bytes(file.content().to_vec()).file_name(file.name().to_string());
        let form = Form::new().part(field, part);

        tracing::debug!("📡 POST {} ({}, field '{}')", endpoint, service, field);
        let response = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|source| PriEvalError::TransportError { service, source })?;

        let status = response.status();
        tracing::debug!("📡 {} responded with {}", service, status);
        if !status.is_success() {
            return Err(PriEvalError::ServiceError { service, status });
        }

        let body = response
            .text()
            .await
            .map_err(|source| PriEvalError::TransportError { service, source })?;

        serde_json::from_str(&body).map_err(|source| PriEvalError::ParseError { service, source })
    }
}

#[async_trait]
impl EvaluationBackend for HttpEvaluationBackend {
    async fn evaluate_policy(&self, policy: &UploadedFile) -> Result<ComplianceReport> {
        self.post_file(
            ServiceKind::ComplianceReport,
            &self.compliance_endpoint,
            "policy",
            policy,
        )
        .await
    }

    async fn compute_metrics(&self, dataset: &UploadedFile) -> Result<PrivacyMetricsReport> {
        self.post_file(ServiceKind::PrivacyMetrics, &self.metrics_endpoint, "file", dataset)
            .await
    }
}
