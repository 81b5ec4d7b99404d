use crate::domain::model::{DistributionType, UploadedFile};
use crate::domain::services::{ComplianceReport, PrivacyMetricsReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn compliance_endpoint(&self) -> &str;
    fn metrics_endpoint(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
}

/// The two outbound calls. Each call validates the status and decodes the
/// body into its schema.
#[async_trait]
pub trait EvaluationBackend: Send + Sync {
    async fn evaluate_policy(&self, policy: &UploadedFile) -> Result<ComplianceReport>;
    async fn compute_metrics(&self, dataset: &UploadedFile) -> Result<PrivacyMetricsReport>;
}

/// Values the services do not supply yet.
pub trait PlaceholderProvider: Send + Sync {
    fn below_threshold_count(&self) -> u32;
    fn fallback_compliance_score(&self) -> f64;
    fn distribution_profile(&self, distribution: DistributionType) -> DistributionProfile;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionProfile {
    pub nodes: u32,
    pub variance: f64,
    pub dominant_node: u32,
    pub compliance_score: u32,
}
