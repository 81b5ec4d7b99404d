use crate::domain::model::{DistributionType, EncryptionType};
use crate::domain::services::{AdversarySuccessRate, AlphaKAnonymity, DeltaPresence};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 合併兩個服務回應後、可直接顯示的結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub compliance_score: f64,
    pub risk_level: RiskLevel,
    pub encryption_type: EncryptionType,
    pub encryption_strength: &'static str,
    pub gdpr_compliance: GdprCompliance,
    pub data_distribution: DataDistribution,
    pub privacy_metrics: OrganizedPrivacyMetrics,
    pub feedback_items: Vec<String>,
    pub llm_report: String,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationResult {
    /// 輸出用的 JSON 報告
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    CriticalRisk,
    ModerateRisk,
    Compliant,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 50.0 {
            RiskLevel::CriticalRisk
        } else if score < 80.0 {
            RiskLevel::ModerateRisk
        } else {
            RiskLevel::Compliant
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::CriticalRisk => "Critical Risk",
            RiskLevel::ModerateRisk => "Moderate Risk",
            RiskLevel::Compliant => "Compliant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GdprCompliance {
    pub fully_covered: u32,
    pub partially_covered: u32,
    pub not_covered: u32,
    /// placeholder
    pub below_threshold: u32,
    pub weighted_score: Option<f64>,
    pub coverage_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataDistribution {
    pub distribution_type: DistributionType,
    pub nodes: u32,
    pub variance: f64,
    pub dominant_node: u32,
    pub compliance_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizedPrivacyMetrics {
    pub adversary_success: AdversarySuccess,
    pub data_similarity: DataSimilarity,
    pub information_gain: InformationGain,
    pub uncertainty: Uncertainty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdversarySuccess {
    pub adversary_success_rate: AdversarySuccessRate,
    pub delta_presence: DeltaPresence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSimilarity {
    pub k_anonymity: f64,
    pub alpha_k_anonymity: AlphaKAnonymity,
    pub l_diversity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InformationGain {
    pub mutual_information: f64,
    pub relative_entropy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Uncertainty {
    pub avg_entropy: f64,
    pub avg_min_entropy: f64,
    pub avg_normalized_entropy: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::CriticalRisk);
        assert_eq!(RiskLevel::from_score(49.9), RiskLevel::CriticalRisk);
        assert_eq!(RiskLevel::from_score(50.0), RiskLevel::ModerateRisk);
        assert_eq!(RiskLevel::from_score(79.99), RiskLevel::ModerateRisk);
        assert_eq!(RiskLevel::from_score(80.0), RiskLevel::Compliant);
        assert_eq!(RiskLevel::Compliant.label(), "Compliant");
    }
}
