//! Response schemas of the two evaluation services.
//!
//! Bodies are decoded into these types before anything is merged, so a missing
//! or mistyped field fails the evaluation instead of leaking into the result.

use serde::{Deserialize, Serialize};

/// `POST /gdpr/evaluate` 的回應
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub score: ComplianceScore,
    pub llm_report: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceScore {
    pub fully_covered: u32,
    pub partially_covered: u32,
    pub not_covered: u32,
    /// 服務尚未算出分數時可能缺席
    #[serde(default)]
    pub weighted_score: Option<f64>,
    pub coverage_score: f64,
}

/// `POST /calcul` 的回應
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacyMetricsReport {
    pub k_anonymity: f64,
    pub alpha_k_anonymity: AlphaKAnonymity,
    pub l_diversity: f64,
    pub adversary_success_rate: AdversarySuccessRate,
    pub delta_presence: DeltaPresence,
    pub mutual_information: f64,
    pub privacy_score_entropy: f64,
    pub uncertainty_metrics: UncertaintyMetrics,
}

/// (alpha, k) pair. The service has sent it both as an object and as a
/// two-element array, so both shapes are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "AlphaKWire")]
pub struct AlphaKAnonymity {
    pub alpha: f64,
    pub k: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AlphaKWire {
    Object { alpha: f64, k: f64 },
    Pair(f64, f64),
}

impl From<AlphaKWire> for AlphaKAnonymity {
    fn from(wire: AlphaKWire) -> Self {
        match wire {
            AlphaKWire::Object { alpha, k } | AlphaKWire::Pair(alpha, k) => Self { alpha, k },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdversarySuccessRate {
    pub average_success_rate: f64,
    pub min_success_rate: f64,
    pub max_success_rate: f64,
    pub num_equivalence_classes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaPresence {
    pub shared_records: u64,
    pub published_records: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyMetrics {
    pub avg_entropy: f64,
    pub avg_min_entropy: f64,
    pub avg_normalized_entropy: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metrics_body(alpha_k: serde_json::Value) -> serde_json::Value {
        json!({
            "k_anonymity": 3,
            "alpha_k_anonymity": alpha_k,
            "l_diversity": 2,
            "adversary_success_rate": {
                "average_success_rate": 0.4,
                "min_success_rate": 0.1,
                "max_success_rate": 0.9,
                "num_equivalence_classes": 12
            },
            "delta_presence": { "shared_records": 40, "published_records": 100 },
            "mutual_information": 0.21,
            "privacy_score_entropy": 1.7,
            "uncertainty_metrics": {
                "avg_entropy": 2.1,
                "avg_min_entropy": 1.2,
                "avg_normalized_entropy": 0.8
            }
        })
    }

    #[test]
    fn test_alpha_k_accepts_object_and_pair() {
        let as_object: PrivacyMetricsReport =
            serde_json::from_value(metrics_body(json!({"alpha": 0.5, "k": 2}))).unwrap();
        let as_pair: PrivacyMetricsReport =
            serde_json::from_value(metrics_body(json!([0.5, 2]))).unwrap();

        assert_eq!(as_object.alpha_k_anonymity, as_pair.alpha_k_anonymity);
        assert_eq!(as_pair.alpha_k_anonymity.k, 2.0);
    }

    #[test]
    fn test_missing_metric_field_is_rejected() {
        let mut body = metrics_body(json!([0.5, 2]));
        body.as_object_mut().unwrap().remove("l_diversity");
        assert!(serde_json::from_value::<PrivacyMetricsReport>(body).is_err());
    }

    #[test]
    fn test_weighted_score_is_optional() {
        let report: ComplianceReport = serde_json::from_value(json!({
            "score": {
                "fully_covered": 10,
                "partially_covered": 4,
                "not_covered": 2,
                "coverage_score": 71.5
            },
            "llm_report": "1. Add a retention section."
        }))
        .unwrap();

        assert_eq!(report.score.weighted_score, None);
        assert_eq!(report.score.fully_covered, 10);
    }
}
