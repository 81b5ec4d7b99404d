use crate::domain::model::PrivacySettings;
use crate::domain::ports::PlaceholderProvider;
use crate::domain::result::{
    AdversarySuccess, DataDistribution, DataSimilarity, EvaluationResult, GdprCompliance,
    InformationGain, OrganizedPrivacyMetrics, RiskLevel, Uncertainty,
};
use crate::domain::services::{ComplianceReport, PrivacyMetricsReport};
use regex::Regex;
use std::sync::LazyLock;

pub const MAX_RECOMMENDATIONS: usize = 3;

// 條列標記："1. " 位於行首或空白之後；"2.5" 這類小數不算
static NUMBERED_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[ \t])(\d+\.[ \t]+)").expect("numbered marker pattern is valid")
});

// 句點後面不代表句子結束的縮寫
const ABBREVIATIONS: &[&str] = &[
    "art", "arts", "no", "nr", "sec", "para", "cf", "etc", "vs", "approx",
];

/// 從報告文字擷取條列建議，最多 `limit` 條
///
/// Each item runs from its marker to the first sentence end, the next marker,
/// or the end of the line, whichever comes first.
pub fn extract_recommendations(report: &str, limit: usize) -> Vec<String> {
    report
        .lines()
        .flat_map(numbered_items)
        .take(limit)
        .collect()
}

fn numbered_items(line: &str) -> Vec<String> {
    let starts: Vec<(usize, usize)> = NUMBERED_MARKER
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .map(|marker| (marker.start(), marker.end()))
        .collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &(start, body_start))| {
            let end = starts.get(i + 1).map_or(line.len(), |&(next, _)| next);
            let body = &line[body_start..end];
            let item_end = body_start + sentence_end(body).unwrap_or(body.len());
            if line[body_start..item_end].trim().is_empty() {
                return None;
            }
            Some(line[start..item_end].trim_end().to_string())
        })
        .collect()
}

/// 第一個真正的句點之後的位置
fn sentence_end(body: &str) -> Option<usize> {
    body.char_indices()
        .filter(|&(_, c)| c == '.')
        .map(|(i, _)| i + 1)
        .find(|&after| {
            let rest = &body[after..];
            let Some(next) = rest.chars().next() else {
                return true;
            };
            if !next.is_whitespace() {
                return false;
            }
            let following = rest.trim_start();
            let starts_sentence = following
                .chars()
                .next()
                .map_or(true, |c| c.is_uppercase());
            starts_sentence && !is_abbreviation(&body[..after - 1])
        })
}

fn is_abbreviation(before_period: &str) -> bool {
    let word = before_period
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric());
    word.contains('.') || ABBREVIATIONS.contains(&word.to_ascii_lowercase().as_str())
}

pub fn rule_based_feedback(
    compliance_score: f64,
    settings: &PrivacySettings,
    metrics: &PrivacyMetricsReport,
) -> Vec<String> {
    let mut items = Vec::new();

    if compliance_score < 80.0 {
        items.push("Improve GDPR coverage in documentation".to_string());
    }
    if settings.encryption_type.is_weak() {
        items.push("Upgrade encryption method to asymmetric or hybrid".to_string());
    }
    if settings.distribution_type.is_centralized() {
        items.push("Consider a more distributed data storage approach".to_string());
    }
    if metrics.k_anonymity < 2.0 {
        items.push("Increase k-anonymity level to at least 2".to_string());
    }
    if metrics.l_diversity < 1.0 {
        items.push("Implement l-diversity measures".to_string());
    }
    if metrics.adversary_success_rate.average_success_rate > 0.8 {
        items.push("Reduce adversary success rate through additional anonymization".to_string());
    }

    items
}

/// Builds the display model from both service bodies.
///
/// Every field comes from `report`, `metrics`, the user's `settings`, or
/// `placeholders`.
pub fn merge_results<P: PlaceholderProvider + ?Sized>(
    report: ComplianceReport,
    metrics: PrivacyMetricsReport,
    settings: PrivacySettings,
    placeholders: &P,
) -> EvaluationResult {
    let compliance_score = report
        .score
        .weighted_score
        .unwrap_or_else(|| placeholders.fallback_compliance_score());

    let profile = placeholders.distribution_profile(settings.distribution_type);

    let mut feedback_items = extract_recommendations(&report.llm_report, MAX_RECOMMENDATIONS);
    feedback_items.extend(rule_based_feedback(compliance_score, &settings, &metrics));
    if feedback_items.is_empty() {
        feedback_items.push("Maintain current compliance practices".to_string());
    }

    EvaluationResult {
        compliance_score,
        risk_level: RiskLevel::from_score(compliance_score),
        encryption_type: settings.encryption_type,
        encryption_strength: settings.encryption_type.strength(),
        gdpr_compliance: GdprCompliance {
            fully_covered: report.score.fully_covered,
            partially_covered: report.score.partially_covered,
            not_covered: report.score.not_covered,
            below_threshold: placeholders.below_threshold_count(),
            weighted_score: report.score.weighted_score,
            coverage_score: report.score.coverage_score,
        },
        data_distribution: DataDistribution {
            distribution_type: settings.distribution_type,
            nodes: profile.nodes,
            variance: profile.variance,
            dominant_node: profile.dominant_node,
            compliance_score: profile.compliance_score,
        },
        privacy_metrics: OrganizedPrivacyMetrics {
            adversary_success: AdversarySuccess {
                adversary_success_rate: metrics.adversary_success_rate,
                delta_presence: metrics.delta_presence,
            },
            data_similarity: DataSimilarity {
                k_anonymity: metrics.k_anonymity,
                alpha_k_anonymity: metrics.alpha_k_anonymity,
                l_diversity: metrics.l_diversity,
            },
            information_gain: InformationGain {
                mutual_information: metrics.mutual_information,
                relative_entropy: metrics.privacy_score_entropy,
            },
            uncertainty: Uncertainty {
                avg_entropy: metrics.uncertainty_metrics.avg_entropy,
                avg_min_entropy: metrics.uncertainty_metrics.avg_min_entropy,
                avg_normalized_entropy: metrics.uncertainty_metrics.avg_normalized_entropy,
            },
        },
        feedback_items,
        llm_report: report.llm_report,
        evaluated_at: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::placeholders::FixedPlaceholders;
    use crate::domain::model::{DistributionType, EncryptionType};
    use crate::domain::services::{
        AdversarySuccessRate, AlphaKAnonymity, ComplianceScore, DeltaPresence, UncertaintyMetrics,
    };

    fn report(weighted: Option<f64>, text: &str) -> ComplianceReport {
        ComplianceReport {
            score: ComplianceScore {
                fully_covered: 18,
                partially_covered: 6,
                not_covered: 5,
                weighted_score: weighted,
                coverage_score: 72.0,
            },
            llm_report: text.to_string(),
        }
    }

    fn metrics(k: f64, l: f64, adversary: f64) -> PrivacyMetricsReport {
        PrivacyMetricsReport {
            k_anonymity: k,
            alpha_k_anonymity: AlphaKAnonymity { alpha: 0.5, k: 2.0 },
            l_diversity: l,
            adversary_success_rate: AdversarySuccessRate {
                average_success_rate: adversary,
                min_success_rate: 0.05,
                max_success_rate: 0.95,
                num_equivalence_classes: 7,
            },
            delta_presence: DeltaPresence {
                shared_records: 30,
                published_records: 120,
            },
            mutual_information: 0.33,
            privacy_score_entropy: 1.4,
            uncertainty_metrics: UncertaintyMetrics {
                avg_entropy: 2.2,
                avg_min_entropy: 1.1,
                avg_normalized_entropy: 0.7,
            },
        }
    }

    fn strong_settings() -> PrivacySettings {
        PrivacySettings {
            encryption_type: EncryptionType::Hybrid,
            distribution_type: DistributionType::Federated,
        }
    }

    #[test]
    fn test_extracts_first_three_numbered_points() {
        let text = "Intro. 1. Do X. 2. Do Y. Random. 3. Do Z. 4. Do W.";
        assert_eq!(
            extract_recommendations(text, MAX_RECOMMENDATIONS),
            vec!["1. Do X.", "2. Do Y.", "3. Do Z."]
        );
    }

    #[test]
    fn test_extracts_line_based_points_without_periods() {
        let text = "Summary\n1. Add a DPO contact\n2. Document retention periods\n";
        assert_eq!(
            extract_recommendations(text, MAX_RECOMMENDATIONS),
            vec!["1. Add a DPO contact", "2. Document retention periods"]
        );
    }

    #[test]
    fn test_inner_periods_do_not_cut_points_short() {
        let text = "1. Keep logs for 2.5 years. 2. Use e.g. AES.";
        assert_eq!(
            extract_recommendations(text, MAX_RECOMMENDATIONS),
            vec!["1. Keep logs for 2.5 years.", "2. Use e.g. AES."]
        );
    }

    #[test]
    fn test_article_references_stay_in_point() {
        let text = "Gaps found.\n1. Cite Art. 6 as the lawful basis. 2. List processors (cf. Art. 28).";
        assert_eq!(
            extract_recommendations(text, MAX_RECOMMENDATIONS),
            vec![
                "1. Cite Art. 6 as the lawful basis.",
                "2. List processors (cf. Art. 28).",
            ]
        );
    }

    #[test]
    fn test_no_numbered_points() {
        assert!(extract_recommendations("The policy looks fine.", 3).is_empty());
    }

    #[test]
    fn test_rule_based_feedback_all_triggered() {
        let settings = PrivacySettings {
            encryption_type: EncryptionType::NoEncryption,
            distribution_type: DistributionType::Centralized,
        };
        let items = rule_based_feedback(40.0, &settings, &metrics(1.0, 0.0, 0.9));

        assert_eq!(
            items,
            vec![
                "Improve GDPR coverage in documentation",
                "Upgrade encryption method to asymmetric or hybrid",
                "Consider a more distributed data storage approach",
                "Increase k-anonymity level to at least 2",
                "Implement l-diversity measures",
                "Reduce adversary success rate through additional anonymization",
            ]
        );
    }

    #[test]
    fn test_merge_traces_every_field() {
        let placeholders = FixedPlaceholders::default();
        let result = merge_results(
            report(Some(84.5), "1. Name a DPO. 2. Add retention."),
            metrics(3.0, 2.0, 0.2),
            strong_settings(),
            &placeholders,
        );

        assert_eq!(result.compliance_score, 84.5);
        assert_eq!(result.risk_level, RiskLevel::Compliant);
        assert_eq!(result.encryption_type, EncryptionType::Hybrid);
        assert_eq!(result.encryption_strength, "Strong");
        assert_eq!(result.gdpr_compliance.fully_covered, 18);
        assert_eq!(result.gdpr_compliance.partially_covered, 6);
        assert_eq!(result.gdpr_compliance.not_covered, 5);
        assert_eq!(result.gdpr_compliance.coverage_score, 72.0);
        assert_eq!(result.gdpr_compliance.below_threshold, placeholders.below_threshold);
        assert_eq!(result.data_distribution.distribution_type, DistributionType::Federated);
        assert_eq!(result.data_distribution.nodes, placeholders.distributed_profile.nodes);

        let privacy = &result.privacy_metrics;
        assert_eq!(privacy.data_similarity.k_anonymity, 3.0);
        assert_eq!(privacy.data_similarity.alpha_k_anonymity.alpha, 0.5);
        assert_eq!(privacy.adversary_success.delta_presence.published_records, 120);
        assert_eq!(privacy.information_gain.relative_entropy, 1.4);
        assert_eq!(privacy.uncertainty.avg_normalized_entropy, 0.7);

        assert_eq!(result.feedback_items, vec!["1. Name a DPO.", "2. Add retention."]);
        assert_eq!(result.llm_report, "1. Name a DPO. 2. Add retention.");
    }

    #[test]
    fn test_missing_weighted_score_uses_placeholder() {
        let placeholders = FixedPlaceholders {
            compliance_score: 42.0,
            ..FixedPlaceholders::default()
        };
        let result = merge_results(
            report(None, ""),
            metrics(3.0, 2.0, 0.2),
            strong_settings(),
            &placeholders,
        );

        assert_eq!(result.compliance_score, 42.0);
        assert_eq!(result.risk_level, RiskLevel::CriticalRisk);
        assert_eq!(result.gdpr_compliance.weighted_score, None);
        assert_eq!(result.feedback_items, vec!["Improve GDPR coverage in documentation"]);
    }

    #[test]
    fn test_clean_evaluation_gets_maintain_message() {
        let result = merge_results(
            report(Some(95.0), "No issues."),
            metrics(5.0, 3.0, 0.1),
            strong_settings(),
            &FixedPlaceholders::default(),
        );
        assert_eq!(result.feedback_items, vec!["Maintain current compliance practices"]);
    }

    #[test]
    fn test_recommendations_come_before_rules() {
        let result = merge_results(
            report(Some(60.0), "1. First. 2. Second. 3. Third. 4. Fourth."),
            metrics(5.0, 3.0, 0.1),
            strong_settings(),
            &FixedPlaceholders::default(),
        );
        assert_eq!(
            result.feedback_items,
            vec![
                "1. First.",
                "2. Second.",
                "3. Third.",
                "Improve GDPR coverage in documentation"
            ]
        );
    }
}
