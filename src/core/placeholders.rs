//! Client-side stand-ins for values the services do not return yet.
//!
//! Anything in the result that does not come from a service body comes from a
//! [`PlaceholderProvider`]. Swapping in real backend fields means replacing the
//! provider, not the merge.

use crate::domain::model::DistributionType;
use crate::domain::ports::{DistributionProfile, PlaceholderProvider};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderMode {
    #[default]
    Random,
    Fixed,
}

impl FromStr for PlaceholderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(PlaceholderMode::Random),
            "fixed" => Ok(PlaceholderMode::Fixed),
            other => Err(format!("unknown placeholder mode '{}', expected random or fixed", other)),
        }
    }
}

/// 隨機值，範圍與儀表板示範資料相同
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPlaceholders;

impl PlaceholderProvider for RandomPlaceholders {
    fn below_threshold_count(&self) -> u32 {
        rand::thread_rng().gen_range(3..7)
    }

    fn fallback_compliance_score(&self) -> f64 {
        f64::from(rand::thread_rng().gen_range(30u32..100))
    }

    fn distribution_profile(&self, distribution: DistributionType) -> DistributionProfile {
        let mut rng = rand::thread_rng();
        let compliance_score = rng.gen_range(30..100);

        if distribution.is_centralized() {
            return DistributionProfile {
                nodes: 1,
                variance: 0.0,
                dominant_node: 100,
                compliance_score,
            };
        }

        DistributionProfile {
            nodes: rng.gen_range(5..25),
            variance: rng.gen_range(0.0..0.5),
            dominant_node: rng.gen_range(0..100),
            compliance_score,
        }
    }
}

/// Deterministic values, the midpoints of the random ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPlaceholders {
    pub below_threshold: u32,
    pub compliance_score: f64,
    pub distributed_profile: DistributionProfile,
}

impl Default for FixedPlaceholders {
    fn default() -> Self {
        Self {
            below_threshold: 4,
            compliance_score: 65.0,
            distributed_profile: DistributionProfile {
                nodes: 15,
                variance: 0.25,
                dominant_node: 50,
                compliance_score: 65,
            },
        }
    }
}

impl PlaceholderProvider for FixedPlaceholders {
    fn below_threshold_count(&self) -> u32 {
        self.below_threshold
    }

    fn fallback_compliance_score(&self) -> f64 {
        self.compliance_score
    }

    fn distribution_profile(&self, distribution: DistributionType) -> DistributionProfile {
        if distribution.is_centralized() {
            DistributionProfile {
                nodes: 1,
                variance: 0.0,
                dominant_node: 100,
                compliance_score: self.distributed_profile.compliance_score,
            }
        } else {
            self.distributed_profile
        }
    }
}

/// 依設定選擇實作
pub fn provider_for(mode: PlaceholderMode) -> Box<dyn PlaceholderProvider> {
    match mode {
        PlaceholderMode::Random => Box::new(RandomPlaceholders),
        PlaceholderMode::Fixed => Box::new(FixedPlaceholders::default()),
    }
}

impl<P: PlaceholderProvider + ?Sized> PlaceholderProvider for Box<P> {
    fn below_threshold_count(&self) -> u32 {
        (**self).below_threshold_count()
    }

    fn fallback_compliance_score(&self) -> f64 {
        (**self).fallback_compliance_score()
    }

    fn distribution_profile(&self, distribution: DistributionType) -> DistributionProfile {
        (**self).distribution_profile(distribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_values_stay_in_range() {
        let provider = RandomPlaceholders;
        for _ in 0..200 {
            let below = provider.below_threshold_count();
            assert!((3..=6).contains(&below));

            let score = provider.fallback_compliance_score();
            assert!((30.0..100.0).contains(&score));

            let profile = provider.distribution_profile(DistributionType::Federated);
            assert!((5..25).contains(&profile.nodes));
            assert!((0.0..0.5).contains(&profile.variance));
            assert!(profile.dominant_node < 100);
        }
    }

    #[test]
    fn test_centralized_profile_is_single_node() {
        for provider in [provider_for(PlaceholderMode::Random), provider_for(PlaceholderMode::Fixed)] {
            let profile = provider.distribution_profile(DistributionType::Centralized);
            assert_eq!(profile.nodes, 1);
            assert_eq!(profile.variance, 0.0);
            assert_eq!(profile.dominant_node, 100);
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Fixed".parse::<PlaceholderMode>().unwrap(), PlaceholderMode::Fixed);
        assert!("sometimes".parse::<PlaceholderMode>().is_err());
    }
}
