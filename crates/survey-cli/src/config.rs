//! Planner configuration from environment.

use std::env;
use survey_core::{Algorithm, PlannerRules};

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub brute_force_limit: usize,
    pub exact_matching_limit: usize,
    pub zone_tolerance_deg: f64,
    pub complexity_fallback: Option<Algorithm>,
    /// Planning deadline for plan_mission when --timeout-secs is not given
    pub timeout_secs: u64,
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PlannerRules::default();
        Self {
            brute_force_limit: lookup("SURVEY_BRUTE_FORCE_LIMIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.brute_force_limit),
            exact_matching_limit: lookup("SURVEY_EXACT_MATCHING_LIMIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.exact_matching_limit),
            zone_tolerance_deg: lookup("SURVEY_ZONE_TOLERANCE_DEG")
                .and_then(|s| s.parse().ok())
                .filter(|v: &f64| v.is_finite() && *v >= 0.0)
                .unwrap_or(defaults.zone_overrun_tolerance_deg),
            complexity_fallback: lookup("SURVEY_COMPLEXITY_FALLBACK")
                .and_then(|s| s.parse().ok())
                .or(defaults.complexity_fallback),
            timeout_secs: lookup("SURVEY_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }

    pub fn rules(&self) -> PlannerRules {
        PlannerRules {
            brute_force_limit: self.brute_force_limit,
            exact_matching_limit: self.exact_matching_limit,
            zone_overrun_tolerance_deg: self.zone_tolerance_deg,
            complexity_fallback: self.complexity_fallback,
            ..PlannerRules::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> CliConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        let rules = config.rules();
        assert_eq!(rules.brute_force_limit, 10);
        assert_eq!(rules.exact_matching_limit, 18);
        assert_eq!(rules.complexity_fallback, None);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = config_from(&[
            ("SURVEY_BRUTE_FORCE_LIMIT", "12"),
            ("SURVEY_EXACT_MATCHING_LIMIT", "lots"),
            ("SURVEY_ZONE_TOLERANCE_DEG", "-2"),
            ("SURVEY_COMPLEXITY_FALLBACK", "christofides"),
        ]);
        let rules = config.rules();
        assert_eq!(rules.brute_force_limit, 12);
        assert_eq!(rules.exact_matching_limit, 18);
        assert_eq!(rules.zone_overrun_tolerance_deg, 1.0);
        assert_eq!(
            rules.complexity_fallback,
            Some(Algorithm::ChristofidesAlgorithm)
        );
    }
}
