use std::collections::BTreeMap;

use tracing::warn;

use super::domain::{KpiResult, MinimumRequirementViolation};
use super::profile::RiskProfile;

/// Metrics subject to minimum-score floors and the points a breach costs.
pub const CHECKED_MINIMUMS: [(&str, f64); 6] = [
    ("accidents", 25.0),
    ("staffing", 20.0),
    ("training", 15.0),
    ("equipment", 15.0),
    ("ppe", 20.0),
    ("workplace_assessment", 12.0),
];

pub fn base_penalty(metric: &str) -> Option<f64> {
    CHECKED_MINIMUMS
        .iter()
        .find(|(key, _)| *key == metric)
        .map(|(_, penalty)| *penalty)
}

/// Compare measured scores against the profile's floors.
///
/// Unmeasured KPIs are not checked. Without a profile there is nothing to breach.
pub fn check_minimums(
    profile: Option<&RiskProfile>,
    results: &BTreeMap<String, KpiResult>,
) -> Vec<MinimumRequirementViolation> {
    let Some(profile) = profile else {
        return Vec::new();
    };

    CHECKED_MINIMUMS
        .iter()
        .filter_map(|(metric, penalty)| {
            let required = profile.floor(metric)?;
            let actual = results.get(*metric)?.score;
            if f64::from(actual) >= required {
                return None;
            }
            let penalty = penalty * profile.penalty_multiplier;
            warn!(
                profile = %profile.id,
                metric = *metric,
                required,
                actual,
                penalty,
                "minimum requirement breached"
            );
            Some(MinimumRequirementViolation {
                metric: (*metric).to_string(),
                required,
                actual,
                penalty,
            })
        })
        .collect()
}

/// Subtract breach penalties from the weighted composite, flooring at zero.
pub fn apply_penalties(composite: f64, violations: &[MinimumRequirementViolation]) -> f64 {
    let penalty: f64 = violations.iter().map(|violation| violation.penalty).sum();
    (composite - penalty).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::profile::RiskTier;

    fn results(entries: &[(&str, u8)]) -> BTreeMap<String, KpiResult> {
        entries
            .iter()
            .map(|(key, score)| {
                (
                    key.to_string(),
                    KpiResult {
                        value: f64::from(*score),
                        score: *score,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn no_profile_means_no_violations() {
        let scores = results(&[("staffing", 0), ("accidents", 0)]);
        assert!(check_minimums(None, &scores).is_empty());
    }

    #[test]
    fn staffing_breach_costs_twenty_points() {
        let profile = RiskProfile::new("site", RiskTier::High).with_floor("staffing", 70.0);
        let scores = results(&[("staffing", 60), ("training", 90)]);

        let violations = check_minimums(Some(&profile), &scores);

        assert_eq!(
            violations,
            vec![MinimumRequirementViolation {
                metric: "staffing".to_string(),
                required: 70.0,
                actual: 60,
                penalty: 20.0,
            }]
        );
        assert_eq!(apply_penalties(75.0, &violations), 55.0);
    }

    #[test]
    fn meeting_the_floor_exactly_is_not_a_breach() {
        let profile = RiskProfile::new("site", RiskTier::High).with_floor("ppe", 80.0);
        let scores = results(&[("ppe", 80)]);
        assert!(check_minimums(Some(&profile), &scores).is_empty());
    }

    #[test]
    fn unmeasured_metrics_are_skipped() {
        let profile = RiskProfile::new("site", RiskTier::High).with_floor("equipment", 65.0);
        assert!(check_minimums(Some(&profile), &BTreeMap::new()).is_empty());
    }

    #[test]
    fn penalties_follow_checked_order_and_multiplier() {
        let profile = RiskProfile::new("site", RiskTier::Critical)
            .with_floor("ppe", 90.0)
            .with_floor("accidents", 60.0)
            .with_floor("workplace_assessment", 80.0)
            .with_penalty_multiplier(1.5);
        let scores = results(&[("ppe", 40), ("accidents", 10), ("workplace_assessment", 20)]);

        let violations = check_minimums(Some(&profile), &scores);
        let breached: Vec<(&str, f64)> = violations
            .iter()
            .map(|v| (v.metric.as_str(), v.penalty))
            .collect();

        assert_eq!(
            breached,
            vec![("accidents", 37.5), ("ppe", 30.0), ("workplace_assessment", 18.0)]
        );
        assert_eq!(apply_penalties(50.0, &violations), 0.0);
    }

    #[test]
    fn base_penalties_cover_only_checked_metrics() {
        assert_eq!(base_penalty("accidents"), Some(25.0));
        assert_eq!(base_penalty("workplace_assessment"), Some(12.0));
        assert_eq!(base_penalty("insurance"), None);
    }
}
