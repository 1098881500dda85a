use super::common::*;
use crate::scoring::{
    EngineSettings, EvaluationWarning, MinimumRequirementViolation, OrganizationalUnit, RawInput,
    RiskProfile, RiskProfileRegistry, RiskTier, Zone,
};

fn staffing_and_training_only() -> RawInput {
    RawInput {
        light_accidents: None,
        ..reference_input()
    }
}

#[test]
fn staffing_floor_breach_costs_twenty_points() {
    let unit = reference_unit().with_risk_profile("manufacturing");

    let result = engine().evaluate(&unit, &staffing_and_training_only());

    assert_eq!(result.risk_profile.as_deref(), Some("high"));
    assert_eq!(
        result.violations,
        vec![MinimumRequirementViolation {
            metric: "staffing".to_string(),
            required: 70.0,
            actual: 60,
            penalty: 20.0,
        }]
    );
    assert_eq!(result.total_penalty(), 20.0);
    assert_eq!(result.composite_score, 63.1);
    assert_eq!(result.zone, Zone::Yellow);
}

#[test]
fn same_unit_without_profile_is_green() {
    let result = engine().evaluate(&reference_unit(), &staffing_and_training_only());

    assert!(result.violations.is_empty());
    assert_eq!(result.composite_score, 83.1);
    assert_eq!(result.zone, Zone::Green);
}

#[test]
fn unmeasured_kpis_are_never_breached() {
    let unit = reference_unit().with_risk_profile("critical");
    let input = RawInput {
        training_passed: Some(450.0),
        training_required: Some(500.0),
        ..RawInput::default()
    };

    let result = engine().evaluate(&unit, &input);

    assert!(result.violations.is_empty());
}

#[test]
fn critical_domain_stacks_penalties_down_to_zero() {
    let unit = reference_unit().with_risk_profile("Construction");
    let input = RawInput {
        fatal_accidents: Some(1),
        hse_staff_actual: Some(3.0),
        hse_staff_required: Some(10.0),
        training_passed: Some(100.0),
        training_required: Some(500.0),
        ppe_issued: Some(250.0),
        ppe_required: Some(500.0),
        ..RawInput::default()
    };

    let result = engine().evaluate(&unit, &input);

    let breached: Vec<(&str, f64)> = result
        .violations
        .iter()
        .map(|violation| (violation.metric.as_str(), violation.penalty))
        .collect();
    assert_eq!(
        breached,
        vec![
            ("accidents", 25.0),
            ("staffing", 20.0),
            ("training", 15.0),
            ("ppe", 20.0),
        ]
    );
    assert_eq!(result.composite_score, 0.0);
    assert_eq!(result.zone, Zone::Red);
}

#[test]
fn overrides_renormalize_to_the_weights_used() {
    let mut profile = RiskProfile::new("focus", RiskTier::Medium);
    for definition in engine().catalog().iter() {
        profile = profile.with_weight_override(definition.key.clone(), 0.0);
    }
    let profile = profile
        .with_weight_override("accidents", 0.6)
        .with_weight_override("staffing", 0.4);
    let registry =
        RiskProfileRegistry::from_parts(vec![profile], Vec::<(String, String)>::new())
            .expect("profile validates");
    let engine = engine_with(registry, EngineSettings::default());

    let unit = OrganizationalUnit::new("yard")
        .with_exposure_hours(1_000_000.0)
        .with_risk_profile("focus");
    let input = RawInput {
        light_accidents: Some(1),
        hse_staff_actual: Some(10.0),
        hse_staff_required: Some(10.0),
        ..RawInput::default()
    };

    let result = engine.evaluate(&unit, &input);

    assert_eq!(result.score_for("accidents"), Some(50));
    assert_eq!(result.score_for("staffing"), Some(100));
    assert_eq!(result.composite_score, 70.0);
    assert_eq!(result.zone, Zone::Yellow);
    assert!(result.warnings.is_empty());
    assert_eq!(result.category_scores.len(), 2);
}

#[test]
fn penalty_multiplier_scales_breaches() {
    let raw = r#"{
        "profiles": [
            {"id": "offshore", "tier": "critical",
             "floors": {"staffing": 90},
             "penalty_multiplier": 1.5}
        ],
        "domains": {"Offshore Drilling": "offshore"}
    }"#;
    let registry = RiskProfileRegistry::from_json_str(raw).expect("registry parses");
    let engine = engine_with(registry, EngineSettings::default());
    let unit = reference_unit().with_risk_profile("offshore drilling");

    let result = engine.evaluate(&unit, &staffing_and_training_only());

    assert_eq!(result.risk_profile.as_deref(), Some("offshore"));
    assert_eq!(result.total_penalty(), 30.0);
    assert_eq!(result.composite_score, 53.1);
}

#[test]
fn unknown_profile_reference_degrades_to_defaults() {
    let unit = reference_unit().with_risk_profile("agriculture");

    let result = engine().evaluate(&unit, &reference_input());

    assert!(result.risk_profile.is_none());
    assert!(result.violations.is_empty());
    assert_eq!(result.composite_score, 74.7);
    assert_eq!(
        result.warnings.first(),
        Some(&EvaluationWarning::UnknownRiskProfile {
            reference: "agriculture".to_string(),
        })
    );
}

#[test]
fn critical_overrides_shift_the_composite() {
    let input = reference_input();
    let plain = engine().evaluate(&reference_unit(), &input);
    let critical = engine().evaluate(&reference_unit().with_risk_profile("critical"), &input);

    assert_eq!(critical.risk_profile.as_deref(), Some("critical"));
    assert_eq!(plain.composite_score, 74.7);
    // overridden weights sum to 1.08: 77.93 / 1.08 = 72.157, less 25 + 20 in breaches
    assert_eq!(critical.composite_score, 27.2);
    assert_eq!(critical.zone, Zone::Red);
    // accidents at 0.22 next to occupational and incident-free days
    assert_eq!(critical.category_scores.get("incidents"), Some(&45.9));
    assert_eq!(
        critical
            .violations
            .iter()
            .map(|violation| violation.metric.as_str())
            .collect::<Vec<_>>(),
        vec!["accidents", "staffing"]
    );
}
