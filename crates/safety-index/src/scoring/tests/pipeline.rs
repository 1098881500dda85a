use super::common::*;
use crate::scoring::{
    evaluate, DisciplineScoringStrategy, EngineSettings, EvaluationWarning, MetricCatalog,
    OrganizationalUnit, RawInput, RiskProfileRegistry, TicketTally, Zone,
};

#[test]
fn reference_unit_lands_in_yellow_zone() {
    let result = engine().evaluate(&reference_unit(), &reference_input());

    let accidents = result.kpi_results["accidents"];
    assert_close(accidents.value, 21.978_021_978);
    assert_eq!(accidents.score, 29);
    assert_eq!(result.score_for("staffing"), Some(60));
    assert_eq!(result.score_for("training"), Some(90));
    assert_eq!(result.kpi_results.len(), 3);

    assert_eq!(result.composite_score, 74.7);
    assert_eq!(result.zone, Zone::Yellow);
    assert!(result.violations.is_empty());
    assert!(result.risk_profile.is_none());
}

#[test]
fn reference_unit_reports_every_stand_in() {
    let result = engine().evaluate(&reference_unit(), &reference_input());

    let missing: Vec<&str> = result
        .warnings
        .iter()
        .filter_map(|warning| match warning {
            EvaluationWarning::MissingInput { metric, .. } => Some(metric.as_str()),
            _ => None,
        })
        .collect();

    assert_eq!(missing.len(), 13);
    assert_eq!(result.warnings.len(), 13);
    assert_eq!(missing.first(), Some(&"occupational"));
    assert!(result.warnings.contains(&EvaluationWarning::MissingInput {
        metric: "ppe".to_string(),
        substituted_score: 95.0,
    }));
    assert!(!missing.contains(&"accidents"));
}

#[test]
fn category_scores_follow_the_same_weighting() {
    let result = engine().evaluate(&reference_unit(), &reference_input());

    assert_eq!(result.category_scores.get("incidents"), Some(&51.1));
    assert_eq!(result.category_scores.get("organization"), Some(&60.0));
    assert_eq!(result.category_scores.get("training"), Some(&90.0));
    assert_eq!(result.category_scores.len(), 9);
}

#[test]
fn fully_reported_period_is_green() {
    let result = engine().evaluate(&reference_unit(), &exemplary_input());

    assert_eq!(result.kpi_results.len(), 15);
    assert_eq!(result.score_for("accidents"), Some(100));
    assert_eq!(result.score_for("work_stoppage"), Some(100));
    assert_eq!(result.score_for("insurance"), Some(100));
    assert_eq!(result.composite_score, 98.0);
    assert_eq!(result.zone, Zone::Green);
    assert_eq!(
        result.warnings,
        vec![EvaluationWarning::MissingInput {
            metric: "violations".to_string(),
            substituted_score: 50.0,
        }]
    );
}

#[test]
fn empty_input_scores_every_target() {
    let unit = OrganizationalUnit::new("depot");
    let result = engine().evaluate(&unit, &RawInput::default());

    assert!(result.kpi_results.is_empty());
    assert_eq!(
        result.warnings.first(),
        Some(&EvaluationWarning::DefaultedEmployeeCount { employees: 100 })
    );
    assert_eq!(result.warnings.len(), 17);
    assert!((50.0..=100.0).contains(&result.composite_score));
}

#[test]
fn exposure_hours_take_precedence_over_headcount() {
    let unit = OrganizationalUnit::new("yard")
        .with_employees(500)
        .with_exposure_hours(1_000_000.0);
    let input = RawInput {
        light_accidents: Some(1),
        ..RawInput::default()
    };

    let result = engine().evaluate(&unit, &input);

    assert_close(result.kpi_results["accidents"].value, 10.0);
    assert_eq!(result.score_for("accidents"), Some(50));
}

#[test]
fn discipline_strategy_is_selectable_per_engine() {
    let input = RawInput {
        external_tickets: Some(TicketTally {
            major: 1,
            ..TicketTally::default()
        }),
        ..RawInput::default()
    };
    let staircase = engine_with(
        RiskProfileRegistry::empty(),
        EngineSettings {
            discipline_strategy: DisciplineScoringStrategy::PenaltyStaircase,
            ..EngineSettings::default()
        },
    );

    let midpoint_result = engine().evaluate(&reference_unit(), &input);
    let staircase_result = staircase.evaluate(&reference_unit(), &input);

    assert_eq!(midpoint_result.kpi_results["violations"].value, -10.0);
    assert_eq!(midpoint_result.score_for("violations"), Some(40));
    assert_eq!(staircase_result.score_for("violations"), Some(15));
}

#[test]
fn evaluation_is_deterministic() {
    let engine = engine();
    let unit = reference_unit().with_risk_profile("manufacturing");
    let input = reference_input();

    let first = engine.evaluate(&unit, &input);
    let second = engine.evaluate(&unit, &input);
    let free = evaluate(
        engine.catalog(),
        engine.registry(),
        engine.settings(),
        &unit,
        &input,
    );

    assert_eq!(first, second);
    assert_eq!(first, free);
}

#[test]
fn shared_engine_agrees_across_threads() {
    let engine = engine();
    let expected = engine.evaluate(&reference_unit(), &reference_input());
    let shared = &engine;

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || shared.evaluate(&reference_unit(), &reference_input())))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker completes"))
            .collect()
    });

    assert!(results.iter().all(|result| *result == expected));
}

#[test]
fn scores_stay_in_bounds_for_extreme_inputs() {
    let engine = engine();
    let extremes = [0.0, -50.0, 1e12, f64::NAN, f64::INFINITY];
    let counts = [0, 1, 7, u32::MAX];

    for (position, &value) in extremes.iter().enumerate() {
        let count = counts[position % counts.len()];
        let input = RawInput {
            fatal_accidents: Some(count),
            light_accidents: Some(count),
            occupational_cases: Some(count),
            hse_staff_actual: Some(value),
            hse_staff_required: Some(value),
            training_passed: Some(value),
            training_required: Some(10.0),
            ppe_issued: Some(value),
            ppe_required: Some(-1.0),
            equipment_inspected: Some(value),
            internal_stoppages: Some(count),
            external_stoppages: Some(count),
            internal_tickets: Some(TicketTally {
                minor: count,
                major: count,
                critical: count,
            }),
            insurance_payment: Some(value),
            payroll: Some(value),
            compliance_issues: Some(value),
            compliance_points: Some(5.0),
            extra_metrics: [("near_miss".to_string(), value)].into_iter().collect(),
            ..RawInput::default()
        };
        let unit = OrganizationalUnit::new("extreme")
            .with_employees(count)
            .with_risk_profile("mining");

        let result = engine.evaluate(&unit, &input);

        assert!(
            (0.0..=100.0).contains(&result.composite_score),
            "composite {} out of range for {value}",
            result.composite_score
        );
        assert_eq!(result.zone, Zone::classify(result.composite_score));
        for (key, kpi) in &result.kpi_results {
            assert!(kpi.score <= 100, "{key} scored {}", kpi.score);
            assert!(kpi.value.is_finite(), "{key} value {}", kpi.value);
        }
        for (category, score) in &result.category_scores {
            assert!((0.0..=100.0).contains(score), "{category} scored {score}");
        }
    }
}

#[test]
fn catalog_without_weight_scores_zero() {
    let mut definitions = MetricCatalog::standard().definitions().to_vec();
    for definition in &mut definitions {
        definition.weight = 0.0;
    }
    let catalog = MetricCatalog::from_definitions(definitions).expect("zero weights are valid");

    let result = evaluate(
        &catalog,
        &RiskProfileRegistry::empty(),
        &EngineSettings::default(),
        &reference_unit(),
        &reference_input(),
    );

    assert_eq!(result.composite_score, 0.0);
    assert_eq!(result.zone, Zone::Red);
    assert!(result.category_scores.is_empty());
    assert_eq!(result.score_for("training"), Some(90));
}
