use crate::scoring::{
    EngineSettings, MetricCatalog, OrganizationalUnit, RawInput, RiskProfileRegistry,
    ScoringEngine,
};

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::standard()
}

pub(super) fn engine_with(registry: RiskProfileRegistry, settings: EngineSettings) -> ScoringEngine {
    ScoringEngine::new(MetricCatalog::standard(), registry, settings)
}

/// 500 employees, no risk profile.
pub(super) fn reference_unit() -> OrganizationalUnit {
    OrganizationalUnit::new("plant-north").with_employees(500)
}

/// Two light accidents, 8 of 10 HSE staff, 450 of 500 trained. Everything else unreported.
pub(super) fn reference_input() -> RawInput {
    RawInput {
        light_accidents: Some(2),
        hse_staff_actual: Some(8.0),
        hse_staff_required: Some(10.0),
        training_passed: Some(450.0),
        training_required: Some(500.0),
        ..RawInput::default()
    }
}

/// A fully reported period with strong numbers across the board.
pub(super) fn exemplary_input() -> RawInput {
    RawInput {
        fatal_accidents: Some(0),
        severe_accidents: Some(0),
        group_accidents: Some(0),
        light_accidents: Some(0),
        occupational_cases: Some(0),
        days_without_incident: Some(365.0),
        period_days: Some(365.0),
        hse_staff_actual: Some(10.0),
        hse_staff_required: Some(10.0),
        training_passed: Some(500.0),
        training_required: Some(500.0),
        ppe_issued: Some(500.0),
        ppe_required: Some(500.0),
        equipment_inspected: Some(40.0),
        equipment_total: Some(40.0),
        authorized_operators: Some(12.0),
        operator_total: Some(12.0),
        inspections_completed: Some(24.0),
        inspections_planned: Some(24.0),
        assessments_completed: Some(18.0),
        assessments_required: Some(18.0),
        prevention_completed: Some(30.0),
        prevention_planned: Some(30.0),
        emergency_drills_held: Some(4.0),
        emergency_drills_planned: Some(4.0),
        internal_stoppages: Some(25),
        external_stoppages: Some(0),
        insurance_payment: Some(0.0),
        payroll: Some(2_000_000.0),
        compliance_issues: Some(0.0),
        compliance_points: Some(120.0),
        audit_findings: Some(0.0),
        audit_points: Some(60.0),
        ..RawInput::default()
    }
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
