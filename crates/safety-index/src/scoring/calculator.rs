//! Native-unit KPI values derived from raw counters.
//!
//! Denominators that are zero or negative yield a zero value, never an error.

use std::collections::BTreeMap;

use super::catalog::BuiltinKpi;
use super::domain::{RawInput, TicketTally};

/// Annual working hours assumed per employee when exposure hours are not reported.
pub const HOURS_PER_EMPLOYEE: f64 = 1820.0;

const FATAL_WEIGHT: f64 = 100.0;
const SEVERE_WEIGHT: f64 = 50.0;
const GROUP_WEIGHT: f64 = 40.0;
const LIGHT_WEIGHT: f64 = 10.0;
const EXPOSURE_SCALE: f64 = 1_000_000.0;

const INTERNAL_TICKET_REWARD: [f64; 3] = [1.0, 2.0, 3.0];
const EXTERNAL_TICKET_PENALTY: [f64; 3] = [5.0, 10.0, 20.0];

/// Values for every built-in KPI that had at least one input field present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetrics {
    values: BTreeMap<BuiltinKpi, f64>,
}

impl RawMetrics {
    pub fn get(&self, kpi: BuiltinKpi) -> Option<f64> {
        self.values.get(&kpi).copied()
    }

    pub fn value_for_key(&self, key: &str) -> Option<f64> {
        BuiltinKpi::from_key(key).and_then(|kpi| self.get(kpi))
    }

    pub fn is_measured(&self, kpi: BuiltinKpi) -> bool {
        self.values.contains_key(&kpi)
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    fn record(&mut self, kpi: BuiltinKpi, value: Option<f64>) {
        if let Some(value) = value {
            self.values.insert(kpi, finite_or_zero(value));
        }
    }
}

/// Derive every measurable built-in KPI from the counters.
pub fn calculate(input: &RawInput, exposure_hours: f64) -> RawMetrics {
    let mut metrics = RawMetrics::default();

    let accident_fields = [
        input.fatal_accidents,
        input.severe_accidents,
        input.group_accidents,
        input.light_accidents,
    ];
    if accident_fields.iter().any(Option::is_some) {
        metrics.record(
            BuiltinKpi::Accidents,
            Some(accident_rate(input, exposure_hours)),
        );
    }

    metrics.record(
        BuiltinKpi::Occupational,
        input.occupational_cases.map(f64::from),
    );
    metrics.record(
        BuiltinKpi::NoIncidentDays,
        percent_of(input.days_without_incident, input.period_days),
    );
    metrics.record(
        BuiltinKpi::Staffing,
        percent_of(input.hse_staff_actual, input.hse_staff_required),
    );
    metrics.record(
        BuiltinKpi::Training,
        percent_of(input.training_passed, input.training_required),
    );
    metrics.record(
        BuiltinKpi::Ppe,
        percent_of(input.ppe_issued, input.ppe_required),
    );

    let equipment_fields = [
        input.equipment_inspected,
        input.equipment_total,
        input.authorized_operators,
        input.operator_total,
    ];
    if equipment_fields.iter().any(Option::is_some) {
        let [inspected, total, authorized, staff_total] = equipment_fields.map(|f| f.unwrap_or(0.0));
        metrics.record(
            BuiltinKpi::Equipment,
            Some(equipment_readiness(inspected, total, authorized, staff_total)),
        );
    }

    metrics.record(
        BuiltinKpi::Inspection,
        percent_of(input.inspections_completed, input.inspections_planned),
    );
    metrics.record(
        BuiltinKpi::WorkplaceAssessment,
        percent_of(input.assessments_completed, input.assessments_required),
    );
    metrics.record(
        BuiltinKpi::Prevention,
        percent_of(input.prevention_completed, input.prevention_planned),
    );
    metrics.record(
        BuiltinKpi::Emergency,
        percent_of(input.emergency_drills_held, input.emergency_drills_planned),
    );

    if input.internal_stoppages.is_some() || input.external_stoppages.is_some() {
        metrics.record(
            BuiltinKpi::WorkStoppage,
            Some(work_stoppage_balance(
                input.internal_stoppages.unwrap_or(0),
                input.external_stoppages.unwrap_or(0),
            )),
        );
    }

    if input.internal_tickets.is_some() || input.external_tickets.is_some() {
        metrics.record(
            BuiltinKpi::Violations,
            Some(discipline_balance(
                input.internal_tickets.unwrap_or_default(),
                input.external_tickets.unwrap_or_default(),
            )),
        );
    }

    if input.insurance_payment.is_some() || input.payroll.is_some() {
        metrics.record(
            BuiltinKpi::Insurance,
            Some(insurance_rate(
                input.insurance_payment.unwrap_or(0.0),
                input.payroll.unwrap_or(0.0),
            )),
        );
    }

    metrics.record(
        BuiltinKpi::Compliance,
        conformity_of(input.compliance_issues, input.compliance_points),
    );
    metrics.record(
        BuiltinKpi::Audit,
        conformity_of(input.audit_findings, input.audit_points),
    );

    metrics
}

/// Severity-weighted accident points before exposure scaling.
pub fn accident_penalty(input: &RawInput) -> f64 {
    let count = |value: Option<u32>| f64::from(value.unwrap_or(0));
    count(input.fatal_accidents) * FATAL_WEIGHT
        + count(input.severe_accidents) * SEVERE_WEIGHT
        + count(input.group_accidents) * GROUP_WEIGHT
        + count(input.light_accidents) * LIGHT_WEIGHT
}

/// Accident points per million exposure hours, or the raw points without exposure.
pub fn accident_rate(input: &RawInput, exposure_hours: f64) -> f64 {
    let penalty = accident_penalty(input);
    if exposure_hours > 0.0 {
        penalty * EXPOSURE_SCALE / exposure_hours
    } else {
        penalty
    }
}

pub fn ratio_percent(actual: f64, required: f64) -> f64 {
    if required > 0.0 {
        finite_or_zero(actual / required * 100.0)
    } else {
        0.0
    }
}

pub fn work_stoppage_balance(internal: u32, external: u32) -> f64 {
    f64::from(internal) * 2.0 - f64::from(external) * 20.0
}

/// Insurance payments per thousand of payroll.
pub fn insurance_rate(payment: f64, payroll: f64) -> f64 {
    if payroll > 0.0 {
        finite_or_zero(payment / payroll * 1000.0)
    } else {
        0.0
    }
}

pub fn equipment_readiness(inspected: f64, total: f64, authorized: f64, staff_total: f64) -> f64 {
    0.6 * ratio_percent(inspected, total) + 0.4 * ratio_percent(authorized, staff_total)
}

/// Share of audit points without findings, as a percentage.
pub fn conformity_percent(issues: f64, total_points: f64) -> f64 {
    if total_points > 0.0 {
        finite_or_zero((1.0 - issues / total_points) * 100.0)
    } else {
        0.0
    }
}

/// Internally raised tickets earn a little; tickets raised by outside inspectors cost more.
pub fn discipline_balance(internal: TicketTally, external: TicketTally) -> f64 {
    weighted_tally(internal, INTERNAL_TICKET_REWARD) - weighted_tally(external, EXTERNAL_TICKET_PENALTY)
}

fn weighted_tally(tally: TicketTally, weights: [f64; 3]) -> f64 {
    f64::from(tally.minor) * weights[0]
        + f64::from(tally.major) * weights[1]
        + f64::from(tally.critical) * weights[2]
}

/// Reported hours when positive, otherwise `employees × hours_per_employee`.
pub fn exposure_hours(reported: Option<f64>, employees: u32, hours_per_employee: f64) -> f64 {
    match reported {
        Some(hours) if has_exposure(hours) => hours,
        _ => f64::from(employees) * hours_per_employee,
    }
}

pub fn has_exposure(hours: f64) -> bool {
    hours.is_finite() && hours > 0.0
}

fn percent_of(actual: Option<f64>, required: Option<f64>) -> Option<f64> {
    if actual.is_none() && required.is_none() {
        return None;
    }
    Some(ratio_percent(actual.unwrap_or(0.0), required.unwrap_or(0.0)))
}

fn conformity_of(issues: Option<f64>, total_points: Option<f64>) -> Option<f64> {
    if issues.is_none() && total_points.is_none() {
        return None;
    }
    Some(conformity_percent(
        issues.unwrap_or(0.0),
        total_points.unwrap_or(0.0),
    ))
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accident_points_scale_by_exposure() {
        let input = RawInput {
            light_accidents: Some(2),
            fatal_accidents: Some(0),
            ..RawInput::default()
        };

        assert_eq!(accident_penalty(&input), 20.0);
        let rate = accident_rate(&input, 910_000.0);
        assert!((rate - 21.978_021_978).abs() < 1e-6);
    }

    #[test]
    fn accident_points_stay_unscaled_without_exposure() {
        let input = RawInput {
            fatal_accidents: Some(1),
            severe_accidents: Some(1),
            group_accidents: Some(1),
            light_accidents: Some(1),
            ..RawInput::default()
        };
        assert_eq!(accident_rate(&input, 0.0), 200.0);
    }

    #[test]
    fn ratios_tolerate_missing_denominators() {
        assert_eq!(ratio_percent(8.0, 10.0), 80.0);
        assert_eq!(ratio_percent(8.0, 0.0), 0.0);
        assert_eq!(ratio_percent(8.0, -3.0), 0.0);
        assert_eq!(insurance_rate(500.0, 0.0), 0.0);
        assert_eq!(conformity_percent(3.0, 0.0), 0.0);
    }

    #[test]
    fn composite_formulas() {
        assert_eq!(work_stoppage_balance(4, 1), -12.0);
        assert_eq!(insurance_rate(1_250.0, 100_000.0), 12.5);
        assert_eq!(conformity_percent(5.0, 50.0), 90.0);
        assert_eq!(equipment_readiness(45.0, 50.0, 8.0, 10.0), 86.0);
        assert_eq!(equipment_readiness(45.0, 50.0, 8.0, 0.0), 54.0);
    }

    #[test]
    fn discipline_balance_can_go_negative() {
        let internal = TicketTally {
            minor: 4,
            major: 1,
            critical: 0,
        };
        let external = TicketTally {
            minor: 1,
            major: 0,
            critical: 1,
        };
        assert_eq!(discipline_balance(internal, TicketTally::default()), 6.0);
        assert_eq!(discipline_balance(internal, external), -19.0);
    }

    #[test]
    fn exposure_defaults_to_headcount_hours() {
        assert_eq!(exposure_hours(None, 500, HOURS_PER_EMPLOYEE), 910_000.0);
        assert_eq!(exposure_hours(Some(0.0), 10, HOURS_PER_EMPLOYEE), 18_200.0);
        assert_eq!(exposure_hours(Some(f64::NAN), 10, 2000.0), 20_000.0);
        assert_eq!(exposure_hours(Some(120_000.0), 500, HOURS_PER_EMPLOYEE), 120_000.0);
    }

    #[test]
    fn only_kpis_with_inputs_are_measured() {
        let input = RawInput {
            training_passed: Some(450.0),
            training_required: Some(500.0),
            hse_staff_actual: Some(8.0),
            payroll: Some(0.0),
            ..RawInput::default()
        };

        let metrics = calculate(&input, 910_000.0);

        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics.get(BuiltinKpi::Training), Some(90.0));
        assert_eq!(metrics.get(BuiltinKpi::Staffing), Some(0.0));
        assert_eq!(metrics.get(BuiltinKpi::Insurance), Some(0.0));
        assert!(!metrics.is_measured(BuiltinKpi::Accidents));
        assert_eq!(metrics.value_for_key("training"), Some(90.0));
    }

    #[test]
    fn occupational_cases_pass_through() {
        let input = RawInput {
            occupational_cases: Some(2),
            ..RawInput::default()
        };
        assert_eq!(calculate(&input, 1.0).get(BuiltinKpi::Occupational), Some(2.0));
    }
}
