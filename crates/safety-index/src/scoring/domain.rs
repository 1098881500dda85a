use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::zone::Zone;

/// Identifier wrapper for organizational units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub String);

/// The unit being evaluated, as supplied by the caller's data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationalUnit {
    pub id: UnitId,
    #[serde(default)]
    pub employee_count: Option<u32>,
    /// Person-hours worked in the period; derived from headcount when absent.
    #[serde(default)]
    pub exposure_hours: Option<f64>,
    /// Risk profile id or operational-domain tag.
    #[serde(default)]
    pub risk_profile: Option<String>,
}

impl OrganizationalUnit {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: UnitId(id.into()),
            employee_count: None,
            exposure_hours: None,
            risk_profile: None,
        }
    }

    pub fn with_employees(mut self, employees: u32) -> Self {
        self.employee_count = Some(employees);
        self
    }

    pub fn with_exposure_hours(mut self, hours: f64) -> Self {
        self.exposure_hours = Some(hours);
        self
    }

    pub fn with_risk_profile(mut self, reference: impl Into<String>) -> Self {
        self.risk_profile = Some(reference.into());
        self
    }
}

/// Ticket counts by severity tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketTally {
    pub minor: u32,
    pub major: u32,
    pub critical: u32,
}

/// Counters reported for one unit and one reporting period.
///
/// Every field is optional. A KPI whose fields are all absent is treated as
/// unmeasured rather than as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawInput {
    pub fatal_accidents: Option<u32>,
    pub severe_accidents: Option<u32>,
    pub group_accidents: Option<u32>,
    pub light_accidents: Option<u32>,
    pub occupational_cases: Option<u32>,
    pub days_without_incident: Option<f64>,
    pub period_days: Option<f64>,
    pub hse_staff_actual: Option<f64>,
    pub hse_staff_required: Option<f64>,
    pub training_passed: Option<f64>,
    pub training_required: Option<f64>,
    pub ppe_issued: Option<f64>,
    pub ppe_required: Option<f64>,
    pub equipment_inspected: Option<f64>,
    pub equipment_total: Option<f64>,
    pub authorized_operators: Option<f64>,
    pub operator_total: Option<f64>,
    pub inspections_completed: Option<f64>,
    pub inspections_planned: Option<f64>,
    pub assessments_completed: Option<f64>,
    pub assessments_required: Option<f64>,
    pub prevention_completed: Option<f64>,
    pub prevention_planned: Option<f64>,
    pub emergency_drills_held: Option<f64>,
    pub emergency_drills_planned: Option<f64>,
    pub internal_stoppages: Option<u32>,
    pub external_stoppages: Option<u32>,
    pub internal_tickets: Option<TicketTally>,
    pub external_tickets: Option<TicketTally>,
    pub insurance_payment: Option<f64>,
    pub payroll: Option<f64>,
    pub compliance_issues: Option<f64>,
    pub compliance_points: Option<f64>,
    pub audit_findings: Option<f64>,
    pub audit_points: Option<f64>,
    /// Values for metrics outside the built-in counters, keyed by key or legacy label.
    pub extra_metrics: BTreeMap<String, f64>,
}

/// A single KPI's native value and its normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiResult {
    pub value: f64,
    pub score: u8,
}

/// A breached risk-profile floor and the penalty it cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimumRequirementViolation {
    pub metric: String,
    pub required: f64,
    pub actual: u8,
    pub penalty: f64,
}

/// Non-fatal data-quality notes recorded alongside a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationWarning {
    UnknownMetric {
        key: String,
    },
    MissingInput {
        metric: String,
        #[serde(rename = "substitutedScore")]
        substituted_score: f64,
    },
    DefaultedEmployeeCount {
        employees: u32,
    },
    UnknownRiskProfile {
        reference: String,
    },
}

impl EvaluationWarning {
    pub fn summary(&self) -> String {
        match self {
            EvaluationWarning::UnknownMetric { key } => {
                format!("metric '{key}' is not in the catalog; fallback definition used")
            }
            EvaluationWarning::MissingInput {
                metric,
                substituted_score,
            } => format!("no input for '{metric}'; target {substituted_score} substituted"),
            EvaluationWarning::DefaultedEmployeeCount { employees } => {
                format!("employee count missing; defaulted to {employees}")
            }
            EvaluationWarning::UnknownRiskProfile { reference } => {
                format!("risk profile '{reference}' not found; default weights used")
            }
        }
    }
}

/// Evaluation output for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub unit_id: UnitId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<String>,
    pub composite_score: f64,
    pub zone: Zone,
    pub kpi_results: BTreeMap<String, KpiResult>,
    pub category_scores: BTreeMap<String, f64>,
    pub violations: Vec<MinimumRequirementViolation>,
    pub warnings: Vec<EvaluationWarning>,
}

impl EvaluationResult {
    pub fn score_for(&self, key: &str) -> Option<u8> {
        self.kpi_results.get(key).map(|result| result.score)
    }

    pub fn total_penalty(&self) -> f64 {
        self.violations.iter().map(|violation| violation.penalty).sum()
    }
}
