use crate::error::ApiError;
use crate::infra::deserialize_optional_date;
use chrono::NaiveDate;
use safety_index::scoring::{
    EvaluationResult, OrganizationalUnit, RawInput, ScoringEngine, TicketTally, Zone,
};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::info;

/// Header prefix for caller-defined metric columns, e.g. `metric:near_miss`.
const METRIC_COLUMN_PREFIX: &str = "metric:";

/// One unit and reporting period to evaluate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EvaluationRequest {
    pub(crate) unit: OrganizationalUnit,
    #[serde(default)]
    pub(crate) input: RawInput,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) period_end: Option<NaiveDate>,
}

impl EvaluationRequest {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        if self.unit.id.0.trim().is_empty() {
            return Err(ApiError::InvalidRequest("unit id must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchEvaluation {
    pub(crate) position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) period_end: Option<NaiveDate>,
    #[serde(flatten)]
    pub(crate) result: EvaluationResult,
    /// Readable form of each warning, in the same order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) notes: Vec<String>,
}

impl BatchEvaluation {
    pub(crate) fn new(
        position: usize,
        period_end: Option<NaiveDate>,
        result: EvaluationResult,
    ) -> Self {
        let notes = result.warnings.iter().map(|warning| warning.summary()).collect();
        Self {
            position,
            period_end,
            result,
            notes,
        }
    }
}

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchSummary {
    pub(crate) evaluated: usize,
    pub(crate) green: usize,
    pub(crate) yellow: usize,
    pub(crate) red: usize,
    pub(crate) violations: usize,
}

impl BatchSummary {
    pub(crate) fn from_evaluations(evaluations: &[BatchEvaluation]) -> Self {
        evaluations
            .iter()
            .fold(Self::default(), |mut summary, evaluation| {
                summary.evaluated += 1;
                match evaluation.result.zone {
                    Zone::Green => summary.green += 1,
                    Zone::Yellow => summary.yellow += 1,
                    Zone::Red => summary.red += 1,
                }
                summary.violations += evaluation.result.violations.len();
                summary
            })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchReport {
    pub(crate) summary: BatchSummary,
    pub(crate) results: Vec<BatchEvaluation>,
}

impl BatchReport {
    pub(crate) fn new(results: Vec<BatchEvaluation>) -> Self {
        Self {
            summary: BatchSummary::from_evaluations(&results),
            results,
        }
    }
}

/// Evaluate every request on the blocking pool, returning results in input order.
pub(crate) async fn evaluate_batch(
    engine: Arc<ScoringEngine>,
    requests: Vec<EvaluationRequest>,
) -> Result<Vec<BatchEvaluation>, ApiError> {
    for request in &requests {
        request.validate()?;
    }

    let mut tasks = JoinSet::new();
    for (position, request) in requests.into_iter().enumerate() {
        let engine = Arc::clone(&engine);
        tasks.spawn_blocking(move || {
            let result = engine.evaluate(&request.unit, &request.input);
            BatchEvaluation::new(position, request.period_end, result)
        });
    }

    let mut evaluations = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        evaluations.push(joined?);
    }
    evaluations.sort_by_key(|evaluation| evaluation.position);

    info!(units = evaluations.len(), "batch evaluated");
    Ok(evaluations)
}

/// Parse a CSV batch: one row per unit, counters in snake_case columns.
pub(crate) fn parse_batch<R: Read>(reader: R) -> Result<Vec<EvaluationRequest>, ApiError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let metric_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter_map(|(index, header)| {
            header
                .strip_prefix(METRIC_COLUMN_PREFIX)
                .map(|label| (index, label.trim().to_string()))
        })
        .collect();

    let mut requests = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row: BatchRow = record.deserialize(Some(&headers))?;
        let mut request = row.into_request();

        for (index, label) in &metric_columns {
            let Some(raw) = record.get(*index).filter(|value| !value.is_empty()) else {
                continue;
            };
            let value = raw.parse::<f64>().map_err(|_| {
                ApiError::InvalidRequest(format!(
                    "row {}: '{raw}' is not a number for metric '{label}'",
                    line + 1
                ))
            })?;
            request.input.extra_metrics.insert(label.clone(), value);
        }

        request.validate()?;
        requests.push(request);
    }

    Ok(requests)
}

#[derive(Debug, Deserialize)]
struct BatchRow {
    unit_id: String,
    employees: Option<u32>,
    exposure_hours: Option<f64>,
    risk_profile: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    period_end: Option<NaiveDate>,
    fatal_accidents: Option<u32>,
    severe_accidents: Option<u32>,
    group_accidents: Option<u32>,
    light_accidents: Option<u32>,
    occupational_cases: Option<u32>,
    days_without_incident: Option<f64>,
    period_days: Option<f64>,
    hse_staff_actual: Option<f64>,
    hse_staff_required: Option<f64>,
    training_passed: Option<f64>,
    training_required: Option<f64>,
    ppe_issued: Option<f64>,
    ppe_required: Option<f64>,
    equipment_inspected: Option<f64>,
    equipment_total: Option<f64>,
    authorized_operators: Option<f64>,
    operator_total: Option<f64>,
    inspections_completed: Option<f64>,
    inspections_planned: Option<f64>,
    assessments_completed: Option<f64>,
    assessments_required: Option<f64>,
    prevention_completed: Option<f64>,
    prevention_planned: Option<f64>,
    emergency_drills_held: Option<f64>,
    emergency_drills_planned: Option<f64>,
    internal_stoppages: Option<u32>,
    external_stoppages: Option<u32>,
    internal_tickets_minor: Option<u32>,
    internal_tickets_major: Option<u32>,
    internal_tickets_critical: Option<u32>,
    external_tickets_minor: Option<u32>,
    external_tickets_major: Option<u32>,
    external_tickets_critical: Option<u32>,
    insurance_payment: Option<f64>,
    payroll: Option<f64>,
    compliance_issues: Option<f64>,
    compliance_points: Option<f64>,
    audit_findings: Option<f64>,
    audit_points: Option<f64>,
}

impl BatchRow {
    fn into_request(self) -> EvaluationRequest {
        let mut unit = OrganizationalUnit::new(self.unit_id);
        unit.employee_count = self.employees;
        unit.exposure_hours = self.exposure_hours;
        unit.risk_profile = self.risk_profile;

        let input = RawInput {
            fatal_accidents: self.fatal_accidents,
            severe_accidents: self.severe_accidents,
            group_accidents: self.group_accidents,
            light_accidents: self.light_accidents,
            occupational_cases: self.occupational_cases,
            days_without_incident: self.days_without_incident,
            period_days: self.period_days,
            hse_staff_actual: self.hse_staff_actual,
            hse_staff_required: self.hse_staff_required,
            training_passed: self.training_passed,
            training_required: self.training_required,
            ppe_issued: self.ppe_issued,
            ppe_required: self.ppe_required,
            equipment_inspected: self.equipment_inspected,
            equipment_total: self.equipment_total,
            authorized_operators: self.authorized_operators,
            operator_total: self.operator_total,
            inspections_completed: self.inspections_completed,
            inspections_planned: self.inspections_planned,
            assessments_completed: self.assessments_completed,
            assessments_required: self.assessments_required,
            prevention_completed: self.prevention_completed,
            prevention_planned: self.prevention_planned,
            emergency_drills_held: self.emergency_drills_held,
            emergency_drills_planned: self.emergency_drills_planned,
            internal_stoppages: self.internal_stoppages,
            external_stoppages: self.external_stoppages,
            internal_tickets: tally(
                self.internal_tickets_minor,
                self.internal_tickets_major,
                self.internal_tickets_critical,
            ),
            external_tickets: tally(
                self.external_tickets_minor,
                self.external_tickets_major,
                self.external_tickets_critical,
            ),
            insurance_payment: self.insurance_payment,
            payroll: self.payroll,
            compliance_issues: self.compliance_issues,
            compliance_points: self.compliance_points,
            audit_findings: self.audit_findings,
            audit_points: self.audit_points,
            extra_metrics: Default::default(),
        };

        EvaluationRequest {
            unit,
            input,
            period_end: self.period_end,
        }
    }
}

fn tally(minor: Option<u32>, major: Option<u32>, critical: Option<u32>) -> Option<TicketTally> {
    if minor.is_none() && major.is_none() && critical.is_none() {
        return None;
    }
    Some(TicketTally {
        minor: minor.unwrap_or(0),
        major: major.unwrap_or(0),
        critical: critical.unwrap_or(0),
    })
}
