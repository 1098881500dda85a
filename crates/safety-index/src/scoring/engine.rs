use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::aggregation::{aggregate, round_to_tenth, AggregationInput};
use super::calculator::{self, HOURS_PER_EMPLOYEE};
use super::catalog::{KpiDefinition, MetricCatalog};
use super::domain::{
    EvaluationResult, EvaluationWarning, KpiResult, OrganizationalUnit, RawInput,
};
use super::normalizer::{normalize, DisciplineScoringStrategy, ScoreCurve};
use super::profile::{RiskProfile, RiskProfileRegistry};
use super::violations::{apply_penalties, check_minimums};
use super::zone::Zone;

/// Headcount assumed for units that do not report one.
pub const DEFAULT_EMPLOYEE_COUNT: u32 = 100;

/// Per-engine dials that are not part of the catalog or registry tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub default_employee_count: u32,
    pub hours_per_employee: f64,
    pub discipline_strategy: DisciplineScoringStrategy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_employee_count: DEFAULT_EMPLOYEE_COUNT,
            hours_per_employee: HOURS_PER_EMPLOYEE,
            discipline_strategy: DisciplineScoringStrategy::default(),
        }
    }
}

/// Shareable evaluator holding the injected catalog and profile registry.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: Arc<MetricCatalog>,
    registry: Arc<RiskProfileRegistry>,
    settings: EngineSettings,
}

impl ScoringEngine {
    pub fn new(
        catalog: MetricCatalog,
        registry: RiskProfileRegistry,
        settings: EngineSettings,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            registry: Arc::new(registry),
            settings,
        }
    }

    /// Standard catalog and registry with default settings.
    pub fn standard() -> Self {
        Self::new(
            MetricCatalog::standard(),
            RiskProfileRegistry::standard(),
            EngineSettings::default(),
        )
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &RiskProfileRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn evaluate(&self, unit: &OrganizationalUnit, input: &RawInput) -> EvaluationResult {
        evaluate(&self.catalog, &self.registry, &self.settings, unit, input)
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Run the full pipeline for one unit and one reporting period.
///
/// Never fails: missing inputs are stood in by KPI targets, unknown metrics get a
/// fallback definition, and an unresolved risk profile disables floor checks. Each
/// such degradation is recorded as an [`EvaluationWarning`].
pub fn evaluate(
    catalog: &MetricCatalog,
    registry: &RiskProfileRegistry,
    settings: &EngineSettings,
    unit: &OrganizationalUnit,
    input: &RawInput,
) -> EvaluationResult {
    let mut warnings = Vec::new();

    let exposure = resolve_exposure(settings, unit, &mut warnings);
    let profile = resolve_profile(registry, unit, &mut warnings);

    let measured = calculator::calculate(input, exposure);
    let mut kpi_results = BTreeMap::new();
    for definition in catalog.iter() {
        if let Some(value) = measured.value_for_key(&definition.key) {
            kpi_results.insert(
                definition.key.clone(),
                score_value(definition.curve, value, settings),
            );
        }
    }

    let mut custom: Vec<KpiDefinition> = Vec::new();
    for (label, value) in &input.extra_metrics {
        let definition = catalog.get(label);
        if kpi_results.contains_key(&definition.key) {
            continue;
        }
        if let Cow::Owned(fallback) = &definition {
            warn!(unit = %unit.id.0, metric = %fallback.key, "metric not in catalog");
            warnings.push(EvaluationWarning::UnknownMetric {
                key: fallback.key.clone(),
            });
            custom.push(fallback.clone());
        }
        kpi_results.insert(
            definition.key.clone(),
            score_value(definition.curve, *value, settings),
        );
    }

    let inputs = catalog
        .iter()
        .chain(custom.iter())
        .map(|definition| {
            let score = kpi_results.get(&definition.key).map(|result| result.score);
            AggregationInput::new(definition, score)
        });
    let aggregation = aggregate(inputs, profile);

    warnings.extend(aggregation.substituted.iter().map(|(metric, target)| {
        EvaluationWarning::MissingInput {
            metric: metric.clone(),
            substituted_score: *target,
        }
    }));

    let violations = check_minimums(profile, &kpi_results);
    let penalized = apply_penalties(aggregation.composite, &violations);
    let composite_score = round_to_tenth(penalized.clamp(0.0, 100.0));
    let zone = Zone::classify(composite_score);

    debug!(
        unit = %unit.id.0,
        profile = profile.map(|p| p.id.as_str()).unwrap_or("none"),
        measured = measured.len(),
        weight_used = aggregation.weight_used,
        violations = violations.len(),
        composite = composite_score,
        zone = zone.label(),
        "unit evaluated"
    );

    EvaluationResult {
        unit_id: unit.id.clone(),
        risk_profile: profile.map(|p| p.id.clone()),
        composite_score,
        zone,
        kpi_results,
        category_scores: aggregation.category_scores,
        violations,
        warnings,
    }
}

fn score_value(curve: ScoreCurve, value: f64, settings: &EngineSettings) -> KpiResult {
    let value = if value.is_finite() { value } else { 0.0 };
    KpiResult {
        value,
        score: normalize(curve, value, settings.discipline_strategy),
    }
}

/// Exposure hours for the accident rate. The headcount default only matters, and is
/// only reported, when the unit gives no usable exposure hours of its own.
fn resolve_exposure(
    settings: &EngineSettings,
    unit: &OrganizationalUnit,
    warnings: &mut Vec<EvaluationWarning>,
) -> f64 {
    if let Some(hours) = unit.exposure_hours.filter(|h| calculator::has_exposure(*h)) {
        return hours;
    }

    let employees = match unit.employee_count.filter(|count| *count > 0) {
        Some(count) => count,
        None => {
            debug!(
                unit = %unit.id.0,
                employees = settings.default_employee_count,
                "employee count defaulted"
            );
            warnings.push(EvaluationWarning::DefaultedEmployeeCount {
                employees: settings.default_employee_count,
            });
            settings.default_employee_count
        }
    };

    calculator::exposure_hours(None, employees, settings.hours_per_employee)
}

fn resolve_profile<'r>(
    registry: &'r RiskProfileRegistry,
    unit: &OrganizationalUnit,
    warnings: &mut Vec<EvaluationWarning>,
) -> Option<&'r RiskProfile> {
    let reference = unit
        .risk_profile
        .as_deref()
        .map(str::trim)
        .filter(|reference| !reference.is_empty())?;

    let profile = registry.resolve(reference);
    if profile.is_none() {
        warn!(unit = %unit.id.0, reference, "risk profile not found");
        warnings.push(EvaluationWarning::UnknownRiskProfile {
            reference: reference.to_string(),
        });
    }
    profile
}
