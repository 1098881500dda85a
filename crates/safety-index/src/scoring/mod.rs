//! KPI scoring pipeline: raw counters in, composite index and risk zone out.
//!
//! Every stage is a pure function over immutable tables. The [`MetricCatalog`] and
//! [`RiskProfileRegistry`] are built once and injected into a [`ScoringEngine`], which
//! can then be shared freely across threads.

pub mod aggregation;
pub mod calculator;
pub mod catalog;
pub mod domain;
mod engine;
pub mod normalizer;
pub mod profile;
pub mod violations;
pub mod zone;

#[cfg(test)]
mod tests;

pub use catalog::{BuiltinKpi, Direction, KpiCategory, KpiDefinition, MetricCatalog};
pub use domain::{
    EvaluationResult, EvaluationWarning, KpiResult, MinimumRequirementViolation,
    OrganizationalUnit, RawInput, TicketTally, UnitId,
};
pub use engine::{evaluate, EngineSettings, ScoringEngine, DEFAULT_EMPLOYEE_COUNT};
pub use normalizer::{DisciplineScoringStrategy, ScoreCurve};
pub use profile::{RiskProfile, RiskProfileRegistry, RiskTier};
pub use zone::Zone;
