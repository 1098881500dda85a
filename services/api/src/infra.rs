use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use safety_index::config::ScoringConfig;
use safety_index::error::AppError;
use safety_index::scoring::{MetricCatalog, RiskProfileRegistry, ScoringEngine};
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) engine: Arc<ScoringEngine>,
}

/// Table locations given on the command line win over the configured ones.
#[derive(Debug, Default, Clone)]
pub(crate) struct TableOverrides<'a> {
    pub(crate) catalog: Option<&'a Path>,
    pub(crate) profiles: Option<&'a Path>,
}

pub(crate) fn load_engine(
    config: &ScoringConfig,
    overrides: TableOverrides<'_>,
) -> Result<ScoringEngine, AppError> {
    let catalog = match overrides.catalog.or(config.catalog_path.as_deref()) {
        Some(path) => {
            let catalog = MetricCatalog::from_json_str(&std::fs::read_to_string(path)?)?;
            info!(path = %path.display(), kpis = catalog.len(), "loaded KPI catalog");
            catalog
        }
        None => MetricCatalog::standard(),
    };

    let registry = match overrides.profiles.or(config.profiles_path.as_deref()) {
        Some(path) => {
            let registry = RiskProfileRegistry::from_json_str(&std::fs::read_to_string(path)?)?;
            info!(
                path = %path.display(),
                profiles = registry.profiles().len(),
                "loaded risk profiles"
            );
            registry
        }
        None => RiskProfileRegistry::standard(),
    };

    Ok(ScoringEngine::new(
        catalog,
        registry,
        config.engine_settings(),
    ))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
