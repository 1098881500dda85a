use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalizer::ScoreCurve;
use crate::error::ConfigurationError;

/// Weight given to metrics the catalog does not know about.
pub const FALLBACK_WEIGHT: f64 = 0.05;
/// Score stand-in used for unknown metrics that carry no value.
pub const FALLBACK_TARGET: f64 = 80.0;
/// Upper bound for any single catalog weight or profile override.
pub const MAX_WEIGHT: f64 = 1.0;

/// Whether a larger native value means better performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Higher,
    Lower,
}

/// Reporting group a KPI rolls up into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiCategory {
    Incidents,
    Organization,
    Training,
    Equipment,
    Inspection,
    Prevention,
    Discipline,
    Finance,
    Compliance,
    Custom,
}

impl KpiCategory {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Incidents => "incidents",
            Self::Organization => "organization",
            Self::Training => "training",
            Self::Equipment => "equipment",
            Self::Inspection => "inspection",
            Self::Prevention => "prevention",
            Self::Discipline => "discipline",
            Self::Finance => "finance",
            Self::Compliance => "compliance",
            Self::Custom => "custom",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Incidents => "Incidents & Health",
            Self::Organization => "HSE Organization",
            Self::Training => "Training",
            Self::Equipment => "Equipment & PPE",
            Self::Inspection => "Inspection & Assessment",
            Self::Prevention => "Prevention & Emergency",
            Self::Discipline => "Discipline",
            Self::Finance => "Insurance",
            Self::Compliance => "Compliance & Audit",
            Self::Custom => "Custom Metrics",
        }
    }
}

/// KPIs whose raw value the engine knows how to derive from counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltinKpi {
    Accidents,
    Occupational,
    NoIncidentDays,
    Staffing,
    Training,
    Ppe,
    Equipment,
    Inspection,
    WorkplaceAssessment,
    Prevention,
    Emergency,
    WorkStoppage,
    Violations,
    Insurance,
    Compliance,
    Audit,
}

impl BuiltinKpi {
    pub const fn ordered() -> [Self; 16] {
        [
            Self::Accidents,
            Self::Occupational,
            Self::NoIncidentDays,
            Self::Staffing,
            Self::Training,
            Self::Ppe,
            Self::Equipment,
            Self::Inspection,
            Self::WorkplaceAssessment,
            Self::Prevention,
            Self::Emergency,
            Self::WorkStoppage,
            Self::Violations,
            Self::Insurance,
            Self::Compliance,
            Self::Audit,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Accidents => "accidents",
            Self::Occupational => "occupational",
            Self::NoIncidentDays => "no_incident_days",
            Self::Staffing => "staffing",
            Self::Training => "training",
            Self::Ppe => "ppe",
            Self::Equipment => "equipment",
            Self::Inspection => "inspection",
            Self::WorkplaceAssessment => "workplace_assessment",
            Self::Prevention => "prevention",
            Self::Emergency => "emergency",
            Self::WorkStoppage => "work_stoppage",
            Self::Violations => "violations",
            Self::Insurance => "insurance",
            Self::Compliance => "compliance",
            Self::Audit => "audit",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ordered().into_iter().find(|kpi| kpi.key() == key)
    }
}

/// One measured dimension of safety performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDefinition {
    pub key: String,
    pub label: String,
    pub category: KpiCategory,
    /// Default aggregation weight; risk profiles may override it.
    pub weight: f64,
    pub direction: Direction,
    /// Score substituted when the KPI could not be measured for a unit.
    pub target: f64,
    pub unit: String,
    #[serde(default)]
    pub curve: ScoreCurve,
}

impl KpiDefinition {
    /// Definition fabricated for a key the catalog does not declare.
    pub fn fallback(key: &str) -> Self {
        Self {
            key: key.to_string(),
            label: key.to_string(),
            category: KpiCategory::Custom,
            weight: FALLBACK_WEIGHT,
            direction: Direction::Higher,
            target: FALLBACK_TARGET,
            unit: "%".to_string(),
            curve: ScoreCurve::Percent,
        }
    }
}

struct StandardKpi {
    kpi: BuiltinKpi,
    label: &'static str,
    category: KpiCategory,
    weight: f64,
    direction: Direction,
    target: f64,
    unit: &'static str,
    curve: ScoreCurve,
}

const STANDARD_KPIS: [StandardKpi; 16] = [
    StandardKpi {
        kpi: BuiltinKpi::Accidents,
        label: "Accident severity rate",
        category: KpiCategory::Incidents,
        weight: 0.15,
        direction: Direction::Lower,
        target: 85.0,
        unit: "penalty points per 1M hours",
        curve: ScoreCurve::AccidentPenalty,
    },
    StandardKpi {
        kpi: BuiltinKpi::Occupational,
        label: "Occupational disease cases",
        category: KpiCategory::Incidents,
        weight: 0.05,
        direction: Direction::Lower,
        target: 100.0,
        unit: "cases",
        curve: ScoreCurve::OccupationalCases,
    },
    StandardKpi {
        kpi: BuiltinKpi::NoIncidentDays,
        label: "Incident-free days",
        category: KpiCategory::Incidents,
        weight: 0.03,
        direction: Direction::Higher,
        target: 80.0,
        unit: "%",
        curve: ScoreCurve::Percent,
    },
    StandardKpi {
        kpi: BuiltinKpi::Staffing,
        label: "HSE staffing coverage",
        category: KpiCategory::Organization,
        weight: 0.10,
        direction: Direction::Higher,
        target: 100.0,
        unit: "%",
        curve: ScoreCurve::StaffingRatio,
    },
    StandardKpi {
        kpi: BuiltinKpi::Training,
        label: "Training completion",
        category: KpiCategory::Training,
        weight: 0.10,
        direction: Direction::Higher,
        target: 90.0,
        unit: "%",
        curve: ScoreCurve::Percent,
    },
    StandardKpi {
        kpi: BuiltinKpi::Ppe,
        label: "PPE coverage",
        category: KpiCategory::Equipment,
        weight: 0.08,
        direction: Direction::Higher,
        target: 95.0,
        unit: "%",
        curve: ScoreCurve::Percent,
    },
    StandardKpi {
        kpi: BuiltinKpi::Equipment,
        label: "Equipment inspection & operator authorization",
        category: KpiCategory::Equipment,
        weight: 0.08,
        direction: Direction::Higher,
        target: 90.0,
        unit: "%",
        curve: ScoreCurve::Percent,
    },
    StandardKpi {
        kpi: BuiltinKpi::Inspection,
        label: "Planned inspections completed",
        category: KpiCategory::Inspection,
        weight: 0.07,
        direction: Direction::Higher,
        target: 90.0,
        unit: "%",
        curve: ScoreCurve::Percent,
    },
    StandardKpi {
        kpi: BuiltinKpi::WorkplaceAssessment,
        label: "Workplace risk assessments",
        category: KpiCategory::Inspection,
        weight: 0.07,
        direction: Direction::Higher,
        target: 90.0,
        unit: "%",
        curve: ScoreCurve::Percent,
    },
    StandardKpi {
        kpi: BuiltinKpi::Prevention,
        label: "Preventive actions closed",
        category: KpiCategory::Prevention,
        weight: 0.05,
        direction: Direction::Higher,
        target: 85.0,
        unit: "%",
        curve: ScoreCurve::Percent,
    },
    StandardKpi {
        kpi: BuiltinKpi::Emergency,
        label: "Emergency drills held",
        category: KpiCategory::Prevention,
        weight: 0.04,
        direction: Direction::Higher,
        target: 90.0,
        unit: "%",
        curve: ScoreCurve::Percent,
    },
    StandardKpi {
        kpi: BuiltinKpi::WorkStoppage,
        label: "Work stoppages",
        category: KpiCategory::Discipline,
        weight: 0.04,
        direction: Direction::Higher,
        target: 50.0,
        unit: "balance points",
        curve: ScoreCurve::NeutralMidpoint,
    },
    StandardKpi {
        kpi: BuiltinKpi::Violations,
        label: "Disciplinary tickets",
        category: KpiCategory::Discipline,
        weight: 0.04,
        direction: Direction::Higher,
        target: 50.0,
        unit: "balance points",
        curve: ScoreCurve::Discipline,
    },
    StandardKpi {
        kpi: BuiltinKpi::Insurance,
        label: "Insurance claim rate",
        category: KpiCategory::Finance,
        weight: 0.03,
        direction: Direction::Lower,
        target: 80.0,
        unit: "per mille of payroll",
        curve: ScoreCurve::InverseRate,
    },
    StandardKpi {
        kpi: BuiltinKpi::Compliance,
        label: "Regulatory compliance",
        category: KpiCategory::Compliance,
        weight: 0.04,
        direction: Direction::Higher,
        target: 90.0,
        unit: "%",
        curve: ScoreCurve::Percent,
    },
    StandardKpi {
        kpi: BuiltinKpi::Audit,
        label: "Internal audit conformity",
        category: KpiCategory::Compliance,
        weight: 0.03,
        direction: Direction::Higher,
        target: 90.0,
        unit: "%",
        curve: ScoreCurve::Percent,
    },
];

/// Legacy report labels and localized names mapped to canonical keys.
const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("accident_rate", "accidents"),
    ("Accident Frequency", "accidents"),
    ("İş Kazaları", "accidents"),
    ("occupational_disease", "occupational"),
    ("Meslek Hastalıkları", "occupational"),
    ("incident_free_days", "no_incident_days"),
    ("Kazasız Gün", "no_incident_days"),
    ("hse_staffing", "staffing"),
    ("İSG Personeli", "staffing"),
    ("training_completion", "training"),
    ("İSG Eğitimi", "training"),
    ("ppe_coverage", "ppe"),
    ("KKD Kullanımı", "ppe"),
    ("equipment_control", "equipment"),
    ("Ekipman Kontrolü", "equipment"),
    ("inspection_rate", "inspection"),
    ("Saha Denetimi", "inspection"),
    ("risk_assessment", "workplace_assessment"),
    ("Risk Değerlendirmesi", "workplace_assessment"),
    ("preventive_actions", "prevention"),
    ("Önleyici Faaliyetler", "prevention"),
    ("emergency_drills", "emergency"),
    ("Acil Durum Tatbikatı", "emergency"),
    ("stoppage", "work_stoppage"),
    ("İş Durdurma", "work_stoppage"),
    ("discipline", "violations"),
    ("Disiplin", "violations"),
    ("insurance_rate", "insurance"),
    ("Sigorta Prim Oranı", "insurance"),
    ("legal_compliance", "compliance"),
    ("Mevzuat Uyumu", "compliance"),
    ("internal_audit", "audit"),
    ("İç Denetim", "audit"),
];

/// On-disk shape accepted by [`MetricCatalog::from_json_str`].
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    definitions: Vec<KpiDefinition>,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

/// Immutable, ordered registry of KPI definitions.
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    definitions: Vec<KpiDefinition>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, String>,
}

impl MetricCatalog {
    pub fn standard() -> Self {
        let definitions = STANDARD_KPIS
            .iter()
            .map(|entry| KpiDefinition {
                key: entry.kpi.key().to_string(),
                label: entry.label.to_string(),
                category: entry.category,
                weight: entry.weight,
                direction: entry.direction,
                target: entry.target,
                unit: entry.unit.to_string(),
                curve: entry.curve,
            })
            .collect();
        Self::assemble(definitions)
    }

    /// Build a catalog from caller-supplied definitions, rejecting malformed tables.
    pub fn from_definitions(definitions: Vec<KpiDefinition>) -> Result<Self, ConfigurationError> {
        if definitions.is_empty() {
            return Err(ConfigurationError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for definition in &definitions {
            validate_definition(definition)?;
            if !seen.insert(definition.key.as_str()) {
                return Err(ConfigurationError::DuplicateKey {
                    key: definition.key.clone(),
                });
            }
        }

        Ok(Self::assemble(definitions))
    }

    /// Parse `{"definitions": [...], "aliases": {...}}`.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigurationError> {
        let document: CatalogDocument = serde_json::from_str(raw)?;
        Self::from_definitions(document.definitions)?.with_aliases(document.aliases)
    }

    /// Layer extra label aliases over the built-in legacy table. An alias may not reuse a
    /// declared KPI key.
    pub fn with_aliases<I, A, K>(mut self, aliases: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (A, K)>,
        A: Into<String>,
        K: Into<String>,
    {
        for (alias, key) in aliases {
            let alias = alias.into();
            let key = key.into();
            if self.index.contains_key(&alias) {
                return Err(ConfigurationError::AliasShadowsKey { alias, key });
            }
            if !self.index.contains_key(&key) {
                return Err(ConfigurationError::UnknownAliasTarget { alias, key });
            }
            self.aliases.insert(alias, key);
        }
        Ok(self)
    }

    fn assemble(definitions: Vec<KpiDefinition>) -> Self {
        let index = definitions
            .iter()
            .enumerate()
            .map(|(position, definition)| (definition.key.clone(), position))
            .collect();

        Self {
            definitions,
            index,
            aliases: HashMap::new(),
        }
    }

    /// Map a legacy or localized label to its canonical key. Declared keys and unmapped
    /// labels pass through.
    pub fn canonical_key<'a>(&'a self, key: &'a str) -> &'a str {
        if self.index.contains_key(key) {
            return key;
        }
        if let Some(mapped) = self.aliases.get(key) {
            return mapped;
        }
        LEGACY_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(key)
    }

    pub fn lookup(&self, key: &str) -> Option<&KpiDefinition> {
        let canonical = self.canonical_key(key);
        self.index
            .get(canonical)
            .map(|position| &self.definitions[*position])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Resolve a key, fabricating a fallback definition for unknown metrics.
    pub fn get(&self, key: &str) -> Cow<'_, KpiDefinition> {
        match self.lookup(key) {
            Some(definition) => Cow::Borrowed(definition),
            None => {
                let canonical = self.canonical_key(key);
                debug!(metric = canonical, "fabricating fallback KPI definition");
                Cow::Owned(KpiDefinition::fallback(canonical))
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &KpiDefinition> {
        self.definitions.iter()
    }

    pub fn definitions(&self) -> &[KpiDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.definitions.iter().map(|definition| definition.weight).sum()
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

pub(crate) fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn validate_definition(definition: &KpiDefinition) -> Result<(), ConfigurationError> {
    if !is_valid_key(&definition.key) {
        return Err(ConfigurationError::MalformedKey {
            key: definition.key.clone(),
        });
    }
    if !(0.0..=MAX_WEIGHT).contains(&definition.weight) {
        return Err(ConfigurationError::InvalidWeight {
            key: definition.key.clone(),
            weight: definition.weight,
        });
    }
    if !(0.0..=100.0).contains(&definition.target) {
        return Err(ConfigurationError::InvalidTarget {
            key: definition.key.clone(),
            target: definition.target,
        });
    }
    Ok(())
}
