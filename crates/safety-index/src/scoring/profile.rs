use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::MAX_WEIGHT;
use super::violations::base_penalty;
use crate::error::ConfigurationError;

/// Hazard tier of an operational domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Critical,
    High,
    Medium,
    Low,
}

fn default_penalty_multiplier() -> f64 {
    1.0
}

/// Minimum-score floors and weighting tied to an operational domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub id: String,
    pub tier: RiskTier,
    #[serde(default)]
    pub floors: BTreeMap<String, f64>,
    /// Replaces catalog default weights for the keys it lists.
    #[serde(default)]
    pub weight_overrides: Option<BTreeMap<String, f64>>,
    #[serde(default = "default_penalty_multiplier")]
    pub penalty_multiplier: f64,
}

impl RiskProfile {
    pub fn new(id: impl Into<String>, tier: RiskTier) -> Self {
        Self {
            id: id.into(),
            tier,
            floors: BTreeMap::new(),
            weight_overrides: None,
            penalty_multiplier: default_penalty_multiplier(),
        }
    }

    pub fn with_floor(mut self, metric: impl Into<String>, floor: f64) -> Self {
        self.floors.insert(metric.into(), floor);
        self
    }

    pub fn with_weight_override(mut self, metric: impl Into<String>, weight: f64) -> Self {
        self.weight_overrides
            .get_or_insert_with(BTreeMap::new)
            .insert(metric.into(), weight);
        self
    }

    pub fn with_penalty_multiplier(mut self, multiplier: f64) -> Self {
        self.penalty_multiplier = multiplier;
        self
    }

    pub fn floor(&self, metric: &str) -> Option<f64> {
        self.floors.get(metric).copied()
    }

    pub fn weight_override(&self, metric: &str) -> Option<f64> {
        self.weight_overrides
            .as_ref()
            .and_then(|overrides| overrides.get(metric).copied())
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.id.trim().is_empty() {
            return Err(ConfigurationError::EmptyProfileId);
        }
        for (metric, floor) in &self.floors {
            if base_penalty(metric).is_none() {
                return Err(ConfigurationError::UncheckedFloor {
                    profile: self.id.clone(),
                    metric: metric.clone(),
                });
            }
            if !(0.0..=100.0).contains(floor) {
                return Err(ConfigurationError::InvalidFloor {
                    profile: self.id.clone(),
                    metric: metric.clone(),
                    floor: *floor,
                });
            }
        }
        for (metric, weight) in self.weight_overrides.iter().flatten() {
            if !(0.0..=MAX_WEIGHT).contains(weight) {
                return Err(ConfigurationError::InvalidOverride {
                    profile: self.id.clone(),
                    metric: metric.clone(),
                    weight: *weight,
                });
            }
        }
        if !self.penalty_multiplier.is_finite() || self.penalty_multiplier < 0.0 {
            return Err(ConfigurationError::InvalidPenaltyMultiplier {
                profile: self.id.clone(),
                multiplier: self.penalty_multiplier,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    profiles: Vec<RiskProfile>,
    #[serde(default)]
    domains: BTreeMap<String, String>,
}

/// Immutable lookup from profile ids and domain tags to risk profiles.
#[derive(Debug, Clone, Default)]
pub struct RiskProfileRegistry {
    profiles: Vec<RiskProfile>,
    domains: BTreeMap<String, String>,
}

impl RiskProfileRegistry {
    /// Registry with no profiles: every unit gets default weights and no floor checks.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let profiles = vec![
            RiskProfile::new("critical", RiskTier::Critical)
                .with_floor("accidents", 60.0)
                .with_floor("staffing", 80.0)
                .with_floor("training", 80.0)
                .with_floor("equipment", 75.0)
                .with_floor("ppe", 90.0)
                .with_floor("workplace_assessment", 80.0)
                .with_weight_override("accidents", 0.22)
                .with_weight_override("ppe", 0.10)
                .with_weight_override("equipment", 0.10)
                .with_weight_override("insurance", 0.01)
                .with_weight_override("audit", 0.02),
            RiskProfile::new("high", RiskTier::High)
                .with_floor("accidents", 50.0)
                .with_floor("staffing", 70.0)
                .with_floor("training", 70.0)
                .with_floor("equipment", 65.0)
                .with_floor("ppe", 80.0)
                .with_floor("workplace_assessment", 70.0),
            RiskProfile::new("medium", RiskTier::Medium)
                .with_floor("accidents", 40.0)
                .with_floor("staffing", 50.0)
                .with_floor("training", 60.0)
                .with_floor("ppe", 70.0)
                .with_floor("workplace_assessment", 60.0),
            RiskProfile::new("low", RiskTier::Low)
                .with_floor("accidents", 30.0)
                .with_floor("training", 50.0)
                .with_floor("workplace_assessment", 50.0),
        ];

        let domains = [
            ("construction", "critical"),
            ("mining", "critical"),
            ("chemicals", "critical"),
            ("manufacturing", "high"),
            ("energy", "high"),
            ("logistics", "medium"),
            ("healthcare", "medium"),
            ("office", "low"),
            ("retail", "low"),
        ]
        .into_iter()
        .map(|(domain, profile)| (domain.to_string(), profile.to_string()))
        .collect();

        Self { profiles, domains }
    }

    /// Build a registry from caller-supplied profiles and a domain-tag table.
    pub fn from_parts<I, D, P>(
        profiles: Vec<RiskProfile>,
        domains: I,
    ) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (D, P)>,
        D: Into<String>,
        P: Into<String>,
    {
        for (position, profile) in profiles.iter().enumerate() {
            profile.validate()?;
            if profiles[..position]
                .iter()
                .any(|earlier| earlier.id.eq_ignore_ascii_case(&profile.id))
            {
                return Err(ConfigurationError::DuplicateProfile {
                    id: profile.id.clone(),
                });
            }
        }

        let mut registry = Self {
            profiles,
            domains: BTreeMap::new(),
        };
        for (domain, profile) in domains {
            let domain = normalize_reference(&domain.into());
            let profile = profile.into();
            if registry.get(&profile).is_none() {
                return Err(ConfigurationError::UnknownDomainProfile { domain, profile });
            }
            registry.domains.insert(domain, profile);
        }
        Ok(registry)
    }

    /// Parse `{"profiles": [...], "domains": {"tag": "profile-id"}}`.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigurationError> {
        let document: RegistryDocument = serde_json::from_str(raw)?;
        Self::from_parts(document.profiles, document.domains)
    }

    pub fn get(&self, id: &str) -> Option<&RiskProfile> {
        let id = id.trim();
        self.profiles
            .iter()
            .find(|profile| profile.id.eq_ignore_ascii_case(id))
    }

    /// Resolve a unit's reference: profile id first, then domain tag.
    pub fn resolve(&self, reference: &str) -> Option<&RiskProfile> {
        self.get(reference).or_else(|| {
            self.domains
                .get(&normalize_reference(reference))
                .and_then(|profile| self.get(profile))
        })
    }

    pub fn profiles(&self) -> &[RiskProfile] {
        &self.profiles
    }

    pub fn domains(&self) -> &BTreeMap<String, String> {
        &self.domains
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn normalize_reference(reference: &str) -> String {
    reference.trim().to_ascii_lowercase()
}
