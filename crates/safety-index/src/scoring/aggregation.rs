//! Weighted combination of KPI scores into a composite and per-category sub-scores.

use std::collections::BTreeMap;

use super::catalog::KpiDefinition;
use super::profile::RiskProfile;

/// One KPI entering aggregation. `score` is `None` when the KPI was not measured.
#[derive(Debug, Clone)]
pub struct AggregationInput<'a> {
    pub definition: &'a KpiDefinition,
    pub score: Option<u8>,
}

impl<'a> AggregationInput<'a> {
    pub fn new(definition: &'a KpiDefinition, score: Option<u8>) -> Self {
        Self { definition, score }
    }
}

/// Unrounded composite plus the bookkeeping the engine reports alongside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub composite: f64,
    pub weight_used: f64,
    /// Category key to sub-score, rounded to one decimal.
    pub category_scores: BTreeMap<String, f64>,
    /// Weighted KPIs that had no score and were stood in by their target.
    pub substituted: Vec<(String, f64)>,
}

#[derive(Default)]
struct Accumulator {
    weighted: f64,
    weight: f64,
}

impl Accumulator {
    fn add(&mut self, score: f64, weight: f64) {
        self.weighted += score * weight;
        self.weight += weight;
    }

    fn mean(&self) -> f64 {
        if self.weight > 0.0 {
            self.weighted / self.weight
        } else {
            0.0
        }
    }
}

/// Profile override when present for the key, otherwise the catalog default.
pub fn resolve_weight(definition: &KpiDefinition, profile: Option<&RiskProfile>) -> f64 {
    profile
        .and_then(|profile| profile.weight_override(&definition.key))
        .unwrap_or(definition.weight)
}

/// Combine scores by resolved weight, renormalizing by the weight actually used.
pub fn aggregate<'a, I>(inputs: I, profile: Option<&RiskProfile>) -> Aggregation
where
    I: IntoIterator<Item = AggregationInput<'a>>,
{
    let mut total = Accumulator::default();
    let mut categories: BTreeMap<&'static str, Accumulator> = BTreeMap::new();
    let mut substituted = Vec::new();

    for input in inputs {
        let definition = input.definition;
        let weight = resolve_weight(definition, profile);
        if !weight.is_finite() || weight <= 0.0 {
            continue;
        }

        let score = match input.score {
            Some(score) => f64::from(score),
            None => {
                substituted.push((definition.key.clone(), definition.target));
                definition.target
            }
        };

        total.add(score, weight);
        categories
            .entry(definition.category.key())
            .or_default()
            .add(score, weight);
    }

    Aggregation {
        composite: total.mean(),
        weight_used: total.weight,
        category_scores: categories
            .into_iter()
            .map(|(key, accumulator)| (key.to_string(), round_to_tenth(accumulator.mean())))
            .collect(),
        substituted,
    }
}

/// Round to one decimal, ties away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
