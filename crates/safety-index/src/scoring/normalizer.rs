//! Per-KPI curves mapping native values onto integer scores in `0..=100`.
//!
//! Scores are rounded to the nearest integer with ties away from zero
//! (`f64::round`), so 59.5 becomes 60 and 0.5 becomes 1.

use serde::{Deserialize, Serialize};

/// Breakpoints of the accident penalty curve as `(rate, score)`, ascending by rate.
/// Values between breakpoints are interpolated linearly; the ends are clamped.
const ACCIDENT_CURVE: &[(f64, f64)] = &[
    (0.0, 100.0),
    (1.0, 85.0),
    (5.0, 60.0),
    (20.0, 30.0),
    (50.0, 10.0),
    (100.0, 0.0),
];

/// Which curve turns a KPI's native value into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCurve {
    /// Decreasing staircase over the severity-weighted accident rate.
    AccidentPenalty,
    /// Zero below 50% coverage, linear to 100 at full coverage.
    StaffingRatio,
    /// Identity clamp for "higher is better" percentages.
    #[default]
    Percent,
    /// `50 + value`, where 50 is the neutral baseline.
    NeutralMidpoint,
    /// `100 - value` for per-mille rates.
    InverseRate,
    OccupationalCases,
    /// Disciplinary ticket balance; shape chosen by [`DisciplineScoringStrategy`].
    Discipline,
}

/// How the disciplinary ticket balance is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisciplineScoringStrategy {
    /// `clamp(50 + balance)`: internal tickets lift the score, external ones sink it.
    #[default]
    NeutralMidpoint,
    /// Only the net penalty counts, walked down the compliance staircase.
    PenaltyStaircase,
}

impl DisciplineScoringStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "neutral_midpoint" | "midpoint" => Some(Self::NeutralMidpoint),
            "penalty_staircase" | "staircase" => Some(Self::PenaltyStaircase),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NeutralMidpoint => "neutral_midpoint",
            Self::PenaltyStaircase => "penalty_staircase",
        }
    }
}

/// Score a native value on the given curve.
pub fn normalize(curve: ScoreCurve, value: f64, strategy: DisciplineScoringStrategy) -> u8 {
    let raw = match curve {
        ScoreCurve::AccidentPenalty => piecewise(value, ACCIDENT_CURVE),
        ScoreCurve::StaffingRatio => staffing_ratio(value),
        ScoreCurve::Percent => value,
        ScoreCurve::NeutralMidpoint => 50.0 + value,
        ScoreCurve::InverseRate => 100.0 - value,
        ScoreCurve::OccupationalCases => occupational_cases(value),
        ScoreCurve::Discipline => match strategy {
            DisciplineScoringStrategy::NeutralMidpoint => 50.0 + value,
            DisciplineScoringStrategy::PenaltyStaircase => penalty_staircase(value),
        },
    };
    to_score(raw)
}

/// Clamp to `0..=100` and round half away from zero. NaN scores 0.
pub fn to_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 100.0).round() as u8
}

fn piecewise(value: f64, curve: &[(f64, f64)]) -> f64 {
    let Some(&(first_input, first_score)) = curve.first() else {
        return 0.0;
    };
    if value <= first_input {
        return first_score;
    }
    for window in curve.windows(2) {
        let (low_input, low_score) = window[0];
        let (high_input, high_score) = window[1];
        if value <= high_input {
            let fraction = (value - low_input) / (high_input - low_input);
            return low_score + fraction * (high_score - low_score);
        }
    }
    curve.last().map_or(0.0, |&(_, score)| score)
}

fn staffing_ratio(percent: f64) -> f64 {
    if percent >= 100.0 {
        100.0
    } else if percent < 50.0 {
        0.0
    } else {
        (percent - 50.0) * 2.0
    }
}

fn occupational_cases(count: f64) -> f64 {
    if count <= 0.0 {
        100.0
    } else if count <= 1.0 {
        55.0
    } else if count <= 2.0 {
        30.0
    } else if count <= 3.0 {
        15.0
    } else {
        (10.0 - (count - 3.0) * 3.0).max(0.0)
    }
}

fn penalty_staircase(balance: f64) -> f64 {
    let penalty = (-balance).max(0.0);
    if penalty <= 0.0 {
        100.0
    } else if penalty <= 2.0 {
        95.0 - 10.0 * penalty
    } else if penalty <= 5.0 {
        75.0 - 10.0 * (penalty - 2.0)
    } else if penalty <= 10.0 {
        45.0 - 6.0 * (penalty - 5.0)
    } else if penalty <= 20.0 {
        15.0 - 1.5 * (penalty - 10.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(curve: ScoreCurve, value: f64) -> u8 {
        normalize(curve, value, DisciplineScoringStrategy::default())
    }

    #[test]
    fn accident_curve_hits_fixed_points() {
        for (rate, expected) in [
            (0.0, 100),
            (1.0, 85),
            (5.0, 60),
            (20.0, 30),
            (50.0, 10),
            (100.0, 0),
            (150.0, 0),
        ] {
            assert_eq!(score(ScoreCurve::AccidentPenalty, rate), expected, "rate {rate}");
        }
    }

    #[test]
    fn accident_curve_interpolates_within_brackets() {
        assert_eq!(score(ScoreCurve::AccidentPenalty, 3.0), 73);
        assert_eq!(score(ScoreCurve::AccidentPenalty, 12.5), 45);
        assert_eq!(score(ScoreCurve::AccidentPenalty, 35.0), 20);
        assert_eq!(score(ScoreCurve::AccidentPenalty, 75.0), 5);
        assert_eq!(score(ScoreCurve::AccidentPenalty, -4.0), 100);
    }

    #[test]
    fn staffing_curve_matches_reference_points() {
        assert_eq!(score(ScoreCurve::StaffingRatio, 50.0), 0);
        assert_eq!(score(ScoreCurve::StaffingRatio, 49.9), 0);
        assert_eq!(score(ScoreCurve::StaffingRatio, 75.0), 50);
        assert_eq!(score(ScoreCurve::StaffingRatio, 80.0), 60);
        assert_eq!(score(ScoreCurve::StaffingRatio, 100.0), 100);
        assert_eq!(score(ScoreCurve::StaffingRatio, 150.0), 100);
    }

    #[test]
    fn percent_curve_clamps() {
        assert_eq!(score(ScoreCurve::Percent, 90.0), 90);
        assert_eq!(score(ScoreCurve::Percent, 130.0), 100);
        assert_eq!(score(ScoreCurve::Percent, -20.0), 0);
    }

    #[test]
    fn midpoint_and_inverse_curves() {
        assert_eq!(score(ScoreCurve::NeutralMidpoint, 0.0), 50);
        assert_eq!(score(ScoreCurve::NeutralMidpoint, -38.0), 12);
        assert_eq!(score(ScoreCurve::NeutralMidpoint, 80.0), 100);
        assert_eq!(score(ScoreCurve::InverseRate, 12.5), 88);
        assert_eq!(score(ScoreCurve::InverseRate, 140.0), 0);
    }

    #[test]
    fn occupational_cases_staircase() {
        let scores: Vec<u8> = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 9.0]
            .into_iter()
            .map(|count| score(ScoreCurve::OccupationalCases, count))
            .collect();
        assert_eq!(scores, vec![100, 55, 30, 15, 7, 4, 1, 0]);
    }

    #[test]
    fn discipline_strategies_diverge() {
        let midpoint = |value| {
            normalize(
                ScoreCurve::Discipline,
                value,
                DisciplineScoringStrategy::NeutralMidpoint,
            )
        };
        let staircase = |value| {
            normalize(
                ScoreCurve::Discipline,
                value,
                DisciplineScoringStrategy::PenaltyStaircase,
            )
        };

        assert_eq!(midpoint(10.0), 60);
        assert_eq!(staircase(10.0), 100);
        assert_eq!(staircase(0.0), 100);
        assert_eq!(staircase(-1.0), 85);
        assert_eq!(staircase(-2.0), 75);
        assert_eq!(staircase(-5.0), 45);
        assert_eq!(staircase(-10.0), 15);
        assert_eq!(staircase(-15.0), 8);
        assert_eq!(staircase(-25.0), 0);
        assert_eq!(midpoint(-25.0), 25);
    }

    #[test]
    fn rounding_ties_go_away_from_zero() {
        assert_eq!(to_score(59.5), 60);
        assert_eq!(to_score(0.5), 1);
        assert_eq!(to_score(f64::NAN), 0);
        assert_eq!(to_score(f64::INFINITY), 100);
    }

    #[test]
    fn strategy_parsing_accepts_both_spellings() {
        assert_eq!(
            DisciplineScoringStrategy::parse("Penalty-Staircase"),
            Some(DisciplineScoringStrategy::PenaltyStaircase)
        );
        assert_eq!(
            DisciplineScoringStrategy::parse("neutral_midpoint"),
            Some(DisciplineScoringStrategy::NeutralMidpoint)
        );
        assert_eq!(DisciplineScoringStrategy::parse("average"), None);
    }
}
