use serde::{Deserialize, Serialize};

pub const GREEN_THRESHOLD: f64 = 80.0;
pub const YELLOW_THRESHOLD: f64 = 50.0;

/// Traffic-light classification of a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Green,
    Yellow,
    Red,
}

impl Zone {
    /// Classify an already clamped composite score.
    pub fn classify(score: f64) -> Self {
        if score >= GREEN_THRESHOLD {
            Self::Green
        } else if score >= YELLOW_THRESHOLD {
            Self::Yellow
        } else {
            Self::Red
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}
