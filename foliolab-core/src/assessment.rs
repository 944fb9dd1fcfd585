//! Risk level banding and structural recommendations derived from a score.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::score::ScoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    Elevated,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => RiskLevel::Low,
            60..=79 => RiskLevel::Moderate,
            40..=59 => RiskLevel::Elevated,
            _ => RiskLevel::High,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Well-diversified portfolio with manageable risk",
            RiskLevel::Moderate => "Acceptable diversification with some concentration",
            RiskLevel::Elevated => "Significant concentration risk present",
            RiskLevel::High => "Poor diversification - high concentration risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Elevated => "Elevated",
            RiskLevel::High => "High",
        };
        f.write_str(name)
    }
}

/// Plain-language structural suggestions, in a fixed order.
pub fn recommendations(result: &ScoreResult) -> Vec<String> {
    let mut out = Vec::new();

    if result.num_holdings < 5 {
        out.push("Consider adding more holdings to improve diversification".to_string());
    }
    if result.largest_position_pct > 25 {
        out.push(format!(
            "Largest position is {}% - consider rebalancing to reduce concentration",
            result.largest_position_pct
        ));
    }
    if result.top3_concentration_pct > 60 {
        out.push(
            "Top 3 holdings represent over 60% of portfolio - high concentration risk".to_string(),
        );
    }
    if result.num_holdings > 20 {
        out.push("Large number of holdings may be difficult to monitor effectively".to_string());
    }

    out
}
