//! Risk policy for automated players.
//!
//! Given the points at stake and the dice left, decide whether to roll again.
//! The only side effect is drawing from the caller's RNG.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Turn score at which rule 4 always stops.
const STOP_CERTAINTY_SCORE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Conservative players stop once the turn reaches this.
    pub bank_threshold: u32,
    /// Aggressive players keep rolling while the turn is below this.
    pub risk_threshold: u32,
}

impl RiskProfile {
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Aggressive,
    ];

    pub fn thresholds(self) -> Thresholds {
        match self {
            RiskProfile::Conservative => Thresholds {
                bank_threshold: 350,
                risk_threshold: 200,
            },
            RiskProfile::Moderate => Thresholds {
                bank_threshold: 500,
                risk_threshold: 400,
            },
            RiskProfile::Aggressive => Thresholds {
                bank_threshold: 1000,
                risk_threshold: 750,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Moderate => "moderate",
            RiskProfile::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskProfile {
    type Err = String;

    /// Accepts full names and the one-letter forms `c`, `m`, `a`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "conservative" => Ok(RiskProfile::Conservative),
            "m" | "moderate" => Ok(RiskProfile::Moderate),
            "a" | "aggressive" => Ok(RiskProfile::Aggressive),
            other => Err(format!("unknown risk profile: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Stop,
}

/// Whether an automated player should roll again.
///
/// `available_dice == 0` means the last bank used every die (hot dice).
/// Rules, first match wins:
/// 1. hot dice: continue
/// 2. conservative at or above its bank threshold: stop
/// 3. aggressive below its risk threshold: continue
/// 4. otherwise continue with probability `1 - turn_score / 1000`
pub fn should_continue<R: Rng + ?Sized>(
    turn_score: u32,
    available_dice: usize,
    profile: RiskProfile,
    rng: &mut R,
) -> bool {
    if available_dice == 0 {
        return true;
    }
    let t = profile.thresholds();
    match profile {
        RiskProfile::Conservative if turn_score >= t.bank_threshold => return false,
        RiskProfile::Aggressive if turn_score < t.risk_threshold => return true,
        _ => {}
    }
    rng.gen::<f64>() > f64::from(turn_score) / STOP_CERTAINTY_SCORE
}

pub fn decide<R: Rng + ?Sized>(
    turn_score: u32,
    available_dice: usize,
    profile: RiskProfile,
    rng: &mut R,
) -> Decision {
    if should_continue(turn_score, available_dice, profile, rng) {
        Decision::Continue
    } else {
        Decision::Stop
    }
}
