//! XP rewards and penalties per cue outcome.
//!
//! Longer intervals are damped so that stretching the schedule out does not
//! inflate rewards:
//!
//! ```text
//! multiplier = clamp(1 - max(0, interval - 30) / 300, 0.7, 1.0)
//! ```
//!
//! 30 min earns 100%, 60 min 90%, 120 min and beyond 70%.

use serde::{Deserialize, Serialize};

use crate::cue::{CueType, DeskPosition};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpConfig {
    pub position_change_xp: u32,
    pub sitting_xp: u32,
    pub standing_xp: u32,
    pub floor_xp: u32,
    /// Intervals at or below this earn the full base amount.
    pub reference_interval_minutes: u32,
    /// Minutes over the reference interval that cost 100% of the base.
    pub damping_span_minutes: u32,
    pub min_multiplier: f64,
    /// Fraction of the reward lost on dismissal or timeout.
    pub penalty_fraction: f64,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            position_change_xp: 10,
            sitting_xp: 15,
            standing_xp: 25,
            floor_xp: 35,
            reference_interval_minutes: 30,
            damping_span_minutes: 300,
            min_multiplier: 0.7,
            penalty_fraction: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct XpCalculator {
    config: XpConfig,
}

impl XpCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: XpConfig) -> Self {
        Self { config }
    }

    pub fn base_xp(&self, cue_type: CueType) -> u32 {
        if cue_type.is_position_change() {
            return self.config.position_change_xp;
        }
        match cue_type.position() {
            DeskPosition::Sitting => self.config.sitting_xp,
            DeskPosition::Standing => self.config.standing_xp,
            DeskPosition::Floor => self.config.floor_xp,
        }
    }

    pub fn interval_multiplier(&self, interval_minutes: u32) -> f64 {
        let over = interval_minutes.saturating_sub(self.config.reference_interval_minutes) as f64;
        let span = self.config.damping_span_minutes.max(1) as f64;
        (1.0 - over / span).clamp(self.config.min_multiplier, 1.0)
    }

    /// Signed XP delta: positive on completion, a fixed fraction of that
    /// amount negated otherwise.
    pub fn xp_delta(&self, cue_type: CueType, interval_minutes: u32, completed: bool) -> i64 {
        let reward =
            (self.base_xp(cue_type) as f64 * self.interval_multiplier(interval_minutes)) as i64;
        if completed {
            reward
        } else {
            -((reward as f64 * self.config.penalty_fraction) as i64)
        }
    }

    pub fn describe(&self, cue_type: CueType) -> &'static str {
        if cue_type.is_position_change() {
            return "Minimal XP (Position change)";
        }
        match cue_type.position() {
            DeskPosition::Floor => "High XP (Floor exercise)",
            DeskPosition::Standing => "Medium XP (Standing exercise)",
            DeskPosition::Sitting => "Low XP (Sitting exercise)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_amounts_rank_by_effort() {
        let calc = XpCalculator::new();
        assert_eq!(calc.xp_delta(CueType::DeskStanding, 30, true), 10);
        assert_eq!(calc.xp_delta(CueType::SittingStretch, 30, true), 15);
        assert_eq!(calc.xp_delta(CueType::StandingMobilityDrill, 30, true), 25);
        assert_eq!(calc.xp_delta(CueType::FloorStretch, 30, true), 35);
    }

    #[test]
    fn long_intervals_are_damped_to_floor() {
        let calc = XpCalculator::new();
        assert_eq!(calc.interval_multiplier(10), 1.0);
        assert!((calc.interval_multiplier(60) - 0.9).abs() < 1e-9);
        assert!((calc.interval_multiplier(120) - 0.7).abs() < 1e-9);
        assert!((calc.interval_multiplier(600) - 0.7).abs() < 1e-9);
        // 35 * (1 - 15/300) = 33.25
        assert_eq!(calc.xp_delta(CueType::FloorMobilityDrill, 45, true), 33);
    }

    #[test]
    fn dismissal_costs_half_the_reward() {
        let calc = XpCalculator::new();
        assert_eq!(calc.xp_delta(CueType::FloorMobilityDrill, 45, false), -16);
        assert_eq!(calc.xp_delta(CueType::DeskStanding, 60, false), -4);
    }

    #[test]
    fn descriptions_follow_category() {
        let calc = XpCalculator::new();
        assert_eq!(calc.describe(CueType::DeskFloor), "Minimal XP (Position change)");
        assert_eq!(calc.describe(CueType::FloorStretch), "High XP (Floor exercise)");
    }
}
