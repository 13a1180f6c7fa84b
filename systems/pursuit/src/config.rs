//! Tuning knobs for the pursuit engine.

use std::time::Duration;

use cat_chase_core::Difficulty;
use serde::Deserialize;
use thiserror::Error;

/// Largest accepted `memory_capacity` or `cat_history_capacity`.
pub const MAX_HISTORY_CAPACITY: usize = 256;

/// Aggregated tuning knobs controlling every adjustable aspect of the pursuit engine.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    /// Number of recent mouse cells remembered; at least two are needed to estimate a heading.
    pub memory_capacity: usize,
    /// Number of recent cat cells kept for stuck and oscillation detection.
    pub cat_history_capacity: usize,
    /// Consecutive decisions on the same cell that force an unstick move.
    pub stuck_limit: u32,
    /// Consecutive A-B-A cycles that force an unstick move.
    pub oscillation_limit: u32,
    /// Move cadence per difficulty.
    pub cooldown: CooldownTuning,
    /// Extra A* cost charged for entering a remembered mouse cell.
    pub memory_penalty: MemoryPenalty,
    /// Heuristic chooser penalty for stepping onto a remembered mouse cell.
    pub revisit_penalty: u32,
    /// Heuristic chooser penalty for stepping into a cell with three or more closed sides.
    pub dead_end_penalty: u32,
    /// Role-reversal behaviour.
    pub flee: FleeTuning,
    /// Furthest number of steps the hard cat projects the mouse heading when intercepting.
    pub interception_lookahead: u32,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            memory_capacity: 6,
            cat_history_capacity: 5,
            stuck_limit: 4,
            oscillation_limit: 2,
            cooldown: CooldownTuning::default(),
            memory_penalty: MemoryPenalty::default(),
            revisit_penalty: 2,
            dead_end_penalty: 3,
            flee: FleeTuning::default(),
            interception_lookahead: 4,
        }
    }
}

impl PursuitConfig {
    /// Checks the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_capacity("memory_capacity", self.memory_capacity, 2)?;
        check_capacity("cat_history_capacity", self.cat_history_capacity, 3)?;
        if self.stuck_limit == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "stuck_limit",
            });
        }
        if self.oscillation_limit == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "oscillation_limit",
            });
        }

        let CooldownTuning {
            easy_ms,
            medium_ms,
            hard_ms,
        } = self.cooldown;
        if hard_ms == 0 || medium_ms <= hard_ms || easy_ms <= medium_ms {
            return Err(ConfigError::CooldownOrder {
                easy_ms,
                medium_ms,
                hard_ms,
            });
        }

        Ok(())
    }
}

fn check_capacity(field: &'static str, actual: usize, minimum: usize) -> Result<(), ConfigError> {
    if actual < minimum {
        return Err(ConfigError::CapacityTooSmall {
            field,
            minimum,
            actual,
        });
    }
    if actual > MAX_HISTORY_CAPACITY {
        return Err(ConfigError::CapacityTooLarge {
            field,
            maximum: MAX_HISTORY_CAPACITY,
            actual,
        });
    }
    Ok(())
}

/// Minimum time between two cat moves for each difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CooldownTuning {
    /// Delay on easy, in milliseconds.
    pub easy_ms: u64,
    /// Delay on medium, in milliseconds.
    pub medium_ms: u64,
    /// Delay on hard, in milliseconds.
    pub hard_ms: u64,
}

impl CooldownTuning {
    /// Delay applied between moves on the provided difficulty.
    #[must_use]
    pub const fn delay(&self, difficulty: Difficulty) -> Duration {
        let millis = match difficulty {
            Difficulty::Easy => self.easy_ms,
            Difficulty::Medium => self.medium_ms,
            Difficulty::Hard => self.hard_ms,
        };
        Duration::from_millis(millis)
    }
}

impl Default for CooldownTuning {
    fn default() -> Self {
        Self {
            easy_ms: 450,
            medium_ms: 350,
            hard_ms: 250,
        }
    }
}

/// How remembered mouse cells inflate A* step costs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MemoryPenalty {
    /// Every remembered cell costs the same extra amount.
    Fixed {
        /// Extra cost per remembered cell.
        cost: u32,
    },
    /// Newer cells cost more; the newest costs `max_cost`.
    Recency {
        /// Extra cost of the most recent cell.
        max_cost: u32,
    },
}

impl MemoryPenalty {
    /// Extra cost for the cell at `position` (0 = oldest) of a memory holding `len` cells.
    #[must_use]
    pub fn cost(&self, position: usize, len: usize) -> u32 {
        match *self {
            Self::Fixed { cost } => cost,
            Self::Recency { max_cost } => {
                let len = u64::try_from(len.max(1)).unwrap_or(u64::MAX);
                let rank = u64::try_from(position.saturating_add(1)).unwrap_or(u64::MAX);
                let scaled = (u64::from(max_cost) * rank.min(len)).div_ceil(len);
                u32::try_from(scaled).unwrap_or(max_cost)
            }
        }
    }
}

impl Default for MemoryPenalty {
    fn default() -> Self {
        Self::Fixed { cost: 5 }
    }
}

/// Distances used while the cat flees the empowered mouse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FleeTuning {
    /// Beyond this Manhattan distance the cat only maintains separation.
    pub safety_radius: u32,
    /// Separation the cat tries to hold while outside the safety radius.
    pub optimal_separation: u32,
    /// Manhattan radius around the cat searched for a separation cell.
    pub strategic_radius: u32,
    /// A cached flee target closer than this to the mouse is dropped.
    pub min_target_distance: u32,
    /// Penalty for retreating onto a remembered mouse cell.
    pub revisit_penalty: u32,
}

impl Default for FleeTuning {
    fn default() -> Self {
        Self {
            safety_radius: 8,
            optimal_separation: 10,
            strategic_radius: 3,
            min_target_distance: 2,
            revisit_penalty: 1,
        }
    }
}

/// Reasons a [`PursuitConfig`] is rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A bounded buffer is too small for the engine to work.
    #[error("{field} must be at least {minimum}, got {actual}")]
    CapacityTooSmall {
        /// Name of the offending field.
        field: &'static str,
        /// Smallest accepted value.
        minimum: usize,
        /// Configured value.
        actual: usize,
    },
    /// A bounded buffer exceeds the supported history length.
    #[error("{field} must be at most {maximum}, got {actual}")]
    CapacityTooLarge {
        /// Name of the offending field.
        field: &'static str,
        /// Largest accepted value.
        maximum: usize,
        /// Configured value.
        actual: usize,
    },
    /// A detector limit of zero would trip on every decision.
    #[error("{field} must be greater than zero")]
    ZeroLimit {
        /// Name of the offending field.
        field: &'static str,
    },
    /// Cooldowns must be positive and shrink as difficulty rises.
    #[error(
        "cooldowns must satisfy easy > medium > hard > 0, got {easy_ms}/{medium_ms}/{hard_ms} ms"
    )]
    CooldownOrder {
        /// Configured easy delay.
        easy_ms: u64,
        /// Configured medium delay.
        medium_ms: u64,
        /// Configured hard delay.
        hard_ms: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(PursuitConfig::default().validate(), Ok(()));
    }

    #[test]
    fn cooldowns_must_shrink_with_difficulty() {
        let mut config = PursuitConfig::default();
        config.cooldown.medium_ms = config.cooldown.easy_ms;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::CooldownOrder { .. })
        ));
    }

    #[test]
    fn short_buffers_are_rejected() {
        let config = PursuitConfig {
            cat_history_capacity: 2,
            ..PursuitConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::CapacityTooSmall {
                field: "cat_history_capacity",
                minimum: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn oversized_buffers_are_rejected() {
        let config = PursuitConfig {
            memory_capacity: usize::MAX,
            ..PursuitConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::CapacityTooLarge {
                field: "memory_capacity",
                maximum: MAX_HISTORY_CAPACITY,
                actual: usize::MAX,
            })
        );

        let config = PursuitConfig {
            cat_history_capacity: MAX_HISTORY_CAPACITY,
            ..PursuitConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn recency_penalty_grows_toward_newest_cell() {
        let penalty = MemoryPenalty::Recency { max_cost: 6 };
        assert_eq!(penalty.cost(0, 3), 2);
        assert_eq!(penalty.cost(1, 3), 4);
        assert_eq!(penalty.cost(2, 3), 6);
        assert_eq!(MemoryPenalty::default().cost(0, 3), 5);
    }

    #[test]
    fn delays_follow_difficulty() {
        let cooldown = CooldownTuning::default();
        assert_eq!(cooldown.delay(Difficulty::Easy), Duration::from_millis(450));
        assert_eq!(cooldown.delay(Difficulty::Hard), Duration::from_millis(250));
    }
}
