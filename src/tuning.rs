//! Data-driven game balance
//!
//! Every physics and collision constant lives in [`Tuning`]. A `Tuning` is
//! handed to [`GameState`](crate::sim::GameState) at construction and never
//! mutated afterwards, so levels and difficulties can ship their own values.
//!
//! Units: horizontal speed is pixels/second; vertical speed, charges, thrust
//! and part velocities are pixels/tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// How the brake input slows the vehicle down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum BrakingRule {
    /// Subtract a fixed amount every tick the brake is held
    Flat { amount: f32 },
    /// Multiply by `factor` every tick, never dropping below `floor`
    Decay { factor: f32, floor: f32 },
}

impl Default for BrakingRule {
    fn default() -> Self {
        BrakingRule::Flat { amount: 15.0 }
    }
}

impl BrakingRule {
    /// Speed after one braking tick (result is never negative)
    pub fn apply(&self, speed: f32) -> f32 {
        match *self {
            BrakingRule::Flat { amount } => (speed - amount).max(0.0),
            BrakingRule::Decay { factor, floor } => {
                if speed <= floor {
                    speed.max(0.0)
                } else {
                    (speed * factor).max(floor)
                }
            }
        }
    }
}

/// Gameplay tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Grid ===
    /// Tile edge in pixels
    pub tile_size: f32,
    /// Rows in a level; first and last are implicit floor/ceiling
    pub level_rows: i32,
    /// Columns covering one screen width
    pub view_span: i32,
    /// Columns beyond the right edge scanned for warnings
    pub warning_lookahead: i32,
    /// Fixed simulation step in seconds
    pub tick_duration: f32,

    // === Horizontal ===
    pub acceleration: f32,
    pub h_speed_damping: f32,
    pub braking: BrakingRule,

    // === Vertical thrust ===
    pub thrust_max_charge: f32,
    pub thrust_rate_charge: f32,
    pub thrust_power: f32,
    pub v_speed_damping: f32,
    pub v_speed_floor: f32,
    pub v_speed_cap: f32,
    /// Fraction of the distance to the nearest row boundary covered per tick
    pub snap_rate: f32,

    // === Collision ===
    pub scratch_threshold: f32,
    pub crash_threshold: f32,
    /// Ticks over which a bump pushes the body out
    pub bump_time: f32,

    // === Parts ===
    pub part_base_speed: f32,
    pub snap_distance: f32,
    pub mass_ratio: f32,
    pub debris_gravity: f32,

    // === Bodies ===
    pub hull_size: Vec2,
    pub part_size: Vec2,
    /// Hull start position (screen-relative x, world y)
    pub hull_start: Vec2,

    // === Death ===
    /// Seconds between crash and restart
    pub death_duration: f32,
    pub death_drop_speed: f32,

    // === Score ===
    pub point_score: u64,
    pub point_speed_factor: f32,
    /// Minimum seconds between two pickup cues
    pub pickup_cue_cooldown: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        let tile = 48.0;
        Self {
            tile_size: tile,
            level_rows: 22,
            view_span: 41,
            warning_lookahead: 12,
            tick_duration: 1.0 / 60.0,

            acceleration: 12.0,
            h_speed_damping: 250.0,
            braking: BrakingRule::default(),

            thrust_max_charge: 6.0,
            thrust_rate_charge: 0.1,
            thrust_power: 0.3,
            v_speed_damping: 0.8,
            v_speed_floor: 10.0 / 60.0,
            v_speed_cap: tile * 10.0 / 60.0,
            snap_rate: 0.2,

            scratch_threshold: 4.0,
            crash_threshold: 16.0,
            bump_time: 4.0,

            part_base_speed: 4.0,
            snap_distance: tile * 1.5,
            mass_ratio: 0.25,
            debris_gravity: 0.5,

            hull_size: Vec2::new(72.0, 36.0),
            part_size: Vec2::new(36.0, 36.0),
            hull_start: Vec2::new(tile * 4.0, tile * 10.0),

            death_duration: 2.0,
            death_drop_speed: 6.0,

            point_score: 10,
            point_speed_factor: 0.1,
            pickup_cue_cooldown: 0.1,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Death sequence length in ticks
    pub fn death_ticks(&self) -> u32 {
        (self.death_duration / self.tick_duration).round().max(1.0) as u32
    }

    /// Pickup cue cooldown in ticks
    pub fn pickup_cue_ticks(&self) -> u64 {
        (self.pickup_cue_cooldown / self.tick_duration).round().max(0.0) as u64
    }

    /// World-space height of the playable corridor
    pub fn level_height(&self) -> f32 {
        self.level_rows as f32 * self.tile_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_braking_never_negative() {
        let rule = BrakingRule::Flat { amount: 15.0 };
        assert_eq!(rule.apply(100.0), 85.0);
        assert_eq!(rule.apply(10.0), 0.0);
        assert_eq!(rule.apply(0.0), 0.0);
    }

    #[test]
    fn test_decay_braking_respects_floor() {
        let rule = BrakingRule::Decay {
            factor: 0.5,
            floor: 40.0,
        };
        assert_eq!(rule.apply(200.0), 100.0);
        assert_eq!(rule.apply(60.0), 40.0);
        // Already below the floor: braking does not push it back up
        assert_eq!(rule.apply(20.0), 20.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(
            r#"{ "crash_threshold": 20.0, "braking": { "rule": "decay", "factor": 0.9, "floor": 50.0 } }"#,
        )
        .unwrap();
        assert_eq!(tuning.crash_threshold, 20.0);
        assert_eq!(tuning.tile_size, 48.0);
        assert_eq!(
            tuning.braking,
            BrakingRule::Decay {
                factor: 0.9,
                floor: 50.0
            }
        );
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_death_ticks() {
        let tuning = Tuning::default();
        assert_eq!(tuning.death_ticks(), 120);
    }
}
