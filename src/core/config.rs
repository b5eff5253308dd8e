//! Simulation configuration with documented constants
//!
//! All tuning values are collected here with explanations of their purpose
//! and how they interact with each other.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;

/// Configuration for the simulation systems
///
/// These values have been tuned to produce plausible squad behaviour.
/// Changing them affects match pacing, not correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === FRAME STEPPING ===
    /// Simulated seconds advanced per frame
    ///
    /// Every behaviour tree and manoeuvre timer is driven by this delta.
    /// 0.1 gives ten logical frames per simulated second.
    pub frame_delta: f32,

    /// Match length in simulated seconds
    pub match_duration: f32,

    // === ARENA ===
    /// Arena width in cells (minimum 16)
    pub arena_width: i32,

    /// Arena height in cells (minimum 8)
    pub arena_height: i32,

    // === PERCEPTION ===
    /// How far a soldier can see (grid cells)
    ///
    /// Sightings beyond this range are never reported, regardless of
    /// line of sight.
    pub view_range: f32,

    /// How far a soldier can shoot (grid cells)
    ///
    /// Must not exceed `view_range`; a soldier never fires at a target
    /// it cannot see.
    pub attack_range: f32,

    // === COMBAT ===
    /// Damage dealt per successful shot
    pub shot_damage: f32,

    /// Seconds between shots
    pub fire_interval: f32,

    /// Starting and respawn health
    pub max_health: f32,

    /// Seconds a dead soldier waits before respawning at a base spawn point
    pub respawn_delay: f32,

    // === SOLDIERS ===
    /// Soldiers per team
    pub team_size: usize,

    /// Movement speed in grid cells per simulated second
    pub move_speed: f32,

    /// How far from its current position a patrolling soldier picks its
    /// next waypoint
    pub patrol_radius: f32,

    // === TEAM AI ===
    /// Seconds an assemble phase waits for stragglers before attacking anyway
    ///
    /// Shared by the coordinated, distraction and guarded-capture manoeuvres.
    /// The attack starts earlier if every participant reports arrival first.
    pub wait_for_participants_interval: f32,

    /// Assembly groups used by the coordinated base attack
    pub coordinated_attack_groups: usize,

    /// Radius (grid cells) within which a dropped flag can be picked up
    /// or returned
    pub flag_interaction_radius: f32,

    /// Known enemies within this range of the own flag stand put the
    /// defence on an active footing
    pub base_alert_radius: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_delta: 0.1,
            match_duration: 180.0,
            arena_width: 32,
            arena_height: 16,
            view_range: 12.0,
            attack_range: 8.0,
            shot_damage: 20.0,
            fire_interval: 0.8,
            max_health: 100.0,
            respawn_delay: 5.0,
            team_size: 4,
            move_speed: 3.0,
            patrol_radius: 8.0,
            wait_for_participants_interval: 15.0,
            coordinated_attack_groups: 2,
            flag_interaction_radius: 1.5,
            base_alert_radius: 9.0,
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a TOML file; missing keys fall back
    /// to the defaults.
    pub fn from_toml(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: SimulationConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would stall or break the simulation
    pub fn validate(&self) -> Result<()> {
        use crate::core::error::FlagstormError;

        if self.frame_delta <= 0.0 {
            return Err(FlagstormError::InvalidConfig(
                "frame_delta must be positive".into(),
            ));
        }
        if self.team_size == 0 {
            return Err(FlagstormError::InvalidConfig(
                "team_size must be at least 1".into(),
            ));
        }
        if self.attack_range > self.view_range {
            return Err(FlagstormError::InvalidConfig(
                "attack_range must not exceed view_range".into(),
            ));
        }
        if self.coordinated_attack_groups == 0 {
            return Err(FlagstormError::InvalidConfig(
                "coordinated_attack_groups must be at least 1".into(),
            ));
        }
        if self.arena_width < 16 || self.arena_height < 8 {
            return Err(FlagstormError::InvalidConfig(
                "arena must be at least 16x8".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_attack_range_cannot_exceed_view_range() {
        let config = SimulationConfig {
            attack_range: 20.0,
            view_range: 10.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_team_size_rejected() {
        let config = SimulationConfig {
            team_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
