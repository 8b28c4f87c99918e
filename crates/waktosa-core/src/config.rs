//! Battle configuration.
//!
//! A [`BattleConfig`] says who fights, how turns are paced, and who is in
//! control. It deserializes from JSON and every field has a default, so
//! `{}` is a complete configuration for the first stage.
//!
//! # Example
//!
//! ```
//! use waktosa_core::config::{BattleConfig, ControlMode, Stage};
//!
//! let config = BattleConfig::from_json(r#"{ "stage": "darkness", "control": "auto" }"#).unwrap();
//! assert_eq!(config.stage, Stage::Darkness);
//! assert_eq!(config.control, ControlMode::Auto);
//! assert_eq!(config.base_action_value, 10_000);
//!
//! let roster = config.build_roster().unwrap();
//! assert_eq!(roster.len(), 8);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combatant::{Side, Stats};
use crate::error::{ConfigError, SetupError};
use crate::roster::Roster;
use crate::scheduler::DEFAULT_BASE_ACTION_VALUE;

// =============================================================================
// Stages
// =============================================================================

/// Preset battle rosters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Stage 1: three village keepers against three demons
    #[default]
    Village,
    /// Stage 2: three village keepers against five bosses
    Darkness,
}

impl Stage {
    /// Number of bosses in [`Stage::Darkness`].
    pub const DARKNESS_BOSSES: usize = 5;

    /// Returns the stage for a 1-based stage number.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::Village),
            2 => Some(Self::Darkness),
            _ => None,
        }
    }

    /// Returns the 1-based stage number.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Village => 1,
            Self::Darkness => 2,
        }
    }

    /// Returns the combatants of this stage in spawn order.
    #[must_use]
    pub fn roster_specs(self) -> Vec<CombatantSpec> {
        let mut specs = keepers();
        match self {
            Self::Village => {
                specs.push(CombatantSpec::new(
                    "Iblis Hutan",
                    Side::Enemy,
                    Stats::new(90, 14, 4, 95),
                ));
                specs.push(CombatantSpec::new(
                    "Iblis Sungai",
                    Side::Enemy,
                    Stats::new(80, 12, 3, 105),
                ));
                specs.push(CombatantSpec::new(
                    "Iblis Batu",
                    Side::Enemy,
                    Stats::new(130, 11, 8, 70),
                ));
            }
            Self::Darkness => {
                specs.extend((1..=Self::DARKNESS_BOSSES).map(|i| {
                    CombatantSpec::new(format!("Boss{i}"), Side::Enemy, Stats::new(200, 20, 10, 80))
                }));
            }
        }
        specs
    }
}

/// The three village keepers shared by every stage.
fn keepers() -> Vec<CombatantSpec> {
    vec![
        CombatantSpec::new("Pawang Ardi", Side::Ally, Stats::new(120, 18, 6, 110)),
        CombatantSpec::new("Pawang Sekar", Side::Ally, Stats::new(100, 22, 4, 130)),
        CombatantSpec::new("Pawang Bima", Side::Ally, Stats::new(150, 14, 10, 90)),
    ]
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Village => write!(f, "Stage 1 (Village)"),
            Self::Darkness => write!(f, "Stage 2 (Darkness)"),
        }
    }
}

// =============================================================================
// Combatant Specs
// =============================================================================

/// Declarative description of one combatant to spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSpec {
    /// Display name; may repeat across combatants
    pub name: String,
    /// Side the combatant fights for
    pub side: Side,
    /// Combat statistics
    #[serde(flatten)]
    pub stats: Stats,
}

impl CombatantSpec {
    /// Creates a new spec.
    #[must_use]
    pub fn new(name: impl Into<String>, side: Side, stats: Stats) -> Self {
        Self {
            name: name.into(),
            side,
            stats,
        }
    }
}

// =============================================================================
// Control
// =============================================================================

/// Who chooses ally actions.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Allies wait for [`perform_attack`](crate::session::BattleSession::perform_attack)
    #[default]
    Player,
    /// Both sides are AI-driven
    Auto,
}

/// How AI-controlled combatants pick a target.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPolicy {
    /// First living opponent in spawn order
    #[default]
    FirstLiving,
    /// Seeded pseudo-random living opponent
    Random,
}

// =============================================================================
// BattleConfig
// =============================================================================

/// Configuration for a [`BattleSession`](crate::session::BattleSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// BASE constant of the action-value formula `round(BASE / speed)`
    pub base_action_value: u32,
    /// Preset roster used when `combatants` is absent
    pub stage: Stage,
    /// Explicit roster; replaces the stage preset when present
    pub combatants: Option<Vec<CombatantSpec>>,
    /// Who chooses ally actions
    pub control: ControlMode,
    /// End turns automatically after each resolution
    pub auto_advance: bool,
    /// AI targeting policy
    pub target_policy: TargetPolicy,
    /// Seed for [`TargetPolicy::Random`]
    pub seed: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            base_action_value: DEFAULT_BASE_ACTION_VALUE,
            stage: Stage::default(),
            combatants: None,
            control: ControlMode::default(),
            auto_advance: true,
            target_policy: TargetPolicy::default(),
            seed: 0,
        }
    }
}

impl BattleConfig {
    /// Creates the default configuration for `stage`.
    #[must_use]
    pub fn for_stage(stage: Stage) -> Self {
        Self {
            stage,
            ..Self::default()
        }
    }

    /// Creates a configuration with an explicit roster.
    #[must_use]
    pub fn with_combatants(combatants: Vec<CombatantSpec>) -> Self {
        Self {
            combatants: Some(combatants),
            ..Self::default()
        }
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any error
    /// reported by [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// Combatant stats are checked later, when the roster is built.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseActionValue`] if the base is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_action_value == 0 {
            return Err(ConfigError::InvalidBaseActionValue);
        }
        Ok(())
    }

    /// Returns the combatants to spawn: the explicit roster if present,
    /// otherwise the stage preset.
    #[must_use]
    pub fn combatant_specs(&self) -> Vec<CombatantSpec> {
        self.combatants
            .clone()
            .unwrap_or_else(|| self.stage.roster_specs())
    }

    /// Spawns every configured combatant into a fresh roster.
    ///
    /// An explicitly empty roster yields an empty [`Roster`]; starting a
    /// battle with it fails with [`SetupError::EmptyRoster`].
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidStats`] for the first combatant with
    /// unusable stats.
    pub fn build_roster(&self) -> Result<Roster, SetupError> {
        let mut roster = Roster::new();
        for spec in self.combatant_specs() {
            roster.spawn(spec.name, spec.side, spec.stats)?;
        }
        Ok(roster)
    }

    /// Returns `true` if `side` waits for player input under this config.
    #[must_use]
    pub fn is_player_controlled(&self, side: Side) -> bool {
        self.control == ControlMode::Player && side == Side::Ally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod stage_tests {
        use super::*;

        #[test]
        fn village_is_three_against_three() {
            let specs = Stage::Village.roster_specs();
            assert_eq!(specs.iter().filter(|s| s.side == Side::Ally).count(), 3);
            assert_eq!(specs.iter().filter(|s| s.side == Side::Enemy).count(), 3);
        }

        #[test]
        fn darkness_brings_five_bosses() {
            let bosses: Vec<_> = Stage::Darkness
                .roster_specs()
                .into_iter()
                .filter(|s| s.side == Side::Enemy)
                .collect();
            assert_eq!(bosses.len(), 5);
            assert_eq!(bosses[0].name, "Boss1");
            assert_eq!(bosses[4].name, "Boss5");
            assert!(bosses.iter().all(|b| b.stats == Stats::new(200, 20, 10, 80)));
        }

        #[test]
        fn index_roundtrip() {
            for stage in [Stage::Village, Stage::Darkness] {
                assert_eq!(Stage::from_index(stage.index()), Some(stage));
            }
            assert_eq!(Stage::from_index(0), None);
            assert_eq!(Stage::from_index(3), None);
        }

        #[test]
        fn preset_stats_are_valid() {
            for stage in [Stage::Village, Stage::Darkness] {
                for spec in stage.roster_specs() {
                    assert!(spec.stats.validate(&spec.name).is_ok(), "{}", spec.name);
                }
            }
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn empty_object_is_default() {
            let config = BattleConfig::from_json("{}").unwrap();
            assert_eq!(config, BattleConfig::default());
            assert!(config.auto_advance);
            assert_eq!(config.target_policy, TargetPolicy::FirstLiving);
        }

        #[test]
        fn explicit_roster_is_parsed() {
            let json = r#"{
                "combatants": [
                    { "name": "Pawang", "side": "ally", "max_hp": 50, "attack": 9, "defense": 2, "speed": 120 },
                    { "name": "Iblis", "side": "enemy", "max_hp": 40, "attack": 7, "defense": 1, "speed": 90 }
                ],
                "target_policy": "random",
                "seed": 7
            }"#;
            let config = BattleConfig::from_json(json).unwrap();
            let specs = config.combatant_specs();
            assert_eq!(specs.len(), 2);
            assert_eq!(specs[1].stats, Stats::new(40, 7, 1, 90));
            assert_eq!(config.target_policy, TargetPolicy::Random);
            assert_eq!(config.seed, 7);
        }

        #[test]
        fn malformed_json_is_a_parse_error() {
            let err = BattleConfig::from_json("{ stage: ").unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)));
        }

        #[test]
        fn unknown_stage_is_a_parse_error() {
            assert!(BattleConfig::from_json(r#"{ "stage": "moon" }"#).is_err());
        }

        #[test]
        fn zero_base_is_rejected() {
            let err = BattleConfig::from_json(r#"{ "base_action_value": 0 }"#).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidBaseActionValue));
        }

        #[test]
        fn serialization_roundtrip() {
            let config = BattleConfig {
                control: ControlMode::Auto,
                ..BattleConfig::for_stage(Stage::Darkness)
            };
            let json = serde_json::to_string(&config).unwrap();
            assert_eq!(BattleConfig::from_json(&json).unwrap(), config);
        }
    }

    mod roster_tests {
        use super::*;

        #[test]
        fn explicit_roster_replaces_stage() {
            let config = BattleConfig {
                stage: Stage::Darkness,
                ..BattleConfig::with_combatants(vec![CombatantSpec::new(
                    "Solo",
                    Side::Ally,
                    Stats::default(),
                )])
            };
            assert_eq!(config.build_roster().unwrap().len(), 1);
        }

        #[test]
        fn invalid_stats_fail_roster_build() {
            let config = BattleConfig::with_combatants(vec![CombatantSpec::new(
                "Frozen",
                Side::Enemy,
                Stats::new(10, 1, 1, 0),
            )]);
            assert!(matches!(
                config.build_roster(),
                Err(SetupError::InvalidStats { .. })
            ));
        }

        #[test]
        fn empty_explicit_roster_builds_empty() {
            let config = BattleConfig::with_combatants(Vec::new());
            assert!(config.build_roster().unwrap().is_empty());
        }

        #[test]
        fn player_control_only_applies_to_allies() {
            let config = BattleConfig::default();
            assert!(config.is_player_controlled(Side::Ally));
            assert!(!config.is_player_controlled(Side::Enemy));

            let auto = BattleConfig {
                control: ControlMode::Auto,
                ..BattleConfig::default()
            };
            assert!(!auto.is_player_controlled(Side::Ally));
        }
    }
}
