use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use thiserror::Error;
use voice_garden_system_trial_selection::Config as TrialConfig;
use voice_garden_world::RoundConfig;

const SUPPORTED_CONFIG_VERSION: u32 = 1;
const DEFAULT_FALL_DISTANCE: f32 = 444.0;
const DEFAULT_FRAME: Duration = Duration::from_millis(100);
const DEFAULT_ACCURACY: f64 = 0.75;

/// Everything a headless run needs besides the seed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Settings {
    /// Round parameters handed to the world.
    pub(crate) round: RoundConfig,
    /// Trial selection tuning.
    pub(crate) trials: TrialConfig,
    /// Distance a cluster falls between spawn and the landing line.
    pub(crate) fall_distance: f32,
    /// Simulated time advanced per frame.
    pub(crate) frame: Duration,
    /// Probability that the simulated player steers to the target plant.
    pub(crate) accuracy: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            round: RoundConfig::default(),
            trials: TrialConfig::default(),
            fall_distance: DEFAULT_FALL_DISTANCE,
            frame: DEFAULT_FRAME,
            accuracy: DEFAULT_ACCURACY,
        }
    }
}

impl Settings {
    /// Loads settings from the TOML file at `path`.
    pub(crate) fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to load settings from {}", path.display()))
    }

    /// Parses settings from TOML; absent keys keep their defaults.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        let file: SettingsFile =
            toml::from_str(contents).context("failed to parse settings toml contents")?;
        if file.version != SUPPORTED_CONFIG_VERSION {
            bail!(
                "unsupported settings version {}; expected {}",
                file.version,
                SUPPORTED_CONFIG_VERSION
            );
        }

        Ok(Self {
            round: RoundConfig {
                duration: seconds("round.duration_secs", file.round.duration_secs)?,
                field_width: file.round.field_width,
                hit_goal: file.round.hit_goal,
            },
            trials: TrialConfig {
                spawn_interval: seconds("trials.spawn_interval_secs", file.trials.spawn_interval_secs)?,
                min_fall_speed: file.trials.min_fall_speed,
                max_fall_speed: file.trials.max_fall_speed,
                drop_count: file.trials.drop_count,
            },
            fall_distance: file.simulation.fall_distance,
            frame: Duration::from_millis(file.simulation.frame_millis),
            accuracy: file.simulation.accuracy,
        })
    }

    /// Replaces the accuracy when the command line provides one.
    #[must_use]
    pub(crate) fn with_accuracy(mut self, accuracy: Option<f64>) -> Self {
        if let Some(accuracy) = accuracy {
            self.accuracy = accuracy;
        }
        self
    }

    /// Rejects settings that would stall or break a simulated round.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.round.duration.is_zero() {
            return Err(ConfigError::NotPositive("round.duration_secs"));
        }
        if !(self.round.field_width > 0.0) {
            return Err(ConfigError::NotPositive("round.field_width"));
        }
        if self.round.hit_goal == 0 {
            return Err(ConfigError::NotPositive("round.hit_goal"));
        }
        if self.trials.spawn_interval.is_zero() {
            return Err(ConfigError::NotPositive("trials.spawn_interval_secs"));
        }
        if !(self.trials.min_fall_speed > 0.0) {
            return Err(ConfigError::NotPositive("trials.min_fall_speed"));
        }
        if !(self.trials.max_fall_speed >= self.trials.min_fall_speed) {
            return Err(ConfigError::FallSpeedRange {
                min: self.trials.min_fall_speed,
                max: self.trials.max_fall_speed,
            });
        }
        if !(self.fall_distance > 0.0) {
            return Err(ConfigError::NotPositive("simulation.fall_distance"));
        }
        if self.frame.is_zero() {
            return Err(ConfigError::NotPositive("simulation.frame_millis"));
        }
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(ConfigError::AccuracyOutOfRange(self.accuracy));
        }
        Ok(())
    }
}

/// Settings that parse but cannot drive a round.
#[derive(Clone, Debug, PartialEq, Error)]
pub(crate) enum ConfigError {
    /// A length, count, or speed was zero or negative.
    #[error("`{0}` must be positive")]
    NotPositive(&'static str),
    /// A duration could not be represented.
    #[error("`{field}` is not a valid number of seconds: {value}")]
    InvalidSeconds {
        /// Dotted key of the offending value.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// The maximum fall speed is below the minimum.
    #[error("fall speed range {min}..{max} is inverted")]
    FallSpeedRange {
        /// Configured minimum fall speed.
        min: f32,
        /// Configured maximum fall speed.
        max: f32,
    },
    /// Accuracy is not a probability.
    #[error("accuracy {0} must lie within 0.0..=1.0")]
    AccuracyOutOfRange(f64),
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidSeconds { field, value })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    version: u32,
    #[serde(default)]
    round: RoundSection,
    #[serde(default)]
    trials: TrialSection,
    #[serde(default)]
    simulation: SimulationSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RoundSection {
    duration_secs: f64,
    field_width: f32,
    hit_goal: u32,
}

impl Default for RoundSection {
    fn default() -> Self {
        let round = RoundConfig::default();
        Self {
            duration_secs: round.duration.as_secs_f64(),
            field_width: round.field_width,
            hit_goal: round.hit_goal,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TrialSection {
    spawn_interval_secs: f64,
    min_fall_speed: f32,
    max_fall_speed: f32,
    drop_count: u32,
}

impl Default for TrialSection {
    fn default() -> Self {
        let trials = TrialConfig::default();
        Self {
            spawn_interval_secs: trials.spawn_interval.as_secs_f64(),
            min_fall_speed: trials.min_fall_speed,
            max_fall_speed: trials.max_fall_speed,
            drop_count: trials.drop_count,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SimulationSection {
    fall_distance: f32,
    frame_millis: u64,
    accuracy: f64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            fall_distance: DEFAULT_FALL_DISTANCE,
            frame_millis: DEFAULT_FRAME.as_millis() as u64,
            accuracy: DEFAULT_ACCURACY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_keeps_defaults() {
        let settings = Settings::from_toml_str("version = 1").expect("settings parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn sections_override_individual_keys() {
        let contents = r#"
            version = 1

            [round]
            duration_secs = 60
            hit_goal = 6

            [trials]
            max_fall_speed = 300.0

            [simulation]
            accuracy = 1.0
        "#;

        let settings = Settings::from_toml_str(contents).expect("settings parse");
        assert_eq!(settings.round.duration, Duration::from_secs(60));
        assert_eq!(settings.round.hit_goal, 6);
        assert_eq!(settings.round.field_width, RoundConfig::default().field_width);
        assert_eq!(settings.trials.max_fall_speed, 300.0);
        assert_eq!(settings.trials.min_fall_speed, 110.0);
        assert_eq!(settings.accuracy, 1.0);
    }

    #[test]
    fn rejects_unknown_version() {
        let error = Settings::from_toml_str("version = 2").expect_err("version 2 is unsupported");
        assert!(format!("{error:#}").contains("unsupported settings version 2"));
    }

    #[test]
    fn rejects_missing_version_and_unknown_keys() {
        assert!(Settings::from_toml_str("[round]\nhit_goal = 4").is_err());
        assert!(Settings::from_toml_str("version = 1\n[round]\nlives = 3").is_err());
    }

    #[test]
    fn rejects_negative_durations() {
        let error = Settings::from_toml_str("version = 1\n[round]\nduration_secs = -5.0")
            .expect_err("negative durations are invalid");
        assert!(format!("{error:#}").contains("round.duration_secs"));
    }

    #[test]
    fn validation_catches_unplayable_settings() {
        let inverted = Settings {
            trials: TrialConfig {
                min_fall_speed: 200.0,
                max_fall_speed: 100.0,
                ..TrialConfig::default()
            },
            ..Settings::default()
        };
        assert_eq!(
            inverted.validate(),
            Err(ConfigError::FallSpeedRange {
                min: 200.0,
                max: 100.0,
            })
        );

        let reckless = Settings::default().with_accuracy(Some(1.5));
        assert_eq!(reckless.validate(), Err(ConfigError::AccuracyOutOfRange(1.5)));

        let frozen = Settings {
            frame: Duration::ZERO,
            ..Settings::default()
        };
        assert_eq!(
            frozen.validate(),
            Err(ConfigError::NotPositive("simulation.frame_millis"))
        );
    }
}
