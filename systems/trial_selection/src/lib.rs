#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Trial selection: picks the target plant and the voice clip announcing it.
//!
//! The selection functions are pure and take their randomness as an explicit
//! `random_value` in `0.0..1.0`. Only [`TrialSelection::handle`] touches a
//! random number generator, drawing the values it forwards to them.

use std::time::Duration;

use rand::Rng;
use tracing::debug;
use voice_garden_system_catalog::Catalog;
use voice_garden_core::{
    Command, DifficultyClass, DifficultyLevel, Event, PlantId, RoundSnapshot, Trial, VoiceClip,
    DEFAULT_DROP_COUNT,
};

const LEVEL_ONE_CLASSES: [DifficultyClass; 2] = [DifficultyClass::D1, DifficultyClass::D2];
const LEVEL_TWO_CLASSES: [DifficultyClass; 1] = [DifficultyClass::D3];
const LEVEL_THREE_CLASSES: [DifficultyClass; 3] =
    [DifficultyClass::D1, DifficultyClass::D2, DifficultyClass::D3];

/// Tuning parameters for trial selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Simulated time between spawn attempts.
    pub spawn_interval: Duration,
    /// Falling speed at the start of the round.
    pub min_fall_speed: f32,
    /// Falling speed once the countdown runs out.
    pub max_fall_speed: f32,
    /// Drops carried by every cluster.
    pub drop_count: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spawn_interval: Duration::from_secs(10),
            min_fall_speed: 110.0,
            max_fall_speed: 220.0,
            drop_count: DEFAULT_DROP_COUNT,
        }
    }
}

/// Picks the next target plant, favouring whichever plant is behind.
///
/// Equal hit counts are broken by `random_value`: lupinus below `0.5`,
/// mushroom otherwise.
#[must_use]
pub fn pick_target_plant(lupinus_hits: u32, mushroom_hits: u32, random_value: f64) -> PlantId {
    if lupinus_hits == mushroom_hits {
        return if random_value < 0.5 {
            PlantId::Lupinus
        } else {
            PlantId::Mushroom
        };
    }

    if lupinus_hits < mushroom_hits {
        PlantId::Lupinus
    } else {
        PlantId::Mushroom
    }
}

/// Clip difficulty classes offered at the provided level.
#[must_use]
pub const fn allowed_classes(level: DifficultyLevel) -> &'static [DifficultyClass] {
    match level {
        DifficultyLevel::One => &LEVEL_ONE_CLASSES,
        DifficultyLevel::Two => &LEVEL_TWO_CLASSES,
        DifficultyLevel::Three => &LEVEL_THREE_CLASSES,
    }
}

/// Picks the clip announcing `target` at the provided difficulty level.
///
/// Candidates must match both an allowed difficulty class and the target's
/// gender; `random_value` selects uniformly among them. Without candidates the
/// first clip of the right gender is used, and without one of those the first
/// clip of the catalog. Gender wins over difficulty.
#[must_use]
pub fn pick_voice_clip(
    target: PlantId,
    level: DifficultyLevel,
    catalog: &Catalog,
    random_value: f64,
) -> &VoiceClip {
    let gender = target.required_gender();
    let allowed = allowed_classes(level);

    let candidates: Vec<&VoiceClip> = catalog
        .iter()
        .filter(|clip| clip.gender() == gender && allowed.contains(&clip.difficulty_class()))
        .collect();

    if !candidates.is_empty() {
        return candidates[candidate_index(random_value, candidates.len())];
    }

    catalog
        .iter()
        .find(|clip| clip.gender() == gender)
        .unwrap_or_else(|| catalog.first())
}

fn candidate_index(random_value: f64, count: usize) -> usize {
    let scaled = (random_value.clamp(0.0, 1.0) * count as f64).floor() as usize;
    scaled.min(count - 1)
}

/// Falling speed for a cluster spawned at `progress` through the round.
#[must_use]
pub fn fall_speed(config: &Config, progress: f32) -> f32 {
    let progress = progress.clamp(0.0, 1.0);
    config.min_fall_speed + (config.max_fall_speed - config.min_fall_speed) * progress
}

/// Builds a complete trial from explicit random values.
#[must_use]
pub fn build_trial(
    config: &Config,
    snapshot: &RoundSnapshot,
    catalog: &Catalog,
    target_roll: f64,
    clip_roll: f64,
) -> Trial {
    let target_plant =
        pick_target_plant(snapshot.lupinus_hits, snapshot.mushroom_hits, target_roll);
    let clip = pick_voice_clip(target_plant, snapshot.difficulty.level(), catalog, clip_roll);

    Trial {
        target_plant,
        clip: clip.clone(),
        drop_count: config.drop_count,
        fall_speed: fall_speed(config, snapshot.progress),
    }
}

/// System that emits spawn commands on round start and on a fixed cadence.
#[derive(Debug)]
pub struct TrialSelection {
    config: Config,
    accumulator: Duration,
}

impl TrialSelection {
    /// Creates a new trial selection system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            accumulator: Duration::ZERO,
        }
    }

    /// Configuration the system was created with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Consumes round events and emits at most one spawn command.
    ///
    /// An attempt happens when a round starts and whenever the accumulated
    /// round time crosses the spawn interval. Attempts made while a cluster is
    /// falling or outside a running round are dropped, not deferred.
    pub fn handle<R>(
        &mut self,
        events: &[Event],
        snapshot: RoundSnapshot,
        catalog: &Catalog,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        let mut attempt = false;

        for event in events {
            match event {
                Event::RoundStarted { .. } => {
                    self.accumulator = Duration::ZERO;
                    attempt = true;
                }
                Event::TimeAdvanced { dt, .. } => {
                    self.accumulator = self.accumulator.saturating_add(*dt);
                }
                Event::RoundEnded { .. } => {
                    self.accumulator = Duration::ZERO;
                }
                _ => {}
            }
        }

        if self.resolve_spawn_attempts() > 0 {
            attempt = true;
        }

        if !attempt || !snapshot.in_progress || snapshot.trial_active {
            return;
        }

        let target_roll = rng.gen::<f64>();
        let clip_roll = rng.gen::<f64>();
        let trial = build_trial(&self.config, &snapshot, catalog, target_roll, clip_roll);
        debug!(
            target = %trial.target_plant,
            clip = trial.clip.id(),
            level = %snapshot.difficulty.level(),
            "trial selected"
        );
        out.push(Command::SpawnTrial { trial });
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.config.spawn_interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.config.spawn_interval {
            self.accumulator -= self.config.spawn_interval;
            attempts += 1;
        }
        attempts
    }
}
