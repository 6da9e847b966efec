#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state management for Voice Garden.
//!
//! The world is the only writer of the round's score, plant hits, countdown,
//! active trial and difficulty state. It resolves landings through the landing
//! system and feeds their correctness into the difficulty system.

use std::time::Duration;

use tracing::{debug, info};
use voice_garden_core::{
    Command, DifficultyState, Event, GrowthStage, PlantId, RoundSnapshot, RoundSummary,
    SpawnRejection, Trial, DEFAULT_HIT_GOAL,
};
use voice_garden_system_difficulty::advance;
use voice_garden_system_landing::resolve_landing;

const DEFAULT_ROUND_DURATION: Duration = Duration::from_secs(120);
const DEFAULT_FIELD_WIDTH: f32 = 1024.0;

/// Round parameters fixed for the lifetime of a world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundConfig {
    /// Length of the round countdown.
    pub duration: Duration,
    /// Width of the play field in field units.
    pub field_width: f32,
    /// Hits a plant needs to reach its adult stage.
    pub hit_goal: u32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_ROUND_DURATION,
            field_width: DEFAULT_FIELD_WIDTH,
            hit_goal: DEFAULT_HIT_GOAL,
        }
    }
}

/// Lifecycle phase of the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundPhase {
    /// No round has been started yet.
    Idle,
    /// The countdown is running.
    Running,
    /// The round finished; a summary was published.
    Ended,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct PlantHits {
    lupinus: u32,
    mushroom: u32,
}

impl PlantHits {
    const fn get(&self, plant: PlantId) -> u32 {
        match plant {
            PlantId::Lupinus => self.lupinus,
            PlantId::Mushroom => self.mushroom,
        }
    }

    fn grow(&mut self, plant: PlantId, drops: u32, goal: u32) -> u32 {
        let hits = match plant {
            PlantId::Lupinus => &mut self.lupinus,
            PlantId::Mushroom => &mut self.mushroom,
        };
        *hits = hits.saturating_add(drops).min(goal);
        *hits
    }

    fn all_reached(&self, goal: u32) -> bool {
        PlantId::ALL.iter().all(|plant| self.get(*plant) >= goal)
    }
}

/// Represents the authoritative Voice Garden round state.
#[derive(Debug)]
pub struct World {
    config: RoundConfig,
    phase: RoundPhase,
    score: i32,
    hits: PlantHits,
    remaining: Duration,
    active_trial: Option<Trial>,
    difficulty: DifficultyState,
}

impl World {
    /// Creates a world using the default round parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RoundConfig::default())
    }

    /// Creates a world using the provided round parameters.
    #[must_use]
    pub fn with_config(config: RoundConfig) -> Self {
        Self {
            config,
            phase: RoundPhase::Idle,
            score: 0,
            hits: PlantHits::default(),
            remaining: config.duration,
            active_trial: None,
            difficulty: DifficultyState::INITIAL,
        }
    }

    fn reset(&mut self) {
        self.phase = RoundPhase::Running;
        self.score = 0;
        self.hits = PlantHits::default();
        self.remaining = self.config.duration;
        self.active_trial = None;
        self.difficulty = DifficultyState::INITIAL;
    }

    fn summary(&self) -> RoundSummary {
        RoundSummary {
            score: self.score,
            win: self.hits.all_reached(self.config.hit_goal),
            lupinus_hits: self.hits.get(PlantId::Lupinus),
            mushroom_hits: self.hits.get(PlantId::Mushroom),
        }
    }

    fn snapshot(&self) -> RoundSnapshot {
        let progress = if self.config.duration.is_zero() {
            1.0
        } else {
            1.0 - self.remaining.as_secs_f32() / self.config.duration.as_secs_f32()
        };

        RoundSnapshot {
            in_progress: self.phase == RoundPhase::Running,
            trial_active: self.active_trial.is_some(),
            lupinus_hits: self.hits.get(PlantId::Lupinus),
            mushroom_hits: self.hits.get(PlantId::Mushroom),
            difficulty: self.difficulty,
            progress: progress.clamp(0.0, 1.0),
        }
    }

    fn end_round(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != RoundPhase::Running {
            return;
        }

        self.phase = RoundPhase::Ended;
        self.active_trial = None;
        let summary = self.summary();
        info!(
            score = summary.score,
            win = summary.win,
            lupinus = summary.lupinus_hits,
            mushroom = summary.mushroom_hits,
            "round ended"
        );
        out_events.push(Event::RoundEnded { summary });
    }

    fn spawn_rejection(&self) -> Option<SpawnRejection> {
        match self.phase {
            RoundPhase::Idle => Some(SpawnRejection::RoundNotStarted),
            RoundPhase::Ended => Some(SpawnRejection::RoundOver),
            RoundPhase::Running if self.active_trial.is_some() => {
                Some(SpawnRejection::TrialActive)
            }
            RoundPhase::Running => None,
        }
    }

    fn resolve_active_trial(&mut self, landed_x: f32, out_events: &mut Vec<Event>) {
        let Some(trial) = self.active_trial.take() else {
            debug!(landed_x, "landing reported without an active trial");
            return;
        };

        let outcome = resolve_landing(
            landed_x,
            self.config.field_width,
            trial.target_plant,
            trial.drop_count,
        );
        self.score = self.score.saturating_add(outcome.score_delta);
        out_events.push(Event::TrialLanded {
            target_plant: trial.target_plant,
            landed_x,
            outcome,
        });

        if outcome.correct {
            let plant = outcome.watered_plant;
            let hits = self
                .hits
                .grow(plant, trial.drop_count, self.config.hit_goal);
            out_events.push(Event::PlantGrew {
                plant,
                hits,
                stage: GrowthStage::for_hits(hits, self.config.hit_goal),
            });
        }

        let step = advance(self.difficulty, outcome.correct);
        self.difficulty = step.state;
        if let Some(message) = step.message {
            info!(level = %step.state.level(), %message, "difficulty changed");
        }
        out_events.push(Event::DifficultyAdvanced {
            state: step.state,
            message: step.message,
        });

        if self.hits.all_reached(self.config.hit_goal) {
            self.end_round(out_events);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartRound => {
            world.reset();
            info!(duration = ?world.config.duration, "round started");
            out_events.push(Event::RoundStarted {
                duration: world.config.duration,
            });
        }
        Command::Tick { dt } => {
            if world.phase != RoundPhase::Running {
                return;
            }

            world.remaining = world.remaining.saturating_sub(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                remaining: world.remaining,
            });

            if world.remaining.is_zero() {
                world.end_round(out_events);
            }
        }
        Command::SpawnTrial { trial } => {
            if let Some(reason) = world.spawn_rejection() {
                debug!(%reason, "trial spawn rejected");
                out_events.push(Event::TrialSpawnRejected { reason });
                return;
            }

            world.active_trial = Some(trial.clone());
            out_events.push(Event::TrialSpawned { trial });
        }
        Command::ResolveLanding { landed_x } => {
            if world.phase != RoundPhase::Running {
                return;
            }
            world.resolve_active_trial(landed_x, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{RoundConfig, RoundPhase, World};
    use voice_garden_core::{DifficultyState, PlantId, RoundSnapshot, RoundSummary, Trial};

    /// Round parameters the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &RoundConfig {
        &world.config
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(world: &World) -> RoundPhase {
        world.phase
    }

    /// Accumulated score of the current round.
    #[must_use]
    pub fn score(world: &World) -> i32 {
        world.score
    }

    /// Hits collected by the provided plant.
    #[must_use]
    pub fn hits(world: &World, plant: PlantId) -> u32 {
        world.hits.get(plant)
    }

    /// Time left on the countdown.
    #[must_use]
    pub fn remaining(world: &World) -> Duration {
        world.remaining
    }

    /// Current difficulty state.
    #[must_use]
    pub fn difficulty(world: &World) -> DifficultyState {
        world.difficulty
    }

    /// Trial whose cluster is currently falling, if any.
    #[must_use]
    pub fn active_trial(world: &World) -> Option<&Trial> {
        world.active_trial.as_ref()
    }

    /// Tally of the round so far.
    #[must_use]
    pub fn summary(world: &World) -> RoundSummary {
        world.summary()
    }

    /// Captures the view consumed by trial selection.
    #[must_use]
    pub fn round_snapshot(world: &World) -> RoundSnapshot {
        world.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_are_capped_at_the_goal() {
        let mut hits = PlantHits::default();
        assert_eq!(hits.grow(PlantId::Lupinus, 3, 10), 3);
        assert_eq!(hits.grow(PlantId::Lupinus, 3, 10), 6);
        assert_eq!(hits.grow(PlantId::Lupinus, 3, 10), 9);
        assert_eq!(hits.grow(PlantId::Lupinus, 3, 10), 10);
        assert_eq!(hits.get(PlantId::Mushroom), 0);
        assert!(!hits.all_reached(10));
    }

    #[test]
    fn zero_length_round_reports_full_progress() {
        let world = World::with_config(RoundConfig {
            duration: Duration::ZERO,
            ..RoundConfig::default()
        });
        assert_eq!(world.snapshot().progress, 1.0);
    }
}
