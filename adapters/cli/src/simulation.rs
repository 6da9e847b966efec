use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};
use voice_garden_audio::{start_cluster_voice, stop_cluster_voice, VoiceHandle, VoicePlayback};
use voice_garden_core::{Command, DifficultyLevel, Event, PlantId, RoundSummary, Trial};
use voice_garden_system_catalog::Catalog;
use voice_garden_system_trial_selection::TrialSelection;
use voice_garden_world::{self as world, query, World};

use crate::{config::Settings, report::landing_feedback};

/// Outcome of one simulated round.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct RoundReport {
    pub(crate) summary: RoundSummary,
    pub(crate) hit_goal: u32,
    pub(crate) trials: u32,
    pub(crate) correct: u32,
    pub(crate) incorrect: u32,
    pub(crate) final_level: DifficultyLevel,
    pub(crate) announcements: Vec<String>,
    pub(crate) voices_started: u32,
    pub(crate) voices_missing: u32,
}

#[derive(Debug, Default)]
struct Tally {
    trials: u32,
    correct: u32,
    incorrect: u32,
    announcements: Vec<String>,
    voices_started: u32,
    voices_missing: u32,
}

impl Tally {
    fn finish(self, summary: RoundSummary, hit_goal: u32, final_level: DifficultyLevel) -> RoundReport {
        RoundReport {
            summary,
            hit_goal,
            trials: self.trials,
            correct: self.correct,
            incorrect: self.incorrect,
            final_level,
            announcements: self.announcements,
            voices_started: self.voices_started,
            voices_missing: self.voices_missing,
        }
    }
}

#[derive(Debug)]
struct FallingCluster {
    target: PlantId,
    airborne: Duration,
    land_after: Duration,
    voice: Option<VoiceHandle>,
}

impl FallingCluster {
    fn new(trial: &Trial, fall_distance: f32, voice: Option<VoiceHandle>) -> Self {
        let land_after =
            Duration::try_from_secs_f32(fall_distance / trial.fall_speed).unwrap_or(Duration::ZERO);
        Self {
            target: trial.target_plant,
            airborne: Duration::ZERO,
            land_after,
            voice,
        }
    }

    /// Advances the fall by one frame and reports whether the cluster landed.
    fn fall(&mut self, frame: Duration) -> bool {
        self.airborne = self.airborne.saturating_add(frame);
        self.airborne >= self.land_after
    }
}

/// Plays a full round with a simulated player who steers each cluster to the
/// target plant with probability `settings.accuracy`.
pub(crate) fn run_round<R, P>(
    settings: &Settings,
    catalog: &Catalog,
    voices: &mut P,
    rng: &mut R,
) -> RoundReport
where
    R: Rng + ?Sized,
    P: VoicePlayback + ?Sized,
{
    let mut world = World::with_config(settings.round);
    let mut selection = TrialSelection::new(settings.trials);
    let mut tally = Tally::default();
    let mut falling: Option<FallingCluster> = None;
    let mut events = Vec::new();
    let mut commands = Vec::new();

    world::apply(&mut world, Command::StartRound, &mut events);

    loop {
        for event in &events {
            match event {
                Event::TrialSpawned { trial } => {
                    tally.trials += 1;
                    let voice = start_cluster_voice(voices, &trial.clip);
                    if voice.is_some() {
                        tally.voices_started += 1;
                    } else {
                        tally.voices_missing += 1;
                    }
                    debug!(
                        level = %query::difficulty(&world).level(),
                        class = %trial.clip.difficulty_class(),
                        gender = %trial.clip.gender().token(),
                        target = %trial.target_plant,
                        fall_speed = trial.fall_speed,
                        "cluster falling"
                    );
                    falling = Some(FallingCluster::new(trial, settings.fall_distance, voice));
                }
                Event::TrialLanded { outcome, .. } => {
                    if outcome.correct {
                        tally.correct += 1;
                    } else {
                        tally.incorrect += 1;
                    }
                    debug!(feedback = %landing_feedback(outcome), "cluster landed");
                    if let Some(cluster) = falling.take() {
                        stop_cluster_voice(voices, cluster.voice);
                    }
                }
                Event::DifficultyAdvanced {
                    message: Some(message),
                    ..
                } => tally.announcements.push(message.to_string()),
                Event::RoundEnded { summary } => {
                    if let Some(cluster) = falling.take() {
                        stop_cluster_voice(voices, cluster.voice);
                    }
                    let report = tally.finish(
                        *summary,
                        settings.round.hit_goal,
                        query::difficulty(&world).level(),
                    );
                    info!(
                        trials = report.trials,
                        correct = report.correct,
                        score = report.summary.score,
                        "simulated round finished"
                    );
                    return report;
                }
                _ => {}
            }
        }

        selection.handle(
            &events,
            query::round_snapshot(&world),
            catalog,
            rng,
            &mut commands,
        );
        events.clear();

        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        if !events.is_empty() {
            continue;
        }

        if let Some(cluster) = falling.as_mut() {
            if cluster.fall(settings.frame) {
                let landed_x = landing_x(
                    cluster.target,
                    settings.round.field_width,
                    settings.accuracy,
                    rng,
                );
                world::apply(&mut world, Command::ResolveLanding { landed_x }, &mut events);
            }
        }

        world::apply(&mut world, Command::Tick { dt: settings.frame }, &mut events);
    }
}

/// Horizontal landing position chosen by the simulated player.
///
/// The position stays clear of the field edges and of the midpoint so it
/// always falls inside the half the player aimed for.
fn landing_x<R>(target: PlantId, field_width: f32, accuracy: f64, rng: &mut R) -> f32
where
    R: Rng + ?Sized,
{
    let aim = if rng.gen_bool(accuracy) {
        target
    } else {
        target.other()
    };
    let half = field_width / 2.0;
    let offset = half * (0.05 + 0.9 * rng.gen::<f32>());
    match aim {
        PlantId::Lupinus => offset,
        PlantId::Mushroom => half + offset,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use voice_garden_audio::PreloadedVoices;
    use voice_garden_core::TransitionMessage;
    use voice_garden_system_landing::watered_plant;

    use super::*;

    fn simulate(accuracy: f64, voices: &mut PreloadedVoices, seed: u64) -> RoundReport {
        let catalog = Catalog::builtin().expect("builtin catalog parses");
        let settings = Settings::default().with_accuracy(Some(accuracy));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        run_round(&settings, catalog, voices, &mut rng)
    }

    #[test]
    fn perfect_player_wins_in_eight_trials() {
        let catalog = Catalog::builtin().expect("builtin catalog parses");
        let mut voices = PreloadedVoices::from_catalog(catalog);
        let report = simulate(1.0, &mut voices, 7);

        assert!(report.summary.win);
        assert_eq!(report.trials, 8);
        assert_eq!(report.correct, 8);
        assert_eq!(report.summary.score, 240);
        assert_eq!(report.summary.lupinus_hits, 10);
        assert_eq!(report.summary.mushroom_hits, 10);
        assert_eq!(report.final_level, DifficultyLevel::Three);
        assert_eq!(
            report.announcements,
            vec![
                TransitionMessage::LevelUpToTwo.to_string(),
                TransitionMessage::LevelUpToThree.to_string(),
            ]
        );
        assert_eq!(report.voices_started, 8);
        assert_eq!(report.voices_missing, 0);
        assert_eq!(voices.playing_count(), 0, "every voice is stopped");
    }

    #[test]
    fn hopeless_player_runs_out_the_clock() {
        let catalog = Catalog::builtin().expect("builtin catalog parses");
        let mut voices = PreloadedVoices::from_catalog(catalog);
        let report = simulate(0.0, &mut voices, 11);

        assert!(!report.summary.win);
        assert!(report.trials > 0);
        assert_eq!(report.correct, 0);
        assert_eq!(report.incorrect, report.trials);
        assert_eq!(report.summary.score, -15 * report.trials as i32);
        assert!(report.announcements.is_empty());
        assert_eq!(report.final_level, DifficultyLevel::One);
        assert_eq!(voices.playing_count(), 0);
    }

    #[test]
    fn missing_voices_do_not_stall_the_round() {
        let mut voices = PreloadedVoices::new();
        let report = simulate(1.0, &mut voices, 3);

        assert!(report.summary.win);
        assert_eq!(report.voices_started, 0);
        assert_eq!(report.voices_missing, report.trials);
    }

    #[test]
    fn seeded_rounds_are_reproducible() {
        let catalog = Catalog::builtin().expect("builtin catalog parses");
        let first = simulate(0.6, &mut PreloadedVoices::from_catalog(catalog), 42);
        let second = simulate(0.6, &mut PreloadedVoices::from_catalog(catalog), 42);
        assert_eq!(first, second);
    }

    #[test]
    fn landing_positions_stay_in_the_aimed_half() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for target in PlantId::ALL {
            for _ in 0..200 {
                let hit = landing_x(target, 1024.0, 1.0, &mut rng);
                assert_eq!(watered_plant(hit, 1024.0), target);

                let miss = landing_x(target, 1024.0, 0.0, &mut rng);
                assert_eq!(watered_plant(miss, 1024.0), target.other());
            }
        }
    }

    #[test]
    fn clusters_land_after_the_fall_time() {
        let catalog = Catalog::builtin().expect("builtin catalog parses");
        let trial = Trial {
            target_plant: PlantId::Mushroom,
            clip: catalog.first().clone(),
            drop_count: 3,
            fall_speed: 200.0,
        };
        let mut cluster = FallingCluster::new(&trial, 400.0, None);

        let frame = Duration::from_millis(500);
        assert!(!cluster.fall(frame));
        assert!(!cluster.fall(frame));
        assert!(!cluster.fall(frame));
        assert!(cluster.fall(frame));
    }
}
