use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use voice_garden_core::{Command, Event, PlantId};
use voice_garden_system_catalog::Catalog;
use voice_garden_system_trial_selection::{Config, TrialSelection};
use voice_garden_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(250);
const FALL_TIME: Duration = Duration::from_secs(4);

#[test]
fn seeded_rounds_replay_identically() {
    let first = replay(0x4d59_5df4_d0f3_3173);
    let second = replay(0x4d59_5df4_d0f3_3173);

    assert_eq!(first, second, "replay diverged between runs");
    assert!(
        matches!(first.last(), Some(Event::RoundEnded { .. })),
        "replay should run until the round ends"
    );

    let landings = first
        .iter()
        .filter(|event| matches!(event, Event::TrialLanded { .. }))
        .count();
    let spawns = first
        .iter()
        .filter(|event| matches!(event, Event::TrialSpawned { .. }))
        .count();
    assert!(landings > 0, "expected at least one landing");
    assert!(spawns >= landings);
}

#[test]
fn spawned_clips_always_match_the_target_gender() {
    let log = replay(0x1234_5678);
    for event in &log {
        if let Event::TrialSpawned { trial } = event {
            assert_eq!(trial.clip.gender(), trial.target_plant.required_gender());
        }
    }
}

fn replay(seed: u64) -> Vec<Event> {
    let catalog = Catalog::builtin().expect("builtin catalog parses");
    let mut world = World::new();
    let mut selection = TrialSelection::new(Config::default());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut log = Vec::new();
    let mut events = Vec::new();
    let mut falling = Duration::ZERO;

    world::apply(&mut world, Command::StartRound, &mut events);

    loop {
        log.extend(events.iter().cloned());
        if events
            .iter()
            .any(|event| matches!(event, Event::RoundEnded { .. }))
        {
            return log;
        }

        let mut commands = Vec::new();
        selection.handle(
            &events,
            query::round_snapshot(&world),
            catalog,
            &mut rng,
            &mut commands,
        );
        events.clear();

        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        if !events.is_empty() {
            continue;
        }

        if let Some(target) = query::active_trial(&world).map(|trial| trial.target_plant) {
            falling += FRAME;
            if falling >= FALL_TIME {
                falling = Duration::ZERO;
                let width = query::config(&world).field_width;
                let aim = if rng.gen_bool(0.7) {
                    target
                } else {
                    target.other()
                };
                let landed_x = match aim {
                    PlantId::Lupinus => width * 0.25,
                    PlantId::Mushroom => width * 0.75,
                };
                world::apply(&mut world, Command::ResolveLanding { landed_x }, &mut events);
            }
        }

        world::apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
    }
}
