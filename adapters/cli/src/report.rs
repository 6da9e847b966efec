use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use voice_garden_core::{GrowthStage, LandingOutcome, PlantId};

use crate::simulation::RoundReport;

/// Output formats supported for round reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human readable summary lines.
    Text,
    /// Pretty printed JSON document.
    Json,
}

#[derive(Serialize)]
struct RunReport<'a> {
    seed: u64,
    rounds: &'a [RoundReport],
}

/// Short feedback line shown when a cluster lands.
pub(crate) fn landing_feedback(outcome: &LandingOutcome) -> String {
    if outcome.correct {
        format!("Correct +{}", outcome.score_delta)
    } else {
        format!("Wrong {}", outcome.score_delta)
    }
}

/// Renders the reports of a run in the requested format.
pub(crate) fn render(seed: u64, rounds: &[RoundReport], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(seed, rounds)),
        OutputFormat::Json => serde_json::to_string_pretty(&RunReport { seed, rounds })
            .context("failed to serialise round reports"),
    }
}

fn render_text(seed: u64, rounds: &[RoundReport]) -> String {
    let mut text = format!("seed {seed:#x}\n");
    for (index, round) in rounds.iter().enumerate() {
        let verdict = if round.summary.win {
            "You Win!"
        } else {
            "Time's Up!"
        };
        let _ = writeln!(text, "round {}: {verdict}", index + 1);
        let _ = writeln!(text, "  score: {}", round.summary.score);
        for plant in PlantId::ALL {
            let hits = match plant {
                PlantId::Lupinus => round.summary.lupinus_hits,
                PlantId::Mushroom => round.summary.mushroom_hits,
            };
            let _ = writeln!(
                text,
                "  {plant}: {hits}/{} ({})",
                round.hit_goal,
                GrowthStage::for_hits(hits, round.hit_goal)
            );
        }
        let _ = writeln!(
            text,
            "  trials: {} ({} correct, {} wrong)",
            round.trials, round.correct, round.incorrect
        );
        let _ = writeln!(text, "  final difficulty: Level {}", round.final_level);
        for announcement in &round.announcements {
            let _ = writeln!(text, "  {announcement}");
        }
        if round.voices_missing > 0 {
            let _ = writeln!(text, "  voices missing: {}", round.voices_missing);
        }
    }
    text.trim_end().to_owned()
}
