#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure landing resolution that scores where a cluster touched down.

use voice_garden_core::{LandingOutcome, PlantId};

/// Points awarded per drop when the target plant is watered.
pub const POINTS_PER_CORRECT_DROP: i32 = 10;
/// Points deducted per drop when the other plant is watered.
pub const PENALTY_PER_WRONG_DROP: i32 = 5;

/// Plant whose half of the field contains `landed_x`.
///
/// The midpoint belongs to the right half.
#[must_use]
pub fn watered_plant(landed_x: f32, field_width: f32) -> PlantId {
    if landed_x < field_width / 2.0 {
        PlantId::Lupinus
    } else {
        PlantId::Mushroom
    }
}

/// Resolves a landing into the watered plant, correctness, and score delta.
#[must_use]
pub fn resolve_landing(
    landed_x: f32,
    field_width: f32,
    target: PlantId,
    drop_count: u32,
) -> LandingOutcome {
    let watered_plant = watered_plant(landed_x, field_width);
    let correct = watered_plant == target;
    let drops = i32::try_from(drop_count).unwrap_or(i32::MAX);
    let score_delta = if correct {
        drops.saturating_mul(POINTS_PER_CORRECT_DROP)
    } else {
        drops.saturating_mul(-PENALTY_PER_WRONG_DROP)
    };

    LandingOutcome {
        watered_plant,
        correct,
        score_delta,
    }
}
