#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Adaptive difficulty state machine driven by landing outcomes.
//!
//! Every `(level, outcome)` pair maps to exactly one [`Rule`] in
//! [`TRANSITION_TABLE`]. A rule names how the streak counters change and,
//! optionally, the threshold that moves the machine to another level. Moving
//! to another level always clears both counters and emits the rule's
//! announcement.
//!
//! Level three is a plateau: both of its rules hold the state unchanged.

use voice_garden_core::{DifficultyLevel, DifficultyState, TransitionMessage};

/// Result of a single landing as seen by the difficulty machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The cluster watered the target plant.
    Correct,
    /// The cluster watered the other plant.
    Incorrect,
}

impl From<bool> for Outcome {
    fn from(correct: bool) -> Self {
        if correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }
}

/// How a rule updates the streak counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CounterPolicy {
    /// Leave both counters untouched.
    Hold,
    /// Increment the correct streak, leave the wrong streak untouched.
    CountCorrect,
    /// Increment the correct streak and clear the wrong streak.
    CountCorrectClearWrong,
    /// Increment the wrong streak, leave the correct streak untouched.
    CountWrong,
}

impl CounterPolicy {
    fn apply(self, state: DifficultyState) -> DifficultyState {
        let correct = state.correct_streak();
        let wrong = state.wrong_streak();
        let (correct, wrong) = match self {
            Self::Hold => (correct, wrong),
            Self::CountCorrect => (correct.saturating_add(1), wrong),
            Self::CountCorrectClearWrong => (correct.saturating_add(1), 0),
            Self::CountWrong => (correct, wrong.saturating_add(1)),
        };
        DifficultyState::new(state.level(), correct, wrong)
    }
}

/// Streak counter watched by a level change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Streak {
    /// The correct-answer streak.
    Correct,
    /// The wrong-answer streak.
    Wrong,
}

impl Streak {
    const fn read(self, state: &DifficultyState) -> u32 {
        match self {
            Self::Correct => state.correct_streak(),
            Self::Wrong => state.wrong_streak(),
        }
    }
}

/// Level change triggered once a streak reaches its threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LevelChange {
    /// Counter compared against the threshold after the counter policy runs.
    pub streak: Streak,
    /// Minimum streak value that triggers the change.
    pub threshold: u32,
    /// Level entered when the change triggers.
    pub next_level: DifficultyLevel,
    /// Announcement emitted when the change triggers.
    pub message: TransitionMessage,
}

/// Entry of the transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rule {
    /// Level the rule applies to.
    pub level: DifficultyLevel,
    /// Outcome the rule applies to.
    pub outcome: Outcome,
    /// Counter update performed first.
    pub counters: CounterPolicy,
    /// Optional level change checked after the counter update.
    pub change: Option<LevelChange>,
}

/// Transition table ordered by level, then correct before incorrect.
pub static TRANSITION_TABLE: [Rule; 6] = [
    Rule {
        level: DifficultyLevel::One,
        outcome: Outcome::Correct,
        counters: CounterPolicy::CountCorrect,
        change: Some(LevelChange {
            streak: Streak::Correct,
            threshold: 3,
            next_level: DifficultyLevel::Two,
            message: TransitionMessage::LevelUpToTwo,
        }),
    },
    // Misses at level one keep the correct streak.
    Rule {
        level: DifficultyLevel::One,
        outcome: Outcome::Incorrect,
        counters: CounterPolicy::Hold,
        change: None,
    },
    Rule {
        level: DifficultyLevel::Two,
        outcome: Outcome::Correct,
        counters: CounterPolicy::CountCorrectClearWrong,
        change: Some(LevelChange {
            streak: Streak::Correct,
            threshold: 3,
            next_level: DifficultyLevel::Three,
            message: TransitionMessage::LevelUpToThree,
        }),
    },
    Rule {
        level: DifficultyLevel::Two,
        outcome: Outcome::Incorrect,
        counters: CounterPolicy::CountWrong,
        change: Some(LevelChange {
            streak: Streak::Wrong,
            threshold: 2,
            next_level: DifficultyLevel::One,
            message: TransitionMessage::LevelDownToOne,
        }),
    },
    Rule {
        level: DifficultyLevel::Three,
        outcome: Outcome::Correct,
        counters: CounterPolicy::Hold,
        change: None,
    },
    Rule {
        level: DifficultyLevel::Three,
        outcome: Outcome::Incorrect,
        counters: CounterPolicy::Hold,
        change: None,
    },
];

/// Looks up the rule for a `(level, outcome)` pair.
#[must_use]
pub fn rule_for(level: DifficultyLevel, outcome: Outcome) -> &'static Rule {
    let row = (level.get() as usize - 1) * 2;
    let column = match outcome {
        Outcome::Correct => 0,
        Outcome::Incorrect => 1,
    };
    &TRANSITION_TABLE[row + column]
}

/// State and announcement produced by a single transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Advance {
    /// State after the transition.
    pub state: DifficultyState,
    /// Announcement emitted by the transition, if the level changed.
    pub message: Option<TransitionMessage>,
}

/// Advances the difficulty state by one resolved trial.
#[must_use]
pub fn advance(state: DifficultyState, correct: bool) -> Advance {
    let rule = rule_for(state.level(), Outcome::from(correct));
    let counted = rule.counters.apply(state);

    match rule.change {
        Some(change) if change.streak.read(&counted) >= change.threshold => Advance {
            state: DifficultyState::at_level(change.next_level),
            message: Some(change.message),
        },
        _ => Advance {
            state: counted,
            message: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_match_their_lookup_keys() {
        for level in [
            DifficultyLevel::One,
            DifficultyLevel::Two,
            DifficultyLevel::Three,
        ] {
            for outcome in [Outcome::Correct, Outcome::Incorrect] {
                let rule = rule_for(level, outcome);
                assert_eq!(rule.level, level);
                assert_eq!(rule.outcome, outcome);
            }
        }
    }

    #[test]
    fn table_holds_exactly_three_announcements() {
        let messages: Vec<_> = TRANSITION_TABLE
            .iter()
            .filter_map(|rule| rule.change.map(|change| change.message))
            .collect();
        assert_eq!(
            messages,
            vec![
                TransitionMessage::LevelUpToTwo,
                TransitionMessage::LevelUpToThree,
                TransitionMessage::LevelDownToOne,
            ]
        );
    }
}
