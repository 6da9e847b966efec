use voice_garden_core::{DifficultyLevel, DifficultyState, TransitionMessage};
use voice_garden_system_difficulty::{advance, Advance};

fn run(mut state: DifficultyState, outcomes: &[bool]) -> (DifficultyState, Vec<Option<TransitionMessage>>) {
    let mut messages = Vec::with_capacity(outcomes.len());
    for &correct in outcomes {
        let Advance { state: next, message } = advance(state, correct);
        state = next;
        messages.push(message);
    }
    (state, messages)
}

#[test]
fn three_correct_answers_escalate_to_level_two() {
    let (state, messages) = run(DifficultyState::INITIAL, &[true, true, true]);

    assert_eq!(state, DifficultyState::at_level(DifficultyLevel::Two));
    assert_eq!(
        messages,
        vec![None, None, Some(TransitionMessage::LevelUpToTwo)],
        "only the third advance announces the level change",
    );
}

#[test]
fn misses_at_level_one_keep_the_correct_streak() {
    let start = DifficultyState::new(DifficultyLevel::One, 2, 0);
    let missed = advance(start, false);

    assert_eq!(missed.state, start);
    assert_eq!(missed.message, None);

    let escalated = advance(missed.state, true);
    assert_eq!(escalated.state, DifficultyState::at_level(DifficultyLevel::Two));
    assert_eq!(escalated.message, Some(TransitionMessage::LevelUpToTwo));
}

#[test]
fn correct_answer_at_level_two_clears_wrong_streak() {
    let result = advance(DifficultyState::new(DifficultyLevel::Two, 0, 1), true);

    assert_eq!(result.state, DifficultyState::new(DifficultyLevel::Two, 1, 0));
    assert_eq!(result.message, None);
}

#[test]
fn two_misses_at_level_two_fall_back_regardless_of_correct_streak() {
    for correct_streak in [0, 1, 2] {
        let start = DifficultyState::new(DifficultyLevel::Two, correct_streak, 0);
        let (state, messages) = run(start, &[false, false]);

        assert_eq!(state, DifficultyState::INITIAL);
        assert_eq!(
            messages,
            vec![None, Some(TransitionMessage::LevelDownToOne)]
        );
    }
}

#[test]
fn interleaved_hit_resets_the_wrong_streak() {
    let start = DifficultyState::at_level(DifficultyLevel::Two);
    let (state, messages) = run(start, &[false, true, false]);

    assert_eq!(state, DifficultyState::new(DifficultyLevel::Two, 1, 1));
    assert!(messages.iter().all(Option::is_none));
}

#[test]
fn three_correct_answers_at_level_two_reach_the_ceiling() {
    let start = DifficultyState::at_level(DifficultyLevel::Two);
    let (state, messages) = run(start, &[true, true, true]);

    assert_eq!(state, DifficultyState::at_level(DifficultyLevel::Three));
    assert_eq!(messages[2], Some(TransitionMessage::LevelUpToThree));
}

#[test]
fn level_three_is_a_plateau() {
    let start = DifficultyState::at_level(DifficultyLevel::Three);
    let script = [true, false, false, true, true, true, false, false, false, true];
    let (state, messages) = run(start, &script);

    assert_eq!(state, start);
    assert!(messages.iter().all(Option::is_none));
}

#[test]
fn announcement_texts_are_fixed() {
    assert_eq!(
        TransitionMessage::LevelUpToTwo.to_string(),
        "Difficulty up: Level 2 (D3 only)"
    );
    assert_eq!(
        TransitionMessage::LevelUpToThree.to_string(),
        "Difficulty up: Level 3 (D1/D2/D3 mixed)"
    );
    assert_eq!(
        TransitionMessage::LevelDownToOne.to_string(),
        "Difficulty down: Back to Level 1 (D1/D2)"
    );
}

#[test]
fn advance_is_pure() {
    let state = DifficultyState::new(DifficultyLevel::Two, 2, 1);
    assert_eq!(advance(state, true), advance(state, true));
    assert_eq!(advance(state, false), advance(state, false));
}
