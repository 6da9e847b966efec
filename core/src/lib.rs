#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Voice Garden engine.
//!
//! This crate defines the vocabulary that connects adapters, the authoritative
//! round world, and pure systems. Adapters and systems submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values that adapters
//! and systems react to. Every value type here is plain data: systems compute
//! new values from old ones and never hold references across calls.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Number of drops carried by every raindrop cluster.
pub const DEFAULT_DROP_COUNT: u32 = 3;

/// Hits required for a plant to reach its adult stage.
pub const DEFAULT_HIT_GOAL: u32 = 10;

/// One of the two plants the player waters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantId {
    /// The lupinus planted on the left half of the field.
    Lupinus,
    /// The mushroom planted on the right half of the field.
    Mushroom,
}

impl PlantId {
    /// Every plant in field order, left to right.
    pub const ALL: [PlantId; 2] = [PlantId::Lupinus, PlantId::Mushroom];

    /// Voice gender that identifies this plant as a trial target.
    ///
    /// The mapping is fixed; difficulty never overrides it.
    #[must_use]
    pub const fn required_gender(self) -> VoiceGender {
        match self {
            Self::Lupinus => VoiceGender::Male,
            Self::Mushroom => VoiceGender::Female,
        }
    }

    /// The plant growing on the opposite half of the field.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Lupinus => Self::Mushroom,
            Self::Mushroom => Self::Lupinus,
        }
    }

    /// Human-readable plant name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lupinus => "Lupinus",
            Self::Mushroom => "Mushroom",
        }
    }
}

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Speaker gender encoded in a voice clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceGender {
    /// Female voice, token `F`.
    #[serde(rename = "F")]
    Female,
    /// Male voice, token `M`.
    #[serde(rename = "M")]
    Male,
}

impl VoiceGender {
    /// Single-letter token used in asset identifiers.
    #[must_use]
    pub const fn token(self) -> char {
        match self {
            Self::Female => 'F',
            Self::Male => 'M',
        }
    }

    /// Parses the single-letter token used in asset identifiers.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "F" => Some(Self::Female),
            "M" => Some(Self::Male),
            _ => None,
        }
    }
}

impl fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Intrinsic difficulty tag attached to a voice clip, ordered from easiest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DifficultyClass {
    /// Easiest clips.
    D1,
    /// Intermediate clips.
    D2,
    /// Hardest clips.
    D3,
}

impl DifficultyClass {
    /// Parses a `D1`..`D3` token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "D1" => Some(Self::D1),
            "D2" => Some(Self::D2),
            "D3" => Some(Self::D3),
            _ => None,
        }
    }
}

impl fmt::Display for DifficultyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::D1 => "D1",
            Self::D2 => "D2",
            Self::D3 => "D3",
        };
        f.write_str(token)
    }
}

/// Adaptive difficulty level of a round. Level three is the ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DifficultyLevel {
    /// Entry level offering the easier clip classes.
    One,
    /// Intermediate level restricted to the hardest clips.
    Two,
    /// Ceiling level mixing every clip class.
    Three,
}

impl DifficultyLevel {
    /// Numeric representation of the level.
    #[must_use]
    pub const fn get(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Difficulty level plus the streak counters that drive its transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DifficultyState {
    level: DifficultyLevel,
    correct_streak: u32,
    wrong_streak: u32,
}

impl DifficultyState {
    /// State every round starts from: level one with both counters cleared.
    pub const INITIAL: Self = Self::at_level(DifficultyLevel::One);

    /// Creates a state with explicit counters.
    #[must_use]
    pub const fn new(level: DifficultyLevel, correct_streak: u32, wrong_streak: u32) -> Self {
        Self {
            level,
            correct_streak,
            wrong_streak,
        }
    }

    /// Creates a state at the provided level with both counters cleared.
    #[must_use]
    pub const fn at_level(level: DifficultyLevel) -> Self {
        Self::new(level, 0, 0)
    }

    /// Current difficulty level.
    #[must_use]
    pub const fn level(&self) -> DifficultyLevel {
        self.level
    }

    /// Correct answers accumulated towards the next escalation.
    #[must_use]
    pub const fn correct_streak(&self) -> u32 {
        self.correct_streak
    }

    /// Consecutive incorrect answers accumulated towards a de-escalation.
    #[must_use]
    pub const fn wrong_streak(&self) -> u32 {
        self.wrong_streak
    }
}

impl Default for DifficultyState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Announcement emitted when the difficulty level changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionMessage {
    /// Escalation from level one to level two.
    LevelUpToTwo,
    /// Escalation from level two to level three.
    LevelUpToThree,
    /// De-escalation from level two back to level one.
    LevelDownToOne,
}

impl TransitionMessage {
    /// Fixed announcement text shown to the player.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LevelUpToTwo => "Difficulty up: Level 2 (D3 only)",
            Self::LevelUpToThree => "Difficulty up: Level 3 (D1/D2/D3 mixed)",
            Self::LevelDownToOne => "Difficulty down: Back to Level 1 (D1/D2)",
        }
    }
}

impl fmt::Display for TransitionMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured descriptor of a single voice recording.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceClip {
    source_file: String,
    id: String,
    playback_key: String,
    speaker_id: String,
    difficulty_class: DifficultyClass,
    gender: VoiceGender,
    modifiers: Vec<String>,
}

impl VoiceClip {
    /// Assembles a clip descriptor from already validated parts.
    #[must_use]
    pub fn new(
        source_file: String,
        id: String,
        playback_key: String,
        speaker_id: String,
        difficulty_class: DifficultyClass,
        gender: VoiceGender,
        modifiers: Vec<String>,
    ) -> Self {
        Self {
            source_file,
            id,
            playback_key,
            speaker_id,
            difficulty_class,
            gender,
            modifiers,
        }
    }

    /// Asset filename the clip was parsed from.
    #[must_use]
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Filename without its extension.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Key the audio subsystem uses to look up the preloaded sound.
    #[must_use]
    pub fn playback_key(&self) -> &str {
        &self.playback_key
    }

    /// Identifier of the recorded speaker.
    #[must_use]
    pub fn speaker_id(&self) -> &str {
        &self.speaker_id
    }

    /// Intrinsic difficulty of the clip.
    #[must_use]
    pub const fn difficulty_class(&self) -> DifficultyClass {
        self.difficulty_class
    }

    /// Gender of the voice heard in the clip.
    #[must_use]
    pub const fn gender(&self) -> VoiceGender {
        self.gender
    }

    /// Voice modification tokens in filename order.
    #[must_use]
    pub fn modifiers(&self) -> &[String] {
        &self.modifiers
    }
}

/// One spawn-to-landing cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Plant the cluster must be steered to.
    pub target_plant: PlantId,
    /// Voice clip announcing the target.
    pub clip: VoiceClip,
    /// Scoring weight applied to the landing outcome.
    pub drop_count: u32,
    /// Falling speed of the cluster in field units per second.
    pub fall_speed: f32,
}

/// Scored result of a single landing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LandingOutcome {
    /// Plant whose half of the field received the water.
    pub watered_plant: PlantId,
    /// Whether the watered plant was the trial target.
    pub correct: bool,
    /// Change applied to the round score.
    pub score_delta: i32,
}

/// Visual growth stage derived from a plant's hit count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthStage {
    /// Less than forty percent of the goal.
    Seedling,
    /// At least forty percent of the goal.
    Growing,
    /// Goal reached.
    Adult,
}

impl GrowthStage {
    /// Derives the stage reached by a plant with `hits` out of `goal`.
    #[must_use]
    pub fn for_hits(hits: u32, goal: u32) -> Self {
        if goal == 0 || hits >= goal {
            return Self::Adult;
        }

        // hits * 5 >= goal * 2 is hits / goal >= 0.4 without rounding.
        if u64::from(hits) * 5 >= u64::from(goal) * 2 {
            Self::Growing
        } else {
            Self::Seedling
        }
    }
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Seedling => "Seedling",
            Self::Growing => "Growing",
            Self::Adult => "Adult",
        };
        f.write_str(label)
    }
}

/// Final tally of a finished round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundSummary {
    /// Accumulated score.
    pub score: i32,
    /// Whether both plants reached the hit goal.
    pub win: bool,
    /// Hits collected by the lupinus.
    pub lupinus_hits: u32,
    /// Hits collected by the mushroom.
    pub mushroom_hits: u32,
}

/// Read-only view of the round consumed by trial selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundSnapshot {
    /// Whether a round is running.
    pub in_progress: bool,
    /// Whether a cluster is currently falling.
    pub trial_active: bool,
    /// Hits collected by the lupinus.
    pub lupinus_hits: u32,
    /// Hits collected by the mushroom.
    pub mushroom_hits: u32,
    /// Current difficulty state.
    pub difficulty: DifficultyState,
    /// Elapsed fraction of the round countdown in `0.0..=1.0`.
    pub progress: f32,
}

/// Reasons a trial spawn request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnRejection {
    /// No round has been started yet.
    RoundNotStarted,
    /// The round already ended.
    RoundOver,
    /// Another cluster is still falling.
    TrialActive,
}

impl fmt::Display for SpawnRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::RoundNotStarted => "no round in progress",
            Self::RoundOver => "round already ended",
            Self::TrialActive => "a cluster is still falling",
        };
        f.write_str(reason)
    }
}

/// Commands that express all permissible round mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets the round: score, hits, countdown, and difficulty state.
    StartRound,
    /// Advances the round countdown by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the provided trial becomes the falling cluster.
    SpawnTrial {
        /// Trial chosen by the trial selection system.
        trial: Trial,
    },
    /// Reports that the active cluster crossed the landing line.
    ResolveLanding {
        /// Horizontal field coordinate at which the cluster landed.
        landed_x: f32,
    },
}

/// Events broadcast by the round world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a fresh round began.
    RoundStarted {
        /// Length of the round countdown.
        duration: Duration,
    },
    /// Indicates that the round countdown advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Time left on the countdown after the tick.
        remaining: Duration,
    },
    /// Confirms that a trial became the falling cluster.
    TrialSpawned {
        /// Trial that is now active.
        trial: Trial,
    },
    /// Reports that a spawn request was rejected.
    TrialSpawnRejected {
        /// Specific reason the spawn failed.
        reason: SpawnRejection,
    },
    /// Confirms that the active cluster landed and was scored.
    TrialLanded {
        /// Plant the trial targeted.
        target_plant: PlantId,
        /// Horizontal coordinate of the landing.
        landed_x: f32,
        /// Scored outcome of the landing.
        outcome: LandingOutcome,
    },
    /// Confirms that a plant received hits from a correct landing.
    PlantGrew {
        /// Plant that grew.
        plant: PlantId,
        /// Hits after growth, capped at the goal.
        hits: u32,
        /// Growth stage after growth.
        stage: GrowthStage,
    },
    /// Reports the difficulty state produced by a landing.
    DifficultyAdvanced {
        /// Difficulty state after the transition.
        state: DifficultyState,
        /// Announcement emitted by the transition, if any.
        message: Option<TransitionMessage>,
    },
    /// Announces the end of the round.
    RoundEnded {
        /// Final tally of the round.
        summary: RoundSummary,
    },
}
