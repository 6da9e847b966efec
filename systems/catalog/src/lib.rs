#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Voice catalog that turns asset identifiers into structured clip descriptors.
//!
//! Asset identifiers follow the schema
//! `<speakerId>_D<1|2|3>_<F|M>_<modifiers>.<ext>`. The catalog is validated
//! as a whole: a single malformed identifier rejects the entire input, so a
//! partially built catalog is never observable. The built-in catalog is parsed
//! at most once per process and shared read-only afterwards.

use std::{fmt, sync::OnceLock};

use thiserror::Error;
use tracing::debug;
use voice_garden_core::{DifficultyClass, VoiceClip, VoiceGender};

/// Prefix prepended to a clip id to form its audio playback key.
pub const PLAYBACK_KEY_PREFIX: &str = "voice:";

/// Asset identifiers of every voice recording shipped with the game.
pub const BUILTIN_ASSET_FILES: [&str; 12] = [
    "S01_D1_F_PP+100p_VTL-20p.opus",
    "S01_D1_M_PP-100p_VTL+20p.opus",
    "S02_D2_F_PP+100p_VTL-10p.opus",
    "S02_D2_F_PP+33p_VTL-20p.opus",
    "S02_D2_M_PP-100p_VTL+10p.opus",
    "S02_D2_M_PP-33p_VTL+20p.opus",
    "S03_D3_F_PP+33p_VTL-10p.opus",
    "S03_D3_M_PP-33p_VTL+10p.opus",
    "S04_D3_F_PP+100p_VTL0.opus",
    "S04_D3_M_PP-100p_VTL0.opus",
    "S05_D3_F_PP0_VTL-20p.opus",
    "S05_D3_M_PP0_VTL+20p.opus",
];

const FIELD_DELIMITER: char = '_';
const EXTENSION_DELIMITER: char = '.';

/// Errors raised while building a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// An asset identifier does not follow the required schema.
    #[error("malformed catalog entry `{file}`: {defect}")]
    MalformedCatalogEntry {
        /// Offending asset identifier.
        file: String,
        /// Part of the schema the identifier violated.
        defect: EntryDefect,
    },
    /// No asset identifiers were supplied.
    #[error("voice catalog requires at least one clip")]
    EmptyCatalog,
}

/// Schema violation detected in an asset identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryDefect {
    /// The identifier has no `.<ext>` suffix.
    MissingExtension,
    /// The speaker segment is empty.
    MissingSpeaker,
    /// The second segment is absent or not `D1`, `D2` or `D3`.
    InvalidDifficulty,
    /// The third segment is absent or not `F` or `M`.
    InvalidGender,
    /// No modifier segment follows the gender token, or one is empty.
    MissingModifiers,
}

impl fmt::Display for EntryDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::MissingExtension => "missing file extension",
            Self::MissingSpeaker => "missing speaker id",
            Self::InvalidDifficulty => "expected difficulty token D1, D2 or D3 after the speaker id",
            Self::InvalidGender => "expected gender token F or M after the difficulty token",
            Self::MissingModifiers => "missing voice modifier tokens",
        };
        f.write_str(message)
    }
}

/// Ordered, non-empty, immutable collection of voice clips.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    clips: Vec<VoiceClip>,
}

impl Catalog {
    /// Parses every asset identifier, rejecting the whole input on the first defect.
    pub fn parse<I, S>(files: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let clips = files
            .into_iter()
            .map(|file| parse_clip(file.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if clips.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        debug!(clips = clips.len(), "voice catalog parsed");
        Ok(Self { clips })
    }

    /// Returns the process-wide catalog built from [`BUILTIN_ASSET_FILES`].
    ///
    /// Parsing happens on the first call only; later calls observe the same
    /// result.
    pub fn builtin() -> Result<&'static Catalog, CatalogError> {
        static BUILTIN: OnceLock<Result<Catalog, CatalogError>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| Catalog::parse(BUILTIN_ASSET_FILES))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Clips in source order.
    #[must_use]
    pub fn clips(&self) -> &[VoiceClip] {
        &self.clips
    }

    /// Iterates the clips in source order.
    pub fn iter(&self) -> impl Iterator<Item = &VoiceClip> {
        self.clips.iter()
    }

    /// First clip in source order.
    #[must_use]
    pub fn first(&self) -> &VoiceClip {
        &self.clips[0]
    }

    /// Number of clips in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Always `false`; construction rejects empty input.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Looks up a clip by its playback key.
    #[must_use]
    pub fn by_playback_key(&self, key: &str) -> Option<&VoiceClip> {
        self.clips.iter().find(|clip| clip.playback_key() == key)
    }
}

fn parse_clip(file: &str) -> Result<VoiceClip, CatalogError> {
    let malformed = |defect| CatalogError::MalformedCatalogEntry {
        file: file.to_owned(),
        defect,
    };

    let (id, extension) = file
        .rsplit_once(EXTENSION_DELIMITER)
        .filter(|(id, extension)| !id.is_empty() && !extension.is_empty())
        .ok_or_else(|| malformed(EntryDefect::MissingExtension))?;

    let mut segments = id.split(FIELD_DELIMITER);
    let speaker_id = segments
        .next()
        .filter(|speaker| !speaker.is_empty())
        .ok_or_else(|| malformed(EntryDefect::MissingSpeaker))?;
    let difficulty_class = segments
        .next()
        .and_then(DifficultyClass::from_token)
        .ok_or_else(|| malformed(EntryDefect::InvalidDifficulty))?;
    let gender = segments
        .next()
        .and_then(VoiceGender::from_token)
        .ok_or_else(|| malformed(EntryDefect::InvalidGender))?;

    let modifiers: Vec<String> = segments.map(str::to_owned).collect();
    if modifiers.is_empty() || modifiers.iter().any(String::is_empty) {
        return Err(malformed(EntryDefect::MissingModifiers));
    }

    Ok(VoiceClip::new(
        file.to_owned(),
        id.to_owned(),
        format!("{PLAYBACK_KEY_PREFIX}{id}"),
        speaker_id.to_owned(),
        difficulty_class,
        gender,
        modifiers,
    ))
}
