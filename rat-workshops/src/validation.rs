//! Add-session form rules.

use crate::model::NewSession;
use regex::Regex;
use snafu::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static SEQUENCE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));
static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\d][A-Za-z\d .,'&_/:+#@-]*$").expect("valid regex"));
static SPEAKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z ]*(,\s*[A-Za-z][A-Za-z ]*)*$").expect("valid regex"));
static DURATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid regex"));

const SEQUENCE_ID_MESSAGE: &str = "Sequence ID must be a positive integer";
const NAME_MESSAGE: &str = "Name of the session has characters that are not allowed - Must begin with alphanumeric, and can have alphanumeric, spaces, and these characters only - .,'&_/:+#@-";
const DURATION_MESSAGE: &str = "Only number with optional decimal part allowed";

pub const ABSTRACT_MIN_CHARS: usize = 20;
pub const ABSTRACT_MAX_CHARS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    SequenceId,
    Name,
    Speaker,
    Duration,
    Level,
    Abstract,
}

impl Field {
    /// Form order.
    pub const ALL: [Field; 6] = [
        Field::SequenceId,
        Field::Name,
        Field::Speaker,
        Field::Duration,
        Field::Level,
        Field::Abstract,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::SequenceId => "Sequence ID",
            Field::Name => "Name",
            Field::Speaker => "Speaker",
            Field::Duration => "Duration",
            Field::Level => "Level",
            Field::Abstract => "Abstract",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::SequenceId => "The Sequence ID of the session (eg. 1, 2, 3...)",
            Field::Name => "Name of the session, Eg. Programming 101 - Introduction to programming",
            Field::Speaker => "Name of the speaker(s). Eg. John Doe, Jane Doe",
            Field::Duration => "The duration of the session in hours (eg. 2.5)",
            Field::Level => "-- Select the level --",
            Field::Abstract => "What the session covers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Basic,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Basic, Level::Intermediate, Level::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Basic => "Basic",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }

    /// Minimum session length in hours.
    pub fn min_duration(&self) -> f64 {
        match self {
            Level::Basic => 1.0,
            Level::Intermediate => 2.0,
            Level::Advanced => 3.0,
        }
    }

    fn insufficient_duration_message(&self) -> &'static str {
        match self {
            Level::Basic => "Basic level should have minimum 1 hour duration",
            Level::Intermediate => "Intermediate level should have minimum 2 hours duration",
            Level::Advanced => "Advanced level should have minimum 3 hours duration",
        }
    }

    /// Next level in selection order, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            Level::Basic => Level::Intermediate,
            Level::Intermediate => Level::Advanced,
            Level::Advanced => Level::Basic,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Level::Basic => Level::Advanced,
            Level::Intermediate => Level::Basic,
            Level::Advanced => Level::Intermediate,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or(ValidationError::Required)
    }
}

#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum ValidationError {
    #[snafu(display("This field is required"))]
    Required,

    #[snafu(display("{message}"))]
    Pattern { message: &'static str },

    #[snafu(display("Minimum {min} characters needed"))]
    TooShort { min: usize },

    #[snafu(display("Maximum {max} characters allowed"))]
    TooLong { max: usize },

    #[snafu(display("{}", level.insufficient_duration_message()))]
    InsufficientDuration { level: Level, min_hours: f64 },
}

/// Per-field errors; empty means the form may be submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<Field, ValidationError>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.0.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, field: Field, err: ValidationError) {
        self.0.insert(field, err);
    }

    fn check(&mut self, field: Field, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            self.insert(field, err);
        }
    }
}

/// Raw text of the add-session form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionForm {
    pub sequence_id: String,
    pub name: String,
    pub speaker: String,
    pub duration: String,
    pub level: Option<Level>,
    pub summary: String,
}

impl SessionForm {
    pub fn value(&self, field: Field) -> String {
        match field {
            Field::SequenceId => self.sequence_id.clone(),
            Field::Name => self.name.clone(),
            Field::Speaker => self.speaker.clone(),
            Field::Duration => self.duration.clone(),
            Field::Level => self.level.map(|l| l.to_string()).unwrap_or_default(),
            Field::Abstract => self.summary.clone(),
        }
    }

    /// Text field for `field`. `Level` is a selection and has none.
    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::SequenceId => Some(&mut self.sequence_id),
            Field::Name => Some(&mut self.name),
            Field::Speaker => Some(&mut self.speaker),
            Field::Duration => Some(&mut self.duration),
            Field::Level => None,
            Field::Abstract => Some(&mut self.summary),
        }
    }

    pub fn validate_field(&self, field: Field) -> Result<(), ValidationError> {
        match field {
            Field::SequenceId => self.sequence_id().map(|_| ()),
            Field::Name => matches_pattern(&self.name, &NAME, NAME_MESSAGE),
            Field::Speaker => matches_pattern(&self.speaker, &SPEAKER, "Comma-separated name(s) of speaker(s)"),
            Field::Duration => self.duration().map(|_| ()),
            Field::Level => self.validate_level(),
            Field::Abstract => {
                let chars = self.summary.chars().count();
                ensure!(!self.summary.trim().is_empty(), RequiredSnafu);
                ensure!(chars >= ABSTRACT_MIN_CHARS, TooShortSnafu { min: ABSTRACT_MIN_CHARS });
                ensure!(chars <= ABSTRACT_MAX_CHARS, TooLongSnafu { max: ABSTRACT_MAX_CHARS });
                Ok(())
            }
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        for field in Field::ALL {
            errors.check(field, self.validate_field(field));
        }
        errors
    }

    /// Validate and build the request body for `workshop_id`.
    pub fn to_new_session(&self, workshop_id: u64) -> Result<NewSession, FieldErrors> {
        let errors = self.validate();
        let (Some(level), Ok(sequence_id), Ok(duration)) = (self.level, self.sequence_id(), self.duration())
        else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NewSession {
            workshop_id,
            sequence_id,
            name: self.name.clone(),
            speaker: self.speaker.clone(),
            level: level.to_string(),
            duration,
            summary: self.summary.clone(),
            upvote_count: 0,
        })
    }

    /// Digits only, and small enough to send.
    fn sequence_id(&self) -> Result<u64, ValidationError> {
        matches_pattern(&self.sequence_id, &SEQUENCE_ID, SEQUENCE_ID_MESSAGE)?;
        self.sequence_id.parse().ok().context(PatternSnafu {
            message: SEQUENCE_ID_MESSAGE,
        })
    }

    fn duration(&self) -> Result<f64, ValidationError> {
        matches_pattern(&self.duration, &DURATION, DURATION_MESSAGE)?;
        self.duration
            .parse::<f64>()
            .ok()
            .filter(|hours| hours.is_finite())
            .context(PatternSnafu {
                message: DURATION_MESSAGE,
            })
    }

    /// The level/duration rule only applies once the duration is a number.
    fn validate_level(&self) -> Result<(), ValidationError> {
        let level = self.level.context(RequiredSnafu)?;
        match self.duration() {
            Ok(duration) if duration < level.min_duration() => InsufficientDurationSnafu {
                level,
                min_hours: level.min_duration(),
            }
            .fail(),
            _ => Ok(()),
        }
    }
}

fn matches_pattern(value: &str, pattern: &Regex, message: &'static str) -> Result<(), ValidationError> {
    ensure!(!value.trim().is_empty(), RequiredSnafu);
    ensure!(pattern.is_match(value), PatternSnafu { message });
    Ok(())
}
