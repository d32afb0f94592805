use serde::Serialize;
use std::fmt::Display;

/// A hall that cannot take part in placement. The run continues without it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConfigurationError {
    #[serde(rename_all = "camelCase")]
    InvalidDimensions { hall_id: String, rows: i32, cols: i32 },
    #[serde(rename_all = "camelCase")]
    DuplicateHall { hall_id: String },
}

impl ConfigurationError {
    pub fn hall_id(&self) -> &str {
        match self {
            ConfigurationError::InvalidDimensions { hall_id, .. }
            | ConfigurationError::DuplicateHall { hall_id } => hall_id,
        }
    }
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::InvalidDimensions {
                hall_id,
                rows,
                cols,
            } => write!(
                f,
                "Hall {} has invalid dimensions {}x{}; rows and cols must be positive",
                hall_id, rows, cols
            ),
            ConfigurationError::DuplicateHall { hall_id } => {
                write!(f, "Hall {} is declared more than once", hall_id)
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// The roster repeats one or more roll codes; allocation refuses to run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataIntegrityError {
    duplicate_rolls: Vec<String>,
}

impl DataIntegrityError {
    #[inline]
    pub fn new(duplicate_rolls: Vec<String>) -> Self {
        Self { duplicate_rolls }
    }

    #[inline]
    pub fn duplicate_rolls(&self) -> &[String] {
        &self.duplicate_rolls
    }
}

impl Display for DataIntegrityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Roster contains duplicate roll codes: {}",
            self.duplicate_rolls.join(", ")
        )
    }
}

impl std::error::Error for DataIntegrityError {}

/// Rejected roster mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RosterError {
    EmptyRoll,
    EmptyHallId,
    DuplicateRoll(String),
    DuplicateHall(String),
    UnknownRoll(String),
    UnknownHall(String),
}

impl Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::EmptyRoll => write!(f, "Roll code is required"),
            RosterError::EmptyHallId => write!(f, "Hall ID is required"),
            RosterError::DuplicateRoll(roll) => write!(f, "Student {} already exists", roll),
            RosterError::DuplicateHall(id) => write!(f, "Hall {} already exists", id),
            RosterError::UnknownRoll(roll) => write!(f, "No student with roll {}", roll),
            RosterError::UnknownHall(id) => write!(f, "No hall with ID {}", id),
        }
    }
}

impl std::error::Error for RosterError {}

/// A line of records text that was skipped during import.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordParseError {
    line: usize,
    reason: String,
}

impl RecordParseError {
    #[inline]
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }

    /// 1-based line number.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for RecordParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

impl std::error::Error for RecordParseError {}

/// A record field that cannot be written as records text unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordWriteError {
    key: String,
    field: &'static str,
    value: String,
}

impl RecordWriteError {
    #[inline]
    pub fn new(key: impl Into<String>, field: &'static str, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field,
            value: value.into(),
        }
    }

    /// Roll or hall code of the offending record.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn field(&self) -> &'static str {
        self.field
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Display for RecordWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Record {} has {} {:?} containing a separator, line break or edge whitespace",
            self.key, self.field, self.value
        )
    }
}

impl std::error::Error for RecordWriteError {}
