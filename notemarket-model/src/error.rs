use std::fmt::{self, Display};

/// Errors produced by model constructors and parsing routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidGrade(String),
    InvalidSortKey(String),
    InvalidSeason(String),
    InvalidSemester(String),
    InvalidId(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidGrade(raw) => {
                write!(f, "invalid grade '{raw}', expected A-F")
            }
            ModelError::InvalidSortKey(raw) => write!(
                f,
                "invalid sort key '{raw}', expected newest, oldest, price-low or price-high"
            ),
            ModelError::InvalidSeason(raw) => {
                write!(f, "invalid season '{raw}', expected Vår or Høst")
            }
            ModelError::InvalidSemester(raw) => {
                write!(f, "invalid semester '{raw}'")
            }
            ModelError::InvalidId(raw) => write!(f, "invalid id '{raw}'"),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
