use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Local input validation failures. These are handled by refusing the action
/// at the call site and are never shown to the user as error prose.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("student name must not be empty")]
    EmptyStudentName,
    #[error("intensity {value} is outside the allowed range 1-5")]
    IntensityOutOfRange { value: u8 },
}
