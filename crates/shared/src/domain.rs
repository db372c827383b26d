use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(LogEntryId);

/// Closed classification of student conduct used for coaching, logging,
/// and simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorCategory {
    Defiance,
    Disengagement,
    Distraction,
    Frustration,
    Impulsivity,
}

impl BehaviorCategory {
    pub const ALL: [BehaviorCategory; 5] = [
        BehaviorCategory::Defiance,
        BehaviorCategory::Disengagement,
        BehaviorCategory::Distraction,
        BehaviorCategory::Frustration,
        BehaviorCategory::Impulsivity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BehaviorCategory::Defiance => "Defiance",
            BehaviorCategory::Disengagement => "Disengagement",
            BehaviorCategory::Distraction => "Distraction",
            BehaviorCategory::Frustration => "Frustration",
            BehaviorCategory::Impulsivity => "Impulsivity",
        }
    }
}

impl std::fmt::Display for BehaviorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentLevel {
    Primary,
    Middle,
    High,
}

impl StudentLevel {
    pub const ALL: [StudentLevel; 3] = [
        StudentLevel::Primary,
        StudentLevel::Middle,
        StudentLevel::High,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StudentLevel::Primary => "Primary School",
            StudentLevel::Middle => "Middle School",
            StudentLevel::High => "High School",
        }
    }
}

impl std::fmt::Display for StudentLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single recorded behavior incident. Immutable once logged; there is no
/// update or delete operation anywhere in the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentLogEntry {
    pub id: LogEntryId,
    pub logged_at: DateTime<Utc>,
    pub student_name: String,
    pub category: BehaviorCategory,
    pub description: String,
    pub intensity: u8,
}

/// A short reusable tutoring technique produced by the structured generation
/// call. The category is a free-form string as returned by the model; the
/// provider schema only constrains it to be a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub title: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    Tutor,
    Student,
}

/// One utterance in a simulation transcript. Transcripts are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    pub fn tutor(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Tutor,
            text: text.into(),
        }
    }

    pub fn student(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Student,
            text: text.into(),
        }
    }
}
