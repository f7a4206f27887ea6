use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Lifecycle status of a student record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Registered,
    Deleted,
}

impl StudentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StudentStatus::Registered => "Registered",
            StudentStatus::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A student on the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub class_id: String,
    pub class_name: String,
    pub parent_name: String,
    pub parent_phone: String,
    pub status: StudentStatus,
    pub registration_date: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Reference to the encoding produced by the recognizer
    pub face_encoding: Option<String>,
    pub avatar_url: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Timestamp used for list ordering; records without dates sort as the epoch
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.updated_at
            .or(self.registration_date)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn is_registered(&self) -> bool {
        self.status == StudentStatus::Registered
    }

    /// Soft delete. Deleted records never return to `Registered`.
    pub fn mark_deleted(&mut self, at: DateTime<Utc>) {
        if self.status == StudentStatus::Deleted {
            return;
        }
        self.status = StudentStatus::Deleted;
        self.updated_at = Some(at);
    }

    /// Uppercase initials for avatar placeholders
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .next()
            .into_iter()
            .chain(self.last_name.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Reference data for a class group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub id: String,
    pub name: String,
}

impl ClassInfo {
    pub fn new<S: Into<String>>(id: S, name: S) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Payload for creating a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDraft {
    pub first_name: String,
    pub last_name: String,
    pub class_id: String,
    pub parent_name: String,
    pub parent_phone: String,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub class_id: Option<String>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub face_encoding: Option<String>,
}

/// An encoded still frame taken during a capture session
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    /// Zero-based position in the capture sequence
    pub position: usize,
    /// JPEG bytes
    pub data: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Utc>,
    pub watermark: String,
    /// Token issued by the recognizer once the capture was accepted
    pub encoding: Option<String>,
}

impl CapturedImage {
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// A face image already stored for a student
#[derive(Debug, Clone, PartialEq)]
pub struct FaceSample {
    pub id: String,
    pub student_id: String,
    pub image: Arc<Vec<u8>>,
    pub captured_at: DateTime<Utc>,
}
