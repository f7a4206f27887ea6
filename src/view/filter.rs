use crate::model::{Student, StudentStatus};
use std::cmp::Reverse;

/// Students with `status`, whose full name contains `search` (case
/// insensitive, ignored when blank), newest effective timestamp first.
pub fn filter_students(students: &[Student], status: StudentStatus, search: &str) -> Vec<Student> {
    let needle = search.trim().to_lowercase();

    let mut matches: Vec<Student> = students
        .iter()
        .filter(|s| s.status == status)
        .filter(|s| needle.is_empty() || s.full_name().to_lowercase().contains(&needle))
        .cloned()
        .collect();

    // Stable sort keeps backend order for equal timestamps
    matches.sort_by_key(|s| Reverse(s.effective_timestamp()));
    matches
}
