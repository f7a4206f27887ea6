use crate::model::{ClassInfo, Student, StudentStatus};
use chrono::{DateTime, TimeZone, Utc};

/// Demo class list
pub fn demo_classes() -> Vec<ClassInfo> {
    vec![
        ClassInfo::new("class-1a", "Kindergarten 1/A"),
        ClassInfo::new("class-1b", "Kindergarten 1/B"),
        ClassInfo::new("class-2a", "Kindergarten 2/A"),
        ClassInfo::new("class-3a", "Kindergarten 3/A"),
    ]
}

/// Demo roster: four registered students and one soft-deleted record
pub fn demo_students() -> Vec<Student> {
    vec![
        demo_student(
            "stu-001",
            ("Napat", "Wongsa"),
            ("class-1a", "Kindergarten 1/A"),
            ("Somsak Wongsa", "0812345601"),
            StudentStatus::Registered,
            date(2024, 5, 16),
        ),
        demo_student(
            "stu-002",
            ("Pimchanok", "Suksai"),
            ("class-1b", "Kindergarten 1/B"),
            ("Rattana Suksai", "0812345602"),
            StudentStatus::Registered,
            date(2024, 5, 20),
        ),
        demo_student(
            "stu-003",
            ("Thanawat", "Chaiyo"),
            ("class-2a", "Kindergarten 2/A"),
            ("Wichai Chaiyo", "0812345603"),
            StudentStatus::Registered,
            date(2024, 6, 2),
        ),
        demo_student(
            "stu-004",
            ("Kanokwan", "Meesuk"),
            ("class-3a", "Kindergarten 3/A"),
            ("Anong Meesuk", "0812345604"),
            StudentStatus::Registered,
            date(2024, 6, 11),
        ),
        demo_student(
            "stu-005",
            ("Krit", "Boonmee"),
            ("class-2a", "Kindergarten 2/A"),
            ("Preecha Boonmee", "0812345605"),
            StudentStatus::Deleted,
            date(2024, 4, 30),
        ),
    ]
}

fn demo_student(
    id: &str,
    name: (&str, &str),
    class: (&str, &str),
    parent: (&str, &str),
    status: StudentStatus,
    registered: DateTime<Utc>,
) -> Student {
    Student {
        id: id.to_string(),
        first_name: name.0.to_string(),
        last_name: name.1.to_string(),
        class_id: class.0.to_string(),
        class_name: class.1.to_string(),
        parent_name: parent.0.to_string(),
        parent_phone: parent.1.to_string(),
        status,
        registration_date: Some(registered),
        updated_at: None,
        face_encoding: Some(format!("face_{}", id)),
        avatar_url: None,
    }
}

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 8, 0, 0)
        .single()
        .unwrap_or_default()
}
