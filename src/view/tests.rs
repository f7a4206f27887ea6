use super::*;
use crate::form::FormField;
use crate::model::{FaceSample, Student, StudentStatus};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

fn at(day: u32) -> Option<DateTime<Utc>> {
    Some(Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).unwrap())
}

fn student(
    id: &str,
    first: &str,
    last: &str,
    status: StudentStatus,
    registered: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
) -> Student {
    Student {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        class_id: "class-1a".to_string(),
        class_name: "Kindergarten 1/A".to_string(),
        parent_name: "Parent".to_string(),
        parent_phone: "0812345678".to_string(),
        status,
        registration_date: registered,
        updated_at: updated,
        face_encoding: None,
        avatar_url: None,
    }
}

fn three_students() -> Vec<Student> {
    vec![
        student("a", "Anan", "Dee", StudentStatus::Registered, at(1), None),
        student("b", "Boon", "Mee", StudentStatus::Registered, at(9), None),
        student("c", "Chai", "Yo", StudentStatus::Deleted, at(20), None),
    ]
}

#[test]
fn test_default_filter_shows_registered_newest_first() {
    let result = filter_students(&three_students(), StudentStatus::Registered, "");

    let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[test]
fn test_deleted_filter_only_returns_deleted() {
    let result = filter_students(&three_students(), StudentStatus::Deleted, "");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, "c");
}

#[test]
fn test_search_is_case_insensitive_substring_of_full_name() {
    let students = three_students();

    let result = filter_students(&students, StudentStatus::Registered, "oN M");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, "b");

    // Matches across the name boundary only through the full name
    let result = filter_students(&students, StudentStatus::Registered, "an d");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, "a");

    // Deleted students never match under the registered filter
    assert!(filter_students(&students, StudentStatus::Registered, "chai").is_empty());
}

#[test]
fn test_updated_at_takes_precedence_and_undated_sort_last() {
    let students = vec![
        student("old", "Old", "Record", StudentStatus::Registered, at(1), at(25)),
        student("new", "New", "Record", StudentStatus::Registered, at(15), None),
        student("none", "No", "Dates", StudentStatus::Registered, None, None),
    ];

    let result = filter_students(&students, StudentStatus::Registered, "");
    let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["old", "new", "none"]);
}

#[test]
fn test_render_list() {
    let mut state = ViewState::default();
    state.students = three_students();
    state.filtered_students = filter_students(&state.students, StudentStatus::Registered, "");

    let screen = render(&state, 5, chrono_tz::UTC);

    assert_eq!(screen.title, "Students: Registered (2)");
    assert_eq!(
        screen.lines[0],
        "[BM] Boon Mee | Kindergarten 1/A | registered 2024-05-09"
    );
}

#[test]
fn test_rendered_screen_serializes_to_json() {
    let screen = RenderedScreen {
        title: "Students: Registered (0)".to_string(),
        lines: vec!["No students found".to_string()],
    };

    let value = serde_json::to_value(&screen).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "title": "Students: Registered (0)",
            "lines": ["No students found"],
        })
    );
}

#[test]
fn test_render_empty_list_and_loading() {
    let mut state = ViewState::default();
    state.loading = true;
    state.search_term = "zz".to_string();

    let screen = render(&state, 5, chrono_tz::UTC);
    assert_eq!(
        screen.lines,
        vec![
            "Loading...".to_string(),
            "Search: \"zz\"".to_string(),
            "No students found".to_string()
        ]
    );
}

#[test]
fn test_render_form_shows_errors_and_counter() {
    let mut state = ViewState::default();
    state.screen = Screen::Form(FormMode::Edit);
    state.form.first_name = "M".to_string();
    state
        .form_errors
        .insert(FormField::FirstName, "First name must be at least 2 characters");
    state.saved_images = vec![FaceSample {
        id: "f1".to_string(),
        student_id: "a".to_string(),
        image: Arc::new(Vec::new()),
        captured_at: Utc::now(),
    }];

    let screen = render(&state, 5, chrono_tz::UTC);

    assert_eq!(screen.title, "Edit student");
    assert!(screen
        .lines
        .contains(&"  ! First name must be at least 2 characters".to_string()));
    assert!(screen.lines.contains(&"Photos: 0/5".to_string()));
    assert!(screen.lines.contains(&"Saved photos: 1".to_string()));

    state.replace_saved_images = true;
    let screen = render(&state, 5, chrono_tz::UTC);
    assert!(!screen.lines.iter().any(|l| l.starts_with("Saved photos")));
}

#[test]
fn test_render_detail_with_delete_prompt() {
    let mut state = ViewState::default();
    state.screen = Screen::Detail;
    state.selected_student = Some(three_students().remove(0));
    state.pending_delete = Some("a".to_string());

    let screen = render(&state, 5, resolve_timezone("Asia/Bangkok"));

    assert_eq!(screen.title, "Anan Dee");
    assert!(screen.lines.contains(&"Registered: 2024-05-01".to_string()));
    assert!(screen
        .lines
        .last()
        .unwrap()
        .starts_with("Delete Anan Dee?"));
}

#[test]
fn test_invalid_timezone_falls_back_to_utc() {
    assert_eq!(resolve_timezone("Mars/Olympus"), chrono_tz::UTC);
}
