use super::state::{FormMode, Screen, ViewState};
use crate::form::FormField;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;

/// Text rendition of the active screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedScreen {
    pub title: String,
    pub lines: Vec<String>,
}

impl fmt::Display for RenderedScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Resolve configured timezone, falling back to UTC on parse errors
pub fn resolve_timezone(tz_name: &str) -> Tz {
    match tz_name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            tracing::warn!("Invalid timezone '{}', falling back to UTC", tz_name);
            chrono_tz::UTC
        }
    }
}

pub fn render(state: &ViewState, max_captures: usize, tz: Tz) -> RenderedScreen {
    let mut screen = match state.screen {
        Screen::List => render_list(state, tz),
        Screen::Detail => render_detail(state, tz),
        Screen::Form(mode) => render_form(state, mode, max_captures),
    };

    if state.loading {
        screen.lines.insert(0, "Loading...".to_string());
    }
    screen
}

fn format_date(date: Option<DateTime<Utc>>, tz: Tz) -> String {
    match date {
        Some(date) => date.with_timezone(&tz).format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}

fn render_list(state: &ViewState, tz: Tz) -> RenderedScreen {
    let mut lines = Vec::new();

    if !state.search_term.trim().is_empty() {
        lines.push(format!("Search: \"{}\"", state.search_term.trim()));
    }

    if state.filtered_students.is_empty() {
        lines.push("No students found".to_string());
    }

    for student in &state.filtered_students {
        lines.push(format!(
            "[{}] {} | {} | registered {}",
            student.initials(),
            student.full_name(),
            student.class_name,
            format_date(student.registration_date, tz)
        ));
    }

    RenderedScreen {
        title: format!(
            "Students: {} ({})",
            state.status_filter,
            state.filtered_students.len()
        ),
        lines,
    }
}

fn render_detail(state: &ViewState, tz: Tz) -> RenderedScreen {
    let student = match &state.selected_student {
        Some(student) => student,
        None => {
            return RenderedScreen {
                title: "Student".to_string(),
                lines: vec!["No student selected".to_string()],
            }
        }
    };

    let mut lines = vec![
        format!("Class: {}", student.class_name),
        format!("Parent: {}", student.parent_name),
        format!("Phone: {}", student.parent_phone),
        format!("Status: {}", student.status),
        format!("Registered: {}", format_date(student.registration_date, tz)),
        format!("Updated: {}", format_date(student.updated_at, tz)),
        format!("Face photos: {}", state.saved_images.len()),
    ];

    if state.pending_delete.as_deref() == Some(student.id.as_str()) {
        lines.push(format!(
            "Delete {}? This cannot be undone. [confirm/cancel]",
            student.full_name()
        ));
    }

    RenderedScreen {
        title: student.full_name(),
        lines,
    }
}

fn render_form(state: &ViewState, mode: FormMode, max_captures: usize) -> RenderedScreen {
    let mut lines = Vec::new();

    if let Some(error) = &state.form_error {
        lines.push(format!("! {}", error));
    }

    for field in [
        FormField::FirstName,
        FormField::LastName,
        FormField::ClassId,
        FormField::ParentName,
        FormField::ParentPhone,
    ] {
        let value = match field {
            FormField::ClassId => state
                .class_name(&state.form.class_id)
                .unwrap_or(state.form.value(field))
                .to_string(),
            _ => state.form.value(field).to_string(),
        };
        lines.push(format!("{}: {}", field.label(), value));
        if let Some(error) = state.form_errors.get(field) {
            lines.push(format!("  ! {}", error));
        }
    }

    lines.push(format!(
        "Camera: {}",
        if state.camera_active { "on" } else { "off" }
    ));
    lines.push(format!(
        "Photos: {}/{}",
        state.capture_count(),
        max_captures
    ));

    let saved = state.visible_saved_images().len();
    if saved > 0 {
        lines.push(format!("Saved photos: {}", saved));
    }

    if let Some(error) = state.form_errors.get(FormField::Images) {
        lines.push(format!("  ! {}", error));
    }

    if state.submitting {
        lines.push("Saving...".to_string());
    }

    RenderedScreen {
        title: match mode {
            FormMode::Add => "New registration".to_string(),
            FormMode::Edit => "Edit student".to_string(),
        },
        lines,
    }
}
