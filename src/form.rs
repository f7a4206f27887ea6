use crate::config::RegistrationConfig;
use crate::model::{Student, StudentDraft, StudentPatch};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Editable fields of the registration form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormField {
    FirstName,
    LastName,
    ClassId,
    ParentName,
    ParentPhone,
    /// Not a text input; carries the face capture requirement
    Images,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::FirstName => "First name",
            FormField::LastName => "Last name",
            FormField::ClassId => "Class",
            FormField::ParentName => "Parent name",
            FormField::ParentPhone => "Parent phone",
            FormField::Images => "Face photos",
        }
    }
}

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, field: FormField, message: S) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: FormField) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FormField, &String)> {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field.label(), message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Values currently typed into the registration form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub class_id: String,
    pub parent_name: String,
    pub parent_phone: String,
}

impl RegistrationForm {
    /// Prefill from an existing record for editing
    pub fn from_student(student: &Student) -> Self {
        Self {
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            class_id: student.class_id.clone(),
            parent_name: student.parent_name.clone(),
            parent_phone: student.parent_phone.clone(),
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::FirstName => self.first_name = value,
            FormField::LastName => self.last_name = value,
            FormField::ClassId => self.class_id = value,
            FormField::ParentName => self.parent_name = value,
            FormField::ParentPhone => self.parent_phone = value,
            FormField::Images => {}
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::ClassId => &self.class_id,
            FormField::ParentName => &self.parent_name,
            FormField::ParentPhone => &self.parent_phone,
            FormField::Images => "",
        }
    }

    /// Check the text fields. Student and parent names need at least
    /// `min_name_length` characters, a class must be selected and the phone
    /// needs `min_phone_length` characters. Image requirements depend on the
    /// form mode and are checked by `validate_images`.
    pub fn validate(&self, rules: &RegistrationConfig) -> FieldErrors {
        let mut errors = FieldErrors::new();

        check_min_length(
            &mut errors,
            FormField::FirstName,
            &self.first_name,
            rules.min_name_length,
        );
        check_min_length(
            &mut errors,
            FormField::LastName,
            &self.last_name,
            rules.min_name_length,
        );

        check_min_length(
            &mut errors,
            FormField::ParentName,
            &self.parent_name,
            rules.min_name_length,
        );

        if self.class_id.trim().is_empty() {
            errors.insert(FormField::ClassId, "Please select a class");
        }

        check_min_length(
            &mut errors,
            FormField::ParentPhone,
            &self.parent_phone,
            rules.min_phone_length,
        );

        errors
    }

    pub fn to_draft(&self) -> StudentDraft {
        StudentDraft {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            class_id: self.class_id.trim().to_string(),
            parent_name: self.parent_name.trim().to_string(),
            parent_phone: self.parent_phone.trim().to_string(),
        }
    }

    pub fn to_patch(&self) -> StudentPatch {
        let draft = self.to_draft();
        StudentPatch {
            first_name: Some(draft.first_name),
            last_name: Some(draft.last_name),
            class_id: Some(draft.class_id),
            parent_name: Some(draft.parent_name),
            parent_phone: Some(draft.parent_phone),
            face_encoding: None,
        }
    }
}

/// Image count rule: a new face set needs at least `min_captures` images.
/// `required` is false when editing without new captures.
pub fn validate_images(
    errors: &mut FieldErrors,
    captured: usize,
    required: bool,
    rules: &RegistrationConfig,
) {
    if required && captured < rules.min_captures {
        errors.insert(
            FormField::Images,
            format!(
                "At least {} face photos are required ({} captured)",
                rules.min_captures, captured
            ),
        );
    }
}

fn check_min_length(errors: &mut FieldErrors, field: FormField, value: &str, min: usize) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.insert(field, format!("{} is required", field.label()));
    } else if len < min {
        errors.insert(
            field,
            format!("{} must be at least {} characters", field.label(), min),
        );
    }
}
