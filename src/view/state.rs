use crate::form::{FieldErrors, RegistrationForm};
use crate::model::{CapturedImage, ClassInfo, FaceSample, Student, StudentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit,
}

/// Active screen of the roster app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Form(FormMode),
    Detail,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::List => "list",
            Screen::Form(_) => "form",
            Screen::Detail => "detail",
        }
    }
}

/// Everything the roster screens render from
#[derive(Debug, Clone)]
pub struct ViewState {
    pub screen: Screen,
    pub edit_mode: bool,
    pub selected_student: Option<Student>,
    pub students: Vec<Student>,
    pub filtered_students: Vec<Student>,
    pub classes: Vec<ClassInfo>,
    pub search_term: String,
    pub status_filter: StudentStatus,
    pub loading: bool,
    pub submitting: bool,
    pub camera_active: bool,
    /// In-progress captures, most recent last
    pub captured_images: Vec<CapturedImage>,
    /// Face set already stored for the selected student
    pub saved_images: Vec<FaceSample>,
    /// Set by the first new capture while editing; the saved set is hidden
    /// and will be replaced on submit
    pub replace_saved_images: bool,
    pub form: RegistrationForm,
    pub form_errors: FieldErrors,
    /// Top-level error shown above the form
    pub form_error: Option<String>,
    /// Student awaiting delete confirmation
    pub pending_delete: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            screen: Screen::List,
            edit_mode: false,
            selected_student: None,
            students: Vec::new(),
            filtered_students: Vec::new(),
            classes: Vec::new(),
            search_term: String::new(),
            status_filter: StudentStatus::Registered,
            loading: false,
            submitting: false,
            camera_active: false,
            captured_images: Vec::new(),
            saved_images: Vec::new(),
            replace_saved_images: false,
            form: RegistrationForm::default(),
            form_errors: FieldErrors::new(),
            form_error: None,
            pending_delete: None,
        }
    }
}

impl ViewState {
    /// Saved images still shown in the form gallery
    pub fn visible_saved_images(&self) -> &[FaceSample] {
        if self.replace_saved_images {
            &[]
        } else {
            &self.saved_images
        }
    }

    pub fn capture_count(&self) -> usize {
        self.captured_images.len()
    }

    /// Reset everything the form screen owns
    pub fn clear_form(&mut self) {
        self.form = RegistrationForm::default();
        self.form_errors = FieldErrors::new();
        self.form_error = None;
        self.captured_images.clear();
        self.replace_saved_images = false;
    }

    pub fn class_name(&self, class_id: &str) -> Option<&str> {
        self.classes
            .iter()
            .find(|c| c.id == class_id)
            .map(|c| c.name.as_str())
    }
}
