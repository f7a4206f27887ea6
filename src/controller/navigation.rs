use super::screen::ScreenController;
use crate::error::{RosterError, Result};
use crate::form::{FormField, RegistrationForm};
use crate::model::StudentStatus;
use crate::view::{filter_students, FormMode, Screen, ViewState};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

impl ScreenController {
    /// Switch screens. Leaving the form always stops the camera, and the
    /// previous screen's token is cancelled so late results are dropped.
    pub(super) async fn navigate<F>(&self, target: Screen, apply: F) -> Result<CancellationToken>
    where
        F: FnOnce(&mut ViewState),
    {
        let current = self.store.read(|s| s.screen);
        if matches!(current, Screen::Form(_)) && !matches!(target, Screen::Form(_)) {
            self.stop_camera().await?;
        }

        let token = self.renew_token();
        self.store.update(|s| {
            s.screen = target;
            s.edit_mode = target == Screen::Form(FormMode::Edit);
            s.pending_delete = None;
            apply(s);
        })?;

        debug!("Screen {} -> {}", current.name(), target.name());
        Ok(token)
    }

    pub fn screen(&self) -> Screen {
        self.store.read(|s| s.screen)
    }

    /// Go to the roster list
    pub async fn show_list(&self) -> Result<()> {
        self.navigate(Screen::List, |s| {
            s.selected_student = None;
            s.saved_images.clear();
            s.clear_form();
        })
        .await?;
        Ok(())
    }

    /// Open an empty registration form
    pub async fn open_new_registration(&self) -> Result<()> {
        self.navigate(Screen::Form(FormMode::Add), |s| {
            s.selected_student = None;
            s.saved_images.clear();
            s.clear_form();
        })
        .await?;
        info!("Opened new registration");
        Ok(())
    }

    /// Load a student with its saved face samples and show the detail screen
    pub async fn open_student(&self, student_id: &str) -> Result<()> {
        let token = self.current_token();
        self.store.update(|s| s.loading = true)?;

        let org_id = self.org_id();
        let loaded = match self.backend.load_student(org_id, student_id).await {
            Ok(student) => self
                .backend
                .load_face_samples(org_id, student_id)
                .await
                .map(|samples| (student, samples)),
            Err(e) => Err(e),
        };

        self.store.update(|s| s.loading = false)?;

        let (student, samples) = match loaded {
            Ok(data) => data,
            Err(e) => return Err(self.report(e.into(), "Failed to load student")),
        };

        if token.is_cancelled() {
            debug!("Discarding student {} loaded after navigation", student_id);
            return Err(RosterError::cancelled("open_student"));
        }

        info!(
            "Opened student {} with {} face samples",
            student.full_name(),
            samples.len()
        );
        self.navigate(Screen::Detail, move |s| {
            s.selected_student = Some(student);
            s.saved_images = samples;
            s.clear_form();
        })
        .await?;
        Ok(())
    }

    /// Edit the student shown on the detail screen
    pub async fn edit_selected(&self) -> Result<()> {
        let (screen, selected) = self
            .store
            .read(|s| (s.screen, s.selected_student.clone()));

        let student = match (screen, selected) {
            (Screen::Detail, Some(student)) => student,
            _ => {
                warn!("Edit requested without a student on the detail screen");
                return Ok(());
            }
        };

        self.navigate(Screen::Form(FormMode::Edit), move |s| {
            s.clear_form();
            s.form = RegistrationForm::from_student(&student);
        })
        .await?;
        Ok(())
    }

    /// Back navigation: edit returns to detail, everything else to the list
    pub async fn go_back(&self) -> Result<()> {
        match self.screen() {
            Screen::Form(FormMode::Edit) => {
                self.navigate(Screen::Detail, |s| s.clear_form()).await?;
                Ok(())
            }
            Screen::Form(FormMode::Add) | Screen::Detail => self.show_list().await,
            Screen::List => Ok(()),
        }
    }

    /// Update the search box; the list is refiltered on every keystroke
    pub fn set_search<S: Into<String>>(&self, term: S) -> Result<()> {
        let term = term.into();
        self.store.update(|s| {
            s.filtered_students = filter_students(&s.students, s.status_filter, &term);
            s.search_term = term;
        })?;
        Ok(())
    }

    pub fn set_status_filter(&self, status: StudentStatus) -> Result<()> {
        self.store.update(|s| {
            s.status_filter = status;
            s.filtered_students = filter_students(&s.students, status, &s.search_term);
        })?;
        Ok(())
    }

    /// Change one form field and clear its error
    pub fn set_field<S: Into<String>>(&self, field: FormField, value: S) -> Result<()> {
        let value = value.into();
        self.store.update(|s| {
            s.form.set(field, value);
            s.form_errors.remove(field);
        })?;
        Ok(())
    }
}
