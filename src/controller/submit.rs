use super::screen::ScreenController;
use crate::error::{RosterError, Result};
use crate::form::{validate_images, FieldErrors};
use crate::model::Student;
use crate::view::{FormMode, Screen};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved and back on the list
    Saved { student_id: String },
    /// Local validation failed; nothing was sent
    Invalid(FieldErrors),
    /// Not on the form, or a submit is already running
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { student_id: String },
    /// No delete was awaiting confirmation
    NotConfirmed,
    Ignored,
}

impl ScreenController {
    /// Validate the form and save it: create or update the student, then
    /// store the new face set. Both calls run in order and a failure in the
    /// second does not undo the first.
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let mode = match self.screen() {
            Screen::Form(mode) => mode,
            _ => return Ok(SubmitOutcome::Ignored),
        };

        let started = self.store.update(|s| {
            if s.submitting {
                false
            } else {
                s.submitting = true;
                true
            }
        })?;
        if !started {
            warn!("Submit ignored while another submit is running");
            return Ok(SubmitOutcome::Ignored);
        }

        let outcome = self.submit_form(mode).await;
        self.store.update(|s| s.submitting = false)?;
        outcome
    }

    async fn submit_form(&self, mode: FormMode) -> Result<SubmitOutcome> {
        let rules = &self.config.registration;
        let (form, captured, selected) = self.store.read(|s| {
            (
                s.form.clone(),
                s.captured_images.clone(),
                s.selected_student.as_ref().map(|student| student.id.clone()),
            )
        });

        // Editing without new captures keeps the saved set
        let replaces_samples = mode == FormMode::Add || !captured.is_empty();

        let mut errors = form.validate(rules);
        validate_images(&mut errors, captured.len(), replaces_samples, rules);

        if !errors.is_empty() {
            debug!("Form validation failed: {}", errors);
            let shown = errors.clone();
            self.store.update(move |s| {
                s.form_errors = shown;
                s.form_error = None;
            })?;
            self.notifications
                .warning("Please correct the highlighted fields");
            return Ok(SubmitOutcome::Invalid(errors));
        }

        self.store.update(|s| {
            s.form_errors = FieldErrors::new();
            s.form_error = None;
        })?;

        let token = self.current_token();
        let org_id = self.org_id();

        let saved: Student = match (mode, selected) {
            (FormMode::Add, _) => {
                let created = self
                    .backend
                    .create_student(org_id, form.to_draft())
                    .await
                    .map_err(|e| self.fail_submit(e.into()))?;
                self.adopt_created(&created, &token)?;
                created
            }
            (FormMode::Edit, Some(student_id)) => self
                .backend
                .update_student(org_id, &student_id, form.to_patch())
                .await
                .map_err(|e| self.fail_submit(e.into()))?,
            (FormMode::Edit, None) => {
                return Err(self.fail_submit(RosterError::system(
                    "No student selected for editing",
                )))
            }
        };

        if replaces_samples {
            self.backend
                .save_face_samples(org_id, &saved.id, captured)
                .await
                .map_err(|e| self.fail_submit(e.into()))?;
        }

        info!(
            "Student {} {}",
            saved.full_name(),
            if mode == FormMode::Add { "registered" } else { "updated" }
        );
        self.notifications.success(match mode {
            FormMode::Add => "Student registered successfully",
            FormMode::Edit => "Student updated successfully",
        });

        self.reload().await?;
        if token.is_cancelled() {
            debug!("Student {} saved after leaving the form", saved.id);
        } else {
            self.show_list().await?;
        }

        Ok(SubmitOutcome::Saved {
            student_id: saved.id,
        })
    }

    /// The record now exists on the backend, so the open form becomes an edit
    /// of it. A retry after a failed sample save then updates instead of
    /// creating a second record.
    fn adopt_created(&self, created: &Student, token: &CancellationToken) -> Result<()> {
        let created = created.clone();
        let token = token.clone();
        self.store.update(move |s| {
            if token.is_cancelled() {
                return;
            }
            s.screen = Screen::Form(FormMode::Edit);
            s.edit_mode = true;
            s.replace_saved_images = !s.captured_images.is_empty();
            s.selected_student = Some(created);
        })?;
        Ok(())
    }

    fn fail_submit(&self, err: RosterError) -> RosterError {
        let message = err.user_message();
        if let Err(store_err) = self.store.update(|s| s.form_error = Some(message)) {
            warn!("Could not record submit error: {}", store_err);
        }
        self.report(err, "Failed to save student")
    }

    /// Ask for confirmation before deleting the student on the detail screen
    pub fn request_delete(&self) -> Result<bool> {
        let requested = self.store.update(|s| {
            match (&s.screen, &s.selected_student) {
                (Screen::Detail, Some(student)) => {
                    s.pending_delete = Some(student.id.clone());
                    true
                }
                _ => false,
            }
        })?;
        Ok(requested)
    }

    pub fn cancel_delete(&self) -> Result<()> {
        self.store.update(|s| s.pending_delete = None)?;
        Ok(())
    }

    /// Soft-delete the confirmed student, reload and return to the list
    pub async fn confirm_delete(&self) -> Result<DeleteOutcome> {
        let pending = self.store.update(|s| {
            if s.submitting {
                return Err(());
            }
            let pending = s.pending_delete.clone();
            if pending.is_some() {
                s.submitting = true;
            }
            Ok(pending)
        })?;

        let student_id = match pending {
            Ok(Some(student_id)) => student_id,
            Ok(None) => return Ok(DeleteOutcome::NotConfirmed),
            Err(()) => {
                warn!("Delete ignored while another operation is running");
                return Ok(DeleteOutcome::Ignored);
            }
        };

        let outcome = self.delete_student(student_id).await;
        self.store.update(|s| s.submitting = false)?;
        outcome
    }

    async fn delete_student(&self, student_id: String) -> Result<DeleteOutcome> {
        let token = self.current_token();

        if let Err(e) = self.backend.delete_student(self.org_id(), &student_id).await {
            self.store.update(|s| s.pending_delete = None)?;
            return Err(self.report(e.into(), "Failed to delete student"));
        }

        info!("Student {} deleted", student_id);
        self.notifications.success("Student deleted");

        self.reload().await?;
        if token.is_cancelled() {
            debug!("Student {} deleted after leaving the detail screen", student_id);
        } else {
            self.show_list().await?;
        }

        Ok(DeleteOutcome::Deleted { student_id })
    }
}
