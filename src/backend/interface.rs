use crate::error::BackendError;
use crate::model::{CapturedImage, ClassInfo, FaceSample, Student, StudentDraft, StudentPatch};

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Remote roster service. Every call is scoped to an organization and either
/// completes or reports `BackendError::NotFound` for unknown identifiers.
#[async_trait::async_trait]
pub trait RosterBackend: Send + Sync {
    async fn load_students(&self, org_id: &str) -> BackendResult<Vec<Student>>;

    async fn load_classes(&self, org_id: &str) -> BackendResult<Vec<ClassInfo>>;

    async fn load_student(&self, org_id: &str, student_id: &str) -> BackendResult<Student>;

    async fn load_face_samples(
        &self,
        org_id: &str,
        student_id: &str,
    ) -> BackendResult<Vec<FaceSample>>;

    async fn create_student(&self, org_id: &str, draft: StudentDraft) -> BackendResult<Student>;

    async fn update_student(
        &self,
        org_id: &str,
        student_id: &str,
        patch: StudentPatch,
    ) -> BackendResult<Student>;

    /// Soft delete: the record stays in the dataset with status `Deleted`
    async fn delete_student(&self, org_id: &str, student_id: &str) -> BackendResult<Student>;

    /// Replace the stored face set of a student
    async fn save_face_samples(
        &self,
        org_id: &str,
        student_id: &str,
        samples: Vec<CapturedImage>,
    ) -> BackendResult<Vec<FaceSample>>;
}

/// Kinds of backend operation, used for call logs and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    LoadStudents,
    LoadClasses,
    LoadStudent,
    LoadFaceSamples,
    CreateStudent,
    UpdateStudent,
    DeleteStudent,
    SaveFaceSamples,
}

impl BackendOp {
    pub fn name(&self) -> &'static str {
        match self {
            BackendOp::LoadStudents => "load_students",
            BackendOp::LoadClasses => "load_classes",
            BackendOp::LoadStudent => "load_student",
            BackendOp::LoadFaceSamples => "load_face_samples",
            BackendOp::CreateStudent => "create_student",
            BackendOp::UpdateStudent => "update_student",
            BackendOp::DeleteStudent => "delete_student",
            BackendOp::SaveFaceSamples => "save_face_samples",
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(
            self,
            BackendOp::CreateStudent
                | BackendOp::UpdateStudent
                | BackendOp::DeleteStudent
                | BackendOp::SaveFaceSamples
        )
    }
}

/// One recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCall {
    pub op: BackendOp,
    pub org_id: String,
    pub student_id: Option<String>,
}
