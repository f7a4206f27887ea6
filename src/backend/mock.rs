use super::interface::{BackendCall, BackendOp, BackendResult, RosterBackend};
use super::seed;
use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::model::{
    CapturedImage, ClassInfo, FaceSample, Student, StudentDraft, StudentPatch, StudentStatus,
};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Default)]
struct OrgData {
    classes: Vec<ClassInfo>,
    students: Vec<Student>,
    samples: HashMap<String, Vec<FaceSample>>,
}

/// In-memory roster service with a fixed simulated round trip per call
pub struct MockBackend {
    read_latency: Duration,
    write_latency: Duration,
    orgs: Mutex<HashMap<String, OrgData>>,
    calls: Mutex<Vec<BackendCall>>,
    failures: Mutex<HashSet<BackendOp>>,
}

impl MockBackend {
    /// Create a backend for one organization, seeded with demo data when configured
    pub fn new(config: &BackendConfig, org_id: &str) -> Self {
        let (classes, students) = if config.seed_demo_data {
            (seed::demo_classes(), seed::demo_students())
        } else {
            (Vec::new(), Vec::new())
        };
        Self::with_data(config, org_id, classes, students)
    }

    /// Create a backend for one organization with explicit contents
    pub fn with_data(
        config: &BackendConfig,
        org_id: &str,
        classes: Vec<ClassInfo>,
        students: Vec<Student>,
    ) -> Self {
        info!(
            "Mock backend for '{}' seeded with {} classes and {} students",
            org_id,
            classes.len(),
            students.len()
        );

        let mut orgs = HashMap::new();
        orgs.insert(
            org_id.to_string(),
            OrgData {
                classes,
                students,
                samples: HashMap::new(),
            },
        );

        Self {
            read_latency: config.read_latency(),
            write_latency: config.write_latency(),
            orgs: Mutex::new(orgs),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashSet::new()),
        }
    }

    /// Make the next call of `op` fail with `Unavailable`
    pub fn fail_next(&self, op: BackendOp) {
        self.failures.lock().insert(op);
    }

    /// Every call received so far, in arrival order
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    /// Operations received so far, ignoring arguments
    pub fn ops(&self) -> Vec<BackendOp> {
        self.calls.lock().iter().map(|call| call.op).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Direct read of stored samples, bypassing latency and the call log
    pub fn stored_samples(&self, org_id: &str, student_id: &str) -> Vec<FaceSample> {
        self.orgs
            .lock()
            .get(org_id)
            .and_then(|org| org.samples.get(student_id).cloned())
            .unwrap_or_default()
    }

    async fn begin(&self, op: BackendOp, org_id: &str, student_id: Option<&str>) -> BackendResult<()> {
        self.calls.lock().push(BackendCall {
            op,
            org_id: org_id.to_string(),
            student_id: student_id.map(str::to_string),
        });

        let latency = if op.is_write() {
            self.write_latency
        } else {
            self.read_latency
        };
        debug!("Backend {} for '{}' ({:?})", op.name(), org_id, latency);
        tokio::time::sleep(latency).await;

        if self.failures.lock().remove(&op) {
            warn!("Injected failure for backend {}", op.name());
            return Err(BackendError::Unavailable {
                operation: op.name().to_string(),
                details: "injected failure".to_string(),
            });
        }

        Ok(())
    }

    fn with_org<T>(
        &self,
        org_id: &str,
        f: impl FnOnce(&mut OrgData) -> BackendResult<T>,
    ) -> BackendResult<T> {
        let mut orgs = self.orgs.lock();
        let org = orgs.get_mut(org_id).ok_or_else(|| BackendError::NotFound {
            entity: "organization",
            id: org_id.to_string(),
        })?;
        f(org)
    }
}

fn student_mut<'a>(org: &'a mut OrgData, student_id: &str) -> BackendResult<&'a mut Student> {
    org.students
        .iter_mut()
        .find(|s| s.id == student_id)
        .ok_or_else(|| BackendError::NotFound {
            entity: "student",
            id: student_id.to_string(),
        })
}

fn class_name(org: &OrgData, class_id: &str) -> BackendResult<String> {
    org.classes
        .iter()
        .find(|c| c.id == class_id)
        .map(|c| c.name.clone())
        .ok_or_else(|| BackendError::NotFound {
            entity: "class",
            id: class_id.to_string(),
        })
}

#[async_trait::async_trait]
impl RosterBackend for MockBackend {
    async fn load_students(&self, org_id: &str) -> BackendResult<Vec<Student>> {
        self.begin(BackendOp::LoadStudents, org_id, None).await?;
        self.with_org(org_id, |org| Ok(org.students.clone()))
    }

    async fn load_classes(&self, org_id: &str) -> BackendResult<Vec<ClassInfo>> {
        self.begin(BackendOp::LoadClasses, org_id, None).await?;
        self.with_org(org_id, |org| Ok(org.classes.clone()))
    }

    async fn load_student(&self, org_id: &str, student_id: &str) -> BackendResult<Student> {
        self.begin(BackendOp::LoadStudent, org_id, Some(student_id))
            .await?;
        self.with_org(org_id, |org| student_mut(org, student_id).map(|s| s.clone()))
    }

    async fn load_face_samples(
        &self,
        org_id: &str,
        student_id: &str,
    ) -> BackendResult<Vec<FaceSample>> {
        self.begin(BackendOp::LoadFaceSamples, org_id, Some(student_id))
            .await?;
        self.with_org(org_id, |org| {
            student_mut(org, student_id)?;
            Ok(org.samples.get(student_id).cloned().unwrap_or_default())
        })
    }

    async fn create_student(&self, org_id: &str, draft: StudentDraft) -> BackendResult<Student> {
        self.begin(BackendOp::CreateStudent, org_id, None).await?;
        self.with_org(org_id, |org| {
            let class_name = class_name(org, &draft.class_id)?;
            let student = Student {
                id: Uuid::new_v4().to_string(),
                first_name: draft.first_name,
                last_name: draft.last_name,
                class_id: draft.class_id,
                class_name,
                parent_name: draft.parent_name,
                parent_phone: draft.parent_phone,
                status: StudentStatus::Registered,
                registration_date: Some(Utc::now()),
                updated_at: None,
                face_encoding: None,
                avatar_url: None,
            };
            info!("Created student {} ({})", student.full_name(), student.id);
            org.students.push(student.clone());
            Ok(student)
        })
    }

    async fn update_student(
        &self,
        org_id: &str,
        student_id: &str,
        patch: StudentPatch,
    ) -> BackendResult<Student> {
        self.begin(BackendOp::UpdateStudent, org_id, Some(student_id))
            .await?;
        self.with_org(org_id, |org| {
            let new_class_name = match &patch.class_id {
                Some(class_id) => Some(class_name(org, class_id)?),
                None => None,
            };

            let student = student_mut(org, student_id)?;
            if let Some(v) = patch.first_name {
                student.first_name = v;
            }
            if let Some(v) = patch.last_name {
                student.last_name = v;
            }
            if let (Some(id), Some(name)) = (patch.class_id, new_class_name) {
                student.class_id = id;
                student.class_name = name;
            }
            if let Some(v) = patch.parent_name {
                student.parent_name = v;
            }
            if let Some(v) = patch.parent_phone {
                student.parent_phone = v;
            }
            if let Some(v) = patch.face_encoding {
                student.face_encoding = Some(v);
            }
            student.updated_at = Some(Utc::now());
            info!("Updated student {}", student_id);
            Ok(student.clone())
        })
    }

    async fn delete_student(&self, org_id: &str, student_id: &str) -> BackendResult<Student> {
        self.begin(BackendOp::DeleteStudent, org_id, Some(student_id))
            .await?;
        self.with_org(org_id, |org| {
            let student = student_mut(org, student_id)?;
            student.mark_deleted(Utc::now());
            info!("Soft-deleted student {}", student_id);
            Ok(student.clone())
        })
    }

    async fn save_face_samples(
        &self,
        org_id: &str,
        student_id: &str,
        samples: Vec<CapturedImage>,
    ) -> BackendResult<Vec<FaceSample>> {
        self.begin(BackendOp::SaveFaceSamples, org_id, Some(student_id))
            .await?;
        self.with_org(org_id, |org| {
            let student = student_mut(org, student_id)?;
            if let Some(encoding) = samples.iter().rev().find_map(|s| s.encoding.clone()) {
                student.face_encoding = Some(encoding);
            }
            student.updated_at = Some(Utc::now());

            let stored: Vec<FaceSample> = samples
                .into_iter()
                .map(|image| FaceSample {
                    id: Uuid::new_v4().to_string(),
                    student_id: student_id.to_string(),
                    image: image.data,
                    captured_at: image.captured_at,
                })
                .collect();

            info!(
                "Saved {} face samples for student {}",
                stored.len(),
                student_id
            );
            org.samples.insert(student_id.to_string(), stored.clone());
            Ok(stored)
        })
    }
}
