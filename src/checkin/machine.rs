use crate::config::CheckInConfig;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Extra milliseconds added to the processing dwell when reporting how long
/// recognition took
const PROCESSING_JITTER_MS: u64 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInPhase {
    Scanning,
    FaceDetected,
    Processing,
    Success,
    Failure,
    NoFace,
}

impl CheckInPhase {
    pub fn name(&self) -> &'static str {
        match self {
            CheckInPhase::Scanning => "scanning",
            CheckInPhase::FaceDetected => "face_detected",
            CheckInPhase::Processing => "processing",
            CheckInPhase::Success => "success",
            CheckInPhase::Failure => "failure",
            CheckInPhase::NoFace => "no_face",
        }
    }

    /// Success, failure and no-face are shown for a while before scanning resumes
    pub fn is_result(&self) -> bool {
        matches!(
            self,
            CheckInPhase::Success | CheckInPhase::Failure | CheckInPhase::NoFace
        )
    }

    /// Status line shown on the kiosk screen
    pub fn message(&self) -> &'static str {
        match self {
            CheckInPhase::Scanning => "Looking for a face...",
            CheckInPhase::FaceDetected => "Face detected, hold still",
            CheckInPhase::Processing => "Verifying identity...",
            CheckInPhase::Success => "Check-in successful",
            CheckInPhase::Failure => "Face not recognized, please try again",
            CheckInPhase::NoFace => "No face detected",
        }
    }
}

/// A student the kiosk can recognize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInStudent {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub guardian_phone: String,
}

impl CheckInStudent {
    pub fn new(id: &str, name: &str, class_name: &str, guardian_phone: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            class_name: class_name.to_string(),
            guardian_phone: guardian_phone.to_string(),
        }
    }
}

/// Fixed pool the simulation picks recognized students from
pub fn demo_pool() -> Vec<CheckInStudent> {
    vec![
        CheckInStudent::new("stu-001", "Napat Wongsa", "Kindergarten 1/A", "0812345601"),
        CheckInStudent::new("stu-002", "Pimchanok Suksai", "Kindergarten 1/B", "0812345602"),
        CheckInStudent::new("stu-003", "Thanawat Chaiyo", "Kindergarten 2/A", "0812345603"),
        CheckInStudent::new("stu-004", "Kanokwan Meesuk", "Kindergarten 3/A", "0812345604"),
    ]
}

/// Simulated message to a guardian; never leaves the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardianNotice {
    pub student_id: String,
    pub phone: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CheckInState {
    pub phase: CheckInPhase,
    /// True while the recognizer is "working"
    pub processing: bool,
    pub last_check_at: Option<DateTime<Utc>>,
    pub last_student: Option<CheckInStudent>,
    /// Reported recognition time of the last success
    pub processing_ms: Option<u64>,
    /// Result screens shown so far
    pub results_shown: u64,
    pub successes: u64,
    /// Most recent guardian notices, oldest first
    pub outbox: VecDeque<GuardianNotice>,
    pool: Vec<CheckInStudent>,
    processing_dwell_ms: u64,
}

impl CheckInState {
    pub fn new(pool: Vec<CheckInStudent>) -> Self {
        Self {
            phase: CheckInPhase::Scanning,
            processing: false,
            last_check_at: None,
            last_student: None,
            processing_ms: None,
            results_shown: 0,
            successes: 0,
            outbox: VecDeque::new(),
            pool,
            processing_dwell_ms: 0,
        }
    }

    pub fn pool(&self) -> &[CheckInStudent] {
        &self.pool
    }
}

impl Default for CheckInState {
    fn default() -> Self {
        Self::new(demo_pool())
    }
}

fn sample_ms<R: Rng + ?Sized>(rng: &mut R, (min, max): (u64, u64)) -> u64 {
    if max <= min {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

/// How long `phase` stays on screen before the next step
pub fn dwell<R: Rng + ?Sized>(phase: CheckInPhase, rng: &mut R, config: &CheckInConfig) -> Duration {
    let window = match phase {
        CheckInPhase::Scanning => config.scanning_ms,
        CheckInPhase::FaceDetected => config.face_detected_ms,
        CheckInPhase::Processing => config.processing_ms,
        CheckInPhase::Success | CheckInPhase::Failure | CheckInPhase::NoFace => config.result_ms,
    };
    Duration::from_millis(sample_ms(rng, window))
}

fn pick_outcome<R: Rng + ?Sized>(rng: &mut R, config: &CheckInConfig) -> CheckInPhase {
    let total = config.success_weight + config.failure_weight + config.no_face_weight;
    let roll = rng.gen::<f64>() * total;

    if roll < config.success_weight {
        CheckInPhase::Success
    } else if roll < config.success_weight + config.failure_weight {
        CheckInPhase::Failure
    } else {
        CheckInPhase::NoFace
    }
}

/// One step of the kiosk cycle. Returns the next state and how long it
/// should be shown before stepping again.
pub fn advance<R: Rng + ?Sized>(
    state: &CheckInState,
    rng: &mut R,
    config: &CheckInConfig,
) -> (CheckInState, Duration) {
    let mut next = state.clone();

    match state.phase {
        CheckInPhase::Scanning => {
            next.phase = CheckInPhase::FaceDetected;
        }
        CheckInPhase::FaceDetected => {
            next.phase = CheckInPhase::Processing;
            next.processing = true;
        }
        CheckInPhase::Processing => {
            next.processing = false;
            next.phase = pick_outcome(rng, config);
            next.results_shown += 1;

            if next.phase == CheckInPhase::Success {
                record_success(&mut next, rng, config.outbox_limit);
            } else {
                debug!("Check-in ended with {}", next.phase.name());
            }
        }
        CheckInPhase::Success | CheckInPhase::Failure | CheckInPhase::NoFace => {
            next.phase = CheckInPhase::Scanning;
        }
    }

    let delay = dwell(next.phase, rng, config);
    if next.phase == CheckInPhase::Processing {
        next.processing_dwell_ms = delay.as_millis() as u64;
    }
    (next, delay)
}

fn record_success<R: Rng + ?Sized>(state: &mut CheckInState, rng: &mut R, outbox_limit: usize) {
    if state.pool.is_empty() {
        warn!("Check-in succeeded with an empty student pool");
        state.phase = CheckInPhase::Failure;
        return;
    }

    let student = state.pool[rng.gen_range(0..state.pool.len())].clone();
    let elapsed = state.processing_dwell_ms + rng.gen_range(0..=PROCESSING_JITTER_MS);
    let now = Utc::now();

    let notice = GuardianNotice {
        student_id: student.id.clone(),
        phone: student.guardian_phone.clone(),
        message: format!(
            "{} checked in at {}",
            student.name,
            now.format("%H:%M")
        ),
        sent_at: now,
    };
    info!(
        "Notify guardian {} for {}: {}",
        notice.phone, student.name, notice.message
    );

    state.successes += 1;
    state.processing_ms = Some(elapsed);
    state.last_check_at = Some(now);
    state.last_student = Some(student);
    while state.outbox.len() >= outbox_limit.max(1) {
        state.outbox.pop_front();
    }
    state.outbox.push_back(notice);
}
