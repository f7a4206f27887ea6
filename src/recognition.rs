use crate::config::RecognitionConfig;
use crate::model::CapturedImage;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const REJECTION_REASONS: &[&str] = &[
    "No face detected in the photo",
    "More than one face detected",
    "Photo is too blurry",
    "Face is not centered in the frame",
    "Lighting is too dark",
];

/// Outcome of the recognition gate for one capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    Accepted { encoding: String },
    Rejected { reason: String },
}

impl Recognition {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Recognition::Accepted { .. })
    }
}

/// Decides whether a captured still is usable as a face sample
#[async_trait::async_trait]
pub trait FaceRecognizer: Send + Sync {
    async fn classify(&self, image: &CapturedImage) -> Recognition;
}

/// Placeholder recognizer: waits a fixed delay and accepts at a fixed rate
pub struct RandomRecognizer {
    delay: Duration,
    acceptance_rate: f64,
    rng: Mutex<StdRng>,
}

impl RandomRecognizer {
    pub fn new(config: &RecognitionConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic outcomes for a given seed
    pub fn seeded(config: &RecognitionConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &RecognitionConfig, rng: StdRng) -> Self {
        Self {
            delay: Duration::from_millis(config.delay_ms),
            acceptance_rate: config.acceptance_rate.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait::async_trait]
impl FaceRecognizer for RandomRecognizer {
    async fn classify(&self, image: &CapturedImage) -> Recognition {
        tokio::time::sleep(self.delay).await;

        let outcome = {
            let mut rng = self.rng.lock();
            if rng.gen_bool(self.acceptance_rate) {
                Recognition::Accepted {
                    encoding: format!("face_{}", Uuid::new_v4().simple()),
                }
            } else {
                let reason = REJECTION_REASONS[rng.gen_range(0..REJECTION_REASONS.len())];
                Recognition::Rejected {
                    reason: reason.to_string(),
                }
            }
        };

        debug!(
            "Classified capture #{} ({} bytes): {:?}",
            image.position,
            image.size_bytes(),
            outcome
        );
        outcome
    }
}

/// Returns queued outcomes in order, accepting once the queue is empty
pub struct ScriptedRecognizer {
    outcomes: Mutex<VecDeque<Recognition>>,
    calls: Mutex<usize>,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self::with_outcomes(Vec::new())
    }

    pub fn with_outcomes(outcomes: Vec<Recognition>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn push_accept(&self) {
        self.outcomes.lock().push_back(Recognition::Accepted {
            encoding: format!("face_{}", Uuid::new_v4().simple()),
        });
    }

    pub fn push_reject<S: Into<String>>(&self, reason: S) {
        self.outcomes.lock().push_back(Recognition::Rejected {
            reason: reason.into(),
        });
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

impl Default for ScriptedRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FaceRecognizer for ScriptedRecognizer {
    async fn classify(&self, image: &CapturedImage) -> Recognition {
        *self.calls.lock() += 1;
        let next = self.outcomes.lock().pop_front();
        next.unwrap_or_else(|| Recognition::Accepted {
            encoding: format!("face_scripted_{}", image.position),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;
    use chrono::Utc;
    use std::sync::Arc;

    fn image() -> CapturedImage {
        CapturedImage {
            position: 0,
            data: Arc::new(vec![0xFF, 0xD8]),
            width: 2,
            height: 2,
            captured_at: Utc::now(),
            watermark: "Mobile Mockup".to_string(),
            encoding: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_random_recognizer_rates() {
        let mut config = RosterConfig::default().recognition;

        config.acceptance_rate = 1.0;
        let always = RandomRecognizer::seeded(&config, 7);
        for _ in 0..20 {
            assert!(always.classify(&image()).await.is_accepted());
        }

        config.acceptance_rate = 0.0;
        let never = RandomRecognizer::seeded(&config, 7);
        match never.classify(&image()).await {
            Recognition::Rejected { reason } => {
                assert!(REJECTION_REASONS.contains(&reason.as_str()))
            }
            other => panic!("Expected rejection, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_random_recognizer_waits_for_delay() {
        let config = RosterConfig::default().recognition;
        let recognizer = RandomRecognizer::seeded(&config, 1);

        let started = tokio::time::Instant::now();
        recognizer.classify(&image()).await;
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_scripted_recognizer_order() {
        let recognizer = ScriptedRecognizer::new();
        recognizer.push_reject("Photo is too blurry");
        recognizer.push_accept();

        assert_eq!(
            recognizer.classify(&image()).await,
            Recognition::Rejected {
                reason: "Photo is too blurry".to_string()
            }
        );
        assert!(recognizer.classify(&image()).await.is_accepted());
        assert!(recognizer.classify(&image()).await.is_accepted());
        assert_eq!(recognizer.call_count(), 3);
    }
}
