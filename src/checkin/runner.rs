use super::machine::{advance, demo_pool, dwell, CheckInState, CheckInStudent};
use crate::config::CheckInConfig;
use crate::error::{RosterError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Timed driver for the kiosk check-in cycle
pub struct CheckInSimulation {
    config: CheckInConfig,
    pool: Vec<CheckInStudent>,
    rng: StdRng,
}

impl CheckInSimulation {
    pub fn new(config: &CheckInConfig) -> Self {
        Self {
            config: config.clone(),
            pool: demo_pool(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sequence of delays and outcomes
    pub fn seeded(config: &CheckInConfig, seed: u64) -> Self {
        Self {
            config: config.clone(),
            pool: demo_pool(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_pool(mut self, pool: Vec<CheckInStudent>) -> Self {
        self.pool = pool;
        self
    }

    /// Spawn the cycle on the current runtime, starting in `Scanning`
    pub fn start(self) -> CheckInHandle {
        let initial = CheckInState::new(self.pool);
        let (tx, rx) = watch::channel(initial.clone());
        let token = CancellationToken::new();

        let task = tokio::spawn(run_cycle(
            initial,
            self.rng,
            self.config,
            tx,
            token.clone(),
        ));

        info!("Check-in simulation started");
        CheckInHandle {
            token,
            state_rx: rx,
            task: Some(task),
        }
    }
}

async fn run_cycle(
    mut state: CheckInState,
    mut rng: StdRng,
    config: CheckInConfig,
    tx: watch::Sender<CheckInState>,
    token: CancellationToken,
) {
    let mut delay = dwell(state.phase, &mut rng, &config);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        // A stop that raced the timer still wins
        if token.is_cancelled() {
            break;
        }

        let (next, next_delay) = advance(&state, &mut rng, &config);
        debug!(
            "Check-in {} -> {} ({} ms)",
            state.phase.name(),
            next.phase.name(),
            next_delay.as_millis()
        );
        state = next;
        delay = next_delay;

        if token.is_cancelled() {
            break;
        }
        if tx.send(state.clone()).is_err() {
            debug!("No check-in observers left");
            break;
        }
    }

    info!(
        "Check-in simulation stopped after {} results",
        state.results_shown
    );
}

/// Running simulation. Dropping the handle stops it.
pub struct CheckInHandle {
    token: CancellationToken,
    state_rx: watch::Receiver<CheckInState>,
    task: Option<JoinHandle<()>>,
}

impl CheckInHandle {
    pub fn state(&self) -> CheckInState {
        self.state_rx.borrow().clone()
    }

    /// Receiver that is woken on every transition
    pub fn subscribe(&self) -> watch::Receiver<CheckInState> {
        self.state_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
            && self
                .task
                .as_ref()
                .map(|task| !task.is_finished())
                .unwrap_or(false)
    }

    /// Cancel every pending transition. A transition already being applied on
    /// another worker thread may still be published once; nothing after it is.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            debug!("Stopping check-in simulation");
            self.token.cancel();
        }
    }

    /// Wait until `count` result screens have been shown in total
    pub async fn wait_for_results(&mut self, count: u64) -> Result<CheckInState> {
        loop {
            {
                let state = self.state_rx.borrow_and_update();
                if state.results_shown >= count {
                    return Ok(state.clone());
                }
            }
            if self.state_rx.changed().await.is_err() {
                return Err(RosterError::cancelled("checkin"));
            }
        }
    }

    /// Stop the simulation and wait for its task to exit
    pub async fn shutdown(mut self) -> Result<CheckInState> {
        self.stop();
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| RosterError::component("checkin".to_string(), e.to_string()))?;
        }
        Ok(self.state())
    }
}

impl Drop for CheckInHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
