use crate::backend::RosterBackend;
use crate::camera::{CameraSession, CaptureDevice};
use crate::config::RosterConfig;
use crate::error::{RosterError, Result};
use crate::notify::NotificationCenter;
use crate::recognition::FaceRecognizer;
use crate::store::{StateStore, Subscription};
use crate::view::{filter_students, render, resolve_timezone, RenderedScreen, ViewState};
use chrono_tz::Tz;
use parking_lot::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Drives the roster screens: navigation, filtering, the capture session and
/// the submit/delete workflows. All state lives in a `StateStore<ViewState>`.
pub struct ScreenController {
    pub(super) config: RosterConfig,
    pub(super) timezone: Tz,
    pub(super) store: Arc<StateStore<ViewState>>,
    pub(super) backend: Arc<dyn RosterBackend>,
    pub(super) recognizer: Arc<dyn FaceRecognizer>,
    pub(super) notifications: Arc<NotificationCenter>,
    pub(super) camera: tokio::sync::Mutex<CameraSession>,
    /// Cancelled whenever the active screen changes
    pub(super) screen_token: Mutex<CancellationToken>,
    pub(super) capturing: AtomicBool,
}

impl ScreenController {
    pub(super) fn new(
        config: RosterConfig,
        backend: Arc<dyn RosterBackend>,
        device: Arc<dyn CaptureDevice>,
        recognizer: Arc<dyn FaceRecognizer>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        let timezone = resolve_timezone(&config.system.timezone);
        let camera = CameraSession::new(config.camera.clone(), device);

        Self {
            config,
            timezone,
            store: StateStore::new(ViewState::default()),
            backend,
            recognizer,
            notifications,
            camera: tokio::sync::Mutex::new(camera),
            screen_token: Mutex::new(CancellationToken::new()),
            capturing: AtomicBool::new(false),
        }
    }

    pub fn builder() -> super::ScreenControllerBuilder {
        super::ScreenControllerBuilder::new()
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn notifications(&self) -> &Arc<NotificationCenter> {
        &self.notifications
    }

    /// Snapshot of the view state
    pub fn state(&self) -> ViewState {
        self.store.get()
    }

    pub fn store(&self) -> &Arc<StateStore<ViewState>> {
        &self.store
    }

    /// Register a listener for every state change
    pub fn on_change<F>(&self, listener: F) -> Subscription<ViewState>
    where
        F: Fn(&ViewState) + Send + Sync + 'static,
    {
        self.store.on_change(listener)
    }

    /// Text rendition of the active screen
    pub fn render(&self) -> RenderedScreen {
        self.store.read(|state| {
            render(
                state,
                self.config.registration.max_captures,
                self.timezone,
            )
        })
    }

    /// Load classes and students for the first list screen
    pub async fn init(&self) -> Result<()> {
        debug!("Initializing roster screens");
        self.reload().await
    }

    /// Reload the full dataset without changing screens
    pub async fn refresh(&self) -> Result<()> {
        self.reload().await
    }

    pub(super) fn current_token(&self) -> CancellationToken {
        self.screen_token.lock().clone()
    }

    /// Cancel the token of the screen being left and issue a fresh one
    pub(super) fn renew_token(&self) -> CancellationToken {
        let mut token = self.screen_token.lock();
        token.cancel();
        *token = CancellationToken::new();
        token.clone()
    }

    pub(super) fn org_id(&self) -> &str {
        &self.config.system.organization_id
    }

    /// Roster data is shared by every screen, so results are applied even
    /// when the screen changed while loading
    pub(super) async fn reload(&self) -> Result<()> {
        self.store.update(|s| s.loading = true)?;

        let org_id = self.org_id();
        let (students, classes) = tokio::join!(
            self.backend.load_students(org_id),
            self.backend.load_classes(org_id)
        );

        let loaded = students.and_then(|students| classes.map(|classes| (students, classes)));
        let (students, classes) = match loaded {
            Ok(data) => data,
            Err(e) => {
                self.store.update(|s| s.loading = false)?;
                return Err(self.report(e.into(), "Failed to load students"));
            }
        };

        self.store.update(|s| {
            s.filtered_students = filter_students(&students, s.status_filter, &s.search_term);
            s.students = students;
            s.classes = classes;
            s.loading = false;
        })?;

        debug!(
            "Loaded {} students",
            self.store.read(|s| s.students.len())
        );
        Ok(())
    }

    /// Turn a workflow failure into one user-facing notification
    pub(super) fn report(&self, err: RosterError, context: &str) -> RosterError {
        if err.is_recoverable() {
            error!("{}: {}", context, err);
        } else {
            error!("{} (unrecoverable): {}", context, err);
        }
        self.notifications
            .error(format!("{}: {}", context, err.user_message()));
        err
    }
}
