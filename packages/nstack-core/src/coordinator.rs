use crate::alert::{select_alert, AlertDecision, AlertInProgress};
use crate::collaborators::{present, AlertPresenter, LocalizationRefresher, Transport};
use crate::delta::should_force_localization_refresh;
use crate::error::{
    ConfigurationError, LocalizationRefreshError, MalformedResponseError, SyncError,
};
use crate::request::{app_open_url, build_request};
use crate::response::{interpret, AppOpenResponse};
use crate::sync_state::{SyncState, SyncStateStore};
use chrono::{DateTime, Utc};
use nstack_cache::{KeyValueStore, StoreError};
use nstack_config::Configuration;
use nstack_utils::time::now;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};

/// Progress of the current (or last) app-open cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Requesting,
    Interpreting,
    Deciding,
    Done,
    Failed,
}

impl CycleState {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            CycleState::Requesting | CycleState::Interpreting | CycleState::Deciding
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitState {
    Created,
    Started { guid: String },
}

/// Everything the coordinator talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub store: Arc<dyn KeyValueStore>,
    pub presenter: Arc<dyn AlertPresenter>,
    /// Without a refresher, localization handoff is skipped.
    pub localization: Option<Arc<dyn LocalizationRefresher>>,
}

/// What a completed cycle did.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub alert: Option<AlertDecision>,
    /// Selection did not run because an alert was already on screen.
    pub alert_suppressed: bool,
    pub forced_localization_refresh: bool,
    pub localization_refreshed: bool,
    pub localization_error: Option<LocalizationRefreshError>,
    pub field_errors: Vec<MalformedResponseError>,
    pub synced_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Another cycle was in flight; nothing was sent.
    Skipped,
}

impl CycleOutcome {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Completed(report) => Some(report),
            CycleOutcome::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, CycleOutcome::Skipped)
    }
}

fn lock_state(state: &Mutex<CycleState>) -> MutexGuard<'_, CycleState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive right to run one cycle. A cycle abandoned midway ends `Failed`.
struct CycleGuard<'a> {
    state: &'a Mutex<CycleState>,
    finished: bool,
}

impl<'a> CycleGuard<'a> {
    fn try_acquire(state: &'a Mutex<CycleState>) -> Option<Self> {
        let mut current = lock_state(state);
        if current.is_in_flight() {
            return None;
        }
        debug!(from = ?*current, to = ?CycleState::Requesting, "app-open cycle transition");
        *current = CycleState::Requesting;
        Some(Self {
            state,
            finished: false,
        })
    }

    fn transition(&self, next: CycleState) {
        let mut current = lock_state(self.state);
        debug!(from = ?*current, to = ?next, "app-open cycle transition");
        *current = next;
    }

    fn finish(mut self, last: CycleState) {
        self.transition(last);
        self.finished = true;
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *lock_state(self.state) = CycleState::Failed;
        }
    }
}

/// Drives app-open cycles: request, interpret, refresh localizations,
/// select an alert, persist sync state.
///
/// Owned by the host application; one instance per process.
pub struct UpdateCoordinator {
    config: Configuration,
    transport: Arc<dyn Transport>,
    presenter: Arc<dyn AlertPresenter>,
    localization: Option<Arc<dyn LocalizationRefresher>>,
    sync_store: SyncStateStore,
    alert: AlertInProgress,
    init: AsyncMutex<InitState>,
    cycle: Mutex<CycleState>,
}

impl UpdateCoordinator {
    pub fn new(config: Configuration, collaborators: Collaborators) -> Self {
        Self {
            config,
            transport: collaborators.transport,
            presenter: collaborators.presenter,
            localization: collaborators.localization,
            sync_store: SyncStateStore::new(collaborators.store),
            alert: AlertInProgress::new(),
            init: AsyncMutex::new(InitState::Created),
            cycle: Mutex::new(CycleState::Idle),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Shared handle to the alert flag, for presenters and hosts.
    pub fn alert_in_progress(&self) -> AlertInProgress {
        self.alert.clone()
    }

    pub fn cycle_state(&self) -> CycleState {
        *lock_state(&self.cycle)
    }

    pub async fn init_state(&self) -> InitState {
        self.init.lock().await.clone()
    }

    pub async fn sync_state(&self) -> Result<SyncState, StoreError> {
        self.sync_store.load(&self.config.app_version).await
    }

    pub async fn reset_sync_state(&self) -> Result<(), StoreError> {
        self.sync_store.reset().await
    }

    /// Validate the configuration, resolve the device guid and, when
    /// configured for it, run the first cycle.
    ///
    /// `launch_options` are the keys the host was launched with; any key in
    /// `avoid_update_launch_keys` suppresses the on-start cycle.
    pub async fn start<S: AsRef<str>>(
        &self,
        launch_options: &[S],
    ) -> Result<Option<CycleOutcome>, SyncError> {
        self.config.validate().map_err(ConfigurationError::from)?;
        {
            let mut init = self.init.lock().await;
            if let InitState::Started { .. } = *init {
                error!(
                    "NStack is already configured. \
                     Kill the app and start it again with new configuration."
                );
                return Err(ConfigurationError::AlreadyStarted.into());
            }
            let guid = self.resolve_guid().await?;
            *init = InitState::Started { guid };
        }
        info!(
            app_id = %self.config.app_id,
            version = %self.config.app_version,
            environment = %self.config.environment,
            "NStack started"
        );

        let avoided = launch_options.iter().any(|option| {
            self.config
                .avoid_update_launch_keys
                .iter()
                .any(|key| key == option.as_ref())
        });
        if !self.config.updates_on_start() || avoided {
            debug!(avoided, "skipping app-open cycle on start");
            return Ok(None);
        }
        self.update().await.map(Some)
    }

    /// Host hook for the application becoming active.
    pub async fn on_did_become_active(&self) -> Result<Option<CycleOutcome>, SyncError> {
        if !self.config.updates_on_did_become_active() {
            return Ok(None);
        }
        self.update()
            .await
            .map(Some)
            .inspect_err(|e| error!(error = %e, "Error updating NStack on did become active"))
    }

    /// Run one app-open cycle.
    ///
    /// Returns [`CycleOutcome::Skipped`] without touching the network when a
    /// cycle is already in flight. Failures are not retried.
    pub async fn update(&self) -> Result<CycleOutcome, SyncError> {
        let guid = match &*self.init.lock().await {
            InitState::Started { guid } => guid.clone(),
            InitState::Created => {
                warn!("{}", ConfigurationError::NotStarted);
                return Err(ConfigurationError::NotStarted.into());
            }
        };

        let Some(guard) = CycleGuard::try_acquire(&self.cycle) else {
            debug!("app-open cycle already in flight, dropping trigger");
            return Ok(CycleOutcome::Skipped);
        };

        match self.run_cycle(&guard, &guid).await {
            Ok(report) => {
                guard.finish(CycleState::Done);
                info!(
                    alert = ?report.alert.as_ref().map(AlertDecision::kind),
                    localization_refreshed = report.localization_refreshed,
                    field_errors = report.field_errors.len(),
                    "app-open cycle done"
                );
                Ok(CycleOutcome::Completed(report))
            }
            Err(e) => {
                guard.finish(CycleState::Failed);
                warn!(error = %e, "app-open cycle failed");
                Err(e)
            }
        }
    }

    async fn run_cycle(
        &self,
        guard: &CycleGuard<'_>,
        guid: &str,
    ) -> Result<CycleReport, SyncError> {
        let sync_state = self.sync_store.load(&self.config.app_version).await?;
        let request = build_request(&self.config, &sync_state, guid)?;
        let url = app_open_url(&self.config);
        debug!(%url, version = request.reported_version(), "posting app open");
        let raw = self
            .transport
            .post(&url, &request.to_params(), &request.headers(&self.config))
            .await?;

        guard.transition(CycleState::Interpreting);
        let response = interpret(&raw)?;
        for field_error in &response.field_errors {
            warn!(
                field = %field_error.field,
                reason = %field_error.reason,
                "ignoring malformed app-open field"
            );
        }

        guard.transition(CycleState::Deciding);
        let forced = should_force_localization_refresh(
            &sync_state,
            &self.config.app_version,
            request.accept_language.as_deref(),
        );
        let (localization_refreshed, localization_error) =
            self.refresh_localizations(&response, forced).await;
        let (alert, alert_suppressed) = self.select_and_present(&response).await;

        // The previous version only advances when selection actually ran.
        let synced_at = now();
        self.sync_store
            .commit_cycle(
                synced_at,
                request.accept_language.as_deref(),
                (!alert_suppressed).then_some(self.config.app_version.as_str()),
            )
            .await?;

        Ok(CycleReport {
            alert,
            alert_suppressed,
            forced_localization_refresh: forced,
            localization_refreshed,
            localization_error,
            field_errors: response.field_errors,
            synced_at,
        })
    }

    async fn refresh_localizations(
        &self,
        response: &AppOpenResponse,
        forced: bool,
    ) -> (bool, Option<LocalizationRefreshError>) {
        let manifest = &response.localization_manifest;
        if !forced && manifest.is_empty() {
            return (false, None);
        }
        let Some(refresher) = &self.localization else {
            debug!("no localization refresher configured");
            return (false, None);
        };

        debug!(forced, entries = manifest.len(), "refreshing localizations");
        match refresher.refresh(manifest, forced).await {
            Ok(()) => (true, None),
            Err(e) => {
                warn!(error = %e, "localization refresh failed, continuing with alerts");
                (false, Some(e))
            }
        }
    }

    /// Returns the presented decision and whether selection was suppressed.
    async fn select_and_present(
        &self,
        response: &AppOpenResponse,
    ) -> (Option<AlertDecision>, bool) {
        if self.alert.is_showing() {
            debug!("alert already showing, skipping alert selection");
            return (None, true);
        }

        let decision = select_alert(response, false);
        if let Some(decision) = &decision {
            if !self.alert.begin() {
                return (None, true);
            }
            info!(kind = ?decision.kind(), "presenting alert");
            present(self.presenter.as_ref(), decision, self.alert.clone()).await;
        }
        (decision, false)
    }

    async fn resolve_guid(&self) -> Result<String, StoreError> {
        if let Some(guid) = self.config.guid.as_ref().filter(|g| !g.trim().is_empty()) {
            return Ok(guid.clone());
        }
        if let Some(guid) = self.sync_store.guid().await? {
            return Ok(guid);
        }
        let guid = uuid::Uuid::new_v4().to_string();
        self.sync_store.set_guid(&guid).await?;
        debug!(%guid, "generated device guid");
        Ok(guid)
    }
}
