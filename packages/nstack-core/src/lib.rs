//! App-open synchronization: request, interpretation, alert selection
//! and the coordinator that ties them together.

pub mod alert;
pub mod collaborators;
pub mod coordinator;
pub mod delta;
pub mod error;
pub mod model;
pub mod request;
pub mod response;
pub mod sync_state;

pub use alert::{select_alert, AlertDecision, AlertInProgress, AlertKind};
pub use collaborators::{present, AlertPresenter, LocalizationRefresher, Transport};
pub use coordinator::{
    Collaborators, CycleOutcome, CycleReport, CycleState, InitState, UpdateCoordinator,
};
pub use delta::should_force_localization_refresh;
pub use error::{
    ConfigurationError, LocalizationRefreshError, MalformedResponseError, SyncError,
    TransportError,
};
pub use model::{
    Changelog, LanguageDescriptor, LocalizationDescriptor, Message, NewerVersion, RateReminder,
    RateReminderAnswer, ShowSetting, UpdateInfo, UpdateState,
};
pub use request::{app_open_url, build_request, default_headers, AppOpenRequest};
pub use response::{interpret, AppOpenResponse};
pub use sync_state::{SyncState, SyncStateStore};
