use crate::alert::{AlertDecision, AlertInProgress};
use crate::error::{LocalizationRefreshError, TransportError};
use crate::model::{Changelog, LocalizationDescriptor, Message, NewerVersion, RateReminder};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};

/// Network access used by the SDK. Must support concurrent requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        params: &BTreeMap<String, String>,
        headers: &HashMap<String, String>,
    ) -> Result<Bytes, TransportError>;

    async fn get(&self, url: &str, headers: &HashMap<String, String>)
        -> Result<Bytes, TransportError>;
}

/// Refetches translations described by a localization manifest.
#[async_trait]
pub trait LocalizationRefresher: Send + Sync {
    /// `forced` asks for a refetch of every entry regardless of its
    /// `should_update` flag.
    async fn refresh(
        &self,
        manifest: &[LocalizationDescriptor],
        forced: bool,
    ) -> Result<(), LocalizationRefreshError>;
}

/// Shows alerts to the user.
///
/// Each call receives the shared [`AlertInProgress`] flag; the presenter
/// must call [`AlertInProgress::dismiss`] once the user closes the alert.
#[async_trait]
pub trait AlertPresenter: Send + Sync {
    async fn present_update(&self, update: &NewerVersion, alert: AlertInProgress);

    async fn present_whats_new(&self, changelog: &Changelog, alert: AlertInProgress);

    async fn present_message(&self, message: &Message, alert: AlertInProgress);

    async fn present_rate_reminder(&self, reminder: &RateReminder, alert: AlertInProgress);
}

/// Route a decision to the matching presenter entry point.
pub async fn present(
    presenter: &dyn AlertPresenter,
    decision: &AlertDecision,
    alert: AlertInProgress,
) {
    match decision {
        AlertDecision::Update(update) => presenter.present_update(update, alert).await,
        AlertDecision::WhatsNew(changelog) => presenter.present_whats_new(changelog, alert).await,
        AlertDecision::Message(message) => presenter.present_message(message, alert).await,
        AlertDecision::RateReminder(reminder) => {
            presenter.present_rate_reminder(reminder, alert).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingPresenter {
        updates: AtomicUsize,
        whats_new: AtomicUsize,
        messages: AtomicUsize,
        reminders: AtomicUsize,
    }

    #[async_trait]
    impl AlertPresenter for CountingPresenter {
        async fn present_update(&self, _update: &NewerVersion, _alert: AlertInProgress) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }

        async fn present_whats_new(&self, _changelog: &Changelog, _alert: AlertInProgress) {
            self.whats_new.fetch_add(1, Ordering::SeqCst);
        }

        async fn present_message(&self, _message: &Message, alert: AlertInProgress) {
            self.messages.fetch_add(1, Ordering::SeqCst);
            alert.dismiss();
        }

        async fn present_rate_reminder(&self, _reminder: &RateReminder, _alert: AlertInProgress) {
            self.reminders.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_present_routes_by_kind() {
        let presenter = Arc::new(CountingPresenter::default());
        let alert = AlertInProgress::new();

        let decisions = [
            AlertDecision::Update(NewerVersion::new("2.0")),
            AlertDecision::WhatsNew(Changelog::default()),
            AlertDecision::RateReminder(RateReminder::default()),
        ];
        for decision in &decisions {
            present(presenter.as_ref(), decision, alert.clone()).await;
        }

        assert_eq!(presenter.updates.load(Ordering::SeqCst), 1);
        assert_eq!(presenter.whats_new.load(Ordering::SeqCst), 1);
        assert_eq!(presenter.reminders.load(Ordering::SeqCst), 1);
        assert_eq!(presenter.messages.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_presenter_clears_flag_on_dismiss() {
        let presenter = CountingPresenter::default();
        let alert = AlertInProgress::new();
        assert!(alert.begin());

        let message = Message {
            id: 9,
            message: "Maintenance tonight".to_string(),
            url: None,
            show_setting: Default::default(),
        };
        present(&presenter, &AlertDecision::Message(message), alert.clone()).await;
        assert!(!alert.is_showing());
    }
}
