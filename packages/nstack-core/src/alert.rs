use crate::model::{Changelog, Message, NewerVersion, RateReminder};
use crate::response::AppOpenResponse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The single alert chosen for a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertDecision {
    Update(NewerVersion),
    WhatsNew(Changelog),
    Message(Message),
    RateReminder(RateReminder),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Update,
    WhatsNew,
    Message,
    RateReminder,
}

impl AlertDecision {
    pub fn kind(&self) -> AlertKind {
        match self {
            AlertDecision::Update(_) => AlertKind::Update,
            AlertDecision::WhatsNew(_) => AlertKind::WhatsNew,
            AlertDecision::Message(_) => AlertKind::Message,
            AlertDecision::RateReminder(_) => AlertKind::RateReminder,
        }
    }
}

/// Pick at most one alert, by fixed priority: newer version, what's new,
/// message, rate reminder. Nothing is picked while another alert is showing;
/// the losing signals are dropped, not queued.
pub fn select_alert(response: &AppOpenResponse, already_showing: bool) -> Option<AlertDecision> {
    if already_showing {
        return None;
    }

    let update = response.update.as_ref();
    if let Some(newer_version) = update.and_then(|u| u.newer_version.as_ref()) {
        return Some(AlertDecision::Update(newer_version.clone()));
    }
    if let Some(changelog) = update.and_then(|u| u.new_in_version.as_ref()) {
        return Some(AlertDecision::WhatsNew(changelog.clone()));
    }
    if let Some(message) = &response.message {
        return Some(AlertDecision::Message(message.clone()));
    }
    response
        .rate_reminder
        .as_ref()
        .map(|reminder| AlertDecision::RateReminder(reminder.clone()))
}

/// Process-wide "an alert is on screen" flag.
///
/// Set by the coordinator when it presents an alert, cleared by the
/// presenter when the user dismisses it. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct AlertInProgress {
    showing: Arc<AtomicBool>,
}

impl AlertInProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_showing(&self) -> bool {
        self.showing.load(Ordering::SeqCst)
    }

    /// Returns `false` if an alert was already showing.
    pub fn begin(&self) -> bool {
        self.showing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn dismiss(&self) {
        self.showing.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UpdateInfo;

    fn message() -> Message {
        Message {
            id: 1,
            message: "Hello".to_string(),
            url: None,
            show_setting: Default::default(),
        }
    }

    fn full_response() -> AppOpenResponse {
        AppOpenResponse {
            update: Some(UpdateInfo {
                newer_version: Some(NewerVersion::new("1.2.0")),
                new_in_version: Some(Changelog::default()),
            }),
            message: Some(message()),
            rate_reminder: Some(RateReminder::default()),
            ..Default::default()
        }
    }

    #[test]
    fn test_priority_order() {
        let mut response = full_response();
        assert_eq!(select_alert(&response, false).unwrap().kind(), AlertKind::Update);

        response.update.as_mut().unwrap().newer_version = None;
        assert_eq!(select_alert(&response, false).unwrap().kind(), AlertKind::WhatsNew);

        response.update = None;
        assert_eq!(select_alert(&response, false).unwrap().kind(), AlertKind::Message);

        response.message = None;
        assert_eq!(
            select_alert(&response, false).unwrap().kind(),
            AlertKind::RateReminder
        );

        response.rate_reminder = None;
        assert!(select_alert(&response, false).is_none());
    }

    #[test]
    fn test_every_pair_picks_earliest_rule() {
        let kinds = [
            AlertKind::Update,
            AlertKind::WhatsNew,
            AlertKind::Message,
            AlertKind::RateReminder,
        ];
        for mask in 0u8..16 {
            let response = AppOpenResponse {
                update: (mask & 0b0011 != 0).then(|| UpdateInfo {
                    newer_version: (mask & 0b0001 != 0).then(|| NewerVersion::new("2.0")),
                    new_in_version: (mask & 0b0010 != 0).then(Changelog::default),
                }),
                message: (mask & 0b0100 != 0).then(message),
                rate_reminder: (mask & 0b1000 != 0).then(RateReminder::default),
                ..Default::default()
            };
            let expected = (0..4).find(|bit| mask & (1 << bit) != 0).map(|bit| kinds[bit]);
            assert_eq!(
                select_alert(&response, false).map(|d| d.kind()),
                expected,
                "mask {:04b}",
                mask
            );
        }
    }

    #[test]
    fn test_already_showing_suppresses_everything() {
        assert!(select_alert(&full_response(), true).is_none());
        assert!(select_alert(&AppOpenResponse::default(), true).is_none());
    }

    #[test]
    fn test_update_decision_carries_payload() {
        match select_alert(&full_response(), false) {
            Some(AlertDecision::Update(newer)) => assert_eq!(newer.version, "1.2.0"),
            other => panic!("unexpected decision {:?}", other),
        }
    }

    #[test]
    fn test_alert_flag() {
        let flag = AlertInProgress::new();
        let shared = flag.clone();
        assert!(!flag.is_showing());
        assert!(flag.begin());
        assert!(shared.is_showing());
        assert!(!shared.begin());
        shared.dismiss();
        assert!(!flag.is_showing());
    }
}
