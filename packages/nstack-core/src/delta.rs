use crate::sync_state::SyncState;
use nstack_utils::Version;

/// Whether cached localizations must be refetched regardless of the
/// manifest's `should_update` flags.
///
/// True when `current_version` is semantically newer than the last version
/// that completed a cycle, or when the accept-language differs from the one
/// used at the last successful sync. A stored accept-language of `None`
/// always counts as different. Malformed versions never force a refresh.
pub fn should_force_localization_refresh(
    stored: &SyncState,
    current_version: &str,
    current_accept_language: Option<&str>,
) -> bool {
    version_changed(&stored.previous_app_version, current_version)
        || accept_language_changed(
            stored.last_accept_language_used.as_deref(),
            current_accept_language,
        )
}

fn version_changed(previous: &str, current: &str) -> bool {
    Version::new(current).is_newer_than(&Version::new(previous))
}

fn accept_language_changed(stored: Option<&str>, current: Option<&str>) -> bool {
    match stored {
        None => true,
        Some(stored) => current != Some(stored),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(previous: &str, accept_language: Option<&str>) -> SyncState {
        let mut state = SyncState::fresh("0.0.0");
        state.previous_app_version = previous.to_string();
        state.last_accept_language_used = accept_language.map(str::to_string);
        state
    }

    #[test]
    fn test_version_bump_forces_refresh() {
        let stored = state("1.0.0", Some("en"));
        assert!(should_force_localization_refresh(&stored, "1.1.0", Some("en")));
        assert!(should_force_localization_refresh(&stored, "1.0.1", Some("en")));
    }

    #[test]
    fn test_same_or_older_version_does_not_force() {
        let stored = state("1.1.0", Some("en"));
        assert!(!should_force_localization_refresh(&stored, "1.1.0", Some("en")));
        assert!(!should_force_localization_refresh(&stored, "1.0.9", Some("en")));
        assert!(!should_force_localization_refresh(&stored, "1.1", Some("en")));
    }

    #[test]
    fn test_comparison_is_semantic() {
        let stored = state("1.9.0", Some("en"));
        assert!(should_force_localization_refresh(&stored, "1.10.0", Some("en")));
        let stored = state("1.10.0", Some("en"));
        assert!(!should_force_localization_refresh(&stored, "1.9.0", Some("en")));
    }

    #[test]
    fn test_accept_language_change_forces_regardless_of_version() {
        let stored = state("2.0.0", Some("en"));
        assert!(should_force_localization_refresh(&stored, "2.0.0", Some("da-DK")));
        assert!(should_force_localization_refresh(&stored, "1.0.0", Some("da-DK")));
        assert!(should_force_localization_refresh(&stored, "2.0.0", None));
    }

    #[test]
    fn test_unknown_stored_accept_language_forces() {
        let stored = state("2.0.0", None);
        assert!(should_force_localization_refresh(&stored, "2.0.0", Some("en")));
        assert!(should_force_localization_refresh(&stored, "2.0.0", None));
    }

    #[test]
    fn test_malformed_versions_never_force() {
        let stored = state("garbage", Some("en"));
        assert!(!should_force_localization_refresh(&stored, "1.0.0", Some("en")));
        let stored = state("1.0.0", Some("en"));
        assert!(!should_force_localization_refresh(&stored, "", Some("en")));
        assert!(!should_force_localization_refresh(&stored, "dev-build", Some("en")));
    }

    #[test]
    fn test_version_result_independent_of_language_equality() {
        for (previous, current, expected) in [
            ("1.0.0", "1.1.0", true),
            ("1.1.0", "1.0.0", false),
            ("2.0", "2.0.0", false),
            ("0.9.9", "1.0.0", true),
        ] {
            let stored = state(previous, Some("en"));
            assert_eq!(
                should_force_localization_refresh(&stored, current, Some("en")),
                expected,
                "{} -> {}",
                previous,
                current
            );
        }
    }
}
