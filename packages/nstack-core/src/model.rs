use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How strongly the service wants the user to move to a newer version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateState {
    #[default]
    Yes,
    Remind,
    Force,
}

impl UpdateState {
    pub fn is_mandatory(&self) -> bool {
        matches!(self, UpdateState::Force)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTranslations {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "positiveBtn", default)]
    pub positive_button: String,
    #[serde(rename = "negativeBtn", default)]
    pub negative_button: String,
}

/// A newer version than the running one is available.
///
/// The service sends either a bare version string or a full object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NewerVersionRepr")]
pub struct NewerVersion {
    pub state: UpdateState,
    pub last_id: i64,
    pub version: String,
    pub link: Option<String>,
    pub translate: UpdateTranslations,
}

impl NewerVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn is_mandatory(&self) -> bool {
        self.state.is_mandatory()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NewerVersionRepr {
    Bare(String),
    Full {
        #[serde(default)]
        state: UpdateState,
        #[serde(default)]
        last_id: i64,
        version: String,
        #[serde(default)]
        link: Option<String>,
        #[serde(default)]
        translate: UpdateTranslations,
    },
}

impl From<NewerVersionRepr> for NewerVersion {
    fn from(value: NewerVersionRepr) -> Self {
        match value {
            NewerVersionRepr::Bare(version) => NewerVersion::new(version),
            NewerVersionRepr::Full {
                state,
                last_id,
                version,
                link,
                translate,
            } => NewerVersion {
                state,
                last_id,
                version,
                link,
                translate,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogTranslations {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
}

/// "What's new" in the version the user is running now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changelog {
    #[serde(default)]
    pub state: UpdateState,
    pub last_id: i64,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub translate: ChangelogTranslations,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub newer_version: Option<NewerVersion>,
    pub new_in_version: Option<Changelog>,
}

impl UpdateInfo {
    pub fn is_empty(&self) -> bool {
        self.newer_version.is_none() && self.new_in_version.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowSetting {
    #[default]
    ShowOnce,
    ShowAlways,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub message: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub show_setting: ShowSetting,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateReminder {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub yes_btn: String,
    #[serde(default)]
    pub later_btn: String,
    #[serde(default)]
    pub no_btn: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// The user's answer to a rate reminder, reported back to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateReminderAnswer {
    Positive,
    Negative,
    Later,
}

impl RateReminderAnswer {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateReminderAnswer::Positive => "positive",
            RateReminderAnswer::Negative => "negative",
            RateReminderAnswer::Later => "later",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDescriptor {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub locale: String,
    #[serde(default)]
    pub direction: String,
    #[serde(rename = "Accept-Language", default)]
    pub accept_language: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_best_fit: bool,
}

/// One entry of the localization manifest sent on app open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizationDescriptor {
    pub id: i64,
    pub url: String,
    pub last_updated_at: DateTime<Utc>,
    #[serde(default)]
    pub should_update: bool,
    pub language: LanguageDescriptor,
}
