use crate::error::MalformedResponseError;
use crate::model::{LocalizationDescriptor, Message, RateReminder, UpdateInfo};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Signals bundled in an app-open response.
///
/// The slots are independent of each other; any subset may be present.
/// Fields that were present but could not be decoded are listed in
/// `field_errors` instead of failing the whole response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppOpenResponse {
    pub update: Option<UpdateInfo>,
    pub message: Option<Message>,
    pub rate_reminder: Option<RateReminder>,
    pub localization_manifest: Vec<LocalizationDescriptor>,
    pub count: Option<u64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub field_errors: Vec<MalformedResponseError>,
}

/// Decode a raw app-open payload.
///
/// Only an unreadable body or a missing `data` object fails; everything
/// below that is decoded field by field.
pub fn interpret(raw: &[u8]) -> Result<AppOpenResponse, MalformedResponseError> {
    let body: Value =
        serde_json::from_slice(raw).map_err(|e| MalformedResponseError::new("body", e))?;
    let data = match body.get("data") {
        Some(Value::Object(data)) => data,
        Some(_) => return Err(MalformedResponseError::new("data", "expected an object")),
        None => return Err(MalformedResponseError::new("data", "missing")),
    };

    let mut errors = Vec::new();
    let response = AppOpenResponse {
        update: decode_update(data, &mut errors),
        message: decode_field(data, "message", &mut errors),
        rate_reminder: decode_field(data, "rate_reminder", &mut errors),
        localization_manifest: decode_manifest(data, &mut errors),
        count: decode_field(data, "count", &mut errors),
        last_updated: decode_field(data, "last_updated", &mut errors),
        field_errors: errors,
    };
    Ok(response)
}

fn present<'a>(data: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|value| !value.is_null())
}

fn decode_value<T: DeserializeOwned>(
    value: &Value,
    field: &str,
    errors: &mut Vec<MalformedResponseError>,
) -> Option<T> {
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            errors.push(MalformedResponseError::new(field, e));
            None
        }
    }
}

fn decode_field<T: DeserializeOwned>(
    data: &Map<String, Value>,
    key: &str,
    errors: &mut Vec<MalformedResponseError>,
) -> Option<T> {
    present(data, key).and_then(|value| decode_value(value, key, errors))
}

fn decode_update(
    data: &Map<String, Value>,
    errors: &mut Vec<MalformedResponseError>,
) -> Option<UpdateInfo> {
    let update = match present(data, "update")? {
        Value::Object(update) => update,
        _ => {
            errors.push(MalformedResponseError::new("update", "expected an object"));
            return None;
        }
    };

    let info = UpdateInfo {
        newer_version: present(update, "newer_version")
            .and_then(|value| decode_value(value, "update.newer_version", errors)),
        new_in_version: present(update, "new_in_version")
            .and_then(|value| decode_value(value, "update.new_in_version", errors)),
    };
    (!info.is_empty()).then_some(info)
}

fn decode_manifest(
    data: &Map<String, Value>,
    errors: &mut Vec<MalformedResponseError>,
) -> Vec<LocalizationDescriptor> {
    match present(data, "localize") {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                decode_value(entry, &format!("localize[{}]", index), errors)
            })
            .collect(),
        Some(_) => {
            errors.push(MalformedResponseError::new("localize", "expected an array"));
            Vec::new()
        }
    }
}
