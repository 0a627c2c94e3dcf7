use crate::client::{select_key, NStackClient};
use crate::error::ClientError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// A content response is addressed by numeric id or by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRef {
    Id(i64),
    Slug(String),
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentRef::Id(id) => write!(f, "{}", id),
            ContentRef::Slug(slug) => f.write_str(slug),
        }
    }
}

impl From<i64> for ContentRef {
    fn from(id: i64) -> Self {
        ContentRef::Id(id)
    }
}

impl From<&str> for ContentRef {
    fn from(slug: &str) -> Self {
        ContentRef::Slug(slug.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct Validation {
    ok: bool,
}

impl NStackClient {
    /// Raw content of a response made on the web console.
    pub async fn content_response(
        &self,
        content: impl Into<ContentRef>,
        key: Option<&str>,
    ) -> Result<Value, ClientError> {
        let path = format!("content/responses/{}", content.into());
        let data: Value = self.get_data(&path).await?;
        select_key(&path, data, key)
    }

    pub async fn static_response<T: DeserializeOwned>(&self, slug: &str) -> Result<T, ClientError> {
        self.get_data(&format!("content/responses/{}", slug)).await
    }

    pub async fn collection<T: DeserializeOwned>(
        &self,
        id: i64,
        max_entries: usize,
    ) -> Result<T, ClientError> {
        self.get_data(&format!("content/collections/{}/items?limit={}", id, max_entries))
            .await
    }

    pub async fn validate_email(&self, email: &str) -> Result<bool, ClientError> {
        let validation: Validation = self
            .get_data(&format!("validator/email?email={}", urlencoding::encode(email)))
            .await?;
        Ok(validation.ok)
    }
}
