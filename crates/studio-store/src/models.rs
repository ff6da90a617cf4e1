//! Persisted record types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::defaults;

/// One of the four fixed generation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StudioKind {
    #[default]
    Text,
    Code,
    Document,
    Creative,
}

impl StudioKind {
    pub const ALL: [StudioKind; 4] = [Self::Text, Self::Code, Self::Document, Self::Creative];

    /// Lowercase identifier used in storage and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Code => "code",
            Self::Document => "document",
            Self::Creative => "creative",
        }
    }
}

impl fmt::Display for StudioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error for an unrecognised studio id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown studio '{0}' (expected text, code, document or creative)")]
pub struct UnknownStudio(pub String);

impl FromStr for StudioKind {
    type Err = UnknownStudio;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStudio(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for StudioKind {
    // Stored records may carry an empty, null or foreign studio id; those
    // read back as the default studio instead of failing the whole record.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if raw.is_empty() {
            return Ok(Self::default());
        }
        Ok(raw.parse().unwrap_or_else(|e: UnknownStudio| {
            log::warn!("{}; treating as text", e);
            Self::default()
        }))
    }
}

/// Current time at the precision timestamps are stored with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A timestamp strictly after `previous`, normally the current time.
pub fn advance_from(previous: DateTime<Utc>) -> DateTime<Utc> {
    let current = now();
    if current > previous {
        current
    } else {
        previous + Duration::milliseconds(1)
    }
}

pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_status() -> String {
    defaults::PROJECT_STATUS.to_string()
}

/// Treat an explicit `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read a stored timestamp, falling back to the current time when it is
/// null, empty or unparseable. Epoch milliseconds are accepted too.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match &raw {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(|| {
        if let Some(value) = raw.filter(|v| !v.is_null() && v.as_str() != Some("")) {
            log::warn!("Unreadable project timestamp {}; using the current time", value);
        }
        now()
    }))
}

fn nullable_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default_status))
}

/// A saved generation: the source prompt, its output and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default)]
    pub studio: StudioKind,
    /// The prompt the content was generated from
    #[serde(default, deserialize_with = "nullable")]
    pub content: String,
    #[serde(default, deserialize_with = "nullable")]
    pub generated_text: String,
    #[serde(default, deserialize_with = "nullable")]
    pub created_by: String,
    #[serde(default = "now", deserialize_with = "lenient_timestamp")]
    pub created_date: DateTime<Utc>,
    #[serde(default = "now", deserialize_with = "lenient_timestamp")]
    pub updated_date: DateTime<Utc>,
    #[serde(default = "default_status", deserialize_with = "nullable_status")]
    pub status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Fields for a new project. `id` is generated when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub id: Option<String>,
    pub title: String,
    pub studio: StudioKind,
    pub content: String,
    pub generated_text: String,
    pub created_by: String,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl NewProject {
    pub(crate) fn into_project(self, timestamp: DateTime<Utc>) -> Project {
        Project {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(generate_id),
            title: self.title,
            studio: self.studio,
            content: self.content,
            generated_text: self.generated_text,
            created_by: self.created_by,
            created_date: timestamp,
            updated_date: timestamp,
            status: self
                .status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(default_status),
            tags: self.tags,
            metadata: self.metadata,
        }
    }
}

/// Partial update; `None` leaves a field untouched.
///
/// There is no way to change `id` or `created_date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub studio: Option<StudioKind>,
    pub content: Option<String>,
    pub generated_text: Option<String>,
    pub created_by: Option<String>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ProjectPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, project: &mut Project) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(studio) = self.studio {
            project.studio = studio;
        }
        if let Some(content) = self.content {
            project.content = content;
        }
        if let Some(generated_text) = self.generated_text {
            project.generated_text = generated_text;
        }
        if let Some(created_by) = self.created_by {
            project.created_by = created_by;
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(tags) = self.tags {
            project.tags = tags;
        }
        if let Some(metadata) = self.metadata {
            project.metadata = metadata;
        }
    }
}

/// Narrow a project listing by text and studio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    /// Case-insensitive substring of the title or prompt
    pub search: Option<String>,
    pub studio: Option<StudioKind>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        if let Some(studio) = self.studio {
            if project.studio != studio {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                project.title.to_lowercase().contains(&term)
                    || project.content.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}
