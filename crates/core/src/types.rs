use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::link::extract_video_id;

/// A video link the user submitted, with its 11-character identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    pub id: String,
    pub url: String,
}

impl VideoReference {
    /// Parse user input into a reference. Returns `None` when no video identifier is found.
    pub fn parse(input: &str) -> Option<Self> {
        let id = extract_video_id(input)?;
        Some(Self {
            id,
            url: input.to_string(),
        })
    }
}

/// One field of a clip exactly as the model sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClipValue {
    Number(f64),
    Text(String),
    Other(Value),
}

impl ClipValue {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map_or_else(|| Self::Other(value.clone()), Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Other(other.clone()),
        }
    }

    /// Numeric reading of the value. Text holding a number counts, e.g. `"12"`.
    pub fn as_seconds(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok().filter(|n: &f64| n.is_finite()),
            Self::Other(_) => None,
        }
    }
}

impl std::fmt::Display for ClipValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

/// Render an optional field; a field the model left out renders empty.
pub fn field_text(value: &Option<ClipValue>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// A suggested segment of the source video.
///
/// Every field keeps what the model sent, whatever its JSON type. Only fields the model
/// left out are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Clip {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<ClipValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<ClipValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<ClipValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<ClipValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ClipValue>,
}

impl Clip {
    pub fn new(start: f64, end: f64, title: &str, description: &str) -> Self {
        Self {
            start: Some(ClipValue::Number(start)),
            end: Some(ClipValue::Number(end)),
            title: Some(ClipValue::Text(title.to_string())),
            description: Some(ClipValue::Text(description.to_string())),
            reason: None,
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).map(ClipValue::from_value);

        Self {
            start: field("start"),
            end: field("end"),
            title: field("title"),
            description: field("description"),
            reason: field("reason"),
        }
    }

    pub fn start_seconds(&self) -> Option<f64> {
        self.start.as_ref()?.as_seconds()
    }

    pub fn end_seconds(&self) -> Option<f64> {
        self.end.as_ref()?.as_seconds()
    }

    pub fn title_text(&self) -> String {
        field_text(&self.title)
    }

    pub fn description_text(&self) -> String {
        field_text(&self.description)
    }

    /// Length in seconds when both ends read as numbers. Not clamped: model output may
    /// put `end` before `start`.
    pub fn duration(&self) -> Option<f64> {
        Some(self.end_seconds()? - self.start_seconds()?)
    }
}

impl<'de> Deserialize<'de> for Clip {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Clip::from_value(&value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub clips: Vec<Clip>,
    #[serde(
        rename = "peakMoment",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub peak_moment: Option<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

/// Where a session currently is. Transitions are strictly
/// `Idle -> Downloading -> FetchingComments -> Analyzing -> Completed | Error`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    #[default]
    Idle,
    /// Simulated: nothing is downloaded.
    Downloading,
    /// Simulated: no comments are fetched.
    FetchingComments,
    Analyzing,
    Completed,
    Error,
}

impl SessionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Ready",
            SessionPhase::Downloading => "Downloading video...",
            SessionPhase::FetchingComments => "Analyzing comments...",
            SessionPhase::Analyzing => "Scanning viral moments with Gemini...",
            SessionPhase::Completed => "Analysis completed",
            SessionPhase::Error => "An error occurred",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Error)
    }

    /// Phases during which a new analysis must not be started and edits do not reset state.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionPhase::Downloading | SessionPhase::FetchingComments | SessionPhase::Analyzing
        )
    }
}
