use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Filament state as reported by the plugin backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilamentStatus {
    Present,
    Absent,
    #[default]
    Unknown,
    Error,
}

impl FilamentStatus {
    /// Map the backend's `status` string. Anything but the two known values is `Unknown`.
    pub fn from_reported(raw: Option<&str>) -> Self {
        match raw {
            Some("present") => FilamentStatus::Present,
            Some("absent") => FilamentStatus::Absent,
            _ => FilamentStatus::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilamentStatus::Present => "present",
            FilamentStatus::Absent => "absent",
            FilamentStatus::Unknown => "unknown",
            FilamentStatus::Error => "error",
        }
    }

    pub fn presentation(self) -> Presentation {
        Presentation::for_status(self)
    }
}

impl fmt::Display for FilamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicator glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Check,
    Cross,
    WarningTriangle,
    QuestionMark,
}

impl Icon {
    pub fn name(self) -> &'static str {
        match self {
            Icon::Check => "check",
            Icon::Cross => "cross",
            Icon::WarningTriangle => "warning-triangle",
            Icon::QuestionMark => "question-mark",
        }
    }

    /// Font Awesome class used by the navbar template.
    pub fn css_class(self) -> &'static str {
        match self {
            Icon::Check => "fa fa-check",
            Icon::Cross => "fa fa-times",
            Icon::WarningTriangle => "fa fa-exclamation-triangle",
            Icon::QuestionMark => "fa fa-question-circle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorColor {
    Green,
    Red,
    Orange,
    Gray,
}

impl IndicatorColor {
    pub fn name(self) -> &'static str {
        match self {
            IndicatorColor::Green => "green",
            IndicatorColor::Red => "red",
            IndicatorColor::Orange => "orange",
            IndicatorColor::Gray => "gray",
        }
    }
}

/// The (icon, color) pair driving the visual indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Presentation {
    pub icon: Icon,
    pub color: IndicatorColor,
}

impl Presentation {
    pub const fn new(icon: Icon, color: IndicatorColor) -> Self {
        Self { icon, color }
    }

    pub fn for_status(status: FilamentStatus) -> Self {
        match status {
            FilamentStatus::Present => Self::new(Icon::Check, IndicatorColor::Green),
            FilamentStatus::Absent => Self::new(Icon::Cross, IndicatorColor::Red),
            FilamentStatus::Error => Self::new(Icon::WarningTriangle, IndicatorColor::Orange),
            FilamentStatus::Unknown => Self::new(Icon::QuestionMark, IndicatorColor::Gray),
        }
    }
}

/// Body of the plugin status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusPayload {
    pub status: Option<String>,
}

impl StatusPayload {
    /// Non-string or missing `status` fields read as `None`.
    pub fn from_value(value: &Value) -> Self {
        Self {
            status: value
                .get("status")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        }
    }

    pub fn filament_status(&self) -> FilamentStatus {
        FilamentStatus::from_reported(self.status.as_deref())
    }
}

/// Observable state published to subscribers after every applied response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub status: FilamentStatus,
    /// Text shown next to the icon.
    pub label: String,
    /// Sequence number of the request that produced this snapshot.
    pub sequence: u64,
    /// `None` until the first response has been applied.
    pub updated_at: Option<DateTime<Utc>>,
}

pub const PENDING_LABEL: &str = "...";

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            status: FilamentStatus::Unknown,
            label: PENDING_LABEL.to_string(),
            sequence: 0,
            updated_at: None,
        }
    }
}

impl StatusSnapshot {
    pub fn presentation(&self) -> Presentation {
        self.status.presentation()
    }

    /// True once any response (or failure) has been applied.
    pub fn is_loaded(&self) -> bool {
        self.updated_at.is_some()
    }
}
