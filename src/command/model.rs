//! The canonical structured action produced by parsing a transcript
//!
//! Every parsing path - AI translation, deterministic fallback, site
//! strategies - compiles down to this one enum. The wire shape is the
//! translation contract: an internally tagged JSON object whose `action`
//! field selects the variant and whose remaining fields are camelCase.

use serde::{Deserialize, Serialize};

/// A resolved page action
///
/// Immutable once constructed. Only fields relevant to the action exist
/// on each variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Command {
    /// Move the viewport
    Scroll { direction: ScrollDirection },

    /// Traverse session history or change document location
    Navigate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<HistoryDirection>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },

    /// Activate a visible interactive element
    Click {
        #[serde(rename = "byText", default, skip_serializing_if = "Option::is_none")]
        by_text: Option<String>,
        #[serde(
            rename = "whichIndex",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        which_index: Option<usize>,
    },

    /// Write text into an editable field
    Type {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },

    /// Speak page content
    Read {
        #[serde(default)]
        target: ReadTarget,
        #[serde(
            rename = "whichIndex",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        which_index: Option<usize>,
    },

    /// Summarize page content and speak the result
    Summarize {
        #[serde(default)]
        target: ReadTarget,
        #[serde(
            rename = "whichIndex",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        which_index: Option<usize>,
    },

    /// In-document text search with wrap-around
    Find { query: String },

    /// Cancel any in-flight speech; nothing else
    Stop,

    /// Could not determine intent
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryDirection {
    Back,
    Forward,
}

/// What a read or summarize command draws its text from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadTarget {
    /// The user's current text selection
    Selection,
    /// A single paragraph, addressed by zero-based index
    Paragraph,
    /// The page's primary content
    #[default]
    Page,
}

impl Command {
    /// Convenience: click the element whose label contains the text
    pub fn click_text(text: impl Into<String>) -> Self {
        Self::Click {
            by_text: Some(text.into()),
            which_index: None,
        }
    }

    /// Convenience: click by position in the visible candidate set
    pub fn click_index(index: usize) -> Self {
        Self::Click {
            by_text: None,
            which_index: Some(index),
        }
    }

    /// Convenience: navigate to an absolute URL
    pub fn navigate_url(url: impl Into<String>) -> Self {
        Self::Navigate {
            to: None,
            url: Some(url.into()),
        }
    }

    /// Convenience: traverse session history
    pub fn navigate_history(direction: HistoryDirection) -> Self {
        Self::Navigate {
            to: Some(direction),
            url: None,
        }
    }

    /// The wire-level action name, for logs and stage traces
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scroll { .. } => "scroll",
            Self::Navigate { .. } => "navigate",
            Self::Click { .. } => "click",
            Self::Type { .. } => "type",
            Self::Read { .. } => "read",
            Self::Summarize { .. } => "summarize",
            Self::Find { .. } => "find",
            Self::Stop => "stop",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip_identity() {
        let commands = vec![
            Command::Scroll {
                direction: ScrollDirection::Down,
            },
            Command::navigate_url("https://example.com"),
            Command::navigate_history(HistoryDirection::Back),
            Command::Click {
                by_text: Some("contact".into()),
                which_index: Some(1),
            },
            Command::Type {
                text: "hello".into(),
                target: Some("search".into()),
            },
            Command::Read {
                target: ReadTarget::Paragraph,
                which_index: Some(2),
            },
            Command::Summarize {
                target: ReadTarget::Page,
                which_index: None,
            },
            Command::Find {
                query: "pricing".into(),
            },
            Command::Stop,
            Command::Unknown,
        ];

        for command in commands {
            let json = serde_json::to_string(&command).unwrap();
            let back: Command = serde_json::from_str(&json).unwrap();
            assert_eq!(command, back, "round trip changed {}", json);
        }
    }

    #[test]
    fn test_tag_only_variants() {
        let stop: Command = serde_json::from_str(r#"{"action":"stop"}"#).unwrap();
        assert_eq!(stop, Command::Stop);

        let json = serde_json::to_string(&Command::Stop).unwrap();
        assert_eq!(json, r#"{"action":"stop"}"#);
    }

    #[test]
    fn test_wire_fields_are_camel_case() {
        let json = serde_json::to_string(&Command::Click {
            by_text: Some("next".into()),
            which_index: Some(3),
        })
        .unwrap();
        assert!(json.contains("byText"));
        assert!(json.contains("whichIndex"));
        assert!(!json.contains("by_text"));
    }

    #[test]
    fn test_optional_fields_may_be_missing() {
        let click: Command = serde_json::from_str(r#"{"action":"click","byText":"home"}"#).unwrap();
        assert_eq!(click, Command::click_text("home"));

        // Read without a target defaults to the whole page
        let read: Command = serde_json::from_str(r#"{"action":"read"}"#).unwrap();
        assert_eq!(
            read,
            Command::Read {
                target: ReadTarget::Page,
                which_index: None,
            }
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result = serde_json::from_str::<Command>(r#"{"action":"teleport"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        // `type` without text is not a legal command
        assert!(serde_json::from_str::<Command>(r#"{"action":"type"}"#).is_err());
        // `find` without a query is not a legal command
        assert!(serde_json::from_str::<Command>(r#"{"action":"find"}"#).is_err());
    }
}
