use crate::model::{Diagnostic, Segment};
use serde::{Deserialize, Serialize};

/// Top-level JSON file written alongside rendered output when requested.
///
/// This wraps a built segment map with metadata that makes debugging easier
/// (schema versioning, span encoding, source info, diagnostics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFile {
    /// Schema version for this JSON payload.
    pub schema_version: u32,

    pub tool: ToolInfo,

    /// How to interpret all `Span` values contained in this file.
    pub span_encoding: SpanEncoding,

    pub source: SourceInfo,

    /// Rule loading/application diagnostics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,

    /// The flat, non-overlapping partition in ascending span order.
    #[serde(default)]
    pub segments: Vec<Segment>,
}

/// Identifies the program that produced the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Captures how `Span` offsets should be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEncoding {
    pub unit: SpanUnit,
    pub base: SpanBase,
}

impl Default for SpanEncoding {
    fn default() -> Self {
        Self {
            unit: SpanUnit::Byte,
            base: SpanBase::RawInput,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanUnit {
    /// Byte offsets (UTF-8).
    Byte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanBase {
    /// Offsets are measured against the raw input bytes as read from disk
    /// (no normalization pass was applied before spanning).
    RawInput,
}

/// Optional information about the input used to build the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// If available, a path to the input text file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Length of the input in bytes.
    pub byte_len: u64,
}
