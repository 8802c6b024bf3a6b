use crate::model::Span;
use serde::{Deserialize, Serialize};

/// One rule's contribution to a segment.
///
/// `span` is the extent the rule matched **before** any segmentation took
/// place; when overlapping rules split the map, every resulting piece keeps
/// the full original extent here. Comparing a segment boundary against this
/// span is how the renderer decides whether a tag sits on the rule's true
/// left/right edge or on a split remainder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// The rule name (also the rendering class).
    pub name: String,

    /// The original, pre-segmentation extent.
    pub span: Span,

    /// Zero-based counter distinguishing multiple matches inserted under the
    /// same name within one insertion call. Useful for building unique ids.
    pub sequence: u32,
}

impl Origin {
    pub fn new(name: impl Into<String>, span: Span, sequence: u32) -> Self {
        Self {
            name: name.into(),
            span,
            sequence,
        }
    }
}
