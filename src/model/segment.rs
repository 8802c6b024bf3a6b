use crate::model::{Origin, Span};
use serde::{Deserialize, Serialize};

/// A maximal sub-range of the text with a constant, ordered set of origins.
///
/// Origins are ordered outermost-to-innermost, i.e. in rule registration
/// order: earlier-registered rules wrap later-registered ones. Two adjacent
/// segments sharing the same leading origin values represent one continuous
/// logical span and render as a single unbroken tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub span: Span,

    #[serde(default)]
    pub origins: Vec<Origin>,
}

impl Segment {
    pub fn new(span: Span, origins: Vec<Origin>) -> Self {
        Self { span, origins }
    }

    /// A segment is *exact* when its single origin still covers precisely the
    /// segment's own span, i.e. it was never split by an overlap or truncated
    /// by an overwrite. Only exact segments are eligible for replacement.
    pub fn is_exact(&self) -> bool {
        match self.origins.as_slice() {
            [only] => only.span == self.span,
            _ => false,
        }
    }

    /// Length of the common leading origin prefix shared with `other`.
    ///
    /// This is the number of tags that may stay open across the boundary
    /// between two adjacent segments.
    pub fn shared_depth(&self, other: &Segment) -> usize {
        self.origins
            .iter()
            .zip(other.origins.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }
}
