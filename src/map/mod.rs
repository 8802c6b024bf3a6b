//! Text -> segment map construction.
//!
//! A [`SegmentMap`] is a flat, ordered partition of the input text: spans are
//! strictly ascending and non-overlapping, and gaps between segments denote
//! unstyled text (gaps are not stored). The map is built fresh per markup
//! request by folding rule insertions into an initially empty map, then
//! treated as read-only by the position queries, the renderer and the
//! replacement engine.
//!
//! Insertion maintains two policies:
//! - [`InsertMode::Segment`] splits overlapping prior segments so that every
//!   point of the text keeps the full ordered list of rules covering it.
//! - [`InsertMode::Overwrite`] claims its span outright; prior segments fully
//!   inside it are discarded and segments straddling an edge are truncated to
//!   their un-covered remainder.

mod index;

use crate::model::{Origin, Segment, Span};
use serde::{Deserialize, Serialize};

/// Insertion policy for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertMode {
    /// Split overlapping prior segments; every origin is preserved.
    #[default]
    Segment,
    /// Discard or truncate overlapping prior segments.
    Overwrite,
}

/// An ordered, non-overlapping partition of the text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentMap {
    segments: Vec<Segment>,
}

impl SegmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// Insert a single span under `name`.
    ///
    /// Directional spans (`start > end`, e.g. a backwards selection) are
    /// normalized first; empty spans are dropped.
    pub fn insert_span(&mut self, span: Span, name: &str, mode: InsertMode) {
        let span = span.normalized();
        if span.is_empty() {
            return;
        }
        self.merge(span, Origin::new(name, span, 0), mode);
    }

    /// Fold an ordered, non-overlapping match sequence into the map.
    ///
    /// The caller guarantees the matcher contract: matches arrive left to
    /// right and do not overlap each other (`regex::Regex::find_iter`
    /// behaves this way). Each match is merged against the map as updated by
    /// the previous one, so matches from one call may abut. Degenerate
    /// (empty) matches are skipped and do not consume a sequence number.
    pub fn insert_matches<I>(&mut self, matches: I, name: &str, mode: InsertMode)
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut sequence: u32 = 0;
        for (start, end) in matches {
            let span = Span::new(start, end);
            if span.is_empty() {
                continue;
            }
            self.merge(span, Origin::new(name, span, sequence), mode);
            sequence += 1;
        }
    }

    fn merge(&mut self, span: Span, origin: Origin, mode: InsertMode) {
        match mode {
            InsertMode::Segment => self.merge_segmented(span, origin),
            InsertMode::Overwrite => self.merge_overwrite(span, origin),
        }
    }

    /// Segment-mode merge: every overlapped segment is split three ways.
    ///
    /// The left remainder belongs to whichever span starts first; the middle
    /// intersection stacks the new origin after the existing ones (earlier
    /// insertions stay outermost); the right remainder of the incoming span
    /// is carried forward against subsequent segments. A dangling fragment
    /// left over at the end is appended with only the new origin.
    fn merge_segmented(&mut self, span: Span, origin: Origin) {
        let old = std::mem::take(&mut self.segments);
        let mut out: Vec<Segment> = Vec::with_capacity(old.len() + 2);

        // the not-yet-placed piece of the incoming span
        let mut pending = Some(span);

        for seg in old {
            let Some(p) = pending else {
                out.push(seg);
                continue;
            };

            if seg.span.end <= p.start {
                // entirely before the incoming fragment
                out.push(seg);
                continue;
            }

            if p.end <= seg.span.start {
                // the fragment ends in the gap before this segment
                push_nonempty(&mut out, Segment::new(p, vec![origin.clone()]));
                pending = None;
                out.push(seg);
                continue;
            }

            // overlap: left remainder, middle intersection, right remainder
            let mid = Span::new(p.start.max(seg.span.start), p.end.min(seg.span.end));

            if p.start < seg.span.start {
                let left = Span::new(p.start, mid.start);
                push_nonempty(&mut out, Segment::new(left, vec![origin.clone()]));
            } else if seg.span.start < p.start {
                let left = Span::new(seg.span.start, mid.start);
                push_nonempty(&mut out, Segment::new(left, seg.origins.clone()));
            }

            let mut stacked = seg.origins.clone();
            stacked.push(origin.clone());
            push_nonempty(&mut out, Segment::new(mid, stacked));

            if seg.span.end > mid.end {
                // the existing segment extends past the incoming fragment
                let right = Span::new(mid.end, seg.span.end);
                push_nonempty(&mut out, Segment::new(right, seg.origins));
                pending = None;
            } else if p.end > mid.end {
                pending = Some(Span::new(mid.end, p.end));
            } else {
                pending = None;
            }
        }

        if let Some(p) = pending {
            push_nonempty(&mut out, Segment::new(p, vec![origin]));
        }

        self.segments = out;
    }

    /// Overwrite-mode merge: the new span is kept whole.
    ///
    /// Segments fully inside the new span are discarded. A segment straddling
    /// the leading or trailing edge is truncated to its un-covered remainder
    /// and retained with its origins intact; its origin spans keep their
    /// original extents, so truncated segments stop being exact.
    fn merge_overwrite(&mut self, span: Span, origin: Origin) {
        let old = std::mem::take(&mut self.segments);
        let mut out: Vec<Segment> = Vec::with_capacity(old.len() + 2);
        let mut inserted = false;

        for seg in old {
            if seg.span.end <= span.start {
                out.push(seg);
                continue;
            }

            if seg.span.start >= span.end {
                if !inserted {
                    out.push(Segment::new(span, vec![origin.clone()]));
                    inserted = true;
                }
                out.push(seg);
                continue;
            }

            // the segment intersects the new span
            if seg.span.start < span.start {
                let left = Span::new(seg.span.start, span.start);
                out.push(Segment::new(left, seg.origins.clone()));
            }
            if !inserted {
                out.push(Segment::new(span, vec![origin.clone()]));
                inserted = true;
            }
            if seg.span.end > span.end {
                let right = Span::new(span.end, seg.span.end);
                out.push(Segment::new(right, seg.origins));
            }
        }

        if !inserted {
            out.push(Segment::new(span, vec![origin]));
        }

        self.segments = out;
    }
}

fn push_nonempty(out: &mut Vec<Segment>, seg: Segment) {
    if !seg.span.is_empty() {
        out.push(seg);
    }
}
