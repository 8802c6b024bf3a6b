//! Binary-search position queries over a built [`SegmentMap`].
//!
//! Every query runs one `partition_point` for "the first segment whose end
//! exceeds `pos`" and refines the result, so all of them are O(log n) over
//! the map length. These back cursor and selection lookups in a host editor.

use crate::map::SegmentMap;

impl SegmentMap {
    /// Index of the first segment whose end exceeds `pos`.
    fn first_end_after(&self, pos: usize) -> usize {
        self.segments().partition_point(|seg| seg.span.end <= pos)
    }

    /// The segment containing `pos`, or `None` if `pos` falls in a gap.
    pub fn segment_at(&self, pos: usize) -> Option<usize> {
        let i = self.first_end_after(pos);
        (i < self.len() && self.segments()[i].span.contains(pos)).then_some(i)
    }

    /// Index of the segment containing or preceding `pos`.
    ///
    /// A segment starting exactly at `pos` counts as *after*, not as
    /// containing. When `pos` lies before the first segment the result is
    /// clamped to 0. `None` only on an empty map.
    pub fn index_before(&self, pos: usize) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let i = self.first_end_after(pos);
        if i < self.len() && self.segments()[i].span.start < pos {
            Some(i)
        } else {
            Some(i.saturating_sub(1))
        }
    }

    /// Index of the first segment starting at or after `pos`.
    ///
    /// If `pos` lies strictly inside a segment this is the index following
    /// it. Insertion-point style: the result equals [`SegmentMap::len`] when
    /// no segment starts at or after `pos`.
    pub fn index_after(&self, pos: usize) -> usize {
        let i = self.first_end_after(pos);
        if i < self.len() && self.segments()[i].span.start < pos {
            i + 1
        } else {
            i
        }
    }

    /// Index of the segment closest to `pos`. `None` only on an empty map.
    ///
    /// In the gap between two segments, positions left of the arithmetic
    /// midpoint resolve to the left segment; the midpoint itself and
    /// everything right of it resolve to the right segment.
    pub fn nearest(&self, pos: usize) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let i = self.first_end_after(pos);
        if i == self.len() {
            return Some(i - 1);
        }
        let seg = &self.segments()[i];
        if seg.span.start <= pos || i == 0 {
            return Some(i);
        }
        let gap_start = self.segments()[i - 1].span.end;
        let gap_end = seg.span.start;
        if pos - gap_start < gap_end - pos {
            Some(i - 1)
        } else {
            Some(i)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::InsertMode;
    use crate::model::Span;

    /// `[2,4)`, gap, `[6,10)`, gap, `[14,15)`
    fn sample() -> SegmentMap {
        let mut map = SegmentMap::new();
        map.insert_span(Span::new(2, 4), "a", InsertMode::Segment);
        map.insert_span(Span::new(6, 10), "b", InsertMode::Segment);
        map.insert_span(Span::new(14, 15), "c", InsertMode::Segment);
        map
    }

    #[test]
    fn segment_at_hits_and_gaps() {
        let map = sample();
        assert_eq!(map.segment_at(2), Some(0));
        assert_eq!(map.segment_at(3), Some(0));
        assert_eq!(map.segment_at(4), None);
        assert_eq!(map.segment_at(7), Some(1));
        assert_eq!(map.segment_at(20), None);
    }

    #[test]
    fn index_before_clamps_and_excludes_starts() {
        let map = sample();
        assert_eq!(map.index_before(0), Some(0));
        // a segment starting exactly at pos is "after", so its predecessor wins
        assert_eq!(map.index_before(6), Some(0));
        // strictly inside
        assert_eq!(map.index_before(7), Some(1));
        // in a gap
        assert_eq!(map.index_before(5), Some(0));
        assert_eq!(map.index_before(30), Some(2));
        assert_eq!(SegmentMap::new().index_before(3), None);
    }

    #[test]
    fn index_after_steps_past_containing_segments() {
        let map = sample();
        assert_eq!(map.index_after(0), 0);
        // exactly at a segment start: that segment
        assert_eq!(map.index_after(6), 1);
        // strictly inside: the following index
        assert_eq!(map.index_after(7), 2);
        // in a gap
        assert_eq!(map.index_after(5), 1);
        // past everything: insertion point
        assert_eq!(map.index_after(20), 3);
    }

    #[test]
    fn nearest_splits_gaps_at_the_midpoint() {
        let map = sample();
        assert_eq!(map.nearest(3), Some(0));
        // gap [4,6): midpoint 5; 4 is left of it, 5 is the midpoint
        assert_eq!(map.nearest(4), Some(0));
        assert_eq!(map.nearest(5), Some(1));
        // gap [10,14): midpoint 12
        assert_eq!(map.nearest(11), Some(1));
        assert_eq!(map.nearest(12), Some(2));
        // beyond either end
        assert_eq!(map.nearest(0), Some(0));
        assert_eq!(map.nearest(99), Some(2));
        assert_eq!(SegmentMap::new().nearest(0), None);
    }
}
