//! Exact-segment text replacement.
//!
//! Replacement only touches *exact* segments: a segment whose single origin
//! still covers precisely the segment's own span, i.e. one that was never
//! split by an overlap or truncated by an overwrite. Anything else is left
//! alone; the caller detects "not applicable" by output equality, not by an
//! error.

use std::collections::BTreeMap;

use crate::map::SegmentMap;

/// Substitute the text of segment `index` with `replacement`.
///
/// A no-op (returning the input unchanged) when the index is out of range or
/// the segment is not exact.
pub fn replace(text: &str, map: &SegmentMap, index: usize, replacement: &str) -> String {
    let Some(seg) = map.get(index) else {
        return text.to_string();
    };
    if !seg.is_exact() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..seg.span.start]);
    out.push_str(replacement);
    out.push_str(&text[seg.span.end..]);
    out
}

/// Substitute every exact segment whose origin name has an entry in
/// `by_name`, in one left-to-right rebuild.
///
/// Rebuilding (rather than editing in place) keeps later spans valid while
/// earlier replacements change the text length.
pub fn replace_all(text: &str, map: &SegmentMap, by_name: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_end = 0;

    for seg in map.segments() {
        out.push_str(&text[prev_end..seg.span.start]);

        let replacement = seg
            .is_exact()
            .then(|| seg.origins.first())
            .flatten()
            .and_then(|origin| by_name.get(&origin.name));
        match replacement {
            Some(value) => out.push_str(value),
            None => out.push_str(&text[seg.span.start..seg.span.end]),
        }

        prev_end = seg.span.end;
    }

    out.push_str(&text[prev_end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::InsertMode;
    use crate::model::Span;

    #[test]
    fn exact_segment_is_replaced() {
        let text = "ab cd";
        let mut map = SegmentMap::new();
        map.insert_span(Span::new(3, 5), "y", InsertMode::Segment);

        assert_eq!(replace(text, &map, 0, "XY"), "ab XY");
    }

    #[test]
    fn split_segment_is_left_alone() {
        let text = "abcdefghij";
        let mut map = SegmentMap::new();
        map.insert_span(Span::new(0, 10), "a", InsertMode::Segment);
        map.insert_span(Span::new(3, 6), "b", InsertMode::Segment);

        // segment 1 has two origins; segments 0 and 2 carry a trimmed span
        for index in 0..map.len() {
            assert_eq!(replace(text, &map, index, "X"), text);
        }
        // out-of-range is a no-op too
        assert_eq!(replace(text, &map, 99, "X"), text);
    }

    #[test]
    fn replace_all_accounts_for_length_drift() {
        let text = "one two three";
        let mut map = SegmentMap::new();
        map.insert_matches([(0, 3), (4, 7), (8, 13)], "w", InsertMode::Segment);

        let by_name = BTreeMap::from([("w".to_string(), "#".to_string())]);
        assert_eq!(replace_all(text, &map, &by_name), "# # #");
    }

    #[test]
    fn replace_all_skips_non_exact_and_unnamed_segments() {
        let text = "abcdef gh";
        let mut map = SegmentMap::new();
        map.insert_span(Span::new(0, 6), "a", InsertMode::Segment);
        map.insert_span(Span::new(3, 6), "b", InsertMode::Segment);
        map.insert_span(Span::new(7, 9), "c", InsertMode::Segment);

        // only `c` is both exact and named; `a` is split by `b`
        let by_name = BTreeMap::from([
            ("a".to_string(), "A".to_string()),
            ("c".to_string(), "C".to_string()),
        ]);
        assert_eq!(replace_all(text, &map, &by_name), "abcdef C");
    }
}
