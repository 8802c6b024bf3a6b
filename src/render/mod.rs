//! Segment map -> nested markup renderer.
//!
//! This module intentionally operates **only** on a built [`SegmentMap`] and
//! the original text; it never re-runs any matching. The output is a single
//! string of escaped text interleaved with open/close tags.
//!
//! Tag reuse across segments: adjacent segments sharing a leading origin
//! prefix keep those tags open across the boundary, so a rule split into
//! several segments by overlaps still renders as one unbroken element.
//! Boundary flags: a tag's class carries `L` when it sits on its rule's true
//! left edge and `R` when it closes on the rule's true right edge, letting a
//! stylesheet distinguish real boundaries from split remainders. The `R`
//! flag is decided by looking ahead for the segment on which the tag will
//! close, so the output is assembled in one pass with no buffer patching.

use std::collections::BTreeMap;

use crate::map::SegmentMap;
use crate::model::{Origin, Segment};
use regex::Regex;

/// Placeholder in attribute templates replaced by the origin-covered slice.
pub const SLICE_PLACEHOLDER: &str = "$_&";

/// How a rule's element is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Closing {
    /// `</tag>` using the opening tag's name.
    #[default]
    Matching,
    /// A distinct closing tag name.
    Named(String),
    /// No closing tag at all (void-like elements).
    Omitted,
}

/// How an attribute value is derived from the origin-covered slice.
#[derive(Debug, Clone)]
pub enum AttrSpec {
    /// Literal text; occurrences of [`SLICE_PLACEHOLDER`] are replaced with
    /// the slice. A template without the placeholder is a plain constant.
    Template(String),
    /// First match of this pattern within the slice (first capture group
    /// when one exists). The attribute is omitted when nothing matches.
    Extract(Regex),
}

/// Per-rule tag configuration.
#[derive(Debug, Clone)]
pub struct TagConfig {
    /// Opening tag name.
    pub tag: String,

    pub closing: Closing,

    /// Attribute name -> value spec, emitted in name order.
    pub attrs: BTreeMap<String, AttrSpec>,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            tag: "span".to_string(),
            closing: Closing::Matching,
            attrs: BTreeMap::new(),
        }
    }
}

/// Context handed to the per-tag hook once per emitted opening tag.
#[derive(Debug)]
pub struct TagContext<'a> {
    pub segment: &'a Segment,

    /// Depth of the origin within the segment's origin list (0 = outermost).
    pub depth: usize,

    /// Index of the segment within the map.
    pub index: usize,
}

/// Pure callback that may add or override attributes on an opening tag,
/// e.g. to inject dynamically computed ids. Returned pairs are merged over
/// the statically configured attributes by name.
pub type TagHook<'a> = dyn Fn(&TagContext<'_>) -> Vec<(String, String)> + 'a;

/// Rendering options shared across one render call.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Per rule-name tag configuration. Names without an entry render with
    /// [`TagConfig::default`] (a bare `span` carrying only the class).
    pub tags: BTreeMap<String, TagConfig>,

    /// Wrap the whole output in this element, e.g. `pre`.
    pub container: Option<String>,
}

impl RenderOptions {
    fn config(&self, name: &str) -> Option<&TagConfig> {
        self.tags.get(name)
    }
}

pub fn render(text: &str, map: &SegmentMap, opts: &RenderOptions) -> String {
    render_with_hook(text, map, opts, None)
}

/// Render `map` over `text`, walking the segments left to right.
///
/// Gap text and segment text are escaped; opening tags are emitted from the
/// common-prefix depth shared with the previous segment, closing tags down
/// to the common-prefix depth shared with the next one.
pub fn render_with_hook(
    text: &str,
    map: &SegmentMap,
    opts: &RenderOptions,
    hook: Option<&TagHook<'_>>,
) -> String {
    let default_config = TagConfig::default();
    let segs = map.segments();
    let mut out = String::with_capacity(text.len() * 2);

    if let Some(container) = &opts.container {
        out.push('<');
        out.push_str(container);
        out.push('>');
    }

    let mut prev_end = 0;
    for (index, seg) in segs.iter().enumerate() {
        push_text(&mut out, &text[prev_end..seg.span.start]);

        let open_depth = match index.checked_sub(1) {
            Some(prev) => segs[prev].shared_depth(seg),
            None => 0,
        };
        for depth in open_depth..seg.origins.len() {
            let origin = &seg.origins[depth];
            let config = opts.config(&origin.name).unwrap_or(&default_config);
            open_tag(&mut out, text, segs, index, depth, origin, config, hook);
        }

        push_text(&mut out, &text[seg.span.start..seg.span.end]);

        let close_depth = match segs.get(index + 1) {
            Some(next) => seg.shared_depth(next),
            None => 0,
        };
        for depth in (close_depth..seg.origins.len()).rev() {
            let origin = &seg.origins[depth];
            let config = opts.config(&origin.name).unwrap_or(&default_config);
            match &config.closing {
                Closing::Matching => {
                    out.push_str("</");
                    out.push_str(&config.tag);
                    out.push('>');
                }
                Closing::Named(tag) => {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                Closing::Omitted => {}
            }
        }

        prev_end = seg.span.end;
    }

    push_text(&mut out, &text[prev_end..]);

    if let Some(container) = &opts.container {
        out.push_str("</");
        out.push_str(container);
        out.push('>');
    }

    out
}

#[allow(clippy::too_many_arguments)]
fn open_tag(
    out: &mut String,
    text: &str,
    segs: &[Segment],
    index: usize,
    depth: usize,
    origin: &Origin,
    config: &TagConfig,
    hook: Option<&TagHook<'_>>,
) {
    let seg = &segs[index];

    out.push('<');
    out.push_str(&config.tag);
    out.push_str(" class=\"");
    push_attr(out, &origin.name);
    if origin.span.start == seg.span.start {
        out.push_str(" L");
    }
    if closes_at_origin_end(segs, index, depth, origin) {
        out.push_str(" R");
    }
    out.push('"');

    let slice = &text[origin.span.start..origin.span.end];
    let mut attrs: Vec<(String, String)> = Vec::new();
    for (name, spec) in &config.attrs {
        match spec {
            AttrSpec::Template(template) => {
                attrs.push((name.clone(), template.replace(SLICE_PLACEHOLDER, slice)));
            }
            AttrSpec::Extract(pattern) => {
                if let Some(caps) = pattern.captures(slice)
                    && let Some(m) = caps.get(1).or_else(|| caps.get(0))
                {
                    attrs.push((name.clone(), m.as_str().to_string()));
                }
            }
        }
    }

    if let Some(hook) = hook {
        let ctx = TagContext {
            segment: seg,
            depth,
            index,
        };
        for (name, value) in hook(&ctx) {
            match attrs.iter().position(|(existing, _)| *existing == name) {
                Some(slot) => attrs[slot].1 = value,
                None => attrs.push((name, value)),
            }
        }
    }

    for (name, value) in attrs {
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        push_attr(out, &value);
        out.push('"');
    }

    out.push('>');
}

/// True when the tag opened at (`index`, `depth`) closes on a segment whose
/// end coincides with the origin's own right boundary.
///
/// A tag stays open across a boundary while the adjacent segments share an
/// origin prefix deeper than `depth`, so the closing segment is the last one
/// of that run.
fn closes_at_origin_end(segs: &[Segment], index: usize, depth: usize, origin: &Origin) -> bool {
    let mut last = index;
    while last + 1 < segs.len() && segs[last].shared_depth(&segs[last + 1]) > depth {
        last += 1;
    }
    segs[last].span.end == origin.span.end
}

fn push_text(out: &mut String, raw: &str) {
    html_escape::encode_text_to_string(raw, out);
}

fn push_attr(out: &mut String, raw: &str) {
    html_escape::encode_double_quoted_attribute_to_string(raw, out);
}
