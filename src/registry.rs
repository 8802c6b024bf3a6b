//! Rule files and the compiled rule registry.
//!
//! A rule file is an ordered list of entries; order in the file fixes
//! nesting order wherever rules overlap (earlier = outer). Loading is
//! **error-tolerant**: a rule whose pattern fails to compile is excluded
//! with a [`Diagnostic`] and the remaining rules are unaffected, so one bad
//! entry never takes down the whole run.
//!
//! The serde-facing [`RuleSpec`] types are distinct from the compiled
//! [`Rule`]: the matcher is resolved once at load time into a tagged variant
//! over {compiled pattern, explicit span}, and application never touches the
//! textual form again.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::map::{InsertMode, SegmentMap};
use crate::model::{Diagnostic, DiagnosticPhase, Severity, Span};
use crate::render::{AttrSpec, Closing, RenderOptions, TagConfig};

/// On-disk rule file (YAML or JSON).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RulesFile {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One rule entry as written in a rule file, before compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// The rule name; doubles as the rendering class.
    pub name: String,

    /// Regex matched left to right over the whole text; every
    /// non-overlapping match is inserted.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "match")]
    pub pattern: Option<String>,

    /// Explicit span instead of a pattern. May be directional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,

    #[serde(default)]
    pub mode: InsertMode,

    /// Opening tag name; defaults to `span`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Distinct closing tag name, when it differs from the opening tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<String>,

    /// Emit no closing tag at all (void-like elements).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub void: bool,

    /// Attribute name -> template or extraction rule.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, AttrSource>,
}

/// An attribute value source as written in a rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrSource {
    /// Literal template; `$_&` is replaced with the matched slice.
    Template(String),
    /// Sub-extraction applied to the matched slice.
    Extract {
        /// Pattern whose first match (first capture group when present)
        /// becomes the attribute value.
        extract: String,
    },
}

/// How a compiled rule finds its extents in the text.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// All non-overlapping matches, left to right.
    Pattern(Regex),
    /// A single explicit span.
    Span(Span),
}

/// A compiled rule, ready to apply.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub matcher: Matcher,
    pub mode: InsertMode,
    pub tag: TagConfig,
}

/// An ordered set of compiled rules plus the diagnostics collected while
/// compiling them.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    rules: Vec<Rule>,
    diagnostics: Vec<Diagnostic>,
}

impl Registry {
    /// Compile a rule file. Never fails: bad entries are excluded (or
    /// degraded) and reported through [`Registry::diagnostics`].
    pub fn compile(file: &RulesFile) -> Self {
        let mut rules = Vec::with_capacity(file.rules.len());
        let mut diagnostics = Vec::new();

        for entry in &file.rules {
            if let Some(rule) = compile_rule(entry, &mut diagnostics) {
                rules.push(rule);
            }
        }

        Self { rules, diagnostics }
    }

    /// Parse and compile a YAML rule file. JSON also parses, since YAML is a
    /// superset.
    pub fn from_yaml(src: &str) -> Result<Self, serde_yaml::Error> {
        let file: RulesFile = serde_yaml::from_str(src)?;
        Ok(Self::compile(&file))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Build a fresh segment map for `text` by folding every rule into an
    /// initially empty map, in registration order.
    pub fn apply(&self, text: &str) -> SegmentMap {
        let mut map = SegmentMap::new();
        for rule in &self.rules {
            match &rule.matcher {
                Matcher::Pattern(pattern) => {
                    map.insert_matches(
                        pattern.find_iter(text).map(|m| (m.start(), m.end())),
                        &rule.name,
                        rule.mode,
                    );
                }
                Matcher::Span(span) => {
                    map.insert_span(*span, &rule.name, rule.mode);
                }
            }
        }
        map
    }

    /// Rendering options derived from the per-rule tag configuration.
    pub fn render_options(&self) -> RenderOptions {
        let mut opts = RenderOptions::default();
        for rule in &self.rules {
            opts.tags.insert(rule.name.clone(), rule.tag.clone());
        }
        opts
    }
}

fn compile_rule(entry: &RuleSpec, diagnostics: &mut Vec<Diagnostic>) -> Option<Rule> {
    let matcher = match (&entry.pattern, entry.span) {
        (Some(pattern), span) => {
            if span.is_some() {
                diagnostics.push(Diagnostic {
                    severity: Severity::Warning,
                    phase: Some(DiagnosticPhase::Compile),
                    code: Some("rules.entry.ambiguous_matcher".to_string()),
                    message: format!(
                        "rule '{}' has both a pattern and a span; using the pattern",
                        entry.name
                    ),
                    span: None,
                    notes: vec![],
                });
            }
            match Regex::new(pattern) {
                Ok(compiled) => Matcher::Pattern(compiled),
                Err(e) => {
                    diagnostics.push(Diagnostic {
                        severity: Severity::Error,
                        phase: Some(DiagnosticPhase::Compile),
                        code: Some("rules.pattern.compile_failed".to_string()),
                        message: format!("rule '{}' pattern does not compile: {e}", entry.name),
                        span: None,
                        notes: vec![],
                    });
                    return None;
                }
            }
        }
        (None, Some(span)) => Matcher::Span(span),
        (None, None) => {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                phase: Some(DiagnosticPhase::Compile),
                code: Some("rules.entry.no_matcher".to_string()),
                message: format!("rule '{}' has neither a pattern nor a span; skipped", entry.name),
                span: None,
                notes: vec![],
            });
            return None;
        }
    };

    let mut attrs = BTreeMap::new();
    for (name, source) in &entry.attrs {
        match source {
            AttrSource::Template(template) => {
                attrs.insert(name.clone(), AttrSpec::Template(template.clone()));
            }
            AttrSource::Extract { extract } => match Regex::new(extract) {
                Ok(compiled) => {
                    attrs.insert(name.clone(), AttrSpec::Extract(compiled));
                }
                Err(e) => {
                    // keep the rule, drop only the broken attribute
                    diagnostics.push(Diagnostic {
                        severity: Severity::Warning,
                        phase: Some(DiagnosticPhase::Compile),
                        code: Some("rules.attr.compile_failed".to_string()),
                        message: format!(
                            "rule '{}' attribute '{name}' extraction does not compile: {e}",
                            entry.name
                        ),
                        span: None,
                        notes: vec![],
                    });
                }
            },
        }
    }

    let closing = if entry.void {
        Closing::Omitted
    } else {
        match &entry.close {
            Some(close) => Closing::Named(close.clone()),
            None => Closing::Matching,
        }
    };

    Some(Rule {
        name: entry.name.clone(),
        matcher,
        mode: entry.mode,
        tag: TagConfig {
            tag: entry.tag.clone().unwrap_or_else(|| "span".to_string()),
            closing,
            attrs,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_rules_compile_and_apply_in_order() {
        let src = r#"
rules:
  - name: sentence
    match: "[^.]+\\."
  - name: word
    match: "\\w+"
    tag: b
"#;
        let registry = Registry::from_yaml(src).expect("parse");
        assert!(registry.diagnostics().is_empty());
        assert_eq!(registry.rules().len(), 2);

        let map = registry.apply("Hi there.");
        // the sentence wraps both words; words nest inside it
        assert_eq!(map.segments()[0].origins[0].name, "sentence");
        assert_eq!(map.segments()[0].origins[1].name, "word");

        let opts = registry.render_options();
        assert_eq!(opts.tags["word"].tag, "b");
    }

    #[test]
    fn bad_pattern_is_excluded_without_affecting_others() {
        let src = r#"
rules:
  - name: broken
    match: "("
  - name: word
    match: "\\w+"
"#;
        let registry = Registry::from_yaml(src).expect("parse");
        assert_eq!(registry.rules().len(), 1);
        assert_eq!(registry.rules()[0].name, "word");

        let diags = registry.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(
            diags[0].code.as_deref(),
            Some("rules.pattern.compile_failed")
        );

        // the surviving rule still applies
        let map = registry.apply("ok then");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn explicit_span_rules_and_overwrite_mode() {
        let src = r#"
rules:
  - name: word
    match: "\\w+"
  - name: header
    span: { start: 0, end: 5 }
    mode: overwrite
    tag: h1
"#;
        let registry = Registry::from_yaml(src).expect("parse");
        let map = registry.apply("title body");

        assert_eq!(map.segments()[0].origins.len(), 1);
        assert_eq!(map.segments()[0].origins[0].name, "header");
    }

    #[test]
    fn entry_without_matcher_is_skipped_with_a_warning() {
        let src = r#"
rules:
  - name: empty
"#;
        let registry = Registry::from_yaml(src).expect("parse");
        assert!(registry.rules().is_empty());
        assert_eq!(registry.diagnostics()[0].severity, Severity::Warning);
    }

    #[test]
    fn broken_attribute_extraction_drops_only_the_attribute() {
        let src = r#"
rules:
  - name: num
    match: "\\d+"
    attrs:
      title: "value $_&"
      data-bad: { extract: "[" }
"#;
        let registry = Registry::from_yaml(src).expect("parse");
        assert_eq!(registry.rules().len(), 1);
        assert_eq!(registry.rules()[0].tag.attrs.len(), 1);
        assert!(registry.rules()[0].tag.attrs.contains_key("title"));
        assert_eq!(
            registry.diagnostics()[0].code.as_deref(),
            Some("rules.attr.compile_failed")
        );
    }

    #[test]
    fn rules_file_json_round_trip() {
        let file = RulesFile {
            rules: vec![RuleSpec {
                name: "word".to_string(),
                pattern: Some(r"\w+".to_string()),
                span: None,
                mode: InsertMode::Segment,
                tag: Some("b".to_string()),
                close: None,
                void: false,
                attrs: BTreeMap::from([(
                    "title".to_string(),
                    AttrSource::Template("$_&".to_string()),
                )]),
            }],
        };

        let json = serde_json::to_string_pretty(&file).expect("serialize");
        let back: RulesFile = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(file, back);
    }
}
