//! End-to-end markup tests: YAML rules in, rendered string out.

use layermark::registry::Registry;
use layermark::{mark_up, render, replace};
use std::collections::BTreeMap;

#[test]
fn disjoint_matches_render_with_both_boundary_flags() {
    let registry = Registry::from_yaml(
        r#"
rules:
  - name: x
    span: { start: 0, end: 2 }
  - name: y
    span: { start: 3, end: 5 }
"#,
    )
    .expect("rules");

    let html = mark_up("ab cd", &registry, None);
    assert_eq!(
        html,
        "<span class=\"x L R\">ab</span> <span class=\"y L R\">cd</span>"
    );
}

#[test]
fn nested_rules_keep_the_outer_tag_unbroken() {
    let registry = Registry::from_yaml(
        r#"
rules:
  - name: outer
    span: { start: 0, end: 10 }
  - name: inner
    span: { start: 3, end: 6 }
"#,
    )
    .expect("rules");

    let html = mark_up("abcdefghij", &registry, None);
    assert_eq!(
        html,
        "<span class=\"outer L R\">abc<span class=\"inner L R\">def</span>ghij</span>"
    );
}

#[test]
fn patterns_and_attributes_compose() {
    let registry = Registry::from_yaml(
        r#"
rules:
  - name: quote
    match: "\"[^\"]*\""
    tag: q
  - name: num
    match: "[0-9]+"
    tag: em
    attrs:
      data-value: "$_&"
"#,
    )
    .expect("rules");

    let html = mark_up("say \"take 5\" twice", &registry, None);
    assert_eq!(
        html,
        "say <q class=\"quote L R\">\"take <em class=\"num L R\" data-value=\"5\">5</em>\"</q> twice"
    );
}

#[test]
fn whole_document_rule_round_trips_escaped_text() {
    let text = "1 < 2 && 4 > 3";
    let registry = Registry::from_yaml(&format!(
        r#"
rules:
  - name: doc
    span: {{ start: 0, end: {} }}
"#,
        text.len()
    ))
    .expect("rules");

    let html = mark_up(text, &registry, None);
    assert_eq!(
        html,
        "<span class=\"doc L R\">1 &lt; 2 &amp;&amp; 4 &gt; 3</span>"
    );
}

#[test]
fn rendering_the_same_map_twice_is_byte_identical() {
    let registry = Registry::from_yaml(
        r#"
rules:
  - name: vowel
    match: "[aeiou]+"
  - name: word
    match: "[a-z]+"
"#,
    )
    .expect("rules");

    let text = "loud pseudo queueing";
    let map = registry.apply(text);
    let opts = registry.render_options();
    assert_eq!(
        render::render(text, &map, &opts),
        render::render(text, &map, &opts)
    );
}

#[test]
fn replace_only_touches_exact_segments() {
    let registry = Registry::from_yaml(
        r#"
rules:
  - name: outer
    span: { start: 0, end: 10 }
  - name: inner
    span: { start: 3, end: 6 }
"#,
    )
    .expect("rules");

    let text = "abcdefghij";
    let map = registry.apply(text);

    // segment 0 is a split remainder of `outer`, not exact
    assert_eq!(replace::replace(text, &map, 0, "X"), text);

    // a lone full-width match is exact and does get replaced
    let lone = Registry::from_yaml(
        r#"
rules:
  - name: word
    match: "def"
"#,
    )
    .expect("rules");
    let lone_map = lone.apply(text);
    assert_eq!(replace::replace(text, &lone_map, 0, "XYZ"), "abcXYZghij");

    let by_name = BTreeMap::from([("word".to_string(), "-".to_string())]);
    assert_eq!(replace::replace_all(text, &lone_map, &by_name), "abc-ghij");
}
