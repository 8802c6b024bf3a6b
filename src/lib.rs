pub mod map;
pub mod model;
pub mod registry;
pub mod render;
pub mod replace;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use model::{MapFile, SourceInfo, SpanEncoding, ToolInfo, SCHEMA_VERSION, TOOL_NAME, TOOL_VERSION};
use registry::Registry;

/// Options controlling how rendered markup is written on disk.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Wrap the rendered output in this element (e.g. `pre`).
    pub wrap: Option<String>,

    /// Also write the built segment map as a JSON envelope next to the
    /// rendered output, for inspection and diffing.
    pub write_json: bool,
}

/// Apply a compiled registry to `text` and render the result in one step.
pub fn mark_up(text: &str, registry: &Registry, wrap: Option<&str>) -> String {
    let map = registry.apply(text);
    let mut opts = registry.render_options();
    opts.container = wrap.map(str::to_string);
    render::render(text, &map, &opts)
}

/// Load and compile a rule file (YAML; JSON also parses).
///
/// Compilation diagnostics are reported on the returned registry, not as an
/// error: a bad rule is excluded, the rest still apply.
pub fn load_registry(rules_path: &Path) -> Result<Registry, Box<dyn Error>> {
    let src = fs::read_to_string(rules_path)
        .map_err(|e| format!("failed to read {}: {e}", rules_path.display()))?;
    let registry = Registry::from_yaml(&src)
        .map_err(|e| format!("failed to parse {}: {e}", rules_path.display()))?;
    Ok(registry)
}

/// Single file mode: mark up `input_path` and write the result next to it
/// with an `.html` extension. Returns the rendered markup.
pub fn run(
    input_path: &Path,
    registry: &Registry,
    opts: &OutputOptions,
) -> Result<String, Box<dyn Error>> {
    let text = read_text_lossy(input_path)?;

    let map = registry.apply(&text);
    let mut render_opts = registry.render_options();
    render_opts.container = opts.wrap.clone();
    let html = render::render(&text, &map, &render_opts);

    let out_path = input_path.with_extension("html");
    fs::write(&out_path, &html)?;

    if opts.write_json {
        let json_path = input_path.with_extension("json");
        write_map_json(&json_path, input_path, text.len(), registry, &map)?;
    }

    Ok(html)
}

/// Bulk mode: walk `src_root` for `.txt` files and regenerate a parallel
/// `.html` tree under `out_root`.
pub fn regenerate_all_in_dirs(
    src_root: &Path,
    out_root: &Path,
    registry: &Registry,
    opts: &OutputOptions,
) -> Result<(), Box<dyn Error>> {
    let start_time = Instant::now();

    if !src_root.exists() {
        return Err(format!("source directory not found: {}", src_root.display()).into());
    }

    let mut entries: Vec<_> = WalkDir::new(src_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "txt"))
        .collect();

    entries.sort_by(|a, b| a.path().cmp(b.path()));

    let total = entries.len();
    let mut count = 0;

    for entry in entries {
        let path = entry.path();
        // keep the same directory structure under the output root.
        let relative = path.strip_prefix(src_root)?;

        let mut out_path: PathBuf = out_root.join(relative);
        out_path.set_extension("html");

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let text = read_text_lossy(path)?;
        let map = registry.apply(&text);
        let mut render_opts = registry.render_options();
        render_opts.container = opts.wrap.clone();
        let html = render::render(&text, &map, &render_opts);
        fs::write(&out_path, &html)?;

        if opts.write_json {
            let mut json_path = out_path.clone();
            json_path.set_extension("json");
            write_map_json(&json_path, path, text.len(), registry, &map)?;
        }

        count += 1;

        let elapsed = start_time.elapsed();
        let total_ms = elapsed.as_millis();
        let mins = total_ms / 60_000;
        let secs = (total_ms % 60_000) / 1_000;
        let ms = total_ms % 1_000;
        eprintln!(
            "[{:>4}/{:>4}] [{:02}:{:02}.{:03}] Regenerated: {:?}",
            count, total, mins, secs, ms, out_path
        );
    }

    let total_elapsed = start_time.elapsed();
    let total_secs = total_elapsed.as_secs_f64();
    let avg_str = if count > 0 {
        format!("{:.3}s", total_secs / count as f64)
    } else {
        "-".to_string()
    };

    eprintln!(
        "Done. Regenerated {} files in {:.3}s (avg {}/doc).",
        count, total_secs, avg_str
    );
    Ok(())
}

fn read_text_lossy(path: &Path) -> Result<String, Box<dyn Error>> {
    let bytes = fs::read(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;

    // if we ever encounter invalid UTF-8, fallback to lossy conversion
    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(&e.into_bytes()).to_string()))
}

fn write_map_json(
    json_path: &Path,
    input_path: &Path,
    byte_len: usize,
    registry: &Registry,
    map: &map::SegmentMap,
) -> Result<(), Box<dyn Error>> {
    let map_file = MapFile {
        schema_version: SCHEMA_VERSION,
        tool: ToolInfo {
            name: TOOL_NAME.to_string(),
            version: TOOL_VERSION.to_string(),
        },
        span_encoding: SpanEncoding::default(),
        source: SourceInfo {
            path: Some(input_path.to_string_lossy().to_string()),
            byte_len: byte_len as u64,
        },
        diagnostics: registry.diagnostics().to_vec(),
        segments: map.segments().to_vec(),
    };

    // prettify JSON so it's easy to inspect / diff.
    let json = serde_json::to_string_pretty(&map_file)?;
    fs::write(json_path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_up_applies_rules_and_wraps() {
        let src = r#"
rules:
  - name: word
    match: "\\w+"
    tag: b
"#;
        let registry = Registry::from_yaml(src).expect("rules");
        let html = mark_up("hi there", &registry, Some("pre"));
        assert_eq!(
            html,
            "<pre><b class=\"word L R\">hi</b> <b class=\"word L R\">there</b></pre>"
        );
    }
}
