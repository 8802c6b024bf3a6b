use clap::Parser;
use layermark::model::Severity;
use layermark::{load_registry, regenerate_all_in_dirs, run, OutputOptions};
use std::path::PathBuf;
use std::process;

/// Overlay pattern rules onto plain text and emit nested markup.
#[derive(Debug, Parser)]
#[command(name = "layermark", version)]
struct Cli {
    /// Input text file (single file mode; prints the markup to stdout).
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    input: Option<PathBuf>,

    /// Rule file (YAML or JSON).
    #[arg(short, long, value_name = "FILE")]
    rules: PathBuf,

    /// Bulk mode: regenerate every `.txt` under this directory.
    #[arg(long, value_name = "DIR")]
    all: Option<PathBuf>,

    /// Output root for bulk mode (defaults to the source directory).
    #[arg(long, value_name = "DIR", requires = "all")]
    out_dir: Option<PathBuf>,

    /// Wrap the rendered output in this element, e.g. `pre`.
    #[arg(long, value_name = "TAG")]
    wrap: Option<String>,

    /// Also write the segment map as a JSON envelope next to the output.
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run_cli(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let registry = load_registry(&cli.rules)?;

    // rule problems are not fatal; surface them and keep going.
    for diag in registry.diagnostics() {
        let level = match diag.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        eprintln!("{level}: {}", diag.message);
    }

    let opts = OutputOptions {
        wrap: cli.wrap,
        write_json: cli.json,
    };

    match (cli.input, cli.all) {
        (Some(input), None) => {
            let html = run(&input, &registry, &opts)?;
            println!("{}", html);
            Ok(())
        }
        (None, Some(src_root)) => {
            let out_root = cli.out_dir.unwrap_or_else(|| src_root.clone());
            regenerate_all_in_dirs(&src_root, &out_root, &registry, &opts)
        }
        // clap rules out the remaining combinations.
        _ => Err("exactly one of <INPUT> or --all is required".into()),
    }
}
