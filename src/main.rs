use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use mould_index::{analyze, load_file, AnalysisConfig};

const USAGE: &str = "usage: mould-index <export.csv|.json|.parquet> [--window <days>] [--config <file.json>] [--json]";

struct Args {
    input: PathBuf,
    window: Option<u32>,
    config: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut input = None;
    let mut window = None;
    let mut config = None;
    let mut json = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--window" => {
                let days = args.next().context("--window needs a value")?;
                window = Some(
                    days.parse::<u32>()
                        .with_context(|| format!("invalid --window '{days}'"))?,
                );
            }
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--json" => json = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("unknown option {other}\n{USAGE}"),
            other => input = Some(PathBuf::from(other)),
        }
    }

    Ok(Args {
        input: input.context(USAGE)?,
        window,
        config,
        json,
    })
}

fn run() -> Result<()> {
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    }
    .with_window(args.window);

    let table = load_file(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let report = analyze(&table, &config).context("Error processing file")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
