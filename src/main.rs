use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use docxr::batch::{BatchProcessor, RunMode, collect_documents};
use docxr::cli::{Args, parse_args};
use docxr::pattern::{MatchMode, PatternSet, literal_preset, regex_preset};
use docxr::report::{Console, format_summary, format_validation_issues};
use docxr::{config, logger};

fn main() -> Result<()> {
    let args = parse_args()?;

    match args {
        Args::Run {
            patterns,
            paths,
            regex,
            mode,
            output_dir,
            details,
        } => {
            run(&patterns, &paths, regex, mode, output_dir, details)?;
        }
        Args::Template { regex } => {
            println!(
                "{}",
                if regex {
                    regex_preset()
                } else {
                    literal_preset()
                }
            );
        }
        Args::Validate { patterns, regex } => {
            validate(&patterns, regex)?;
        }
        Args::Config => {
            show_config()?;
        }
    }

    Ok(())
}

fn run(
    patterns_path: &str,
    paths: &[String],
    regex: bool,
    mode: RunMode,
    output_dir: Option<String>,
    details: bool,
) -> Result<()> {
    let config = config::load_config()?;
    config::validate_config(&config)?;
    let _log_path = logger::init_debug_logging(config.logging.debug.unwrap_or(false))?;

    let console = Console::new();
    let match_mode = if regex {
        MatchMode::Regex
    } else {
        MatchMode::Literal
    };

    let set = PatternSet::load(Path::new(patterns_path))?;
    let issues = set.validate(match_mode);
    if !issues.is_empty() {
        let cap = config.processing.max_display_errors.unwrap_or(10);
        eprint!("{}", format_validation_issues(&issues, cap));
    }

    let inputs: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
    let files = collect_documents(&inputs)?;

    // --output-dir wins over the configured default
    let output_root = output_dir.or(config.output.default_dir);

    let processor = BatchProcessor::new(set, match_mode).show_details(details);
    let summary = processor.run(
        &files,
        mode,
        output_root.as_deref().map(Path::new),
        &console,
    )?;

    println!("\n{}", format_summary(&summary));
    Ok(())
}

fn validate(patterns_path: &str, regex: bool) -> Result<()> {
    let match_mode = if regex {
        MatchMode::Regex
    } else {
        MatchMode::Literal
    };
    let set = PatternSet::load(Path::new(patterns_path))?;
    let issues = set.validate(match_mode);

    if issues.is_empty() {
        println!(
            "{}: {} pattern(s), no issues found",
            patterns_path,
            set.len()
        );
    } else {
        print!("{}", format_validation_issues(&issues, issues.len()));
        std::process::exit(1);
    }

    Ok(())
}

fn show_config() -> Result<()> {
    // Creates the default file on first use
    let _ = config::load_config()?;
    let path = config::config_file_path()?;

    println!("Configuration file: {}\n", path.display());
    print!("{}", fs::read_to_string(&path)?);

    Ok(())
}
