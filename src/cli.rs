use crate::batch::RunMode;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "

License: MIT
Rust Edition: 2024"
);

#[derive(Parser)]
#[command(name = "docxr")]
#[command(about = "Bulk find-and-replace for Word documents with dry-run preview")]
#[command(long_about = "docxr applies an ordered set of find/replace patterns to every
paragraph and table cell of one or more .docx files.

Patterns come from a JSON file mapping search strings to replacement
templates. Object order matters: patterns are applied in sequence, so a
later pattern sees the output of earlier ones.

By default nothing is written - docxr previews what would change.
Use --in-place to edit the originals, or --output-dir to write modified
copies into a timestamped session folder.

MATCH MODES:
  literal (default) - search strings are plain substrings
  -r, --regex       - search strings are regular expressions; replacement
                      templates may use the {{match}} placeholder to splice
                      in captured groups (one group per occurrence, left to
                      right; with no groups, the whole match)

EXAMPLES:
  docxr patterns.json contract.docx              Preview changes
  docxr patterns.json ./contracts/               Preview a whole folder
  docxr patterns.json a.docx --in-place          Edit the file itself
  docxr patterns.json a.docx -o ./out            Write a modified copy
  docxr patterns.json a.docx --copies            Copy into the configured dir
  docxr -r regex.json a.docx --details           Regex mode, per-node audit
  docxr template --regex > regex.json            Starter regex pattern file
  docxr validate patterns.json                   Check a pattern file")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = LONG_VERSION)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON pattern file (search -> replacement template, order-preserving)
    #[arg(value_name = "PATTERNS")]
    patterns: Option<String>,

    /// Documents or folders to process (folders are scanned for .docx)
    #[arg(value_name = "PATH")]
    paths: Vec<String>,

    /// Treat search patterns as regular expressions
    #[arg(short = 'r', long)]
    #[arg(help = "Treat search patterns as regular expressions\nReplacement templates may use the {{match}} capture placeholder.")]
    regex: bool,

    /// Dry run mode (preview changes without applying)
    #[arg(short = 'd', long, alias = "dry-run")]
    #[arg(help = "Preview changes without modifying files\nThis is the default behavior. Use --in-place or --output-dir to write.")]
    dry_run: bool,

    /// Modify the original files
    #[arg(long = "in-place", conflicts_with_all = ["output_dir", "dry_run"])]
    #[arg(help = "Overwrite the original files\nEach file is written atomically (temp file + rename).")]
    in_place: bool,

    /// Write modified copies under DIR
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", conflicts_with = "dry_run")]
    #[arg(help = "Write modified copies under DIR\nCopies land in DIR/modified_<timestamp>/ with collision-safe names.")]
    output_dir: Option<String>,

    /// Write modified copies using the configured output directory
    #[arg(long, conflicts_with_all = ["dry_run", "in_place"])]
    #[arg(help = "Write modified copies using the configured output directory\nReads [output] default_dir from ~/.docxr/config.toml; --output-dir overrides.")]
    copies: bool,

    /// Print each changed node's audit record
    #[arg(long)]
    #[arg(help = "Print each changed node's audit record\nShows location path plus truncated before/after previews.")]
    details: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a starter pattern file
    #[command(long_about = "Print a starter pattern file to stdout.

Without flags, prints the literal-mode legal-token migration map.
With --regex, prints the regex-mode map using {{match}} templates.

EXAMPLES:
  docxr template > patterns.json            Literal starter file
  docxr template --regex > regex.json       Regex starter file")]
    Template {
        /// Print the regex-mode preset instead of the literal one
        #[arg(long)]
        regex: bool,
    },

    /// Validate a pattern file without touching any document
    #[command(long_about = "Check a pattern file for problems.

Reports empty search patterns, oversized patterns, non-string replacement
values, and (in regex mode) patterns that fail to compile. All issues are
listed; nothing short-circuits.

EXAMPLES:
  docxr validate patterns.json               Literal-mode checks
  docxr validate regex.json --regex          Also compile each regex")]
    Validate {
        /// JSON pattern file to check
        #[arg(value_name = "PATTERNS")]
        patterns: String,

        /// Validate search patterns as regular expressions
        #[arg(short = 'r', long)]
        regex: bool,
    },

    /// Show configuration
    #[command(long_about = "Show the docxr configuration.

Prints the configuration file path and contents. A default file is
created at ~/.docxr/config.toml on first use.

EXAMPLES:
  docxr config                     Show configuration")]
    Config,
}

pub fn parse_args() -> Result<Args> {
    from_cli(Cli::parse())
}

fn from_cli(cli: Cli) -> Result<Args> {
    match cli.command {
        Some(Commands::Template { regex }) => Ok(Args::Template { regex }),
        Some(Commands::Validate { patterns, regex }) => Ok(Args::Validate { patterns, regex }),
        Some(Commands::Config) => Ok(Args::Config),
        None => {
            let patterns = cli
                .patterns
                .context("Missing pattern file. Usage: docxr patterns.json file.docx")?;

            let mode = if cli.in_place {
                RunMode::InPlace
            } else if cli.copies || cli.output_dir.is_some() {
                RunMode::CopyToOutput
            } else {
                RunMode::DryRun
            };

            Ok(Args::Run {
                patterns,
                paths: cli.paths,
                regex: cli.regex,
                mode,
                output_dir: cli.output_dir,
                details: cli.details,
            })
        }
    }
}

#[derive(Debug)]
pub enum Args {
    Run {
        patterns: String,
        paths: Vec<String>,
        regex: bool,
        mode: RunMode,
        output_dir: Option<String>,
        details: bool,
    },
    Template {
        regex: bool,
    },
    Validate {
        patterns: String,
        regex: bool,
    },
    Config,
}
