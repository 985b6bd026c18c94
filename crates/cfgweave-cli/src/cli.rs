//! CLI argument parsing using clap derive

use std::path::PathBuf;

use cfgweave::{AggregationSpec, MissingPolicy, Segment};
use clap::{Parser, ValueEnum};

/// cfgweave - Load, merge and print configuration files
///
/// Files are merged in the order given; overlay tokens after `--` win over
/// every file.
///
/// Examples:
///   cfgweave base.toml local.yaml
///   cfgweave app.json --section server --output yaml
///   cfgweave app.json -- +server.port 8081 ++extra.ini
#[derive(Parser, Debug)]
#[command(name = "cfgweave")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration files, lowest precedence first
    pub files: Vec<PathBuf>,

    /// Dotted path of the section to keep from every file (digits index
    /// into sequences)
    #[arg(short, long)]
    pub section: Option<String>,

    /// What to do with `${NAME}` references that cannot be resolved
    #[arg(long, default_value = "raise", env = "CFGWEAVE_ON_MISSING")]
    pub on_missing: MissingPolicy,

    /// Read files verbatim, without `${NAME}` substitution
    #[arg(long)]
    pub no_interpolation: bool,

    /// How files and overlays are merged
    #[arg(short, long, value_enum, default_value_t = Aggregation::Infer)]
    pub aggregation: Aggregation,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Output::Json)]
    pub output: Output,

    /// Token opening the overlay section (default: the first token)
    #[arg(long)]
    pub cli_section: Option<String>,

    /// Token closing the overlay section
    #[arg(long, default_value = "/")]
    pub cli_section_end: String,

    /// List the supported file extensions and exit
    #[arg(long)]
    pub list_formats: bool,

    /// Overlay tokens: `++path` adds a file, `+key.path value` sets a value
    #[arg(last = true, allow_hyphen_values = true)]
    pub overlays: Vec<String>,
}

/// Merge strategy names accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Overlay mappings, concatenate sequences
    Infer,
    /// Shallow merge, later sources win per top-level key
    Overlay,
    /// Recursive merge of nested mappings
    Deep,
    /// Concatenate sequences
    Concat,
}

impl From<Aggregation> for AggregationSpec {
    fn from(aggregation: Aggregation) -> Self {
        match aggregation {
            Aggregation::Infer => Self::Infer,
            Aggregation::Overlay => Self::Overlay,
            Aggregation::Deep => Self::DeepMerge,
            Aggregation::Concat => Self::Concat,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Json,
    Yaml,
    Toml,
}

impl Output {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        }
    }
}

/// Split a dotted section path; all-digit segments index into sequences.
pub fn section_path(raw: &str) -> Vec<Segment> {
    raw.split('.')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.parse::<usize>() {
            Ok(index) => Segment::Index(index),
            Err(_) => Segment::Key(segment.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_files_and_overlays() {
        let cli = Cli::parse_from(["cfgweave", "a.json", "b.yaml", "--", "+x", "1", "++c.toml"]);
        assert_eq!(cli.files, vec![PathBuf::from("a.json"), PathBuf::from("b.yaml")]);
        assert_eq!(cli.overlays, vec!["+x", "1", "++c.toml"]);
        assert_eq!(cli.output, Output::Json);
        assert_eq!(cli.aggregation, Aggregation::Infer);
        assert_eq!(cli.cli_section_end, "/");
    }

    #[test]
    fn parse_options() {
        let cli = Cli::parse_from([
            "cfgweave",
            "-v",
            "--on-missing",
            "blank",
            "--aggregation",
            "deep",
            "--output",
            "toml",
            "--section",
            "server",
            "a.json",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.on_missing, MissingPolicy::Blank);
        assert_eq!(cli.aggregation, Aggregation::Deep);
        assert_eq!(cli.output, Output::Toml);
        assert_eq!(cli.section.as_deref(), Some("server"));
    }

    #[test]
    fn parse_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["cfgweave", "--on-missing", "loud"]).is_err());
    }

    #[test]
    fn section_path_mixes_keys_and_indices() {
        assert_eq!(
            section_path("servers.1.host"),
            vec![
                Segment::Key("servers".into()),
                Segment::Index(1),
                Segment::Key("host".into()),
            ]
        );
    }
}
