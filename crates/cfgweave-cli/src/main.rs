//! cfgweave CLI
//!
//! Loads configuration files and command line overlays, merges them and
//! prints the result.

mod cli;
mod error;

use cfgweave::{CliOptions, ConfigLoader, InterpolationSpec, Registry, SectionSpec};
use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, section_path};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;
        tracing::debug!("Verbose mode enabled");
    }

    let registry = Registry::with_builtins();

    if cli.list_formats {
        for (extension, parser) in registry.formats().describe() {
            println!("{:<8} {}", extension.cyan(), parser);
        }
        return Ok(());
    }

    if cli.files.is_empty() && cli.overlays.is_empty() {
        return Err(CliError::user(format!(
            "no configuration sources given; run {} for usage",
            "cfgweave --help".cyan()
        )));
    }

    let rendered = load(cli, &registry)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

fn load(cli: Cli, registry: &Registry) -> Result<String> {
    let interpolation = if cli.no_interpolation {
        InterpolationSpec::Absent
    } else {
        InterpolationSpec::Environment(cli.on_missing)
    };
    let section = match cli.section.as_deref() {
        None | Some("") => SectionSpec::Absent,
        Some(path) => SectionSpec::Path(section_path(path)),
    };
    let mut overlay = CliOptions::default().section_end(Some(cli.cli_section_end));
    if let Some(name) = cli.cli_section {
        overlay = overlay.section(name);
    }

    let config = ConfigLoader::new()
        .registry(registry.clone())
        .files(cli.files)
        .interpolation(interpolation)
        .section(section)
        .aggregation(cli.aggregation.into())
        .cli(overlay)
        .args(cli.overlays)
        .load()?;

    let renderer = registry.formats().for_extension(cli.output.extension())?;
    Ok(renderer.render(&config)?)
}
