use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use filelist_gen::{ManifestBuilder, ManifestConfig};

/// Write short and long file lists of the most recent data files before a cutoff.
#[derive(Parser, Debug)]
#[command(name = "filelist_gen", version, about)]
struct Args {
  /// JSON configuration file (defaults to ./filelist.config.json when present).
  #[arg(long)]
  config: Option<PathBuf>,
  /// Directory to scan.
  #[arg(long)]
  source_dir: Option<PathBuf>,
  /// Glob applied to file names, e.g. "*.h5".
  #[arg(long)]
  pattern: Option<String>,
  /// Exclusive cutoff, RFC 3339 or "YYYY-MM-DD HH:MM[:SS]" in local time.
  #[arg(long)]
  cutoff: Option<String>,
  /// Destination of the short manifest.
  #[arg(long)]
  output_short: Option<PathBuf>,
  /// Destination of the long manifest.
  #[arg(long)]
  output_long: Option<PathBuf>,
  /// Also write a JSON summary of the selection to this path.
  #[arg(long)]
  summary: Option<PathBuf>,
}

impl Args {
  /// Resolve the configuration, discovering `filelist.config.json` in `dir` unless a
  /// file was named explicitly, then apply flag overrides.
  fn into_config(self, dir: &Path) -> Result<ManifestConfig> {
    let mut config = match &self.config {
      Some(path) => ManifestConfig::load_from_path(path)?,
      None => ManifestConfig::discover(dir)?,
    };

    if let Some(source_dir) = self.source_dir {
      config.source_dir = source_dir;
    }
    if let Some(pattern) = self.pattern {
      config.pattern = pattern;
    }
    if let Some(cutoff) = self.cutoff {
      config.cutoff = cutoff;
    }
    if let Some(output_short) = self.output_short {
      config.output_short = output_short;
    }
    if let Some(output_long) = self.output_long {
      config.output_long = output_long;
    }
    if self.summary.is_some() {
      config.summary = self.summary;
    }
    Ok(config)
  }
}

fn main() -> Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

  let cwd = std::env::current_dir().context("failed to resolve working directory")?;
  let config = Args::parse()
    .into_config(&cwd)
    .context("failed to load configuration")?;
  let builder = ManifestBuilder::new(config).context("invalid configuration")?;
  let report = builder.build().with_context(|| {
    format!(
      "failed to generate file lists from {}",
      builder.config().source_dir.display()
    )
  })?;

  log::info!(
    "{} short and {} long entries from {} qualifying files",
    report.short_written,
    report.long_written,
    report.qualifying
  );
  println!("Done: wrote to short and long file lists.");
  Ok(())
}
