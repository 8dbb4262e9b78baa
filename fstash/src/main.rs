mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fstash_core::{CreateOptions, DEFAULT_SKIP_DIRS, STASH_DEPTH, StashHome, TemplateData};
use output::{CreateOutput, DeleteOutput, ExpandOutput, ListOutput, OutputWriter, PathOutput};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// fstash - stash directory snapshots by name and expand them later
#[derive(Parser)]
#[command(name = "fstash")]
#[command(about = "Stash directory snapshots by name and expand them, with templating", long_about = None)]
#[command(version)]
struct Cli {
    /// Stash home directory (defaults to FSTASH_HOME, then ~/.fstash)
    #[arg(long, global = true, env = "FSTASH_HOME")]
    home: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a directory tree as a named stash
    Create {
        /// Stash name (letters, digits, '-' and '_'; case-insensitive)
        name: String,

        /// Directory to stash
        #[arg(default_value = ".")]
        source: PathBuf,

        /// Additional directory names to leave out (`.git` is always skipped)
        #[arg(long = "skip", value_name = "DIR")]
        skip: Vec<String>,

        /// Remove the existing stash of this name before copying
        #[arg(long)]
        replace: bool,
    },

    /// Write a stash into a directory, rendering templates
    Expand {
        /// Stash name
        name: String,

        /// Destination directory
        #[arg(default_value = ".")]
        dest: PathBuf,

        /// Template data for files with the given stem, as a JSON object
        #[arg(long = "data", value_name = "STEM=JSON", value_parser = parse_pair)]
        data: Vec<(String, String)>,

        /// Template data for files with the given stem, read from a JSON file
        #[arg(long = "data-file", value_name = "STEM=PATH", value_parser = parse_pair)]
        data_files: Vec<(String, String)>,
    },

    /// Delete a stash (succeeds if it does not exist)
    Delete {
        /// Stash name
        name: String,
    },

    /// List stash names, or directory names at a given depth of the home
    List {
        /// Depth below the home (stash names live at depth 5)
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Print the storage path of a stash
    Path {
        /// Stash name
        name: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("FSTASH_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let output = OutputWriter::new(cli.json);
    let home = StashHome::new(resolve_home(cli.home));

    let result = match cli.command {
        Commands::Create {
            name,
            source,
            skip,
            replace,
        } => cmd_create(&home, &output, &name, &source, skip, replace),
        Commands::Expand {
            name,
            dest,
            data,
            data_files,
        } => cmd_expand(&home, &output, &name, &dest, data, data_files),
        Commands::Delete { name } => cmd_delete(&home, &output, &name),
        Commands::List { depth } => cmd_list(&home, &output, depth),
        Commands::Path { name } => cmd_path(&home, &output, &name),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code(&err);
            output.write_error(&err, code);
            ExitCode::from(code)
        }
    }
}

/// Determine stash home: --home / FSTASH_HOME > ~/.fstash > ./.fstash
fn resolve_home(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| dirs::home_dir().map(|h| h.join(".fstash")))
        .unwrap_or_else(|| PathBuf::from(".fstash"))
}

/// Exit code for a failed command.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<fstash_core::Error>()
        .map(|e| e.kind().exit_code())
        .unwrap_or(1)
}

/// Split `STEM=VALUE` at the first `=`.
fn parse_pair(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected STEM=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty stem in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Merge inline data and data files; later entries win.
fn collect_template_data(
    inline: Vec<(String, String)>,
    files: Vec<(String, String)>,
) -> Result<TemplateData> {
    let mut data = TemplateData::new();
    for (stem, path) in files {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read template data file: {}", path))?;
        data.insert(stem, raw);
    }
    data.extend(inline);
    Ok(data)
}

fn cmd_create(
    home: &StashHome,
    output: &OutputWriter,
    name: &str,
    source: &Path,
    skip: Vec<String>,
    replace: bool,
) -> Result<()> {
    let mut options = CreateOptions {
        replace,
        ..CreateOptions::default()
    };
    options
        .skip_dirs
        .extend(skip.into_iter().filter(|d| !DEFAULT_SKIP_DIRS.contains(&d.as_str())));

    let stats = home
        .create_with(name, source, &options)
        .with_context(|| format!("Failed to create stash '{}' from {}", name, source.display()))?;
    let path = home.path_of(name)?;

    let data = CreateOutput {
        success: true,
        result_code: 0,
        name: fstash_core::normalize(name),
        source: source.display().to_string(),
        path: path.display().to_string(),
        stats,
    };
    output.write(&data, || {
        format!(
            "Created stash {} ({} files, {} bytes)\n",
            data.name, stats.files, stats.bytes
        )
    })
}

fn cmd_expand(
    home: &StashHome,
    output: &OutputWriter,
    name: &str,
    dest: &Path,
    inline: Vec<(String, String)>,
    files: Vec<(String, String)>,
) -> Result<()> {
    let template_data = collect_template_data(inline, files)?;

    let stats = home
        .expand(name, dest, &template_data)
        .with_context(|| format!("Failed to expand stash '{}' into {}", name, dest.display()))?;

    let data = ExpandOutput {
        success: true,
        result_code: 0,
        name: fstash_core::normalize(name),
        destination: dest.display().to_string(),
        stats,
    };
    output.write(&data, || {
        format!(
            "Expanded {} into {} ({} files, {} rendered)\n",
            data.name, data.destination, stats.files, stats.rendered
        )
    })
}

fn cmd_delete(home: &StashHome, output: &OutputWriter, name: &str) -> Result<()> {
    let removed = home
        .delete(name)
        .with_context(|| format!("Failed to delete stash '{}'", name))?;

    let data = DeleteOutput {
        success: true,
        result_code: 0,
        name: fstash_core::normalize(name),
        removed,
    };
    output.write(&data, || {
        if removed {
            format!("Deleted stash {}\n", data.name)
        } else {
            format!("No stash named {}\n", data.name)
        }
    })
}

fn cmd_list(home: &StashHome, output: &OutputWriter, depth: Option<usize>) -> Result<()> {
    let names = match depth {
        Some(depth) => home.list(depth),
        None => home.stashes(),
    }
    .with_context(|| format!("Failed to list {}", home.root().display()))?;

    let data = ListOutput {
        success: true,
        result_code: 0,
        depth: depth.unwrap_or(STASH_DEPTH),
        names,
    };
    output.write(&data, || {
        if data.names.is_empty() {
            "No stashes (use 'fstash create <name>' to make one)\n".to_string()
        } else {
            data.names.iter().map(|n| format!("{}\n", n)).collect()
        }
    })
}

fn cmd_path(home: &StashHome, output: &OutputWriter, name: &str) -> Result<()> {
    let path = home.path_of(name)?;

    let data = PathOutput {
        success: true,
        result_code: 0,
        name: fstash_core::normalize(name),
        exists: path.is_dir(),
        path: path.display().to_string(),
    };
    output.write(&data, || format!("{}\n", data.path))
}
