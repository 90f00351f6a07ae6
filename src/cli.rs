//! Minimal CLI: java sources → (mock | export)
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::Settings;
use crate::export;
use crate::java::{parser, SourceIndex};
use crate::mock::Synthesizer;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// synthesize example payloads from Java controller sources and export them as a Postman collection
#[derive(Parser, Debug)]
#[command(name = "postman-mock", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the mock value of a single type as JSON
    Mock(MockOut),
    /// scan controllers and write a Postman v2.1.0 collection
    Export(ExportOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal `.java` paths, directories, or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JSON settings file (exportName, contextPath, baseUrl, opaquePrefixes)
    #[arg(long)]
    config: Option<PathBuf>,

    /// extra namespace prefix treated as opaque (repeatable)
    #[arg(long = "opaque-prefix")]
    opaque_prefixes: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct MockOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// type to synthesize, e.g. `User` or `Result<Page<User>>`
    #[arg(long = "type", short = 't')]
    type_name: String,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ExportOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// collection name used when no controller has a `@menu` tag
    #[arg(long)]
    name: Option<String>,

    /// path prefixed to every request
    #[arg(long)]
    context_path: Option<String>,

    /// host part of every request URL
    #[arg(long)]
    base_url: Option<String>,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = Settings::load_or_default(self.config.as_deref())?;
        for prefix in &self.opaque_prefixes {
            if !settings.opaque_prefixes.contains(prefix) {
                settings.opaque_prefixes.push(prefix.clone());
            }
        }
        Ok(settings)
    }

    /// Parse every input in parallel; unreadable or unparsable files are
    /// reported and skipped.
    fn load_index(&self) -> anyhow::Result<SourceIndex> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        if source_paths.is_empty() {
            bail!("no .java files matched the given inputs");
        }
        let units: Vec<_> = source_paths
            .par_iter()
            .filter_map(|source_path| {
                let path = source_path.to_string_lossy().to_string();
                let parsed = std::fs::read_to_string(source_path)
                    .map_err(|error| error.to_string())
                    .and_then(|src| parser::parse_unit(&src).map_err(|error| error.to_string()));
                match parsed {
                    Ok(unit) => Some((path, unit)),
                    Err(error) => {
                        warn!(%path, %error, "skipping source file");
                        eprintln!("{} {path}: {error}", "skipped".yellow().bold());
                        None
                    }
                }
            })
            .collect();
        info!(files = units.len(), "parsed sources");
        Ok(SourceIndex::from_units(units))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Mock(target) => {
                let settings = target.input_settings.settings()?;
                let index = target.input_settings.load_index()?;
                let ty = index
                    .resolve_type_text(&target.type_name)
                    .with_context(|| format!("invalid type `{}`", target.type_name))?;
                let value = Synthesizer::with_opaque_prefixes(&index, settings.opaque_prefixes)
                    .mock(&ty)
                    .with_context(|| format!("failed to synthesize `{}`", target.type_name))?;
                let json_src = serde_json::to_string_pretty(&value.to_json())?;
                emit(target.out.as_deref(), &json_src)?;
                status(&format!("mocked {}", ty.presentable_text()), target.out.as_deref());
            }
            Command::Export(target) => {
                let mut settings = target.input_settings.settings()?;
                if let Some(name) = &target.name {
                    settings.export_name = name.clone();
                }
                if let Some(context_path) = &target.context_path {
                    settings.context_path = context_path.clone();
                }
                if let Some(base_url) = &target.base_url {
                    settings.base_url = base_url.clone();
                }
                let index = target.input_settings.load_index()?;
                let collection = export::export_collection(&index, &settings)?;
                let json_src = serde_json::to_string_pretty(&collection)?;
                emit(target.out.as_deref(), &json_src)?;
                let requests: usize = collection.item.iter().map(|f| f.item.len()).sum();
                status(
                    &format!("exported {} ({} folders, {requests} requests)", collection.info.name, collection.item.len()),
                    target.out.as_deref(),
                );
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn emit(out: Option<&Path>, src: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{src}"),
    }
    Ok(())
}

fn status(message: &str, out: Option<&Path>) {
    match out {
        Some(out) => eprintln!("{} {message} → {}", "done".green().bold(), out.display()),
        None => eprintln!("{} {message}", "done".green().bold()),
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    fn expand(pattern: &str, out: &mut Vec<PathBuf>) -> anyhow::Result<bool> {
        let mut matched_any = false;
        for entry in glob::glob(pattern)? {
            out.push(entry?);
            matched_any = true;
        }
        Ok(matched_any)
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            if !expand(pattern, &mut out)? {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else if Path::new(pattern).is_dir() {
            // A directory means every `.java` file beneath it
            let nested = format!("{}/**/*.java", pattern.trim_end_matches('/'));
            expand(&nested, &mut out)?;
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    out.sort();
    out.dedup();
    Ok(out)
}
