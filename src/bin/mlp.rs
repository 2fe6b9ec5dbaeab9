//! mlp CLI - wikitext trees to placeholder prose, and tagged-token reconciliation

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use mlptext::{
    reconcile_pretagged, render_batch, unwind_links, MlpError, MlpResult, Page, ReconcileOptions,
    ReconciledDocument, RenderOptions, RenderedDocument, SimpleIdentifierExtractor, TaggedSentence,
};
#[cfg(feature = "cli")]
use rayon::prelude::*;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "mlp")]
#[command(version)]
#[command(about = "Wikitext markup trees to placeholder prose, and tagged-token reconciliation", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Pretty print the JSON output
    #[arg(short, long, global = true)]
    pretty: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Render parsed pages (JSON page or array of pages) to placeholder text
    Render {
        /// Input file path (reads from stdin if not provided)
        input: Option<String>,

        /// Populate the registry only, without prose
        #[arg(long)]
        tags_only: bool,

        /// Only explicit math markup becomes a formula
        #[arg(long)]
        literal: bool,

        /// Share one placeholder between identical formulas
        #[arg(long)]
        reuse_formulas: bool,

        /// Do not write newlines into section text
        #[arg(long)]
        flat: bool,

        /// Add the restored full text to every document
        #[arg(long)]
        full_text: bool,
    },

    /// Reconcile pre-tagged sections against rendered documents
    Reconcile {
        /// Input file with an array of {document, tagged} jobs (stdin if not provided)
        input: Option<String>,

        /// Keep tokens unmerged
        #[arg(long)]
        no_merge: bool,

        /// Characters of a formula token used as its registry key
        #[arg(long, default_value_t = 40)]
        cutoff: usize,
    },
}

/// One rendered document as written by `mlp render`
#[cfg(feature = "cli")]
#[derive(Serialize)]
struct RenderRecord {
    #[serde(flatten)]
    document: RenderedDocument,
    /// Section text to hand to the tagger
    tagger_input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_text: Option<String>,
}

/// Input of `mlp reconcile`: a rendered document and its tagged sections
#[cfg(feature = "cli")]
#[derive(Deserialize)]
struct ReconcileJob {
    document: RenderedDocument,
    #[serde(default)]
    tagged: Vec<Vec<TaggedSentence>>,
}

#[cfg(feature = "cli")]
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[cfg(feature = "cli")]
impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[cfg(feature = "cli")]
fn write_output<T: Serialize>(value: &T, output: Option<&str>, pretty: bool) -> MlpResult<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match output {
        Some(path) => fs::write(path, json)?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", json)?;
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> MlpResult<()> {
    match cli.command {
        Commands::Render {
            input,
            tags_only,
            literal,
            reuse_formulas,
            flat,
            full_text,
        } => {
            let source = read_input(input.as_deref())?;
            let pages: Vec<Page> = serde_json::from_str::<OneOrMany<Page>>(&source)?.into_vec();
            let options = RenderOptions {
                reuse_formula_placeholders: reuse_formulas,
                skip_hidden_math: literal,
                suppress_output: tags_only,
                emit_newlines: !flat,
            };

            let records: Vec<RenderRecord> = render_batch(&pages, &options)
                .into_iter()
                .map(|document| {
                    let tagger_input = document
                        .sections
                        .iter()
                        .map(|section| unwind_links(&document.registry, section).text)
                        .collect();
                    let full_text = if full_text { Some(document.full_text()) } else { None };
                    RenderRecord {
                        document,
                        tagger_input,
                        full_text,
                    }
                })
                .collect();
            log::info!("rendered {} documents", records.len());
            write_output(&records, cli.output.as_deref(), cli.pretty)
        }
        Commands::Reconcile {
            input,
            no_merge,
            cutoff,
        } => {
            if cutoff == 0 {
                return Err(MlpError::invalid("cutoff must be positive"));
            }
            let source = read_input(input.as_deref())?;
            let jobs: Vec<ReconcileJob> = serde_json::from_str::<OneOrMany<ReconcileJob>>(&source)?.into_vec();
            let options = ReconcileOptions {
                formula_key_cutoff: cutoff,
                merge_phrases: !no_merge,
            };
            let extractor = SimpleIdentifierExtractor::new();

            let results: Vec<ReconciledDocument> = jobs
                .into_par_iter()
                .map(|mut job| reconcile_pretagged(&mut job.document, job.tagged, &extractor, &options))
                .collect();
            log::info!("reconciled {} documents", results.len());
            write_output(&results, cli.output.as_deref(), cli.pretty)
        }
    }
}

#[cfg(feature = "cli")]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install mlptext --features cli");
    eprintln!("  mlp render [INPUT_FILE]");
    eprintln!("  mlp reconcile [INPUT_FILE]");
}
