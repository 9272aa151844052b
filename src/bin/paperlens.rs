//! CLI binary for paperlens.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalysisConfig`, wires up the file-backed stores, and prints results.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use paperlens::pipeline::encode;
use paperlens::pipeline::extract::extract_text_async;
use paperlens::{
    analyze_chart, answer_question, extract_formula, generate_note, note_stream,
    AnalysisConfig, ChatMessage, CredentialStore, FileStore, Gateway, HistoryContent,
    HistoryItem, HistoryKind, HistoryStore, KeyValueStore, MemoryStore, PagePreview,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "paperlens",
    version,
    about = "Read academic PDFs with AI — notes, formulas, charts, Q&A"
)]
struct Cli {
    /// Chat-completions base URL.
    #[arg(long, env = "PAPERLENS_BASE_URL", global = true)]
    base_url: Option<String>,

    /// API key for this run only (the stored key is untouched).
    #[arg(long, env = "PAPERLENS_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Data directory for the key and history stores.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Text model override.
    #[arg(long, global = true)]
    text_model: Option<String>,

    /// Vision model override.
    #[arg(long, global = true)]
    vision_model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Extract and explain the formula in an image
    Formula { image: PathBuf },
    /// Generate a structured reading note for a PDF
    Note {
        pdf: PathBuf,
        /// Write the note here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Do not save the note to history.
        #[arg(long)]
        no_history: bool,
    },
    /// Analyze a chart image
    Chart { image: PathBuf },
    /// Ask a question about a PDF; the transcript continues across runs
    Chat {
        pdf: PathBuf,
        #[arg(short, long)]
        question: String,
    },
    /// Show a PDF's page count and text-layer stats (no model calls)
    Inspect { pdf: PathBuf },
    /// Render pages to PNG files for preview
    Preview {
        pdf: PathBuf,
        /// Output directory for the PNG files.
        #[arg(short, long, default_value = "preview")]
        out: PathBuf,
        /// Pages to render, 1-indexed ("3" or "2-5"). Default: all.
        #[arg(long)]
        pages: Option<String>,
    },
    /// List and manage past analyses
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store an API key
    Set { key: String },
    /// Show whether a key is stored
    Show,
    /// Remove the stored key
    Clear,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List past analyses, newest first
    List,
    /// Print one item in full
    Show { id: String },
    /// Delete one item
    Delete { id: String },
    /// Delete everything
    Clear,
}

// ── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file_store: Arc<FileStore> = Arc::new(match &cli.data_dir {
        Some(dir) => FileStore::open(dir)?,
        None => FileStore::open_default()?,
    });
    let history = HistoryStore::new(file_store.clone());

    // A --api-key flag is a one-run override: the gateway reads it from an
    // ephemeral in-memory store while history stays on disk.
    let credential_store: Arc<dyn KeyValueStore> = match &cli.api_key {
        Some(key) => {
            let mem = MemoryStore::new();
            mem.set("api_key", key)?;
            Arc::new(mem)
        }
        None => file_store.clone(),
    };

    let mut builder = AnalysisConfig::builder();
    if let Some(url) = &cli.base_url {
        builder = builder.base_url(url);
    }
    if let Some(model) = &cli.text_model {
        builder = builder.text_model(model);
    }
    if let Some(model) = &cli.vision_model {
        builder = builder.vision_model(model);
    }
    let config = builder.build()?;

    match cli.command {
        Command::Key { action } => run_key(action, CredentialStore::new(file_store)),
        Command::Formula { image } => {
            let gateway = Gateway::new(config, credential_store)?;
            run_formula(&gateway, &image).await
        }
        Command::Note {
            pdf,
            output,
            no_history,
        } => {
            let gateway = Gateway::new(config, credential_store)?;
            run_note(&gateway, &history, &pdf, output.as_deref(), no_history).await
        }
        Command::Chart { image } => {
            let gateway = Gateway::new(config, credential_store)?;
            run_chart(&gateway, &history, &image).await
        }
        Command::Chat { pdf, question } => {
            let gateway = Gateway::new(config, credential_store)?;
            run_chat(&gateway, &history, &pdf, &question).await
        }
        Command::Inspect { pdf } => run_inspect(&pdf).await,
        Command::Preview { pdf, out, pages } => {
            run_preview(&pdf, &out, pages.as_deref(), config.preview_scale).await
        }
        Command::History { action } => run_history(action, &history),
    }
}

// ── Subcommand implementations ───────────────────────────────────────────────

fn run_key(action: KeyAction, credentials: CredentialStore) -> Result<()> {
    match action {
        KeyAction::Set { key } => {
            credentials.set(&key)?;
            println!("{} API key stored", green("✓"));
        }
        KeyAction::Show => match credentials.get()? {
            Some(key) => {
                let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
                println!("key stored (…{tail})");
            }
            None => println!("no key stored"),
        },
        KeyAction::Clear => {
            credentials.clear()?;
            println!("{} API key removed", green("✓"));
        }
    }
    Ok(())
}

async fn run_formula(gateway: &Gateway, image: &PathBuf) -> Result<()> {
    let bytes = std::fs::read(image)
        .with_context(|| format!("reading image {}", image.display()))?;
    let data_uri = encode::to_data_uri(&bytes, None);

    let result = extract_formula(gateway, &data_uri).await?;
    println!("{}", bold("LaTeX"));
    println!("{}\n", result.latex);
    println!("{}", bold("Explanation"));
    println!("{}", result.explanation);
    Ok(())
}

async fn run_note(
    gateway: &Gateway,
    history: &HistoryStore,
    pdf: &PathBuf,
    output: Option<&std::path::Path>,
    no_history: bool,
) -> Result<()> {
    let file_name = file_name_of(pdf);
    let bytes = std::fs::read(pdf).with_context(|| format!("reading {}", pdf.display()))?;
    let doc = extract_text_async(bytes).await?;
    eprintln!(
        "{} {} pages, {} chars of text",
        cyan("◆"),
        doc.pages,
        doc.text.len()
    );

    // Stream chunk notes so the bar can tick; assemble exactly as
    // generate_note does.
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:42.green/238}] {pos}/{len} chunks")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut parts = Vec::new();
    {
        let mut stream = note_stream(gateway, &doc.text);
        while let Some(item) = stream.next().await {
            let chunk_note = item?;
            if bar.length() == Some(0) {
                bar.set_length(chunk_note.total as u64);
            }
            bar.inc(1);
            parts.push(chunk_note.markdown);
        }
    }
    bar.finish_and_clear();

    let note = format!(
        "{} — {file_name}\n\n{}",
        paperlens::prompts::NOTE_HEADING,
        parts.join("\n")
    );

    if !no_history {
        let item = HistoryItem::note(Some(file_name.clone()), note.clone())
            .with_source_preview(preview_of(&doc.text));
        history.insert(item)?;
    }

    match output {
        Some(path) => {
            std::fs::write(path, &note)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("{} note written to {}", green("✓"), path.display());
        }
        None => println!("{note}"),
    }
    Ok(())
}

async fn run_chart(gateway: &Gateway, history: &HistoryStore, image: &PathBuf) -> Result<()> {
    let bytes = std::fs::read(image)
        .with_context(|| format!("reading image {}", image.display()))?;
    let data_uri = encode::to_data_uri(&bytes, None);

    let analysis = analyze_chart(gateway, &data_uri).await?;
    history.insert(HistoryItem::chart(Some(file_name_of(image)), analysis.clone()))?;
    println!("{analysis}");
    Ok(())
}

async fn run_chat(
    gateway: &Gateway,
    history: &HistoryStore,
    pdf: &PathBuf,
    question: &str,
) -> Result<()> {
    let file_name = file_name_of(pdf);
    let bytes = std::fs::read(pdf).with_context(|| format!("reading {}", pdf.display()))?;
    let doc = extract_text_async(bytes).await?;

    // Continue the newest chat transcript for this file, if one exists.
    let existing = history
        .list()?
        .into_iter()
        .find(|item| item.kind == HistoryKind::Chat && item.file_name.as_deref() == Some(&file_name));
    let mut transcript = match &existing {
        Some(HistoryItem {
            content: HistoryContent::Transcript(messages),
            ..
        }) => messages.clone(),
        _ => Vec::new(),
    };

    let answer = answer_question(gateway, &doc.text, &transcript, question).await?;

    transcript.push(ChatMessage::user(question));
    transcript.push(ChatMessage::model(&answer));
    let mut item = HistoryItem::chat(Some(file_name), transcript)
        .with_source_preview(preview_of(&doc.text));
    if let Some(previous) = existing {
        // Same id: the refreshed transcript replaces the old entry and
        // moves to the front of the history.
        item.id = previous.id;
    }
    history.insert(item)?;

    println!("{answer}");
    Ok(())
}

async fn run_inspect(pdf: &PathBuf) -> Result<()> {
    let bytes = std::fs::read(pdf).with_context(|| format!("reading {}", pdf.display()))?;
    let doc = extract_text_async(bytes).await?;
    println!("{}", bold(&file_name_of(pdf)));
    println!("pages: {}", doc.pages);
    println!("text chars: {}", doc.text.len());
    println!("{}", dim(&preview_of(&doc.text)));
    Ok(())
}

async fn run_preview(
    pdf: &PathBuf,
    out: &PathBuf,
    pages: Option<&str>,
    scale: f32,
) -> Result<()> {
    let bytes = std::fs::read(pdf).with_context(|| format!("reading {}", pdf.display()))?;
    let preview = PagePreview::new(bytes, scale);
    let total = preview.page_count().await?;

    let (first, last) = match pages {
        Some(spec) => parse_page_range(spec, total)?,
        None => (1, total),
    };

    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    let stem = pdf
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page")
        .to_string();

    for page in first..=last {
        let png = preview.render_page(page - 1).await?;
        let path = out.join(format!("{stem}_{page}.png"));
        std::fs::write(&path, png.as_slice())
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  {} {}", green("✓"), path.display());
    }
    Ok(())
}

fn run_history(action: HistoryAction, history: &HistoryStore) -> Result<()> {
    match action {
        HistoryAction::List => {
            let items = history.list()?;
            if items.is_empty() {
                println!("history is empty");
                return Ok(());
            }
            for item in items {
                let kind = match item.kind {
                    HistoryKind::Note => "note ",
                    HistoryKind::Chart => "chart",
                    HistoryKind::Chat => "chat ",
                };
                println!(
                    "{}  {}  {}  {}",
                    dim(&item.id[..8.min(item.id.len())]),
                    kind,
                    item.timestamp.format("%Y-%m-%d %H:%M"),
                    item.file_name.as_deref().unwrap_or("-"),
                );
            }
        }
        HistoryAction::Show { id } => {
            let items = history.list()?;
            let item = items
                .into_iter()
                .find(|item| item.id == id || item.id.starts_with(&id))
                .with_context(|| format!("no history item matching '{id}'"))?;
            match item.content {
                HistoryContent::Text(text) => println!("{text}"),
                HistoryContent::Transcript(messages) => {
                    for message in messages {
                        let speaker = match message.role {
                            paperlens::Role::User => bold("you"),
                            paperlens::Role::Model => cyan("ai"),
                        };
                        println!("{speaker}: {}\n", message.text);
                    }
                }
            }
        }
        HistoryAction::Delete { id } => {
            if history.delete(&id)? {
                println!("{} deleted", green("✓"));
            } else {
                bail!("no history item with id '{id}'");
            }
        }
        HistoryAction::Clear => {
            history.clear()?;
            println!("{} history cleared", green("✓"));
        }
    }
    Ok(())
}

// ── Small helpers ────────────────────────────────────────────────────────────

fn file_name_of(path: &PathBuf) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string()
}

fn preview_of(text: &str) -> String {
    let short: String = text.chars().take(160).collect();
    if text.chars().count() > 160 {
        format!("{short}…")
    } else {
        short
    }
}

/// Parse a 1-indexed page spec: "3" or "2-5".
fn parse_page_range(spec: &str, total: usize) -> Result<(usize, usize)> {
    let (first, last) = match spec.split_once('-') {
        Some((a, b)) => (a.trim().parse()?, b.trim().parse()?),
        None => {
            let page: usize = spec.trim().parse()?;
            (page, page)
        }
    };
    if first == 0 || last < first || last > total {
        bail!("page range {spec} is invalid for a {total}-page document");
    }
    Ok((first, last))
}
