//! CLI binary for edgequake-briefly.
//!
//! A thin shim over the library crate: maps CLI flags to `ClientConfig`,
//! drives one `Session` through extraction and summarisation, and prints
//! the result.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_briefly::pipeline::input::has_accepted_extension;
use edgequake_briefly::{
    ClientConfig, ExtractionTemplate, GeminiClient, ProgressCallback, Session,
    SessionProgressCallback, Stage, SummaryLength, TextStats, UploadedFile, ACCEPTED_EXTENSIONS,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner shown while a request is in flight; one log line per outcome.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::hidden();
        let style =
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        Arc::new(Self { bar })
    }

    fn spin(&self, prefix: &'static str, msg: String) {
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.bar.reset_elapsed();
        self.bar.set_prefix(prefix);
        self.bar.set_message(msg);
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn stop(&self) {
        self.bar.disable_steady_tick();
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
}

impl SessionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, file_name: &str, template: ExtractionTemplate) {
        let what = match template {
            ExtractionTemplate::Pdf => "Extracting PDF content…",
            ExtractionTemplate::Ocr => "Processing with OCR…",
        };
        self.spin("Extracting", format!("{file_name}: {what}"));
    }

    fn on_extraction_complete(&self, stats: TextStats) {
        let elapsed = self.bar.elapsed();
        self.stop();
        eprintln!(
            "  {} Extracted text  {}  {}",
            green("✓"),
            dim(&format!("{} characters • {} words", stats.characters, stats.words)),
            dim(&format!("{:.1}s", elapsed.as_secs_f64())),
        );
    }

    fn on_summary_start(&self, length: SummaryLength) {
        self.spin("Summarising", format!("Generating {length} summary…"));
    }

    fn on_summary_complete(&self, length: SummaryLength, chars: usize) {
        let elapsed = self.bar.elapsed();
        self.stop();
        eprintln!(
            "  {} {} summary  {}  {}",
            green("✓"),
            capitalise(length.as_str()),
            dim(&format!("{chars} characters")),
            dim(&format!("{:.1}s", elapsed.as_secs_f64())),
        );
    }

    fn on_error(&self, stage: Stage, message: &str) {
        self.stop();
        eprintln!(
            "  {} {} failed  {}",
            red("✗"),
            capitalise(&stage.to_string()),
            red(message)
        );
    }
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Medium summary of a PDF (stdout)
  briefly report.pdf

  # Short summary of a scanned page, saved as short_summary_<millis>.txt
  briefly --length short scan.png -o summaries/

  # Only extract the text
  briefly --extract-only invoice.tiff > invoice.txt

  # Structured output
  briefly --json --length long paper.pdf > paper.json

SUPPORTED FILES:
  PDF, JPEG, PNG, BMP, TIFF, up to 50 MB. The type is taken from the file
  extension; use --mime to override it.

SUMMARY LENGTHS:
  short    2-3 sentences      (≤ 200 tokens)
  medium   1-2 paragraphs     (≤ 500 tokens, default)
  long     3-4 paragraphs     (≤ 1000 tokens)

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (VITE_GEMINI_API_KEY also read)
  BRIEFLY_MODEL           Override model ID
  BRIEFLY_API_BASE        Override the API base URL
  BRIEFLY_LENGTH          Default summary length
  BRIEFLY_OUTPUT_DIR      Directory for exported summaries
"#;

/// Extract text from PDFs and images and summarise it with Gemini.
#[derive(Parser, Debug)]
#[command(
    name = "briefly",
    version,
    about = "Extract text from PDFs and images and summarise it with Gemini",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to process. When several are given only the first is used.
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Summary length.
    #[arg(short, long, env = "BRIEFLY_LENGTH", value_enum, default_value = "medium")]
    length: LengthArg,

    /// Declared MIME type, instead of guessing from the extension.
    #[arg(long)]
    mime: Option<String>,

    /// Save the summary as `{length}_summary_{millis}.txt` in this directory.
    #[arg(short, long, env = "BRIEFLY_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Print the extracted text and stop.
    #[arg(long)]
    extract_only: bool,

    /// Output a JSON report (file, stats, text, summary) instead of plain text.
    #[arg(long, env = "BRIEFLY_JSON")]
    json: bool,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model ID.
    #[arg(long, env = "BRIEFLY_MODEL", default_value = edgequake_briefly::config::DEFAULT_MODEL)]
    model: String,

    /// API base URL.
    #[arg(long, env = "BRIEFLY_API_BASE", default_value = edgequake_briefly::config::DEFAULT_BASE_URL)]
    api_base: String,

    /// Per-request timeout in seconds (none by default).
    #[arg(long, env = "BRIEFLY_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Disable the spinner.
    #[arg(long, env = "BRIEFLY_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BRIEFLY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "BRIEFLY_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LengthArg {
    Short,
    Medium,
    Long,
}

impl From<LengthArg> for SummaryLength {
    fn from(v: LengthArg) -> Self {
        match v {
            LengthArg::Short => SummaryLength::Short,
            LengthArg::Medium => SummaryLength::Medium,
            LengthArg::Long => SummaryLength::Long,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build client ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let client = GeminiClient::new(config).context("Failed to create HTTP client")?;
    debug!(
        "Using model {} at {}",
        client.config().model,
        client.config().base_url
    );

    let mut session = Session::new();
    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        session = session.with_progress(cb);
    }
    session.set_length(cli.length.into());

    // ── Select document ──────────────────────────────────────────────────
    if let Some((first, rest)) = cli.inputs.split_first() {
        for path in rest {
            debug!("Ignoring '{}'; using '{}'", path.display(), first.display());
        }
    }
    let mut files = Vec::with_capacity(1);
    for path in cli.inputs.iter().take(1) {
        if !has_accepted_extension(path) && cli.mime.is_none() {
            debug!(
                "'{}' is not one of .{}",
                path.display(),
                ACCEPTED_EXTENSIONS.join(", .")
            );
        }
        files.push(
            UploadedFile::from_path(path, cli.mime.as_deref())
                .await
                .with_context(|| format!("Cannot open {}", path.display()))?,
        );
    }
    if let Some(result) = session.drop_files(files) {
        result.context("File rejected")?;
    }

    if !cli.quiet && !cli.json {
        if let Some(file) = session.state().file() {
            eprintln!(
                "{} {}  {}",
                bold(&file.name),
                dim(&format!("{} • {}", file.size_label(), file.kind_label())),
                dim(&file.mime_type),
            );
        }
    }

    // ── Extract ──────────────────────────────────────────────────────────
    session
        .extract(&client)
        .await
        .context("Text extraction failed")?;

    if cli.extract_only {
        if cli.json {
            print_json(&session)?;
        } else {
            write_stdout(session.state().extracted_text().unwrap_or_default())?;
        }
        return Ok(());
    }

    // ── Summarise ────────────────────────────────────────────────────────
    session
        .summarize(&client)
        .await
        .context("Summary generation failed")?;

    if cli.json {
        print_json(&session)?;
    } else {
        let summary = session
            .state()
            .summary()
            .map(|s| s.text.as_str())
            .unwrap_or_default();
        write_stdout(summary)?;
    }

    // ── Export ───────────────────────────────────────────────────────────
    if let Some(ref dir) = cli.output_dir {
        match session.export(chrono::Local::now()) {
            Some(export) => {
                let path = export
                    .write_to_dir(dir)
                    .await
                    .context("Failed to save summary")?;
                if !cli.quiet {
                    eprintln!("{}  →  {}", green("✔"), bold(&path.display().to_string()));
                }
            }
            None => {
                if !cli.quiet {
                    eprintln!("{} Summary is empty; nothing saved", red("⚠"));
                }
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let api_key = match cli.api_key {
        Some(ref key) => key.clone(),
        None => ClientConfig::from_env().api_key,
    };

    let mut builder = ClientConfig::builder()
        .api_key(api_key)
        .model(cli.model.clone())
        .base_url(cli.api_base.clone());
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }

    builder.build().context("Invalid configuration")
}

fn print_json(session: &Session) -> Result<()> {
    let report = session.report().context("No document in session")?;
    let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
    println!("{json}");
    Ok(())
}

fn write_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    // Ensure a trailing newline on stdout.
    if !text.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write to stdout")?;
    }
    Ok(())
}
