//! CLI binary for pdf-pic-select.
//!
//! A thin shim over the library crate: maps CLI flags (or a host-style JSON
//! parameter bag) to a classification run and prints the JSON record.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_pic_select::{
    classify, ClassificationOutput, ClassifierConfig, PageVerdict, ProgressCallback,
    ScanProgressCallback, ToolParameters,
};
use serde_json::Value;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
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
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar over the page scan.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_scan_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ScanProgressCallback for CliProgressCallback {
    fn on_scan_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>4}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Scanning");
        self.bar.set_message("");
    }

    fn on_page_scanned(&self, page_num: usize, _total_pages: usize, verdict: &PageVerdict) {
        if verdict.has_image {
            self.bar.set_message(format!("page {page_num} ✓"));
        }
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            yellow("⚠"),
            page_num,
            total_pages,
            dim(error)
        ));
    }

    fn on_scan_complete(&self, _total_pages: usize, _matched_pages: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Default thresholds (240 x 70)
  pdf-pic-select brochure.pdf

  # Larger images only, pretty-printed
  pdf-pic-select --min-width 600 --min-height 400 --pretty brochure.pdf

  # Remote document
  pdf-pic-select https://example.com/catalogue.pdf

  # Host-style invocation: JSON parameter bag from stdin
  echo '{"pdf_path": {"path": "brochure.pdf"}, "min_width": "300"}' | pdf-pic-select --params -

QUALIFICATION RULE:
  A page is flagged when one embedded image satisfies
    width * height >= min_width * min_height
  using the image's intrinsic pixel size. A wide, short image can qualify.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium — skips auto-download
  PDFIUM_AUTO_CACHE_DIR   Override the default pdfium cache directory
  RUST_LOG                Override log filtering (e.g. pdf_pic_select=debug)
"#;

/// Classify PDF pages by whether they embed a large-enough image.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-pic-select",
    version,
    about = "Classify PDF pages by whether they embed an image of at least a minimum pixel area",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    #[arg(required_unless_present = "params", conflicts_with = "params")]
    input: Option<String>,

    /// Read a JSON parameter bag (file path, or `-` for stdin) instead of INPUT.
    #[arg(long, env = "PDF_PIC_SELECT_PARAMS")]
    params: Option<String>,

    /// Minimum image width in pixels (default 240).
    #[arg(long, env = "PDF_PIC_SELECT_MIN_WIDTH", allow_hyphen_values = true)]
    min_width: Option<String>,

    /// Minimum image height in pixels (default 70).
    #[arg(long, env = "PDF_PIC_SELECT_MIN_HEIGHT", allow_hyphen_values = true)]
    min_height: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF_PIC_SELECT_PASSWORD")]
    password: Option<String>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF_PIC_SELECT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Pretty-print the JSON record.
    #[arg(long, env = "PDF_PIC_SELECT_PRETTY")]
    pretty: bool,

    /// Print a human-readable summary on stderr.
    #[arg(long, env = "PDF_PIC_SELECT_SUMMARY")]
    summary: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF_PIC_SELECT_NO_PROGRESS")]
    no_progress: bool,

    /// Write the JSON record to this file instead of stdout.
    #[arg(short, long, env = "PDF_PIC_SELECT_OUTPUT")]
    output: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_PIC_SELECT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF_PIC_SELECT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.verbose;
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

    // ── Build parameters + config ────────────────────────────────────────
    let params = build_params(&cli)?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn ScanProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = classify(&params, &config)
        .await
        .context("Classification failed")?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("Failed to serialise output")?;

    match cli.output {
        Some(ref path) => std::fs::write(path, format!("{json}\n"))
            .with_context(|| format!("Failed to write output to {}", path.display()))?,
        None => println!("{json}"),
    }

    if cli.summary && !cli.quiet {
        print_summary(&output);
    }

    Ok(())
}

/// Map CLI args (or the `--params` bag) to `ToolParameters`.
fn build_params(cli: &Cli) -> Result<ToolParameters> {
    let mut params = match cli.params {
        Some(ref from) => {
            let raw = if from == "-" {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read parameters from stdin")?;
                buf
            } else {
                std::fs::read_to_string(from)
                    .with_context(|| format!("Failed to read parameters from {from}"))?
            };
            pdf_pic_select::tool::parse_parameters(&raw).context("Invalid parameter bag")?
        }
        None => ToolParameters {
            pdf_path: cli.input.clone().map(Value::String),
            ..Default::default()
        },
    };

    // Explicit flags override the bag; raw strings so the library owns coercion.
    if let Some(ref w) = cli.min_width {
        params.min_width = Some(Value::String(w.clone()));
    }
    if let Some(ref h) = cli.min_height {
        params.min_height = Some(Value::String(h.clone()));
    }

    Ok(params)
}

fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ClassifierConfig> {
    let mut builder = ClassifierConfig::builder().download_timeout_secs(cli.download_timeout);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(output: &ClassificationOutput) {
    if !output.any_matched() {
        eprintln!(
            "{} no page contains an image ≥ {}x{} px (by area) — {} pages scanned",
            yellow("∅"),
            output.min_width,
            output.min_height,
            output.total_pages
        );
        return;
    }
    eprintln!(
        "{} {}/{} pages contain an image ≥ {}x{} px (by area)",
        green("✔"),
        bold(&output.matched_pages_count.to_string()),
        output.total_pages,
        output.min_width,
        output.min_height
    );
    if !output.pages_with_images.is_empty() {
        eprintln!("   with images:    {}", join_pages(&output.pages_with_images));
    }
    if !output.pages_with_no_images.is_empty() {
        eprintln!(
            "   without images: {}",
            dim(&join_pages(&output.pages_with_no_images))
        );
    }
}

fn join_pages(pages: &[usize]) -> String {
    pages
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pdf-pic-select").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn input_maps_to_pdf_path() {
        let params = build_params(&cli(&["doc.pdf", "--min-width", "300"])).unwrap();
        assert_eq!(params.pdf_path, Some(Value::String("doc.pdf".into())));
        assert_eq!(params.min_width, Some(Value::String("300".into())));
        assert_eq!(params.min_height, None);
    }

    #[test]
    fn negative_threshold_reaches_the_library() {
        let params = build_params(&cli(&["doc.pdf", "--min-height", "-5"])).unwrap();
        assert_eq!(params.min_height, Some(Value::String("-5".into())));
    }

    #[test]
    fn input_and_params_conflict() {
        let res = Cli::try_parse_from(["pdf-pic-select", "doc.pdf", "--params", "p.json"]);
        assert!(res.is_err());
    }

    #[test]
    fn join_pages_formats_list() {
        assert_eq!(join_pages(&[1, 4, 9]), "1, 4, 9");
        assert_eq!(join_pages(&[]), "");
    }
}
