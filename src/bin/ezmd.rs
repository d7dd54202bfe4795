//! CLI binary for ezmd.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `CompileConfig`, asks about output renames, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use ezmd::config::DEFAULT_DATE_FORMAT;
use ezmd::output::parse_yes_no;
use ezmd::{
    compile_file, resolve_output_path, CompileConfig, CompileStats, OutputType, TitleConfig,
    TitleDate,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
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

const AFTER_HELP: &str = r#"DOCUMENT SYNTAX:
  # Heading                     numbered with --number (1, 1.1, 1.1.1, …)
  ![key|A cat](cat.png)         figure with reference key, captioned with --figure-caption
  ![A cat](cat.png)             figure without key
  <p: key/>                     replaced by "Figure N"
  <T: key|Results/>             table declaration; the next | table is captioned
  <T: Results/>                 table declaration without key
  <t: key/>                     replaced by "Table N"
  <x-title/>                    replaced by the title block (--title)

EXAMPLES:
  # PDF next to the input (doc.pdf)
  ezmd doc.md

  # Numbered sections, captions, centred figures and tables
  ezmd --number --figure-caption --centering doc.md

  # HTML with a title page dated today
  ezmd --type html --title "Report" --author "Me" --date-as-today --title-header --title-page doc.md

  # Only run the rewrite passes
  ezmd --type markdown -o out.md doc.md

ENVIRONMENT VARIABLES:
  EZMD_PDF_ENGINE   Path to wkhtmltopdf or a Chrome/Chromium binary
  RUST_LOG          Log filter (overrides --verbose / --quiet)
"#;

/// Easy markdown compiler.
#[derive(Parser, Debug)]
#[command(
    name = "ezmd",
    version,
    about = "Easy markdown compiler: numbered sections, captions and title pages to HTML or PDF",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input markdown file.
    input: PathBuf,

    /// Output file (default: input name with the output type's extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output type.
    #[arg(long = "type", visible_alias = "output-type", value_enum, default_value = "pdf")]
    output_type: OutputTypeArg,

    /// Add numbers to sections.
    #[arg(long, visible_alias = "section-number")]
    number: bool,

    /// Put the title block at the top of the document.
    #[arg(long)]
    title_header: bool,

    /// Document title.
    #[arg(long)]
    title: Option<String>,

    /// Put the title block on its own page.
    #[arg(long)]
    title_page: bool,

    /// Document author.
    #[arg(long)]
    author: Option<String>,

    /// Creation date, printed as given.
    #[arg(long)]
    date: Option<String>,

    /// Use today's date (formatted with --date-format).
    #[arg(long)]
    date_as_today: bool,

    /// strftime format for --date-as-today.
    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    date_format: String,

    /// Center pictures.
    #[arg(long)]
    centering_picture: bool,

    /// Center tables.
    #[arg(long)]
    centering_table: bool,

    /// Center pictures and tables.
    #[arg(long)]
    centering: bool,

    /// Label for figure captions ("Figure 1").
    #[arg(long, default_value = "Figure")]
    figure_caption_string: String,

    /// Put a numbered caption under every figure.
    #[arg(long)]
    figure_caption: bool,

    /// Label for table captions ("Table 1").
    #[arg(long, default_value = "Table")]
    table_caption_string: String,

    /// Stylesheet to inline instead of the bundled one.
    #[arg(long)]
    css: Option<PathBuf>,

    /// Use MathJax (not supported; ignored).
    #[arg(long, visible_alias = "enable-mathjax")]
    mathjax: bool,

    /// Rename a mismatched output extension without asking.
    #[arg(short = 'y', long)]
    yes: bool,

    /// Print compilation stats as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputTypeArg {
    Html,
    Pdf,
    Markdown,
}

impl From<OutputTypeArg> for OutputType {
    fn from(v: OutputTypeArg) -> Self {
        match v {
            OutputTypeArg::Html => OutputType::Html,
            OutputTypeArg::Pdf => OutputType::Pdf,
            OutputTypeArg::Markdown => OutputType::Markdown,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.mathjax {
        println!("--mathjax and --enable-mathjax options are ignored.");
    }

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || cli.json {
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

    // ── Output path ──────────────────────────────────────────────────────
    let output_type: OutputType = cli.output_type.into();
    let output = resolve_output_path(
        &cli.input,
        cli.output.as_deref(),
        output_type,
        |from, to| confirm_rename(from, to, output_type, cli.yes),
    );

    let config = build_config(&cli)?;

    // ── Compile ──────────────────────────────────────────────────────────
    let spinner = (output_type == OutputType::Pdf && !cli.quiet && !cli.json).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Rendering");
        bar.set_message(output.display().to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let result = compile_file(&cli.input, &output, &config);
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let stats = result.with_context(|| format!("Failed to compile {}", cli.input.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&stats, &output);
    }

    Ok(())
}

/// Map CLI args to `CompileConfig`.
fn build_config(cli: &Cli) -> Result<CompileConfig> {
    let mut builder = CompileConfig::builder()
        .output_type(cli.output_type.into())
        .number_sections(cli.number)
        .title_header(cli.title_header)
        .center_pictures(cli.centering_picture)
        .center_tables(cli.centering_table)
        .centering(cli.centering)
        .figure_captions(cli.figure_caption)
        .figure_caption_label(cli.figure_caption_string.clone())
        .table_caption_label(cli.table_caption_string.clone())
        .mathjax(cli.mathjax);

    if let Some(ref title) = cli.title {
        let mut title = TitleConfig::new(title.clone()).title_page(cli.title_page);
        if let Some(ref author) = cli.author {
            title = title.author(author.clone());
        }
        if cli.date_as_today {
            title = title.date(TitleDate::Today {
                format: cli.date_format.clone(),
            });
        } else if let Some(ref date) = cli.date {
            title = title.date(TitleDate::Fixed(date.clone()));
        }
        builder = builder.title(title);
    }

    if let Some(ref css) = cli.css {
        builder = builder.stylesheet(css.clone());
    }

    builder.build().context("Invalid configuration")
}

/// Tell the user the extension does not match and ask whether to rename.
fn confirm_rename(from: &Path, to: &Path, output_type: OutputType, yes: bool) -> bool {
    eprintln!(
        "{} Output file extension is different from output type. file: {}, type: {}",
        yellow("⚠"),
        from.display(),
        output_type
    );
    if yes {
        return true;
    }
    eprint!("Rename output file name to {}? [Y/n] ", to.display());
    io::stderr().flush().ok();

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => parse_yes_no(&answer, true),
        Err(_) => true,
    }
}

fn print_summary(stats: &CompileStats, output: &Path) {
    eprintln!(
        "{}  {}  {}",
        green("✔"),
        bold(&output.display().to_string()),
        dim(&format!(
            "{} bytes, {}ms",
            stats.output_bytes, stats.total_duration_ms
        )),
    );
    eprintln!(
        "   {}",
        dim(&format!(
            "{} headings numbered · {} figures · {} tables · {} references",
            stats.headings_numbered,
            stats.figures,
            stats.tables,
            stats.figure_references + stats.table_references,
        )),
    );
}
