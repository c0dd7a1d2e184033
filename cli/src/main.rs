//! documentor CLI - hybrid PDF/image document processing

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use documentor::detect::{sniff_path, SourceFormat};
use documentor::{
    predict_routes, BlockOrder, ConvertOptions, ConverterRegistry, ErrorMode, JsonFormat,
    OcrConfig, OutputFormat, PageRoute, PageSelection, PdfParser, ProcessOptions, RenderOptions,
};

#[derive(Parser)]
#[command(name = "documentor")]
#[command(version)]
#[command(about = "Turn PDFs, page images and text files into typed fragments", long_about = None)]
struct Cli {
    #[command(flatten)]
    models: ModelArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Model server overrides; unset values come from the environment or `.env`.
#[derive(Args)]
struct ModelArgs {
    /// Layout model base URL
    #[arg(long, global = true, env = "DOTS_OCR_BASE_URL", hide_env_values = true)]
    layout_url: Option<String>,

    /// Layout model API key
    #[arg(long, global = true, env = "DOTS_OCR_API_KEY", hide_env_values = true)]
    layout_key: Option<String>,

    /// Layout model name
    #[arg(long, global = true, env = "DOTS_OCR_MODEL_NAME")]
    layout_model: Option<String>,

    /// Recognition model base URL
    #[arg(long, global = true, env = "QWEN_BASE_URL", hide_env_values = true)]
    recognizer_url: Option<String>,

    /// Recognition model API key
    #[arg(long, global = true, env = "QWEN_API_KEY", hide_env_values = true)]
    recognizer_key: Option<String>,

    /// Recognition model name
    #[arg(long, global = true, env = "QWEN_MODEL_NAME")]
    recognizer_model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single PDF, image or text file
    Process {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: ProcessArgs,
    },

    /// Process every supported file in a directory
    Batch {
        /// Input directory
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        #[command(flatten)]
        options: ProcessArgs,
    },

    /// Show file information and the route each PDF page would take
    Info {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Minimum selectable-text length for a page to skip OCR
        #[arg(long, default_value_t = documentor::parser::DEFAULT_MIN_TEXT_LEN)]
        min_text_len: usize,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct ProcessArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: Format,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Send every page through OCR
    #[arg(long)]
    force_ocr: bool,

    /// Minimum selectable-text length for a page to skip OCR
    #[arg(long, default_value_t = documentor::parser::DEFAULT_MIN_TEXT_LEN)]
    min_text_len: usize,

    /// Rasterization resolution for OCR pages
    #[arg(long, default_value_t = documentor::parser::DEFAULT_DPI)]
    dpi: u32,

    /// Abort on the first failing page instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Order OCR fragments top to bottom instead of detection order
    #[arg(long)]
    top_down: bool,

    /// Include YAML frontmatter (Markdown only)
    #[arg(long)]
    frontmatter: bool,

    /// Keep page headers and footers
    #[arg(long)]
    page_furniture: bool,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Fragments as JSON
    Json,
    /// Markdown
    Markdown,
    /// Plain text
    Text,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Markdown => OutputFormat::Markdown,
            Format::Text => OutputFormat::Text,
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    // A missing .env file is fine
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            input,
            output,
            options,
        } => cmd_process(&cli.models, &input, output.as_deref(), &options),
        Commands::Batch {
            input,
            output,
            recursive,
            options,
        } => cmd_batch(&cli.models, &input, &output, recursive, &options),
        Commands::Info {
            input,
            min_text_len,
        } => cmd_info(&input, min_text_len),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

impl ModelArgs {
    /// Build the model configuration, letting flags win over the environment.
    fn ocr_config(&self) -> documentor::Result<OcrConfig> {
        let mut vars: HashMap<String, String> = std::env::vars().collect();
        let overrides = [
            ("DOTS_OCR_BASE_URL", &self.layout_url),
            ("DOTS_OCR_API_KEY", &self.layout_key),
            ("DOTS_OCR_MODEL_NAME", &self.layout_model),
            ("QWEN_BASE_URL", &self.recognizer_url),
            ("QWEN_API_KEY", &self.recognizer_key),
            ("QWEN_MODEL_NAME", &self.recognizer_model),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                vars.insert(key.to_string(), value.clone());
            }
        }
        OcrConfig::from_source(&vars)
    }
}

impl ProcessArgs {
    fn process_options(&self) -> CliResult<ProcessOptions> {
        let pages = match self.pages.as_deref() {
            Some(p) => PageSelection::parse(p)?,
            None => PageSelection::All,
        };
        let error_mode = if self.strict {
            ErrorMode::Strict
        } else {
            ErrorMode::Lenient
        };
        let order = if self.top_down {
            BlockOrder::TopDown
        } else {
            BlockOrder::Detected
        };

        Ok(ProcessOptions::new()
            .with_error_mode(error_mode)
            .with_pages(pages)
            .with_min_text_len(self.min_text_len)
            .with_dpi(self.dpi)
            .force_ocr(self.force_ocr)
            .with_block_order(order))
    }

    fn convert_options(&self) -> ConvertOptions {
        let render = RenderOptions::new()
            .with_frontmatter(self.frontmatter)
            .with_page_furniture(self.page_furniture);
        ConvertOptions::new()
            .with_render_options(render)
            .with_format(self.format.into())
    }
}

/// Text files never reach the model servers, so they work without a model
/// configuration.
fn build_registry(
    models: &ModelArgs,
    options: ProcessOptions,
    needs_models: bool,
) -> CliResult<ConverterRegistry> {
    match models.ocr_config() {
        Ok(config) => Ok(ConverterRegistry::with_defaults(&config, options)?),
        Err(e) if !needs_models => {
            log::debug!("No model configuration ({}), only text files are supported", e);
            Ok(ConverterRegistry::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

fn render(
    registry: &ConverterRegistry,
    input: &Path,
    args: &ProcessArgs,
) -> CliResult<String> {
    let options = args.convert_options();
    if args.format == Format::Json && args.compact {
        let document = registry.convert(input)?;
        return Ok(documentor::render::to_json(&document, JsonFormat::Compact)?);
    }
    Ok(registry.convert_to(input, &options)?.content)
}

fn cmd_process(
    models: &ModelArgs,
    input: &Path,
    output: Option<&Path>,
    args: &ProcessArgs,
) -> CliResult<()> {
    let registry = build_registry(models, args.process_options()?, !is_text_file(input))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Processing {}...", input.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let content = render(&registry, input, args);
    spinner.finish_and_clear();
    let content = content?;

    if let Some(path) = output {
        fs::write(path, &content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}

fn cmd_batch(
    models: &ModelArgs,
    input: &Path,
    output: &Path,
    recursive: bool,
    args: &ProcessArgs,
) -> CliResult<()> {
    if !input.is_dir() {
        return Err(format!("not a directory: {}", input.display()).into());
    }

    let mut files = Vec::new();
    collect_files(input, recursive, &mut files)?;
    files.sort();

    let needs_models = files.iter().any(|f| !is_text_file(f));
    let registry = build_registry(models, args.process_options()?, needs_models)?;
    files.retain(|f| registry.supports_path(f));

    if files.is_empty() {
        println!("{}", "No supported files found".yellow());
        return Ok(());
    }

    fs::create_dir_all(output)?;
    let extension = OutputFormat::from(args.format).extension();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut failures = Vec::new();
    for file in &files {
        let name = file.strip_prefix(input).unwrap_or(file);
        pb.set_message(name.display().to_string());

        let target = output_path(output, name, extension);
        let result = render(&registry, file, args).and_then(|content| {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, content)?;
            Ok(())
        });

        if let Err(e) = result {
            log::warn!("Failed to process {}: {}", file.display(), e);
            failures.push((file.clone(), e.to_string()));
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "{} {} of {} files written to {}",
        "Done!".green().bold(),
        files.len() - failures.len(),
        files.len(),
        output.display()
    );
    for (file, error) in &failures {
        println!("  {} {}: {}", "✗".red(), file.display(), error);
    }

    Ok(())
}

/// `out/a.pdf` → `out/a.pdf.json`; the source extension stays so `a.pdf`
/// and `a.png` do not write the same file.
fn output_path(output: &Path, name: &Path, extension: &str) -> PathBuf {
    let mut file_name = name.as_os_str().to_owned();
    file_name.push(".");
    file_name.push(extension);
    output.join(file_name)
}

fn collect_files(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> CliResult<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_files(&path, recursive, files)?;
            }
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn cmd_info(input: &Path, min_text_len: usize) -> CliResult<()> {
    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {} bytes", "Size".bold(), fs::metadata(input)?.len());

    if is_text_file(input) {
        let text = fs::read_to_string(input)?;
        let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
        println!("{}: Plain text", "Format".bold());
        println!("{}: {}", "Lines".bold(), lines);
        return Ok(());
    }

    let format = sniff_path(input)?;
    let pdf = match format {
        SourceFormat::Image(image_format) => {
            println!("{}: {:?} image", "Format".bold(), image_format);
            println!("{}: {}", "Route".bold(), "ocr".yellow());
            return Ok(());
        }
        SourceFormat::Pdf(pdf) => pdf,
    };

    let parser = PdfParser::open(input)?;
    let metadata = parser.metadata();

    println!("{}: {}", "Format".bold(), pdf);
    println!("{}: {}", "Pages".bold(), metadata.page_count);
    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Page Routes".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let options = ProcessOptions::new().with_min_text_len(min_text_len);
    let mut ocr_pages = 0;
    for prediction in predict_routes(&parser, &options)? {
        let label = match prediction.route {
            PageRoute::SelectableText => "selectable text".green(),
            _ => {
                ocr_pages += 1;
                "ocr".yellow()
            }
        };
        println!(
            "  {} {:>4}: {} ({} chars)",
            "page".dimmed(),
            prediction.page,
            label,
            prediction.chars
        );
    }

    println!();
    println!(
        "{}: {} of {} pages",
        "Needs OCR".bold(),
        ocr_pages,
        metadata.page_count
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "documentor".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Hybrid PDF/image document processing");
    println!();
    println!("Layout model:      DOTS_OCR_BASE_URL, DOTS_OCR_API_KEY, DOTS_OCR_MODEL_NAME");
    println!("Recognition model: QWEN_BASE_URL, QWEN_API_KEY, QWEN_MODEL_NAME");
    println!("License: MIT");
}
