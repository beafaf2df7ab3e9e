mod analyze;
mod catalog;
mod diagnostics;
mod error;
mod model;
mod normalize;
mod output;
mod readers;
mod settings;
mod text;
mod utils;
mod verify;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use catalog::Catalog;
use diagnostics::Diagnostics;
use error::read_to_string;
use model::{QuestionDocument, QuestionType, Source};
use normalize::Normalizer;
use readers::{Extraction, ReadContext};
use settings::Settings;
use utils::format_duration;

#[derive(Parser)]
#[command(name = "obob_extract", about = "Convert OBOB question sources into questions.json")]
struct Cli {
    /// Book catalog (books.json); overrides obob.toml / OBOB_CATALOG
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Fail records whose content preamble can't be removed
    #[arg(long, global = true)]
    strict: bool,
    /// Don't mark answers with "and", commas or "Any two:" as two-part
    #[arg(long, global = true)]
    no_conjunction_heuristic: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// QUESTION/ANSWER/PAGE tagged transcript
    Tagged {
        input: PathBuf,
        /// Pin every question to this book
        #[arg(long)]
        book_key: Option<String>,
        #[arg(short, long, default_value = "questions.json")]
        out: PathBuf,
    },
    /// "In <Title> by <Author>, ..." handout with Answer: lines
    Loose {
        input: PathBuf,
        /// Provenance name written into the document
        #[arg(long, requires = "source_link")]
        source_name: Option<String>,
        #[arg(long, requires = "source_name")]
        source_link: Option<String>,
        #[arg(short, long, default_value = "questions.json")]
        out: PathBuf,
    },
    /// Numbered single-book handout
    Numbered {
        input: PathBuf,
        #[arg(long)]
        book_key: String,
        #[arg(short, long, default_value = "questions.json")]
        out: PathBuf,
    },
    /// Directory of <book_key>.csv files
    Csv {
        dir: PathBuf,
        #[arg(short, long, default_value = "questions.json")]
        out: PathBuf,
    },
    /// Directory of <book_key>/content.csv + iwb.csv folders
    Folders {
        dir: PathBuf,
        #[arg(short, long, default_value = "questions.json")]
        out: PathBuf,
    },
    /// Workbooks listed in a book_key -> xlsx mapping
    Workbook {
        mapping: PathBuf,
        /// Directory holding the workbooks (default: the mapping's directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
        #[arg(short, long, default_value = "questions.json")]
        out: PathBuf,
    },
    /// Question statistics per document
    Analyze {
        files: Vec<PathBuf>,
        /// Analyze every questions.json under --root
        #[arg(long)]
        all: bool,
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// List questions whose book_key is not in the catalog
    Verify {
        /// Documents to check (default: OBOB_VERIFY_SOURCES / obob.toml)
        sources: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load().context("loading obob.toml / OBOB_* settings")?;
    if let Some(catalog) = cli.catalog {
        settings.catalog = catalog;
    }
    if cli.strict {
        settings.strict = true;
    }
    if cli.no_conjunction_heuristic {
        settings.conjunction_heuristic = false;
    }
    let normalizer = Normalizer::new(settings.normalizer_config());

    let result = match cli.command {
        Commands::Tagged { input, book_key, out } => {
            let catalog = load_catalog(&settings.catalog)?;
            let ctx = ReadContext::new(&catalog, &normalizer);
            let raw = read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
            let extraction = readers::tagged::read(&input, &raw, book_key.as_deref(), &ctx);
            finish(extraction, &out, None)
        }
        Commands::Loose {
            input,
            source_name,
            source_link,
            out,
        } => {
            let catalog = load_catalog(&settings.catalog)?;
            let ctx = ReadContext::new(&catalog, &normalizer);
            let raw = read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
            let extraction = readers::loose::read(&input, &raw, &ctx);
            let source = source_name
                .zip(source_link)
                .map(|(name, link)| Source { name, link });
            finish(extraction, &out, source)
        }
        Commands::Numbered { input, book_key, out } => {
            let catalog = load_catalog(&settings.catalog)?;
            let ctx = ReadContext::new(&catalog, &normalizer);
            let raw = read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
            let extraction = readers::numbered::read(&input, &raw, &book_key, &ctx);
            finish(extraction, &out, None)
        }
        Commands::Csv { dir, out } => {
            let catalog = load_catalog(&settings.catalog)?;
            let ctx = ReadContext::new(&catalog, &normalizer);
            let extraction = readers::csv_export::read_dir(&dir, &ctx)
                .with_context(|| format!("listing {}", dir.display()))?;
            finish(extraction, &out, None)
        }
        Commands::Folders { dir, out } => {
            let catalog = load_catalog(&settings.catalog)?;
            let ctx = ReadContext::new(&catalog, &normalizer);
            let extraction = readers::folders::read_dir(&dir, &ctx)
                .with_context(|| format!("listing {}", dir.display()))?;
            finish(extraction, &out, None)
        }
        Commands::Workbook { mapping, dir, out } => {
            let catalog = load_catalog(&settings.catalog)?;
            let ctx = ReadContext::new(&catalog, &normalizer);
            let books = readers::workbook::load_mapping(&mapping)
                .with_context(|| format!("loading mapping {}", mapping.display()))?;
            let dir = dir.unwrap_or_else(|| mapping.parent().map(Path::to_path_buf).unwrap_or_default());
            println!("Processing {} workbooks from {}", books.len(), dir.display());
            let extraction = readers::workbook::read_all(&books, &dir, &ctx);
            let doc = QuestionDocument::new(extraction.questions);
            output::write_document(&out, &doc)?;
            println!("\nGenerated {} questions in {}", doc.questions.len(), out.display());
            for kind in [QuestionType::Content, QuestionType::InWhichBook] {
                println!("  {}: {}", kind.as_str(), doc.count(kind));
            }
            extraction.diagnostics.print();
            Ok(())
        }
        Commands::Analyze { files, all, root } => run_analyze(files, all, &root),
        Commands::Verify { sources } => {
            let catalog = load_catalog(&settings.catalog)?;
            let sources = if sources.is_empty() {
                settings.verify_sources.clone()
            } else {
                sources
            };
            verify::verify(&catalog, &sources).print();
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let catalog = Catalog::load(path).with_context(|| format!("loading catalog {}", path.display()))?;
    if catalog.is_empty() {
        warn!(path = %path.display(), "catalog has no books");
    }
    info!(path = %path.display(), books = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// Write the document and report what was produced.
fn finish(extraction: Extraction, out: &Path, source: Option<Source>) -> anyhow::Result<()> {
    let doc = QuestionDocument::new(extraction.questions).with_source(source);
    output::write_document(out, &doc)?;
    println!("Generated {} questions in {}", doc.questions.len(), out.display());
    extraction.diagnostics.print();
    Ok(())
}

fn run_analyze(files: Vec<PathBuf>, all: bool, root: &Path) -> anyhow::Result<()> {
    let mut files = files;
    if all {
        files.extend(analyze::discover(root));
    }
    if files.is_empty() {
        let here = PathBuf::from("questions.json");
        if here.exists() {
            files.push(here);
        } else {
            let found = analyze::discover(root);
            if found.is_empty() {
                println!("No questions.json files found.");
            } else {
                println!("No questions.json found in current directory.");
                println!("Found {} questions.json file(s):", found.len());
                for f in &found {
                    println!("  {}", f.display());
                }
                println!("\nRun with --all to analyze all files, or specify a file path.");
            }
            return Ok(());
        }
    }

    let mut diags = Diagnostics::new();
    let stats = analyze::analyze_files(&files, &mut diags);
    for s in &stats {
        println!();
        s.print();
    }
    if stats.len() > 1 {
        analyze::print_summary(&stats);
    }
    diags.print();
    Ok(())
}
