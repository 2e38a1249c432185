use clap::{Parser, Subcommand};
use hcas_evidence::report::{self, BuildSummary};
use hcas_evidence::sources::checklist_text;
use hcas_evidence::table::csv::CsvExport;
use hcas_evidence::{Config, Error, Result, Site, SortDir, SortKey, TableState};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "hcas-evidence")]
#[command(author, version, about = "Render the Medway HCAS evidence site: table, charts, sources")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: ./hcas-evidence.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Don't open the browser
    #[arg(long, global = true)]
    no_open: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write index.html, the CSV export and charts.json
    Build {
        /// Output directory (overrides [output] dir)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also write one static SVG per chart
        #[arg(long)]
        svg: bool,
    },

    /// Export the evidence table as CSV
    Csv {
        /// Column to sort by: domain, medway, comparators, why
        #[arg(short, long, default_value = "domain")]
        sort: SortKey,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Keep only rows containing this text
        #[arg(long)]
        query: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print chart specifications as JSON
    Charts {
        /// Only this chart
        #[arg(long)]
        id: Option<String>,
    },

    /// Print the verification checklist for manual copying
    Checklist,

    /// Start the local preview server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args) {
        eprintln!("\x1b[31mError:\x1b[0m {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let site = Site::from_config(&config)?;

    match args.command {
        Command::Build { out, svg } => {
            let out_dir = out.unwrap_or_else(|| config.output.dir.clone());
            if !args.quiet {
                eprintln!("\x1b[1mHCAS evidence - site build\x1b[0m");
                eprintln!("{}", "─".repeat(60));
            }

            let summary = report::build(&site, &out_dir, svg)?;
            let copied = match &config.output.assets {
                Some(assets) => copy_assets(assets, &out_dir, args.quiet)?,
                None => 0,
            };

            if !args.quiet {
                print_build_summary(&summary, copied, &out_dir);
            }
        }

        Command::Csv { sort, desc, query, output } => {
            let dir = if desc { SortDir::Desc } else { SortDir::Asc };
            let state = TableState::new(config.table.sortable)
                .sorted_by(sort, dir)
                .with_query(query.unwrap_or_default());
            let export = CsvExport::from_view(&site.records, &state)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &export.body)?;
                    if !args.quiet {
                        eprintln!("\x1b[32mCSV saved: {}\x1b[0m ({} rows)", path.display(), export.rows);
                    }
                }
                None => io::stdout().write_all(&export.body)?,
            }
        }

        Command::Charts { id } => {
            let json = match id {
                Some(id) => {
                    let card = site
                        .cards
                        .iter()
                        .find(|c| c.id() == id)
                        .ok_or_else(|| Error::UnknownChart(id.clone()))?;
                    card.config.build().to_json_pretty()?
                }
                None => serde_json::to_string_pretty(&site.chart_specs())?,
            };
            println!("{}", json);
        }

        Command::Checklist => {
            println!("{}", checklist_text(&site.verify_steps));
        }

        Command::Serve { port } => {
            hcas_evidence::serve::start(port, site, !args.no_open)?;
        }
    }

    Ok(())
}

fn print_build_summary(summary: &BuildSummary, copied: usize, out_dir: &Path) {
    for file in &summary.files {
        eprintln!("  \x1b[32m✓\x1b[0m {}", file.display());
    }
    eprintln!("\n{}", "─".repeat(60));
    eprintln!("\x1b[1mSummary:\x1b[0m");
    eprintln!("  Rows:   {}", summary.rows);
    eprintln!("  Charts: {}", summary.charts);
    if copied > 0 {
        eprintln!("  Assets: {}", copied);
    }
    eprintln!("\n\x1b[32mSite saved: {}\x1b[0m", out_dir.join("index.html").display());
}

/// Copy every file under `src` into `dst`, keeping relative paths.
fn copy_assets(src: &Path, dst: &Path, quiet: bool) -> Result<usize> {
    let mut files = Vec::new();
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.path().to_path_buf());
        }
    }

    // Set up progress bar
    let pb = if !quiet && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("=>-"));
        }
        Some(pb)
    } else {
        None
    };

    for file in &files {
        let rel = file.strip_prefix(src).unwrap_or(file);
        let target = dst.join(rel);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(file, &target)?;
        tracing::debug!(from = %file.display(), to = %target.display(), "copied asset");
        if let Some(ref pb) = pb {
            pb.inc(1);
            pb.set_message(rel.display().to_string());
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    tracing::info!(count = files.len(), dir = %src.display(), "copied assets");
    Ok(files.len())
}
