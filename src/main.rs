// Entry point and high-level CLI flow.
//
// Each input file is one independent analysis run:
// - pick the vendor profile (built-in name or TOML file),
// - read the export through the delimited-text row source,
// - print the summary and a table of reportable groups, or one JSON object
//   per file,
// - optionally export the group table to CSV and the results to JSON.
mod analyzer;
mod classify;
mod error;
mod filter;
mod loader;
mod locator;
mod output;
mod profile;
mod reports;
mod source;
mod summary;
mod types;
mod util;

use anyhow::{anyhow, Context};
use clap::{ArgAction, Parser, ValueEnum};
use profile::VendorProfile;
use serde::Serialize;
use source::DelimitedSource;
use std::path::{Path, PathBuf};
use types::{AnalysisResult, Details, GroupRow};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFmt {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Parser, Debug)]
#[command(
    name = "voltage_report",
    about = "Voltage sag/swell report from meter event-log exports",
    after_long_help = "Examples:\n  voltage_report --vendor rim-tsv journal.xls\n  voltage_report --vendor energomera --output json export.csv\n  voltage_report --profile sigma.toml --banner-rows 2 --export-csv groups.csv a.tsv b.tsv"
)]
struct Args {
    /// Exported event logs (CSV or tab-separated text).
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Built-in vendor profile: energomera, nartis, rim, rim-tsv.
    #[arg(long, short = 'p', default_value = "rim")]
    vendor: String,
    /// TOML vendor profile; overrides --vendor.
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Field delimiter; guessed from the file extension when omitted.
    #[arg(long, short = 'd')]
    delimiter: Option<char>,
    /// Rows covered by a merged title banner at the top of the file.
    #[arg(long)]
    banner_rows: Option<usize>,
    #[arg(long, short = 'o', value_enum, default_value = "text")]
    output: OutputFmt,
    #[arg(long)]
    export_csv: Option<PathBuf>,
    #[arg(long)]
    export_json: Option<PathBuf>,
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,
    #[arg(long, short = 'q', default_value_t = false)]
    quiet: bool,
}

#[derive(Serialize)]
struct FileResult {
    file: String,
    #[serde(flatten)]
    result: AnalysisResult,
}

fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if let Some(lvl) = args.log_level {
        let f = match lvl {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        };
        builder.filter_level(f);
    } else if args.verbose > 0 {
        let f = match args.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        builder.filter_level(f);
    }
    builder.format(|buf, record| {
        use std::io::Write;
        let ts = chrono::Local::now().format("%H:%M:%S");
        writeln!(buf, "[{:<5} {}] {}", record.level(), ts, record.args())
    });
    builder.init();
}

fn select_profile(args: &Args) -> anyhow::Result<VendorProfile> {
    match &args.profile {
        Some(path) => profile::load_profile(path)
            .with_context(|| format!("loading profile {}", path.display())),
        None => VendorProfile::by_name(&args.vendor).map_err(|e| {
            anyhow!("{} (built-in profiles: {})", e, VendorProfile::BUILTIN.join(", "))
        }),
    }
}

fn delimiter_for(args: &Args, path: &Path) -> anyhow::Result<u8> {
    match args.delimiter {
        Some(c) if c.is_ascii() => Ok(c as u8),
        Some(c) => Err(anyhow!("delimiter must be a single ASCII character, got {:?}", c)),
        None => Ok(DelimitedSource::guess_delimiter(path)),
    }
}

/// Analyse one file and print its outcome; returns the table rows it produced.
fn handle_file(args: &Args, profile: &VendorProfile, path: &Path) -> anyhow::Result<(AnalysisResult, Vec<GroupRow>)> {
    let name = path.display().to_string();
    let mut source = DelimitedSource::new(path, delimiter_for(args, path)?).with_banner_extent(args.banner_rows);

    let (result, rows) = match analyzer::run(&mut source, profile) {
        Ok(analysis) => {
            let rows: Vec<GroupRow> = analysis.groups.iter().map(|g| GroupRow::new(&name, g)).collect();
            if matches!(args.output, OutputFmt::Text) {
                let reportable = analysis.result.details.as_ref().map_or(0, Details::len);
                println!("{}", name);
                println!(
                    "({} rows read, {} events kept, {} rows skipped, {} reportable groups)",
                    util::format_int(analysis.load.total_rows),
                    util::format_int(analysis.load.kept),
                    util::format_int(
                        analysis.load.short_rows + analysis.load.row_errors + analysis.load.unclassified
                    ),
                    reportable
                );
            }
            (analysis.result, rows)
        }
        Err(e) => {
            if matches!(args.output, OutputFmt::Text) {
                println!("{}", name);
            }
            (analyzer::failure(&e, profile), Vec::new())
        }
    };

    match args.output {
        OutputFmt::Text => {
            match (&result.summary, &result.error) {
                (Some(summary), _) => println!("{}\n", summary),
                (None, Some(error)) => println!("{}\n", error),
                (None, None) => {}
            }
            if result.details.as_ref().is_some_and(|d| !d.is_empty()) {
                println!("{}\n", output::render_table(&rows));
            }
        }
        OutputFmt::Json => {
            let line = serde_json::to_string(&FileResult { file: name, result: result.clone() })?;
            println!("{}", line);
        }
    }
    Ok((result, rows))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);
    let profile = select_profile(&args)?;
    log::info!("Using vendor profile {:?}", profile.name);

    let mut all_rows: Vec<GroupRow> = Vec::new();
    let mut all_results: Vec<FileResult> = Vec::new();
    let mut failures = 0usize;
    for path in &args.files {
        let (result, rows) = handle_file(&args, &profile, path)?;
        if !result.success {
            failures += 1;
        }
        all_rows.extend(rows);
        all_results.push(FileResult { file: path.display().to_string(), result });
    }

    if let Some(path) = &args.export_csv {
        output::write_csv(path, &all_rows).map_err(|e| anyhow!("CSV write failed for {}: {}", path.display(), e))?;
        log::info!("CSV written: {}", path.display());
    }
    if let Some(path) = &args.export_json {
        output::write_json(path, &all_results).map_err(|e| anyhow!("JSON write failed for {}: {}", path.display(), e))?;
        log::info!("JSON written: {}", path.display());
    }

    if failures > 0 {
        log::warn!("{} of {} files could not be analysed", failures, args.files.len());
        std::process::exit(1);
    }
    Ok(())
}
