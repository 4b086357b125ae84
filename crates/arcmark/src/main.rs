use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Parser;
use serde::Serialize;

use arcmark_core::export::{ExportOptions, ExportStats, export_sidebar};
use arcmark_core::files::{default_sidebar_path, read_sidebar_file, write_bookmarks_file};
use arcmark_core::html::render_bookmarks_html;
use arcmark_core::sidebar::parse_sidebar_document;

#[derive(Debug, Parser)]
#[command(
    name = "arcmark",
    version,
    about = "Export Arc browser Spaces, folders, and tabs to Netscape bookmarks HTML"
)]
struct Cli {
    #[arg(
        long,
        value_name = "PATH",
        help = "Path to StorableSidebar.json (auto-detected when omitted)"
    )]
    input: Option<PathBuf>,
    #[arg(
        long,
        value_name = "PATH",
        default_value = "./arc_bookmarks.html",
        help = "Output HTML path"
    )]
    output: PathBuf,
    #[arg(long, help = "Include spaces that are not pinned")]
    include_unpinned: bool,
    #[arg(
        long,
        help = "Export from every sidebar container, not just the default one"
    )]
    all_containers: bool,
    #[arg(long, help = "Print export statistics and diagnostics")]
    verbose: bool,
    #[arg(long, help = "Print the export report as JSON")]
    json: bool,
}

#[derive(Debug, Serialize)]
struct CliReport<'a> {
    input: String,
    output: String,
    stats: &'a ExportStats,
    diagnostics: &'a [String],
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(input) = cli.input.clone().or_else(default_sidebar_path) else {
        bail!(
            "could not find Arc sidebar data (StorableSidebar.json).\nOpen Arc, locate StorableSidebar.json in your profile data, then rerun with --input /path/to/StorableSidebar.json"
        );
    };

    let text = read_sidebar_file(&input)?;
    let document = parse_sidebar_document(&text)?;
    let report = export_sidebar(
        &document,
        &ExportOptions {
            include_unpinned: cli.include_unpinned,
            all_containers: cli.all_containers,
        },
    );
    let html = render_bookmarks_html(&report.nodes);
    write_bookmarks_file(&cli.output, &html)?;

    if cli.json {
        let summary = CliReport {
            input: normalize_path(&input),
            output: normalize_path(&cli.output),
            stats: &report.stats,
            diagnostics: &report.diagnostics,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if cli.verbose {
        println!("input: {}", normalize_path(&input));
        println!("output: {}", normalize_path(&cli.output));
        println!(
            "containers: {} (selected: {})",
            report.stats.containers_total, report.stats.containers_selected
        );
        println!(
            "spaces detected: {} (included: {})",
            report.stats.spaces_detected, report.stats.spaces_included
        );
        println!("folders: {}", report.stats.folders);
        println!("tabs: {}", report.stats.tabs);
        if !report.diagnostics.is_empty() {
            println!("diagnostics:");
            for line in &report.diagnostics {
                println!("  - {line}");
            }
        }
    }

    Ok(())
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
