//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `fuelform parse` — run the tolerant matrix parser on route text
//! - `fuelform row` — run the lenient CSV row parser
//! - `fuelform request segment|route|compare` — build a prediction request body
//! - `fuelform render segment|route|compare` — render a prediction response
//! - `fuelform tabs` — show the panel tab strip
//! - `fuelform stats` — summarize the parse event log
//! - `fuelform config show|init|set|reset` — configuration management

use std::io::Read;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::analytics::logger::{self, InputSource, ParseLogEntry};
use crate::analytics::reporter::{self, Stats};
use crate::config::{self, FuelformConfig, schema::OutputFormat};
use crate::input::{self, Matrix};
use crate::request::{
    CompareRequest, CompareResponse, FormError, PredictionRequest, RouteRequest, RouteResponse,
    SegmentRequest, SegmentResponse,
};
use crate::view::{self, RouteForm, Tab, ViewController};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Use `arg` if given, otherwise read all of stdin.
fn read_text(arg: Option<String>) -> Result<String> {
    if let Some(text) = arg {
        return Ok(text);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read input from stdin")?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}

/// Resolve `--format`, defaulting to `[general] format`.
pub fn resolve_format(arg: Option<&str>, cfg: &FuelformConfig) -> OutputFormat {
    OutputFormat::from_str_or(arg, cfg.general.format)
}

/// Apply `[general] color` to the terminal.
pub fn apply_color(cfg: &FuelformConfig) {
    if !cfg.general.color {
        colored::control::set_override(false);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize output")?
    );
    Ok(())
}

fn matrix_csv(matrix: &Matrix) -> String {
    matrix
        .iter()
        .map(|row| {
            row.iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// fuelform parse
// ---------------------------------------------------------------------------

/// Parse route text into a matrix and print it.
pub fn run_parse(text: Option<String>, format: OutputFormat, cfg: &FuelformConfig) -> Result<()> {
    let raw = read_text(text)?;
    let result = input::parse_with(&raw, &cfg.input.parser_options());
    logger::log_event(&cfg.logging, &ParseLogEntry::matrix(&raw, &result));

    let parsed = result.context("could not parse route input")?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "dialect": parsed.dialect.as_str(),
            "rows": parsed.rows(),
            "columns": parsed.max_columns(),
            "matrix": parsed.matrix,
        }))?,
        OutputFormat::Csv => println!("{}", matrix_csv(&parsed.matrix)),
        OutputFormat::Table => {
            println!(
                "{} {} {} x {} ({})",
                "✓".green().bold(),
                "Parsed".bold(),
                parsed.rows(),
                parsed.max_columns(),
                parsed.dialect
            );
            for (i, row) in parsed.matrix.iter().enumerate() {
                let cells: Vec<String> = row.iter().map(f64::to_string).collect();
                println!("  {:<8} {}", format!("Seg {}", i + 1).dimmed(), cells.join(", "));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// fuelform row
// ---------------------------------------------------------------------------

/// Parse a single comma-separated row, dropping unreadable tokens.
pub fn run_row(text: Option<String>, format: OutputFormat, cfg: &FuelformConfig) -> Result<()> {
    let raw = read_text(text)?;
    let values = input::parse_row(&raw);
    logger::log_event(&cfg.logging, &ParseLogEntry::row(&raw, &values));

    match format {
        OutputFormat::Json => print_json(&values)?,
        OutputFormat::Csv => println!("{}", matrix_csv(&vec![values])),
        OutputFormat::Table => {
            if values.is_empty() {
                println!("{}", "No readable numbers.".yellow());
            } else {
                let cells: Vec<String> = values.iter().map(f64::to_string).collect();
                println!("{} {}", format!("{} values:", values.len()).bold(), cells.join(", "));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// fuelform request
// ---------------------------------------------------------------------------

/// Print a request body on stdout and its endpoint on stderr.
fn emit_request<R: PredictionRequest>(request: &R) -> Result<()> {
    eprintln!("{} {}", "→".dimmed(), R::ENDPOINT.to_string().dimmed());
    println!("{}", request.to_json().context("failed to serialize request body")?);
    Ok(())
}

fn log_form(
    cfg: &FuelformConfig,
    source: InputSource,
    input_bytes: usize,
    outcome: Result<(usize, usize), &FormError>,
) {
    logger::log_event(
        &cfg.logging,
        &ParseLogEntry::form(source, input_bytes, outcome),
    );
}

fn matrix_shape(matrix: &Matrix) -> (usize, usize) {
    (
        matrix.len(),
        matrix.iter().map(Vec::len).max().unwrap_or(0),
    )
}

/// Build the `/predict_segment` body from a feature list.
pub fn run_request_segment(features: Option<String>, cfg: &FuelformConfig) -> Result<()> {
    let raw = read_text(features)?;
    let result = SegmentRequest::from_input(&raw, &cfg.input.form_rules());
    log_form(
        cfg,
        InputSource::Segment,
        raw.len(),
        result.as_ref().map(|r| (1, r.features.len())),
    );
    emit_request(&result?)
}

/// Build the `/predict_route` body from one argument per segment.
pub fn run_request_route(segments: Vec<String>, cfg: &FuelformConfig) -> Result<()> {
    let form = RouteForm::with_fields(segments);
    let input_bytes = form.fields().iter().map(String::len).sum();
    let result = form.to_request(&cfg.input.form_rules());
    log_form(
        cfg,
        InputSource::Route,
        input_bytes,
        result.as_ref().map(|r| matrix_shape(&r.segments)),
    );
    emit_request(&result?)
}

/// Build the `/compare_routes` body from two route texts.
pub fn run_request_compare(first: &str, second: &str, cfg: &FuelformConfig) -> Result<()> {
    let result = CompareRequest::from_inputs(first, second, &cfg.input.form_rules());
    let shape = result.as_ref().map(|r| {
        let rows = r.routes.iter().map(Vec::len).sum::<usize>();
        let columns = r.routes.iter().map(|m| matrix_shape(m).1).max().unwrap_or(0);
        (rows, columns)
    });
    log_form(cfg, InputSource::Compare, first.len() + second.len(), shape);
    emit_request(&result?)
}

// ---------------------------------------------------------------------------
// fuelform render
// ---------------------------------------------------------------------------

fn read_response<T: DeserializeOwned>(arg: Option<String>) -> Result<T> {
    let text = read_text(arg)?;
    serde_json::from_str(&text).context("response is not valid JSON for this endpoint")
}

/// Render a `/predict_segment` response.
pub fn run_render_segment(response: Option<String>, cfg: &FuelformConfig) -> Result<()> {
    let response: SegmentResponse = read_response(response)?;
    println!(
        "{} {}",
        "Predicted fuel:".bold(),
        view::report::segment_summary(&response, cfg.display.decimals)
            .green()
            .bold()
    );
    Ok(())
}

/// Render a `/predict_route` response as a total plus a bar per segment.
pub fn run_render_route(response: Option<String>, cfg: &FuelformConfig) -> Result<()> {
    let response: RouteResponse = read_response(response)?;
    let chart = view::report::route_breakdown(&response);
    let decimals = cfg.display.decimals;

    println!(
        "{} {}",
        "Total fuel:".bold(),
        view::report::format_fuel(chart.total, decimals)
            .green()
            .bold()
    );
    for bar in &chart.bars {
        println!(
            "  {:<8} {:<width$} {:>10}",
            bar.label.dimmed(),
            bar.blocks(cfg.display.bar_width).cyan(),
            view::report::format_fuel(bar.value, decimals),
            width = cfg.display.bar_width,
        );
    }
    Ok(())
}

/// Render a `/compare_routes` response with the winner highlighted.
pub fn run_render_compare(response: Option<String>, cfg: &FuelformConfig) -> Result<()> {
    let response: CompareResponse = read_response(response)?;
    let summary = view::report::compare_summary(&response);

    for (i, (label, fuel)) in summary.routes.iter().enumerate() {
        let value = view::report::format_fuel(*fuel, cfg.display.decimals);
        if summary.winner == Some(i) {
            println!("  {} {:<8} {}", "★".green().bold(), label.bold(), value.green().bold());
        } else {
            println!("    {:<8} {}", label, value);
        }
    }
    match summary.banner() {
        Some(banner) => println!("{}", banner.green()),
        None => println!(
            "{}",
            format!(
                "Backend reported best_route_index {} for {} routes.",
                response.best_route_index,
                summary.routes.len()
            )
            .yellow()
        ),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// fuelform tabs
// ---------------------------------------------------------------------------

/// Print the tab strip with `select` (or the default tab) active.
pub fn run_tabs(select: Option<&str>) -> Result<()> {
    let mut controller = ViewController::new();
    if let Some(name) = select {
        let tab = Tab::from_name(name)
            .with_context(|| format!("unknown tab '{name}' (segment, route, compare)"))?;
        controller.switch_tab(tab);
    }

    let strip: Vec<String> = controller
        .render()
        .tabs
        .iter()
        .map(|view| {
            if view.active {
                format!("[{}]", view.tab).bold().cyan().to_string()
            } else {
                format!(" {} ", view.tab).dimmed().to_string()
            }
        })
        .collect();
    println!("{}", strip.join(" "));

    if controller.active() == Tab::Route {
        println!("  {}", RouteForm::placeholder(0).dimmed());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// fuelform stats
// ---------------------------------------------------------------------------

/// Summarize the parse event log.
pub fn run_stats(format: OutputFormat, days: Option<u32>, cfg: &FuelformConfig) -> Result<()> {
    let path = cfg
        .logging
        .resolved_path()
        .context("could not resolve the parse log path")?;
    let stats = reporter::compute_stats(&path, days);

    if stats.total_events == 0 {
        println!(
            "{}",
            "No data yet. Parse some input with fuelform to see stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&stats)?,
        OutputFormat::Csv => print_stats_csv(&stats),
        OutputFormat::Table => print_stats_table(&stats),
    }

    Ok(())
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "fuelform Input Report".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();

    println!("  {} {}", "Total events:".bold(), stats.total_events);
    println!("  {} {:.1}%", "Success rate:".bold(), stats.success_pct());
    println!();

    let dist = &stats.dialects;
    println!("{}", "Matrix Dialects".bold().cyan());
    println!(
        "  JSON: {} ({:.0}%)  Semicolon: {} ({:.0}%)  Single quotes: {} ({:.0}%)",
        dist.strict,
        dist.pct(dist.strict),
        dist.semicolon,
        dist.pct(dist.semicolon),
        dist.lenient_quotes,
        dist.pct(dist.lenient_quotes),
    );
    println!();

    println!("{}", "By Input".bold().cyan());
    println!("  {:<10} {:>6} {:>8} {:>9}", "Input", "Count", "OK", "Avg rows");
    println!("  {}", "-".repeat(36));
    for s in &stats.source_stats {
        println!(
            "  {:<10} {:>6} {:>8} {:>9.1}",
            s.source.as_str(),
            s.count,
            s.successes,
            s.avg_rows
        );
    }

    if !stats.errors.is_empty() {
        println!();
        println!("{}", "Top Errors".bold().cyan());
        for (error, count) in stats.errors.iter().take(10) {
            println!("  {:<20} {:>6}", error, count);
        }
    }
}

fn print_stats_json(stats: &Stats) -> Result<()> {
    print_json(&serde_json::json!({
        "total_events": stats.total_events,
        "successes": stats.successes,
        "success_pct": stats.success_pct(),
        "dialects": {
            "strict": stats.dialects.strict,
            "semicolon": stats.dialects.semicolon,
            "lenient_quotes": stats.dialects.lenient_quotes,
        },
        "sources": stats.source_stats.iter().map(|s| serde_json::json!({
            "source": s.source,
            "count": s.count,
            "successes": s.successes,
            "avg_rows": s.avg_rows,
        })).collect::<Vec<_>>(),
        "errors": stats.errors.iter().map(|(error, count)| serde_json::json!({
            "error": error,
            "count": count,
        })).collect::<Vec<_>>(),
    }))
}

fn print_stats_csv(stats: &Stats) {
    println!("source,count,successes,avg_rows");
    for s in &stats.source_stats {
        println!(
            "{},{},{},{:.2}",
            s.source.as_str(),
            s.count,
            s.successes,
            s.avg_rows
        );
    }
}

// ---------------------------------------------------------------------------
// fuelform config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective fuelform Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.fuelform/config.toml", global_exists);
    print_source(".fuelform.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "FUELFORM_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.fuelform/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_are_newline_separated() {
        let matrix = vec![vec![1.0, 2.5], vec![3.0]];
        assert_eq!(matrix_csv(&matrix), "1,2.5\n3");
    }

    #[test]
    fn shape_uses_widest_row() {
        assert_eq!(matrix_shape(&vec![vec![1.0], vec![1.0, 2.0, 3.0]]), (2, 3));
        assert_eq!(matrix_shape(&Vec::new()), (0, 0));
    }

    #[test]
    fn format_falls_back_to_config() {
        let mut cfg = FuelformConfig::default();
        cfg.general.format = OutputFormat::Csv;
        assert_eq!(resolve_format(None, &cfg), OutputFormat::Csv);
        assert_eq!(resolve_format(Some("json"), &cfg), OutputFormat::Json);
    }

    #[test]
    fn explicit_text_skips_stdin() {
        assert_eq!(read_text(Some("1,2".to_string())).unwrap(), "1,2");
    }

    #[test]
    fn unknown_tab_is_an_error() {
        assert!(run_tabs(Some("map")).is_err());
    }
}
