mod app;
mod cli;
mod color;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result};
use app::SalaryDashApp;
use clap::Parser;
use eframe::egui;

use cli::Args;
use data::filter::filter;
use data::report::DashboardReport;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.report {
        return print_report(&args);
    }

    let mut state = AppState::with_config(args.report_config());
    if let Some(path) = &args.path {
        state.open_path(path);
        if let Some(ds) = &state.dataset {
            state.filters = args.selection(ds);
            state.refilter();
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Salary Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SalaryDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}

/// Headless mode: load, filter and print the report as JSON.
fn print_report(args: &Args) -> Result<()> {
    let path = args.path.as_deref().context("--report needs a dataset path")?;
    let dataset = data::loader::load_file(path)
        .with_context(|| format!("loading {}", path.display()))?;

    let selection = args.selection(&dataset);
    let subset = filter(&dataset, &selection);
    let report = DashboardReport::build(&subset, &args.report_config());

    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    println!("{json}");
    Ok(())
}
