use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;
use crate::ui::{format, plot};

// ---------------------------------------------------------------------------
// Central panel: metrics, charts and the data table
// ---------------------------------------------------------------------------

pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a salary dataset to begin  (File → Open…)");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Data Visualization Dashboard 📊");
            ui.label(
                "Explore salary data across years, seniority levels, work modalities and company sizes.",
            );
            ui.add_space(8.0);

            metric_cards(ui, state);
            ui.separator();

            charts(ui, state);
            ui.separator();

            ui.heading("Data Table");
            data_table(ui, state);
        });
}

fn metric_cards(ui: &mut Ui, state: &AppState) {
    let m = &state.report.metrics;
    ui.heading("General Metrics (Yearly Average Salary)");

    let cards = [
        ("Average Salary", format::currency(m.average_salary)),
        ("Maximum Salary", format::currency(m.max_salary)),
        ("Total Entries", format::count(m.total_entries)),
        ("Most Frequent Job", m.most_frequent_job.clone()),
    ];

    ui.columns(cards.len(), |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(cards) {
            egui::Frame::group(col.style()).show(col, |ui: &mut Ui| {
                ui.label(label);
                ui.label(RichText::new(value).size(24.0).strong());
            });
        }
    });
}

fn charts(ui: &mut Ui, state: &AppState) {
    let report = &state.report;
    ui.heading("Charts");

    ui.columns(2, |cols| {
        plot::top_jobs_chart(
            &mut cols[0],
            report.top_jobs.as_deref(),
            state.report_config.top_jobs_limit,
        );
        plot::salary_histogram(&mut cols[1], report.salary_histogram.as_deref());
    });

    ui.add_space(8.0);

    ui.columns(2, |cols| {
        plot::work_modality_chart(
            &mut cols[0],
            report.work_modality.as_deref(),
            state.modality_colors.as_ref(),
        );
        plot::country_average_chart(
            &mut cols[1],
            &report.focus_job_title,
            report.focus_job_by_country.as_deref(),
        );
    });
}

fn data_table(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let columns = ds.column_names();
    let records = ds.records();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(true)
        .max_scroll_height(400.0)
        .columns(Column::auto().at_least(60.0), columns.len())
        .header(20.0, |mut header| {
            for name in columns {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, state.visible_indices.len(), |mut row| {
                let rec = &records[state.visible_indices[row.index()]];
                for name in columns {
                    row.col(|ui| {
                        ui.label(rec.display_cell(name));
                    });
                }
            });
        });
}
