use std::f32::consts::TAU;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, GridMark, Plot};

use crate::color::ColorMap;
use crate::data::report::{CountryAverage, HistogramBin, JobAverage, ModalityShare};
use crate::ui::format;

const CHART_HEIGHT: f32 = 320.0;
const NO_DATA: &str = "No data available for the selected filters.";

// ---------------------------------------------------------------------------
// Shared chart chrome
// ---------------------------------------------------------------------------

/// Title plus either the chart body or a "no data" warning.
fn chart_section<T>(ui: &mut Ui, title: &str, data: Option<&[T]>, body: impl FnOnce(&mut Ui, &[T])) {
    ui.strong(title);
    match data {
        Some(rows) => body(ui, rows),
        None => {
            ui.colored_label(Color32::from_rgb(230, 160, 40), NO_DATA);
        }
    }
}

/// Axis formatter that labels integer grid marks with category names.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Top jobs by average salary (horizontal bars, ascending)
// ---------------------------------------------------------------------------

pub fn top_jobs_chart(ui: &mut Ui, jobs: Option<&[JobAverage]>, limit: usize) {
    let title = format!("Top {limit} Jobs by Average Salary (USD)");
    chart_section(ui, &title, jobs, |ui, jobs| {
        let bars: Vec<Bar> = jobs
            .iter()
            .enumerate()
            .map(|(i, job)| {
                Bar::new(i as f64, job.average_salary)
                    .name(&job.job_title)
                    .width(0.7)
            })
            .collect();
        let labels = jobs.iter().map(|j| j.job_title.clone()).collect();

        Plot::new("top_jobs_plot")
            .height(CHART_HEIGHT)
            .x_axis_label("Average Salary (USD)")
            .y_axis_formatter(category_axis(labels))
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .horizontal()
                        .color(Color32::from_rgb(126, 3, 168))
                        .name("Average Salary"),
                );
            });
    });
}

// ---------------------------------------------------------------------------
// Salary distribution (histogram)
// ---------------------------------------------------------------------------

pub fn salary_histogram(ui: &mut Ui, bins: Option<&[HistogramBin]>) {
    chart_section(ui, "Salary Distribution", bins, |ui, bins| {
        let bars: Vec<Bar> = bins
            .iter()
            .map(|bin| {
                let width = (bin.upper - bin.lower).max(1.0);
                Bar::new((bin.lower + bin.upper) / 2.0, bin.count as f64)
                    .width(width)
                    .name(format!(
                        "{} – {}",
                        format::currency(bin.lower),
                        format::currency(bin.upper)
                    ))
            })
            .collect();

        Plot::new("salary_histogram_plot")
            .height(CHART_HEIGHT)
            .x_axis_label("Salary (USD)")
            .allow_drag(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(Color32::from_rgb(33, 102, 172))
                        .name("Records"),
                );
            });
    });
}

// ---------------------------------------------------------------------------
// Work modality (donut with percent + label)
// ---------------------------------------------------------------------------

pub fn work_modality_chart(ui: &mut Ui, shares: Option<&[ModalityShare]>, colors: Option<&ColorMap>) {
    chart_section(ui, "Work Modality Distribution", shares, |ui, shares| {
        let size = Vec2::new(ui.available_width(), CHART_HEIGHT);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let rect = response.rect;
        let center = rect.center();
        let radius = rect.height().min(rect.width()) * 0.42;
        let hole = radius * 0.5;

        let mut start = -TAU / 4.0;
        for share in shares {
            let sweep = TAU * (share.percent / 100.0) as f32;
            let color = colors
                .map(|cm| cm.color_for(&share.modality))
                .unwrap_or(Color32::LIGHT_BLUE);
            fill_wedge(&painter, center, radius, start, sweep, color);

            // Label in the middle of the ring.
            let mid = start + sweep / 2.0;
            let label_r = (radius + hole) / 2.0;
            let pos = center + Vec2::new(mid.cos(), mid.sin()) * label_r;
            painter.text(
                pos,
                Align2::CENTER_CENTER,
                share.label(),
                FontId::proportional(12.0),
                Color32::WHITE,
            );
            start += sweep;
        }

        painter.circle_filled(center, hole, ui.visuals().panel_fill);
    });
}

/// Fill a pie wedge as a fan of convex polygons no wider than a quarter turn.
fn fill_wedge(painter: &egui::Painter, center: Pos2, radius: f32, start: f32, sweep: f32, color: Color32) {
    const MAX_PIECE: f32 = TAU / 4.0;
    const STEPS_PER_PIECE: usize = 16;

    let mut piece_start = start;
    let end = start + sweep;
    while piece_start < end {
        let piece_end = (piece_start + MAX_PIECE).min(end);
        let mut points = Vec::with_capacity(STEPS_PER_PIECE + 2);
        points.push(center);
        for step in 0..=STEPS_PER_PIECE {
            let t = piece_start + (piece_end - piece_start) * step as f32 / STEPS_PER_PIECE as f32;
            points.push(center + Vec2::new(t.cos(), t.sin()) * radius);
        }
        painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
        piece_start = piece_end;
    }
}

// ---------------------------------------------------------------------------
// Per-country average salary for the focus job title
// ---------------------------------------------------------------------------

pub fn country_average_chart(ui: &mut Ui, job_title: &str, countries: Option<&[CountryAverage]>) {
    let title = format!("Average Salary of {job_title}s by Country");
    chart_section(ui, &title, countries, |ui, countries| {
        if countries.is_empty() {
            ui.label(format!("No {job_title} records in the current selection."));
            return;
        }

        let bars: Vec<Bar> = countries
            .iter()
            .enumerate()
            .map(|(i, c)| Bar::new(i as f64, c.average_salary).name(&c.iso3).width(0.7))
            .collect();
        let labels = countries.iter().map(|c| c.iso3.clone()).collect();

        Plot::new("country_average_plot")
            .height(CHART_HEIGHT)
            .y_axis_label("Average Salary (USD)")
            .x_axis_formatter(category_axis(labels))
            .allow_drag(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(Color32::from_rgb(53, 183, 121))
                        .name("Average Salary"),
                );
            });
    });
}
