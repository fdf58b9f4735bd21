//! Two-panel evaluation figure: confusion matrix heatmap and ROC curve

use crate::error::{HeartIqError, Result};
use crate::evaluation::EvaluationReport;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

const FIGURE_SIZE: (u32, u32) = (1500, 600);
const FONT: &str = "sans-serif";

fn plot_err<E: std::fmt::Display>(e: E) -> HeartIqError {
    HeartIqError::PlotError(e.to_string())
}

/// Linear blend between the light and dark ends of a green colormap
fn green(intensity: f64) -> RGBColor {
    let t = intensity.clamp(0.0, 1.0);
    let (light, dark) = ((247.0, 252.0, 245.0), (0.0, 68.0, 27.0));
    let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(mix(light.0, dark.0), mix(light.1, dark.1), mix(light.2, dark.2))
}

/// Render the confusion matrix and ROC curve of `report` as SVG
pub fn render_evaluation(path: &Path, report: &EvaluationReport) -> Result<()> {
    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let (left, right) = root.split_horizontally(FIGURE_SIZE.0 / 2);
    draw_confusion_matrix(&left, &report.confusion_matrix, &report.labels)?;
    draw_roc_curve(&right, &report.roc_curve.fpr, &report.roc_curve.tpr, report.auc_roc)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

fn draw_confusion_matrix<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    matrix: &[Vec<usize>],
    labels: &[String],
) -> Result<()> {
    let area = area
        .titled("Confusion Matrix (Optimized Model)", (FONT, 22))
        .map_err(plot_err)?;

    let n = matrix.len().max(1) as i32;
    let (width, height) = area.dim_in_pixel();
    let cell = ((width as i32 - 200).min(height as i32 - 120) / n).max(1);
    let origin = (140, 20);
    let max = matrix.iter().flatten().copied().max().unwrap_or(0).max(1) as f64;
    let centred = |size: u32, color: &RGBColor| {
        (FONT, size)
            .into_font()
            .color(color)
            .pos(Pos::new(HPos::Center, VPos::Center))
    };

    for (i, row) in matrix.iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            let x0 = origin.0 + j as i32 * cell;
            let y0 = origin.1 + i as i32 * cell;
            let intensity = count as f64 / max;
            area.draw(&Rectangle::new([(x0, y0), (x0 + cell, y0 + cell)], green(intensity).filled()))
                .map_err(plot_err)?;
            area.draw(&Rectangle::new([(x0, y0), (x0 + cell, y0 + cell)], BLACK.stroke_width(1)))
                .map_err(plot_err)?;

            let text_color = if intensity > 0.5 { WHITE } else { BLACK };
            area.draw(&Text::new(
                count.to_string(),
                (x0 + cell / 2, y0 + cell / 2),
                centred(28, &text_color),
            ))
            .map_err(plot_err)?;
        }
    }

    let bottom = origin.1 + n * cell;
    for (k, label) in labels.iter().enumerate() {
        let centre = k as i32 * cell + cell / 2;
        area.draw(&Text::new(label.clone(), (origin.0 + centre, bottom + 20), centred(16, &BLACK)))
            .map_err(plot_err)?;
        area.draw(&Text::new(label.clone(), (origin.0 - 50, origin.1 + centre), centred(16, &BLACK)))
            .map_err(plot_err)?;
    }
    area.draw(&Text::new(
        "Predicted label",
        (origin.0 + n * cell / 2, bottom + 50),
        centred(18, &BLACK),
    ))
    .map_err(plot_err)?;
    area.draw(&Text::new(
        "True label",
        (origin.0 - 110, origin.1 + n * cell / 2),
        centred(18, &BLACK),
    ))
    .map_err(plot_err)?;

    Ok(())
}

fn draw_roc_curve<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    fpr: &[f64],
    tpr: &[f64],
    auc: f64,
) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .caption("ROC Curve", (FONT, 22).into_font())
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..1f64, 0f64..1.05f64)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .draw()
        .map_err(plot_err)?;

    let points: Vec<(f64, f64)> = fpr.iter().copied().zip(tpr.iter().copied()).collect();
    chart
        .draw_series(LineSeries::new(points, BLUE.stroke_width(2)))
        .map_err(plot_err)?
        .label(format!("ROC area = {:.2}", auc))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    // Chance diagonal, dashed
    let dashes = 40;
    chart
        .draw_series((0..dashes).step_by(2).map(|k| {
            let a = k as f64 / dashes as f64;
            let b = (k + 1) as f64 / dashes as f64;
            PathElement::new(vec![(a, a), (b, b)], RGBColor(128, 128, 128).stroke_width(1))
        }))
        .map_err(plot_err)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}
