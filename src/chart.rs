//! Chart Renderer - total billing per patient as an SVG bar chart
//!
//! Consumes the ordered output of the grouped billing query verbatim:
//! x = patient identifiers in the order given (descending total), y = totals,
//! each bar labeled with its two-decimal value.

use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::record::PatientTotal;
use crate::{Error, Result};

const CHART_SIZE: (u32, u32) = (900, 480);
const BAR_COLOR: RGBColor = RGBColor(65, 105, 225);

fn chart_err(e: impl std::fmt::Display) -> Error {
    Error::Chart(e.to_string())
}

/// Render the per-patient billing totals to an SVG file.
///
/// Patients with a NULL total (appointments but no billing) get no bar and no
/// label; their slot on the axis remains.
pub fn render_billing_chart(totals: &[PatientTotal], output: &Path) -> Result<()> {
    let root = SVGBackend::new(output, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    if totals.is_empty() {
        root.present().map_err(chart_err)?;
        return Ok(());
    }

    let y_max = totals
        .iter()
        .filter_map(|t| t.total_billed)
        .fold(0.0f64, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.15 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption("Total Billing per Patient", ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(42)
        .y_label_area_size(64)
        .build_cartesian_2d((0..totals.len()).into_segmented(), 0.0..y_top)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Patient ID")
        .y_desc("Total Billed Amount")
        .x_labels(totals.len())
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => totals
                .get(*i)
                .map(|t| t.patient_id.to_string())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(totals.iter().enumerate().filter_map(|(i, t)| {
            t.total_billed.map(|total| {
                Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), total),
                    ],
                    BAR_COLOR.filled(),
                )
            })
        }))
        .map_err(chart_err)?;

    let label_style = ("sans-serif", 14)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart
        .draw_series(totals.iter().enumerate().filter_map(|(i, t)| {
            t.total_billed.map(|total| {
                Text::new(
                    format!("{total:.2}"),
                    (SegmentValue::CenterOf(i), total),
                    label_style.clone(),
                )
            })
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}
