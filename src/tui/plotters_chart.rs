//! Plotters-powered calibration chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`, so the terminal view shares axis/mesh handling
//! with the SVG renderer.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One line series with its colour.
pub struct ChartLine<'a> {
    pub points: &'a [(f64, f64)],
    pub color: RGBColor,
}

/// Both fitted curves plus the raw samples, borrowed from `ChartData`.
pub struct CalibrationChart<'a> {
    /// Fitted curves, drawn in order.
    pub lines: Vec<ChartLine<'a>>,
    /// Raw calibration samples (empty to hide them).
    pub points: &'a [(f64, f64)],
    pub points_color: RGBColor,
    /// X bounds (°C).
    pub x_bounds: [f64; 2],
    /// Y bounds (DAC code).
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for CalibrationChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out axes this small.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Enlarge the terminal to see the calibration chart.",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // One cell per label row/column is plenty at terminal resolution.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(7)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for line in &self.lines {
                chart.draw_series(LineSeries::new(line.points.iter().copied(), &line.color))?;
            }

            // `Pixel` rather than `Circle`: the backend maps circle radii in
            // pixels onto canvas units, which produces oversized markers.
            let points_color = self.points_color;
            chart.draw_series(self.points.iter().map(|&(x, y)| Pixel::new((x, y), points_color)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
