//! Plotters-powered SVG chart.
//!
//! Writes the same three series as the terminal views (linear fit, cubic fit,
//! raw samples) with axis labels and a legend. SVG keeps text as text, so no
//! font rasterizer is needed.

use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::error::AppError;
use crate::plot::{ChartData, DATA_LABEL, DATA_RGB, X_LABEL, Y_LABEL, series_rgb};

/// Render the chart to an SVG file.
///
/// Unusable bounds are a render error; failing to write `path` is an I/O error.
pub fn render_svg_chart(data: &ChartData, path: &Path, size: (u32, u32)) -> Result<(), AppError> {
    check_bounds(data)?;
    let root = SVGBackend::new(path, size).into_drawing_area();
    draw_chart(&root, data)
        .and_then(|()| root.present().map_err(Into::into))
        .map_err(|e| AppError::io(format!("Failed to write chart '{}': {e}", path.display())))?;
    info!(path = %path.display(), "chart written");
    Ok(())
}

fn check_bounds(data: &ChartData) -> Result<(), AppError> {
    let [x0, x1] = data.x_bounds;
    let [y0, y1] = data.y_bounds;
    if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
        return Err(AppError::render(format!(
            "Chart bounds are empty or not finite: x=[{x0}, {x1}], y=[{y0}, {y1}]."
        )));
    }
    Ok(())
}

fn draw_chart<DB>(root: &DrawingArea<DB, Shift>, data: &ChartData) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let [x0, x1] = data.x_bounds;
    let [y0, y1] = data.y_bounds;

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .label_style(("sans-serif", 14))
        .draw()?;

    for curve in &data.curves {
        let (r, g, b) = series_rgb(curve.kind);
        let color = RGBColor(r, g, b);
        chart
            .draw_series(LineSeries::new(curve.points.iter().copied(), color.stroke_width(2)))?
            .label(curve.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    let (r, g, b) = DATA_RGB;
    let data_color = RGBColor(r, g, b);
    chart
        .draw_series(
            data.samples
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, data_color.filled())),
        )?
        .label(DATA_LABEL)
        .legend(move |(x, y)| Circle::new((x + 10, y), 3, data_color.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 14))
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;
    use crate::error::{EXIT_IO, EXIT_RENDER};
    use crate::plot::ChartSeries;

    fn render_svg_string(data: &ChartData, size: (u32, u32)) -> Result<String, AppError> {
        check_bounds(data)?;
        let mut out = String::new();
        {
            let root = SVGBackend::with_string(&mut out, size).into_drawing_area();
            draw_chart(&root, data)
                .and_then(|()| root.present().map_err(Into::into))
                .map_err(|e| AppError::render(format!("Failed to render chart: {e}")))?;
        }
        Ok(out)
    }

    fn sample_chart() -> ChartData {
        ChartData {
            curves: vec![ChartSeries {
                kind: ModelKind::Linear,
                label: "fit: a=3.000, b=7.000".to_string(),
                points: vec![(0.0, 7.0), (10.0, 37.0)],
            }],
            samples: vec![(1.0, 10.0), (5.0, 22.0)],
            x_bounds: [0.0, 10.0],
            y_bounds: [5.0, 40.0],
        }
    }

    #[test]
    fn svg_contains_labels_and_legend() {
        let svg = render_svg_string(&sample_chart(), (640, 480)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Temperature [°C]"));
        assert!(svg.contains("DAC value"));
        assert!(svg.contains("fit: a=3.000, b=7.000"));
        // The legend entry for the samples is its own text node.
        assert!(svg.contains(">data<") || svg.lines().any(|l| l.trim() == "data"));
    }

    #[test]
    fn svg_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        render_svg_chart(&sample_chart(), &path, (640, 480)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<svg"));
    }

    #[test]
    fn empty_bounds_are_a_render_error() {
        let mut data = sample_chart();
        data.x_bounds = [1.0, 1.0];
        let err = render_svg_string(&data, (640, 480)).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_RENDER);

        let dir = tempfile::tempdir().unwrap();
        let err = render_svg_chart(&data, &dir.path().join("chart.svg"), (640, 480)).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_RENDER);
    }

    #[test]
    fn unwritable_output_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.svg");
        let err = render_svg_chart(&sample_chart(), &path, (640, 480)).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_IO);
        assert!(err.message().contains("chart.svg"));
    }
}
