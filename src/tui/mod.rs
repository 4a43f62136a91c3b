//! Ratatui-based terminal chart viewer.
//!
//! Shows both fitted curves over the raw samples with a legend panel. The call
//! blocks until the operator closes the viewer (`q` / `Esc`).

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::pipeline::RunOutput;
use crate::error::AppError;
use crate::plot::{DATA_LABEL, X_LABEL, Y_LABEL, render_svg_chart, series_rgb};
use crate::report::format_param_vector;

mod plotters_chart;

use plotters_chart::{CalibrationChart, ChartLine};

/// Light blue reads better than the SVG's dark blue on a terminal background.
const TERMINAL_DATA_RGB: (u8, u8, u8) = (90, 160, 255);

/// Where `s` saves a snapshot of the chart.
const SNAPSHOT_PATH: &str = "dacfit_chart.svg";

/// Open the chart viewer and block until it is closed.
pub fn run(output: &RunOutput) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::render(format!("Failed to initialize terminal: {e}")))?;

    let mut viewer = Viewer::new(output);
    viewer.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::render(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::render(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct Viewer<'a> {
    output: &'a RunOutput,
    /// Visibility per fitted curve, same order as `output.chart.curves`.
    show_curve: Vec<bool>,
    show_samples: bool,
    status: String,
}

impl<'a> Viewer<'a> {
    fn new(output: &'a RunOutput) -> Self {
        Self {
            output,
            show_curve: vec![true; output.chart.curves.len()],
            show_samples: true,
            status: String::new(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::render(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::render(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::render(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the viewer should close.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if let Some(flag) = self.show_curve.get_mut(idx) {
                    *flag = !*flag;
                    self.status = format!(
                        "{} fit {}",
                        self.output.chart.curves[idx].kind.display_name(),
                        if *flag { "shown" } else { "hidden" }
                    );
                }
            }
            KeyCode::Char('d') => {
                self.show_samples = !self.show_samples;
                self.status = format!("data {}", if self.show_samples { "shown" } else { "hidden" });
            }
            KeyCode::Char('s') => {
                let path = PathBuf::from(SNAPSHOT_PATH);
                self.status = match render_svg_chart(&self.output.chart, &path, (1024, 768)) {
                    Ok(()) => format!("Wrote {}", path.display()),
                    Err(err) => format!("Snapshot failed: {err}"),
                };
            }
            _ => {}
        }
        false
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let stats = &self.output.stats;
        let line = Line::from(vec![
            Span::styled("dacfit", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!(
                    " | n={} | x=[{:.1}, {:.1}] °C | y=[{:.0}, {:.0}]",
                    stats.n_points, stats.x_min, stats.x_max, stats.y_min, stats.y_max
                ),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(46)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_legend(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Calibration fit").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let chart = &self.output.chart;
        let lines = chart
            .curves
            .iter()
            .zip(self.show_curve.iter())
            .filter(|(_, shown)| **shown)
            .map(|(curve, _)| {
                let (r, g, b) = series_rgb(curve.kind);
                ChartLine {
                    points: &curve.points,
                    color: RGBColor(r, g, b),
                }
            })
            .collect();
        let (r, g, b) = TERMINAL_DATA_RGB;

        let widget = CalibrationChart {
            lines,
            points: if self.show_samples { chart.samples.as_slice() } else { &[] },
            points_color: RGBColor(r, g, b),
            x_bounds: chart.x_bounds,
            y_bounds: chart.y_bounds,
            x_label: X_LABEL,
            y_label: Y_LABEL,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_legend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();

        for ((curve, fit), shown) in self
            .output
            .chart
            .curves
            .iter()
            .zip(self.output.fits.iter())
            .zip(self.show_curve.iter())
        {
            let (r, g, b) = series_rgb(curve.kind);
            let mut style = Style::default().fg(Color::Rgb(r, g, b));
            if !shown {
                style = style.add_modifier(Modifier::DIM | Modifier::CROSSED_OUT);
            }
            lines.push(Line::from(Span::styled(format!("── {}", curve.label), style)));
            lines.push(Line::from(Span::styled(
                format!("   {}", format_param_vector(&fit.model.params)),
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::from(Span::styled(
                format!("   rmse={:.3} r²={:.6}", fit.quality.rmse, fit.quality.r_squared),
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::raw(""));
        }

        let (r, g, b) = TERMINAL_DATA_RGB;
        let mut data_style = Style::default().fg(Color::Rgb(r, g, b));
        if !self.show_samples {
            data_style = data_style.add_modifier(Modifier::DIM | Modifier::CROSSED_OUT);
        }
        lines.push(Line::from(Span::styled(format!(" •  {DATA_LABEL}"), data_style)));

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Legend").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "1/2 toggle fits  d toggle data  s save svg  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
