pub mod charting;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, BarChart, Block, Chart, Dataset, Gauge, GraphType, Paragraph, Widget},
};
use reptrack::{scoring::SEGMENT_SECS, time_series::pose_score_series, SourceMode};
use unicode_width::UnicodeWidthStr;

use crate::{
    ui::charting::{compute_chart_params, format_label, segment_bars},
    App, AppState,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match (&self.state, &self.summary) {
            (AppState::Results, Some(_)) => render_results(self, area, buf),
            _ => render_live(self, area, buf),
        }
    }
}

pub fn render_live(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let warning_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::ITALIC);

    let status = app.status();
    let profile = &app.runner.tracker().state().profile;

    let padding = area.height.saturating_sub(9) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(1), // title
                Constraint::Length(padding),
                Constraint::Length(1), // reps and stage
                Constraint::Length(1), // clock
                Constraint::Length(1), // engagement / pause notice
                Constraint::Length(3), // pose score gauge
                Constraint::Min(0),
                Constraint::Length(1), // legend
            ]
            .as_ref(),
        )
        .split(area);

    let mode = match app.runner.mode() {
        SourceMode::Live => "live",
        SourceMode::File => "playback",
    };
    let title = format!("{} ({mode}) - {}", app.kind().display_name(), profile.name);
    Paragraph::new(Span::styled(title, bold_style))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let headline = format!("{} reps   stage: {}", status.rep_count, status.stage);
    let headline = if headline.width() > chunks[2].width as usize {
        format!("{} reps", status.rep_count)
    } else {
        headline
    };
    Paragraph::new(Span::styled(headline, green_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let mut clock = format!(
        "{:.1}s elapsed   {:.1}s paused",
        status.elapsed_secs, status.pause_secs
    );
    if let Some(remaining) = status.remaining_secs {
        clock.push_str(&format!("   {remaining:.1}s left"));
    }
    Paragraph::new(Span::styled(clock, dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let notice = if !status.engaged {
        "waiting for the first movement"
    } else if status.paused {
        "PAUSED - no usable pose"
    } else {
        ""
    };
    Paragraph::new(Span::styled(notice, warning_style))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    let score = status.last_pose_score.unwrap_or(0.0).clamp(0.0, 1.0);
    Gauge::default()
        .block(Block::bordered().title("pose score"))
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(score)
        .label(format!("{:.0}%", score * 100.0))
        .render(chunks[5], buf);

    Paragraph::new(Span::styled("(s)top / (r)estart / (esc)ape", italic_style))
        .render(chunks[7], buf);
}

pub fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(summary) = &app.summary else {
        return;
    };

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Min(1),    // charts
                Constraint::Length(1), // headline stats
                Constraint::Length(1), // timing detail
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
            ]
            .as_ref(),
        )
        .split(area);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[0]);

    let bars = segment_bars(&summary.reps_per_segment);
    let bar_refs: Vec<(&str, u64)> = bars.iter().map(|(l, v)| (l.as_str(), *v)).collect();
    let bar_width = (charts[0].width.saturating_sub(2) / bars.len().max(1) as u16)
        .saturating_sub(1)
        .clamp(1, 6);
    BarChart::default()
        .block(Block::bordered().title(format!("reps per {SEGMENT_SECS}s")))
        .data(bar_refs.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green))
        .render(charts[0], buf);

    let coords: Vec<(f64, f64)> = pose_score_series(&summary.pose_scores)
        .into_iter()
        .map(Into::into)
        .collect();
    let (frames, _) = compute_chart_params(&coords, None);
    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&coords)];
    Chart::new(datasets)
        .block(Block::bordered().title("pose score"))
        .x_axis(
            Axis::default()
                .title("frame")
                .bounds([0.0, frames])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(format_label(frames), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("%")
                .bounds([0.0, 100.0])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled("100", bold_style),
                ]),
        )
        .render(charts[1], buf);

    let stats = format!(
        "{} reps   {:.1} reps/min   {:.2} kcal   {}",
        summary.rep_count,
        summary.rep_rate_per_min(),
        summary.calories_kcal,
        summary.stamina_tier.badge()
    );
    Paragraph::new(Span::styled(stats, bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let detail = format!(
        "{}s total | {:.1}s active | {:.1}s paused | pose {:.0}%",
        summary.total_duration_secs,
        summary.active_secs,
        summary.pause_secs,
        summary.avg_pose_score * 100.0
    );
    Paragraph::new(Span::styled(
        detail,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled("(r)estart / (esc)ape", italic_style)).render(chunks[4], buf);
}
