use super::view_block;
use crate::app_state::App;
use crate::series::palette::{hex_color, series_color};
use crate::theme::Palette;
use crate::tiles::{
    BarTile, LineTile, ScatterTile, ShareTile, MARKET_SHARE, PERFORMANCE, REVENUE_VS_USERS, SALES,
    TRAFFIC_TRENDS, USER_GROWTH,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph,
    },
    Frame,
};

fn tile_block<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title,
            Style::default()
                .fg(palette.chart_text)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(palette.border))
}

pub fn render(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let block = view_block("Tiles".to_string(), app, palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(inner);
    let top = Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[1]);

    render_bars(f, top[0], &SALES, palette);
    render_lines(f, top[1], &USER_GROWTH, palette);
    render_share(f, top[2], &MARKET_SHARE, palette);
    render_scatter(f, bottom[0], &REVENUE_VS_USERS, palette);
    render_lines(f, bottom[1], &TRAFFIC_TRENDS, palette);
    render_gauge(f, bottom[2], palette);
}

fn render_bars(f: &mut Frame, area: Rect, tile: &BarTile, palette: &Palette) {
    let text = Style::default().fg(palette.chart_text);
    let mut chart = BarChart::default()
        .block(tile_block(tile.title, palette))
        .bar_width(2)
        .bar_gap(0)
        .group_gap(1)
        .value_style(text)
        .label_style(text);
    for (i, month) in tile.categories.iter().enumerate() {
        let bars: Vec<Bar> = tile
            .groups
            .iter()
            .enumerate()
            .map(|(g, (_, values))| {
                Bar::default()
                    .value(values[i])
                    .text_value(String::new())
                    .style(Style::default().fg(hex_color(series_color(g))))
            })
            .collect();
        chart = chart.data(BarGroup::default().label(Line::from(*month)).bars(&bars));
    }
    f.render_widget(chart, area);
}

fn render_lines(f: &mut Frame, area: Rect, tile: &LineTile, palette: &Palette) {
    let points: Vec<Vec<(f64, f64)>> = tile
        .series
        .iter()
        .map(|(_, values)| {
            values
                .iter()
                .enumerate()
                .map(|(x, y)| (x as f64, *y))
                .collect()
        })
        .collect();
    let datasets: Vec<Dataset> = tile
        .series
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, ((name, _), pts))| {
            Dataset::default()
                .name(*name)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(hex_color(series_color(i))))
                .data(pts)
        })
        .collect();

    let text = Style::default().fg(palette.chart_text);
    let last = tile.categories.len().saturating_sub(1);
    let max = tile.max_value();
    let chart = Chart::new(datasets)
        .block(tile_block(tile.title, palette))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(palette.border))
                .bounds([0.0, last.max(1) as f64])
                .labels(vec![
                    Span::styled(tile.categories.first().copied().unwrap_or(""), text),
                    Span::styled(tile.categories.get(last).copied().unwrap_or(""), text),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(palette.border))
                .bounds([0.0, max])
                .labels(vec![
                    Span::styled("0", text),
                    Span::styled(format!("{:.0}", max), text),
                ]),
        );
    f.render_widget(chart, area);
}

/// 占比图：每项一条横向比例条
fn render_share(f: &mut Frame, area: Rect, tile: &ShareTile, palette: &Palette) {
    let block = tile_block(tile.title, palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let shares = tile.shares();
    let rows = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints(shares.iter().map(|_| Constraint::Length(2)).collect::<Vec<_>>())
        .split(inner);
    for (i, ((name, pct), row)) in shares.iter().zip(rows.iter()).enumerate() {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(hex_color(series_color(i))))
            .label(format!("{} {}%", name, pct))
            .percent(*pct as u16);
        f.render_widget(gauge, Rect { height: 1, ..*row });
    }
}

fn render_scatter(f: &mut Frame, area: Rect, tile: &ScatterTile, palette: &Palette) {
    let text = Style::default().fg(palette.chart_text);
    let x_max = tile.points.iter().map(|p| p.0).fold(0.0, f64::max);
    let y_max = tile.points.iter().map(|p| p.1).fold(0.0, f64::max);
    let dataset = Dataset::default()
        .name(tile.title)
        .marker(symbols::Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(hex_color(series_color(0))))
        .data(&tile.points);
    let chart = Chart::new(vec![dataset])
        .block(tile_block(tile.title, palette))
        .x_axis(
            Axis::default()
                .title(Span::styled(tile.x_label, text))
                .style(Style::default().fg(palette.border))
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::styled("0", text),
                    Span::styled(format!("{:.0}", x_max), text),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(tile.y_label, text))
                .style(Style::default().fg(palette.border))
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::styled("0", text),
                    Span::styled(format!("{:.0}", y_max), text),
                ]),
        );
    f.render_widget(chart, area);
}

fn render_gauge(f: &mut Frame, area: Rect, palette: &Palette) {
    let block = tile_block(PERFORMANCE.title, palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(palette.success))
        .label(format!("{}%", PERFORMANCE.percent))
        .percent(PERFORMANCE.percent);
    f.render_widget(gauge, chunks[1]);
    f.render_widget(
        Paragraph::new(Span::styled(
            PERFORMANCE.label,
            Style::default().fg(palette.chart_text),
        ))
        .alignment(ratatui::layout::Alignment::Center),
        chunks[2],
    );
}
