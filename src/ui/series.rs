use super::picker::render_picker;
use super::{centered_rect, selected_style, view_block};
use crate::app_state::App;
use crate::series::palette::hex_color;
use crate::series::{ChartKind, ChartSpec};
use crate::theme::Palette;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Sparkline,
    },
    Frame,
};

pub fn render_stream_panel(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let panel = &app.stream_panel;
    let block = view_block("Timeseries".to_string(), app, palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let controls = vec![
        Line::from(vec![
            Span::styled("Streams: ", Style::default().fg(palette.muted)),
            Span::styled(
                panel.selection_text(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        settings_line(
            panel.range.label(),
            panel.count.to_string(),
            panel.axis.label(),
            panel.kind,
            panel.loading,
            palette,
        ),
    ];
    f.render_widget(Paragraph::new(controls), chunks[0]);

    render_chart(
        f,
        chunks[1],
        &panel.chart(),
        panel.kind,
        panel.loading,
        "Select streams to display data",
        palette,
    );

    if panel.picker_open {
        render_picker(
            f,
            area,
            "Select streams",
            &panel.streams,
            &panel.selected,
            &panel.picker,
            palette,
        );
    }
}

pub fn render_model_panel(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let panel = &app.model_panel;
    let block = view_block("Model TimeSeries".to_string(), app, palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let count = if panel.requested_count > 0 && panel.requested_count != panel.count {
        format!("{} (requested {})", panel.count, panel.requested_count)
    } else {
        panel.count.to_string()
    };
    let controls = vec![
        Line::from(vec![
            Span::styled("Model: ", Style::default().fg(palette.muted)),
            Span::styled(
                panel.selection_text(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        settings_line(
            panel.range.label(),
            count,
            panel.axis.label(),
            panel.kind,
            panel.loading,
            palette,
        ),
    ];
    f.render_widget(Paragraph::new(controls), chunks[0]);

    render_chart(
        f,
        chunks[1],
        &panel.chart(),
        panel.kind,
        panel.loading,
        "Select a model to display data",
        palette,
    );

    if panel.list_open {
        render_model_list(f, area, app, palette);
    }
}

fn settings_line(
    range: &str,
    count: String,
    axis: &str,
    kind: ChartKind,
    loading: bool,
    palette: &Palette,
) -> Line<'static> {
    let label = |s: &'static str| Span::styled(s, Style::default().fg(palette.muted));
    let mut spans = vec![
        label("Range: "),
        Span::raw(range.to_string()),
        label("  Points: "),
        Span::raw(count),
        label("  Axis: "),
        Span::raw(axis.to_string()),
        label("  Chart: "),
        Span::raw(kind.label()),
    ];
    if loading {
        spans.push(Span::styled(
            "  Loading...",
            Style::default().fg(palette.warning),
        ));
    }
    Line::from(spans)
}

fn render_model_list(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let panel = &app.model_panel;
    let popup = centered_rect(50, 14, area);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Select a model (Enter 选择, Esc 关闭)")
        .border_style(Style::default().fg(palette.accent))
        .style(Style::default().fg(palette.fg).bg(palette.bg));

    if panel.models.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No items available",
                Style::default().fg(palette.muted),
            ))
            .block(block),
            popup,
        );
        return;
    }

    let rows: Vec<ListItem> = panel
        .models
        .iter()
        .map(|m| {
            let current = panel.selected.as_deref() == Some(m.id.as_str());
            let name = if m.name.is_empty() { &m.id } else { &m.name };
            ListItem::new(Line::from(vec![
                Span::raw(if current { "● " } else { "  " }),
                Span::raw(name.clone()),
                Span::styled(
                    format!("  {}", m.model_type),
                    Style::default().fg(palette.muted),
                ),
            ]))
        })
        .collect();
    let mut state = ListState::default();
    state.select(Some(panel.cursor.min(panel.models.len() - 1)));
    let list = List::new(rows)
        .block(block)
        .highlight_style(selected_style(palette));
    f.render_stateful_widget(list, popup, &mut state);
}

/// 按图表类型选择渲染器
fn render_chart(
    f: &mut Frame,
    area: Rect,
    spec: &ChartSpec,
    kind: ChartKind,
    loading: bool,
    placeholder: &str,
    palette: &Palette,
) {
    let block = Block::default()
        .borders(Borders::TOP)
        .title(Span::styled(
            spec.title.clone(),
            Style::default()
                .fg(palette.chart_text)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(palette.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if !spec.has_data() {
        let text = if loading { "Loading..." } else { placeholder };
        f.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(palette.muted))),
            inner,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    match kind {
        ChartKind::Line => render_line_chart(f, chunks[0], spec, palette),
        ChartKind::Spark => render_sparklines(f, chunks[0], spec, palette),
    }
    f.render_widget(Paragraph::new(legend(spec)), chunks[1]);
}

/// 图例：多坐标轴时标出左右侧
fn legend(spec: &ChartSpec) -> Line<'static> {
    let multi = spec.axes.len() > 1;
    let mut spans = Vec::new();
    for s in &spec.series {
        let side = match spec.axes.get(s.axis) {
            Some(axis) if multi && axis.opposite => " [R]",
            Some(_) if multi => " [L]",
            _ => "",
        };
        spans.push(Span::styled("■ ", Style::default().fg(hex_color(s.color))));
        spans.push(Span::raw(format!("{}{}  ", s.name, side)));
    }
    Line::from(spans)
}

fn format_value(v: f64) -> String {
    if v.abs() >= 1000.0 || v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// 横轴标签：首、中、尾三个刻度
fn x_labels(categories: &[String]) -> Vec<String> {
    match categories.len() {
        0 => Vec::new(),
        1 => vec![categories[0].clone()],
        n => vec![
            categories[0].clone(),
            categories[(n - 1) / 2].clone(),
            categories[n - 1].clone(),
        ],
    }
}

fn render_line_chart(f: &mut Frame, area: Rect, spec: &ChartSpec, palette: &Palette) {
    let points = spec.plot_points();
    let datasets: Vec<Dataset> = spec
        .series
        .iter()
        .zip(points.iter())
        .map(|(s, pts)| {
            Dataset::default()
                .name(s.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(hex_color(s.color)))
                .data(pts)
        })
        .collect();

    let len = spec
        .series
        .iter()
        .map(|s| s.values.len())
        .max()
        .unwrap_or(0)
        .max(spec.categories.len());
    let x_max = (len.max(2) - 1) as f64;
    let text = Style::default().fg(palette.chart_text);

    let [y_lo, y_hi] = spec.y_bounds();
    let y_labels: Vec<Span> = if spec.axes.len() > 1 {
        // 每条序列占一个区间，标签放在区间底部
        let mut labels: Vec<Span> = spec
            .axes
            .iter()
            .map(|a| Span::styled(a.title.clone(), text))
            .collect();
        labels.push(Span::raw(""));
        labels
    } else {
        vec![
            Span::styled(format_value(y_lo), text),
            Span::styled(format_value((y_lo + y_hi) / 2.0), text),
            Span::styled(format_value(y_hi), text),
        ]
    };
    let y_title = spec
        .axes
        .first()
        .filter(|_| spec.axes.len() == 1)
        .map(|a| a.title.clone())
        .unwrap_or_default();

    let chart = Chart::new(datasets)
        .style(Style::default().fg(palette.chart_text).bg(palette.bg))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(palette.border))
                .bounds([0.0, x_max])
                .labels(
                    x_labels(&spec.categories)
                        .into_iter()
                        .map(|l| Span::styled(l, text))
                        .collect(),
                ),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(y_title, text))
                .style(Style::default().fg(palette.border))
                .bounds([y_lo, y_hi])
                .labels(y_labels),
        );
    f.render_widget(chart, area);
}

/// 将序列缩放到 0..=100 并按宽度分桶取平均
fn spark_values(values: &[f64], width: usize) -> Vec<u64> {
    if values.is_empty() || width == 0 {
        return Vec::new();
    }
    let finite: Vec<f64> = values.iter().map(|v| if v.is_finite() { *v } else { 0.0 }).collect();
    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    let scale = |v: f64| {
        if span > 0.0 {
            (((v - lo) / span) * 100.0).round() as u64
        } else {
            50
        }
    };
    let buckets = width.min(finite.len());
    (0..buckets)
        .map(|b| {
            let start = b * finite.len() / buckets;
            let end = ((b + 1) * finite.len() / buckets).max(start + 1);
            let slice = &finite[start..end];
            scale(slice.iter().sum::<f64>() / slice.len() as f64)
        })
        .collect()
}

fn render_sparklines(f: &mut Frame, area: Rect, spec: &ChartSpec, palette: &Palette) {
    let n = spec.series.len() as u32;
    let rows = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints((0..n).map(|_| Constraint::Ratio(1, n)).collect::<Vec<_>>())
        .split(area);

    for (s, row) in spec.series.iter().zip(rows.iter()) {
        let [lo, hi] = bounds(&s.values);
        let title = format!(
            "{}  [{} .. {}]",
            s.name,
            format_value(lo),
            format_value(hi)
        );
        let block = Block::default().title(Span::styled(
            title,
            Style::default().fg(palette.chart_text),
        ));
        let data = spark_values(&s.values, row.width as usize);
        let spark = Sparkline::default()
            .block(block)
            .data(&data)
            .max(100)
            .style(Style::default().fg(hex_color(s.color)));
        f.render_widget(spark, *row);
    }
}

fn bounds(values: &[f64]) -> [f64; 2] {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let lo = finite.clone().fold(f64::INFINITY, f64::min);
    let hi = finite.fold(f64::NEG_INFINITY, f64::max);
    if lo.is_finite() {
        [lo, hi]
    } else {
        [0.0, 0.0]
    }
}
