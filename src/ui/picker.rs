use super::{centered_rect, selected_style};
use crate::picker::{empty_text, filter_items, footer, PickItem, PickerState};
use crate::theme::Palette;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// 多选弹出框：搜索行、候选列表、已选计数
pub fn render_picker<T: PickItem>(
    f: &mut Frame,
    area: Rect,
    title: &str,
    items: &[T],
    selected: &[String],
    state: &PickerState,
    palette: &Palette,
) {
    let popup = centered_rect(60, 16, area);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} (Enter 选择/取消, Esc 关闭)", title))
        .border_style(Style::default().fg(palette.accent))
        .style(Style::default().fg(palette.fg).bg(palette.bg));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let search = Line::from(vec![
        Span::styled("Search: ", Style::default().fg(palette.muted)),
        Span::raw(state.search.as_str()),
        Span::styled("_", Style::default().fg(palette.warning)),
    ]);
    f.render_widget(Paragraph::new(search), chunks[0]);

    let visible = filter_items(items, &state.search, selected);
    if visible.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                empty_text(&state.search),
                Style::default().fg(palette.muted),
            )),
            chunks[1],
        );
    } else {
        let rows: Vec<ListItem> = visible
            .iter()
            .map(|it| {
                let checked = selected.iter().any(|s| s == it.item_id());
                let mut spans = vec![
                    Span::raw(if checked { "[x] " } else { "[ ] " }),
                    Span::styled(
                        it.item_name().to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ];
                if it.item_name() != it.item_id() {
                    spans.push(Span::styled(
                        format!(" ({})", it.item_id()),
                        Style::default().fg(palette.muted),
                    ));
                }
                if !it.item_description().is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", it.item_description()),
                        Style::default().fg(palette.muted),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        let mut list_state = ListState::default();
        list_state.select(Some(state.cursor.min(visible.len() - 1)));
        let list = List::new(rows).highlight_style(selected_style(palette));
        f.render_stateful_widget(list, chunks[1], &mut list_state);
    }

    f.render_widget(
        Paragraph::new(Span::styled(
            footer(selected.len()),
            Style::default().fg(palette.muted),
        )),
        chunks[2],
    );
}
