use super::picker::render_picker;
use super::{centered_rect, selected_style, view_block};
use crate::api::{ModelRecord, StreamInfo};
use crate::app_state::App;
use crate::models::compact::{compact, CompactList};
use crate::models::{FormField, ModelDialog, DELETE_CONFIRM, EMPTY_TEXT, LIST_COLUMNS};
use crate::picker;
use crate::theme::Palette;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

fn role_lists(m: &ModelRecord) -> [&[String]; 4] {
    [
        m.past_covariates.as_slice(),
        m.target.as_slice(),
        m.future_covariates.as_slice(),
        m.status.as_slice(),
    ]
}

/// 紧凑列表单元格：条目行（含展开开关）、计数
fn compact_cell(list: &CompactList, palette: &Palette) -> (Text<'static>, u16) {
    if list.is_none() {
        return (
            Text::from(Span::styled(list.line(), Style::default().fg(palette.muted))),
            1,
        );
    }
    let mut lines = vec![Line::from(list.line())];
    if let Some(footer) = &list.footer {
        lines.push(Line::from(Span::styled(
            footer.clone(),
            Style::default().fg(palette.muted),
        )));
    }
    let height = lines.len() as u16;
    (Text::from(lines), height)
}

pub fn render(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let page = &app.models_page;
    let block = view_block(format!("Models ({})", page.models.len()), app, palette);

    if page.loading {
        f.render_widget(
            Paragraph::new(Span::styled("Loading...", Style::default().fg(palette.muted)))
                .block(block),
            area,
        );
    } else if page.models.is_empty() {
        f.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(EMPTY_TEXT, Style::default().fg(palette.muted))),
                Line::from(Span::styled(
                    "[n] Create Model",
                    Style::default().fg(palette.accent),
                )),
            ])
            .block(block),
            area,
        );
    } else {
        let header = Row::new(
            ["Name", "Model Type"]
                .into_iter()
                .chain(LIST_COLUMNS.iter().map(|(h, _)| *h))
                .map(|h| Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))),
        )
        .style(Style::default().fg(palette.fg))
        .bottom_margin(1);

        let rows: Vec<Row> = page
            .models
            .iter()
            .map(|m| {
                let expanded = page.expanded.contains(&m.id);
                let name = Text::from(vec![
                    Line::from(Span::styled(
                        m.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        m.description.clone(),
                        Style::default().fg(palette.muted),
                    )),
                ]);
                let mut height = 2;
                let mut cells = vec![Cell::from(name), Cell::from(m.model_type.clone())];
                for (items, (_, label)) in role_lists(m).iter().zip(LIST_COLUMNS.iter()) {
                    let (text, h) = compact_cell(&compact(items, label, expanded), palette);
                    height = height.max(h);
                    cells.push(Cell::from(text));
                }
                Row::new(cells).height(height).bottom_margin(1)
            })
            .collect();

        let widths = [
            Constraint::Percentage(20),
            Constraint::Percentage(12),
            Constraint::Percentage(17),
            Constraint::Percentage(17),
            Constraint::Percentage(17),
            Constraint::Percentage(17),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .highlight_style(selected_style(palette))
            .highlight_symbol("> ");
        let mut state = TableState::default();
        state.select(Some(page.cursor.min(page.models.len() - 1)));
        f.render_stateful_widget(table, area, &mut state);
    }

    if let Some(dialog) = &page.dialog {
        render_dialog(f, area, dialog, &page.streams, palette);
        if let Some(state) = &dialog.picker {
            let field = dialog.form.focus;
            render_picker(
                f,
                area,
                field.label(),
                &page.streams,
                dialog.form.list(field),
                state,
                palette,
            );
        }
    }
    if page.confirm_delete.is_some() {
        render_message(
            f,
            area,
            "Confirm Delete",
            DELETE_CONFIRM,
            "[y] Delete   [n] Cancel",
            palette.warning,
            palette,
        );
    }
    if let Some(alert) = &page.alert {
        render_message(f, area, "Error", alert, "[Enter] OK", palette.error, palette);
    }
}

fn render_dialog(
    f: &mut Frame,
    area: Rect,
    dialog: &ModelDialog,
    streams: &[StreamInfo],
    palette: &Palette,
) {
    let form = &dialog.form;
    let popup = centered_rect(70, FormField::ALL.len() as u16 * 2 + 4, area);
    f.render_widget(Clear, popup);

    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = field == form.focus;
        let required = if field.is_required() { " *" } else { "" };
        let label_style = if focused {
            selected_style(palette)
        } else {
            Style::default().fg(palette.muted)
        };
        let value = if field.is_stream_list() {
            picker::display_text(streams, form.list(field), "Select streams...")
        } else {
            form.text(field)
        };
        let mut value_style = Style::default().fg(palette.fg);
        if form.is_read_only(field) {
            value_style = value_style.fg(palette.muted);
        }
        let editable = !field.is_stream_list()
            && field != FormField::ModelType
            && !form.is_read_only(field);
        let caret = if focused && editable { "_" } else { "" };
        let hint = match field {
            FormField::ModelType if focused => "  ◀ ▶",
            _ if focused && field.is_stream_list() => "  [Enter] 选择",
            _ => "",
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>18}{}: ", field.label(), required), label_style),
            Span::styled(value, value_style),
            Span::styled(caret, Style::default().fg(palette.warning)),
            Span::styled(hint, Style::default().fg(palette.muted)),
        ]));
        if let Some(err) = form.errors.get(&field) {
            lines.push(Line::from(Span::styled(
                format!("{:>20}{}", "", err),
                Style::default().fg(palette.error),
            )));
        }
    }
    lines.push(Line::from(""));
    let status = if dialog.saving { "Saving..." } else { "" };
    lines.push(Line::from(vec![
        Span::styled(
            format!("[Enter] {}", form.mode.submit_label()),
            Style::default().fg(palette.accent),
        ),
        Span::raw("   [Tab/↑↓] 切换字段   [Esc] Cancel   "),
        Span::styled(status, Style::default().fg(palette.warning)),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(form.mode.title())
        .border_style(Style::default().fg(palette.accent))
        .style(Style::default().fg(palette.fg).bg(palette.bg));
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

/// 确认框与错误提示共用的居中消息框
fn render_message(
    f: &mut Frame,
    area: Rect,
    title: &str,
    message: &str,
    actions: &str,
    color: ratatui::style::Color,
    palette: &Palette,
) {
    let popup = centered_rect(50, 7, area);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(Style::default().fg(color))
        .style(Style::default().fg(palette.fg).bg(palette.bg));
    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            actions.to_string(),
            Style::default().fg(palette.accent),
        )),
    ];
    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        popup,
    );
}
