//! Drawing the TUI: new ticket form, ticket table, status bar, and modals.

use super::app::{App, EditState, InputMode, NewField};
use super::input::with_cursor;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use ticketbox_core::clock::Clock;
use ticketbox_core::feedback::FlashKind;
use ticketbox_core::model::State;
use ticketbox_core::sort::SortKey;
use ticketbox_core::storage::KeyValueStore;
use ticketbox_core::view::{DetailField, Parity, TicketRow, text_height};

const KEY_STYLE: Style = Style::new().fg(Color::Cyan);
const DIM_STYLE: Style = Style::new().fg(Color::DarkGray);
const FOCUS_STYLE: Style = Style::new().fg(Color::Yellow);

/// Render the whole app into `area`.
pub fn draw<S: KeyValueStore, C: Clock>(frame: &mut Frame<'_>, app: &App<S, C>, area: Rect) {
    let form_height = if app.form_hidden() {
        0
    } else {
        // Borders, subject line, text lines.
        block_height(&app.new_form().text.text(), 3)
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form_height),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    if !app.form_hidden() {
        render_new_form(frame, app, chunks[0]);
    }
    render_table(frame, app, chunks[1]);
    frame.render_widget(
        Paragraph::new(build_status_bar(app, chunks[2].width)).alignment(Alignment::Left),
        chunks[2],
    );

    match app.mode() {
        InputMode::Confirm => render_confirm(frame, app, area),
        InputMode::Import => render_import(frame, app, area),
        InputMode::Export => render_export(frame, app, area),
        InputMode::Help => render_help_overlay(frame, app, area),
        InputMode::Normal | InputMode::NewTicket | InputMode::Edit => {}
    }
}

fn render_new_form<S: KeyValueStore, C: Clock>(frame: &mut Frame<'_>, app: &App<S, C>, area: Rect) {
    let form = app.new_form();
    let active = app.mode() == InputMode::NewTicket;
    let subject_focus = active && form.focus == NewField::Subject;
    let text_focus = active && form.focus == NewField::Text;

    let subject = if subject_focus {
        form.subject.display()
    } else {
        form.subject.value.clone()
    };
    let mut lines = vec![Line::from(vec![
        Span::styled("Subject: ", field_style(subject_focus)),
        Span::raw(subject),
    ])];
    for (idx, line) in form.text.display_lines(text_focus).into_iter().enumerate() {
        let label = if idx == 0 { "Text:    " } else { "         " };
        lines.push(Line::from(vec![
            Span::styled(label, field_style(text_focus)),
            Span::raw(line),
        ]));
    }

    let border_style = if active {
        Style::default().fg(Color::Green)
    } else {
        DIM_STYLE
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(border_style)
        .title(" New ticket (n) ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Rows needed for `text` plus `extra` fixed lines, clamped to `u16::MAX`.
fn block_height(text: &str, extra: u16) -> u16 {
    text_height(text).saturating_add(extra)
}

fn field_style(focused: bool) -> Style {
    if focused { FOCUS_STYLE } else { DIM_STYLE }
}

/// Header label for a sortable column, with its key and direction.
fn header_label(title: &str, key: Option<(char, SortKey)>, indicator: Option<bool>) -> String {
    let Some((hotkey, _)) = key else {
        return title.to_string();
    };
    match indicator {
        Some(true) => format!("[{hotkey}] {title} ▲"),
        Some(false) => format!("[{hotkey}] {title} ▼"),
        None => format!("[{hotkey}] {title}"),
    }
}

fn state_color(state: State) -> Color {
    match state {
        State::New => Color::Cyan,
        State::InProgress => Color::Green,
        State::Done | State::Canceled => Color::DarkGray,
    }
}

fn build_row(row: &TicketRow) -> Row<'static> {
    let ticket = &row.ticket;
    let style = match row.parity {
        Parity::Even => Style::default(),
        Parity::Odd => Style::default().bg(Color::Indexed(235)),
    };
    Row::new(vec![
        Cell::from(Span::styled(ticket.uid.clone(), DIM_STYLE)),
        Cell::from(Span::styled(
            if ticket.priority { "!" } else { "" },
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Cell::from(ticket.subject.clone()),
        Cell::from(row.modified_text.clone()),
        Cell::from(Span::styled(
            row.state_label,
            Style::default().fg(state_color(ticket.state)),
        )),
    ])
    .style(style)
}

/// Read-only detail block: the text, then created/modified times.
fn detail_row(row: &TicketRow, max_height: u16) -> Row<'static> {
    let mut lines: Vec<Line<'static>> = if row.ticket.text.is_empty() {
        vec![Line::from(Span::styled("(no text)", DIM_STYLE))]
    } else {
        row.ticket.text.split('\n').map(|l| Line::from(l.to_string())).collect()
    };
    for line in row.tooltip().lines() {
        lines.push(Line::from(Span::styled(line.to_string(), DIM_STYLE)));
    }
    let height = block_height(&row.ticket.text, 2).min(max_height);
    detail_cells(Text::from(lines), height)
}

/// Editable detail block for the ticket being edited.
fn edit_row(edit: &EditState, max_height: u16) -> Row<'static> {
    let focus = edit.form.focus;
    let mut lines = vec![Line::from(vec![
        Span::styled("Subject:  ", field_style(focus == DetailField::Subject)),
        Span::raw(if focus == DetailField::Subject {
            edit.subject.display()
        } else {
            edit.subject.value.clone()
        }),
    ])];
    for (idx, line) in edit
        .text
        .display_lines(focus == DetailField::Text)
        .into_iter()
        .enumerate()
    {
        let label = if idx == 0 { "Text:     " } else { "          " };
        lines.push(Line::from(vec![
            Span::styled(label, field_style(focus == DetailField::Text)),
            Span::raw(line),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("Priority: ", field_style(focus == DetailField::Priority)),
        Span::raw(if edit.form.priority { "[x]" } else { "[ ]" }),
    ]));
    lines.push(Line::from(vec![
        Span::styled("State:    ", field_style(focus == DetailField::State)),
        Span::raw(format!("< {} >", edit.form.state.label())),
    ]));
    let height = edit.form.text_height().saturating_add(3).min(max_height);
    detail_cells(Text::from(lines), height)
}

fn detail_cells(text: Text<'static>, height: u16) -> Row<'static> {
    Row::new(vec![
        Cell::from(""),
        Cell::from(""),
        Cell::from(text),
        Cell::from(""),
        Cell::from(""),
    ])
    .height(height)
}

fn render_table<S: KeyValueStore, C: Clock>(frame: &mut Frame<'_>, app: &App<S, C>, area: Rect) {
    let toggle = app.dispatcher().sort_toggle();
    let column = |title: &str, key: Option<(char, SortKey)>| {
        let indicator = key.and_then(|(_, key)| toggle.indicator(key));
        Cell::from(header_label(title, key, indicator))
    };
    let header = Row::new(vec![
        column("UID", None),
        column("", None),
        column("Subject", Some(('1', SortKey::Subject))),
        column("Modified", Some(('2', SortKey::Modified))),
        column("State", Some(('3', SortKey::State))),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    // Borders and header; taller detail rows are cut off rather than skipped.
    let body_height = area.height.saturating_sub(3).max(1);
    let mut rows: Vec<Row<'static>> = Vec::with_capacity(app.rows().len() * 2);
    let mut selected_table_row = None;
    for (idx, row) in app.rows().iter().enumerate() {
        if idx == app.selected() {
            selected_table_row = Some(rows.len());
        }
        rows.push(build_row(row));
        if app.view().is_expanded(row.uid()) {
            match app.edit_state() {
                Some(edit) if edit.snapshot.uid == row.uid() => rows.push(edit_row(edit, body_height)),
                _ => rows.push(detail_row(row, body_height)),
            }
        }
    }

    let mut title = format!(
        " ticketbox · {} tickets  [sort: {}] ",
        app.rows().len(),
        app.dispatcher().sort_setting().label()
    );
    if let Some(fragment) = app.view().fragment() {
        title.push_str(&format!("#{fragment} "));
    }

    let widths = [
        Constraint::Length(8),
        Constraint::Length(1),
        Constraint::Min(20),
        Constraint::Length(19),
        Constraint::Length(14),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_set(border::ROUNDED)
                .border_style(Style::default().fg(Color::Green))
                .title(title)
                .title_style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(" ");

    let mut state = TableState::default();
    state.select(selected_table_row);
    frame.render_stateful_widget(table, area, &mut state);

    if app.rows().is_empty() {
        let inner = Rect {
            x: area.x + 2,
            y: area.y + 2,
            width: area.width.saturating_sub(4),
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled("No tickets yet. Press n to add one.", DIM_STYLE)),
            inner,
        );
    }
}

fn popup(area: Rect, max_w: u16, max_h: u16) -> Rect {
    let popup_w = area.width.saturating_sub(8).min(max_w);
    let popup_h = area.height.saturating_sub(6).min(max_h);
    let x = area.x + area.width.saturating_sub(popup_w) / 2;
    let y = area.y + area.height.saturating_sub(popup_h) / 2;
    Rect::new(x, y, popup_w, popup_h)
}

fn modal_block(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(color))
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
}

fn render_confirm<S: KeyValueStore, C: Clock>(frame: &mut Frame<'_>, app: &App<S, C>, area: Rect) {
    let Some(pending) = app.pending() else {
        return;
    };
    let rect = popup(area, 60, 6);
    frame.render_widget(Clear, rect);
    let lines = vec![
        Line::from(pending.question.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", KEY_STYLE),
            Span::styled(" yes  ", DIM_STYLE),
            Span::styled("n/Esc", KEY_STYLE),
            Span::styled(" no", DIM_STYLE),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(modal_block(" Confirm ", Color::Red)),
        rect,
    );
}

fn render_import<S: KeyValueStore, C: Clock>(frame: &mut Frame<'_>, app: &App<S, C>, area: Rect) {
    let rect = popup(area, 96, 24);
    frame.render_widget(Clear, rect);
    let block = modal_block(" Import: paste an export document ", Color::Green);
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let area_lines = app.import_area().display_lines(true);
    let (row, _) = app.import_area().cursor();
    let visible = usize::from(inner.height.saturating_sub(1)).max(1);
    let skip = (row + 1).saturating_sub(visible);
    let lines: Vec<Line<'static>> = area_lines
        .into_iter()
        .skip(skip)
        .map(Line::from)
        .collect();
    frame.render_widget(
        Paragraph::new(lines),
        Rect {
            height: inner.height.saturating_sub(1),
            ..inner
        },
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Ctrl+S", KEY_STYLE),
            Span::styled(" import  ", DIM_STYLE),
            Span::styled("Esc", KEY_STYLE),
            Span::styled(" cancel", DIM_STYLE),
        ])),
        Rect {
            y: inner.y + inner.height.saturating_sub(1),
            height: 1,
            ..inner
        },
    );
}

fn render_export<S: KeyValueStore, C: Clock>(frame: &mut Frame<'_>, app: &App<S, C>, area: Rect) {
    let Some(document) = app.export_document() else {
        return;
    };
    let rect = popup(area, 96, 30);
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(document.to_string())
            .scroll((app.export_scroll(), 0))
            .block(modal_block(" Export (j/k scroll, Esc close) ", Color::Green)),
        rect,
    );
}

fn help_hotkeys() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        ("j/k", "list", "move selection"),
        ("g/G", "list", "first/last ticket"),
        ("enter/space", "list", "expand/collapse details"),
        ("e", "list", "edit selected ticket"),
        ("x", "list", "delete selected ticket"),
        ("1", "sort", "sort by subject"),
        ("2", "sort", "sort by modified"),
        ("3", "sort", "sort by state"),
        ("0", "sort", "reset sort"),
        ("n", "form", "focus new ticket form"),
        ("H", "form", "hide/show new ticket form"),
        ("I", "global", "import tickets"),
        ("E", "global", "export tickets"),
        ("C", "global", "clear all tickets"),
        ("?", "global", "open help overlay"),
        ("q", "global", "quit tui"),
        ("Tab", "edit", "next field"),
        ("Shift+Tab", "edit", "previous field"),
        ("space", "edit", "toggle priority / next state"),
        ("Enter", "edit", "save (in subject)"),
        ("Ctrl+S", "edit", "save ticket"),
        ("Esc", "edit", "cancel edit"),
        ("y/n", "confirm", "answer confirmation"),
    ]
}

fn render_help_overlay<S: KeyValueStore, C: Clock>(
    frame: &mut Frame<'_>,
    app: &App<S, C>,
    area: Rect,
) {
    let rect = popup(area, 96, 28);
    frame.render_widget(Clear, rect);
    let block = modal_block(" Hotkeys ", Color::Green);
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let query = app.help_query().to_ascii_lowercase();
    let mut lines: Vec<Line<'static>> = help_hotkeys()
        .into_iter()
        .filter(|(key, ctx, desc)| {
            query.is_empty()
                || key.to_ascii_lowercase().contains(&query)
                || ctx.to_ascii_lowercase().contains(&query)
                || desc.to_ascii_lowercase().contains(&query)
        })
        .map(|(key, ctx, desc)| {
            Line::from(vec![
                Span::styled(format!("{key:12}"), KEY_STYLE),
                Span::styled(format!("{ctx:8}"), KEY_STYLE),
                Span::styled(desc.to_string(), Style::default().fg(Color::White)),
            ])
        })
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No hotkeys match the current filter",
            DIM_STYLE,
        )));
    }

    let query_line = Line::from(vec![
        Span::styled("Filter: ", DIM_STYLE),
        Span::styled(
            with_cursor(app.help_query(), app.help_query().chars().count()),
            Style::default().fg(Color::White),
        ),
    ]);
    frame.render_widget(Paragraph::new(query_line), Rect { height: 1, ..inner });
    frame.render_widget(
        Paragraph::new(lines),
        Rect {
            y: inner.y + 2,
            height: inner.height.saturating_sub(2),
            ..inner
        },
    );
}

/// Flash message if one is showing, otherwise key hints for the mode.
fn build_status_bar<S: KeyValueStore, C: Clock>(app: &App<S, C>, width: u16) -> Line<'static> {
    if let Some(flash) = app.visible_flash() {
        let color = match flash.kind {
            FlashKind::Info => Color::Cyan,
            FlashKind::Error => Color::Red,
        };
        return Line::from(Span::styled(
            flash.message.clone(),
            Style::default().fg(color),
        ));
    }

    let hints: &[(&str, &str)] = match app.mode() {
        InputMode::Normal => &[
            ("j/k", "nav"),
            ("enter", "details"),
            ("e", "edit"),
            ("x", "delete"),
            ("1/2/3", "sort"),
            ("n", "new"),
            ("?", "help"),
            ("q", "quit"),
        ],
        InputMode::NewTicket => &[
            ("TAB", "next field"),
            ("ENTER", "add"),
            ("CTRL+S", "add"),
            ("ESC", "leave form"),
        ],
        InputMode::Edit => &[
            ("TAB", "next field"),
            ("SPACE", "toggle"),
            ("CTRL+S", "save"),
            ("ESC", "cancel"),
        ],
        InputMode::Confirm => &[("Y", "yes"), ("N", "no")],
        InputMode::Import => &[("CTRL+S", "import"), ("ESC", "cancel")],
        InputMode::Export => &[("J/K", "scroll"), ("ESC", "close")],
        InputMode::Help => &[("TYPE", "search keys"), ("ESC", "close help")],
    };

    let mut spans: Vec<Span<'static>> = Vec::new();
    for (key, desc) in hints {
        spans.push(Span::styled((*key).to_string(), KEY_STYLE));
        spans.push(Span::styled(format!(" {desc}  "), DIM_STYLE));
    }

    let version = format!("ticketbox {}", env!("CARGO_PKG_VERSION"));
    let left_len: usize = spans.iter().map(|span| span.content.chars().count()).sum();
    let right_len = version.chars().count();
    if (width as usize) > left_len + right_len + 1 {
        spans.push(Span::raw(" ".repeat(width as usize - left_len - right_len)));
    } else {
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(version, DIM_STYLE));

    Line::from(spans)
}
