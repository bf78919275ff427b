//! Drawing the panel into a ratatui buffer.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use shellbay_vt::{CellColor, CellFlags, GridCell, PlainText, ScreenView};

use crate::geometry::{HORIZONTAL_CHROME, VERTICAL_CHROME};
use crate::layout::TabStyle;
use crate::panel::ShellPanel;
use crate::session::{PanelProps, SessionOutput, SessionStatus, SessionView};

const PICKER_HELP: &str = "↑/↓ navigate · Enter select · Esc cancel";

pub(crate) fn draw(panel: &ShellPanel, props: &PanelProps<'_>, area: Rect, buf: &mut Buffer) {
    let border = if props.focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::bordered()
        .border_style(Style::default().fg(border))
        .title(" Background Shells ");
    let inner = block.inner(area);
    block.render(area, buf);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let header = Rect { height: 1, ..inner };
    draw_header(panel, props, header, buf);

    // Side padding matches the chrome subtracted from the pty size.
    let side = (HORIZONTAL_CHROME - 2) / 2;
    let body = Rect::new(
        inner.x + side.min(inner.width),
        inner.y + 1,
        inner.width.saturating_sub(side * 2),
        inner.height.saturating_sub(VERTICAL_CHROME - 2),
    );
    if body.width == 0 || body.height == 0 {
        return;
    }

    if props.sessions.is_empty() {
        dim_line("No background shells.", body, buf);
    } else if props.picker_open {
        draw_picker(panel.selected_index(), props, body, buf);
    } else {
        match props.active_session() {
            Some(session) => draw_output(session, props.focused, body, buf),
            None => dim_line(
                &format!(
                    "No active shell selected. Press {} to choose one.",
                    panel.bindings().picker
                ),
                body,
                buf,
            ),
        }
    }
}

fn tab_style(style: TabStyle) -> Style {
    let mut out = Style::default();
    if style.exited {
        out = out.fg(Color::DarkGray);
    }
    if style.active {
        out = out.add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }
    out
}

fn draw_header(panel: &ShellPanel, props: &PanelProps<'_>, area: Rect, buf: &mut Buffer) {
    let strip = panel.tabs(props);
    let mut left: Vec<Span<'_>> = strip
        .tabs
        .into_iter()
        .map(|tab| Span::styled(tab.text, tab_style(tab.style)))
        .collect();
    if let Some(marker) = strip.overflow {
        left.push(Span::styled(marker, Style::default().fg(Color::Yellow)));
    }
    let left = Line::from(left);
    let used = u16::try_from(left.width()).unwrap_or(u16::MAX).min(area.width);
    left.render(area, buf);

    let mut right = vec![Span::styled(
        panel.hint().to_string(),
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(session) = props.active_session() {
        right.push(Span::raw(format!(" (PID: {})", session.id)));
    }
    if props.focused {
        right.push(Span::styled(" (Focused)", Style::default().fg(Color::Cyan)));
    }
    // Right side only gets what the tabs left over.
    let rest = Rect {
        x: area.x + used,
        width: area.width - used,
        ..area
    };
    Line::from(right).right_aligned().render(rest, buf);
}

fn dim_line(text: &str, area: Rect, buf: &mut Buffer) {
    Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .render(area, buf);
}

fn status_span(status: SessionStatus) -> Span<'static> {
    match status {
        SessionStatus::Running => Span::styled("Running", Style::default().fg(Color::Green)),
        SessionStatus::Exited { code } => Span::styled(
            format!("Exited ({code})"),
            Style::default().fg(Color::DarkGray),
        ),
    }
}

fn picker_row(position: usize, session: &SessionView<'_>, highlighted: bool) -> Line<'static> {
    let marker = if highlighted { "> " } else { "  " };
    let mut spans = vec![
        Span::raw(format!(
            "{marker}{position}: {} (PID: {}) ",
            session.command, session.id
        )),
        status_span(session.status),
    ];
    if let SessionOutput::Grid(screen) = session.output {
        if let Some(title) = screen.title().filter(|t| !t.is_empty()) {
            spans.push(Span::styled(
                format!("  {title}"),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }
    let line = Line::from(spans);
    if highlighted {
        line.style(Style::default().add_modifier(Modifier::REVERSED))
    } else {
        line
    }
}

/// First visible row so that `index` stays on screen.
fn scroll_offset(index: usize, visible: usize) -> usize {
    if visible == 0 {
        0
    } else {
        (index + 1).saturating_sub(visible)
    }
}

fn draw_picker(index: usize, props: &PanelProps<'_>, area: Rect, buf: &mut Buffer) {
    let index = index.min(props.sessions.len().saturating_sub(1));
    let visible = usize::from(area.height.saturating_sub(1));
    let offset = scroll_offset(index, visible);

    let mut lines: Vec<Line<'_>> = props
        .sessions
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, session)| picker_row(i + 1, session, i == index))
        .collect();
    while lines.len() < visible {
        lines.push(Line::default());
    }
    lines.push(Line::styled(PICKER_HELP, Style::default().fg(Color::DarkGray)));
    Paragraph::new(lines).render(area, buf);
}

fn draw_output(session: &SessionView<'_>, focused: bool, area: Rect, buf: &mut Buffer) {
    match session.output {
        SessionOutput::Grid(screen) => draw_grid(screen, focused, area, buf),
        SessionOutput::Text(text) => draw_text(text, area, buf),
    }
}

fn draw_text(text: &PlainText, area: Rect, buf: &mut Buffer) {
    let lines: Vec<Line<'_>> = text
        .tail(usize::from(area.height))
        .into_iter()
        .map(Line::raw)
        .collect();
    Paragraph::new(lines).render(area, buf);
}

fn convert_color(color: CellColor) -> Color {
    match color {
        CellColor::Default => Color::Reset,
        CellColor::Indexed(i) => Color::Indexed(i),
        CellColor::Rgb(r, g, b) => Color::Rgb(r, g, b),
    }
}

const MODIFIER_MAP: &[(CellFlags, Modifier)] = &[
    (CellFlags::BOLD, Modifier::BOLD),
    (CellFlags::ITALIC, Modifier::ITALIC),
    (CellFlags::UNDERLINE, Modifier::UNDERLINED),
    (CellFlags::STRIKETHROUGH, Modifier::CROSSED_OUT),
    (CellFlags::INVERSE, Modifier::REVERSED),
    (CellFlags::DIM, Modifier::DIM),
];

fn cell_style(cell: &GridCell) -> Style {
    let modifiers = MODIFIER_MAP
        .iter()
        .filter(|(flag, _)| cell.flags.contains(*flag))
        .fold(Modifier::empty(), |acc, (_, m)| acc | *m);
    Style::default()
        .fg(convert_color(cell.fg))
        .bg(convert_color(cell.bg))
        .add_modifier(modifiers)
}

fn draw_grid(screen: ScreenView<'_>, focused: bool, area: Rect, buf: &mut Buffer) {
    let rows = screen.rows().min(area.height);
    let cols = screen.cols().min(area.width);
    for row in 0..rows {
        for col in 0..cols {
            let cell = screen.cell(row, col);
            let Some(target) = buf.cell_mut((area.x + col, area.y + row)) else {
                continue;
            };
            if cell.width == 0 {
                // Trailing half of a wide character.
                target.reset();
                continue;
            }
            let ch = if cell.flags.contains(CellFlags::HIDDEN) {
                ' '
            } else {
                cell.ch
            };
            target.set_char(ch).set_style(cell_style(&cell));
        }
    }

    let cursor = screen.cursor();
    if focused && cursor.visible && cursor.row < rows && cursor.col < cols {
        if let Some(target) = buf.cell_mut((area.x + cursor.col, area.y + cursor.row)) {
            target.modifier.toggle(Modifier::REVERSED);
        }
    }
}
