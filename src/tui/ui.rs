//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem, Wrap},
    style::{Color, Style, Modifier},
};
use crate::cpu::{Direction as ScanDirection, Mode};
use super::app::DebuggerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &mut DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ])
        .split(frame.area());

    // Left side: code, registers and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_disassembly(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: tape, output and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_tape(frame, right_chunks[0], app);
    draw_output(frame, right_chunks[1], app);
    draw_help(frame, right_chunks[2]);
}

/// Draw program listing around PC.
fn draw_disassembly(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let disasm = app.get_disassembly((area.height as usize).saturating_sub(2));
    let skipping = app.engine.state().is_skipping();

    let items: Vec<ListItem> = disasm
        .iter()
        .map(|(addr, instr, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(addr) { "●" } else { " " };
            let text = format!("{}{:04}: {}", prefix, addr, instr);

            let style = if *is_current && skipping {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD)
            } else if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(addr) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}", bp, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Program ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw control unit registers.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = app.engine.state();

    let direction = match regs.direction {
        ScanDirection::Forward => "→",
        ScanDirection::Backward => "←",
    };
    let mode_style = match regs.mode {
        Mode::Run => Style::default().fg(Color::Green),
        Mode::Skip => Style::default().fg(Color::Magenta),
    };

    let content = vec![
        Line::from(vec![
            Span::raw("PC: "),
            Span::styled(format!("{:04}", regs.pc), Style::default().fg(Color::Yellow)),
            Span::raw(format!(" {}", direction)),
            Span::raw("   PTR: "),
            Span::styled(format!("{:04}", regs.ptr), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw("Mode: "),
            Span::styled(format!("{:?}", regs.mode), mode_style),
            Span::raw(format!("   Level: {}", regs.skip_level)),
        ]),
        Line::from(vec![
            Span::raw("Out: "),
            Span::styled(format!("{:3}", regs.output_byte), Style::default().fg(Color::White)),
            Span::raw("   Valid: "),
            Span::styled(
                if regs.output_valid { "1" } else { "0" },
                if regs.output_valid {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                },
            ),
        ]),
        Line::from(vec![
            Span::raw("Ticks: "),
            Span::styled(format!("{}", app.engine.ticks()), Style::default().fg(Color::Cyan)),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw tape view, following the pointer.
fn draw_tape(frame: &mut Frame, area: Rect, app: &mut DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    app.follow_pointer(visible_rows);

    let ptr = app.engine.state().ptr;
    let items: Vec<ListItem> = app.engine.tape()
        .dump(app.tape_scroll, visible_rows)
        .into_iter()
        .map(|(addr, value)| {
            let marker = if addr == ptr { "▶" } else { " " };
            let text = format!("{} {:04}: {:3} {:#04x}", marker, addr, value, value);

            let style = if addr == ptr {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if value != 0 {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Tape ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

/// Draw output log.
fn draw_output(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let text = app.output
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ");

    let output = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default()
            .title(format!(" Output ({}) ", app.output.len()))
            .borders(Borders::ALL));

    frame.render_widget(output, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint"),
        Line::from("x: Reset  ↑↓: Scroll tape  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
