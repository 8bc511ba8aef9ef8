//! Debugger application state and logic.

use crate::asm::disasm::disassemble_byte;
use crate::{Engine, Geometry, ProgramImage};
use std::collections::HashSet;

/// Debugger application state.
pub struct DebuggerApp {
    /// The engine being debugged.
    pub engine: Engine,
    /// Breakpoints (by program address).
    pub breakpoints: HashSet<usize>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Tape view scroll offset.
    pub tape_scroll: usize,
    /// Every byte pulsed on the output port so far.
    pub output: Vec<u8>,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(geometry: Geometry, image: &ProgramImage) -> Self {
        Self {
            engine: Engine::new(geometry, image),
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            tape_scroll: 0,
            output: Vec::new(),
        }
    }

    /// Step one tick.
    pub fn step(&mut self) {
        let report = self.engine.tick();
        let skip = if report.skipped { " (skip)" } else { "" };
        self.status = format!(
            "Tick {}: PC={:04} {}{}",
            report.tick,
            report.pc,
            disassemble_byte(report.byte).trim_start(),
            skip
        );
        if let Some(byte) = report.output {
            self.output.push(byte);
        }
    }

    /// Start continuous execution.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
        // move off a breakpoint we are already sitting on
        self.step();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        let pc = self.engine.state().pc;
        if self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at PC={}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at the current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.engine.state().pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={}", pc);
        }
    }

    /// Reset the engine to its power-on state.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.output.clear();
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Keep the tape view scrolled so `ptr` is visible in `rows` rows.
    pub fn follow_pointer(&mut self, rows: usize) {
        let ptr = self.engine.state().ptr;
        if ptr < self.tape_scroll {
            self.tape_scroll = ptr;
        } else if rows > 0 && ptr >= self.tape_scroll + rows {
            self.tape_scroll = ptr + 1 - rows;
        }
    }

    /// Get disassembly around the current PC.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(usize, String, bool)> {
        let program = self.engine.program();
        let pc = self.engine.state().pc;
        let start = pc
            .saturating_sub(lines / 2)
            .min(program.len().saturating_sub(lines));

        (start..program.len())
            .take(lines)
            .map(|addr| {
                let text = disassemble_byte(program.read(addr));
                (addr, text, addr == pc)
            })
            .collect()
    }
}

/// Run the debugger with a program.
pub fn run_debugger(geometry: Geometry, image: &ProgramImage) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(geometry, image);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &mut app);
        })?;

        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => {
                            app.tape_scroll = app.tape_scroll.saturating_sub(1);
                        }
                        KeyCode::Down => {
                            if app.tape_scroll + 1 < app.engine.tape().len() {
                                app.tape_scroll += 1;
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
