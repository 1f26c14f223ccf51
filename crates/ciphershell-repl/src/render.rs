use std::io::{Stdout, Write};

use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, execute, queue};
use ciphershell_core::terminal::TerminalSession;

use crate::util::{accent, term_width, visible_width, GHOST_HINT, PROMPT, PROMPT_ARROW};
use crate::{DIM, RESET};

/// Where the input line sits relative to the terminal cursor, so it can be
/// wiped before output is printed above it.
#[derive(Debug, Default)]
pub(crate) struct InputArea {
    drawn: bool,
    cursor_row: u16,
    wrap_lines: u16,
}

/// Prompt shown before the buffer: the shell path when idle, the step tag
/// while an interactive session waits for a value.
pub(crate) fn prompt_prefix(term: &TerminalSession) -> String {
    let label = term.step().map(|s| s.tag()).unwrap_or(PROMPT);
    format!("{label} {PROMPT_ARROW} ")
}

/// The styled input line: prompt, visible buffer, dimmed ghost suffix.
pub(crate) fn input_line(term: &TerminalSession) -> String {
    let theme = term.theme().active();
    let ghost = term
        .ghost_suffix()
        .map(|suffix| format!("{DIM}{suffix}{GHOST_HINT}{RESET}"))
        .unwrap_or_default();
    format!(
        "{}{}{RESET}{}{ghost}",
        accent(theme),
        prompt_prefix(term),
        term.editor().buffer()
    )
}

pub(crate) fn redraw_input(stdout: &mut Stdout, term: &TerminalSession, area: &mut InputArea) {
    let width = term_width() as usize;

    clear_input_area(stdout, area);

    let line = input_line(term);
    write!(stdout, "{line}").ok();

    let total = visible_width(&line);
    let total_rows = if width > 0 { total.saturating_sub(1) / width + 1 } else { 1 };
    area.wrap_lines = (total_rows as u16).saturating_sub(1);

    // ── Position cursor inside the buffer, not after the ghost text ──
    let editor = term.editor();
    let cursor_pos = prompt_prefix(term).chars().count()
        + editor.buffer()[..editor.cursor()].chars().count();
    let cursor_row = if width > 0 && cursor_pos > 0 { (cursor_pos - 1) / width } else { 0 };
    let rows_after_cursor = (area.wrap_lines as usize).saturating_sub(cursor_row);
    if rows_after_cursor > 0 {
        queue!(stdout, cursor::MoveUp(rows_after_cursor as u16)).ok();
    }
    let col = if width > 0 && cursor_pos > 0 { ((cursor_pos - 1) % width) + 1 } else { 0 };
    queue!(stdout, cursor::MoveToColumn(col as u16)).ok();
    stdout.flush().ok();

    area.cursor_row = cursor_row as u16;
    area.drawn = true;
}

/// Wipe the input line (all of its wrapped rows). Afterwards the cursor is
/// at column 0 of the row the prompt started on.
pub(crate) fn clear_input_area(stdout: &mut Stdout, area: &mut InputArea) {
    if !area.drawn {
        return;
    }
    if area.cursor_row > 0 {
        queue!(stdout, cursor::MoveUp(area.cursor_row)).ok();
    }
    queue!(stdout, cursor::MoveToColumn(0), terminal::Clear(ClearType::FromCursorDown)).ok();
    stdout.flush().ok();
    area.drawn = false;
    area.cursor_row = 0;
    area.wrap_lines = 0;
}

/// Print text above the input line, then redraw the input line.
pub(crate) fn print_above_input(
    stdout: &mut Stdout,
    text: &str,
    term: &TerminalSession,
    area: &mut InputArea,
) {
    clear_input_area(stdout, area);
    for line in text.split('\n') {
        write!(stdout, "{line}\r\n").ok();
    }
    stdout.flush().ok();
    redraw_input(stdout, term, area);
}

pub(crate) fn apply_clear_screen(stdout: &mut Stdout, term: &TerminalSession, area: &mut InputArea) {
    execute!(stdout, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0)).ok();
    area.drawn = false;
    redraw_input(stdout, term, area);
}
