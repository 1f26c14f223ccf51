use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use crossterm::{cursor, execute};
use futures::StreamExt;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use ciphershell_core::config::CipherConfig;
use ciphershell_core::gateway::{spawn_call, Completion, HttpGateway};
use ciphershell_core::terminal::{InputEvent, TerminalSession};
use ciphershell_core::theme::{ThemeState, DEFAULT_THEME};
use ciphershell_core::transcript::Effect;

// ANSI color codes
pub(crate) const RED: &str = "\x1b[31m";
pub(crate) const YELLOW: &str = "\x1b[33m";
pub(crate) const WHITE_BOLD: &str = "\x1b[1;37m";
pub(crate) const DIM: &str = "\x1b[2m";
pub(crate) const CONCEAL: &str = "\x1b[8m";
pub(crate) const REVEAL: &str = "\x1b[28m";
pub(crate) const RESET: &str = "\x1b[0m";

mod format;
mod render;
mod tracing_setup;
mod util;

use clap::Parser;
use format::{format_block, format_suggestions};
use render::{apply_clear_screen, clear_input_area, print_above_input, redraw_input, InputArea};

#[derive(Parser, Debug)]
#[command(name = "ciphershell")]
#[command(about = "Retro terminal front-end for a crypto gateway")]
struct Args {
    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Gateway base URL (overrides CIPHERSHELL_GATEWAY and the config file)
    #[arg(long)]
    gateway: Option<String>,
}

fn resolve_config(args: &Args) -> Result<CipherConfig> {
    let config = CipherConfig::resolve(args.config.as_deref())?
        .with_env_overrides()
        .with_overrides(args.gateway.clone(), None);
    Ok(config)
}

#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    Input(InputEvent),
    Quit,
    Ignore,
}

/// Translate a key press into a shell event. `line_empty` and `in_session`
/// decide whether Ctrl+D / Ctrl+C quit.
fn map_key(code: KeyCode, modifiers: KeyModifiers, line_empty: bool, in_session: bool) -> KeyAction {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let event = match code {
        KeyCode::Char('c') if ctrl => {
            if in_session || !line_empty {
                InputEvent::Abort
            } else {
                return KeyAction::Quit;
            }
        }
        KeyCode::Char('d') if ctrl => {
            if line_empty && !in_session {
                return KeyAction::Quit;
            }
            return KeyAction::Ignore;
        }
        KeyCode::Char('l') if ctrl => InputEvent::ClearScreen,
        KeyCode::Char('w') if ctrl => InputEvent::DeleteWordBack,
        KeyCode::Char('u') if ctrl => InputEvent::KillLine,
        KeyCode::Char('a') if ctrl => InputEvent::Home,
        KeyCode::Char('e') if ctrl => InputEvent::End,
        KeyCode::Char(_) if ctrl || modifiers.contains(KeyModifiers::ALT) => {
            return KeyAction::Ignore;
        }
        KeyCode::Char(c) => InputEvent::Char(c),
        KeyCode::Backspace => InputEvent::Backspace,
        KeyCode::Delete => InputEvent::Delete,
        KeyCode::Left => InputEvent::Left,
        KeyCode::Right => InputEvent::Right,
        KeyCode::Home => InputEvent::Home,
        KeyCode::End => InputEvent::End,
        KeyCode::Up => InputEvent::HistoryPrevious,
        KeyCode::Down => InputEvent::HistoryNext,
        KeyCode::Tab => InputEvent::Tab,
        KeyCode::Enter => InputEvent::Enter,
        KeyCode::Esc => InputEvent::Abort,
        _ => return KeyAction::Ignore,
    };
    KeyAction::Input(event)
}

fn apply_effects(
    stdout: &mut Stdout,
    term: &TerminalSession,
    area: &mut InputArea,
    effects: Vec<Effect>,
    gateway: &Arc<HttpGateway>,
    done_tx: &mpsc::Sender<Completion>,
) {
    if effects.is_empty() {
        redraw_input(stdout, term, area);
        return;
    }
    let theme = term.theme().active();
    for effect in effects {
        match effect {
            Effect::Print(block) => {
                print_above_input(stdout, &format_block(&block, theme), term, area);
            }
            Effect::ClearScreen => apply_clear_screen(stdout, term, area),
            Effect::Suggestions(items) => {
                let grid = format_suggestions(&items, util::term_width() as usize);
                if !grid.is_empty() {
                    print_above_input(stdout, &grid, term, area);
                }
            }
            Effect::Call(ticket) => {
                spawn_call(Arc::clone(gateway), ticket, done_tx.clone());
            }
        }
    }
    redraw_input(stdout, term, area);
}

async fn run_shell(term: &mut TerminalSession, gateway: Arc<HttpGateway>) -> Result<()> {
    let mut stdout = io::stdout();
    let mut area = InputArea::default();
    let mut events = EventStream::new();
    let (done_tx, mut done_rx) = mpsc::channel::<Completion>(32);

    redraw_input(&mut stdout, term, &mut area);

    loop {
        tokio::select! {
            maybe_event = events.next() => {
                let Some(Ok(event)) = maybe_event else {
                    break;
                };

                let input = match event {
                    Event::Paste(text) => InputEvent::Paste(text),
                    Event::Key(KeyEvent { code, modifiers, kind, .. }) => {
                        // Only handle key press events (not release/repeat)
                        if kind != KeyEventKind::Press {
                            continue;
                        }
                        let line_empty = term.editor().buffer().is_empty();
                        match map_key(code, modifiers, line_empty, term.step().is_some()) {
                            KeyAction::Input(input) => input,
                            KeyAction::Quit => {
                                clear_input_area(&mut stdout, &mut area);
                                write!(stdout, "{DIM}Session closed.{RESET}\r\n").ok();
                                stdout.flush().ok();
                                return Ok(());
                            }
                            KeyAction::Ignore => continue,
                        }
                    }
                    Event::Resize(..) => {
                        redraw_input(&mut stdout, term, &mut area);
                        continue;
                    }
                    _ => continue,
                };

                let effects = term.handle(input);
                apply_effects(&mut stdout, term, &mut area, effects, &gateway, &done_tx);
            }
            Some(done) = done_rx.recv() => {
                let effects = term.complete(done);
                apply_effects(&mut stdout, term, &mut area, effects, &gateway, &done_tx);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;
    tracing_setup::init_tracing(config.log_file.as_deref())?;

    if !config.theme_is_known() {
        warn!(theme = %config.theme, "unknown theme in config, using default");
        eprintln!(
            "{YELLOW}Unknown theme '{}', using '{DEFAULT_THEME}'.{RESET}",
            config.theme
        );
    }
    info!(gateway = %config.gateway_url, "starting ciphershell");

    let gateway = Arc::new(HttpGateway::new(config.gateway_url.clone()));
    let mut term = TerminalSession::new(ThemeState::new(&config.theme));

    println!();
    println!("{WHITE_BOLD}CipherShell{RESET} {DIM}gateway {}{RESET}", gateway.base_url());
    println!("{DIM}Type 'help' for commands.{RESET}");
    println!();

    // Install panic hook to restore terminal
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            cursor::Show,
            crossterm::event::DisableBracketedPaste
        );
        default_panic(info);
    }));

    // Enable raw mode + bracketed paste
    terminal::enable_raw_mode()?;
    execute!(io::stdout(), crossterm::event::EnableBracketedPaste)?;

    let result = run_shell(&mut term, gateway).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        io::stdout(),
        cursor::Show,
        crossterm::event::DisableBracketedPaste
    )?;

    info!(in_flight = term.in_flight(), "ciphershell exiting");
    result
}
