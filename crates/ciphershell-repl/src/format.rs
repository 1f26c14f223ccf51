use crate::util::{accent, accent2, clock, PROMPT, PROMPT_ARROW};
use crate::{CONCEAL, DIM, RED, RESET, REVEAL, WHITE_BOLD, YELLOW};
use ciphershell_core::completion::COMMANDS;
use ciphershell_core::theme::{Theme, THEMES};
use ciphershell_core::transcript::Block;

/// Render one transcript block to a (possibly multi-line) string.
pub(crate) fn format_block(block: &Block, theme: &Theme) -> String {
    match block {
        Block::Command(line) => format_command_echo(line, theme, &clock()),
        Block::Reply(value) => format!("{DIM}  › {value}{RESET}"),
        Block::Prompt { text, sensitive } => {
            let lock = if *sensitive { " 🔒" } else { "" };
            format!("{}? {RESET}{WHITE_BOLD}{text}{RESET}{lock}", accent2(theme))
        }
        Block::Info(text) => format!("{DIM}{text}{RESET}"),
        Block::Success(text) => format!("{}✔ {text}{RESET}", accent(theme)),
        Block::Error(text) => format!("{RED}✘ {text}{RESET}"),
        Block::Usage(text) => format!("{YELLOW}{text}{RESET}"),
        Block::Secret { label, value } => format_secret(label.as_deref(), value, theme),
        Block::Help => format_help(theme),
        Block::ThemeList => format_theme_list(theme),
        Block::KeyPair { public, private } => format_key_pair(public, private, theme),
    }
}

pub(crate) fn format_command_echo(line: &str, theme: &Theme, time: &str) -> String {
    format!(
        "{DIM}[{time}]{RESET} {}{PROMPT} {PROMPT_ARROW}{RESET} {line}",
        accent(theme)
    )
}

fn format_secret(label: Option<&str>, value: &str, theme: &Theme) -> String {
    let value = format!("{}{value}{RESET}", accent2(theme));
    match label {
        Some(label) => format!("{DIM}{label}:{RESET}\n{value}"),
        None => value,
    }
}

pub(crate) fn format_help(theme: &Theme) -> String {
    let width = COMMANDS.iter().map(|c| c.usage.chars().count()).max().unwrap_or(0);
    let mut out = format!("{WHITE_BOLD}Commands:{RESET}");
    for command in COMMANDS {
        out.push_str(&format!(
            "\n  {}{:<width$}{RESET}  {DIM}{}{RESET}",
            accent(theme),
            command.usage,
            command.description,
        ));
    }
    out
}

pub(crate) fn format_theme_list(active: &Theme) -> String {
    let mut out = format!("{WHITE_BOLD}Themes:{RESET}");
    for theme in THEMES {
        let marker = if theme.id == active.id { "*" } else { " " };
        out.push_str(&format!(
            "\n {marker} {}██{RESET} {:<12} {DIM}{}{RESET}",
            accent(theme),
            theme.id,
            theme.name,
        ));
    }
    out
}

/// Private key is written with SGR conceal so it stays hidden on screen but
/// survives a copy.
pub(crate) fn format_key_pair(public: &str, private: &str, theme: &Theme) -> String {
    format!(
        "{WHITE_BOLD}Public Key:{RESET}\n{}{public}{RESET}\n\
         {WHITE_BOLD}Private Key:{RESET} {DIM}(hidden, select to copy){RESET}\n\
         {CONCEAL}{private}{REVEAL}{RESET}",
        accent2(theme)
    )
}

/// Lay candidates out in as many columns as fit in `width`.
pub(crate) fn format_suggestions(items: &[&str], width: usize) -> String {
    if items.is_empty() {
        return String::new();
    }
    let cell = items.iter().map(|s| s.chars().count()).max().unwrap_or(0) + 2;
    let columns = (width / cell).max(1);
    items
        .chunks(columns)
        .map(|row| {
            row.iter()
                .map(|item| format!("{item:<cell$}"))
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
