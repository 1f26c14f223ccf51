use crate::gateway::{CipherOp, GatewayRequest, PasswordMode};
use crate::keys::SessionKeyStore;
use crate::session::Step;
use crate::theme::{find_theme, ThemeState};
use crate::transcript::Block;

// ─── Command Result ─────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Lines(Vec<Block>),
    ClearScreen,
    /// Print these lines, then issue one gateway call.
    Call { lines: Vec<Block>, request: GatewayRequest },
    /// Open an interactive session at this step.
    Interactive(Step),
}

// ─── Parsing ────────────────────────────────────────────────────────────────

/// Split a line into a lower-cased command name and its arguments.
/// Returns `None` for a blank line.
pub fn parse_command_line(line: &str) -> Option<(String, Vec<&str>)> {
    let mut tokens = line.split_whitespace();
    let cmd = tokens.next()?.to_lowercase();
    Some((cmd, tokens.collect()))
}

pub fn password_mode(args: &[&str]) -> PasswordMode {
    if args.iter().any(|a| *a == "-m" || *a == "--memorable") {
        PasswordMode::Memorable
    } else {
        PasswordMode::Random
    }
}

// ─── Dispatcher ─────────────────────────────────────────────────────────────

/// Execute one submitted command line.
pub fn execute(line: &str, keys: &SessionKeyStore, theme: &mut ThemeState) -> CommandResult {
    let Some((cmd, args)) = parse_command_line(line) else {
        return CommandResult::Lines(Vec::new());
    };

    match cmd.as_str() {
        "help" => CommandResult::Lines(vec![Block::Help]),
        "clear" => CommandResult::ClearScreen,
        "theme" => handle_theme_command(args.first().copied(), theme),
        "genpass" => handle_genpass_command(&args),
        "vault" => handle_vault_command(args.first().copied()),
        "identity" => handle_identity_command(args.first().copied(), keys),
        _ => CommandResult::Lines(vec![Block::error(format!("Command not found: {cmd}"))]),
    }
}

pub fn handle_theme_command(arg: Option<&str>, theme: &mut ThemeState) -> CommandResult {
    match arg {
        Some("list") => CommandResult::Lines(vec![Block::ThemeList]),
        Some(id) => match find_theme(id) {
            Some(found) => {
                theme.apply(found);
                CommandResult::Call {
                    lines: vec![Block::success(format!("Theme switched to: {}", found.name))],
                    request: GatewayRequest::Background {
                        theme: found.id.to_string(),
                    },
                }
            }
            None => CommandResult::Lines(vec![Block::error(format!(
                "Theme '{id}' not found. Type 'theme list'."
            ))]),
        },
        None => CommandResult::Lines(vec![Block::Usage(
            "Usage: theme [name] OR theme list".to_string(),
        )]),
    }
}

pub fn handle_genpass_command(args: &[&str]) -> CommandResult {
    let mode = password_mode(args);
    CommandResult::Call {
        lines: vec![Block::info(format!("Generating {} password...", mode.as_str()))],
        request: GatewayRequest::GeneratePassword { mode },
    }
}

pub fn handle_vault_command(arg: Option<&str>) -> CommandResult {
    match arg {
        Some("encrypt") => CommandResult::Interactive(Step::VaultMessage { op: CipherOp::Encrypt }),
        Some("decrypt") => CommandResult::Interactive(Step::VaultMessage { op: CipherOp::Decrypt }),
        _ => CommandResult::Lines(vec![Block::error("Usage: vault [encrypt | decrypt]")]),
    }
}

pub fn handle_identity_command(arg: Option<&str>, keys: &SessionKeyStore) -> CommandResult {
    match arg {
        Some("gen") => CommandResult::Call {
            lines: vec![Block::info("Generating 2048-bit RSA keypair...")],
            request: GatewayRequest::GenerateKeys,
        },
        Some("show") => match keys.current() {
            Some(pair) => CommandResult::Lines(vec![Block::KeyPair {
                public: pair.public.clone(),
                private: pair.private.clone(),
            }]),
            None => CommandResult::Lines(vec![Block::error("No keys in session.")]),
        },
        Some("encrypt") => CommandResult::Interactive(Step::IdentityMessage),
        Some("decrypt") => {
            if keys.private().is_some() {
                CommandResult::Interactive(Step::IdentityCiphertext)
            } else {
                CommandResult::Lines(vec![Block::error("No Private Key loaded.")])
            }
        }
        _ => CommandResult::Lines(vec![Block::Usage(
            "Usage: identity [gen | show | encrypt | decrypt]".to_string(),
        )]),
    }
}
