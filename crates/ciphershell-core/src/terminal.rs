//! The terminal command engine.
//!
//! [`TerminalSession`] owns every piece of mutable shell state. The host
//! feeds it [`InputEvent`]s and gateway [`Completion`]s and acts on the
//! [`Effect`]s it returns; nothing here touches a real terminal or socket.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::commands::{self, CommandResult};
use crate::completion::{full_list, Completion as InlineCompletion};
use crate::editor::{LineEditor, MASK_CHAR};
use crate::gateway::{CallTicket, Completion, GatewayReply, GatewayRequest};
use crate::history::HistoryStore;
use crate::keys::SessionKeyStore;
use crate::session::{Step, StepOutcome};
use crate::theme::ThemeState;
use crate::transcript::{Block, Effect};

/// Substrings that mark a nominally successful vault result as a failure.
///
/// This matches display text, not a structured error code; the gateway has
/// no better signal for a wrong passphrase.
pub const VAULT_FAILURE_MARKERS: &[&str] = &["Error:", "[ERROR]"];

pub const SYSTEM_HALT: &str = "System halt: the crypto gateway could not be reached.";

/// Surface-independent key input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Paste(String),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    DeleteWordBack,
    KillLine,
    HistoryPrevious,
    HistoryNext,
    Tab,
    Enter,
    /// Esc / Ctrl+C: abandon the current line or interactive session.
    Abort,
    ClearScreen,
}

/// What an in-flight call was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Password,
    Vault,
    Keys,
    Rsa,
    Background { theme: String },
}

impl Pending {
    fn for_request(request: &GatewayRequest) -> Self {
        match request {
            GatewayRequest::GeneratePassword { .. } => Pending::Password,
            GatewayRequest::Vault { .. } => Pending::Vault,
            GatewayRequest::GenerateKeys => Pending::Keys,
            GatewayRequest::Rsa { .. } => Pending::Rsa,
            GatewayRequest::Background { theme } => Pending::Background {
                theme: theme.clone(),
            },
        }
    }
}

pub fn is_embedded_failure(result: &str) -> bool {
    VAULT_FAILURE_MARKERS.iter().any(|m| result.contains(m))
}

#[derive(Debug)]
pub struct TerminalSession {
    editor: LineEditor,
    history: HistoryStore,
    completion: InlineCompletion,
    keys: SessionKeyStore,
    theme: ThemeState,
    step: Option<Step>,
    in_flight: HashMap<u64, Pending>,
    next_call_id: u64,
}

impl Default for TerminalSession {
    fn default() -> Self {
        Self::new(ThemeState::default())
    }
}

impl TerminalSession {
    pub fn new(theme: ThemeState) -> Self {
        Self {
            editor: LineEditor::new(),
            history: HistoryStore::new(),
            completion: InlineCompletion::none(),
            keys: SessionKeyStore::new(),
            theme,
            step: None,
            in_flight: HashMap::new(),
            next_call_id: 1,
        }
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn keys(&self) -> &SessionKeyStore {
        &self.keys
    }

    pub fn theme(&self) -> &ThemeState {
        &self.theme
    }

    pub fn step(&self) -> Option<&Step> {
        self.step.as_ref()
    }

    /// Untyped remainder of the inline completion, if one is offered.
    pub fn ghost_suffix(&self) -> Option<&str> {
        self.completion.suffix()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn handle(&mut self, event: InputEvent) -> Vec<Effect> {
        match event {
            InputEvent::Char(c) => self.editor.insert_char(c),
            InputEvent::Paste(text) => self.editor.insert_text(&text),
            InputEvent::Backspace => self.editor.delete_back(),
            InputEvent::Delete => self.editor.delete_forward(),
            InputEvent::Left => self.editor.move_left(),
            InputEvent::Right => self.editor.move_right(),
            InputEvent::Home => self.editor.move_home(),
            InputEvent::End => self.editor.move_end(),
            InputEvent::DeleteWordBack => self.editor.delete_word_back(),
            InputEvent::KillLine => self.editor.kill_line(),
            InputEvent::HistoryPrevious => {
                if self.step.is_none() {
                    if let Some(line) = self.history.recall_previous() {
                        self.editor.set_buffer(line);
                    }
                    self.completion = InlineCompletion::none();
                }
                return Vec::new();
            }
            InputEvent::HistoryNext => {
                if self.step.is_none() {
                    self.editor.set_buffer(self.history.recall_next());
                    self.completion = InlineCompletion::none();
                }
                return Vec::new();
            }
            InputEvent::Tab => return self.tab(),
            InputEvent::Enter => return self.submit(),
            InputEvent::Abort => return self.abort(),
            InputEvent::ClearScreen => return vec![Effect::ClearScreen],
        }
        self.refresh_completion();
        Vec::new()
    }

    /// Render the outcome of a gateway call issued earlier.
    pub fn complete(&mut self, completion: Completion) -> Vec<Effect> {
        let Completion { id, outcome } = completion;
        let Some(pending) = self.in_flight.remove(&id) else {
            warn!(id, "completion for unknown call ignored");
            return Vec::new();
        };

        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                warn!(id, error = %e, "gateway call failed");
                if let Pending::Background { .. } = pending {
                    return Vec::new();
                }
                return vec![Effect::Print(Block::error(SYSTEM_HALT))];
            }
        };

        let block = match pending {
            Pending::Password => password_block(reply),
            Pending::Vault => vault_block(reply),
            Pending::Rsa => rsa_block(reply),
            Pending::Keys => {
                let GatewayReply { public, private, error, .. } = reply;
                if self.keys.replace(public, private) {
                    debug!(id, "session key pair replaced");
                    Block::success("Keys loaded into session.")
                } else {
                    Block::error(
                        error.unwrap_or_else(|| "Key generation returned an incomplete key pair.".to_string()),
                    )
                }
            }
            Pending::Background { theme } => {
                if let Some(url) = reply.url {
                    if !self.theme.set_background(&theme, url) {
                        debug!(id, theme = %theme, "background for inactive theme dropped");
                    }
                }
                return Vec::new();
            }
        };
        vec![Effect::Print(block)]
    }

    fn refresh_completion(&mut self) {
        self.completion = if self.step.is_some() {
            InlineCompletion::none()
        } else {
            InlineCompletion::for_buffer(self.editor.buffer())
        };
    }

    fn tab(&mut self) -> Vec<Effect> {
        if self.step.is_some() {
            return Vec::new();
        }
        if let Some(suffix) = self.completion.suffix() {
            let accepted = format!("{suffix} ");
            self.editor.move_end();
            self.editor.insert_text(&accepted);
            self.refresh_completion();
            return Vec::new();
        }
        let options = full_list(self.editor.buffer());
        if options.is_empty() {
            Vec::new()
        } else {
            vec![Effect::Suggestions(options)]
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        let raw = self.editor.submit();
        self.completion = InlineCompletion::none();

        match self.step.take() {
            Some(step) => self.advance_session(step, raw),
            None => {
                let line = raw.trim();
                if line.is_empty() {
                    return Vec::new();
                }
                self.history.push(line);
                self.dispatch(line)
            }
        }
    }

    fn dispatch(&mut self, line: &str) -> Vec<Effect> {
        let mut effects = vec![Effect::Print(Block::Command(line.to_string()))];
        match commands::execute(line, &self.keys, &mut self.theme) {
            CommandResult::Lines(blocks) => {
                effects.extend(blocks.into_iter().map(Effect::Print));
            }
            CommandResult::ClearScreen => return vec![Effect::ClearScreen],
            CommandResult::Call { lines, request } => {
                effects.extend(lines.into_iter().map(Effect::Print));
                effects.push(self.issue(request));
            }
            CommandResult::Interactive(step) => {
                effects.push(self.enter_step(step));
            }
        }
        effects
    }

    fn advance_session(&mut self, step: Step, raw: String) -> Vec<Effect> {
        let (value, shown) = if step.is_sensitive() {
            let shown: String = std::iter::repeat(MASK_CHAR).take(raw.chars().count()).collect();
            (raw, shown)
        } else {
            let value = raw.trim().to_string();
            (value.clone(), value)
        };

        let mut effects = vec![Effect::Print(Block::Reply(shown))];
        match step.advance(value, &self.keys) {
            StepOutcome::Next(next) => effects.push(self.enter_step(next)),
            StepOutcome::Fire(request) => {
                self.editor.end_masking();
                effects.push(Effect::Print(Block::info("Processing...")));
                effects.push(self.issue(request));
            }
            StepOutcome::Abort(reason) => {
                self.editor.end_masking();
                effects.push(Effect::Print(Block::error(reason)));
            }
        }
        effects
    }

    fn enter_step(&mut self, step: Step) -> Effect {
        let sensitive = step.is_sensitive();
        if sensitive {
            self.editor.begin_masking();
        } else {
            self.editor.end_masking();
        }
        let prompt = Block::Prompt {
            text: step.question(),
            sensitive,
        };
        self.step = Some(step);
        Effect::Print(prompt)
    }

    fn abort(&mut self) -> Vec<Effect> {
        self.completion = InlineCompletion::none();
        if self.step.take().is_some() {
            self.editor.end_masking();
            return vec![Effect::Print(Block::info("Aborted."))];
        }
        self.editor.kill_line();
        Vec::new()
    }

    fn issue(&mut self, request: GatewayRequest) -> Effect {
        let id = self.next_call_id;
        self.next_call_id += 1;
        self.in_flight.insert(id, Pending::for_request(&request));
        Effect::Call(CallTicket { id, request })
    }
}

fn password_block(reply: GatewayReply) -> Block {
    match reply.password.filter(|p| !p.is_empty()) {
        Some(password) => Block::Secret {
            label: Some("Result".to_string()),
            value: password,
        },
        None => Block::error(reply.error.unwrap_or_else(|| "No password returned.".to_string())),
    }
}

fn vault_block(reply: GatewayReply) -> Block {
    if let Some(error) = reply.error {
        return Block::error(error);
    }
    match reply.result {
        Some(result) if is_embedded_failure(&result) => Block::Error(result),
        Some(result) if !result.is_empty() => Block::Secret {
            label: None,
            value: result,
        },
        _ => Block::error("No result returned."),
    }
}

fn rsa_block(reply: GatewayReply) -> Block {
    if let Some(error) = reply.error {
        return Block::error(error);
    }
    match reply.result {
        Some(result) if !result.is_empty() => Block::Secret {
            label: None,
            value: result,
        },
        _ => Block::error("No result returned."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{CipherOp, GatewayError, PasswordMode};

    fn type_text(term: &mut TerminalSession, text: &str) {
        for c in text.chars() {
            term.handle(InputEvent::Char(c));
        }
    }

    fn submit(term: &mut TerminalSession, text: &str) -> Vec<Effect> {
        type_text(term, text);
        term.handle(InputEvent::Enter)
    }

    fn calls(effects: &[Effect]) -> Vec<&CallTicket> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Call(ticket) => Some(ticket),
                _ => None,
            })
            .collect()
    }

    fn blocks(effects: &[Effect]) -> Vec<&Block> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Print(block) => Some(block),
                _ => None,
            })
            .collect()
    }

    fn reply_ok(id: u64, reply: GatewayReply) -> Completion {
        Completion { id, outcome: Ok(reply) }
    }

    fn load_keys(term: &mut TerminalSession) {
        let effects = submit(term, "identity gen");
        let id = calls(&effects)[0].id;
        term.complete(reply_ok(
            id,
            GatewayReply {
                public: Some("PUB".into()),
                private: Some("PRIV".into()),
                ..Default::default()
            },
        ));
    }

    #[test]
    fn test_history_records_only_dispatched_lines() {
        let mut term = TerminalSession::default();
        submit(&mut term, "help");
        submit(&mut term, "   ");
        submit(&mut term, "vault encrypt");
        submit(&mut term, "hello");
        submit(&mut term, "pw123");
        submit(&mut term, "theme nord");
        assert_eq!(
            term.history().entries(),
            &["help".to_string(), "vault encrypt".to_string(), "theme nord".to_string()]
        );
    }

    #[test]
    fn test_empty_submission_is_discarded() {
        let mut term = TerminalSession::default();
        assert!(submit(&mut term, "   ").is_empty());
        assert!(term.history().is_empty());
    }

    #[test]
    fn test_ghost_text_and_tab_accept() {
        let mut term = TerminalSession::default();
        type_text(&mut term, "the");
        assert_eq!(term.ghost_suffix(), Some("me"));

        assert!(term.handle(InputEvent::Tab).is_empty());
        assert_eq!(term.editor().buffer(), "theme ");
        assert_eq!(term.ghost_suffix(), None);

        type_text(&mut term, "no");
        assert_eq!(term.ghost_suffix(), Some("rd"));
    }

    #[test]
    fn test_tab_accept_appends_even_with_cursor_moved() {
        let mut term = TerminalSession::default();
        type_text(&mut term, "ide");
        term.handle(InputEvent::Home);
        term.handle(InputEvent::Tab);
        assert_eq!(term.editor().buffer(), "identity ");
    }

    #[test]
    fn test_tab_without_ghost_lists_arguments() {
        let mut term = TerminalSession::default();
        type_text(&mut term, "vault ");
        let effects = term.handle(InputEvent::Tab);
        assert!(matches!(
            effects.as_slice(),
            [Effect::Suggestions(list)] if list == &vec!["encrypt", "decrypt"]
        ));
        assert_eq!(term.editor().buffer(), "vault ");
    }

    #[test]
    fn test_history_navigation() {
        let mut term = TerminalSession::default();
        submit(&mut term, "help");
        submit(&mut term, "genpass -m");

        type_text(&mut term, "draft");
        term.handle(InputEvent::HistoryPrevious);
        assert_eq!(term.editor().buffer(), "genpass -m");
        term.handle(InputEvent::HistoryPrevious);
        term.handle(InputEvent::HistoryPrevious);
        assert_eq!(term.editor().buffer(), "help");
        term.handle(InputEvent::HistoryNext);
        term.handle(InputEvent::HistoryNext);
        assert_eq!(term.editor().buffer(), "");
        term.handle(InputEvent::HistoryNext);
        assert_eq!(term.editor().buffer(), "");
    }

    #[test]
    fn test_theme_scenario() {
        let mut term = TerminalSession::default();
        let effects = submit(&mut term, "theme nord");
        assert_eq!(term.theme().active().id, "nord");
        let tickets = calls(&effects);
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].request, GatewayRequest::Background { theme: "nord".into() });

        let out = term.complete(reply_ok(
            tickets[0].id,
            GatewayReply {
                url: Some("https://img/nord.jpg".into()),
                ..Default::default()
            },
        ));
        assert!(out.is_empty());
        assert_eq!(term.theme().background(), Some("https://img/nord.jpg"));
    }

    #[test]
    fn test_stale_background_is_ignored() {
        let mut term = TerminalSession::default();
        let first = calls(&submit(&mut term, "theme nord"))[0].id;
        submit(&mut term, "theme dracula");
        term.complete(reply_ok(
            first,
            GatewayReply {
                url: Some("https://img/nord.jpg".into()),
                ..Default::default()
            },
        ));
        assert_eq!(term.theme().active().id, "dracula");
        assert_eq!(term.theme().background(), None);
    }

    #[test]
    fn test_vault_encrypt_scenario() {
        let mut term = TerminalSession::default();

        let effects = submit(&mut term, "vault encrypt");
        assert_eq!(term.step(), Some(&Step::VaultMessage { op: CipherOp::Encrypt }));
        assert!(calls(&effects).is_empty());

        submit(&mut term, "hello");
        assert!(matches!(term.step(), Some(Step::VaultPassword { .. })));
        assert_eq!(term.editor().buffer(), "");
        assert!(term.editor().is_masked());

        for c in "pw123".chars() {
            term.handle(InputEvent::Char(c));
            let visible = term.editor().buffer();
            assert_eq!(Some(visible.chars().count()), term.editor().masked_len());
            assert!(visible.chars().all(|c| c == MASK_CHAR));
            assert_eq!(term.ghost_suffix(), None);
        }
        let effects = term.handle(InputEvent::Enter);

        assert!(blocks(&effects).contains(&&Block::Reply("*****".into())));
        let tickets = calls(&effects);
        assert_eq!(tickets.len(), 1);
        assert_eq!(
            tickets[0].request,
            GatewayRequest::Vault {
                op: CipherOp::Encrypt,
                text: "hello".into(),
                passphrase: "pw123".into(),
            }
        );
        assert_eq!(term.step(), None);
        assert!(!term.editor().is_masked());

        let effects = submit(&mut term, "help");
        assert_eq!(blocks(&effects), vec![&Block::Command("help".into()), &Block::Help]);
    }

    #[test]
    fn test_session_input_bypasses_dispatcher() {
        let mut term = TerminalSession::default();
        submit(&mut term, "identity encrypt");
        let effects = submit(&mut term, "vault encrypt");
        assert_eq!(term.step(), Some(&Step::IdentityKey { message: "vault encrypt".into() }));
        assert!(!blocks(&effects).iter().any(|b| matches!(b, Block::Command(_))));
    }

    #[test]
    fn test_identity_decrypt_without_key() {
        let mut term = TerminalSession::default();
        let effects = submit(&mut term, "identity decrypt");
        assert!(calls(&effects).is_empty());
        assert!(blocks(&effects).iter().any(|b| b.is_error()));
        assert_eq!(term.step(), None);
    }

    #[test]
    fn test_identity_round_trip_with_generated_keys() {
        let mut term = TerminalSession::default();
        load_keys(&mut term);
        assert_eq!(term.keys().public(), Some("PUB"));

        submit(&mut term, "identity encrypt");
        submit(&mut term, "secret note");
        let effects = submit(&mut term, "my");
        assert_eq!(
            calls(&effects)[0].request,
            GatewayRequest::Rsa {
                op: CipherOp::Encrypt,
                text: "secret note".into(),
                key: "PUB".into(),
            }
        );

        submit(&mut term, "identity decrypt");
        assert_eq!(term.step(), Some(&Step::IdentityCiphertext));
        let effects = submit(&mut term, "c1pher");
        assert_eq!(
            calls(&effects)[0].request,
            GatewayRequest::Rsa {
                op: CipherOp::Decrypt,
                text: "c1pher".into(),
                key: "PRIV".into(),
            }
        );
        assert_eq!(term.step(), None);
    }

    #[test]
    fn test_own_key_without_keys_ends_session() {
        let mut term = TerminalSession::default();
        submit(&mut term, "identity encrypt");
        submit(&mut term, "hi");
        let effects = submit(&mut term, "my");
        assert!(calls(&effects).is_empty());
        assert!(blocks(&effects).iter().any(|b| **b == Block::error("No key found.")));
        assert_eq!(term.step(), None);
    }

    #[test]
    fn test_vault_results() {
        let mut term = TerminalSession::default();
        let vault_call = |term: &mut TerminalSession| {
            submit(term, "vault decrypt");
            submit(term, "gAAAA");
            let effects = submit(term, "pw");
            calls(&effects)[0].id
        };

        let id = vault_call(&mut term);
        let out = term.complete(reply_ok(
            id,
            GatewayReply {
                result: Some("[ERROR] Decryption Failed: Invalid Passphrase or Corrupted Data.".into()),
                ..Default::default()
            },
        ));
        assert!(blocks(&out)[0].is_error());

        let id = vault_call(&mut term);
        let out = term.complete(reply_ok(
            id,
            GatewayReply {
                result: Some("Error: Could not decrypt".into()),
                ..Default::default()
            },
        ));
        assert!(blocks(&out)[0].is_error());

        let id = vault_call(&mut term);
        let out = term.complete(reply_ok(
            id,
            GatewayReply {
                error: Some("Ciphertext and Passphrase required".into()),
                ..Default::default()
            },
        ));
        assert_eq!(blocks(&out), vec![&Block::error("Ciphertext and Passphrase required")]);

        let id = vault_call(&mut term);
        let out = term.complete(reply_ok(
            id,
            GatewayReply {
                result: Some("hello".into()),
                ..Default::default()
            },
        ));
        assert_eq!(
            blocks(&out),
            vec![&Block::Secret { label: None, value: "hello".into() }]
        );
    }

    #[test]
    fn test_empty_passphrase_aborts_without_call() {
        let mut term = TerminalSession::default();
        submit(&mut term, "vault encrypt");
        submit(&mut term, "hello");
        let effects = term.handle(InputEvent::Enter);
        assert!(calls(&effects).is_empty());
        assert_eq!(term.step(), None);
        assert!(!term.editor().is_masked());
    }

    #[test]
    fn test_transport_failure_renders_system_halt() {
        let mut term = TerminalSession::default();
        let id = calls(&submit(&mut term, "genpass"))[0].id;
        let out = term.complete(Completion {
            id,
            outcome: Err(GatewayError::Transport("connection refused".into())),
        });
        assert_eq!(blocks(&out), vec![&Block::error(SYSTEM_HALT)]);
        assert_eq!(term.in_flight(), 0);
    }

    #[test]
    fn test_password_result_and_unknown_ids() {
        let mut term = TerminalSession::default();
        let effects = submit(&mut term, "genpass -r");
        let ticket = calls(&effects)[0].clone();
        assert_eq!(
            ticket.request,
            GatewayRequest::GeneratePassword { mode: PasswordMode::Random }
        );

        let out = term.complete(reply_ok(
            ticket.id,
            GatewayReply {
                password: Some("x9!Qp".into()),
                ..Default::default()
            },
        ));
        assert!(matches!(blocks(&out)[0], Block::Secret { value, .. } if value == "x9!Qp"));

        // a second completion for the same ticket is ignored
        assert!(term.complete(reply_ok(ticket.id, GatewayReply::default())).is_empty());
    }

    #[test]
    fn test_keygen_last_completion_wins() {
        let mut term = TerminalSession::default();
        let first = calls(&submit(&mut term, "identity gen"))[0].id;
        let second = calls(&submit(&mut term, "identity gen"))[0].id;

        term.complete(reply_ok(
            second,
            GatewayReply {
                public: Some("PUB2".into()),
                private: Some("PRIV2".into()),
                ..Default::default()
            },
        ));
        term.complete(reply_ok(
            first,
            GatewayReply {
                public: Some("PUB1".into()),
                private: Some("PRIV1".into()),
                ..Default::default()
            },
        ));
        assert_eq!(term.keys().public(), Some("PUB1"));
        assert_eq!(term.keys().private(), Some("PRIV1"));
    }

    #[test]
    fn test_incomplete_keygen_keeps_old_pair() {
        let mut term = TerminalSession::default();
        load_keys(&mut term);
        let id = calls(&submit(&mut term, "identity gen"))[0].id;
        let out = term.complete(reply_ok(
            id,
            GatewayReply {
                public: Some("PUB2".into()),
                ..Default::default()
            },
        ));
        assert!(blocks(&out)[0].is_error());
        assert_eq!(term.keys().private(), Some("PRIV"));
    }

    #[test]
    fn test_abort_mid_session() {
        let mut term = TerminalSession::default();
        submit(&mut term, "vault encrypt");
        submit(&mut term, "hello");
        type_text(&mut term, "pw");
        let effects = term.handle(InputEvent::Abort);
        assert_eq!(blocks(&effects), vec![&Block::info("Aborted.")]);
        assert_eq!(term.step(), None);
        assert_eq!(term.editor().buffer(), "");
        assert!(!term.editor().is_masked());
    }

    #[test]
    fn test_history_disabled_during_session() {
        let mut term = TerminalSession::default();
        submit(&mut term, "help");
        submit(&mut term, "identity encrypt");
        term.handle(InputEvent::HistoryPrevious);
        assert_eq!(term.editor().buffer(), "");
    }

    #[test]
    fn test_clear_command() {
        let mut term = TerminalSession::default();
        let effects = submit(&mut term, "clear");
        assert!(matches!(effects.as_slice(), [Effect::ClearScreen]));
    }
}
