use crate::gateway::CallTicket;

/// A unit of output appended to the scrolling transcript.
///
/// The core only decides what to say; colours and layout belong to the
/// renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Echo of a dispatched command line.
    Command(String),
    /// Echo of a value typed into an interactive step (already masked).
    Reply(String),
    /// Question asked by an interactive step.
    Prompt { text: String, sensitive: bool },
    Info(String),
    Success(String),
    Error(String),
    /// Usage hint.
    Usage(String),
    /// A copyable result value (password, ciphertext, plaintext).
    Secret { label: Option<String>, value: String },
    Help,
    ThemeList,
    /// Public key in the clear, private key obfuscated by the renderer.
    KeyPair { public: String, private: String },
}

impl Block {
    pub fn info(text: impl Into<String>) -> Self {
        Block::Info(text.into())
    }

    pub fn success(text: impl Into<String>) -> Self {
        Block::Success(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Block::Error(text.into())
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Block::Prompt {
            text: text.into(),
            sensitive: false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Block::Error(_))
    }
}

/// What the host must do after the terminal handled an event.
#[derive(Debug)]
pub enum Effect {
    Print(Block),
    ClearScreen,
    /// Show the full candidate list for the current command.
    Suggestions(Vec<&'static str>),
    /// Issue a gateway call; feed its completion back through
    /// [`TerminalSession::complete`](crate::terminal::TerminalSession::complete).
    Call(CallTicket),
}
