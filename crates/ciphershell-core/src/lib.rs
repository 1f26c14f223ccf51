pub mod commands;
pub mod completion;
pub mod config;
pub mod editor;
pub mod gateway;
pub mod history;
pub mod keys;
pub mod session;
pub mod terminal;
pub mod theme;
pub mod transcript;

pub use config::CipherConfig;
pub use gateway::{spawn_call, CallTicket, Completion, CryptoGateway, GatewayError, HttpGateway};
pub use terminal::{InputEvent, TerminalSession};
pub use theme::{Theme, ThemeState};
pub use transcript::{Block, Effect};
