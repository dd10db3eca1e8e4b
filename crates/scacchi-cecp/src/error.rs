//! Protocol-level errors.

/// Errors raised while parsing controller commands. All of them are
/// non-fatal: the loop reports them and keeps reading.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A command that needs an argument arrived without one.
    #[error("missing argument for {command}")]
    MissingArgument { command: &'static str },

    /// An argument did not parse.
    #[error("invalid argument for {command}: {value:?}")]
    InvalidArgument {
        command: &'static str,
        value: String,
    },
}
