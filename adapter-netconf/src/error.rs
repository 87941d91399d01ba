//! Error types for the device session.

use thiserror::Error;

/// Errors raised while talking to the NETCONF device.
#[derive(Debug, Error)]
pub enum SessionError {
    /// I/O failure on the SSH channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SSH transport failure.
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// The device rejected the supplied credentials.
    #[error("authentication rejected by device")]
    AuthenticationFailed,

    /// Malformed RFC 6242 framing.
    #[error("framing error: {0}")]
    Frame(String),

    /// Malformed XML in a device message.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The `<hello>` exchange did not complete.
    #[error("hello exchange failed: {0}")]
    Hello(String),

    /// The device answered an RPC with `<rpc-error>`.
    #[error("device reported an error: {0}")]
    Rpc(String),

    /// The reply carried neither `<ok/>` nor the expected content.
    #[error("unexpected rpc-reply: {0}")]
    UnexpectedReply(String),

    /// The session was closed by the peer.
    #[error("session closed by peer")]
    Closed,
}

impl From<std::str::Utf8Error> for SessionError {
    fn from(err: std::str::Utf8Error) -> Self {
        SessionError::Frame(format!("invalid UTF-8 in frame: {err}"))
    }
}

impl From<std::num::ParseIntError> for SessionError {
    fn from(err: std::num::ParseIntError) -> Self {
        SessionError::Frame(format!("invalid chunk size: {err}"))
    }
}
