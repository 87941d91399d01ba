//! NETCONF device session for the gNMI/NETCONF adapter.
//!
//! The adapter core consumes a device through the [`DeviceSession`] trait,
//! which exposes exactly the two NETCONF operations the translation engine
//! needs. The production implementation is [`SshSession`], a NETCONF-over-SSH
//! client using RFC 6242 chunked framing:
//!
//! - [`codec`] - RFC 6242 message framing over the SSH channel
//! - [`ops`] - `<edit-config>` / `<get-config>` construction and
//!   `<rpc-reply>` parsing
//! - [`session`] - SSH connection, `<hello>` exchange and RPC round-trips

pub mod codec;
pub mod error;
pub mod ops;
pub mod session;

use async_trait::async_trait;

pub use error::SessionError;
pub use session::{connect, SshSession};

/// A NETCONF configuration datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datastore {
    /// The device's active configuration.
    Running,
    Candidate,
    Startup,
}

impl Datastore {
    /// The XML element name naming this datastore in RPCs.
    pub const fn element_name(self) -> &'static str {
        match self {
            Datastore::Running => "running",
            Datastore::Candidate => "candidate",
            Datastore::Startup => "startup",
        }
    }
}

/// The capability interface the adapter consumes.
///
/// Implementations must be safe for concurrent use; callers perform no
/// locking of their own.
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// Apply a configuration fragment to the target datastore.
    async fn edit_config(&self, target: Datastore, config: &str) -> Result<(), SessionError>;

    /// Retrieve configuration from the source datastore. `filter` is a
    /// subtree filter document; `None` retrieves the whole tree. Returns the
    /// content of the reply's `<data>` element.
    async fn get_config_subtree(
        &self,
        filter: Option<&str>,
        source: Datastore,
    ) -> Result<String, SessionError>;
}
