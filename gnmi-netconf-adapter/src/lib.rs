//! gNMI server facade for NETCONF-only devices.
//!
//! The adapter exposes the gNMI `Capabilities`, `Get` and `Set` RPCs and
//! translates each request into the equivalent NETCONF operation against a
//! single backing device session. Translation is driven by a compiled YANG
//! schema tree ([`adapter_yang::SchemaEntry`]):
//!
//! - [`set`] - gNMI Set operations to `edit-config` XML documents
//! - [`get`] - subtree filters, schema-aware response decoding, notifications
//! - [`path`] - gNMI path composition, filters and node extraction
//! - [`server`] - the tonic service and server startup
//! - [`model`] - advertised models and the built-in schema subset
//! - [`config`] - JSON5 configuration file and tracing setup

pub mod config;
pub mod error;
pub mod get;
pub mod model;
pub mod path;
pub mod server;
pub mod set;

#[cfg(test)]
pub(crate) mod testutil;

// Include the generated protobuf code
#[allow(clippy::doc_lazy_continuation)]
pub mod gnmi_ext {
    tonic::include_proto!("gnmi_ext");
}

#[allow(clippy::doc_lazy_continuation)]
pub mod gnmi {
    tonic::include_proto!("gnmi");
}

pub use config::AdapterConfig;
pub use error::AdapterError;
pub use model::Model;
pub use server::Adapter;
