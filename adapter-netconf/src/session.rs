//! NETCONF-over-SSH session.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use quick_xml::events::Event;
use quick_xml::Reader;
use tokio::sync::Mutex;
use tokio_util::codec::Framed;
use tracing::{debug, info};

use crate::codec::FrameCodec;
use crate::error::SessionError;
use crate::ops::{self, ReplyBody, NETCONF_BASE_NS};
use crate::{Datastore, DeviceSession};

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";

/// Capability URI for NETCONF 1.1; required for chunked framing.
const BASE_1_1: &str = "urn:ietf:params:netconf:base:1.1";

/// Default NETCONF-over-SSH port, used when the device address names none.
const DEFAULT_PORT: u16 = 830;

/// SSH client handler accepting any server host key.
struct SshHandler;

impl russh::client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

type Channel = russh::ChannelStream<russh::client::Msg>;

struct SessionInner {
    framed: Framed<Channel, FrameCodec>,
    next_message_id: u32,
}

/// An open NETCONF session over SSH.
///
/// RPC round-trips are serialised behind an internal mutex: one request is
/// in flight at a time, so the session is safe to share across concurrent
/// RPC handlers without external locking.
pub struct SshSession {
    inner: Mutex<SessionInner>,
    session_id: u32,
    peer_capabilities: HashSet<String>,
}

/// Open a NETCONF session to `address` (`host` or `host:port`) using
/// password authentication, and complete the `<hello>` exchange.
pub async fn connect(
    address: &str,
    username: &str,
    password: &str,
) -> Result<SshSession, SessionError> {
    let endpoint = if address.contains(':') {
        address.to_string()
    } else {
        format!("{address}:{DEFAULT_PORT}")
    };

    debug!(%endpoint, "connecting to NETCONF device");
    let config = Arc::new(russh::client::Config::default());
    let mut client = russh::client::connect(config, endpoint.as_str(), SshHandler).await?;

    let auth = client.authenticate_password(username, password).await?;
    if !auth.success() {
        return Err(SessionError::AuthenticationFailed);
    }

    let channel = client.channel_open_session().await?;
    channel.request_subsystem(true, "netconf").await?;
    let mut framed = Framed::new(channel.into_stream(), FrameCodec::new());

    // Hello exchange: the server speaks first.
    let server_hello = framed.next().await.ok_or(SessionError::Closed)??;
    let (session_id, peer_capabilities) = parse_hello(&server_hello)?;
    if !peer_capabilities.contains(BASE_1_1) {
        return Err(SessionError::Hello(format!(
            "device does not announce {BASE_1_1}; chunked framing is unsupported"
        )));
    }
    framed.send(client_hello()).await?;

    info!(session_id, %endpoint, "NETCONF session established");
    Ok(SshSession {
        inner: Mutex::new(SessionInner {
            framed,
            next_message_id: 101,
        }),
        session_id,
        peer_capabilities,
    })
}

impl SshSession {
    /// Session ID assigned by the device.
    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    /// Capabilities announced by the device.
    pub fn peer_capabilities(&self) -> &HashSet<String> {
        &self.peer_capabilities
    }

    /// Send one RPC and wait for its reply.
    async fn rpc(&self, operation: &str) -> Result<String, SessionError> {
        let mut inner = self.inner.lock().await;
        let message_id = inner.next_message_id;
        inner.next_message_id += 1;

        let request = format!(
            "{XML_HEADER}<rpc message-id=\"{message_id}\" xmlns=\"{NETCONF_BASE_NS}\">\
             {operation}</rpc>"
        );
        inner.framed.send(request).await?;
        inner.framed.next().await.ok_or(SessionError::Closed)?
    }
}

#[async_trait]
impl DeviceSession for SshSession {
    async fn edit_config(&self, target: Datastore, config: &str) -> Result<(), SessionError> {
        let reply = self.rpc(&ops::edit_config_request(target, config)).await?;
        match ops::parse_reply(&reply)? {
            ReplyBody::Ok | ReplyBody::Data(_) => Ok(()),
        }
    }

    async fn get_config_subtree(
        &self,
        filter: Option<&str>,
        source: Datastore,
    ) -> Result<String, SessionError> {
        let reply = self.rpc(&ops::get_config_request(source, filter)).await?;
        match ops::parse_reply(&reply)? {
            ReplyBody::Data(data) => Ok(data),
            ReplyBody::Ok => Ok(String::new()),
        }
    }
}

/// Build the client `<hello>` message.
fn client_hello() -> String {
    format!(
        "{XML_HEADER}<hello xmlns=\"{NETCONF_BASE_NS}\"><capabilities>\
         <capability>{BASE_1_1}</capability>\
         </capabilities></hello>"
    )
}

/// Extract the session ID and capability set from the server `<hello>`.
fn parse_hello(xml: &str) -> Result<(u32, HashSet<String>), SessionError> {
    let mut reader = Reader::from_str(xml);
    let mut capabilities = HashSet::new();
    let mut session_id = None;
    let mut current: Option<&'static str> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                current = match e.local_name().as_ref() {
                    b"capability" => Some("capability"),
                    b"session-id" => Some("session-id"),
                    _ => None,
                };
            }
            Event::Text(text) => {
                let Ok(text) = text.unescape() else { continue };
                match current {
                    Some("capability") => {
                        capabilities.insert(text.trim().to_string());
                    }
                    Some("session-id") => {
                        session_id = text.trim().parse::<u32>().ok();
                    }
                    _ => {}
                }
            }
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
    }
    let session_id = session_id
        .ok_or_else(|| SessionError::Hello("server hello carries no session-id".to_string()))?;
    Ok((session_id, capabilities))
}
