//! NETCONF RPC construction and reply parsing.

use std::io::Cursor;

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use crate::error::SessionError;
use crate::Datastore;

/// Base NETCONF namespace, applied to the `<rpc>` envelope.
pub const NETCONF_BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Body of a parsed `<rpc-reply>`.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplyBody {
    /// The reply was `<ok/>`.
    Ok,
    /// The reply carried `<data>`; the string is its inner XML.
    Data(String),
}

/// Build an `<edit-config>` operation body for the given datastore.
pub fn edit_config_request(target: Datastore, config: &str) -> String {
    format!(
        "<edit-config><target><{target}/></target><config>{config}</config></edit-config>",
        target = target.element_name()
    )
}

/// Build a `<get-config>` operation body. A `None` filter requests the whole
/// configuration tree.
pub fn get_config_request(source: Datastore, filter: Option<&str>) -> String {
    let source = source.element_name();
    match filter {
        Some(filter) => format!(
            "<get-config><source><{source}/></source>\
             <filter type=\"subtree\">{filter}</filter></get-config>"
        ),
        None => format!("<get-config><source><{source}/></source></get-config>"),
    }
}

/// Parse an `<rpc-reply>` document into its body.
///
/// `<rpc-error>` becomes [`SessionError::Rpc`] carrying the error-message
/// text; a reply with neither `<ok/>`, `<data>` nor `<rpc-error>` is
/// rejected.
pub fn parse_reply(xml: &str) -> Result<ReplyBody, SessionError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rpc-error" => return Err(parse_rpc_error(&mut reader)),
                b"ok" => return Ok(ReplyBody::Ok),
                b"data" => return Ok(ReplyBody::Data(copy_inner(&mut reader)?)),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"ok" => return Ok(ReplyBody::Ok),
                b"data" => return Ok(ReplyBody::Data(String::new())),
                _ => {}
            },
            Event::Eof => {
                return Err(SessionError::UnexpectedReply(
                    "reply carried neither <ok/> nor <data>".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Collect the `<error-message>` text of an `<rpc-error>` subtree.
fn parse_rpc_error(reader: &mut Reader<&[u8]>) -> SessionError {
    let mut message = None;
    let mut in_message = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"error-message" => {
                in_message = true;
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"error-message" => {
                in_message = false;
            }
            Ok(Event::Text(e)) if in_message => {
                if let Ok(text) = e.unescape() {
                    message = Some(text.trim().to_string());
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"rpc-error" => break,
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    SessionError::Rpc(message.unwrap_or_else(|| "rpc-error".to_string()))
}

/// Copy everything inside the element just opened on `reader` into a string,
/// stopping at its end tag.
fn copy_inner(reader: &mut Reader<&[u8]>) -> Result<String, SessionError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                writer.write_event(Event::End(e))?;
            }
            ev @ (Event::Text(_) | Event::CData(_) | Event::Empty(_)) => {
                writer.write_event(ev)?;
            }
            Event::Eof => {
                return Err(SessionError::UnexpectedReply(
                    "unterminated <data> element".to_string(),
                ));
            }
            _ => {}
        }
    }
    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| SessionError::Frame(format!("invalid UTF-8 in reply: {e}")))
}
