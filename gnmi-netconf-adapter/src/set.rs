//! gNMI Set translation.
//!
//! Each element of a Set request becomes one NETCONF `edit-config`: the path
//! is linearised into nested XML with an `operation` attribute on the
//! terminal element, and the value (when present) becomes the element body.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{Map, Value};
use tracing::debug;

use adapter_netconf::Datastore;
use adapter_yang::SchemaEntry;

use crate::error::{AdapterError, Result};
use crate::gnmi::update_result::Operation;
use crate::gnmi::{typed_value, Path, SetRequest, SetResponse, TypedValue, UpdateResult};
use crate::path::{full_path, write_keys};
use crate::server::{now_nanos, Adapter};

impl Adapter {
    /// Handle a gNMI Set request.
    ///
    /// The delete, replace and update lists are processed in that order, one
    /// NETCONF edit per element. The first failing element aborts the
    /// request; edits already applied are not rolled back.
    pub async fn handle_set(&self, request: SetRequest) -> Result<SetResponse> {
        let prefix = request.prefix;
        let mut results = Vec::new();

        for path in request.delete {
            let result = self
                .execute_operation(Operation::Delete, prefix.as_ref(), path, None)
                .await?;
            results.push(result);
        }
        for update in request.replace {
            let result = self
                .execute_operation(
                    Operation::Replace,
                    prefix.as_ref(),
                    update.path.unwrap_or_default(),
                    update.val,
                )
                .await?;
            results.push(result);
        }
        for update in request.update {
            let result = self
                .execute_operation(
                    Operation::Update,
                    prefix.as_ref(),
                    update.path.unwrap_or_default(),
                    update.val,
                )
                .await?;
            results.push(result);
        }

        Ok(SetResponse {
            prefix,
            response: results,
            timestamp: now_nanos(),
            extension: Vec::new(),
        })
    }

    /// Execute a single element of a Set request as a NETCONF edit-config.
    async fn execute_operation(
        &self,
        op: Operation,
        prefix: Option<&Path>,
        path: Path,
        val: Option<TypedValue>,
    ) -> Result<UpdateResult> {
        let request = self.to_edit_config(op, prefix, &path, val)?;
        debug!(operation = operation_label(op), %path, "issuing edit-config");

        self.session
            .edit_config(Datastore::Running, &request)
            .await
            .map_err(|e| AdapterError::Unknown(format!("edit failed {e}")))?;

        Ok(UpdateResult {
            path: Some(path),
            op: op as i32,
        })
    }

    /// Build the edit-config document for one operation.
    fn to_edit_config(
        &self,
        op: Operation,
        prefix: Option<&Path>,
        path: &Path,
        val: Option<TypedValue>,
    ) -> Result<String> {
        let full = full_path(prefix, path);
        let entry = self
            .model
            .schema_root()
            .descend(full.elem.iter().map(|e| e.name.as_str()))
            .ok_or_else(|| AdapterError::NotFound(format!("path {full} not found")))?;

        let mut writer = Writer::new(Cursor::new(Vec::new()));
        for (i, elem) in full.elem.iter().enumerate() {
            let mut start = BytesStart::new(elem.name.as_str());
            // The operation attribute goes on the terminal element of the path.
            if i == full.elem.len() - 1 {
                start.push_attribute(("operation", operation_label(op)));
            }
            writer.write_event(Event::Start(start))?;
            write_keys(&mut writer, elem)?;
        }

        if op != Operation::Delete {
            write_value(&mut writer, entry, val)?;
        }

        for elem in full.elem.iter().rev() {
            writer.write_event(Event::End(BytesEnd::new(elem.name.as_str())))?;
        }

        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| AdapterError::Internal(format!("edit-config is not valid UTF-8: {e}")))
    }
}

fn operation_label(op: Operation) -> &'static str {
    match op {
        Operation::Delete => "delete",
        Operation::Replace => "replace",
        Operation::Update => "merge",
        Operation::Invalid => unreachable!("unexpected operation"),
    }
}

/// Write the value body for an update or replace.
///
/// Directory nodes take a JSON object payload serialised as nested elements;
/// leaves take the scalar's string form as character data.
fn write_value(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    entry: &SchemaEntry,
    val: Option<TypedValue>,
) -> Result<()> {
    let val = val.ok_or_else(|| invalid_value("no value supplied"))?;
    if entry.is_dir() {
        let Some(typed_value::Value::JsonVal(bytes)) = val.value else {
            return Err(invalid_value("directory nodes take a JSON payload"));
        };
        let tree: Value = serde_json::from_slice(&bytes)
            .map_err(|e| invalid_value(&e.to_string()))?;
        let Value::Object(map) = tree else {
            return Err(invalid_value("JSON payload must be an object"));
        };
        write_json_object(writer, &map)?;
    } else {
        let text = scalar_text(&val)?;
        writer.write_event(Event::Text(BytesText::new(&text)))?;
    }
    Ok(())
}

fn invalid_value(detail: &str) -> AdapterError {
    AdapterError::Unknown(format!("invalid value: {detail}"))
}

/// Serialise a JSON object as XML elements, keys in lexicographic order.
fn write_json_object(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    map: &Map<String, Value>,
) -> Result<()> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    for key in keys {
        write_json_element(writer, key, &map[key.as_str()])?;
    }
    Ok(())
}

fn write_json_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    tag: &str,
    value: &Value,
) -> Result<()> {
    match value {
        Value::Object(map) => {
            writer.write_event(Event::Start(BytesStart::new(tag)))?;
            write_json_object(writer, map)?;
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        // Arrays become repeated sibling elements under the same tag.
        Value::Array(items) => {
            for item in items {
                write_json_element(writer, tag, item)?;
            }
        }
        scalar => {
            let text = match scalar {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            writer.write_event(Event::Start(BytesStart::new(tag)))?;
            writer.write_event(Event::Text(BytesText::new(&text)))?;
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
    }
    Ok(())
}

/// The string form of a scalar typed value.
fn scalar_text(val: &TypedValue) -> Result<String> {
    use typed_value::Value as Tv;
    match &val.value {
        Some(Tv::StringVal(s)) => Ok(s.clone()),
        Some(Tv::IntVal(v)) => Ok(v.to_string()),
        Some(Tv::UintVal(v)) => Ok(v.to_string()),
        Some(Tv::BoolVal(v)) => Ok(v.to_string()),
        Some(Tv::FloatVal(v)) => Ok(v.to_string()),
        Some(Tv::DoubleVal(v)) => Ok(v.to_string()),
        other => Err(invalid_value(&format!("no scalar form for {other:?}"))),
    }
}
