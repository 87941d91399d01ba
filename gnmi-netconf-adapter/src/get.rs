//! gNMI Get translation.
//!
//! A Get request becomes one NETCONF `get-config` per path: the path is
//! rendered as a subtree filter, the device's XML response is decoded into a
//! schema-aware intermediate tree, and the requested node is extracted and
//! wrapped in a notification.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};
use tracing::debug;

use adapter_netconf::Datastore;
use adapter_yang::{coerce_leaf, NodeKind, SchemaEntry};

use crate::error::{AdapterError, Result};
use crate::gnmi::{
    typed_value, Encoding, GetRequest, GetResponse, ModelData, Notification, Path, TypedValue,
    Update,
};
use crate::path::{extract_node, full_path, to_subtree_filter};
use crate::server::{now_nanos, Adapter, SUPPORTED_ENCODINGS};

impl Adapter {
    /// Handle a gNMI Get request.
    ///
    /// Only the JSON encoding is served, and any client-declared model must
    /// match the advertised model list. An empty path list means the whole
    /// tree. The first failing path aborts the request.
    pub async fn handle_get(&self, request: GetRequest) -> Result<GetResponse> {
        self.check_encoding_and_models(request.encoding, &request.use_models)?;

        let prefix = request.prefix;
        let paths = if request.path.is_empty() {
            vec![Path::default()]
        } else {
            request.path
        };

        let mut notifications = Vec::with_capacity(paths.len());
        for path in paths {
            notifications.push(self.process_path(prefix.as_ref(), path).await?);
        }

        Ok(GetResponse {
            notification: notifications,
            extension: Vec::new(),
        })
    }

    fn check_encoding_and_models(&self, encoding: i32, use_models: &[ModelData]) -> Result<()> {
        let encoding = Encoding::try_from(encoding)
            .map_err(|_| AdapterError::Unimplemented(format!("unsupported encoding: {encoding}")))?;
        if !SUPPORTED_ENCODINGS.contains(&encoding) {
            return Err(AdapterError::Unimplemented(format!(
                "unsupported encoding: {}",
                encoding.as_str_name()
            )));
        }
        for model in use_models {
            if !self.model.supports(model) {
                return Err(AdapterError::Unimplemented(format!(
                    "unsupported model: {} {} {}",
                    model.name, model.organization, model.version
                )));
            }
        }
        Ok(())
    }

    /// Execute a Get for a single path.
    async fn process_path(&self, prefix: Option<&Path>, path: Path) -> Result<Notification> {
        let full = full_path(prefix, &path);
        let entry = self
            .model
            .schema_root()
            .descend(full.elem.iter().map(|e| e.name.as_str()))
            .ok_or_else(|| AdapterError::NotFound(format!("path {full} not found")))?;

        let filter = to_subtree_filter(&full)?;
        debug!(%full, "issuing get-config");
        let result = self
            .session
            .get_config_subtree(filter.as_deref(), Datastore::Running)
            .await
            .map_err(|e| AdapterError::Unknown(format!("failed to get config for {full}: {e}")))?;

        // The device returns the requested node with all its ancestors; the
        // tree is decoded whole and the requested node extracted from it.
        let tree = decode_response(&result, self.model.schema_root());
        let node = extract_node(&tree, &full)?;
        build_notification(entry, node, path, prefix)
    }
}

/// Wrap an extracted node in a notification carrying a single update.
fn build_notification(
    entry: &SchemaEntry,
    node: &Value,
    path: Path,
    prefix: Option<&Path>,
) -> Result<Notification> {
    let val = if entry.is_leaf() {
        scalar_typed_value(node).ok_or_else(|| {
            AdapterError::Internal(format!(
                "leaf node {path} does not contain a scalar type value"
            ))
        })?
    } else if entry.is_dir() {
        let bytes = serde_json::to_vec(node).map_err(|e| {
            AdapterError::Internal(format!("error in marshaling JSON tree to bytes: {e}"))
        })?;
        TypedValue {
            value: Some(typed_value::Value::JsonVal(bytes)),
        }
    } else {
        return Err(AdapterError::Internal(format!(
            "unexpected schema entry kind for {}",
            entry.name
        )));
    };

    Ok(Notification {
        timestamp: now_nanos(),
        prefix: prefix.cloned(),
        update: vec![Update {
            path: Some(path),
            val: Some(val),
            duplicates: 0,
        }],
        delete: Vec::new(),
        atomic: false,
    })
}

fn scalar_typed_value(node: &Value) -> Option<TypedValue> {
    use typed_value::Value as Tv;
    let value = match node {
        Value::String(s) => Tv::StringVal(s.clone()),
        Value::Bool(b) => Tv::BoolVal(*b),
        Value::Number(n) if n.is_u64() => Tv::UintVal(n.as_u64()?),
        Value::Number(n) if n.is_i64() => Tv::IntVal(n.as_i64()?),
        Value::Number(n) => Tv::DoubleVal(n.as_f64()?),
        _ => return None,
    };
    Some(TypedValue { value: Some(value) })
}

/// Decoder stack frame: the schema entry for the open element (absent when
/// the schema does not know it) and the children collected so far.
struct Frame<'a> {
    schema: Option<&'a SchemaEntry>,
    children: Map<String, Value>,
    text: Option<String>,
}

/// Decode a NETCONF XML response into the schema-aware intermediate tree.
///
/// Map keys are element names; values are scalars for leaves, nested maps
/// for containers, and sequences for lists and leaf-lists. Elements the
/// schema does not know are dropped with their whole subtree. Comments,
/// processing instructions and directives are ignored, as is malformed
/// trailing input.
pub(crate) fn decode_response(xml: &str, root: &SchemaEntry) -> Value {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![Frame {
        schema: Some(root),
        children: Map::new(),
        text: None,
    }];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                open_element(&mut stack, &name);
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                open_element(&mut stack, &name);
                close_element(&mut stack);
            }
            Ok(Event::End(_)) => close_element(&mut stack),
            Ok(Event::Text(e)) => {
                if let Ok(text) = e.unescape() {
                    append_text(&mut stack, &text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                append_text(&mut stack, &text);
            }
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }

    // Fold any elements left open by truncated or malformed input.
    while stack.len() > 1 {
        close_element(&mut stack);
    }

    let top = stack
        .into_iter()
        .next()
        .map(|frame| frame.children)
        .unwrap_or_default();
    Value::Object(top)
}

fn open_element<'a>(stack: &mut Vec<Frame<'a>>, name: &str) {
    let schema = stack
        .last()
        .and_then(|frame| frame.schema)
        .and_then(|schema| schema.child(name));
    stack.push(Frame {
        schema,
        children: Map::new(),
        text: None,
    });
}

/// Character data only matters inside leaf and leaf-list elements.
fn append_text(stack: &mut [Frame<'_>], text: &str) {
    if let Some(frame) = stack.last_mut() {
        let is_leafy = frame
            .schema
            .is_some_and(|s| s.is_leaf() || s.is_leaf_list());
        if is_leafy {
            frame.text.get_or_insert_with(String::new).push_str(text);
        }
    }
}

/// Fold the completed element into its parent.
fn close_element(stack: &mut Vec<Frame<'_>>) {
    if stack.len() <= 1 {
        return;
    }
    let Some(frame) = stack.pop() else { return };
    let Some(schema) = frame.schema else {
        // Unknown element: its subtree has been consumed, nothing is kept.
        return;
    };
    let Some(parent) = stack.last_mut() else { return };
    let name = schema.name.clone();

    match schema.kind {
        NodeKind::Container => {
            parent.children.insert(name, Value::Object(frame.children));
        }
        NodeKind::List => {
            let entry = parent
                .children
                .entry(name)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                items.push(Value::Object(frame.children));
            }
        }
        NodeKind::Leaf => {
            if let Some(text) = frame.text {
                parent.children.insert(name, leaf_value(schema, &text));
            }
        }
        NodeKind::LeafList => {
            let entry = parent
                .children
                .entry(name)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let (Value::Array(items), Some(text)) = (entry, frame.text) {
                items.push(leaf_value(schema, &text));
            }
        }
    }
}

fn leaf_value(schema: &SchemaEntry, text: &str) -> Value {
    match &schema.leaf_type {
        Some(leaf_type) => coerce_leaf(text, leaf_type),
        None => Value::from(text.trim()),
    }
}
