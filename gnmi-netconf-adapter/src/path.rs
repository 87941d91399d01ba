//! gNMI path handling: prefix composition, subtree filters and node
//! extraction.

use std::fmt;
use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

use crate::error::{AdapterError, Result};
use crate::gnmi::{Path, PathElem};

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .elem
            .iter()
            .map(|elem| {
                if elem.key.is_empty() {
                    elem.name.clone()
                } else {
                    let keys: Vec<String> = sorted_keys(elem)
                        .into_iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect();
                    format!("{}[{}]", elem.name, keys.join(","))
                }
            })
            .collect::<Vec<_>>()
            .join("/");
        write!(f, "{path}")
    }
}

/// Compose the effective path from an optional request prefix and a path.
///
/// The origin is taken from the path; the prefix contributes only elements.
pub fn full_path(prefix: Option<&Path>, path: &Path) -> Path {
    let mut elem = prefix.map(|p| p.elem.clone()).unwrap_or_default();
    elem.extend(path.elem.iter().cloned());
    Path {
        origin: path.origin.clone(),
        elem,
        target: String::new(),
    }
}

/// Key pairs of a path element, sorted by key name for deterministic XML.
pub(crate) fn sorted_keys(elem: &PathElem) -> Vec<(&str, &str)> {
    let mut keys: Vec<(&str, &str)> = elem
        .key
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    keys.sort();
    keys
}

/// Convert a path to a NETCONF subtree filter document.
///
/// The XML nesting mirrors the path; each list step's keys are emitted as
/// child elements before any further nesting. An empty path yields `None`,
/// meaning the whole tree.
pub fn to_subtree_filter(path: &Path) -> Result<Option<String>> {
    if path.elem.is_empty() {
        return Ok(None);
    }
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    for elem in &path.elem {
        writer.write_event(Event::Start(BytesStart::new(elem.name.as_str())))?;
        write_keys(&mut writer, elem)?;
    }
    for elem in path.elem.iter().rev() {
        writer.write_event(Event::End(BytesEnd::new(elem.name.as_str())))?;
    }
    let xml = String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| AdapterError::Internal(format!("filter is not valid UTF-8: {e}")))?;
    Ok(Some(xml))
}

/// Emit `<k>v</k>` children for each key of a path element.
pub(crate) fn write_keys(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    elem: &PathElem,
) -> Result<()> {
    for (k, v) in sorted_keys(elem) {
        writer.write_event(Event::Start(BytesStart::new(k)))?;
        writer.write_event(Event::Text(BytesText::new(v)))?;
        writer.write_event(Event::End(BytesEnd::new(k)))?;
    }
    Ok(())
}

/// Extract the node a path addresses from the decoded intermediate tree.
///
/// Descends by step name; a list-valued node resolves to its first entry,
/// both mid-path and at the terminus. Keys carried by the path are not used
/// for filtering.
pub fn extract_node<'a>(tree: &'a Value, path: &Path) -> Result<&'a Value> {
    let mut node = tree;
    for elem in &path.elem {
        let map = match node {
            Value::Object(map) => Some(map),
            Value::Array(items) => items.first().and_then(Value::as_object),
            _ => None,
        };
        node = map
            .and_then(|m| m.get(&elem.name))
            .ok_or_else(|| not_found(path))?;
    }
    if let Value::Array(items) = node {
        node = items.first().ok_or_else(|| not_found(path))?;
    }
    Ok(node)
}

fn not_found(path: &Path) -> AdapterError {
    AdapterError::NotFound(format!("failed to find path: {path}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::testutil::{path, path_with_keys};

    #[test]
    fn test_full_path_concatenates_prefix() {
        let prefix = path(&["configuration"]);
        let p = path(&["system", "services"]);
        let full = full_path(Some(&prefix), &p);
        assert_eq!(full.to_string(), "configuration/system/services");
    }

    #[test]
    fn test_full_path_without_prefix() {
        let p = path(&["configuration", "version"]);
        assert_eq!(full_path(None, &p).to_string(), "configuration/version");
    }

    #[test]
    fn test_filter_mirrors_path_nesting() {
        let p = path(&["configuration", "system", "services"]);
        let filter = to_subtree_filter(&p).unwrap().unwrap();
        assert_eq!(
            filter,
            "<configuration><system><services></services></system></configuration>"
        );
    }

    #[test]
    fn test_filter_empty_path_is_whole_tree() {
        assert_eq!(to_subtree_filter(&Path::default()).unwrap(), None);
    }

    #[test]
    fn test_filter_keys_precede_nesting_and_are_sorted() {
        let mut keys = HashMap::new();
        keys.insert("unit".to_string(), "0".to_string());
        keys.insert("name".to_string(), "0/3/0".to_string());
        let p = Path {
            elem: vec![
                PathElem {
                    name: "interfaces".to_string(),
                    key: HashMap::new(),
                },
                PathElem {
                    name: "interface".to_string(),
                    key: keys,
                },
                PathElem {
                    name: "mtu".to_string(),
                    key: HashMap::new(),
                },
            ],
            ..Default::default()
        };
        let filter = to_subtree_filter(&p).unwrap().unwrap();
        assert_eq!(
            filter,
            "<interfaces><interface><name>0/3/0</name><unit>0</unit>\
             <mtu></mtu></interface></interfaces>"
        );
    }

    #[test]
    fn test_filter_round_trips_to_the_path_names() {
        use quick_xml::events::Event;
        use quick_xml::Reader;

        let p = path(&["configuration", "system", "services", "ssh"]);
        let filter = to_subtree_filter(&p).unwrap().unwrap();

        // Walking the filter's nesting chain recovers the original path.
        let mut reader = Reader::from_str(&filter);
        let mut names = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => {
                    names.push(String::from_utf8(e.local_name().as_ref().to_vec()).unwrap());
                }
                Event::Eof => break,
                _ => {}
            }
        }
        let recovered: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(recovered, ["configuration", "system", "services", "ssh"]);
    }

    #[test]
    fn test_extract_node_descends_maps() {
        let tree = json!({"configuration": {"version": "ABC"}});
        let p = path(&["configuration", "version"]);
        assert_eq!(extract_node(&tree, &p).unwrap(), &json!("ABC"));
    }

    #[test]
    fn test_extract_node_takes_first_list_entry() {
        let tree = json!({
            "configuration": {
                "interfaces": {
                    "interface": [
                        {"name": "0/3/0", "mtu": 9000},
                        {"name": "0/3/1", "mtu": 1500}
                    ]
                }
            }
        });
        let p = path_with_keys(
            &["configuration", "interfaces", "interface"],
            "interface",
            &[("name", "0/3/0")],
        );
        assert_eq!(
            extract_node(&tree, &p).unwrap(),
            &json!({"name": "0/3/0", "mtu": 9000})
        );

        let p = path(&["configuration", "interfaces", "interface", "mtu"]);
        assert_eq!(extract_node(&tree, &p).unwrap(), &json!(9000));
    }

    #[test]
    fn test_extract_node_absent_is_not_found() {
        let tree = json!({"configuration": {}});
        let p = path(&["configuration", "version"]);
        let err = extract_node(&tree, &p).unwrap_err();
        assert_eq!(err.code(), tonic::Code::NotFound);
    }

    #[test]
    fn test_display_includes_sorted_keys() {
        let p = path_with_keys(
            &["interfaces", "interface", "mtu"],
            "interface",
            &[("name", "ge-0/0/0")],
        );
        assert_eq!(p.to_string(), "interfaces/interface[name=ge-0/0/0]/mtu");
    }
}
