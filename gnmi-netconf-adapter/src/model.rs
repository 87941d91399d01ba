//! Advertised models and the compiled schema tree.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use adapter_yang::{Range, SchemaEntry, YangType};

use crate::gnmi::ModelData;

/// The model data and schema tree for the device behind the adapter.
///
/// Constructed once at startup and shared read-only across all request
/// handlers.
#[derive(Debug, Clone)]
pub struct Model {
    model_data: Vec<ModelData>,
    schema_root: SchemaEntry,
}

impl Model {
    pub fn new(model_data: Vec<ModelData>, schema_root: SchemaEntry) -> Self {
        Self {
            model_data,
            schema_root,
        }
    }

    /// The models advertised through the Capabilities RPC.
    pub fn model_data(&self) -> &[ModelData] {
        &self.model_data
    }

    /// Root of the compiled schema tree.
    pub fn schema_root(&self) -> &SchemaEntry {
        &self.schema_root
    }

    /// Whether a client-declared model matches one of the advertised models.
    pub fn supports(&self, model: &ModelData) -> bool {
        self.model_data.contains(model)
    }
}

/// Load a schema tree from a JSON document.
pub fn load_schema(path: &Path) -> anyhow::Result<SchemaEntry> {
    let file = File::open(path)?;
    let schema = serde_json::from_reader(BufReader::new(file))?;
    Ok(schema)
}

/// Models advertised for the built-in schema, a subset of Junos 19.3R1.8.
pub fn junos_model_data() -> Vec<ModelData> {
    vec![
        ModelData {
            name: "junos-conf-interfaces".to_string(),
            organization: "Juniper".to_string(),
            version: "2019-01-01".to_string(),
        },
        ModelData {
            name: "junos-conf-system".to_string(),
            organization: "Juniper".to_string(),
            version: "2019-01-01".to_string(),
        },
    ]
}

/// The built-in schema tree, covering the system and interface configuration
/// subset of the Junos models above.
pub fn junos_schema() -> SchemaEntry {
    let max_sessions = YangType::union(vec![
        YangType::int32().with_ranges(vec![Range::new(1, 65535)]),
        YangType::string().with_patterns(vec!["<.*>|$.*".to_string()]),
    ]);

    SchemaEntry::container("device").with_child(
        SchemaEntry::container("configuration")
            .with_child(SchemaEntry::leaf("version", YangType::string()))
            .with_child(SchemaEntry::leaf_list("apply-groups", YangType::string()))
            .with_child(
                SchemaEntry::container("system").with_child(
                    SchemaEntry::container("services").with_child(
                        SchemaEntry::container("ssh")
                            .with_child(SchemaEntry::leaf("max-sessions-per-connection", max_sessions))
                            .with_child(SchemaEntry::leaf("port", YangType::uint32())),
                    ),
                ),
            )
            .with_child(
                SchemaEntry::container("interfaces").with_child(
                    SchemaEntry::list("interface")
                        .with_child(SchemaEntry::leaf("name", YangType::string()))
                        .with_child(SchemaEntry::leaf("description", YangType::string()))
                        .with_child(SchemaEntry::leaf("mtu", YangType::uint32()))
                        .with_child(
                            SchemaEntry::container("otn-options")
                                .with_child(
                                    SchemaEntry::leaf(
                                        "rate",
                                        YangType::enumeration(),
                                    ),
                                )
                                .with_child(SchemaEntry::leaf("laser-enable", YangType::empty())),
                        ),
                ),
            ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_junos_schema_paths_resolve() {
        let root = junos_schema();
        assert!(root
            .descend([
                "configuration",
                "system",
                "services",
                "ssh",
                "max-sessions-per-connection"
            ])
            .is_some());
        assert!(root
            .descend(["configuration", "interfaces", "interface", "otn-options", "rate"])
            .is_some());
        assert!(root.descend(["configuration", "components"]).is_none());
    }

    #[test]
    fn test_supports_exact_model_only() {
        let model = Model::new(junos_model_data(), junos_schema());
        assert!(model.supports(&ModelData {
            name: "junos-conf-system".to_string(),
            organization: "Juniper".to_string(),
            version: "2019-01-01".to_string(),
        }));
        assert!(!model.supports(&ModelData::default()));
        assert!(!model.supports(&ModelData {
            name: "junos-conf-system".to_string(),
            organization: "Juniper".to_string(),
            version: "2020-01-01".to_string(),
        }));
    }
}
