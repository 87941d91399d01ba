//! Shared helpers for the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use adapter_netconf::{Datastore, DeviceSession, SessionError};

use crate::gnmi::{Path, PathElem};
use crate::model::{junos_model_data, junos_schema};
use crate::server::Adapter;
use crate::Model;

/// Build a path from plain element names.
pub(crate) fn path(names: &[&str]) -> Path {
    Path {
        elem: names
            .iter()
            .map(|name| PathElem {
                name: (*name).to_string(),
                key: HashMap::new(),
            })
            .collect(),
        ..Default::default()
    }
}

/// Build a path from element names, attaching keys to the named element.
pub(crate) fn path_with_keys(names: &[&str], keyed: &str, keys: &[(&str, &str)]) -> Path {
    let mut p = path(names);
    for elem in &mut p.elem {
        if elem.name == keyed {
            elem.key = keys
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect();
        }
    }
    p
}

/// A device session that records the XML it is handed and answers with
/// canned responses, standing in for a real NETCONF session.
#[derive(Default)]
pub(crate) struct MockSession {
    edits: Mutex<Vec<String>>,
    filters: Mutex<Vec<Option<String>>>,
    response: Option<String>,
    failure: Option<String>,
}

impl MockSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answer get-config calls with the given XML.
    pub(crate) fn with_response(xml: &str) -> Self {
        Self {
            response: Some(xml.to_string()),
            ..Self::default()
        }
    }

    /// Fail every device operation with the given message.
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// The edit-config payloads received, in order.
    pub(crate) fn edits(&self) -> Vec<String> {
        self.edits.lock().unwrap().clone()
    }

    /// The get-config filters received, in order.
    pub(crate) fn filters(&self) -> Vec<Option<String>> {
        self.filters.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceSession for MockSession {
    async fn edit_config(&self, _target: Datastore, config: &str) -> Result<(), SessionError> {
        self.edits.lock().unwrap().push(config.to_string());
        match &self.failure {
            Some(message) => Err(SessionError::Rpc(message.clone())),
            None => Ok(()),
        }
    }

    async fn get_config_subtree(
        &self,
        filter: Option<&str>,
        _source: Datastore,
    ) -> Result<String, SessionError> {
        self.filters
            .lock()
            .unwrap()
            .push(filter.map(str::to_string));
        match &self.failure {
            Some(message) => Err(SessionError::Rpc(message.clone())),
            None => Ok(self.response.clone().unwrap_or_default()),
        }
    }
}

/// An adapter over the built-in schema and the given mock session.
pub(crate) fn test_adapter(session: Arc<MockSession>) -> Adapter {
    let model = Arc::new(Model::new(junos_model_data(), junos_schema()));
    Adapter::new(model, session)
}
