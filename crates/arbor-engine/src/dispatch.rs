//! Request dispatch
//!
//! `Dispatcher::handle` is the single entry point for all operations. Every
//! request runs inside `FailureCapture`, so callers always get an
//! `ApiResponse` back: 200 with the JSON payload, or 500 with an error body.

use std::collections::BTreeMap;

use arbor_core::errors::ArborError;
use arbor_core::model::JournalFilter;
use arbor_core_types::{CancellationToken, RequestId};
use arbor_store::errors::Result;
use arbor_store::{Database, StoreConfig};
use serde::Serialize;
use serde_json::Value;

use crate::capture::{CapturedFailure, FailureCapture};
use crate::dto::{JournalDetail, JournalInfo, JournalPage};
use crate::services::{JournalService, TreeService};

/// Status code of a successful response
pub const SUCCESS_STATUS: u16 = 200;

/// One operation of the public surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    GetJournalRange {
        skip: u64,
        take: u64,
        filter: JournalFilter,
    },
    GetJournalSingle {
        id: i64,
    },
    GetTree {
        tree_name: String,
    },
    CreateNode {
        tree_name: String,
        parent_node_id: Option<i64>,
        node_name: String,
    },
    DeleteNode {
        node_id: i64,
    },
    RenameNode {
        node_id: i64,
        new_node_name: String,
    },
}

impl ApiRequest {
    /// Operation path, as exposed by the API
    pub fn path(&self) -> &'static str {
        match self {
            ApiRequest::GetJournalRange { .. } => "/api.user.journal.getRange",
            ApiRequest::GetJournalSingle { .. } => "/api.user.journal.getSingle",
            ApiRequest::GetTree { .. } => "/api.user.tree.get",
            ApiRequest::CreateNode { .. } => "/api.user.tree.node.create",
            ApiRequest::DeleteNode { .. } => "/api.user.tree.node.delete",
            ApiRequest::RenameNode { .. } => "/api.user.tree.node.rename",
        }
    }

    /// Request metadata as the API would have received it
    ///
    /// Scalar arguments travel as query parameters; the journal filter is
    /// the request body.
    pub fn meta(&self) -> RequestMeta {
        let meta = RequestMeta::new("POST", self.path());
        match self {
            ApiRequest::GetJournalRange { skip, take, filter } => {
                let meta = meta
                    .with_query("skip", skip.to_string())
                    .with_query("take", take.to_string());
                match serde_json::to_string(filter) {
                    Ok(body) => meta.with_body(body),
                    Err(_) => meta,
                }
            }
            ApiRequest::GetJournalSingle { id } => meta.with_query("id", id.to_string()),
            ApiRequest::GetTree { tree_name } => meta.with_query("treeName", tree_name),
            ApiRequest::CreateNode {
                tree_name,
                parent_node_id,
                node_name,
            } => {
                let meta = meta
                    .with_query("treeName", tree_name)
                    .with_query("nodeName", node_name);
                match parent_node_id {
                    Some(id) => meta.with_query("parentNodeId", id.to_string()),
                    None => meta,
                }
            }
            ApiRequest::DeleteNode { node_id } => meta.with_query("nodeId", node_id.to_string()),
            ApiRequest::RenameNode {
                node_id,
                new_node_name,
            } => meta
                .with_query("nodeId", node_id.to_string())
                .with_query("newNodeName", new_node_name),
        }
    }
}

/// What the failure journal records about the inbound request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl RequestMeta {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// `METHOD path`
    pub fn endpoint(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Query parameters as a JSON object
    pub fn query_json(&self) -> String {
        serde_json::to_string(&self.query).unwrap_or_else(|_| "{}".to_string())
    }

    /// Raw body, or `{}` when none was sent
    pub fn body_snapshot(&self) -> String {
        match self.body.as_deref() {
            Some(body) if !body.is_empty() => body.to_string(),
            _ => "{}".to_string(),
        }
    }
}

/// Status plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: SUCCESS_STATUS,
            body,
        }
    }

    pub fn failure(captured: &CapturedFailure) -> Self {
        Self {
            status: captured.status(),
            body: serde_json::to_value(&captured.body).unwrap_or_default(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

/// Routes requests to the services under failure capture
#[derive(Debug, Clone)]
pub struct Dispatcher {
    trees: TreeService,
    journal: JournalService,
    capture: FailureCapture,
}

impl Dispatcher {
    pub fn new(db: Database) -> Self {
        Self {
            trees: TreeService::new(db.clone()),
            journal: JournalService::new(db.clone()),
            capture: FailureCapture::new(db),
        }
    }

    /// Open the database described by `config` and build a dispatcher on it
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(Database::open(config)?))
    }

    /// Run one request and produce its response
    pub fn handle(
        &self,
        request: ApiRequest,
        meta: &RequestMeta,
        cancel: &CancellationToken,
    ) -> ApiResponse {
        let request_id = RequestId::new();
        tracing::debug!(
            request_id = %request_id,
            endpoint = %meta.endpoint(),
            "dispatching request"
        );

        let result = self.capture.run(meta, || {
            self.execute(request, cancel)
                .map_err(|e| e.with_request_id(request_id.clone()))
        });

        match result {
            Ok(body) => ApiResponse::ok(body),
            Err(captured) => ApiResponse::failure(&captured),
        }
    }

    fn execute(&self, request: ApiRequest, cancel: &CancellationToken) -> Result<Value> {
        match request {
            ApiRequest::GetJournalRange { skip, take, filter } => {
                let (entries, count) = self.journal.get_range(cancel, skip, take, &filter)?;
                to_json(&JournalPage {
                    skip,
                    count,
                    items: entries.iter().map(JournalInfo::from).collect(),
                })
            }
            ApiRequest::GetJournalSingle { id } => {
                let entry = self
                    .journal
                    .get_by_id(cancel, id)?
                    .ok_or(ArborError::JournalEntryNotFound { journal_id: id })?;
                to_json(&JournalDetail::from(&entry))
            }
            ApiRequest::GetTree { tree_name } => {
                to_json(&self.trees.get_or_create_tree(cancel, &tree_name)?)
            }
            ApiRequest::CreateNode {
                tree_name,
                parent_node_id,
                node_name,
            } => {
                self.trees
                    .create_node(cancel, &tree_name, parent_node_id, &node_name)?;
                Ok(Value::Null)
            }
            ApiRequest::DeleteNode { node_id } => {
                self.trees.delete_node(cancel, node_id)?;
                Ok(Value::Null)
            }
            ApiRequest::RenameNode {
                node_id,
                new_node_name,
            } => {
                self.trees.rename_node(cancel, node_id, &new_node_name)?;
                Ok(Value::Null)
            }
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ArborError::from(e).into())
}
