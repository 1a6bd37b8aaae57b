//! In-memory management API used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use sbmig_sync::{ApiResponse, Query, Transport, TransportError};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    datasources: Vec<Value>,
    entries: Vec<Value>,
    next_id: u64,
    calls: Vec<String>,
}

/// A fake space that stores datasources and entries in memory.
///
/// Listing endpoints honour `per_page`/`page` and report a `total`. Writes
/// whose payload `name` is in `fail_names` answer with HTTP 500.
#[derive(Default)]
pub struct FakeSpace {
    state: Mutex<State>,
    fail_names: HashSet<String>,
    fail_listing: bool,
    empty_write_responses: bool,
}

fn query_value<'a>(query: &'a Query, key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn page(items: Vec<Value>, query: &Query, key: &str) -> ApiResponse {
    let per_page: usize = query_value(query, "per_page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(25);
    let page: usize = query_value(query, "page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let total = items.len();
    let slice: Vec<Value> = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();
    ApiResponse::new(json!({ key: slice })).with_total(total)
}

fn server_error() -> TransportError {
    TransportError::Status {
        status: 500,
        body: "injected failure".into(),
    }
}

impl FakeSpace {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1000,
                ..State::default()
            }),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.fail_names.insert(name.to_string());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Datasource writes are stored but answered with an empty body.
    pub fn with_empty_write_responses(mut self) -> Self {
        self.empty_write_responses = true;
        self
    }

    pub fn with_datasource(self, id: u64, name: &str, dimensions: Value) -> Self {
        self.state.lock().unwrap().datasources.push(json!({
            "id": id,
            "name": name,
            "slug": name,
            "dimensions": dimensions,
        }));
        self
    }

    pub fn with_entry(self, id: u64, datasource_id: u64, name: &str, value: &str) -> Self {
        self.state.lock().unwrap().entries.push(json!({
            "id": id,
            "name": name,
            "value": value,
            "datasource_id": datasource_id,
        }));
        self
    }

    pub fn datasources(&self) -> Vec<Value> {
        self.state.lock().unwrap().datasources.clone()
    }

    pub fn datasource(&self, name: &str) -> Option<Value> {
        self.datasources().into_iter().find(|d| d["name"] == name)
    }

    pub fn entries_of(&self, datasource_id: u64) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| e["datasource_id"] == datasource_id)
            .cloned()
            .collect()
    }

    /// Every call as `METHOD path`, in arrival order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn should_fail(&self, body: &Value, key: &str) -> bool {
        body[key]["name"]
            .as_str()
            .is_some_and(|name| self.fail_names.contains(name))
    }

    fn id_from(path: &str) -> Option<u64> {
        path.rsplit('/').next().and_then(|s| s.parse().ok())
    }
}

#[async_trait]
impl Transport for FakeSpace {
    async fn get(&self, path: &str, query: &Query) -> Result<ApiResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("GET {path}"));
        if path.ends_with("/datasources/") {
            if self.fail_listing {
                return Err(server_error());
            }
            if state.datasources.is_empty() {
                return Err(TransportError::Status {
                    status: 404,
                    body: String::new(),
                });
            }
            return Ok(page(state.datasources.clone(), query, "datasources"));
        }
        if path.ends_with("/datasource_entries/") {
            let id: u64 = query_value(query, "datasource_id")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default();
            let entries = state
                .entries
                .iter()
                .filter(|e| e["datasource_id"] == id)
                .cloned()
                .collect();
            return Ok(page(entries, query, "datasource_entries"));
        }
        Err(TransportError::Status {
            status: 404,
            body: format!("no route for {path}"),
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("POST {path}"));
        state.next_id += 1;
        let id = state.next_id;
        if path.ends_with("/datasources/") {
            if self.should_fail(body, "datasource") {
                return Err(server_error());
            }
            let mut created = body["datasource"].clone();
            created["id"] = json!(id);
            if let Some(obj) = created.as_object_mut() {
                obj.remove("dimensions_attributes");
            }
            state.datasources.push(created.clone());
            if self.empty_write_responses {
                return Ok(ApiResponse::default());
            }
            return Ok(ApiResponse::new(json!({ "datasource": created })));
        }
        if self.should_fail(body, "datasource_entry") {
            return Err(server_error());
        }
        let mut created = body["datasource_entry"].clone();
        created["id"] = json!(id);
        state.entries.push(created.clone());
        Ok(ApiResponse::new(json!({ "datasource_entry": created })))
    }

    async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("PUT {path}"));
        let id = Self::id_from(path).unwrap_or_default();
        let (key, collection) = if path.contains("/datasources/") {
            ("datasource", &mut state.datasources)
        } else {
            ("datasource_entry", &mut state.entries)
        };
        if body[key]["name"]
            .as_str()
            .is_some_and(|name| self.fail_names.contains(name))
        {
            return Err(server_error());
        }
        let Some(stored) = collection.iter_mut().find(|v| v["id"] == id) else {
            return Err(TransportError::Status {
                status: 404,
                body: String::new(),
            });
        };
        if let (Some(target), Some(update)) = (stored.as_object_mut(), body[key].as_object()) {
            for (k, v) in update {
                if k != "dimensions_attributes" {
                    target.insert(k.clone(), v.clone());
                }
            }
        }
        let updated = stored.clone();
        if self.empty_write_responses && key == "datasource" {
            return Ok(ApiResponse::default());
        }
        Ok(ApiResponse::new(json!({ key: updated })))
    }
}
