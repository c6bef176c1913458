// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

type ResponseKey = (String, String);
type CannedResponse = (u16, String);

/// A mock HTTP service that returns predefined responses based on request
/// method and path. Responses for a key are consumed in order; the last one
/// sticks once the queue is drained.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<ResponseKey, VecDeque<CannedResponse>>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

/// Records the requests a [`MockService`] has served, so tests can assert
/// which writes actually happened.
#[derive(Clone)]
pub struct RequestRecorder {
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl RequestRecorder {
    pub fn saw(&self, method: &str, path: &str) -> bool {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .any(|(m, p)| m == method && p == path)
    }
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn recorder(&self) -> RequestRecorder {
        RequestRecorder {
            requests: self.requests.clone(),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a sequence of responses for GET requests matching the exact path
    pub fn on_get_seq(self, path: &str, responses: Vec<(u16, String)>) -> Self {
        let mut this = self;
        for (status, body) in responses {
            this = this.on("GET", path, status, &body);
        }
        this
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Add a response for DELETE requests matching the exact path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<CannedResponse> {
        let mut responses = self.responses.lock().unwrap();

        let key = (method.to_string(), path.to_string());
        if let Some(queue) = responses.get_mut(&key) {
            if queue.len() > 1 {
                return queue.pop_front();
            }
            if let Some(last) = queue.front() {
                return Some(last.clone());
            }
        }

        // Try prefix match for paths like /api/v1/namespaces/foo
        for ((m, p), queue) in responses.iter_mut() {
            if m == method && path.starts_with(p.as_str()) {
                if queue.len() > 1 {
                    return queue.pop_front();
                }
                return queue.front().cloned();
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));

        let response = self.find_response(&method, &path);

        Box::pin(async move {
            match response {
                Some((status, body)) => Ok(Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Body::from(body.into_bytes()))
                    .unwrap()),
                None => {
                    // Default 404 for unmatched requests
                    let body = r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#;
                    Ok(Response::builder()
                        .status(404)
                        .header("content-type", "application/json")
                        .body(Body::from(body.as_bytes().to_vec()))
                        .unwrap())
                }
            }
        })
    }
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// A namespace stuck in Terminating: deletion timestamp set, no finalizers
pub fn terminating_namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid",
            "deletionTimestamp": "2026-01-01T00:00:00Z"
        },
        "status": { "phase": "Terminating" }
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

pub fn service_account_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ServiceAccount",
        "metadata": {
            "name": name,
            "namespace": "cattle-scc-system",
            "uid": "test-uid"
        }
    })
    .to_string()
}

pub fn service_account_json_with_labels(name: &str, labels: &[(&str, &str)]) -> String {
    let labels: serde_json::Map<String, serde_json::Value> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
        .collect();
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ServiceAccount",
        "metadata": {
            "name": name,
            "namespace": "cattle-scc-system",
            "uid": "test-uid",
            "labels": labels
        }
    })
    .to_string()
}

/// ClusterRoleBinding bound to the given ClusterRole, with the operator
/// ServiceAccount as its only subject
pub fn cluster_role_binding_json(name: &str, role: &str) -> String {
    serde_json::json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "ClusterRoleBinding",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        },
        "roleRef": {
            "apiGroup": "rbac.authorization.k8s.io",
            "kind": "ClusterRole",
            "name": role
        },
        "subjects": [{
            "kind": "ServiceAccount",
            "name": "scc-operator",
            "namespace": "cattle-scc-system"
        }]
    })
    .to_string()
}

/// Deployment carrying the given scc-hash label
pub fn deployment_json(name: &str, hash: &str) -> String {
    serde_json::json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "namespace": "cattle-scc-system",
            "uid": "test-uid",
            "labels": {
                "scc.cattle.io/scc-hash": hash,
                "scc.cattle.io/managed-by": "scc-deployer"
            }
        },
        "spec": {
            "replicas": 1,
            "selector": { "matchLabels": { "app": name } },
            "template": {
                "metadata": { "labels": { "app": name } },
                "spec": { "containers": [] }
            }
        }
    })
    .to_string()
}

/// NodeList with one entry per given cpu capacity
pub fn node_list_json(cpus: &[&str]) -> String {
    let items: Vec<serde_json::Value> = cpus
        .iter()
        .enumerate()
        .map(|(i, cpu)| {
            serde_json::json!({
                "apiVersion": "v1",
                "kind": "Node",
                "metadata": { "name": format!("node-{}", i), "uid": format!("uid-{}", i) },
                "status": { "capacity": { "cpu": cpu } }
            })
        })
        .collect();
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "NodeList",
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

/// ClusterList of provisioning.cattle.io clusters with the given names
pub fn cluster_list_json(names: &[&str]) -> String {
    let items: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "apiVersion": "provisioning.cattle.io/v1",
                "kind": "Cluster",
                "metadata": { "name": name, "namespace": "fleet-default", "uid": format!("uid-{}", name) },
                "spec": {}
            })
        })
        .collect();
    serde_json::json!({
        "apiVersion": "provisioning.cattle.io/v1",
        "kind": "ClusterList",
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}
