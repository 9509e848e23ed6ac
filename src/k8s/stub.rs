//! Canned-response API server for unit tests
//!
//! Serves plain HTTP on 127.0.0.1 with one response per connection.
//! Requests are recorded so tests can assert on paths and query strings.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Config;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Status code and JSON body
pub type Reply = (u16, String);

type Handler = dyn Fn(&str) -> Reply + Send + Sync;

pub struct StubApiServer {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubApiServer {
    /// Start the server; `handler` maps "path?query" to a reply
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let handler = handler.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    loop {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }

                    let head = String::from_utf8_lossy(&buf);
                    let target = head
                        .lines()
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                        .unwrap_or("/")
                        .to_string();
                    recorded.lock().unwrap().push(target.clone());

                    let (status, body) = handler(&target);
                    let response = format!(
                        "HTTP/1.1 {status} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        reason(status),
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self { port, requests }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Client config pointing at this server, built through a kubeconfig
    pub async fn config(&self) -> Config {
        config_for(&self.url()).await
    }

    /// Request targets seen so far, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Kubeconfig YAML with a single context and no auth
pub fn kubeconfig_yaml(server: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: Config
clusters:
- name: stub
  cluster:
    server: {server}
contexts:
- name: stub
  context:
    cluster: stub
    user: stub
    namespace: default
users:
- name: stub
  user: {{}}
current-context: stub
"#
    )
}

/// Config for an arbitrary server URL
pub async fn config_for(server: &str) -> Config {
    let kubeconfig = Kubeconfig::from_yaml(&kubeconfig_yaml(server)).unwrap();
    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .unwrap()
}

/// JSON list body; `items` are object names
pub fn list_body(
    api_version: &str,
    kind: &str,
    names: &[&str],
    continue_token: Option<&str>,
) -> String {
    let items: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "apiVersion": api_version,
                "kind": kind,
                "metadata": { "name": name, "namespace": "default" },
            })
        })
        .collect();

    let mut metadata = serde_json::json!({ "resourceVersion": "1" });
    if let Some(token) = continue_token {
        metadata["continue"] = serde_json::Value::String(token.to_string());
    }

    serde_json::json!({
        "apiVersion": api_version,
        "kind": format!("{kind}List"),
        "metadata": metadata,
        "items": items,
    })
    .to_string()
}

/// Secret `default/management-prod-cluster-kubeconfig` holding `kubeconfig` under `key`
pub fn secret_body(key: &str, kubeconfig: &str) -> String {
    let mut data = BTreeMap::new();
    data.insert(key.to_string(), ByteString(kubeconfig.as_bytes().to_vec()));
    let mut secret = Secret::default();
    secret.metadata.name = Some("management-prod-cluster-kubeconfig".to_string());
    secret.metadata.namespace = Some("default".to_string());
    secret.data = Some(data);
    serde_json::to_string(&secret).unwrap()
}

/// Kubernetes Status body for an error reply
pub fn status_body(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Status",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code,
    })
    .to_string()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Internal Server Error",
    }
}
