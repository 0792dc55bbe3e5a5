//! Canned Resource Manager responses over loopback HTTP
//!
//! [`ArmStub`] answers every GET with a fixed status and JSON body chosen by
//! request path, so the REST clients can run unchanged against it through
//! `AzureContext::with_endpoint`. Bodies may refer to the stub's own base URL
//! as `{endpoint}`, which is how paged responses point at their next page.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const NOT_FOUND: &str = r#"{"error":{"code":"ResourceNotFound","message":"no canned response"}}"#;

type Routes = HashMap<String, (u16, String)>;

/// Routes of a stub that has not started listening yet
#[derive(Debug, Default)]
pub struct ArmStub {
    routes: Routes,
}

impl ArmStub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer GETs of `path` with 200 and `body`
    pub fn respond(self, path: &str, body: &str) -> Self {
        self.respond_with(path, 200, body)
    }

    pub fn respond_with(mut self, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    /// Bind an ephemeral loopback port and serve until dropped
    pub async fn start(self) -> Result<RunningStub> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind stub listener")?;
        let endpoint = format!("http://{}", listener.local_addr()?);

        let routes: Routes = self
            .routes
            .into_iter()
            .map(|(path, (status, body))| (path, (status, body.replace("{endpoint}", &endpoint))))
            .collect();
        let routes = Arc::new(routes);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let task = {
            let requests = Arc::clone(&requests);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let routes = Arc::clone(&routes);
                    let requests = Arc::clone(&requests);
                    tokio::spawn(async move {
                        // A broken connection only fails the client side of the test
                        let _ = serve(stream, &routes, &requests).await;
                    });
                }
            })
        };

        Ok(RunningStub {
            endpoint,
            requests,
            task,
        })
    }
}

/// A listening stub; stops accepting when dropped
pub struct RunningStub {
    endpoint: String,
    requests: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl RunningStub {
    /// Base URL, without a trailing slash
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request targets (path and raw query) received so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Drop for RunningStub {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut stream: TcpStream, routes: &Routes, requests: &Mutex<Vec<String>>) -> Result<()> {
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&head);
    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let path = target.split('?').next().unwrap_or_default();
    let (status, body) = routes
        .get(path)
        .cloned()
        .unwrap_or_else(|| (404, NOT_FOUND.to_string()));
    if let Ok(mut seen) = requests.lock() {
        seen.push(target.clone());
    }

    let reason = if status < 400 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
