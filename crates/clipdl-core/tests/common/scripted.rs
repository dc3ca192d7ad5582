//! Transfer facility double: scripted outcomes, recorded submissions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use clipdl_core::transfer::{Transfer, TransferError, TransferRequest};
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub enum Script {
    Succeed,
    Fail(u32),
    Timeout,
}

#[derive(Debug, Clone)]
pub struct Submitted {
    pub request: TransferRequest,
    pub at: Instant,
}

/// Outcomes are looked up by destination name; unscripted names succeed.
/// Every transfer takes `latency` before resolving.
#[derive(Debug, Default)]
pub struct ScriptedTransfer {
    scripts: Mutex<HashMap<String, Script>>,
    latency: Duration,
    submitted: Mutex<Vec<Submitted>>,
}

impl ScriptedTransfer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            ..Self::default()
        })
    }

    pub fn script(&self, destination: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .insert(destination.to_string(), script);
    }

    pub fn submitted(&self) -> Vec<Submitted> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn submitted_names(&self) -> Vec<String> {
        self.submitted()
            .into_iter()
            .map(|s| s.request.destination_name)
            .collect()
    }
}

#[async_trait]
impl Transfer for ScriptedTransfer {
    async fn fetch(&self, request: &TransferRequest) -> Result<(), TransferError> {
        self.submitted.lock().unwrap().push(Submitted {
            request: request.clone(),
            at: Instant::now(),
        });
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&request.destination_name)
            .cloned()
            .unwrap_or(Script::Succeed);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match script {
            Script::Succeed => Ok(()),
            Script::Fail(code) => Err(TransferError::Http(code)),
            Script::Timeout => Err(TransferError::Timeout("scripted timeout".into())),
        }
    }
}
