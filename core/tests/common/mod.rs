#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use maactl_core::api::{
    Catalog, CommandRequest, CommandResponse, CoordinatorTiming, ExecutionBackend,
    ExecutionCoordinator,
};
use tokio::sync::Notify;

pub enum Scripted {
    Respond(CommandResponse),
    Transport(String),
    Panic(String),
}

/// Backend that replays a script of responses and records every request it sees.
#[derive(Default)]
pub struct ScriptedBackend {
    script: StdMutex<VecDeque<Scripted>>,
    requests: StdMutex<Vec<CommandRequest>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: StdMutex::new(script.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Every call parks until `gate` is notified.
    pub fn gated(script: impl IntoIterator<Item = Scripted>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(script)
        }
    }

    pub fn requests(&self) -> Vec<CommandRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn execute(&self, request: CommandRequest) -> anyhow::Result<CommandResponse> {
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Respond(resp)) => Ok(resp),
            Some(Scripted::Transport(msg)) => Err(anyhow::anyhow!(msg)),
            Some(Scripted::Panic(msg)) => panic!("{msg}"),
            None => Ok(CommandResponse::ok(None)),
        }
    }
}

pub fn builtin_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::builtin().unwrap())
}

pub fn coordinator_with(
    backend: Arc<ScriptedBackend>,
    timing: CoordinatorTiming,
) -> ExecutionCoordinator {
    ExecutionCoordinator::new(builtin_catalog(), backend, timing)
}
