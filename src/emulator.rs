use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use thiserror::Error;
use tokio::time::timeout;

use crate::config::Environment;
use crate::event::{InboundEvent, OutboundResponse};
use crate::handler::{self, Runner};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("Invocation timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Cannot read env file {path:?}: {source}")]
    EnvFile { path: PathBuf, source: dotenvy::Error },
}

/// Runs the handler with a fresh environment per invocation and a deadline.
pub struct Emulator {
    base: Environment,
    env_file: Option<PathBuf>,
    timeout: Duration,
    runner: Arc<dyn Runner>,
}

impl Emulator {
    pub fn new(base: Environment, runner: Arc<dyn Runner>) -> Self {
        Emulator { base, env_file: None, timeout: DEFAULT_TIMEOUT, runner }
    }

    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn execute(&self, event: InboundEvent) -> Result<OutboundResponse, EmulatorError> {
        let env = self.environment()?;
        timeout(self.timeout, handler::handle(&event, &env, self.runner.as_ref()))
            .await
            .map_err(|_| EmulatorError::Timeout(self.timeout))
    }

    /// Base variables overlaid with the env file, re-read on every call.
    /// The process environment is left untouched.
    fn environment(&self) -> Result<Environment, EmulatorError> {
        let mut env = self.base.clone();
        let path = match &self.env_file {
            Some(path) => path,
            None => return Ok(env),
        };
        let entries = match dotenvy::from_path_iter(path) {
            Ok(entries) => entries,
            Err(err) if err.not_found() => {
                debug!("No env file at {:?}", path);
                return Ok(env);
            }
            Err(source) => return Err(EmulatorError::EnvFile { path: path.clone(), source }),
        };
        for entry in entries {
            let (key, value) = entry.map_err(|source| EmulatorError::EnvFile { path: path.clone(), source })?;
            env.insert(key, value);
        }
        Ok(env)
    }
}
