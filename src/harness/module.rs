use super::{DeathReason, Heart};
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use std::any::type_name;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument};

/// Executable module
#[async_trait]
pub trait Module {
    /// Executed before running the core loop
    async fn pre_startup(&mut self) -> EmptyResult {
        Ok(())
    }

    /// Core run loop of the module
    ///
    /// Long running modules are expected to stop once the provided [`Heart`] dies and return
    /// the [`DeathReason`] in that case. Returning `None` indicates that the module completed
    /// its work on its own.
    async fn run(&mut self, heart: Heart) -> Result<Option<DeathReason>, BoxedError>;

    /// Shutdown hook executed after the core loop has terminated
    #[instrument(skip(self))]
    async fn post_shutdown(&mut self, termination_reason: &ModuleTerminationReason) {
        if termination_reason.is_success() {
            info!("Module exited normally")
        } else {
            error!("Module terminated with an error")
        }
    }
}

/// Reason why a module has terminated
#[derive(Error, Debug)]
pub enum ModuleTerminationReason {
    /// Startup routine threw an error
    #[error("startup routine threw an error")]
    StartupFailed(#[source] BoxedError),
    /// Core run loop threw an error
    #[error("error during operation")]
    OperationalError(#[source] BoxedError),
    /// [`Heart`] passed to the module died
    #[error("heart of the module died: {0}")]
    HeartDied(DeathReason),
    /// Run loop exited cleanly
    #[error("run loop exited cleanly")]
    ExitedNormally,
    /// Timeout during startup or shutdown
    #[error("timeout during startup or shutdown")]
    Timeout,
}

impl ModuleTerminationReason {
    /// Whether the module terminated as intended
    pub fn is_success(&self) -> bool {
        matches!(self, Self::HeartDied(_) | Self::ExitedNormally)
    }

    /// Process exit code representing the reason
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Runner for [`Module`] implementations
pub struct ModuleRunner {
    startup_timeout: Duration,
    shutdown_timeout: Duration,
}

impl Default for ModuleRunner {
    fn default() -> Self {
        Self {
            startup_timeout: Duration::from_secs(60),
            shutdown_timeout: Duration::from_secs(60),
        }
    }
}

impl ModuleRunner {
    /// Executes a [`Module`] with a [`Heart`] that dies on termination signals
    pub async fn run<M: Module + Send + Sync>(&self, module: M) -> ModuleTerminationReason {
        self.run_with_heart(module, Heart::without_heart_stone()).await
    }

    /// Executes a [`Module`] until it exits by calling the corresponding lifecycle functions in order
    /// and returns the reason why it terminated.
    #[instrument(skip(self, module, heart), fields(module_name = type_name::<M>()))]
    pub async fn run_with_heart<M: Module + Send + Sync>(
        &self,
        mut module: M,
        heart: Heart,
    ) -> ModuleTerminationReason {
        info!("Commencing module startup sequence");
        let startup = timeout(self.startup_timeout, module.pre_startup()).await;

        let termination_reason = match startup {
            Ok(Ok(_)) => Self::run_loop(&mut module, heart).await,
            Ok(Err(error)) => {
                error!(%error, "Module startup sequence encountered an error");
                ModuleTerminationReason::StartupFailed(error)
            }
            Err(_) => {
                error!("Module startup sequence timed out");
                ModuleTerminationReason::Timeout
            }
        };

        info!("Commencing module shutdown sequence");
        let result = timeout(
            self.shutdown_timeout,
            module.post_shutdown(&termination_reason),
        )
        .await;

        if result.is_err() {
            error!("Module shutdown sequence timed out");
            return ModuleTerminationReason::Timeout;
        }

        termination_reason
    }

    async fn run_loop<M: Module + Send + Sync>(
        module: &mut M,
        heart: Heart,
    ) -> ModuleTerminationReason {
        info!("Executing module run procedure");
        match module.run(heart).await {
            Ok(None) => {
                debug!("Module run procedure completed successfully");
                ModuleTerminationReason::ExitedNormally
            }
            Ok(Some(death_reason)) => {
                info!(%death_reason, "Module stopped after its heart died");
                ModuleTerminationReason::HeartDied(death_reason)
            }
            Err(error) => {
                error!(%error, "Module run procedure encountered an error");
                ModuleTerminationReason::OperationalError(error)
            }
        }
    }
}
