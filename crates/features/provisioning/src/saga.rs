//! Transaction script with typed compensations.
//!
//! Each completed step pushes the [`Undo`] that reverses it. On failure the saga
//! replays those in reverse order; an undo that fails is logged and reported, and
//! the remaining ones still run.

use crate::directory::AccountDirectory;
use crate::error::ProvisioningError;
use std::fmt;
use tracing::{error, info, warn};

/// The reversal of one completed provisioning step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undo {
    DeleteIdentity(String),
    DeleteUser(String),
}

impl fmt::Display for Undo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteIdentity(id) => write!(f, "delete auth identity {id}"),
            Self::DeleteUser(id) => write!(f, "delete user row {id}"),
        }
    }
}

impl Undo {
    async fn run(&self, directory: &dyn AccountDirectory) -> Result<bool, ProvisioningError> {
        match self {
            Self::DeleteIdentity(id) => directory.delete_identity(id).await,
            Self::DeleteUser(id) => directory.delete_user(id).await,
        }
    }
}

#[derive(Debug)]
pub struct Saga<'a> {
    directory: &'a dyn AccountDirectory,
    completed: Vec<Undo>,
}

impl<'a> Saga<'a> {
    pub fn new(directory: &'a dyn AccountDirectory) -> Self {
        Self { directory, completed: Vec::new() }
    }

    /// Records that a step succeeded and how to reverse it.
    pub fn completed(&mut self, undo: Undo) {
        self.completed.push(undo);
    }

    /// Rolls back every completed step and turns the step failure into the returned error.
    ///
    /// Conflicts keep their kind so the caller can still answer 409.
    pub async fn abort(self, step: &'static str, cause: ProvisioningError) -> ProvisioningError {
        error!(step, error = %cause, "Provisioning step failed; rolling back");
        let failed = self.compensate().await;

        let mut message = format!("Failed to {step}");
        if !failed.is_empty() {
            message.push_str("; rollback incomplete: ");
            message.push_str(&failed.join(", "));
        }

        if cause.is_conflict() {
            ProvisioningError::Conflict { message: message.into(), context: None }
        } else {
            ProvisioningError::Step { message: message.into(), context: None }
        }
    }

    /// Runs the undos newest first. Returns the ones that failed.
    async fn compensate(self) -> Vec<String> {
        let mut failed = Vec::new();
        for undo in self.completed.iter().rev() {
            match undo.run(self.directory).await {
                Ok(true) => info!(%undo, "Compensated"),
                Ok(false) => warn!(%undo, "Nothing to compensate; row already gone"),
                Err(e) => {
                    error!(%undo, error = %e, "Compensation failed");
                    failed.push(undo.to_string());
                }
            }
        }
        failed
    }
}
