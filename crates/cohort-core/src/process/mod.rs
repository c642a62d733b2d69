//! Processes the orchestrator can run.

pub mod conditional;
pub mod linear;

use std::sync::Arc;

use tokio::sync::Semaphore;

use cohort_contracts::{agent::Agent, process::ProcessId};

use crate::traits::Capability;

pub use conditional::{BranchBinding, BranchChoice, ConditionalProcess};
pub use linear::LinearProcess;

/// A runnable process: linear, or a prefix followed by two branches.
#[derive(Debug)]
pub enum Process {
    Linear(LinearProcess),
    Conditional(ConditionalProcess),
}

impl Process {
    pub fn id(&self) -> &ProcessId {
        match self {
            Process::Linear(p) => p.id(),
            Process::Conditional(p) => p.id(),
        }
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, Process::Conditional(_))
    }

    /// The shared cursor: the linear cursor, or the conditional prefix cursor.
    pub fn cursor(&self) -> usize {
        match self {
            Process::Linear(p) => p.cursor(),
            Process::Conditional(p) => p.cursor(),
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            Process::Linear(p) => p.is_complete(),
            Process::Conditional(p) => p.is_complete(),
        }
    }

    pub fn reset_execution(&mut self) {
        match self {
            Process::Linear(p) => p.reset_execution(),
            Process::Conditional(p) => p.reset_execution(),
        }
    }

    /// Every capability reachable from this process, duplicates included.
    pub fn capabilities(&self) -> Vec<Arc<dyn Capability>> {
        match self {
            Process::Linear(p) => p.capabilities(),
            Process::Conditional(p) => p.capabilities(),
        }
    }

    /// Advance the process by one step for `agents`. Returns true while work
    /// remains.
    pub async fn step_round(&mut self, agents: Vec<&mut Agent>, limiter: &Semaphore) -> bool {
        match self {
            Process::Linear(p) => p.step_round(agents, limiter).await,
            Process::Conditional(p) => p.step_round(agents, limiter).await,
        }
    }

    /// Offline execution of every agent through the whole process.
    pub async fn execute<'a>(&self, agents: impl IntoIterator<Item = &'a mut Agent>) {
        match self {
            Process::Linear(p) => p.execute(agents).await,
            Process::Conditional(p) => p.execute(agents).await,
        }
    }
}

impl From<LinearProcess> for Process {
    fn from(process: LinearProcess) -> Self {
        Process::Linear(process)
    }
}

impl From<ConditionalProcess> for Process {
    fn from(process: ConditionalProcess) -> Self {
        Process::Conditional(process)
    }
}
