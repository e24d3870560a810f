//! Explicitly constructed solver context.
use std::fmt;

use log::{info, warn};

use crate::config::SolverConfig;

/// Severity of a [`Diagnostic`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Severity {
    Info,
    Warning,
}

/// A note about the input of a solve call.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Which solve call reported this, counting from 1.
    pub solve: u64,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let severity = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        write!(f, "solve {}: {}: {}", self.solve, severity, self.message)
    }
}

/// Configuration and diagnostics shared by the solvers created from it.
///
/// The caller owns the context and decides its lifecycle: [`reset`](Context::reset) starts over
/// with the same configuration, [`dispose`](Context::dispose) consumes the context and hands out
/// the collected diagnostics.
#[derive(Default)]
pub struct Context {
    config: SolverConfig,
    diagnostics: Vec<Diagnostic>,
    solves: u64,
}

impl Context {
    /// Create a context with the given configuration.
    pub fn new(config: SolverConfig) -> Context {
        Context {
            config,
            diagnostics: vec![],
            solves: 0,
        }
    }

    /// The configuration used by solvers of this context.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut SolverConfig {
        &mut self.config
    }

    /// Number of solve calls started with this context.
    pub fn solve_count(&self) -> u64 {
        self.solves
    }

    /// Diagnostics reported so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Record a diagnostic for the current solve call.
    pub fn report(&mut self, severity: Severity, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            severity,
            solve: self.solves,
            message: message.into(),
        };
        match severity {
            Severity::Info => info!("{}", diagnostic),
            Severity::Warning => warn!("{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Forget all diagnostics and restart the solve counter.
    pub fn reset(&mut self) {
        self.diagnostics.clear();
        self.solves = 0;
    }

    /// Consume the context, returning the collected diagnostics.
    pub fn dispose(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Marks the start of a solve call.
    pub(crate) fn begin_solve(&mut self) -> u64 {
        self.solves += 1;
        self.solves
    }
}
