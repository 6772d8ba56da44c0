//! Tunable workflow rules.

use serde::{Deserialize, Serialize};

/// How far a responsible tester's task listing reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TesterVisibility {
    /// Testing tasks the tester created or that are assigned to them or to
    /// a tester reporting to them.
    #[default]
    Hierarchy,
    /// Every task in testing.
    Global,
}

/// Workflow rules shared by the task services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// Listing scope of responsible testers.
    pub tester_visibility: TesterVisibility,
}

impl WorkflowPolicy {
    /// Sets the responsible tester listing scope.
    #[must_use]
    pub const fn with_tester_visibility(mut self, visibility: TesterVisibility) -> Self {
        self.tester_visibility = visibility;
        self
    }
}
