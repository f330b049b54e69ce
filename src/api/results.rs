use crate::apply::ApplyResult;
use crate::diff::StatementPlan;
use crate::model::ObjectType;

/// Result of a drop-create run.
#[derive(Debug, Clone)]
pub struct DropCreateResult {
    /// Statements generated per object type, in execution order
    pub plan: StatementPlan,
    /// What was executed
    pub apply: ApplyResult,
}

impl DropCreateResult {
    pub fn is_empty(&self) -> bool {
        self.plan.values().all(|statements| statements.is_empty())
    }

    pub fn total_statements(&self) -> usize {
        self.plan.values().map(|statements| statements.len()).sum()
    }

    /// Rendered statements for one object type, drops first.
    pub fn statements_for(&self, object_type: ObjectType) -> Vec<String> {
        self.plan
            .get(&object_type)
            .map(|statements| statements.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }
}
