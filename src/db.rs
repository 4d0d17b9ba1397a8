//! The database collaborator contract.
//!
//! The framework does not ship a SQL client. Views talk to whatever implements
//! [`Database`], and the dispatch core treats the results as opaque response
//! material. Calls are synchronous and blocking; a slow backend blocks the
//! request it is serving.

use serde_json::{Map, Value, json};

/// The outcome of one statement.
#[derive(Clone, Debug, Default)]
pub struct DbResult {
    pub success: bool,
    /// Affected / returned row count.
    pub rows: u64,
    /// Result set: one JSON object per row.
    pub result: Vec<Map<String, Value>>,
    pub error_info: Option<String>,
    /// Set by [`Database::insert`] on success.
    pub last_insert_id: Option<u64>,
}

impl DbResult {
    /// The row at `index`, when the statement succeeded and the index is in
    /// range.
    pub fn index_of(&self, index: usize) -> Option<&Map<String, Value>> {
        if !self.success {
            return None;
        }
        self.result.get(index)
    }

    pub fn first(&self) -> Option<&Map<String, Value>> {
        self.index_of(0)
    }

    pub fn last(&self) -> Option<&Map<String, Value>> {
        self.result.len().checked_sub(1).and_then(|i| self.index_of(i))
    }

    /// The four basic fields as a JSON object, for error payloads.
    pub fn to_value(&self) -> Value {
        json!({
            "success": self.success,
            "result": self.result,
            "error_info": self.error_info,
            "rows": self.rows,
        })
    }
}

/// A relational client as the core consumes it.
pub trait Database: Send + Sync {
    /// Executes `sql`, returning row count and result set.
    fn execute(&self, sql: &str) -> DbResult;

    /// Executes an INSERT, additionally reporting the inserted row's id.
    fn insert(&self, sql: &str) -> DbResult;
}
