//! DTO for the variable catalog endpoint.

use serde::Serialize;

use crate::domain::entities::VariableInfo;

#[derive(Debug, Serialize)]
pub struct VariablesResponse {
    pub total: usize,
    pub items: Vec<VariableInfo>,
}

impl From<Vec<VariableInfo>> for VariablesResponse {
    fn from(items: Vec<VariableInfo>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}
