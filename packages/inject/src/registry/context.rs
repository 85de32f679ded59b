// Visitor Context
//
// Processor options handed to every extension invocation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorContext {
    options: IndexMap<String, String>,
}

impl VisitorContext {
    pub fn new(options: IndexMap<String, String>) -> Self {
        Self { options }
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn options(&self) -> &IndexMap<String, String> {
        &self.options
    }
}
