use serde::{Deserialize, Serialize};

/// `modules.todos` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TodosConfig {
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,
}

impl Default for TodosConfig {
    fn default() -> Self {
        Self {
            max_title_length: default_max_title_length(),
        }
    }
}

fn default_max_title_length() -> usize {
    200
}
