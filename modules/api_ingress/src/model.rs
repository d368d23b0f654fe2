use std::collections::BTreeMap;

use utoipa::openapi::{schema::Schema, RefOr};

/// Outcome of adding one schema to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registered {
    Inserted,
    Identical,
    /// A different schema already owns the name; the first one is kept.
    Conflict,
}

#[derive(Debug, Default, Clone)]
pub struct ComponentsRegistry {
    /// Component name -> schema (serialized to `components.schemas`).
    pub schemas: BTreeMap<String, RefOr<Schema>>,
}

impl ComponentsRegistry {
    pub fn register_schema(&mut self, name: impl Into<String>, schema: RefOr<Schema>) -> Registered {
        let name = name.into();
        match self.schemas.get(&name) {
            None => {
                self.schemas.insert(name, schema);
                Registered::Inserted
            }
            Some(existing) => {
                let same = match (serde_json::to_value(existing), serde_json::to_value(&schema)) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                };
                if same {
                    Registered::Identical
                } else {
                    Registered::Conflict
                }
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }
}
