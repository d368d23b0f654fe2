use crate::contract::model::Todo;
use crate::infra::storage::entity::Model;

impl From<Model> for Todo {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            body: m.body,
        }
    }
}
