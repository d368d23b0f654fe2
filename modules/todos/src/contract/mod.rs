pub mod client;
pub mod error;
pub mod model;

pub use error::TodosError;
pub use model::{NewTodo, Todo};
