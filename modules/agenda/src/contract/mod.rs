pub mod client;
pub mod error;
pub mod model;

pub use error::AgendaError;
pub use model::{Hobby, NewHobby, NewReunion, Person, PersonInput, Reunion};
