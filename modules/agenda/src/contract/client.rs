use async_trait::async_trait;

use crate::contract::{
    error::AgendaError,
    model::{Person, PersonInput, Reunion},
};

/// In-process API over people and their meetings.
#[async_trait]
pub trait AgendaApi: Send + Sync {
    async fn list_persons(&self) -> Result<Vec<Person>, AgendaError>;

    /// Case-insensitive substring match on `full_name`.
    async fn search_persons(&self, keyword: &str) -> Result<Vec<Person>, AgendaError>;

    async fn get_person(&self, id: i32) -> Result<Person, AgendaError>;

    async fn create_person(&self, input: PersonInput) -> Result<Person, AgendaError>;

    async fn list_reuniones(&self) -> Result<Vec<Reunion>, AgendaError>;
}
