use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::{
    client::AgendaApi,
    error::AgendaError,
    model::{Person, PersonInput, Reunion},
};
use crate::domain::service::Service;

/// [`AgendaApi`] backed directly by the domain service.
pub struct AgendaLocalClient {
    service: Arc<Service>,
}

impl AgendaLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AgendaApi for AgendaLocalClient {
    async fn list_persons(&self) -> Result<Vec<Person>, AgendaError> {
        self.service.list_persons().await.map_err(Into::into)
    }

    async fn search_persons(&self, keyword: &str) -> Result<Vec<Person>, AgendaError> {
        self.service.search_persons(keyword).await.map_err(Into::into)
    }

    async fn get_person(&self, id: i32) -> Result<Person, AgendaError> {
        self.service.get_person(id).await.map_err(Into::into)
    }

    async fn create_person(&self, input: PersonInput) -> Result<Person, AgendaError> {
        self.service.create_person(input).await.map_err(Into::into)
    }

    async fn list_reuniones(&self) -> Result<Vec<Reunion>, AgendaError> {
        self.service.list_reuniones().await.map_err(Into::into)
    }
}
