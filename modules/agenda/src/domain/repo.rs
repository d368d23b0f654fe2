use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::contract::model::{Hobby, NewReunion, Person, Reunion};

/// Validated person row as the service hands it to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    pub full_name: String,
    pub job: String,
    pub email: String,
    pub phone: String,
    /// Distinct, existing hobby ids.
    pub hobbies: Vec<i32>,
    pub created: DateTime<Utc>,
}

/// Persistence the agenda service needs. Lists are ordered by id.
#[async_trait]
pub trait AgendaRepository: Send + Sync {
    async fn list_persons(&self) -> anyhow::Result<Vec<Person>>;
    /// Persons whose `full_name` contains `keyword`, ignoring case.
    async fn search_persons(&self, keyword: &str) -> anyhow::Result<Vec<Person>>;
    async fn find_person(&self, id: i32) -> anyhow::Result<Option<Person>>;
    async fn person_exists(&self, id: i32) -> anyhow::Result<bool>;
    async fn insert_person(&self, record: PersonRecord) -> anyhow::Result<Person>;
    /// Overwrite the row and its hobby links. `None` if the person is gone.
    async fn update_person(&self, id: i32, record: PersonRecord)
        -> anyhow::Result<Option<Person>>;
    /// Returns true if a row was deleted; meetings and hobby links go with it.
    async fn delete_person(&self, id: i32) -> anyhow::Result<bool>;

    async fn list_hobbies(&self) -> anyhow::Result<Vec<Hobby>>;
    /// The subset of `ids` that exist.
    async fn existing_hobby_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<i32>>;
    async fn insert_hobby(&self, hobby: String) -> anyhow::Result<Hobby>;

    async fn list_reuniones(&self) -> anyhow::Result<Vec<Reunion>>;
    async fn insert_reunion(&self, reunion: NewReunion) -> anyhow::Result<Reunion>;
}
