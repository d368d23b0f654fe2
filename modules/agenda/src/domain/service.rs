use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tracing::{debug, info, instrument};

use crate::contract::model::{Hobby, NewHobby, NewReunion, Person, PersonInput, Reunion};
use crate::domain::error::DomainError;
use crate::domain::repo::{AgendaRepository, PersonRecord};
use crate::domain::validation::Violations;

pub const FULL_NAME_MAX: usize = 50;
pub const JOB_MAX: usize = 50;
pub const EMAIL_MAX: usize = 254;
pub const PHONE_MAX: usize = 15;
pub const HOBBY_MAX: usize = 50;
pub const ASUNTO_MAX: usize = 100;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_search_keyword_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_search_keyword_length: 100,
        }
    }
}

/// Domain service for people, hobbies and meetings.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn AgendaRepository>,
    config: ServiceConfig,
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

impl Service {
    pub fn new(repo: Arc<dyn AgendaRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "agenda.service.list_persons", skip(self))]
    pub async fn list_persons(&self) -> Result<Vec<Person>, DomainError> {
        let persons = self.repo.list_persons().await.map_err(db_err)?;
        debug!(count = persons.len(), "Listed persons");
        Ok(persons)
    }

    /// Source for the nested rendering; same rows as [`Service::list_persons`].
    #[instrument(name = "agenda.service.list_persons_with_hobbies", skip(self))]
    pub async fn list_persons_with_hobbies(&self) -> Result<Vec<Person>, DomainError> {
        self.repo.list_persons().await.map_err(db_err)
    }

    #[instrument(name = "agenda.service.search_persons", skip(self))]
    pub async fn search_persons(&self, keyword: &str) -> Result<Vec<Person>, DomainError> {
        let max = self.config.max_search_keyword_length;
        if keyword.chars().count() > max {
            return Err(DomainError::validation(
                "kword",
                crate::domain::validation::too_long(max),
            ));
        }
        let persons = self.repo.search_persons(keyword).await.map_err(db_err)?;
        debug!(count = persons.len(), "Search finished");
        Ok(persons)
    }

    #[instrument(name = "agenda.service.get_person", skip(self))]
    pub async fn get_person(&self, id: i32) -> Result<Person, DomainError> {
        self.repo
            .find_person(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::person_not_found(id))
    }

    #[instrument(name = "agenda.service.create_person", skip(self, input))]
    pub async fn create_person(&self, input: PersonInput) -> Result<Person, DomainError> {
        info!("Creating person");
        validate_person(&input, false)?;
        let hobbies = self.checked_hobbies(input.hobbies.unwrap_or_default()).await?;

        let record = PersonRecord {
            full_name: input.full_name.unwrap_or_default(),
            job: input.job.unwrap_or_default(),
            email: input.email.unwrap_or_default(),
            phone: input.phone.unwrap_or_default(),
            hobbies,
            // Microsecond precision, as stored by Postgres.
            created: Utc::now().trunc_subsecs(6),
        };
        let person = self.repo.insert_person(record).await.map_err(db_err)?;
        info!(id = person.id, "Created person");
        Ok(person)
    }

    /// Full update when `partial` is false, field-wise update otherwise.
    #[instrument(name = "agenda.service.update_person", skip(self, input))]
    pub async fn update_person(
        &self,
        id: i32,
        input: PersonInput,
        partial: bool,
    ) -> Result<Person, DomainError> {
        let current = self.get_person(id).await?;
        validate_person(&input, partial)?;

        let hobbies = match input.hobbies {
            Some(ids) => self.checked_hobbies(ids).await?,
            None => current.hobby_ids(),
        };
        let record = PersonRecord {
            full_name: input.full_name.unwrap_or(current.full_name),
            job: input.job.unwrap_or(current.job),
            email: input.email.unwrap_or(current.email),
            phone: input.phone.unwrap_or(current.phone),
            hobbies,
            created: current.created,
        };

        let person = self
            .repo
            .update_person(id, record)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::person_not_found(id))?;
        info!("Updated person");
        Ok(person)
    }

    #[instrument(name = "agenda.service.delete_person", skip(self))]
    pub async fn delete_person(&self, id: i32) -> Result<(), DomainError> {
        if !self.repo.delete_person(id).await.map_err(db_err)? {
            return Err(DomainError::person_not_found(id));
        }
        info!("Deleted person");
        Ok(())
    }

    #[instrument(name = "agenda.service.list_hobbies", skip(self))]
    pub async fn list_hobbies(&self) -> Result<Vec<Hobby>, DomainError> {
        self.repo.list_hobbies().await.map_err(db_err)
    }

    #[instrument(name = "agenda.service.create_hobby", skip(self))]
    pub async fn create_hobby(&self, new_hobby: NewHobby) -> Result<Hobby, DomainError> {
        let mut v = Violations::default();
        v.text("hobby", &new_hobby.hobby, HOBBY_MAX);
        v.into_result()?;
        self.repo
            .insert_hobby(new_hobby.hobby)
            .await
            .map_err(db_err)
    }

    #[instrument(name = "agenda.service.list_reuniones", skip(self))]
    pub async fn list_reuniones(&self) -> Result<Vec<Reunion>, DomainError> {
        self.repo.list_reuniones().await.map_err(db_err)
    }

    #[instrument(name = "agenda.service.create_reunion", skip(self), fields(persona = new_reunion.persona))]
    pub async fn create_reunion(&self, new_reunion: NewReunion) -> Result<Reunion, DomainError> {
        let mut v = Violations::default();
        v.text("asunto", &new_reunion.asunto, ASUNTO_MAX);
        v.into_result()?;

        if !self
            .repo
            .person_exists(new_reunion.persona)
            .await
            .map_err(db_err)?
        {
            return Err(DomainError::unknown_person(new_reunion.persona));
        }
        let reunion = self.repo.insert_reunion(new_reunion).await.map_err(db_err)?;
        info!(id = reunion.id, "Created reunion");
        Ok(reunion)
    }

    /// Dedupe and sort `ids`, failing with every id that does not exist.
    async fn checked_hobbies(&self, ids: Vec<i32>) -> Result<Vec<i32>, DomainError> {
        let wanted: Vec<i32> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        if wanted.is_empty() {
            return Ok(wanted);
        }
        let found: BTreeSet<i32> = self
            .repo
            .existing_hobby_ids(&wanted)
            .await
            .map_err(db_err)?
            .into_iter()
            .collect();
        let missing: Vec<i32> = wanted
            .iter()
            .copied()
            .filter(|id| !found.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::unknown_hobbies(missing));
        }
        Ok(wanted)
    }
}

fn validate_person(input: &PersonInput, partial: bool) -> Result<(), DomainError> {
    let mut v = Violations::default();
    v.text_opt("full_name", input.full_name.as_deref(), FULL_NAME_MAX, partial);
    v.text_opt("job", input.job.as_deref(), JOB_MAX, partial);
    match input.email.as_deref() {
        Some(email) => v.email("email", email, EMAIL_MAX),
        None if !partial => v.push("email", crate::domain::validation::REQUIRED),
        None => {}
    }
    v.text_opt("phone", input.phone.as_deref(), PHONE_MAX, partial);
    v.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_input() -> PersonInput {
        PersonInput {
            full_name: Some("Ana Torres".into()),
            job: Some("Engineer".into()),
            email: Some("ana@example.com".into()),
            phone: Some("555-0100".into()),
            hobbies: None,
        }
    }

    fn fields(err: DomainError) -> Vec<String> {
        match err {
            DomainError::Validation { errors } => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn full_validation_requires_every_field() {
        let err = validate_person(&PersonInput::default(), false).unwrap_err();
        assert_eq!(fields(err), vec!["full_name", "job", "email", "phone"]);
    }

    #[test]
    fn partial_validation_checks_only_supplied_fields() {
        let input = PersonInput {
            phone: Some("0".repeat(16)),
            ..Default::default()
        };
        assert!(validate_person(&PersonInput::default(), true).is_ok());
        assert_eq!(fields(validate_person(&input, true).unwrap_err()), vec!["phone"]);
    }

    #[test]
    fn empty_email_is_allowed() {
        let input = PersonInput {
            email: Some(String::new()),
            ..full_input()
        };
        assert!(validate_person(&input, false).is_ok());
    }
}
