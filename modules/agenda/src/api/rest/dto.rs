use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{
    format_time, Hobby, NewHobby, NewReunion, Person, PersonInput, Reunion,
};

/// Person with hobbies rendered as ids.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonDto {
    pub id: i32,
    pub full_name: String,
    pub job: String,
    pub email: String,
    pub phone: String,
    pub hobbies: Vec<i32>,
    pub created: DateTime<Utc>,
}

impl From<Person> for PersonDto {
    fn from(p: Person) -> Self {
        Self {
            hobbies: p.hobby_ids(),
            id: p.id,
            full_name: p.full_name,
            job: p.job,
            email: p.email,
            phone: p.phone,
            created: p.created,
        }
    }
}

/// Hand-picked person fields without hobbies or `created`.
///
/// `activo` is an input-only flag with no stored column, so it is never
/// populated from a stored person and is omitted when absent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonaDto {
    pub id: i32,
    pub full_name: String,
    pub job: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

impl From<Person> for PersonaDto {
    fn from(p: Person) -> Self {
        Self {
            id: p.id,
            full_name: p.full_name,
            job: p.job,
            email: p.email,
            phone: p.phone,
            activo: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HobbyDto {
    pub id: i32,
    pub hobby: String,
}

impl From<Hobby> for HobbyDto {
    fn from(h: Hobby) -> Self {
        Self {
            id: h.id,
            hobby: h.hobby,
        }
    }
}

/// Person with hobbies embedded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonWithHobbiesDto {
    pub id: i32,
    pub full_name: String,
    pub job: String,
    pub email: String,
    pub phone: String,
    pub hobbies: Vec<HobbyDto>,
    pub created: DateTime<Utc>,
}

impl From<Person> for PersonWithHobbiesDto {
    fn from(p: Person) -> Self {
        Self {
            id: p.id,
            full_name: p.full_name,
            job: p.job,
            email: p.email,
            phone: p.phone,
            hobbies: p.hobbies.into_iter().map(HobbyDto::from).collect(),
            created: p.created,
        }
    }
}

/// Meeting with the person as an id and a combined date/time field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReunionDto {
    pub id: i32,
    pub fecha: NaiveDate,
    /// `HH:MM:SS[.ffffff]`
    pub hora: String,
    pub asunto: String,
    pub persona: i32,
    /// `"{fecha} - {hora}"`
    pub fecha_hora: String,
}

impl From<Reunion> for ReunionDto {
    fn from(r: Reunion) -> Self {
        Self {
            fecha_hora: r.fecha_hora(),
            id: r.id,
            fecha: r.fecha,
            hora: format_time(r.hora),
            asunto: r.asunto,
            persona: r.persona,
        }
    }
}

/// Meeting with the whole person embedded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReunionNestedDto {
    pub id: i32,
    pub fecha: NaiveDate,
    pub hora: String,
    pub asunto: String,
    pub persona: PersonDto,
}

/// The person must be the one `reunion.persona` points at.
impl From<(Reunion, Person)> for ReunionNestedDto {
    fn from((r, persona): (Reunion, Person)) -> Self {
        debug_assert_eq!(r.persona, persona.id);
        Self {
            id: r.id,
            fecha: r.fecha,
            hora: format_time(r.hora),
            asunto: r.asunto,
            persona: PersonDto::from(persona),
        }
    }
}

/// Meeting with the person as a link to its detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReunionLinkDto {
    pub id: i32,
    pub fecha: NaiveDate,
    pub hora: String,
    pub asunto: String,
    /// URL of `/api/persona/detail/{pk}`
    pub persona: String,
}

impl ReunionLinkDto {
    pub fn new(r: Reunion, persona_url: String) -> Self {
        Self {
            id: r.id,
            fecha: r.fecha,
            hora: format_time(r.hora),
            asunto: r.asunto,
            persona: persona_url,
        }
    }
}

/// Writable person fields; `id` and `created` are ignored if sent.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PersonReq {
    pub full_name: Option<String>,
    pub job: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hobbies: Option<Vec<i32>>,
}

impl From<PersonReq> for PersonInput {
    fn from(r: PersonReq) -> Self {
        Self {
            full_name: r.full_name,
            job: r.job,
            email: r.email,
            phone: r.phone,
            hobbies: r.hobbies,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct HobbyReq {
    pub hobby: String,
}

impl From<HobbyReq> for NewHobby {
    fn from(r: HobbyReq) -> Self {
        Self { hobby: r.hobby }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReunionReq {
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub asunto: String,
    /// Person id.
    pub persona: i32,
}

impl From<ReunionReq> for NewReunion {
    fn from(r: ReunionReq) -> Self {
        Self {
            fecha: r.fecha,
            hora: r.hora,
            asunto: r.asunto,
            persona: r.persona,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn person() -> Person {
        Person {
            id: 3,
            full_name: "Ana Torres".into(),
            job: "Engineer".into(),
            email: "ana@example.com".into(),
            phone: "555-0100".into(),
            hobbies: vec![
                Hobby {
                    id: 1,
                    hobby: "chess".into(),
                },
                Hobby {
                    id: 4,
                    hobby: "running".into(),
                },
            ],
            created: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn persona_subset_omits_hobbies_created_and_unset_activo() {
        let v = serde_json::to_value(PersonaDto::from(person())).unwrap();
        assert_eq!(
            v,
            json!({
                "id": 3,
                "full_name": "Ana Torres",
                "job": "Engineer",
                "email": "ana@example.com",
                "phone": "555-0100",
            })
        );
    }

    #[test]
    fn persona_subset_accepts_activo_on_input() {
        let dto: PersonaDto = serde_json::from_value(json!({
            "id": 3,
            "full_name": "Ana Torres",
            "job": "Engineer",
            "email": "ana@example.com",
            "phone": "555-0100",
            "activo": true,
        }))
        .unwrap();
        assert_eq!(dto.activo, Some(true));
        assert_eq!(serde_json::to_value(&dto).unwrap()["activo"], true);
    }

    #[test]
    fn nested_reunion_embeds_the_person_with_hobby_ids() {
        let reunion = Reunion {
            id: 7,
            fecha: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            hora: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            asunto: "kickoff".into(),
            persona: 3,
        };
        let v = serde_json::to_value(ReunionNestedDto::from((reunion, person()))).unwrap();
        assert_eq!(v["id"], 7);
        assert_eq!(v["fecha"], "2024-05-02");
        assert_eq!(v["hora"], "09:30:00");
        assert_eq!(v["persona"]["id"], 3);
        assert_eq!(v["persona"]["hobbies"], json!([1, 4]));
        assert!(v.get("fecha_hora").is_none());
    }
}
