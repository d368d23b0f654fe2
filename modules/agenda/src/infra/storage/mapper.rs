use crate::contract::model::{Hobby, Person, Reunion};
use crate::infra::storage::entity::{hobby, person, reunion};

impl From<hobby::Model> for Hobby {
    fn from(m: hobby::Model) -> Self {
        Self {
            id: m.id,
            hobby: m.hobby,
        }
    }
}

impl From<reunion::Model> for Reunion {
    fn from(m: reunion::Model) -> Self {
        Self {
            id: m.id,
            fecha: m.fecha,
            hora: m.hora,
            asunto: m.asunto,
            persona: m.persona_id,
        }
    }
}

/// Assemble a person from its row and the hobbies linked to it.
pub fn person_from_parts(m: person::Model, hobbies: Vec<hobby::Model>) -> Person {
    let mut hobbies: Vec<Hobby> = hobbies.into_iter().map(Into::into).collect();
    hobbies.sort_by_key(|h| h.id);
    Person {
        id: m.id,
        full_name: m.full_name,
        job: m.job,
        email: m.email,
        phone: m.phone,
        hobbies,
        created: m.created,
    }
}
