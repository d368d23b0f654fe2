use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hobby {
    pub id: i32,
    pub hobby: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHobby {
    pub hobby: String,
}

/// A person together with their hobbies, sorted by hobby id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: i32,
    pub full_name: String,
    pub job: String,
    pub email: String,
    pub phone: String,
    pub hobbies: Vec<Hobby>,
    pub created: DateTime<Utc>,
}

impl Person {
    pub fn hobby_ids(&self) -> Vec<i32> {
        self.hobbies.iter().map(|h| h.id).collect()
    }
}

/// Writable person fields. `None` means the field was not supplied.
///
/// On create and full update every field except `hobbies` must be present;
/// on partial update only the supplied ones are validated and applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonInput {
    pub full_name: Option<String>,
    pub job: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Replaces the whole hobby set when present.
    pub hobbies: Option<Vec<i32>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reunion {
    pub id: i32,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub asunto: String,
    /// Id of the person the meeting is with.
    pub persona: i32,
}

impl Reunion {
    /// `"{fecha} - {hora}"`, e.g. `2024-05-01 - 09:30:00`.
    pub fn fecha_hora(&self) -> String {
        format!("{} - {}", format_date(self.fecha), format_time(self.hora))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReunion {
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub asunto: String,
    pub persona: i32,
}

pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// `HH:MM:SS`, with six fractional digits only when there are microseconds.
pub fn format_time(t: NaiveTime) -> String {
    let micros = t.nanosecond() / 1_000;
    if micros == 0 {
        t.format("%H:%M:%S").to_string()
    } else {
        format!("{}.{:06}", t.format("%H:%M:%S"), micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reunion(hora: NaiveTime) -> Reunion {
        Reunion {
            id: 1,
            fecha: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            hora,
            asunto: "kickoff".into(),
            persona: 1,
        }
    }

    #[test]
    fn fecha_hora_joins_date_and_time() {
        let r = reunion(NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(r.fecha_hora(), "2024-05-01 - 09:30:00");
    }

    #[test]
    fn fractional_seconds_render_as_microseconds() {
        let r = reunion(NaiveTime::from_hms_micro_opt(9, 30, 0, 1_500).unwrap());
        assert_eq!(r.fecha_hora(), "2024-05-01 - 09:30:00.001500");
    }

    #[test]
    fn single_digit_components_are_zero_padded() {
        let r = Reunion {
            fecha: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ..reunion(NaiveTime::from_hms_opt(3, 4, 5).unwrap())
        };
        assert_eq!(r.fecha_hora(), "2024-01-02 - 03:04:05");
    }
}
