//! SeaORM adapter for [`AgendaRepository`].

use anyhow::Context;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::contract::model::{Hobby, NewReunion, Person, Reunion};
use crate::domain::repo::{AgendaRepository, PersonRecord};
use crate::infra::storage::entity::{hobby, person, person_hobby, reunion};
use crate::infra::storage::mapper::person_from_parts;

pub struct SeaOrmAgendaRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmAgendaRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    async fn persons_where(
        &self,
        filter: Option<SimpleExpr>,
    ) -> anyhow::Result<Vec<Person>> {
        let mut query = person::Entity::find();
        if let Some(cond) = filter {
            query = query.filter(cond);
        }
        let rows = query
            .order_by_asc(person::Column::Id)
            .find_with_related(hobby::Entity)
            .all(&self.conn)
            .await
            .context("loading persons failed")?;
        Ok(rows
            .into_iter()
            .map(|(p, hobbies)| person_from_parts(p, hobbies))
            .collect())
    }
}

/// `%keyword%` with LIKE wildcards in the keyword matched literally.
/// Case is left alone: both sides are folded by the database's `LOWER`.
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

async fn replace_links<C: ConnectionTrait>(
    conn: &C,
    person_id: i32,
    hobbies: &[i32],
) -> anyhow::Result<()> {
    person_hobby::Entity::delete_many()
        .filter(person_hobby::Column::PersonId.eq(person_id))
        .exec(conn)
        .await
        .context("clearing hobby links failed")?;
    if hobbies.is_empty() {
        return Ok(());
    }
    let links = hobbies.iter().map(|&hobby_id| person_hobby::ActiveModel {
        person_id: Set(person_id),
        hobby_id: Set(hobby_id),
    });
    person_hobby::Entity::insert_many(links)
        .exec(conn)
        .await
        .context("inserting hobby links failed")?;
    Ok(())
}

#[async_trait::async_trait]
impl<C> AgendaRepository for SeaOrmAgendaRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn list_persons(&self) -> anyhow::Result<Vec<Person>> {
        self.persons_where(None).await
    }

    async fn search_persons(&self, keyword: &str) -> anyhow::Result<Vec<Person>> {
        let cond = Expr::cust_with_exprs(
            "LOWER($1) LIKE LOWER($2) ESCAPE '\\'",
            [
                SimpleExpr::from(Expr::col((person::Entity, person::Column::FullName))),
                Expr::val(contains_pattern(keyword)).into(),
            ],
        );
        self.persons_where(Some(cond)).await
    }

    async fn find_person(&self, id: i32) -> anyhow::Result<Option<Person>> {
        let Some(found) = person::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_person failed")?
        else {
            return Ok(None);
        };
        let hobbies = found
            .find_related(hobby::Entity)
            .all(&self.conn)
            .await
            .context("loading hobbies failed")?;
        Ok(Some(person_from_parts(found, hobbies)))
    }

    async fn person_exists(&self, id: i32) -> anyhow::Result<bool> {
        let count = person::Entity::find_by_id(id)
            .count(&self.conn)
            .await
            .context("person_exists failed")?;
        Ok(count > 0)
    }

    async fn insert_person(&self, record: PersonRecord) -> anyhow::Result<Person> {
        let txn = self.conn.begin().await.context("begin failed")?;
        let stored = person::ActiveModel {
            full_name: Set(record.full_name),
            job: Set(record.job),
            email: Set(record.email),
            phone: Set(record.phone),
            created: Set(record.created),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("insert_person failed")?;
        replace_links(&txn, stored.id, &record.hobbies).await?;
        txn.commit().await.context("commit failed")?;

        self.find_person(stored.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("person {} missing after insert", stored.id))
    }

    async fn update_person(
        &self,
        id: i32,
        record: PersonRecord,
    ) -> anyhow::Result<Option<Person>> {
        let txn = self.conn.begin().await.context("begin failed")?;
        let Some(existing) = person::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("update_person lookup failed")?
        else {
            return Ok(None);
        };

        let mut am = existing.into_active_model();
        am.full_name = Set(record.full_name);
        am.job = Set(record.job);
        am.email = Set(record.email);
        am.phone = Set(record.phone);
        am.update(&txn).await.context("update_person failed")?;
        replace_links(&txn, id, &record.hobbies).await?;
        txn.commit().await.context("commit failed")?;

        self.find_person(id).await
    }

    async fn delete_person(&self, id: i32) -> anyhow::Result<bool> {
        let res = person::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete_person failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_hobbies(&self) -> anyhow::Result<Vec<Hobby>> {
        let rows = hobby::Entity::find()
            .order_by_asc(hobby::Column::Id)
            .all(&self.conn)
            .await
            .context("list_hobbies failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn existing_hobby_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<i32>> {
        let rows = hobby::Entity::find()
            .filter(hobby::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("existing_hobby_ids failed")?;
        Ok(rows.into_iter().map(|h| h.id).collect())
    }

    async fn insert_hobby(&self, hobby: String) -> anyhow::Result<Hobby> {
        let stored = hobby::ActiveModel {
            hobby: Set(hobby),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("insert_hobby failed")?;
        Ok(stored.into())
    }

    async fn list_reuniones(&self) -> anyhow::Result<Vec<Reunion>> {
        let rows = reunion::Entity::find()
            .order_by_asc(reunion::Column::Id)
            .all(&self.conn)
            .await
            .context("list_reuniones failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_reunion(&self, new_reunion: NewReunion) -> anyhow::Result<Reunion> {
        let stored = reunion::ActiveModel {
            fecha: Set(new_reunion.fecha),
            hora: Set(new_reunion.hora),
            asunto: Set(new_reunion.asunto),
            persona_id: Set(new_reunion.persona),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("insert_reunion failed")?;
        Ok(stored.into())
    }
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(contains_pattern("Ana"), "%Ana%");
        assert_eq!(contains_pattern("ÁLVARO"), "%ÁLVARO%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
