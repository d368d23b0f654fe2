//! SeaORM adapter for [`TodosRepository`].

use anyhow::Context;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};

use crate::contract::model::{NewTodo, Todo};
use crate::domain::repo::TodosRepository;
use crate::infra::storage::entity::{ActiveModel as TodoAM, Column, Entity as TodoEntity};

/// Generic over the connection so a transaction can be passed instead of the pool.
pub struct SeaOrmTodosRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmTodosRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> TodosRepository for SeaOrmTodosRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Todo>> {
        let found = TodoEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, new_todo: NewTodo) -> anyhow::Result<Todo> {
        let m = TodoAM {
            title: Set(new_todo.title),
            body: Set(new_todo.body),
            ..Default::default()
        };
        let stored = m.insert(&self.conn).await.context("insert failed")?;
        Ok(stored.into())
    }

    async fn list(&self) -> anyhow::Result<Vec<Todo>> {
        let rows = TodoEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await
            .context("list failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
