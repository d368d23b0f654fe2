use std::sync::Arc;

use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::TodosConfig;
use crate::contract::client::TodosApi;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::TodosLocalClient;
use crate::infra::storage::sea_orm_repo::SeaOrmTodosRepository;

#[derive(Default)]
pub struct TodosModule {
    service: arc_swap::ArcSwapOption<Service>,
}

impl TodosModule {
    /// In-process client; `None` until the module is initialized.
    pub fn client(&self) -> Option<Arc<dyn TodosApi>> {
        let service = self.service.load_full()?;
        Some(Arc::new(TodosLocalClient::new(service)))
    }
}

#[async_trait]
impl Module for TodosModule {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing todos module");

        let cfg: TodosConfig = ctx.module_config();
        debug!(max_title_length = cfg.max_title_length, "Loaded todos config");

        let db = ctx.db_required()?;
        let repo = SeaOrmTodosRepository::new(db.sea());
        let service = Service::new(
            Arc::new(repo),
            ServiceConfig {
                max_title_length: cfg.max_title_length,
            },
        );
        self.service.store(Some(Arc::new(service)));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[async_trait]
impl DbModule for TodosModule {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running todos database migrations");
        crate::infra::storage::migrations::Migrator::up(db.seaorm(), None).await?;
        Ok(())
    }
}

impl RestfulModule for TodosModule {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        let service = self
            .service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;

        let router = routes::register_routes(router, openapi, service)?;
        info!("Todos REST routes registered");
        Ok(router)
    }
}

inventory::submit! {
    modkit::Registrator(|b| {
        let m = Arc::new(TodosModule::default());
        b.register_core("todos", &["api_ingress"], m.clone());
        b.register_db("todos", m.clone());
        b.register_rest("todos", m);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::NewTodo;
    use modkit::ModuleCtxBuilder;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn client_is_available_after_init() {
        let module = TodosModule::default();
        assert!(module.client().is_none());

        let db = Arc::new(
            modkit_db::DbHandle::connect("sqlite::memory:", Default::default())
                .await
                .unwrap(),
        );
        let ctx = ModuleCtxBuilder::new(CancellationToken::new())
            .with_db(db.clone())
            .for_module("todos")
            .build();
        module.init(&ctx).await.unwrap();
        module.migrate(&db).await.unwrap();

        let client = module.client().expect("client after init");
        let todo = client
            .create_todo(NewTodo {
                title: "first todo".into(),
                body: "a body here".into(),
            })
            .await
            .unwrap();
        assert_eq!(todo.id, 1);
    }

    #[tokio::test]
    async fn init_without_database_fails() {
        let module = TodosModule::default();
        let ctx = ModuleCtxBuilder::new(CancellationToken::new()).build();
        assert!(module.init(&ctx).await.is_err());
    }
}
