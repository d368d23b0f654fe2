use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::links::LinkBuilder;
use crate::api::rest::routes;
use crate::config::AgendaConfig;
use crate::contract::client::AgendaApi;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::AgendaLocalClient;
use crate::infra::storage::sea_orm_repo::SeaOrmAgendaRepository;

#[derive(Default)]
pub struct AgendaModule {
    service: ArcSwapOption<Service>,
    config: ArcSwap<AgendaConfig>,
}

impl AgendaModule {
    /// In-process client; `None` until the module is initialized.
    pub fn client(&self) -> Option<Arc<dyn AgendaApi>> {
        let service = self.service.load_full()?;
        Some(Arc::new(AgendaLocalClient::new(service)))
    }
}

#[async_trait]
impl Module for AgendaModule {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing agenda module");

        let cfg: AgendaConfig = ctx.module_config();
        debug!(
            public_base_url = ?cfg.public_base_url,
            max_search_keyword_length = cfg.max_search_keyword_length,
            "Loaded agenda config"
        );

        let db = ctx.db_required()?;
        let repo = SeaOrmAgendaRepository::new(db.sea());
        let service = Service::new(
            Arc::new(repo),
            ServiceConfig {
                max_search_keyword_length: cfg.max_search_keyword_length,
            },
        );
        self.service.store(Some(Arc::new(service)));
        self.config.store(Arc::new(cfg));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[async_trait]
impl DbModule for AgendaModule {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running agenda database migrations");
        crate::infra::storage::migrations::Migrator::up(db.seaorm(), None).await?;
        Ok(())
    }
}

impl RestfulModule for AgendaModule {
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
        let cfg = self.config.load();
        let links = Arc::new(
            LinkBuilder::new(cfg.public_base_url.clone())
                .with_allowed_hosts(cfg.allowed_hosts.clone()),
        );

        let router = routes::register_routes(router, openapi, service, links)?;
        info!("Agenda REST routes registered");
        Ok(router)
    }
}

inventory::submit! {
    modkit::Registrator(|b| {
        let m = Arc::new(AgendaModule::default());
        b.register_core("agenda", &["api_ingress"], m.clone());
        b.register_db("agenda", m.clone());
        b.register_rest("agenda", m);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::PersonInput;
    use modkit::ModuleCtxBuilder;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn client_is_available_after_init() {
        let module = AgendaModule::default();
        assert!(module.client().is_none());

        let db = Arc::new(
            modkit_db::DbHandle::connect("sqlite::memory:", Default::default())
                .await
                .unwrap(),
        );
        let ctx = ModuleCtxBuilder::new(CancellationToken::new())
            .with_db(db.clone())
            .for_module("agenda")
            .build();
        module.init(&ctx).await.unwrap();
        module.migrate(&db).await.unwrap();

        let client = module.client().expect("client after init");
        let person = client
            .create_person(PersonInput {
                full_name: Some("Ana Torres".into()),
                job: Some("Engineer".into()),
                email: Some(String::new()),
                phone: Some("555-0100".into()),
                hobbies: None,
            })
            .await
            .unwrap();
        assert_eq!(person.id, 1);
        assert_eq!(client.search_persons("TORR").await.unwrap().len(), 1);
    }

    #[test]
    fn rest_registration_requires_init() {
        struct NoopRegistry;
        impl OpenApiRegistry for NoopRegistry {
            fn register_operation(&self, _spec: &modkit::api::OperationSpec) {}
            fn ensure_schema_raw(
                &self,
                name: &str,
                _schemas: Vec<(String, utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>)>,
            ) -> String {
                name.to_string()
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        let module = AgendaModule::default();
        let ctx = ModuleCtxBuilder::new(CancellationToken::new()).build();
        assert!(module
            .register_rest(&ctx, axum::Router::new(), &NoopRegistry)
            .is_err());
    }
}
