use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::{Module, ModuleCtx, RestfulModule};
use tracing::info;

use crate::api::rest::routes;
use crate::domain::service::Service;

#[derive(Default)]
pub struct UsersModule {
    service: ArcSwapOption<Service>,
}

#[async_trait]
impl Module for UsersModule {
    async fn init(&self, _ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing users module");
        self.service.store(Some(Arc::new(Service)));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestfulModule for UsersModule {
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
        info!("Users REST routes registered");
        Ok(router)
    }
}

inventory::submit! {
    modkit::Registrator(|b| {
        let m = Arc::new(UsersModule::default());
        b.register_core("users", &["api_ingress"], m.clone());
        b.register_rest("users", m);
    })
}
