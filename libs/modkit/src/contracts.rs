use async_trait::async_trait;
use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::api::OpenApiRegistry;
use crate::context::ModuleCtx;

/// Core module: wiring only; the schema may not be migrated yet.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()>;
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Runs after init and before REST registration.
#[async_trait]
pub trait DbModule: Send + Sync {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()>;
}

/// Route registration. Sync; runs after migrations.
pub trait RestfulModule: Send + Sync {
    fn register_rest(
        &self,
        ctx: &ModuleCtx,
        router: Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<Router>;
}

/// The single module that owns the HTTP server.
///
/// `rest_prepare` runs before any [`RestfulModule`], `rest_finalize` after all of
/// them. Neither may start serving; that happens in [`StatefulModule::start`].
pub trait RestHostModule: Send + Sync + 'static {
    fn rest_prepare(&self, ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router>;

    fn rest_finalize(&self, ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router>;

    fn as_registry(&self) -> &dyn OpenApiRegistry;
}

/// Long-running work started after REST composition; stopped in reverse order.
#[async_trait]
pub trait StatefulModule: Send + Sync {
    async fn start(&self, cancel: CancellationToken) -> anyhow::Result<()>;
    async fn stop(&self, cancel: CancellationToken) -> anyhow::Result<()>;
}
