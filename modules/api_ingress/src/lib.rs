//! REST host module: owns the HTTP server, the global middleware stack and the
//! OpenAPI document collected from every other module's operations.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::http::Method;
use axum::{middleware::from_fn, routing::get, Router};
use dashmap::DashMap;
use modkit::api::{OpenApiRegistry, OperationSpec};
use modkit::{ModuleCtx, RestHostModule, StatefulModule};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::openapi::{schema::Schema, RefOr};

mod config;
mod model;
mod openapi;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use openapi::OpenApi;

use model::{ComponentsRegistry, Registered};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;
const STOP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    components_registry: ArcSwap<ComponentsRegistry>,
    // Finalized router from the REST phase, taken by `start`.
    final_router: Mutex<Option<Router>>,
    server: Mutex<Option<JoinHandle<Result<()>>>>,

    // Duplicate detection (per (method, path) and per handler id)
    registered_routes: DashMap<(Method, String), ()>,
    registered_handlers: DashMap<String, ()>,

    operation_specs: DashMap<String, OperationSpec>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            components_registry: ArcSwap::from_pointee(ComponentsRegistry::default()),
            final_router: Mutex::new(None),
            server: Mutex::new(None),
            registered_routes: DashMap::new(),
            registered_handlers: DashMap::new(),
            operation_specs: DashMap::new(),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Health endpoints plus the middleware stack, for when no REST phase ran.
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            .route("/healthz", get(web::liveness))
            .route("/health", get(web::health_check));
        self.apply_layers(router)
    }

    /// Global layers. Request order, outermost first: set request id (nanoid when
    /// missing) → propagate it to the response → push to extensions and span →
    /// trace → timeout → CORS (optional) → body limit.
    fn apply_layers(&self, mut router: Router) -> Router {
        let config = self.get_config();
        let x_request_id = request_id::header();

        // Router::layer wraps what is already there, so add innermost first.
        router = router.layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));
        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router = router.layer(TimeoutLayer::new(REQUEST_TIMEOUT));
        router = router.layer(request_id::create_trace_layer());
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    /// Build the OpenAPI document from everything registered so far.
    pub fn build_openapi(&self) -> Result<OpenApi> {
        let components = self.components_registry.load();
        let specs: Vec<OperationSpec> = self
            .operation_specs
            .iter()
            .map(|e| e.value().clone())
            .collect();
        tracing::info!(operations = specs.len(), "Building OpenAPI document");
        openapi::build_document(&specs, &components)
    }

    async fn wait_for_server(&self) -> Result<()> {
        let Some(handle) = self.server.lock().take() else {
            return Ok(());
        };
        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(joined) => joined?,
            Err(_) => {
                tracing::warn!("HTTP server did not stop within {:?}", STOP_TIMEOUT);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl modkit::Module for ApiIngress {
    async fn init(&self, ctx: &ModuleCtx) -> Result<()> {
        let cfg = ctx.module_config::<ApiIngressConfig>();
        tracing::debug!(bind_addr = %cfg.bind_addr, enable_docs = cfg.enable_docs, "api_ingress config loaded");
        self.config.store(Arc::new(cfg));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestHostModule for ApiIngress {
    fn rest_prepare(&self, _ctx: &ModuleCtx, router: Router) -> Result<Router> {
        let router = router
            .route("/healthz", get(web::liveness))
            .route("/health", get(web::health_check));
        tracing::debug!("REST host prepared base router with health checks");
        Ok(router)
    }

    fn rest_finalize(&self, _ctx: &ModuleCtx, mut router: Router) -> Result<Router> {
        if self.get_config().enable_docs {
            // Rendered once; every request gets the same bytes.
            let doc = Arc::new(serde_json::to_value(self.build_openapi()?)?);
            router = router
                .route(
                    "/openapi.json",
                    get(move || {
                        let doc = doc.clone();
                        async move {
                            use axum::{http::header, response::IntoResponse};
                            (
                                [(header::CACHE_CONTROL, "no-store")],
                                axum::Json((*doc).clone()),
                            )
                                .into_response()
                        }
                    }),
                )
                .route("/docs", get(web::serve_docs));
        }

        let router = self.apply_layers(router);
        *self.final_router.lock() = Some(router.clone());
        tracing::debug!("REST host finalized router");
        Ok(router)
    }

    fn as_registry(&self) -> &dyn OpenApiRegistry {
        self
    }
}

#[async_trait]
impl StatefulModule for ApiIngress {
    /// Bind the listener and serve in the background until `cancel` fires.
    async fn start(&self, cancel: CancellationToken) -> Result<()> {
        let cfg = self.get_config();
        let addr: SocketAddr = cfg
            .bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", cfg.bind_addr, e))?;

        let stored = self.final_router.lock().take();
        let router = match stored {
            Some(r) => r,
            None => {
                tracing::debug!("No router from REST phase, serving health endpoints only");
                self.build_router()
            }
        };

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server bound on {}", listener.local_addr()?);

        let handle = tokio::spawn(async move {
            let shutdown = async move {
                cancel.cancelled().await;
                tracing::info!("HTTP server shutting down gracefully");
            };
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
                .map_err(anyhow::Error::from)
        });
        *self.server.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self, _cancel: CancellationToken) -> Result<()> {
        self.wait_for_server().await
    }
}

impl OpenApiRegistry for ApiIngress {
    fn register_operation(&self, spec: &OperationSpec) {
        // First registration wins; a second one is a programming error.
        if self
            .registered_handlers
            .insert(spec.handler_id.clone(), ())
            .is_some()
        {
            tracing::error!(
                handler_id = %spec.handler_id,
                "Duplicate handler_id detected; ignoring subsequent registration"
            );
            return;
        }
        if self
            .registered_routes
            .insert((spec.method.clone(), spec.path.clone()), ())
            .is_some()
        {
            tracing::error!(
                method = %spec.method,
                path = %spec.path,
                "Duplicate (method, path) detected; ignoring subsequent registration"
            );
            return;
        }

        self.operation_specs
            .insert(spec.handler_id.clone(), spec.clone());
        tracing::debug!(
            method = %spec.method,
            path = %spec.path,
            total_operations = self.operation_specs.len(),
            "Registered API operation"
        );
    }

    fn ensure_schema_raw(&self, name: &str, schemas: Vec<(String, RefOr<Schema>)>) -> String {
        self.components_registry.rcu(|current| {
            let mut reg = (**current).clone();
            for (key, schema) in schemas.iter().cloned() {
                if reg.register_schema(key.clone(), schema) == Registered::Conflict {
                    tracing::error!(
                        key = %key,
                        "Conflicting schema content under the same component name; keeping the first"
                    );
                }
            }
            reg
        });
        name.to_string()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

inventory::submit! {
    modkit::Registrator(|b| {
        let m = Arc::new(ApiIngress::default());
        b.register_core("api_ingress", &[], m.clone());
        b.register_rest_host("api_ingress", m.clone());
        b.register_stateful("api_ingress", m);
    })
}
