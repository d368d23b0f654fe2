//! ModKit runtime runner.
//!
//! One base [`ModuleCtx`](crate::ModuleCtx) is built up front and reused,
//! scoped per module, across init → db → rest → start → wait → stop.

use std::{future::Future, pin::Pin, sync::Arc};

use modkit_db::DbHandle;
use tokio_util::sync::CancellationToken;

use crate::context::{ConfigProvider, ModuleCtxBuilder};
use crate::registry::ModuleRegistry;
use crate::runtime::shutdown;

/// Builds the shared database handle once, before any module is initialized.
pub type DbFactory = Box<
    dyn FnOnce() -> Pin<Box<dyn Future<Output = anyhow::Result<Arc<DbHandle>>> + Send>> + Send,
>;

/// How the runtime should provide a DB to modules.
pub enum DbOptions {
    /// `ModuleCtx::db()` is `None`; the db phase is skipped.
    None,
    /// Connect through the factory; every module shares the handle.
    Auto(DbFactory),
}

impl DbOptions {
    /// Wrap an async connect closure as [`DbOptions::Auto`].
    pub fn auto<F, Fut>(connect: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Arc<DbHandle>>> + Send + 'static,
    {
        DbOptions::Auto(Box::new(
            move || -> Pin<Box<dyn Future<Output = anyhow::Result<Arc<DbHandle>>> + Send>> {
                Box::pin(connect())
            },
        ))
    }
}

/// How the runtime should decide when to stop.
pub enum ShutdownOptions {
    /// Ctrl+C / SIGTERM.
    Signals,
    /// An external token controls the lifecycle.
    Token(CancellationToken),
    /// Shut down when the future completes.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

pub struct RunOptions {
    /// Module config sections keyed by module name.
    pub modules_cfg: Arc<dyn ConfigProvider>,
    pub db: DbOptions,
    pub shutdown: ShutdownOptions,
}

/// Discover linked modules and run them until shutdown.
pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let registry = ModuleRegistry::discover_and_build()?;
    run_registry(&registry, opts).await
}

pub(crate) async fn run_registry(registry: &ModuleRegistry, opts: RunOptions) -> anyhow::Result<()> {
    let cancel = match &opts.shutdown {
        ShutdownOptions::Token(t) => t.clone(),
        _ => CancellationToken::new(),
    };
    spawn_shutdown_waiter(opts.shutdown, cancel.clone());

    let db = match opts.db {
        DbOptions::Auto(factory) => Some(factory().await?),
        DbOptions::None => None,
    };

    let mut ctx_builder =
        ModuleCtxBuilder::new(cancel.clone()).with_config_provider(opts.modules_cfg);
    if let Some(db) = &db {
        ctx_builder = ctx_builder.with_db(db.clone());
    }
    let base_ctx = ctx_builder.build();

    tracing::info!("Phase: init");
    registry.run_init_phase(&base_ctx).await?;

    if let Some(db) = &db {
        tracing::info!(engine = ?db.engine(), "Phase: db");
        registry.run_db_phase(db).await?;
    }

    tracing::info!("Phase: rest");
    // The REST host keeps the finalized router.
    let _ = registry.run_rest_phase(&base_ctx, axum::Router::new())?;

    tracing::info!("Phase: start");
    registry.run_start_phase(cancel.clone()).await?;

    cancel.cancelled().await;

    tracing::info!("Phase: stop");
    registry.run_stop_phase(cancel).await;
    Ok(())
}

fn spawn_shutdown_waiter(shutdown: ShutdownOptions, cancel: CancellationToken) {
    match shutdown {
        ShutdownOptions::Signals => {
            tokio::spawn(async move {
                if let Err(e) = shutdown::wait_for_shutdown().await {
                    tracing::warn!(error = %e, "signal listener failed; falling back to ctrl_c()");
                    let _ = tokio::signal::ctrl_c().await;
                }
                tracing::info!("shutdown: signal received");
                cancel.cancel();
            });
        }
        ShutdownOptions::Future(waiter) => {
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown: external future completed");
                cancel.cancel();
            });
        }
        ShutdownOptions::Token(_) => {
            tracing::debug!("shutdown: external token controls lifecycle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ModuleCtx;
    use crate::contracts::{DbModule, Module, StatefulModule};
    use crate::registry::RegistryBuilder;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct NoConfig;

    impl ConfigProvider for NoConfig {
        fn get_module_config(&self, _module_name: &str) -> Option<&serde_json::Value> {
            None
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Module for Recorder {
        async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
            let has_db = ctx.db().is_some();
            self.events.lock().push(format!("init db={has_db}"));
            Ok(())
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[async_trait::async_trait]
    impl DbModule for Recorder {
        async fn migrate(&self, _db: &DbHandle) -> anyhow::Result<()> {
            self.events.lock().push("migrate".into());
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl StatefulModule for Recorder {
        async fn start(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
            self.events.lock().push("start".into());
            Ok(())
        }
        async fn stop(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
            self.events.lock().push("stop".into());
            Ok(())
        }
    }

    fn registry_with(m: Arc<Recorder>) -> ModuleRegistry {
        let mut b = RegistryBuilder::default();
        b.register_core("rec", &[], m.clone());
        b.register_db("rec", m.clone());
        b.register_stateful("rec", m);
        b.build_topo_sorted().unwrap()
    }

    #[tokio::test]
    async fn phases_run_in_order_with_db() {
        let rec = Arc::new(Recorder::default());
        let registry = registry_with(rec.clone());

        let db = DbOptions::auto(|| async {
            let db = DbHandle::connect("sqlite::memory:", Default::default()).await?;
            Ok::<_, anyhow::Error>(Arc::new(db))
        });

        let opts = RunOptions {
            modules_cfg: Arc::new(NoConfig),
            db,
            shutdown: ShutdownOptions::Future(Box::pin(tokio::time::sleep(
                Duration::from_millis(20),
            ))),
        };
        run_registry(&registry, opts).await.unwrap();

        assert_eq!(
            *rec.events.lock(),
            vec!["init db=true", "migrate", "start", "stop"]
        );
    }

    #[tokio::test]
    async fn without_db_the_migration_phase_is_skipped() {
        let rec = Arc::new(Recorder::default());
        let registry = registry_with(rec.clone());

        let token = CancellationToken::new();
        token.cancel();
        let opts = RunOptions {
            modules_cfg: Arc::new(NoConfig),
            db: DbOptions::None,
            shutdown: ShutdownOptions::Token(token),
        };
        run_registry(&registry, opts).await.unwrap();

        assert_eq!(*rec.events.lock(), vec!["init db=false", "start", "stop"]);
    }

    #[tokio::test]
    async fn factory_failure_aborts_before_init() {
        let rec = Arc::new(Recorder::default());
        let registry = registry_with(rec.clone());

        let opts = RunOptions {
            modules_cfg: Arc::new(NoConfig),
            db: DbOptions::auto(|| async { anyhow::bail!("no database") }),
            shutdown: ShutdownOptions::Token(CancellationToken::new()),
        };
        let err = run_registry(&registry, opts).await.unwrap_err();

        assert!(err.to_string().contains("no database"));
        assert!(rec.events.lock().is_empty());
    }
}
