use std::sync::Arc;

use anyhow::{anyhow, Context as _};
use modkit_db::DbHandle;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

pub use runtime::ConfigProvider;

/// Per-module view of the shared runtime resources.
///
/// The runner builds one base context and hands each module a copy scoped to
/// its own name, so `module_config` reads the right section.
#[derive(Clone)]
pub struct ModuleCtx {
    db: Option<Arc<DbHandle>>,
    config_provider: Option<Arc<dyn ConfigProvider>>,
    cancellation_token: CancellationToken,
    module_name: Option<Arc<str>>,
}

pub struct ModuleCtxBuilder {
    inner: ModuleCtx,
}

impl ModuleCtxBuilder {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            inner: ModuleCtx {
                db: None,
                config_provider: None,
                cancellation_token: token,
                module_name: None,
            },
        }
    }

    pub fn with_db(mut self, db: Arc<DbHandle>) -> Self {
        self.inner.db = Some(db);
        self
    }

    pub fn with_config_provider(mut self, p: Arc<dyn ConfigProvider>) -> Self {
        self.inner.config_provider = Some(p);
        self
    }

    /// Scope the context to a module up front (tests build contexts this way).
    pub fn for_module(mut self, name: &str) -> Self {
        self.inner.module_name = Some(Arc::from(name));
        self
    }

    pub fn build(self) -> ModuleCtx {
        self.inner
    }
}

impl ModuleCtx {
    pub(crate) fn scoped(&self, name: &str) -> Self {
        let mut ctx = self.clone();
        ctx.module_name = Some(Arc::from(name));
        ctx
    }

    pub fn db(&self) -> Option<Arc<DbHandle>> {
        self.db.clone()
    }

    pub fn db_required(&self) -> anyhow::Result<Arc<DbHandle>> {
        self.db.clone().ok_or_else(|| {
            anyhow!(
                "module '{}' requires a database but none is configured",
                self.current_module().unwrap_or("?")
            )
        })
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn current_module(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    /// Best-effort: the module's section deserialized into `T`, or `T::default()`
    /// when the section is missing. An invalid section is logged and ignored.
    pub fn module_config<T: DeserializeOwned + Default>(&self) -> T {
        let (Some(name), Some(p)) = (self.module_name.as_deref(), &self.config_provider) else {
            return T::default();
        };
        match p.get_module_config(name) {
            None => T::default(),
            Some(raw) => serde_json::from_value::<T>(raw.clone()).unwrap_or_else(|e| {
                tracing::warn!(module = name, error = %e, "invalid module config, using defaults");
                T::default()
            }),
        }
    }

    /// Strict variant of [`module_config`](Self::module_config).
    pub fn module_config_required<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let name = self
            .module_name
            .as_deref()
            .ok_or_else(|| anyhow!("context is not scoped to a module"))?;
        let raw = self
            .config_provider
            .as_ref()
            .ok_or_else(|| anyhow!("no ConfigProvider"))?
            .get_module_config(name)
            .ok_or_else(|| anyhow!("missing module config: {name}"))?;
        serde_json::from_value(raw.clone()).with_context(|| format!("invalid {name} config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    struct MapProvider(HashMap<String, serde_json::Value>);

    impl ConfigProvider for MapProvider {
        fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
            self.0.get(module_name)
        }
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct DemoCfg {
        #[serde(default)]
        limit: u32,
    }

    fn ctx_with(cfg: serde_json::Value, module: &str) -> ModuleCtx {
        let provider = MapProvider(HashMap::from([("demo".to_string(), cfg)]));
        ModuleCtxBuilder::new(CancellationToken::new())
            .with_config_provider(Arc::new(provider))
            .for_module(module)
            .build()
    }

    #[test]
    fn module_config_reads_scoped_section() {
        let ctx = ctx_with(json!({ "limit": 7 }), "demo");
        assert_eq!(ctx.module_config::<DemoCfg>(), DemoCfg { limit: 7 });
        assert_eq!(
            ctx.module_config_required::<DemoCfg>().unwrap(),
            DemoCfg { limit: 7 }
        );
    }

    #[test]
    fn module_config_falls_back_to_default() {
        let ctx = ctx_with(json!({ "limit": "many" }), "demo");
        assert_eq!(ctx.module_config::<DemoCfg>(), DemoCfg::default());
        let err = ctx.module_config_required::<DemoCfg>().unwrap_err();
        assert!(err.to_string().contains("invalid demo config"));

        let other = ctx_with(json!({ "limit": 1 }), "other");
        assert_eq!(other.module_config::<DemoCfg>(), DemoCfg::default());
        assert!(other.module_config_required::<DemoCfg>().is_err());
    }

    #[test]
    fn db_required_reports_module() {
        let ctx = ctx_with(json!({}), "demo");
        let err = ctx.db_required().unwrap_err();
        assert!(err.to_string().contains("demo"));
    }
}
