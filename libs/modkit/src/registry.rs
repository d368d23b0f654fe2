use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::context::ModuleCtx;
use crate::contracts::{DbModule, Module, RestHostModule, RestfulModule, StatefulModule};

/// One registered module with the capabilities it provides.
pub struct ModuleEntry {
    pub name: &'static str,
    pub deps: &'static [&'static str],
    pub core: Arc<dyn Module>,
    pub db: Option<Arc<dyn DbModule>>,
    pub rest: Option<Arc<dyn RestfulModule>>,
    pub rest_host: Option<Arc<dyn RestHostModule>>,
    pub stateful: Option<Arc<dyn StatefulModule>>,
}

impl std::fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("db", &self.db.is_some())
            .field("rest", &self.rest.is_some())
            .field("rest_host", &self.rest_host.is_some())
            .field("stateful", &self.stateful.is_some())
            .finish()
    }
}

/// Submitted by each module crate with `inventory::submit!`.
pub struct Registrator(pub fn(&mut RegistryBuilder));

inventory::collect!(Registrator);

/// Modules in dependency order.
pub struct ModuleRegistry {
    modules: Vec<ModuleEntry>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.modules.iter().map(|m| m.name))
            .finish()
    }
}

impl ModuleRegistry {
    pub fn modules(&self) -> &[ModuleEntry] {
        &self.modules
    }

    /// Feed every linked [`Registrator`] into a builder and sort the result.
    pub fn discover_and_build() -> Result<Self, RegistryError> {
        let mut b = RegistryBuilder::default();
        for r in inventory::iter::<Registrator> {
            (r.0)(&mut b);
        }
        b.build_topo_sorted()
    }

    pub async fn run_init_phase(&self, base_ctx: &ModuleCtx) -> Result<(), RegistryError> {
        for e in &self.modules {
            tracing::debug!(module = e.name, "init");
            e.core
                .init(&base_ctx.scoped(e.name))
                .await
                .map_err(|source| RegistryError::Init {
                    module: e.name,
                    source,
                })?;
        }
        Ok(())
    }

    pub async fn run_db_phase(&self, db: &modkit_db::DbHandle) -> Result<(), RegistryError> {
        for e in &self.modules {
            let Some(dbm) = &e.db else { continue };
            tracing::debug!(module = e.name, "migrate");
            dbm.migrate(db)
                .await
                .map_err(|source| RegistryError::DbMigrate {
                    module: e.name,
                    source,
                })?;
        }
        Ok(())
    }

    /// Host prepare → every REST provider in dependency order → host finalize.
    pub fn run_rest_phase(
        &self,
        base_ctx: &ModuleCtx,
        router: Router,
    ) -> Result<Router, RegistryError> {
        let Some(host_entry) = self.modules.iter().find(|e| e.rest_host.is_some()) else {
            return if self.modules.iter().any(|e| e.rest.is_some()) {
                Err(RegistryError::RestRequiresHost)
            } else {
                Ok(router)
            };
        };
        let Some(host) = host_entry.rest_host.as_ref() else {
            return Err(RegistryError::RestRequiresHost);
        };
        let host_ctx = base_ctx.scoped(host_entry.name);
        let openapi = host.as_registry();

        let mut router = host
            .rest_prepare(&host_ctx, router)
            .map_err(|source| RegistryError::RestPrepare {
                module: host_entry.name,
                source,
            })?;

        for e in &self.modules {
            let Some(rest) = &e.rest else { continue };
            router = rest
                .register_rest(&base_ctx.scoped(e.name), router, openapi)
                .map_err(|source| RegistryError::RestRegister {
                    module: e.name,
                    source,
                })?;
        }

        host.rest_finalize(&host_ctx, router)
            .map_err(|source| RegistryError::RestFinalize {
                module: host_entry.name,
                source,
            })
    }

    pub async fn run_start_phase(&self, cancel: CancellationToken) -> Result<(), RegistryError> {
        for e in &self.modules {
            let Some(s) = &e.stateful else { continue };
            s.start(cancel.clone())
                .await
                .map_err(|source| RegistryError::Start {
                    module: e.name,
                    source,
                })?;
        }
        Ok(())
    }

    /// Reverse order; failures are logged so every module gets a chance to stop.
    pub async fn run_stop_phase(&self, cancel: CancellationToken) {
        for e in self.modules.iter().rev() {
            let Some(s) = &e.stateful else { continue };
            if let Err(err) = s.stop(cancel.clone()).await {
                tracing::warn!(module = e.name, error = %err, "failed to stop module");
            }
        }
    }
}

#[derive(Default)]
struct Pending {
    deps: &'static [&'static str],
    core: Option<Arc<dyn Module>>,
    db: Option<Arc<dyn DbModule>>,
    rest: Option<Arc<dyn RestfulModule>>,
    rest_host: Option<Arc<dyn RestHostModule>>,
    stateful: Option<Arc<dyn StatefulModule>>,
}

/// Collects registrations; problems are recorded and reported by `build_topo_sorted`.
#[derive(Default)]
pub struct RegistryBuilder {
    pending: BTreeMap<&'static str, Pending>,
    host: Option<&'static str>,
    errors: Vec<String>,
}

impl RegistryBuilder {
    pub fn register_core(
        &mut self,
        name: &'static str,
        deps: &'static [&'static str],
        m: Arc<dyn Module>,
    ) {
        let slot = self.pending.entry(name).or_default();
        if slot.core.is_some() {
            self.errors
                .push(format!("Module '{name}' is already registered"));
            return;
        }
        slot.core = Some(m);
        slot.deps = deps;
    }

    pub fn register_db(&mut self, name: &'static str, m: Arc<dyn DbModule>) {
        self.pending.entry(name).or_default().db = Some(m);
    }

    pub fn register_rest(&mut self, name: &'static str, m: Arc<dyn RestfulModule>) {
        self.pending.entry(name).or_default().rest = Some(m);
    }

    pub fn register_rest_host(&mut self, name: &'static str, m: Arc<dyn RestHostModule>) {
        if let Some(existing) = self.host {
            self.errors.push(format!(
                "Multiple REST host modules detected: '{existing}' and '{name}'"
            ));
            return;
        }
        self.host = Some(name);
        self.pending.entry(name).or_default().rest_host = Some(m);
    }

    pub fn register_stateful(&mut self, name: &'static str, m: Arc<dyn StatefulModule>) {
        self.pending.entry(name).or_default().stateful = Some(m);
    }

    /// Validate registrations and order modules so dependencies come first.
    ///
    /// Ties are broken by name, which keeps the order stable across runs.
    pub fn build_topo_sorted(self) -> Result<ModuleRegistry, RegistryError> {
        if !self.errors.is_empty() {
            return Err(RegistryError::InvalidRegistryConfiguration {
                errors: self.errors,
            });
        }

        // A capability without a core registration is a wiring bug in that crate.
        if let Some((name, _)) = self.pending.iter().find(|(_, p)| p.core.is_none()) {
            return Err(RegistryError::UnknownModule((*name).to_string()));
        }

        let names: Vec<&'static str> = self.pending.keys().copied().collect();
        let index = |n: &str| names.iter().position(|&x| x == n);

        // dependents[d] lists modules that must come after d
        let mut dependents = vec![Vec::<usize>::new(); names.len()];
        let mut indeg = vec![0usize; names.len()];
        for (u, (&name, p)) in self.pending.iter().enumerate() {
            for &dep in p.deps {
                let v = index(dep).ok_or_else(|| RegistryError::UnknownDependency {
                    module: name.to_string(),
                    depends_on: dep.to_string(),
                })?;
                dependents[v].push(u);
                indeg[u] += 1;
            }
        }

        let mut queue: VecDeque<usize> = (0..names.len()).filter(|&i| indeg[i] == 0).collect();
        let mut order = Vec::with_capacity(names.len());
        while let Some(u) = queue.pop_front() {
            order.push(u);
            for &w in &dependents[u] {
                indeg[w] -= 1;
                if indeg[w] == 0 {
                    queue.push_back(w);
                }
            }
        }

        if order.len() < names.len() {
            return Err(RegistryError::CycleDetected {
                path: self.cycle_path(&names, &indeg),
            });
        }

        let mut pending = self.pending;
        let modules: Vec<ModuleEntry> = order
            .into_iter()
            .filter_map(|i| {
                let name = names[i];
                let p = pending.remove(name)?;
                Some(ModuleEntry {
                    name,
                    deps: p.deps,
                    core: p.core?,
                    db: p.db,
                    rest: p.rest,
                    rest_host: p.rest_host,
                    stateful: p.stateful,
                })
            })
            .collect();

        tracing::info!(
            modules = ?modules.iter().map(|e| e.name).collect::<Vec<_>>(),
            "module dependency order resolved"
        );
        Ok(ModuleRegistry { modules })
    }

    /// Every module Kahn's pass could not emit still waits on another such
    /// module, so walking dependencies from any of them must revisit a node.
    fn cycle_path(&self, names: &[&'static str], indeg: &[usize]) -> Vec<&'static str> {
        let stuck = |n: &str| names.iter().position(|&x| x == n).is_some_and(|i| indeg[i] > 0);

        let Some(mut current) = names.iter().copied().find(|&n| stuck(n)) else {
            return Vec::new();
        };
        let mut path: Vec<&'static str> = Vec::new();
        loop {
            if let Some(start) = path.iter().position(|&n| n == current) {
                let mut cycle = path.split_off(start);
                cycle.push(current);
                return cycle;
            }
            path.push(current);
            let next = self
                .pending
                .get(current)
                .and_then(|p| p.deps.iter().copied().find(|&d| stuck(d)));
            match next {
                Some(n) => current = n,
                None => return path,
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("initialization failed for module '{module}'")]
    Init {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("DB migration failed for module '{module}'")]
    DbMigrate {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST prepare failed for host module '{module}'")]
    RestPrepare {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST registration failed for module '{module}'")]
    RestRegister {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST finalize failed for host module '{module}'")]
    RestFinalize {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("start failed for '{module}'")]
    Start {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("modules with REST routes found, but no REST host module is registered")]
    RestRequiresHost,

    #[error("unknown module '{0}'")]
    UnknownModule(String),
    #[error("module '{module}' depends on unknown '{depends_on}'")]
    UnknownDependency { module: String, depends_on: String },
    #[error("cyclic dependency detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<&'static str> },
    #[error("invalid registry configuration:\n{errors:#?}")]
    InvalidRegistryConfiguration { errors: Vec<String> },
}
