use crate::config::DexConfigSection;
use crate::execution::Runtime;
use crate::ledger::{InMemoryLedger, TokenLedger};
use crate::logic::{Factory, Router};
use std::sync::Arc;
use tracing::info;

/// A factory and a router sharing one runtime, wired from configuration.
#[derive(Debug)]
pub struct Dex<L> {
    config: DexConfigSection,
    runtime: Arc<Runtime<L>>,
    factory: Arc<Factory<L>>,
    router: Arc<Router<L>>,
}

impl<L: TokenLedger> Dex<L> {
    pub fn new(config: DexConfigSection, runtime: Arc<Runtime<L>>) -> Self {
        let factory = Arc::new(Factory::new(config.factory_address, config.pair_code_hash(), runtime.clone()));
        let router = Arc::new(Router::new(config.router_address, factory.clone()));
        info!(factory = %config.factory_address, router = %config.router_address, pair_code_hash = %config.pair_code_hash(), "Exchange ready");
        Self { config, runtime, factory, router }
    }

    pub fn config(&self) -> &DexConfigSection {
        &self.config
    }

    pub fn runtime(&self) -> &Arc<Runtime<L>> {
        &self.runtime
    }

    pub fn ledger(&self) -> &Arc<L> {
        self.runtime.ledger()
    }

    pub fn factory(&self) -> &Arc<Factory<L>> {
        &self.factory
    }

    pub fn router(&self) -> &Arc<Router<L>> {
        &self.router
    }
}

impl Dex<InMemoryLedger> {
    pub fn in_memory(config: DexConfigSection) -> Self {
        Self::new(config, Arc::new(Runtime::in_memory()))
    }
}

impl Default for Dex<InMemoryLedger> {
    fn default() -> Self {
        Self::in_memory(DexConfigSection::default())
    }
}
