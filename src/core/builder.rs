use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{
    context::{Shared, TickHook, UiContext},
    executor::SerializedExecutor,
    ui_main::UiMain,
};
use crate::{
    config::Config,
    error::RuntimeError,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
    subsystem::Subsystem,
};

/// Builder for constructing a [`UiMain`] with optional features.
pub struct UiMainBuilder<S: Subsystem, F> {
    cfg: Config,
    factory: F,
    subscribers: Vec<Arc<dyn Subscribe>>,
    on_tick: Option<TickHook<S>>,
}

impl<S, F> UiMainBuilder<S, F>
where
    S: Subsystem,
    F: FnOnce() -> S + Send + 'static,
{
    /// Creates a new builder with the default configuration.
    pub fn new(factory: F) -> Self {
        Self {
            cfg: Config::default(),
            factory,
            subscribers: Vec::new(),
            on_tick: None,
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers are called synchronously on the publishing thread.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Attaches application work to the periodic task.
    ///
    /// The hook runs on the worker, serialized with scheduled closures, with
    /// the tick counter (starting at 1). Ignored when `Config::periodic` is zero.
    pub fn on_tick<H>(mut self, hook: H) -> Self
    where
        H: FnMut(&mut S, u64) + Send + 'static,
    {
        self.on_tick = Some(Box::new(hook));
        self
    }

    /// Spawns the worker thread and returns the handle.
    ///
    /// The subsystem is constructed on the worker but not initialized until
    /// [`UiMain::initialize`] is called.
    pub fn build(self) -> Result<UiMain<S>, RuntimeError> {
        let bus = Bus::new(
            self.cfg.bus_capacity_clamped(),
            SubscriberSet::new(self.subscribers),
        );
        let token = CancellationToken::new();
        let thread_name = self.cfg.thread_name.clone();
        let shared = Arc::new(Shared::new(self.cfg, bus.clone(), token.clone()));

        let ctx_shared = Arc::clone(&shared);
        let factory = self.factory;
        let on_tick = self.on_tick;
        let executor = SerializedExecutor::start(&thread_name, bus, token, move || {
            UiContext::new(ctx_shared, factory(), on_tick)
        })?;

        Ok(UiMain::from_parts(shared, executor))
    }
}
