#![allow(dead_code)]

pub mod strategies;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tasker_hooks::hooks::{
    CallerIdentity, CallerResolver, HandlerResult, HookEvent, Observer, ObserverContext,
};
use tasker_hooks::orchestration::ChainOrchestrator;
use tasker_hooks::registry::ChainRegistry;
use tokio::sync::Notify;

/// Event used by every integration test
#[derive(Debug, Clone)]
pub struct TestEvent {
    pub hook_point: &'static str,
    pub bypassable: bool,
}

impl TestEvent {
    pub fn new(hook_point: &'static str) -> Self {
        Self {
            hook_point,
            bypassable: true,
        }
    }

    pub fn not_bypassable(hook_point: &'static str) -> Self {
        Self {
            hook_point,
            bypassable: false,
        }
    }
}

impl HookEvent for TestEvent {
    fn hook_point(&self) -> &str {
        self.hook_point
    }

    fn bypassable(&self) -> bool {
        self.bypassable
    }
}

/// Shared, ordered record of what the observers did
#[derive(Debug, Clone, Default)]
pub struct VisitLog(Arc<Mutex<Vec<String>>>);

impl VisitLog {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Per-observer environment
#[derive(Debug)]
pub struct TestEnv {
    pub label: String,
    pub log: VisitLog,
}

pub type TestRegistry = ChainRegistry<TestEvent, TestEnv>;
pub type TestOrchestrator = ChainOrchestrator<TestEvent, TestEnv>;

/// What a [`ScriptedObserver`] does once it has recorded its visit
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Pass,
    Bypass,
    Complete,
    BypassAndComplete,
    Fail,
    Panic,
    /// Record `caller=<name>` (or `caller=-`) into the log
    ReadCaller,
}

pub struct ScriptedObserver {
    name: String,
    step: Step,
}

impl ScriptedObserver {
    pub fn new(name: impl Into<String>, step: Step) -> Self {
        Self {
            name: name.into(),
            step,
        }
    }
}

#[async_trait]
impl Observer<TestEvent, TestEnv> for ScriptedObserver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_event(&self, ctx: &mut ObserverContext<TestEnv>, _event: &TestEvent) -> HandlerResult {
        let log = match ctx.environment() {
            Some(env) => env.log.clone(),
            None => anyhow::bail!("{} ran without an environment", self.name),
        };
        log.record(self.name.clone());

        match self.step {
            Step::Pass => {}
            Step::Bypass => ctx.bypass()?,
            Step::Complete => ctx.complete(),
            Step::BypassAndComplete => {
                ctx.bypass()?;
                ctx.complete();
            }
            Step::Fail => anyhow::bail!("{} failed", self.name),
            Step::Panic => panic!("{} panicked", self.name),
            Step::ReadCaller => {
                let caller = ctx
                    .caller()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string());
                log.record(format!("caller={caller}"));
            }
        }
        Ok(())
    }
}

/// Observer that parks until released, to hold an invocation in flight
pub struct GatedObserver {
    name: String,
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl GatedObserver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl Observer<TestEvent, TestEnv> for GatedObserver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_event(&self, ctx: &mut ObserverContext<TestEnv>, _event: &TestEvent) -> HandlerResult {
        self.entered.notify_one();
        self.release.notified().await;
        if let Some(env) = ctx.environment() {
            env.log.record(self.name.clone());
        }
        Ok(())
    }
}

/// Resolver whose answer can change, counting how often it is asked
#[derive(Default)]
pub struct CountingResolver {
    caller: Mutex<Option<CallerIdentity>>,
    queries: AtomicUsize,
}

impl CountingResolver {
    pub fn with_caller(caller: &str) -> Self {
        Self {
            caller: Mutex::new(Some(CallerIdentity::new(caller))),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, caller: Option<&str>) {
        *self.caller.lock() = caller.map(CallerIdentity::new);
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl CallerResolver for CountingResolver {
    fn current_remote_caller(&self) -> Option<CallerIdentity> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.caller.lock().clone()
    }
}

/// A registry plus the log shared by all environments registered through it
pub struct ChainFixture {
    pub registry: Arc<TestRegistry>,
    pub log: VisitLog,
}

impl ChainFixture {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ChainRegistry::new()),
            log: VisitLog::default(),
        }
    }

    pub fn env(&self, label: &str) -> Arc<TestEnv> {
        Arc::new(TestEnv {
            label: label.to_string(),
            log: self.log.clone(),
        })
    }

    pub fn add(&self, name: &str, step: Step, priority: i64) -> &Self {
        self.add_observer(Arc::new(ScriptedObserver::new(name, step)), priority)
    }

    pub fn add_observer(
        &self,
        observer: Arc<dyn Observer<TestEvent, TestEnv>>,
        priority: i64,
    ) -> &Self {
        let env = self.env(observer.name());
        self.registry
            .register(observer, env, priority)
            .expect("registration should succeed");
        self
    }

    pub fn orchestrator(&self) -> TestOrchestrator {
        ChainOrchestrator::without_resolver(Arc::clone(&self.registry))
    }

    pub fn orchestrator_with(&self, resolver: Arc<dyn CallerResolver>) -> TestOrchestrator {
        ChainOrchestrator::new(Arc::clone(&self.registry), resolver)
    }
}
