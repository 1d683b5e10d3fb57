use async_trait::async_trait;
use relay_core::test_utils::{RecordingItem, TraceContext};
use relay_pipeline::*;
use std::any::TypeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// --- Fixture items ---

/// Dependency with a default, resolved through `Dependencies::resolve`.
#[derive(Debug, Clone, PartialEq)]
struct Greeting(String);

impl Default for Greeting {
    fn default() -> Self {
        Self("hello".into())
    }
}

struct Greeter {
    greeting: Greeting,
}

impl Construct for Greeter {
    fn construct(deps: &Dependencies<'_>) -> Result<Self, PipelineError> {
        Ok(Self {
            greeting: deps.resolve()?,
        })
    }
}

#[async_trait]
impl PipeItem<TraceContext> for Greeter {
    async fn execute(
        &self,
        ctx: &mut TraceContext,
        next: Next<'_, TraceContext>,
    ) -> Result<(), PipelineError> {
        ctx.record(self.greeting.0.clone());
        next.run(ctx).await
    }
}

/// Dependency without a default, resolved through `Dependencies::require`.
#[derive(Debug, Clone)]
struct ApiKey(String);

struct Gateway {
    key: ApiKey,
}

impl Construct for Gateway {
    fn construct(deps: &Dependencies<'_>) -> Result<Self, PipelineError> {
        Ok(Self {
            key: deps.require()?,
        })
    }
}

#[async_trait]
impl PipeItem<TraceContext> for Gateway {
    async fn execute(
        &self,
        ctx: &mut TraceContext,
        next: Next<'_, TraceContext>,
    ) -> Result<(), PipelineError> {
        ctx.record(format!("key={}", self.key.0));
        next.run(ctx).await
    }
}

/// Counts how many times it has been constructed.
#[derive(Debug, Clone, Default)]
struct Constructions(Arc<AtomicUsize>);

struct Tracked;

impl Construct for Tracked {
    fn construct(deps: &Dependencies<'_>) -> Result<Self, PipelineError> {
        let constructions: Constructions = deps.require()?;
        constructions.0.fetch_add(1, Ordering::SeqCst);
        Ok(Self)
    }
}

#[async_trait]
impl PipeItem<TraceContext> for Tracked {
    async fn execute(
        &self,
        ctx: &mut TraceContext,
        next: Next<'_, TraceContext>,
    ) -> Result<(), PipelineError> {
        ctx.record("tracked");
        next.run(ctx).await
    }
}

#[derive(Default)]
struct Stamp;

#[async_trait]
impl PipeItem<TraceContext> for Stamp {
    async fn execute(
        &self,
        ctx: &mut TraceContext,
        next: Next<'_, TraceContext>,
    ) -> Result<(), PipelineError> {
        ctx.record("stamp");
        next.run(ctx).await
    }
}

/// Counts executions on a shared instance.
#[derive(Default)]
struct Hits(AtomicUsize);

#[async_trait]
impl PipeItem<TraceContext> for Hits {
    async fn execute(
        &self,
        ctx: &mut TraceContext,
        next: Next<'_, TraceContext>,
    ) -> Result<(), PipelineError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        next.run(ctx).await
    }
}

// --- Configuration ---

#[test]
fn empty_builder_fails_with_configuration_error() {
    let builder = PipelineBuilder::<TraceContext>::new();
    assert!(builder.is_empty());
    let err = builder.build().unwrap_err();
    assert!(matches!(err, PipelineError::Configuration(_)));

    let services = ServiceMap::new();
    let err = builder.build_with(&services).unwrap_err();
    assert!(matches!(err, PipelineError::Configuration(_)));
}

#[test]
fn registration_order_is_preserved() {
    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder
        .add_default::<Stamp>()
        .add_instance(RecordingItem::new("recorder"))
        .add_factory("greeter", Greeter::construct);

    assert_eq!(builder.len(), 3);
    let names = builder.item_names();
    assert!(names[0].ends_with("Stamp"));
    assert_eq!(&names[1..], ["recorder", "greeter"]);

    let pipeline = builder.build().unwrap();
    assert_eq!(pipeline.len(), 3);
    assert_eq!(pipeline.item_names()[1], "recorder");
}

#[test]
fn named_builder_names_its_pipelines() {
    let mut builder = PipelineBuilder::<TraceContext>::named("checkout");
    builder.add_default::<Stamp>();
    let pipeline = builder.build().unwrap();
    assert_eq!(pipeline.name(), Some("checkout"));
    assert!(format!("{builder:?}").contains("checkout"));
}

// --- Dependency resolution ---

#[tokio::test]
async fn build_without_resolver_populates_every_item() {
    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder
        .add_item::<Greeter>()
        .add_default::<Stamp>()
        .add_instance(RecordingItem::new("tail"));
    let pipeline = builder.build().unwrap();

    let mut ctx = TraceContext::new();
    pipeline.execute(&mut ctx).await.unwrap();
    assert_eq!(
        ctx.entries(),
        ["hello", "stamp", "tail-before", "tail-after"]
    );
}

#[tokio::test]
async fn resolver_instance_wins_over_default_construction() {
    let mut services = ServiceMap::new();
    services.insert(Greeting("bonjour".into()));

    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder.add_item::<Greeter>();
    let pipeline = builder.build_with(&services).unwrap();

    let mut ctx = TraceContext::new();
    pipeline.execute(&mut ctx).await.unwrap();
    assert_eq!(ctx.entries(), ["bonjour"]);
}

#[tokio::test]
async fn missing_resolver_entry_falls_back_to_default() {
    let mut services = ServiceMap::new();
    services.insert(ApiKey("unused".into()));

    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder.add_item::<Greeter>();
    let pipeline = builder.build_with(&services).unwrap();

    let mut ctx = TraceContext::new();
    pipeline.execute(&mut ctx).await.unwrap();
    assert_eq!(ctx.entries(), ["hello"]);
}

#[test]
fn unresolvable_dependency_fails_with_instantiation_error() {
    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder.add_item::<Gateway>();

    let err = builder.build().unwrap_err();
    assert!(err.is_instantiation());
    match err {
        PipelineError::MissingDependency { item, dependency } => {
            assert!(item.ends_with("Gateway"));
            assert!(dependency.ends_with("ApiKey"));
        }
        other => panic!("expected MissingDependency, got: {other:?}"),
    }

    // Same outcome when a resolver is present but has no entry.
    let err = builder.build_with(&ServiceMap::new()).unwrap_err();
    assert!(err.is_instantiation());
}

#[tokio::test]
async fn required_dependency_comes_from_resolver() {
    let mut services = ServiceMap::new();
    services.insert(ApiKey("sk-123".into()));

    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder.add_item::<Gateway>();
    let pipeline = builder.build_with(&services).unwrap();

    let mut ctx = TraceContext::new();
    pipeline.execute(&mut ctx).await.unwrap();
    assert_eq!(ctx.entries(), ["key=sk-123"]);
}

#[tokio::test]
async fn closure_resolver_is_consulted() {
    let resolver = resolver_fn(|ty| {
        (ty == TypeId::of::<Greeting>()).then(|| Resolved::new(Greeting("hola".into())))
    });

    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder.add_item::<Greeter>();
    let pipeline = builder.build_with(&resolver).unwrap();

    let mut ctx = TraceContext::new();
    pipeline.execute(&mut ctx).await.unwrap();
    assert_eq!(ctx.entries(), ["hola"]);
}

#[tokio::test]
async fn closure_resolver_that_declines_leaves_default_construction() {
    let asked = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&asked);
    let resolver = resolver_fn(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        None
    });

    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder.add_item::<Greeter>();
    let pipeline = builder.build_with(&resolver).unwrap();

    let mut ctx = TraceContext::new();
    pipeline.execute(&mut ctx).await.unwrap();
    assert_eq!(ctx.entries(), ["hello"]);
    assert_eq!(asked.load(Ordering::SeqCst), 1);
}

#[test]
fn closure_resolver_answering_with_the_wrong_type_fails_the_build() {
    let resolver = resolver_fn(|_| Some(Resolved::new(42u32)));

    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder.add_item::<Greeter>();
    match builder.build_with(&resolver).unwrap_err() {
        PipelineError::TypeMismatch { expected, found } => {
            assert!(expected.ends_with("Greeting"));
            assert_eq!(found, "u32");
        }
        other => panic!("expected TypeMismatch, got: {other:?}"),
    }
}

#[test]
fn factory_failure_is_reported_verbatim() {
    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder.add_factory("broken", |deps| -> Result<Stamp, PipelineError> {
        let reason = "no usable constructor";
        Err(PipelineError::instantiation(deps.item(), reason))
    });
    let err = builder.build().unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot instantiate broken: no usable constructor"
    );
}

// --- Construction lifecycle ---

#[test]
fn failed_build_stops_at_first_broken_item() {
    let constructions = Constructions::default();
    let mut services = ServiceMap::new();
    services.insert(constructions.clone());

    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder
        .add_item::<Tracked>()
        .add_item::<Gateway>()
        .add_item::<Tracked>();

    assert!(builder.build_with(&services).is_err());
    assert_eq!(constructions.0.load(Ordering::SeqCst), 1);
}

#[test]
fn each_build_constructs_fresh_items() {
    let constructions = Constructions::default();
    let mut services = ServiceMap::new();
    services.insert(constructions.clone());

    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder.add_item::<Tracked>().add_item::<Tracked>();

    builder.build_with(&services).unwrap();
    builder.build_with(&services).unwrap();
    assert_eq!(constructions.0.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn shared_instances_are_reused_across_builds() {
    let hits = Arc::new(Hits::default());

    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder.add_shared(hits.clone());

    let first = builder.build().unwrap();
    let second = builder.build().unwrap();
    first.execute(&mut TraceContext::new()).await.unwrap();
    second.execute(&mut TraceContext::new()).await.unwrap();

    assert_eq!(hits.0.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn built_pipeline_is_reachable_through_dyn_contract() {
    let mut builder = PipelineBuilder::<TraceContext>::new();
    builder.add_default::<Stamp>();
    let pipeline: Arc<dyn DynPipeline> = builder.build().unwrap().into_dyn();

    let mut ctx = TraceContext::new();
    pipeline.execute_dyn(&mut ctx).await.unwrap();
    assert_eq!(ctx.entries(), ["stamp"]);
}
