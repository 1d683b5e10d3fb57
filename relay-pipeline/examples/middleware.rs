//! Middleware example: auth, timing, and a terminal handler over a request.
//!
//! Run with: RUST_LOG=trace cargo run --example middleware -p relay-pipeline

use std::time::{Duration, Instant};

use async_trait::async_trait;
use relay_pipeline::{
    Construct, Dependencies, Next, PipeContext, PipeItem, Pipeline, PipelineBuilder,
    PipelineError, ServiceMap, item_fn,
};

// --- The context every item sees ---

#[derive(Debug, Default)]
struct Request {
    path: String,
    bearer: Option<String>,
    status: u16,
    body: String,
    elapsed: Duration,
}

impl PipeContext for Request {}

// --- Items ---

#[derive(Debug, Clone)]
struct AdminToken(String);

/// Rejects requests without the admin token. Needs the token injected.
struct RequireAdmin {
    token: AdminToken,
}

impl Construct for RequireAdmin {
    fn construct(deps: &Dependencies<'_>) -> Result<Self, PipelineError> {
        Ok(Self {
            token: deps.require()?,
        })
    }
}

#[async_trait]
impl PipeItem<Request> for RequireAdmin {
    async fn execute(
        &self,
        ctx: &mut Request,
        next: Next<'_, Request>,
    ) -> Result<(), PipelineError> {
        if ctx.bearer.as_deref() != Some(self.token.0.as_str()) {
            ctx.status = 401;
            ctx.body = "unauthorized".into();
            return Ok(());
        }
        next.run(ctx).await
    }
}

/// Terminal handler.
#[derive(Default)]
struct Hello;

#[async_trait]
impl PipeItem<Request> for Hello {
    async fn execute(
        &self,
        ctx: &mut Request,
        next: Next<'_, Request>,
    ) -> Result<(), PipelineError> {
        ctx.status = 200;
        ctx.body = format!("hello from {}", ctx.path);
        next.run(ctx).await
    }
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    tracing_subscriber::fmt::init();

    // 1. Register the token the auth item depends on
    let mut services = ServiceMap::new();
    services.insert(AdminToken("s3cret".into()));

    // 2. Describe the chain: timing wraps auth, auth guards the handler
    let mut builder = PipelineBuilder::<Request>::named("admin-api");
    builder
        .add_instance(
            item_fn(|ctx: &mut Request, next| {
                Box::pin(async move {
                    let started = Instant::now();
                    let result = next.run(ctx).await;
                    ctx.elapsed = started.elapsed();
                    result
                })
            })
            .named("timing"),
        )
        .add_item::<RequireAdmin>()
        .add_default::<Hello>();

    // 3. Build once, run many times
    let pipeline = builder.build_with(&services)?;
    println!("built {pipeline:?}");

    for bearer in [Some("s3cret"), Some("guess"), None] {
        let mut request = Request {
            path: "/admin".into(),
            bearer: bearer.map(String::from),
            ..Request::default()
        };
        pipeline.execute(&mut request).await?;
        println!(
            "bearer={:?} -> {} {:?} in {:?}",
            bearer, request.status, request.body, request.elapsed
        );
    }

    Ok(())
}
