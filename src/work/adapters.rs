// src/work/adapters.rs

//! Small adapters for building work units out of ordinary Rust code.

use std::fmt;
use std::future::{self, Future};
use std::pin::Pin;
use std::sync::Arc;

use super::{StepFuture, WorkArgs, WorkSteps, WorkUnit};

type BoxedBody = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A step sequence with exactly one step backed by a future.
///
/// The future is only polled on the first `next_step` call.
pub struct OnceStep {
    body: Option<BoxedBody>,
}

impl OnceStep {
    pub fn new<Fut>(body: Fut) -> Self
    where
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            body: Some(Box::pin(body)),
        }
    }
}

impl WorkSteps for OnceStep {
    fn next_step(&mut self) -> StepFuture<'_> {
        match self.body.take() {
            Some(body) => Box::pin(async move { Some(body.await) }),
            None => Box::pin(future::ready(None)),
        }
    }
}

/// A step sequence over a synchronous iterator of step results.
///
/// Iteration stops after the first error even if the iterator has more items.
pub struct IterSteps<I> {
    iter: I,
    failed: bool,
}

impl<I> IterSteps<I>
where
    I: Iterator<Item = anyhow::Result<()>> + Send,
{
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            failed: false,
        }
    }
}

impl<I> WorkSteps for IterSteps<I>
where
    I: Iterator<Item = anyhow::Result<()>> + Send,
{
    fn next_step(&mut self) -> StepFuture<'_> {
        if self.failed {
            return Box::pin(future::ready(None));
        }
        let item = self.iter.next();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        Box::pin(future::ready(item))
    }
}

/// Work unit wrapping a synchronous closure that runs as a single step.
pub struct FnWork<F> {
    name: String,
    body: Arc<F>,
}

impl<F> FnWork<F>
where
    F: Fn(&WorkArgs) -> anyhow::Result<()> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body: Arc::new(body),
        }
    }
}

impl<F> fmt::Debug for FnWork<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnWork").field("name", &self.name).finish()
    }
}

struct FnSteps<F> {
    body: Option<Arc<F>>,
    args: WorkArgs,
}

impl<F> WorkSteps for FnSteps<F>
where
    F: Fn(&WorkArgs) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn next_step(&mut self) -> StepFuture<'_> {
        let out = self.body.take().map(|body| body(&self.args));
        Box::pin(future::ready(out))
    }
}

impl<F> WorkUnit for FnWork<F>
where
    F: Fn(&WorkArgs) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, args: &WorkArgs) -> Box<dyn WorkSteps> {
        Box::new(FnSteps {
            body: Some(Arc::clone(&self.body)),
            args: args.clone(),
        })
    }
}

/// Work unit wrapping an async closure that runs as a single step.
pub struct AsyncFnWork<F> {
    name: String,
    body: F,
}

impl<F, Fut> AsyncFnWork<F>
where
    F: Fn(WorkArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F> fmt::Debug for AsyncFnWork<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFnWork")
            .field("name", &self.name)
            .finish()
    }
}

impl<F, Fut> WorkUnit for AsyncFnWork<F>
where
    F: Fn(WorkArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, args: &WorkArgs) -> Box<dyn WorkSteps> {
        Box::new(OnceStep::new((self.body)(args.clone())))
    }
}
