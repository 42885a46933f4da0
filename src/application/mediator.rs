//! Request dispatch
//!
//! Each request type owns one [`Pipeline`]: a list of validators followed by
//! a handler. [`Mediator::send`] looks the pipeline up by the request's
//! `TypeId`, runs every validator, and only calls the handler when no rule
//! failed.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::UseCaseError;

/// A request value routed through the mediator
pub trait Request: Send + Sync + 'static {
    type Response: Send + 'static;
}

#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(&self, request: R) -> Result<R::Response, UseCaseError>;
}

#[async_trait]
pub trait RequestValidator<R: Request>: Send + Sync {
    /// Returns every violated rule's message; an empty list means valid
    async fn validate(&self, request: &R) -> Result<Vec<String>, UseCaseError>;
}

pub struct Pipeline<R: Request> {
    validators: Vec<Arc<dyn RequestValidator<R>>>,
    handler: Arc<dyn RequestHandler<R>>,
}

impl<R: Request> Pipeline<R> {
    pub fn new<H>(handler: H) -> Self
    where
        H: RequestHandler<R> + 'static,
    {
        Self {
            validators: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn with_validator<V>(mut self, validator: V) -> Self
    where
        V: RequestValidator<R> + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    async fn run(&self, request: R) -> Result<R::Response, UseCaseError> {
        let mut errors = Vec::new();
        for validator in &self.validators {
            errors.extend(validator.validate(&request).await?);
        }

        if !errors.is_empty() {
            tracing::debug!(
                request = type_name::<R>(),
                error_count = errors.len(),
                "Request rejected by validation"
            );
            return Err(UseCaseError::Validation(errors));
        }

        self.handler.handle(request).await
    }
}

/// Registry of pipelines keyed by request type
#[derive(Default)]
pub struct Mediator {
    pipelines: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("pipelines", &self.pipelines.len())
            .finish()
    }
}

impl Mediator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the pipeline for `R`, replacing any previous one
    pub fn register<R: Request>(&mut self, pipeline: Pipeline<R>) -> &mut Self {
        self.pipelines.insert(TypeId::of::<R>(), Box::new(pipeline));
        self
    }

    pub async fn send<R: Request>(&self, request: R) -> Result<R::Response, UseCaseError> {
        let pipeline = self
            .pipelines
            .get(&TypeId::of::<R>())
            .and_then(|entry| entry.downcast_ref::<Pipeline<R>>())
            .ok_or(UseCaseError::Unhandled(type_name::<R>()))?;

        pipeline.run(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo(String);

    impl Request for Echo {
        type Response = String;
    }

    struct EchoHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RequestHandler<Echo> for EchoHandler {
        async fn handle(&self, request: Echo) -> Result<String, UseCaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(request.0)
        }
    }

    struct NotEmpty;

    #[async_trait]
    impl RequestValidator<Echo> for NotEmpty {
        async fn validate(&self, request: &Echo) -> Result<Vec<String>, UseCaseError> {
            Ok(if request.0.is_empty() {
                vec!["empty".to_string()]
            } else {
                Vec::new()
            })
        }
    }

    struct ShorterThan(usize);

    #[async_trait]
    impl RequestValidator<Echo> for ShorterThan {
        async fn validate(&self, request: &Echo) -> Result<Vec<String>, UseCaseError> {
            Ok(if request.0.len() >= self.0 {
                vec![format!("longer than {}", self.0)]
            } else {
                Vec::new()
            })
        }
    }

    fn mediator(calls: Arc<AtomicUsize>) -> Mediator {
        let mut mediator = Mediator::new();
        mediator.register(
            Pipeline::new(EchoHandler { calls })
                .with_validator(NotEmpty)
                .with_validator(ShorterThan(4)),
        );
        mediator
    }

    #[tokio::test]
    async fn valid_request_reaches_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mediator = mediator(calls.clone());

        assert_eq!(mediator.send(Echo("hi".into())).await.unwrap(), "hi");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_validators_short_circuit_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mediator = mediator(calls.clone());

        let err = mediator.send(Echo("hello".into())).await.unwrap_err();
        match err {
            UseCaseError::Validation(errors) => assert_eq!(errors, vec!["longer than 4"]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unregistered_request_is_unhandled() {
        struct Ping;
        impl Request for Ping {
            type Response = ();
        }

        let mediator = Mediator::new();
        assert!(matches!(
            mediator.send(Ping).await,
            Err(UseCaseError::Unhandled(_))
        ));
    }
}
