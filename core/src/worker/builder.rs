//! Builder pattern for Worker construction

use crate::error::{BenchError, BenchResult};
use crate::metrics::ResultAggregator;
use crate::request::InputGenerator;
use crate::traits::ServiceClient;
use crate::verify::Verifier;

use super::executor::Worker;
use super::rate_limiter::RequestRateLimiter;

use std::sync::Arc;
use std::time::Duration;

/// Builder for creating Worker instances
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(0)
///     .client(client)
///     .verifier(verifier)
///     .inputs(inputs)
///     .rate_limiter(limiter)
///     .aggregator(aggregator)
///     .iterations(100)
///     .build()?;
/// ```
pub struct WorkerBuilder {
    id: usize,
    client: Option<Arc<dyn ServiceClient>>,
    verifier: Option<Arc<Verifier>>,
    inputs: Option<Arc<InputGenerator>>,
    rate_limiter: Option<Arc<RequestRateLimiter>>,
    aggregator: Option<Arc<ResultAggregator>>,
    iterations: Option<usize>,
    pacing_delay: Option<Duration>,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            client: None,
            verifier: None,
            inputs: None,
            rate_limiter: None,
            aggregator: None,
            iterations: None,
            pacing_delay: None,
        }
    }

    /// Set the service client
    pub fn client(mut self, client: Arc<dyn ServiceClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the verifier
    pub fn verifier(mut self, verifier: Arc<Verifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Set the input generator
    pub fn inputs(mut self, inputs: Arc<InputGenerator>) -> Self {
        self.inputs = Some(inputs);
        self
    }

    /// Set the shared rate limiter
    pub fn rate_limiter(mut self, limiter: Arc<RequestRateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Set the shared result aggregator
    pub fn aggregator(mut self, aggregator: Arc<ResultAggregator>) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    /// Set the number of iterations
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Set an optional sleep after each iteration
    pub fn pacing_delay(mut self, delay: Option<Duration>) -> Self {
        self.pacing_delay = delay;
        self
    }

    /// Build the Worker
    ///
    /// # Errors
    /// Returns an error if any required field is missing. A missing rate
    /// limiter means no limiting.
    pub fn build(self) -> BenchResult<Worker> {
        let client = self.client.ok_or(BenchError::missing_config("client"))?;
        let verifier = self
            .verifier
            .ok_or(BenchError::missing_config("verifier"))?;
        let inputs = self.inputs.ok_or(BenchError::missing_config("inputs"))?;
        let aggregator = self
            .aggregator
            .ok_or(BenchError::missing_config("aggregator"))?;
        let iterations = self
            .iterations
            .ok_or(BenchError::missing_config("iterations"))?;
        let rate_limiter = self
            .rate_limiter
            .unwrap_or_else(|| Arc::new(RequestRateLimiter::unlimited()));

        Ok(Worker::new(
            self.id,
            client,
            verifier,
            inputs,
            rate_limiter,
            aggregator,
            iterations,
            self.pacing_delay,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeBase;
    use crate::mock::MockShortener;

    fn full_builder() -> WorkerBuilder {
        let client: Arc<dyn ServiceClient> = Arc::new(MockShortener::new());
        WorkerBuilder::new(0)
            .client(Arc::clone(&client))
            .verifier(Arc::new(Verifier::new(client)))
            .inputs(Arc::new(InputGenerator::new(
                "http://mydomain.com/",
                6,
                ShapeBase::Input,
            )))
            .aggregator(Arc::new(ResultAggregator::default()))
            .iterations(10)
    }

    #[test]
    fn test_builder_complete() {
        let worker = full_builder().build().expect("complete builder");
        assert_eq!(worker.id(), 0);
    }

    #[test]
    fn test_builder_missing_client() {
        let result = WorkerBuilder::new(0).iterations(1).build();

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.message.contains("client"));
    }

    #[test]
    fn test_builder_missing_iterations() {
        let mut builder = full_builder();
        builder.iterations = None;
        let err = builder.build().unwrap_err();
        assert!(err.message.contains("iterations"));
    }

    #[test]
    fn test_builder_missing_aggregator() {
        let mut builder = full_builder();
        builder.aggregator = None;
        let err = builder.build().unwrap_err();
        assert!(err.message.contains("aggregator"));
    }

    #[test]
    fn test_builder_missing_verifier() {
        let mut builder = full_builder();
        builder.verifier = None;
        assert!(builder.build().is_err());
    }
}
