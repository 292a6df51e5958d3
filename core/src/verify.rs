//! Correctness checks on transform output
//!
//! Two checks run per iteration, in order:
//!
//! 1. **Shape**: the transformed value has the expected length.
//! 2. **Round trip**: `inverse(transformed)` reproduces the original input.
//!
//! The round trip is only attempted when the shape check passes, so an
//! iteration reports at most one verification failure.

use crate::error::ErrorKind;
use crate::request::RequestRecord;
use crate::traits::{ServiceClient, ServiceError};

use std::sync::Arc;

/// A verification failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationFailure {
    /// Transformed output had the wrong length
    #[error("transformed value has length {actual}, expected {expected}: {transformed}")]
    Shape {
        /// Expected length in characters
        expected: usize,
        /// Actual length in characters
        actual: usize,
        /// The offending value
        transformed: String,
    },

    /// The inverse did not reproduce the original input
    #[error("round trip mismatch: original={original}, recovered={}", display_recovered(.recovered, .inverse_error))]
    RoundTrip {
        /// Input that was transformed
        original: String,
        /// What the inverse call returned, if it succeeded
        recovered: Option<String>,
        /// Why the inverse call failed, if it did
        inverse_error: Option<String>,
    },
}

fn display_recovered(recovered: &Option<String>, inverse_error: &Option<String>) -> String {
    match (recovered, inverse_error) {
        (Some(value), _) => value.clone(),
        (None, Some(err)) => format!("<inverse failed: {err}>"),
        (None, None) => "<none>".to_string(),
    }
}

impl VerificationFailure {
    /// Classification for logs and metrics
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerificationFailure::Shape { .. } => ErrorKind::Shape,
            VerificationFailure::RoundTrip { .. } => ErrorKind::RoundTrip,
        }
    }
}

/// Result of verifying one transformed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Both checks passed
    Passed,
    /// One check failed
    Failed(VerificationFailure),
}

impl VerificationOutcome {
    /// Whether verification passed
    pub fn is_passed(&self) -> bool {
        matches!(self, VerificationOutcome::Passed)
    }
}

/// Verifies transform output against the shape and round-trip contracts
pub struct Verifier {
    client: Arc<dyn ServiceClient>,
}

impl Verifier {
    /// Create a verifier that uses `client` for the inverse call
    pub fn new(client: Arc<dyn ServiceClient>) -> Self {
        Self { client }
    }

    /// Check the transformed value's length
    pub fn check_shape(
        record: &RequestRecord,
        transformed: &str,
    ) -> Result<(), VerificationFailure> {
        let actual = transformed.chars().count();
        if actual == record.expected_output_length {
            Ok(())
        } else {
            Err(VerificationFailure::Shape {
                expected: record.expected_output_length,
                actual,
                transformed: transformed.to_string(),
            })
        }
    }

    /// Compare the recovered value with the original input
    pub fn check_round_trip(
        record: &RequestRecord,
        recovered: &str,
    ) -> Result<(), VerificationFailure> {
        if recovered == record.original_input {
            Ok(())
        } else {
            Err(VerificationFailure::RoundTrip {
                original: record.original_input.clone(),
                recovered: Some(recovered.to_string()),
                inverse_error: None,
            })
        }
    }

    /// Run the shape check, then the round trip through the inverse endpoint
    ///
    /// An unavailable inverse endpoint (transport or status error) fails the
    /// round trip.
    ///
    /// # Errors
    ///
    /// Returns the service error when the inverse call answered with a
    /// malformed body; the caller treats that as an unexpected fault.
    pub async fn verify(
        &self,
        record: &RequestRecord,
        transformed: &str,
    ) -> Result<VerificationOutcome, ServiceError> {
        if let Err(failure) = Self::check_shape(record, transformed) {
            return Ok(VerificationOutcome::Failed(failure));
        }

        let recovered = match self.client.inverse(transformed).await {
            Ok(value) => value,
            Err(e) if e.is_availability() => {
                return Ok(VerificationOutcome::Failed(VerificationFailure::RoundTrip {
                    original: record.original_input.clone(),
                    recovered: None,
                    inverse_error: Some(e.to_string()),
                }));
            }
            Err(e) => return Err(e),
        };

        Ok(match Self::check_round_trip(record, &recovered) {
            Ok(()) => VerificationOutcome::Passed,
            Err(failure) => VerificationOutcome::Failed(failure),
        })
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("client", &self.client.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockShortener;
    use proptest::prelude::*;
    use std::sync::atomic::Ordering;

    fn verifier(mock: &Arc<MockShortener>) -> Verifier {
        Verifier::new(Arc::clone(mock) as Arc<dyn ServiceClient>)
    }

    #[tokio::test]
    async fn test_round_trip_literal_cases() {
        let mock = Arc::new(MockShortener::new());
        let verifier = verifier(&mock);

        for input in [
            "http://mydomain.com/test0",
            "http://mydomain.com/test9999",
            "http://mydomain.com/test?q=a b&x=1#frag",
        ] {
            let record = RequestRecord::new(input, 6);
            let transformed = mock.transform(input).await.unwrap();
            let outcome = verifier.verify(&record, &transformed).await.unwrap();
            assert_eq!(outcome, VerificationOutcome::Passed, "input {input}");
        }
        assert_eq!(mock.inverse_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_shape_failure_skips_inverse() {
        let mock = Arc::new(MockShortener::new().with_wrong_length());
        let verifier = verifier(&mock);

        let record = RequestRecord::new("http://mydomain.com/test1", 6);
        let transformed = mock.transform(&record.original_input).await.unwrap();
        let outcome = verifier.verify(&record, &transformed).await.unwrap();

        match outcome {
            VerificationOutcome::Failed(failure) => assert_eq!(failure.kind(), ErrorKind::Shape),
            other => panic!("expected shape failure, got {other:?}"),
        }
        assert_eq!(mock.inverse_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_round_trip_mismatch() {
        let mock = Arc::new(MockShortener::new().with_corrupt_inverse());
        let verifier = verifier(&mock);

        let record = RequestRecord::new("http://mydomain.com/test2", 6);
        let transformed = mock.transform(&record.original_input).await.unwrap();
        assert!(Verifier::check_shape(&record, &transformed).is_ok());

        let outcome = verifier.verify(&record, &transformed).await.unwrap();
        match outcome {
            VerificationOutcome::Failed(VerificationFailure::RoundTrip {
                original,
                recovered,
                ..
            }) => {
                assert_eq!(original, "http://mydomain.com/test2");
                assert_ne!(recovered.as_deref(), Some("http://mydomain.com/test2"));
            }
            other => panic!("expected round trip failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inverse_failure_is_round_trip_failure() {
        let mock = Arc::new(MockShortener::new());
        let verifier = verifier(&mock);

        // Never transformed, so the mock answers 404
        let record = RequestRecord::new("http://mydomain.com/test3", 6);
        let outcome = verifier
            .verify(&record, "http://mydomain.com/test3abcdef")
            .await
            .unwrap();

        match outcome {
            VerificationOutcome::Failed(failure @ VerificationFailure::RoundTrip { .. }) => {
                assert!(failure.to_string().contains("inverse failed"));
            }
            other => panic!("expected round trip failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_inverse_body_is_returned_as_error() {
        let mock = Arc::new(MockShortener::new().with_malformed_inverse());
        let verifier = verifier(&mock);

        let record = RequestRecord::new("http://mydomain.com/test4", 6);
        let transformed = mock.transform(&record.original_input).await.unwrap();
        let err = verifier.verify(&record, &transformed).await.unwrap_err();

        assert!(matches!(err, ServiceError::Decode { .. }));
        assert_eq!(err.to_error_kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_check_shape_counts_chars() {
        let record = RequestRecord::new("http://例え.jp/test0", 6);
        assert!(Verifier::check_shape(&record, "http://例え.jp/test0abcdef").is_ok());
    }

    #[test]
    fn test_failure_display() {
        let failure = VerificationFailure::Shape {
            expected: 31,
            actual: 26,
            transformed: "http://mydomain.com/abc123".into(),
        };
        assert_eq!(
            failure.to_string(),
            "transformed value has length 26, expected 31: http://mydomain.com/abc123"
        );
    }

    proptest! {
        #[test]
        fn shape_accepts_exactly_input_plus_suffix(
            input in "[ -~]{0,64}",
            suffix in 0usize..16,
            extra in 1usize..8,
        ) {
            let record = RequestRecord::new(input.clone(), suffix);
            let good = format!("{}{}", input, "x".repeat(suffix));
            prop_assert!(Verifier::check_shape(&record, &good).is_ok());

            let long = format!("{}{}", good, "y".repeat(extra));
            prop_assert!(Verifier::check_shape(&record, &long).is_err());

            if good.len() >= extra {
                let short = &good[..good.len() - extra];
                prop_assert!(Verifier::check_shape(&record, short).is_err());
            }
        }
    }
}
