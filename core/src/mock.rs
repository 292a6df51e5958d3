//! In-memory shortener used by the unit tests

use crate::traits::{ServiceClient, ServiceError};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// How the mock misbehaves on its fault call
#[derive(Debug, Clone, Copy)]
pub enum FaultMode {
    Panic,
    Decode,
}

/// Shortener that appends a six character code to the input
///
/// The code is unique per transform call, so `inverse(transform(x)) == x`
/// and the output is always `len(x) + 6` characters long unless one of the
/// failure switches is set.
pub struct MockShortener {
    store: Mutex<HashMap<String, String>>,
    pub transform_calls: AtomicUsize,
    pub inverse_calls: AtomicUsize,
    wrong_length: bool,
    corrupt_inverse: bool,
    malformed_inverse: bool,
    fail_transform_every: Option<usize>,
    fault: Option<(usize, FaultMode)>,
    delay: Option<Duration>,
    blocking_delay: Option<Duration>,
}

impl MockShortener {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            transform_calls: AtomicUsize::new(0),
            inverse_calls: AtomicUsize::new(0),
            wrong_length: false,
            corrupt_inverse: false,
            malformed_inverse: false,
            fail_transform_every: None,
            fault: None,
            delay: None,
            blocking_delay: None,
        }
    }

    /// Return codes one character too short
    pub fn with_wrong_length(mut self) -> Self {
        self.wrong_length = true;
        self
    }

    /// Inverse returns a different value than was stored
    pub fn with_corrupt_inverse(mut self) -> Self {
        self.corrupt_inverse = true;
        self
    }

    /// Inverse answers with an unparseable body
    pub fn with_malformed_inverse(mut self) -> Self {
        self.malformed_inverse = true;
        self
    }

    /// Every nth transform call (1-based) answers 503
    pub fn with_fail_transform_every(mut self, n: usize) -> Self {
        self.fail_transform_every = Some(n);
        self
    }

    /// The transform call with this 0-based index faults
    pub fn with_fault_on_call(mut self, call: usize, mode: FaultMode) -> Self {
        self.fault = Some((call, mode));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Block the runtime thread inside transform, ignoring cancellation
    pub fn with_blocking_delay(mut self, delay: Duration) -> Self {
        self.blocking_delay = Some(delay);
        self
    }
}

#[async_trait]
impl ServiceClient for MockShortener {
    fn name(&self) -> &str {
        "mock-shortener"
    }

    async fn transform(&self, input: &str) -> Result<String, ServiceError> {
        let call = self.transform_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(delay) = self.blocking_delay {
            std::thread::sleep(delay);
        }

        if let Some((fault_call, mode)) = self.fault {
            if call == fault_call {
                match mode {
                    FaultMode::Panic => panic!("mock fault on transform call {call}"),
                    FaultMode::Decode => return Err(ServiceError::decode("missing shortenedUrl")),
                }
            }
        }

        if let Some(n) = self.fail_transform_every {
            if (call + 1) % n == 0 {
                return Err(ServiceError::Status { code: 503 });
            }
        }

        let code = format!("{:06}", call % 1_000_000);
        let code = if self.wrong_length { &code[..5] } else { &code[..] };
        let output = format!("{input}{code}");
        self.store
            .lock()
            .unwrap()
            .insert(output.clone(), input.to_string());
        Ok(output)
    }

    async fn inverse(&self, value: &str) -> Result<String, ServiceError> {
        self.inverse_calls.fetch_add(1, Ordering::SeqCst);

        if self.malformed_inverse {
            return Err(ServiceError::decode("missing originalUrl"));
        }

        let original = self.store.lock().unwrap().get(value).cloned();
        match original {
            Some(original) if self.corrupt_inverse => Ok(format!("{original}-corrupted")),
            Some(original) => Ok(original),
            None => Err(ServiceError::Status { code: 404 }),
        }
    }
}
