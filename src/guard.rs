//! Lazy, process-wide construction of the embedded responder.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chat_responder::{Responder, ResponderFactory, ResponderInitError, ResponderProfile};
use serde::Serialize;
use tracing::{error, info};

pub const INIT_FAILURE_PREFIX: &str = "Agent initialization failed";

/// Observable state of the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GuardStatus {
    Uninitialized,
    Initializing,
    Ready { profile: ResponderProfile },
    Failed { error: String },
}

impl GuardStatus {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

enum Slot {
    Uninitialized,
    Initializing,
    Ready(Arc<dyn Responder>),
    Failed(ResponderInitError),
}

/// Owns the single responder handle shared by every session.
///
/// A successful construction is cached for the life of the process. A failed
/// one is not: the next `ensure_ready` call constructs again.
pub struct ResponderGuard {
    factory: Arc<dyn ResponderFactory>,
    slot: Mutex<Slot>,
    init_lock: Mutex<()>,
    attempts: AtomicUsize,
}

impl ResponderGuard {
    pub fn new(factory: Arc<dyn ResponderFactory>) -> Self {
        Self {
            factory,
            slot: Mutex::new(Slot::Uninitialized),
            init_lock: Mutex::new(()),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Returns the cached handle, constructing it first if needed.
    ///
    /// Blocks for the whole construction. Concurrent first callers are
    /// serialized; the later ones observe the finished handle.
    pub fn ensure_ready(&self) -> Result<Arc<dyn Responder>, ResponderInitError> {
        if let Some(handle) = self.handle() {
            return Ok(handle);
        }

        let _init = lock_unpoisoned(&self.init_lock);
        if let Some(handle) = self.handle() {
            return Ok(handle);
        }

        *lock_unpoisoned(&self.slot) = Slot::Initializing;
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        info!(attempt, "constructing responder");

        let constructed = match catch_unwind(AssertUnwindSafe(|| self.factory.construct())) {
            Ok(result) => result,
            Err(_) => Err(ResponderInitError::new("responder construction panicked")),
        };

        match constructed {
            Ok(handle) => {
                info!(attempt, responder = %handle.profile().responder_id, "responder ready");
                *lock_unpoisoned(&self.slot) = Slot::Ready(Arc::clone(&handle));
                Ok(handle)
            }
            Err(cause) => {
                let wrapped = ResponderInitError::new(format!("{INIT_FAILURE_PREFIX}: {cause}"));
                error!(attempt, error = %cause, "responder construction failed");
                *lock_unpoisoned(&self.slot) = Slot::Failed(wrapped.clone());
                Err(wrapped)
            }
        }
    }

    /// The cached handle, if construction already succeeded. Never constructs.
    pub fn handle(&self) -> Option<Arc<dyn Responder>> {
        match &*lock_unpoisoned(&self.slot) {
            Slot::Ready(handle) => Some(Arc::clone(handle)),
            _ => None,
        }
    }

    pub fn status(&self) -> GuardStatus {
        match &*lock_unpoisoned(&self.slot) {
            Slot::Uninitialized => GuardStatus::Uninitialized,
            Slot::Initializing => GuardStatus::Initializing,
            Slot::Ready(handle) => GuardStatus::Ready {
                profile: handle.profile(),
            },
            Slot::Failed(error) => GuardStatus::Failed {
                error: error.message().to_string(),
            },
        }
    }

    /// Number of calls made into the factory, failed ones included.
    pub fn construction_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chat_responder_mock::{MockResponder, MockResponderFactory};

    #[test]
    fn starts_uninitialized_without_constructing() {
        let guard = ResponderGuard::new(Arc::new(MockResponderFactory::new()));
        assert_eq!(guard.status(), GuardStatus::Uninitialized);
        assert!(guard.handle().is_none());
        assert_eq!(guard.construction_attempts(), 0);
    }

    #[test]
    fn failure_is_wrapped_and_not_cached() {
        let guard = ResponderGuard::new(Arc::new(MockResponderFactory::new().failing_first(1)));

        let error = guard.ensure_ready().err().expect("first attempt fails");
        assert_eq!(
            error.message(),
            "Agent initialization failed: mock construction attempt 1 failed"
        );
        assert_eq!(
            guard.status(),
            GuardStatus::Failed {
                error: error.message().to_string()
            }
        );

        guard.ensure_ready().expect("second attempt succeeds");
        assert!(guard.status().is_ready());
        assert_eq!(guard.construction_attempts(), 2);
    }

    #[test]
    fn panicking_factory_reports_failure() {
        let factory = || -> Result<Arc<dyn Responder>, ResponderInitError> {
            panic!("model weights missing");
        };
        let guard = ResponderGuard::new(Arc::new(factory));

        let error = guard.ensure_ready().err().expect("panic becomes an error");
        assert!(error.message().starts_with(INIT_FAILURE_PREFIX));
        assert!(matches!(guard.status(), GuardStatus::Failed { .. }));
    }

    #[test]
    fn ready_handle_is_shared() {
        let guard = ResponderGuard::new(Arc::new(MockResponderFactory::with_builder(|| {
            MockResponder::new(vec!["hi there".to_string()])
        })));

        let first = guard.ensure_ready().expect("ready");
        let second = guard.ensure_ready().expect("ready");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(guard.construction_attempts(), 1);
    }
}
