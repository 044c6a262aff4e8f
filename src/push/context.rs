//! Ambient collaborators: the current device identifier and the clock.

use std::future::Future;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

tokio::task_local! {
    static DEVICE_IDENTIFIER: Option<String>;
}

/// Access to the identifier of the device that made the current request.
pub trait CurrentContext: Send + Sync {
    /// `None` outside a request or when the caller sent no identifier.
    fn device_identifier(&self) -> Option<String>;
}

/// Reads the identifier installed by [`RequestContext::scope`] for the
/// current task.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext;

impl RequestContext {
    /// Run `fut` with `identifier` as the ambient device identifier.
    /// Empty identifiers are treated as absent.
    pub async fn scope<F: Future>(identifier: Option<String>, fut: F) -> F::Output {
        let identifier = identifier.filter(|id| !id.is_empty());
        DEVICE_IDENTIFIER.scope(identifier, fut).await
    }
}

impl CurrentContext for RequestContext {
    fn device_identifier(&self) -> Option<String> {
        DEVICE_IDENTIFIER.try_with(|id| id.clone()).ok().flatten()
    }
}

/// A context that always reports the same identifier.
#[derive(Debug, Clone, Default)]
pub struct StaticContext(Option<String>);

impl StaticContext {
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self(Some(identifier).filter(|id| !id.is_empty()))
    }

    pub fn empty() -> Self {
        Self(None)
    }
}

impl CurrentContext for StaticContext {
    fn device_identifier(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Source of "now". Payload dates and token expiry both read from it.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_context_scope() {
        let context = RequestContext;
        assert_eq!(context.device_identifier(), None);

        let inside = RequestContext::scope(Some("dev-1".to_string()), async move {
            context.device_identifier()
        })
        .await;
        assert_eq!(inside.as_deref(), Some("dev-1"));

        assert_eq!(context.device_identifier(), None);
    }

    #[tokio::test]
    async fn test_empty_identifier_is_absent() {
        let inside = RequestContext::scope(Some(String::new()), async {
            RequestContext.device_identifier()
        })
        .await;
        assert_eq!(inside, None);
        assert_eq!(StaticContext::new("").device_identifier(), None);
    }

    #[test]
    fn test_fixed_clock_advance() {
        let start = Utc::now();
        let clock = FixedClock::new(start);
        clock.advance(Duration::minutes(10));
        assert_eq!(clock.now(), start + Duration::minutes(10));
    }
}
