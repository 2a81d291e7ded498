//! Notifier adapters

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::ports::outbound::{Notifier, Severity};

/// Forwards notifications to the tracing subscriber
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => error!(%severity, "{}", message),
            Severity::Warning => warn!(%severity, "{}", message),
            Severity::Success | Severity::Info => info!(%severity, "{}", message),
        }
    }
}

/// Keeps every notification, in order
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries.lock().clone()
    }

    pub fn last(&self) -> Option<(Severity, String)> {
        self.entries.lock().last().cloned()
    }

    pub fn drain(&self) -> Vec<(Severity, String)> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        self.entries.lock().push((severity, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        notifier.notify(Severity::Info, "one");
        notifier.notify(Severity::Error, "two");

        assert_eq!(notifier.last(), Some((Severity::Error, "two".to_string())));
        assert_eq!(notifier.drain().len(), 2);
        assert!(notifier.entries().is_empty());
    }
}
