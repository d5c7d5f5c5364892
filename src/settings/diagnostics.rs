use std::{cell::RefCell, rc::Rc};

use tracing::warn;

/// One-way channel for user-facing error and warning messages.
pub trait DiagnosticSink {
    /// Shows `message` to the user.
    fn report(&self, message: &str);
}

/// Reports diagnostics as `warn` level tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, message: &str) {
        warn!(target: "plugin_settings::diagnostics", "{message}");
    }
}

/// Buffers diagnostics in memory.
///
/// Clones share the same buffer, so one clone can be handed to a registry
/// while another is kept to read the messages back.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    messages: Rc<RefCell<Vec<String>>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages reported so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Removes and returns all messages reported so far.
    pub fn take(&self) -> Vec<String> {
        self.messages.borrow_mut().drain(..).collect()
    }

    /// Whether nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
