//! Injected logging capability.
//!
//! Components never reach for a global debug switch. They receive a
//! [`Logger`] at construction time, which forwards to the `log` facade under
//! the component's target and drops debug chatter unless the run asked for it.

use std::fmt::Arguments;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    component: &'static str,
    debug: bool,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Logger {
    pub fn new(debug: bool) -> Self {
        Self {
            component: "schemagraph",
            debug,
        }
    }

    /// A copy of this logger that reports under `component`.
    pub fn scoped(&self, component: &'static str) -> Self {
        Self {
            component,
            debug: self.debug,
        }
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    pub fn debug(&self, args: Arguments<'_>) {
        if self.debug {
            log::log!(target: self.component, log::Level::Debug, "{}", args);
        }
    }

    pub fn info(&self, args: Arguments<'_>) {
        log::log!(target: self.component, log::Level::Info, "{}", args);
    }

    pub fn warn(&self, args: Arguments<'_>) {
        log::log!(target: self.component, log::Level::Warn, "{}", args);
    }

    pub fn error(&self, args: Arguments<'_>) {
        log::log!(target: self.component, log::Level::Error, "{}", args);
    }
}
