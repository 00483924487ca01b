use log::{debug, info, warn};

/// Per-component logger; every record carries the component name as its target.
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    pub fn record(&self, message: &str) {
        info!(target: self.component, "{}", message);
    }

    pub fn detail(&self, message: &str) {
        debug!(target: self.component, "{}", message);
    }

    pub fn caution(&self, message: &str) {
        warn!(target: self.component, "{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("safetycore")
    }
}
