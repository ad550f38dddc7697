// Wire diagnostics
//
// Opt-in tracing of every exchange with the switch: URLs, response
// headers, and body previews. Lines go to a caller-supplied sink, or to
// `tracing` when none is installed. Never touches the body handed back.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Receives one formatted line plus its structured context.
pub type DiagnosticSink = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// Longest body preview included in a trace line.
pub const BODY_PREVIEW_LIMIT: usize = 200;

#[derive(Clone, Default)]
pub struct Diagnostics {
    enabled: bool,
    sink: Option<DiagnosticSink>,
}

impl Diagnostics {
    /// Diagnostics off.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Diagnostics on, logged through `tracing`.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            sink: None,
        }
    }

    /// Diagnostics on, delivered to `sink`.
    pub fn with_sink(sink: DiagnosticSink) -> Self {
        Self {
            enabled: true,
            sink: Some(sink),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit `message | <context json>` if diagnostics are on.
    pub fn emit(&self, message: &str, context: &Value) {
        if !self.enabled {
            return;
        }

        let line = if context.as_object().is_some_and(|o| !o.is_empty()) {
            format!("{message} | {context}")
        } else {
            message.to_owned()
        };

        match &self.sink {
            Some(sink) => sink(&line, context),
            None => tracing::debug!(target: "planet_api::diagnostics", "{line}"),
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("enabled", &self.enabled)
            .field("sink", &self.sink.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// First [`BODY_PREVIEW_LIMIT`] characters of the trimmed body.
pub fn body_preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .trim()
        .chars()
        .take(BODY_PREVIEW_LIMIT)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    #[test]
    fn disabled_emits_nothing() {
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let captured = Arc::clone(&lines);
        let mut diag = Diagnostics::with_sink(Arc::new(move |line: &str, _: &Value| {
            captured.lock().unwrap().push(line.to_owned());
        }));
        diag.enabled = false;
        diag.emit("Issuing request", &json!({"method": "GET"}));
        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn sink_receives_line_and_context() {
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let captured = Arc::clone(&lines);
        let diag = Diagnostics::with_sink(Arc::new(move |line: &str, ctx: &Value| {
            assert_eq!(ctx["status"], 200);
            captured.lock().unwrap().push(line.to_owned());
        }));
        diag.emit("Response received", &json!({"status": 200}));
        assert_eq!(
            lines.lock().unwrap().as_slice(),
            ["Response received | {\"status\":200}"]
        );
    }

    #[test]
    fn preview_truncates() {
        let body = "x".repeat(500);
        assert_eq!(body_preview(body.as_bytes()).len(), BODY_PREVIEW_LIMIT);
    }
}
