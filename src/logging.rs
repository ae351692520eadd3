//! Diagnostics routed to the browser console.
//!
//! Game code logs through `tracing`. On wasm32 there is no stdout, so
//! [`ConsoleLayer`] formats each event as one line and hands it to
//! `web_sys::console` at the matching severity.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Where formatted lines go.
pub type Sink = fn(Level, &str);

pub struct ConsoleLayer {
    max_level: Level,
    sink: Sink,
}

impl ConsoleLayer {
    pub fn new(max_level: Level) -> Self {
        Self {
            max_level,
            sink: browser_console,
        }
    }

    #[cfg(test)]
    pub fn with_sink(max_level: Level, sink: Sink) -> Self {
        Self { max_level, sink }
    }
}

fn browser_console(level: Level, line: &str) {
    let js = js_sys::JsString::from(line);
    match level {
        Level::ERROR => web_sys::console::error_1(&js),
        Level::WARN => web_sys::console::warn_1(&js),
        Level::DEBUG | Level::TRACE => web_sys::console::debug_1(&js),
        _ => web_sys::console::log_1(&js),
    }
}

/// Collects the `message` field and the remaining fields as `key=value`.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        // More verbose levels compare greater.
        if *meta.level() > self.max_level {
            return;
        }
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let line = format!(
            "{:>5} {}: {}{}",
            meta.level(),
            meta.target(),
            visitor.message,
            visitor.fields
        );
        (self.sink)(*meta.level(), &line);
    }
}

/// Install the console layer as the global subscriber. Safe to call twice.
pub fn init() {
    use tracing_subscriber::prelude::*;

    let _ = tracing_subscriber::registry()
        .with(ConsoleLayer::new(Level::INFO))
        .try_init();
}
