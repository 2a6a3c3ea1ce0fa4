//! Colorful console output for compiler events.
//!
//! Provides a custom `tracing` layer that formats kernjit events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Unit finalized
//! - **DEBUG**: Kernel compiled
//! - **TRACE**: Symbol resolved

use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes console output.
///
/// Safe to call multiple times - only the first call has effect. The
/// `RUST_LOG` environment variable overrides the default `info` level.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(KernjitConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that formats kernjit events with colors.
pub struct KernjitConsoleLayer;

impl<S: Subscriber> Layer<S> for KernjitConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with("kernjit") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    name: Option<String>,
    op1: Option<String>,
    op2: Option<String>,
    kernel_count: Option<u64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value).trim_matches('"').to_string();
        self.record_str(field, &s);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "kernel_count" {
            self.kernel_count = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        let slot = match field.name() {
            "event" => &mut self.event,
            "name" => &mut self.name,
            "op1" => &mut self.op1,
            "op2" => &mut self.op2,
            _ => return,
        };
        *slot = Some(value.to_string());
    }
}

fn format_event(v: &EventVisitor) -> String {
    match v.event.as_deref() {
        Some("kernel_compiled") => format!(
            "{} {} {} {} = (a {} b) {} c",
            timestamp().bright_black(),
            "DEBUG".bright_blue(),
            "[compile]".bright_cyan(),
            v.name.as_deref().unwrap_or("?").white().bold(),
            v.op1.as_deref().unwrap_or("?").yellow(),
            v.op2.as_deref().unwrap_or("?").yellow(),
        ),
        Some("unit_finalized") => format!(
            "{} {} {} linked {} kernel(s)",
            timestamp().bright_black(),
            "INFO".bright_green(),
            "[link]".bright_cyan(),
            v.kernel_count.unwrap_or(0).bright_magenta(),
        ),
        Some("symbol_resolved") => format!(
            "{} {} {} {}",
            timestamp().bright_black(),
            "TRACE".bright_black(),
            "[resolve]".bright_cyan(),
            v.name.as_deref().unwrap_or("?").white(),
        ),
        Some("duplicate_symbol") => format!(
            "{} {} {} symbol {} already defined",
            timestamp().bright_black(),
            "WARN".bright_yellow(),
            "[compile]".bright_cyan(),
            v.name.as_deref().unwrap_or("?").white().bold(),
        ),
        _ => String::new(),
    }
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_compiled_event() {
        let v = EventVisitor {
            event: Some("kernel_compiled".into()),
            name: Some("kernel_3".into()),
            op1: Some("*".into()),
            op2: Some("+".into()),
            ..Default::default()
        };
        let out = format_event(&v);
        assert!(out.contains("kernel_3"));
        assert!(out.contains("[compile]"));
    }

    #[test]
    fn test_format_finalized_event() {
        let v = EventVisitor {
            event: Some("unit_finalized".into()),
            kernel_count: Some(25),
            ..Default::default()
        };
        assert!(format_event(&v).contains("25"));
    }

    #[test]
    fn test_unknown_event_is_silent() {
        assert!(format_event(&EventVisitor::default()).is_empty());
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
