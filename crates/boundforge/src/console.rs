//! Colorful console output for engine events.
//!
//! Provides a custom `tracing` layer that formats the engine's structured
//! events (`solve_start`, `new_incumbent`, `progress`, `solve_end`, ...).
//! Auto-initialized by [`solve`](crate::solve) when the `console` feature is
//! enabled.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events, new incumbents and progress lines
//! - **WARN**: Dropped nodes and rejected branches
//! - **DEBUG**: Branching decisions

use std::io::{self, Write};
use std::sync::OnceLock;

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "boundforge_solver=info,boundforge=info";

/// Initializes console output.
///
/// Safe to call multiple times - only the first call has effect. If another
/// global subscriber is already installed it is left in place.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(EngineConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that formats engine events with colors.
pub struct EngineConsoleLayer;

impl<S: Subscriber> Layer<S> for EngineConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("boundforge") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    sense: Option<String>,
    selection: Option<String>,
    status: Option<String>,
    reason: Option<String>,
    node: Option<String>,
    error: Option<String>,
    threads: Option<u64>,
    max_nodes: Option<u64>,
    time_limit_ms: Option<u64>,
    nodes: Option<u64>,
    open: Option<u64>,
    pruned: Option<u64>,
    depth: Option<u64>,
    elapsed_ms: Option<u64>,
    nodes_per_sec: Option<u64>,
    backend_failures: Option<u64>,
    objective: Option<f64>,
    incumbent: Option<f64>,
    best_bound: Option<f64>,
    gap_pct: Option<f64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value).trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "message" => self.message = Some(s),
            "sense" => self.sense = Some(s),
            "selection" => self.selection = Some(s),
            "status" => self.status = Some(s),
            "reason" => self.reason = Some(s),
            "node" => self.node = Some(s),
            "error" => self.error = Some(s),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_debug(field, &value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "threads" => self.threads = Some(value),
            "max_nodes" => self.max_nodes = Some(value),
            "time_limit_ms" => self.time_limit_ms = Some(value),
            "nodes" => self.nodes = Some(value),
            "open" => self.open = Some(value),
            "pruned" => self.pruned = Some(value),
            "depth" => self.depth = Some(value),
            "elapsed_ms" => self.elapsed_ms = Some(value),
            "nodes_per_sec" => self.nodes_per_sec = Some(value),
            "backend_failures" => self.backend_failures = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "objective" => self.objective = Some(value),
            "incumbent" => self.incumbent = Some(value),
            "best_bound" => self.best_bound = Some(value),
            "gap_pct" => self.gap_pct = Some(value),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    match v.event.as_deref().unwrap_or("") {
        "solve_start" => format_solve_start(v),
        "new_incumbent" => format_new_incumbent(v),
        "progress" => format_progress(v),
        "solve_end" => format_solve_end(v),
        "backend_failure" | "branch_rejected" | "config_fallback" if level <= Level::WARN => {
            format_warning(v)
        }
        _ => String::new(),
    }
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.4}"),
        Some(v) if v > 0.0 => "+inf".to_string(),
        Some(_) => "-inf".to_string(),
        None => "-".to_string(),
    }
}

fn format_elapsed(v: &EventVisitor) -> String {
    let secs = v.elapsed_ms.unwrap_or(0) as f64 / 1000.0;
    format!("{secs:>8.3}s").bright_black().to_string()
}

fn format_solve_start(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} Solving │ {} │ {} │ {} thread(s)",
        format_elapsed(v),
        "▶".bright_green().bold(),
        v.sense.as_deref().unwrap_or("?").bright_yellow(),
        v.selection.as_deref().unwrap_or("?").bright_magenta(),
        count(v.threads).bright_yellow()
    );
    if let Some(nodes) = v.max_nodes {
        output.push_str(&format!(" │ {} node limit", count(Some(nodes)).bright_yellow()));
    }
    if let Some(ms) = v.time_limit_ms {
        output.push_str(&format!(" │ {} ms limit", count(Some(ms)).bright_yellow()));
    }
    output
}

fn format_new_incumbent(v: &EventVisitor) -> String {
    format!(
        "{} {} New incumbent {} │ node {} │ depth {}",
        format_elapsed(v),
        "★".bright_yellow().bold(),
        number(v.objective).bright_green().bold(),
        v.node.as_deref().unwrap_or("?"),
        count(v.depth)
    )
}

fn format_progress(v: &EventVisitor) -> String {
    format!(
        "{} {} {} nodes │ {} open │ bound {} │ incumbent {} │ gap {}% │ {}/s",
        format_elapsed(v),
        "⚡".cyan(),
        count(v.nodes).white().bold(),
        count(v.open),
        number(v.best_bound).bright_magenta(),
        number(v.incumbent).bright_green(),
        v.gap_pct.map_or("-".to_string(), |g| format!("{g:.3}")),
        count(v.nodes_per_sec).bright_black()
    )
}

fn format_solve_end(v: &EventVisitor) -> String {
    let status = v.status.as_deref().unwrap_or("Unknown");
    let colored = match status {
        "Optimal" => status.bright_green().bold().to_string(),
        "Feasible" | "LimitReached" => status.bright_yellow().bold().to_string(),
        _ => status.bright_red().bold().to_string(),
    };

    format!(
        "{} {} Solving complete │ {} ({}) │ objective {} │ bound {} │ {} nodes │ {} pruned │ {} failures",
        format_elapsed(v),
        "■".bright_cyan().bold(),
        colored,
        v.reason.as_deref().unwrap_or("-"),
        number(v.objective).bright_green(),
        number(v.best_bound).bright_magenta(),
        count(v.nodes),
        count(v.pruned),
        count(v.backend_failures)
    )
}

fn format_warning(v: &EventVisitor) -> String {
    format!(
        "{} {} {} │ {}",
        "!".bright_red().bold(),
        v.message.as_deref().unwrap_or("warning").yellow(),
        v.node.as_deref().unwrap_or("-"),
        v.error.as_deref().unwrap_or("")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor(event: &str) -> EventVisitor {
        EventVisitor {
            event: Some(event.to_string()),
            ..EventVisitor::default()
        }
    }

    #[test]
    fn test_solve_end_line() {
        let mut v = visitor("solve_end");
        v.status = Some("Optimal".to_string());
        v.reason = Some("exhausted".to_string());
        v.objective = Some(7.0);
        v.best_bound = Some(7.0);
        v.nodes = Some(12_345);

        let line = format_event(&v, Level::INFO);
        assert!(line.contains("Optimal"));
        assert!(line.contains("7.0000"));
        assert!(line.contains("12,345"));
    }

    #[test]
    fn test_progress_line_with_unknown_bound() {
        let mut v = visitor("progress");
        v.best_bound = Some(f64::INFINITY);

        let line = format_event(&v, Level::INFO);
        assert!(line.contains("+inf"));
        assert!(line.contains("gap -%"));
    }

    #[test]
    fn test_unknown_events_are_silent() {
        assert!(format_event(&visitor("node_branched"), Level::DEBUG).is_empty());
        assert!(format_event(&EventVisitor::default(), Level::INFO).is_empty());
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
