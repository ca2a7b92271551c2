use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Span fields shown in their own column by the pretty formatter
const PROJECT_FIELD: &str = "project_id";
const EPOCH_FIELD: &str = "epoch_id";

const DEFAULT_DIRECTIVE: &str = "snapshotter=info,snapshotter_resilience=info";

/// Output format of the global subscriber, selected through `LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Fields recorded on a span, accumulated across `record` calls
#[derive(Debug, Clone, Default)]
pub struct SpanFields {
    values: BTreeMap<String, String>,
}

impl SpanFields {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn insert(&mut self, name: &str, value: String) {
        self.values.insert(name.to_string(), value);
    }
}

impl Visit for SpanFields {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.insert(field.name(), format!("{:?}", value).trim_matches('"').to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field.name(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field.name(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field.name(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field.name(), value.to_string());
    }
}

/// Stores the fields of every span in its extensions so formatters can read them back.
pub struct FieldCollectorLayer;

impl<S> Layer<S> for FieldCollectorLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut fields = SpanFields::default();
        attrs.record(&mut fields);
        span.extensions_mut().insert(fields);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut extensions = span.extensions_mut();
        let mut fields = extensions.remove::<SpanFields>().unwrap_or_default();
        values.record(&mut fields);
        extensions.insert(fields);
    }
}

/// Collects the fields of a span scope, innermost span winning on conflicts
fn scope_fields<S, N>(ctx: &FmtContext<'_, S, N>) -> (Option<String>, BTreeMap<String, String>)
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let mut merged = BTreeMap::new();
    let mut span_name = None;
    if let Some(scope) = ctx.event_scope() {
        for span in scope.from_root() {
            span_name = Some(span.metadata().name().to_string());
            if let Some(fields) = span.extensions().get::<SpanFields>() {
                merged.extend(fields.values.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
    }
    (span_name, merged)
}

#[derive(Default)]
struct EventFields {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        let value = format!("{:?}", value).trim_matches('"').to_string();
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }
}

/// Console formatter: `time | level | project | epoch | component | message (fields)`
pub struct PrettyFormatter;

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();
        let now = Utc::now().format("%y-%m-%d %H:%M:%S");

        let level_color = match *meta.level() {
            Level::TRACE => "\x1b[90m",
            Level::DEBUG => "\x1b[34m",
            Level::INFO => "\x1b[32m",
            Level::WARN => "\x1b[33m",
            Level::ERROR => "\x1b[31m",
        };
        let (ts, column, field, sep, reset) = ("\x1b[96m", "\x1b[92m", "\x1b[90m", "\x1b[90m|\x1b[0m", "\x1b[0m");

        let (_, span_fields) = scope_fields(ctx);
        let project = span_fields.get(PROJECT_FIELD).map(String::as_str).unwrap_or("-");
        let epoch = span_fields.get(EPOCH_FIELD).map(String::as_str).unwrap_or("-");

        let mut visitor = EventFields::default();
        event.record(&mut visitor);

        write!(writer, "{ts}{now}{reset} {sep} ")?;
        write!(writer, "{level_color}{:<5}{reset} {sep} ", meta.level())?;
        write!(writer, "{column}{:<28}{reset} {sep} ", truncate(project, 28))?;
        write!(writer, "{column}{:>8}{reset} {sep} ", epoch)?;
        write!(writer, "{column}{:<10}{reset} {sep} ", component_name(meta.target()))?;
        write!(writer, "\x1b[97m{}{reset}", visitor.message)?;

        let extra: Vec<String> =
            visitor.fields.iter().map(|(name, value)| format!("{field}{}={}{reset}", name, value)).collect();
        if !extra.is_empty() {
            write!(writer, " ({})", extra.join(", "))?;
        }
        writeln!(writer)
    }
}

#[derive(Default)]
struct JsonFields {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl Visit for JsonFields {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        let value = format!("{:?}", value).trim_matches('"').to_string();
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }
}

/// One JSON object per line, span fields merged under `fields`
pub struct JsonEventFormatter;

impl<S, N> FormatEvent<S, N> for JsonEventFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();

        let mut visitor = JsonFields::default();
        event.record(&mut visitor);

        let mut root = Map::new();
        root.insert("timestamp".into(), Value::String(Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)));
        root.insert("level".into(), Value::String(meta.level().to_string()));
        root.insert("target".into(), Value::String(meta.target().to_string()));
        root.insert("component".into(), Value::String(component_name(meta.target()).to_string()));
        if let Some(file) = meta.file() {
            root.insert("filename".into(), Value::String(file.to_string()));
        }
        if let Some(line) = meta.line() {
            root.insert("line_number".into(), Value::from(line));
        }
        if let Some(message) = visitor.message.take() {
            root.insert("message".into(), Value::String(message));
        }

        let mut fields = visitor.fields;
        let (span_name, span_fields) = scope_fields(ctx);
        if let Some(name) = span_name {
            fields.insert("span_name".into(), Value::String(name));
        }
        for (key, value) in span_fields {
            fields.entry(key).or_insert(Value::String(value));
        }
        if !fields.is_empty() {
            root.insert("fields".into(), Value::Object(fields));
        }

        let line = serde_json::to_string(&Value::Object(root)).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

/// Installs color_eyre and the global tracing subscriber.
///
/// `RUST_LOG` drives filtering (falling back to info for this crate) and `LOG_FORMAT=json`
/// switches to structured output.
pub fn init_logging() {
    color_eyre::install().expect("Unable to install color_eyre");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(Level::INFO.into())
            .parse(DEFAULT_DIRECTIVE)
            .expect("Invalid default filter directive")
    });

    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());
    let base = Registry::default().with(env_filter).with(FieldCollectorLayer);

    match format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer().event_format(JsonEventFormatter);
            tracing::subscriber::set_global_default(base.with(fmt_layer).with(ErrorLayer::default()))
                .expect("Failed to set global default subscriber");
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer().event_format(PrettyFormatter);
            tracing::subscriber::set_global_default(base.with(fmt_layer).with(ErrorLayer::default()))
                .expect("Failed to set global default subscriber");
        }
    }
}

/// Short display name of the module that emitted an event
pub fn component_name(target: &str) -> &'static str {
    let module = target.strip_prefix("snapshotter::").unwrap_or(target);
    match module {
        m if m.starts_with("worker::channel") || m.starts_with("core::client::collector") => "COLLECTOR",
        m if m.starts_with("worker::uploader") || m.starts_with("core::client::storage") => "STORAGE",
        m if m.starts_with("worker::reporter") || m.starts_with("core::client::notification") => "REPORTING",
        m if m.starts_with("worker::signer") || m.starts_with("worker::metadata") => "PROTOCOL",
        m if m.starts_with("core::client::chain") => "CHAIN",
        m if m.starts_with("worker") => "PIPELINE",
        m if m.starts_with("snapshotter_resilience") => "RETRY",
        m if m.starts_with("snapshotter") || m.starts_with("core") || m.starts_with("cli") => "-",
        _ => "EXTERNAL",
    }
}

fn truncate(value: &str, width: usize) -> &str {
    match value.char_indices().nth(width) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("json"), LogFormat::Json)]
    #[case(Some(" JSON "), LogFormat::Json)]
    #[case(Some("pretty"), LogFormat::Pretty)]
    #[case(Some("yaml"), LogFormat::Pretty)]
    #[case(None, LogFormat::Pretty)]
    fn test_log_format_from_env(#[case] value: Option<&str>, #[case] expected: LogFormat) {
        assert_eq!(LogFormat::from_env_value(value), expected);
    }

    #[rstest]
    #[case("snapshotter::worker::channel", "COLLECTOR")]
    #[case("snapshotter::core::client::storage::ipfs", "STORAGE")]
    #[case("snapshotter::worker::commit", "PIPELINE")]
    #[case("snapshotter_resilience::retry", "RETRY")]
    #[case("snapshotter", "-")]
    #[case("hyper::client", "EXTERNAL")]
    fn test_component_name(#[case] target: &str, #[case] expected: &str) {
        assert_eq!(component_name(target), expected);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("aggregate_pairContract", 9), "aggregate");
        assert_eq!(truncate("é€x", 2), "é€");
        assert_eq!(truncate("short", 28), "short");
    }
}
