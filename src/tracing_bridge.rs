//! Bridge from Bevy's `tracing` spans to Micromegas thread-local scopes.
//!
//! With the `trace` feature Bevy opens a `tracing` span for every schedule
//! run and every system. `SpanBridgeLayer` picks the span kinds it was built
//! for and replays them as Micromegas named scopes, labelled by the span's
//! `name` field (`Update`, `FixedUpdate`, a system path, ...).

use micromegas_tracing::dispatch::{on_begin_named_scope, on_end_named_scope};
use micromegas_tracing::intern_string::intern_string;
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

micromegas_tracing::static_span_location!(BRIDGE_LOCATION);

/// Label stored in a bridged span's extensions.
struct BridgedScope {
    label: &'static str,
}

#[derive(Default)]
struct NameVisitor {
    name: Option<String>,
}

impl Visit for NameVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "name" {
            self.name = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "name" && self.name.is_none() {
            self.name = Some(scope_label(&format!("{value:?}")).to_string());
        }
    }
}

/// Strip the quotes `Debug` puts around string-like names.
fn scope_label(raw: &str) -> &str {
    raw.trim_matches('"')
}

pub struct SpanBridgeLayer {
    span_names: Vec<&'static str>,
}

impl SpanBridgeLayer {
    pub fn new(span_names: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            span_names: span_names.into_iter().collect(),
        }
    }

    /// Bridge schedule runs only. System spans are too fine-grained for the
    /// chase loop.
    pub fn schedules() -> Self {
        Self::new(["schedule"])
    }

    fn bridges(&self, span_name: &str) -> bool {
        self.span_names.contains(&span_name)
    }
}

impl<S> Layer<S> for SpanBridgeLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let span_name = attrs.metadata().name();
        if !self.bridges(span_name) {
            return;
        }

        let mut visitor = NameVisitor::default();
        attrs.record(&mut visitor);
        let label = intern_string(visitor.name.as_deref().unwrap_or(span_name));

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(BridgedScope { label });
        }
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let extensions = span.extensions();
        if let Some(scope) = extensions.get::<BridgedScope>() {
            on_begin_named_scope(&BRIDGE_LOCATION, scope.label);
        }
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let extensions = span.extensions();
        if let Some(scope) = extensions.get::<BridgedScope>() {
            on_end_named_scope(&BRIDGE_LOCATION, scope.label);
        }
    }
}
