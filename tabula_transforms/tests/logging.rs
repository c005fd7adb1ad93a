// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Every operation reports itself with one `debug` event.

use std::fmt;
use std::sync::{Arc, Mutex};

use tabula_core::{Dataset, row};
use tabula_transforms::{dedup, project};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

/// Collects the message of every `debug` event.
#[derive(Clone, Default)]
struct Messages(Arc<Mutex<Vec<String>>>);

struct MessageVisitor<'a>(&'a mut Option<String>);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for Messages {
    fn on_event(&self, event: &tracing::Event<'_>, _: Context<'_, S>) {
        if *event.metadata().level() != tracing::Level::DEBUG {
            return;
        }
        let mut message = None;
        event.record(&mut MessageVisitor(&mut message));
        if let Some(message) = message {
            self.0.lock().unwrap().push(message);
        }
    }
}

fn messages_of(f: impl FnOnce()) -> Vec<String> {
    let messages = Messages::default();
    let _guard = Registry::default().with(messages.clone()).set_default();
    f();
    messages.0.lock().unwrap().clone()
}

#[test]
fn dedup_and_rename_emit_debug_events() {
    let ds = Dataset::new(["k", "v"], vec![row!["a", 1], row!["a", 2], row!["b", 3]]);

    let messages = messages_of(|| {
        dedup::count_distinct(&ds, Some(&["k"]), "n").unwrap();
        assert!(!dedup::is_unique(&ds, Some(&["k"])).unwrap());
        project::rename(&ds, "v", "value").unwrap();
    });

    assert_eq!(messages, ["count distinct", "is unique", "rename"]);
}
