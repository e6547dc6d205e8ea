use chatstream_client::{DomainEvent, ReadMarkSink, StreamFailure, StreamHandler};
use chatstream_types::ReadMark;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use tokio::sync::Notify;

/// Writes one JSON document per line to stdout
fn print_json_line<T: Serialize>(value: &T) {
    let line = match serde_json::to_string(value) {
        Ok(line) => line,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize output");
            return;
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{line}").and_then(|_| stdout.flush()) {
        tracing::error!(error = %e, "Failed to write to stdout");
    }
}

/// Prints stream events and wakes `main` when the stream gives up
#[derive(Default)]
pub struct JsonLinesHandler {
    gave_up: Notify,
}

impl JsonLinesHandler {
    pub async fn exhausted(&self) {
        self.gave_up.notified().await;
    }
}

impl StreamHandler for JsonLinesHandler {
    fn on_message(&self, event: DomainEvent) {
        print_json_line(&event);
    }

    fn on_error(&self, failure: StreamFailure) {
        tracing::error!(error = %failure, "Stream error");
        if failure.is_terminal() {
            // notify_one keeps a permit if main is not waiting yet
            self.gave_up.notify_one();
        }
    }
}

#[derive(Serialize)]
struct MarkLine {
    message_id: i64,
    #[serde(flatten)]
    mark: ReadMark,
}

/// Prints one line per message after each read-status refresh
pub struct JsonLinesMarks;

impl ReadMarkSink for JsonLinesMarks {
    fn apply(&self, marks: BTreeMap<i64, ReadMark>) {
        for (message_id, mark) in marks {
            print_json_line(&MarkLine { message_id, mark });
        }
    }
}
