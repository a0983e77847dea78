use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{Event, Result};

/// A live subscription to the runtime's event stream.
///
/// Events arrive through a bounded channel fed by a background reader. Dropping the
/// subscription unsubscribes as well, so the reader never outlives its consumer.
#[derive(Debug)]
pub struct EventSubscription {
    events: mpsc::Receiver<Result<Event>>,
    reader: Option<JoinHandle<()>>,
}

impl EventSubscription {
    pub fn new(events: mpsc::Receiver<Result<Event>>, reader: Option<JoinHandle<()>>) -> Self {
        Self { events, reader }
    }

    /// Waits for the next event. `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<Result<Event>> {
        self.events.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.events.close();
        if let Some(reader) = self.reader.take() {
            reader.abort();
            log::debug!("Unsubscribed from runtime events");
        }
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}
