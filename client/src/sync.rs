//! Conversation synchronizer: one task per open conversation view,
//! merging a one-shot history load with the live message feed.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use plaza_common::listing::ListingId;
use plaza_common::message::{Message, MessageLog};

use crate::error::StoreError;
use crate::store::{MessageFeed, MessageStore};

/// Events emitted by an open conversation, in order: exactly one
/// `History` (or one terminal `Error`), then zero or more
/// `MessageAppended`.
#[derive(Debug)]
pub enum ConversationEvent {
    /// Initial load completed; the full ordered history.
    History(Vec<Message>),
    /// A live message was merged onto the tail of the log.
    MessageAppended(Message),
    /// The initial load failed. Terminal — reopen the conversation to
    /// retry.
    Error(StoreError),
}

/// Handle to an open conversation view.
///
/// The backing task is subscribed to the listing's change feed before
/// the history load starts, so messages inserted during the load are
/// buffered and merged afterwards rather than lost. Duplicates (such as
/// the echo of a message already present in history) are never
/// re-emitted.
pub struct ConversationHandle {
    events: mpsc::UnboundedReceiver<ConversationEvent>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ConversationHandle {
    pub(crate) fn open(store: Arc<dyn MessageStore>, listing_id: ListingId) -> Self {
        // Subscribe before spawning so no insert can slip between the
        // history load and the start of the live feed.
        let feed = store.subscribe(&listing_id);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(store, listing_id, feed, event_tx, shutdown_rx));
        Self {
            events: event_rx,
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    /// Next conversation event. `None` after the view has been closed or
    /// the task has terminated.
    pub async fn next_event(&mut self) -> Option<ConversationEvent> {
        self.events.recv().await
    }

    /// Close the view and tear down the subscription. Events already
    /// queued are discarded; nothing fires afterwards.
    pub async fn close(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for ConversationHandle {
    fn drop(&mut self) {
        // Dropping without close() still stops the task.
        self.task.abort();
    }
}

async fn run(
    store: Arc<dyn MessageStore>,
    listing_id: ListingId,
    mut feed: MessageFeed,
    events: mpsc::UnboundedSender<ConversationEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let history = match store.messages_for_listing(&listing_id).await {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!(listing = %listing_id, error = %e, "conversation history load failed");
            let _ = events.send(ConversationEvent::Error(e));
            return;
        }
    };

    let mut log = MessageLog::new();
    log.load(history);
    tracing::debug!(listing = %listing_id, count = log.len(), "conversation history loaded");
    if events
        .send(ConversationEvent::History(log.messages().to_vec()))
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            incoming = feed.recv() => match incoming {
                Some(message) => {
                    if log.apply(message.clone())
                        && events.send(ConversationEvent::MessageAppended(message)).is_err()
                    {
                        break;
                    }
                }
                None => break,
            },
        }
    }
}
