//! Collection iterators
//!
//! A [`CollectionIterator`] walks a paginated collection. Pages are fetched
//! by a background task and buffered ahead of the consumer, which pulls one
//! object at a time with [`CollectionIterator::advance`].
//!
//! # Overview
//!
//! - At most one page request is in flight, pages are requested strictly in
//!   `self -> next -> next ...` order
//! - Read-ahead is bounded by `IteratorOptions::buffer_size`
//! - After each object, [`CollectionIterator::cursor`] returns a token that
//!   resumes iteration right after that object, also from another process
//! - The first fetch or decode error ends the iteration; it is reported by
//!   [`CollectionIterator::error`] once `advance` returns false
//! - Cancellation (explicit or by dropping the iterator) stops the
//!   background task
//!
//! ```rust,ignore
//! let mut it = client.iterator(client.url("comments")?, IteratorOptions::new().limit(100))?;
//! while it.advance().await {
//!     let comment = it.current().unwrap();
//!     println!("{}", comment.id());
//! }
//! if let Some(err) = it.error() {
//!     eprintln!("stopped at {}: {err}", it.cursor());
//! }
//! ```

mod producer;
mod types;

pub use types::{IteratorOptions, SearchOptions, DEFAULT_BUFFER_SIZE};

use crate::client::Client;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::object::Object;
use futures::Stream;
use producer::{Delivery, Producer};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Handle for cancelling an iterator from another task
#[derive(Debug, Clone)]
pub struct Canceller {
    token: CancellationToken,
}

impl Canceller {
    /// Stop the iteration; idempotent
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Iterator over the objects of a collection
pub struct CollectionIterator {
    rx: mpsc::Receiver<Delivery>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    current: Option<Object>,
    cursor: String,
    error: Option<Error>,
    limit: usize,
    count: usize,
}

impl CollectionIterator {
    /// Spawn the producer and return without waiting for the first page
    pub(crate) fn start(client: Client, url: Url, options: IteratorOptions) -> Result<Self> {
        let resumed = Cursor::decode(&options.cursor)?;

        let (link, skip) = if resumed.is_empty() {
            (initial_link(url, &options), 0)
        } else {
            (resumed.link, resumed.offset)
        };

        let (tx, rx) = mpsc::channel(options.buffer_size.max(1));
        let cancel = CancellationToken::new();
        let producer = Producer {
            client,
            tx,
            cancel: cancel.clone(),
            limit: options.limit,
        };
        let handle = tokio::spawn(producer.run(link, skip));

        Ok(Self {
            rx,
            cancel,
            handle,
            current: None,
            cursor: String::new(),
            error: None,
            limit: options.limit,
            count: 0,
        })
    }

    /// Move to the next object
    ///
    /// Returns false at the end of the collection, once the limit is reached,
    /// after cancellation, or when an error occurred (see [`Self::error`]).
    pub async fn advance(&mut self) -> bool {
        if self.limit > 0 && self.count >= self.limit {
            return false;
        }
        if self.cancel.is_cancelled() {
            return false;
        }

        let delivery = tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            delivery = self.rx.recv() => delivery,
        };

        match delivery {
            Some(Delivery::Item { object, cursor }) => {
                self.current = Some(object);
                self.cursor = cursor.encode();
                self.count += 1;
                true
            }
            Some(Delivery::Failed(err)) => {
                self.error = Some(err);
                false
            }
            None => false,
        }
    }

    /// The object of the last successful [`Self::advance`]
    pub fn current(&self) -> Option<&Object> {
        self.current.as_ref()
    }

    /// Token that resumes iteration right after [`Self::current`]
    ///
    /// Empty when the collection has no more objects.
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    /// The error that ended the iteration, if any
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Take the terminal error out of the iterator
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Number of objects returned so far
    pub fn count(&self) -> usize {
        self.count
    }

    /// Stop the iteration; safe to call repeatedly and after the end
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle that can cancel this iterator from elsewhere
    pub fn canceller(&self) -> Canceller {
        Canceller {
            token: self.cancel.clone(),
        }
    }

    /// Whether the background task has exited
    pub fn is_closed(&self) -> bool {
        self.handle.is_finished()
    }

    /// Turn the iterator into a stream of objects
    ///
    /// The stream ends with the terminal error, if there is one.
    pub fn into_stream(self) -> impl Stream<Item = Result<Object>> + Send {
        futures::stream::unfold(Some(self), |state| async move {
            let mut it = state?;
            if it.advance().await {
                let object = it.current.take()?;
                Some((Ok(object), Some(it)))
            } else {
                it.error.take().map(|e| (Err(e), None))
            }
        })
    }
}

impl Drop for CollectionIterator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for CollectionIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionIterator")
            .field("limit", &self.limit)
            .field("count", &self.count)
            .field("cursor", &self.cursor)
            .field("error", &self.error)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// First page link: the collection URL plus page size and filter
fn initial_link(mut url: Url, options: &IteratorOptions) -> String {
    let mut params = Vec::new();
    if options.batch_size > 0 {
        params.push(("limit", options.batch_size.to_string()));
    }
    if !options.filter.is_empty() {
        params.push(("filter", options.filter.clone()));
    }
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    url.to_string()
}

#[cfg(test)]
mod tests;
