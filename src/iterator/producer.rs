//! Background page fetcher
//!
//! The producer walks `self -> next -> next ...`, one page at a time, and
//! hands each object to the consumer together with the cursor that resumes
//! right after it. It owns the sending half of the channel: when it returns,
//! the channel closes and a waiting consumer sees the end of the sequence.

use crate::client::{Client, Page};
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::object::Object;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// What the producer hands to the consumer
#[derive(Debug)]
pub(super) enum Delivery {
    Item { object: Object, cursor: Cursor },
    Failed(Error),
}

enum Offer {
    Sent,
    Cancelled,
}

pub(super) struct Producer {
    pub(super) client: Client,
    pub(super) tx: mpsc::Sender<Delivery>,
    pub(super) cancel: CancellationToken,
    pub(super) limit: usize,
}

impl Producer {
    /// Wait for room in the buffer or for cancellation, whichever comes first
    async fn offer(&self, delivery: Delivery) -> Offer {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Offer::Cancelled,
            res = self.tx.send(delivery) => match res {
                Ok(()) => Offer::Sent,
                // Receiver dropped
                Err(_) => Offer::Cancelled,
            },
        }
    }

    async fn fetch(&self, link: &str) -> Result<Page> {
        let url = Url::parse(link)?;
        self.client.fetch_page(&url).await
    }

    fn limit_reached(&self, sent: usize) -> bool {
        self.limit > 0 && sent >= self.limit
    }

    /// Fetch pages starting at `link`, dropping the first `skip` objects of
    /// the first page
    pub(super) async fn run(self, mut link: String, mut skip: usize) {
        let mut sent = 0usize;

        let reason = 'pages: loop {
            if self.limit_reached(sent) {
                break "limit reached";
            }

            let fetched = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break 'pages "cancelled",
                fetched = self.fetch(&link) => fetched,
            };

            let page = match fetched {
                Ok(page) => page,
                Err(e) => {
                    warn!("Failed to fetch {}: {}", link, e);
                    let _ = self.offer(Delivery::Failed(e)).await;
                    break "fetch failed";
                }
            };

            // Mid-page cursors re-fetch this page and skip forward
            let self_link = if page.links.self_link.is_empty() {
                link.clone()
            } else {
                page.links.self_link.clone()
            };
            let next = page.links.next;

            let objects: Vec<Object> = page.objects.into_iter().skip(skip).collect();
            let count = objects.len();

            for (i, object) in objects.into_iter().enumerate() {
                let cursor = if i + 1 == count {
                    Cursor::new(next.clone(), 0)
                } else {
                    Cursor::new(self_link.clone(), skip + i + 1)
                };

                if let Offer::Cancelled = self.offer(Delivery::Item { object, cursor }).await {
                    break 'pages "cancelled";
                }

                sent += 1;
                if self.limit_reached(sent) {
                    break;
                }
            }

            if count == 0 || next.is_empty() {
                break "exhausted";
            }

            link = next;
            skip = 0;
        };

        debug!("Iterator stopped after {} objects: {}", sent, reason);
    }
}
