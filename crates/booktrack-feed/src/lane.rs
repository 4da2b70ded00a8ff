//! One tokio task per book.
//!
//! A lane owns its [`Book`] outright; every other task reaches it through a
//! cloneable [`LaneHandle`] that sends commands over a bounded mailbox and
//! waits for the reply on a oneshot channel. Commands are served strictly
//! in mailbox order, so applies on one book never overlap and a query
//! always sees the book between two events.
//!
//! Each successful apply is also published as a [`BookUpdate`] on a
//! broadcast channel for display subscribers. Subscribers that fall behind
//! lose the oldest updates; the book itself is never affected.

use booktrack_matchcore::Book;
use booktrack_types::{
    BookError, BookEvent, BookStats, DepthView, Fill, LaneConfig, MarketId, MatchReport, Result,
    Sequence, TopOfBook,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};

/// What a lane publishes after each applied event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
    pub market: MarketId,
    pub sequence: Sequence,
    pub fills: Vec<Fill>,
    pub top: TopOfBook,
}

enum LaneCommand {
    Apply {
        event: BookEvent,
        reply: oneshot::Sender<Result<MatchReport>>,
    },
    TopOfBook {
        reply: oneshot::Sender<TopOfBook>,
    },
    Depth {
        levels: usize,
        reply: oneshot::Sender<DepthView>,
    },
    Stats {
        reply: oneshot::Sender<BookStats>,
    },
    Close {
        reply: oneshot::Sender<Book>,
    },
}

/// Spawns book lanes.
pub struct BookLane;

impl BookLane {
    /// Move `book` into a new task on the current tokio runtime.
    #[must_use]
    pub fn spawn(book: Book, config: &LaneConfig) -> LaneHandle {
        let market = book.market();
        let (tx, rx) = mpsc::channel(config.mailbox_capacity.max(1));
        let (updates, _) = broadcast::channel(config.update_capacity.max(1));

        tokio::spawn(run(book, rx, updates.clone()));

        LaneHandle {
            market,
            tx,
            updates,
        }
    }
}

async fn run(
    mut book: Book,
    mut rx: mpsc::Receiver<LaneCommand>,
    updates: broadcast::Sender<BookUpdate>,
) {
    let market = book.market();
    tracing::info!(market = %market, next_sequence = book.next_sequence(), "Lane started");

    while let Some(command) = rx.recv().await {
        match command {
            LaneCommand::Apply { event, reply } => {
                let result = book.apply(&event);
                match &result {
                    Ok(report) => {
                        // No subscribers is fine.
                        let _ = updates.send(BookUpdate {
                            market,
                            sequence: report.sequence,
                            fills: report.fills.clone(),
                            top: report.top,
                        });
                    }
                    Err(err) => {
                        tracing::warn!(
                            market = %market,
                            sequence = event.sequence,
                            error = %err,
                            "Event rejected"
                        );
                    }
                }
                let _ = reply.send(result);
            }
            LaneCommand::TopOfBook { reply } => {
                let _ = reply.send(book.top_of_book());
            }
            LaneCommand::Depth { levels, reply } => {
                let _ = reply.send(book.depth(levels));
            }
            LaneCommand::Stats { reply } => {
                let _ = reply.send(book.stats());
            }
            LaneCommand::Close { reply } => {
                tracing::info!(
                    market = %market,
                    next_sequence = book.next_sequence(),
                    "Lane closed"
                );
                let _ = reply.send(book);
                return;
            }
        }
    }

    tracing::info!(market = %market, "Lane stopped: all handles dropped");
}

/// Cloneable access to a running lane.
#[derive(Debug, Clone)]
pub struct LaneHandle {
    market: MarketId,
    tx: mpsc::Sender<LaneCommand>,
    updates: broadcast::Sender<BookUpdate>,
}

impl LaneHandle {
    #[must_use]
    pub fn market(&self) -> MarketId {
        self.market
    }

    /// Apply one event and wait for the report.
    pub async fn apply(&self, event: BookEvent) -> Result<MatchReport> {
        self.request(|reply| LaneCommand::Apply { event, reply })
            .await?
    }

    pub async fn top_of_book(&self) -> Result<TopOfBook> {
        self.request(|reply| LaneCommand::TopOfBook { reply }).await
    }

    pub async fn depth(&self, levels: usize) -> Result<DepthView> {
        self.request(|reply| LaneCommand::Depth { levels, reply })
            .await
    }

    pub async fn stats(&self) -> Result<BookStats> {
        self.request(|reply| LaneCommand::Stats { reply }).await
    }

    /// Receive a [`BookUpdate`] for every event applied from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BookUpdate> {
        self.updates.subscribe()
    }

    /// Stop the lane once every command already queued has been served and
    /// hand back the book. Other handles get `LaneClosed` afterwards.
    pub async fn close(self) -> Result<Book> {
        self.request(|reply| LaneCommand::Close { reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> LaneCommand,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| BookError::LaneClosed(self.market))?;
        response.await.map_err(|_| BookError::LaneClosed(self.market))
    }
}
