//! Feed lifecycle controller.
//!
//! Owns the query state and the search debouncer, issues page fetches, and emits
//! snapshots for presentation layers.

use crate::api::LaunchSource;
use crate::error::FetchError;
use crate::feed::{Debouncer, FetchOutcome, FetchTicket, QueryController};
use crate::model::{FeedConfig, FeedEvent, InfoEvent, LaunchRecord, PatchStatus};
use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    /// Raw search box contents after a keystroke; debounced before it takes effect.
    SearchInput(String),
    /// The list was scrolled to its bottom edge.
    ReachedBottom,
    /// A card was expanded and its mission patch should be loaded.
    LoadPatch { id: String, url: String },
    Quit,
}

/// A finished page request travelling back to the controller loop.
struct Completed {
    ticket: FetchTicket,
    result: Result<Vec<LaunchRecord>, FetchError>,
}

/// Spawn the fetch for the current page, if the query state calls for one.
fn dispatch_fetch<S: LaunchSource>(
    source: &S,
    query: &mut QueryController,
    done_tx: &UnboundedSender<Completed>,
) {
    let Some(ticket) = query.next_fetch() else {
        return;
    };
    debug!(
        page = ticket.page,
        offset = ticket.offset(),
        generation = ticket.generation,
        "dispatching page fetch"
    );
    let source = source.clone();
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let result = source.fetch_page(&ticket.search, ticket.page).await;
        let _ = done_tx.send(Completed { ticket, result });
    });
}

fn spawn_patch_load<S: LaunchSource>(
    source: &S,
    id: String,
    url: String,
    event_tx: &UnboundedSender<FeedEvent>,
) {
    let _ = event_tx.send(FeedEvent::Patch {
        id: id.clone(),
        status: PatchStatus::Pending,
    });
    let source = source.clone();
    let event_tx = event_tx.clone();
    tokio::spawn(async move {
        let status = match source.fetch_patch(&url).await {
            Ok(bytes) => PatchStatus::Loaded { bytes: bytes.len() },
            Err(e) => {
                warn!(%url, error = %e, "mission patch failed to load");
                PatchStatus::Failed
            }
        };
        let _ = event_tx.send(FeedEvent::Patch { id, status });
    });
}

fn publish(event_tx: &UnboundedSender<FeedEvent>, query: &QueryController) {
    let _ = event_tx.send(FeedEvent::Snapshot(query.snapshot()));
}

async fn debounce_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => futures::future::pending().await,
    }
}

/// Drive the feed from UI commands until the UI quits or drops its sender.
pub(crate) async fn run_controller<S: LaunchSource>(
    source: S,
    cfg: &FeedConfig,
    initial_search: String,
    event_tx: UnboundedSender<FeedEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut query = QueryController::new(initial_search);
    let mut debounce: Debouncer<String> = Debouncer::new(cfg.debounce);
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completed>();

    dispatch_fetch(&source, &mut query, &done_tx);
    publish(&event_tx, &query);

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::SearchInput(text)) => {
                        debounce.push(text, Instant::now());
                    }
                    Some(UiCommand::ReachedBottom) => {
                        let page = query.advance_page();
                        debug!(page, has_more = query.has_more(), "scrolled to bottom");
                        dispatch_fetch(&source, &mut query, &done_tx);
                        publish(&event_tx, &query);
                    }
                    Some(UiCommand::LoadPatch { id, url }) => {
                        spawn_patch_load(&source, id, url, &event_tx);
                    }
                    Some(UiCommand::Quit) | None => break,
                }
            }
            _ = debounce_elapsed(debounce.deadline()) => {
                if let Some(text) = debounce.fire(Instant::now()) {
                    query.commit_search(text);
                    let _ = event_tx.send(FeedEvent::Info(InfoEvent::QueryCommitted {
                        search: query.search_text().to_string(),
                    }));
                    dispatch_fetch(&source, &mut query, &done_tx);
                    publish(&event_tx, &query);
                }
            }
            Some(done) = done_rx.recv() => {
                let page = done.ticket.page;
                match query.apply(&done.ticket, done.result) {
                    FetchOutcome::Failed { message } => {
                        let _ = event_tx.send(FeedEvent::Info(InfoEvent::FetchFailed { page, message }));
                    }
                    FetchOutcome::Exhausted => debug!(page, "query exhausted"),
                    _ => {}
                }
                publish(&event_tx, &query);
            }
        }
    }

    // In-flight fetches are not awaited; the runtime drops them on shutdown.
    if debounce.is_pending() {
        debug!(pending = ?debounce.cancel(), "discarding uncommitted search input");
    }
    Ok(())
}
