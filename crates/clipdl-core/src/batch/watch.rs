//! Tasks waiting on the terminal event of each submitted item.

use std::collections::HashMap;
use std::future::Future;

use tokio::task::{Id, JoinSet};

use super::progress::ItemOutcome;
use super::Item;

/// Running outcome watchers, keyed by task id so a watcher that panics or is
/// cancelled still resolves its item.
pub(super) struct Watchers {
    tasks: JoinSet<ItemOutcome>,
    items: HashMap<Id, Item>,
}

impl Watchers {
    pub(super) fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            items: HashMap::new(),
        }
    }

    pub(super) fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(super) fn watch<F>(&mut self, item: Item, watcher: F)
    where
        F: Future<Output = ItemOutcome> + Send + 'static,
    {
        let handle = self.tasks.spawn(watcher);
        self.items.insert(handle.id(), item);
    }

    /// Next finished item with its outcome. A failed watcher yields
    /// `ItemOutcome::Failed`.
    pub(super) async fn next(&mut self) -> Option<(Item, ItemOutcome)> {
        let (task, outcome) = match self.tasks.join_next_with_id().await? {
            Ok((task, outcome)) => (task, outcome),
            Err(e) => {
                let index = self.items.get(&e.id()).map(|item| item.index);
                tracing::error!(?index, "item watcher failed: {}", e);
                (e.id(), ItemOutcome::Failed(format!("outcome watcher failed: {e}")))
            }
        };
        self.items.remove(&task).map(|item| (item, outcome))
    }
}
