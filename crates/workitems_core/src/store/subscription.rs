//! Change listeners registered on the store.

use crate::store::snapshot::PersistedSnapshot;

/// Handle returned by `WorkItemStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Callback receiving the post-mutation snapshot.
pub type Listener = Box<dyn FnMut(&PersistedSnapshot)>;

/// Ordered listener registry. Listeners run in subscription order.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(current, _)| *current != id);
        self.listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(crate) fn notify(&mut self, snapshot: &PersistedSnapshot) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Subscribers;
    use crate::store::snapshot::PersistedSnapshot;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn unsubscribe_stops_delivery_and_is_not_repeatable() {
        let hits = Rc::new(Cell::new(0));
        let mut subscribers = Subscribers::default();
        let counter = Rc::clone(&hits);
        let id = subscribers.subscribe(Box::new(move |_| counter.set(counter.get() + 1)));

        subscribers.notify(&PersistedSnapshot::default());
        assert_eq!(hits.get(), 1);

        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        subscribers.notify(&PersistedSnapshot::default());
        assert_eq!(hits.get(), 1);
        assert!(subscribers.is_empty());
    }
}
