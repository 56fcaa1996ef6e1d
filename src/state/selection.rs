//! Selected-row state for one explorer surface

/// Handle returned by `SelectionStore::subscribe`
pub type SubscriptionId = usize;

type Subscriber = Box<dyn FnMut(Option<usize>)>;

/// Holds the selected row index of one explorer
///
/// The store does not know how many rows exist; callers are responsible for
/// keeping the index in bounds (see `clamp_selection`).
#[derive(Default)]
pub struct SelectionStore {
    selected: Option<usize>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: SubscriptionId,
}

impl std::fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore")
            .field("selected", &self.selected)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Overwrite the selection. Subscribers are called synchronously if the
    /// value changed.
    pub fn set_selected_index(&mut self, index: Option<usize>) {
        if self.selected == index {
            return;
        }
        self.selected = index;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(index);
        }
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(Option<usize>) + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber; returns false if the id was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }
}

/// Bring a stored selection into `[0, row_count)`. An empty list has no
/// selection.
pub fn clamp_selection(selected: Option<usize>, row_count: usize) -> Option<usize> {
    match selected {
        Some(_) if row_count == 0 => None,
        Some(i) => Some(i.min(row_count - 1)),
        None => None,
    }
}
