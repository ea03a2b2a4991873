/// A slab of values addressed by reusable integer keys.
///
/// Keys stay valid until the value is removed; a freed key is handed out
/// again by a later insertion.
pub(crate) struct Slab<T> {
    /// Slot storage. `None` marks a vacant slot.
    items: Vec<Option<T>>,

    /// Stack of vacant keys.
    free: Vec<usize>,

    /// Number of occupied slots.
    len: usize,
}

impl<T> Slab<T> {
    /// Creates a slab with room for `capacity` values before growing.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Returns the key the next [`insert`](Self::insert) will use.
    pub(crate) fn vacant_key(&self) -> usize {
        self.free.last().copied().unwrap_or(self.items.len())
    }

    /// Stores `item` and returns its key.
    pub(crate) fn insert(&mut self, item: T) -> usize {
        let key = match self.free.pop() {
            Some(key) => {
                self.items[key] = Some(item);
                key
            }
            None => {
                self.items.push(Some(item));
                self.items.len() - 1
            }
        };

        self.len += 1;
        key
    }

    /// Removes and returns the value at `key`, if the slot is occupied.
    pub(crate) fn try_remove(&mut self, key: usize) -> Option<T> {
        let item = self.items.get_mut(key)?.take()?;

        self.free.push(key);
        self.len -= 1;

        Some(item)
    }

    pub(crate) fn get(&self, key: usize) -> Option<&T> {
        self.items.get(key)?.as_ref()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over occupied slots in key order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(key, slot)| slot.as_ref().map(|item| (key, item)))
    }

    /// Removes every value, returning them in key order.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        self.free.clear();
        self.len = 0;

        self.items.drain(..).flatten().collect()
    }
}
