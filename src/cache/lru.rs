//! Recency Index Module
//!
//! Pairs a key lookup table with a doubly linked list ordered by recency.
//!
//! Nodes live in a slot arena and link to each other by slot index, so
//! promotion, removal by key and removal of the tail are all O(1):
//!
//! ```text
//!   map: "a" -> 2, "b" -> 0, "c" -> 1
//!
//!   head ─► [2: a] ◄──► [0: b] ◄──► [1: c] ◄── tail
//!           (MRU)                     (LRU)
//! ```

use std::collections::HashMap;

use crate::cache::CacheEntry;

// == Node ==
/// One slot of the recency list.
#[derive(Debug)]
struct Node {
    key: String,
    entry: CacheEntry,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Recency Index ==
/// Key → entry table with most-recently-used ordering.
///
/// - Head = Most recently used
/// - Tail = Least recently used
#[derive(Debug, Default)]
pub struct RecencyIndex {
    /// Node storage, `None` marks a free slot
    slots: Vec<Option<Node>>,
    /// Free slot indices ready for reuse
    free: Vec<usize>,
    /// Key to slot index
    map: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl RecencyIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    // == Exists ==
    /// Checks if a key is present.
    pub fn exists(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    // == Get ==
    /// Returns the entry stored under `key` without touching recency.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        let idx = *self.map.get(key)?;
        self.node(idx).map(|node| &node.entry)
    }

    // == Set ==
    /// Stores `entry` under `key` and moves it to the head.
    ///
    /// Returns the entry previously stored under `key`, if any.
    pub fn set(&mut self, key: String, entry: CacheEntry) -> Option<CacheEntry> {
        if let Some(&idx) = self.map.get(&key) {
            self.detach(idx);
            self.attach_front(idx);
            return self
                .node_mut(idx)
                .map(|node| std::mem::replace(&mut node.entry, entry));
        }

        let node = Node {
            key: key.clone(),
            entry,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.attach_front(idx);
        self.map.insert(key, idx);
        None
    }

    // == Delete ==
    /// Removes `key`, returning its key and entry.
    pub fn delete(&mut self, key: &str) -> Option<(String, CacheEntry)> {
        let idx = *self.map.get(key)?;
        self.remove_slot(idx)
    }

    // == Remove Least Recently Used ==
    /// Removes and returns the tail entry.
    ///
    /// Returns None if the index is empty.
    pub fn remove_least_recently_used(&mut self) -> Option<(String, CacheEntry)> {
        let idx = self.tail?;
        self.remove_slot(idx)
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    // == Head / Tail ==
    /// Returns the most recently used key.
    pub fn head(&self) -> Option<&str> {
        self.head
            .and_then(|idx| self.node(idx))
            .map(|node| node.key.as_str())
    }

    /// Returns the least recently used key.
    pub fn tail(&self) -> Option<&str> {
        self.tail
            .and_then(|idx| self.node(idx))
            .map(|node| node.key.as_str())
    }

    // == Keys ==
    /// Iterates keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.node(cursor?)?;
            cursor = node.next;
            Some(node.key.as_str())
        })
    }

    fn node(&self, idx: usize) -> Option<&Node> {
        self.slots.get(idx).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.slots.get_mut(idx).and_then(|slot| slot.as_mut())
    }

    /// Unlinks a slot from its neighbours, fixing head and tail.
    fn detach(&mut self, idx: usize) {
        let (prev, next) = match self.node_mut(idx) {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    /// Links a detached slot in at the head.
    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(node) = self.node_mut(h) {
                    node.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn remove_slot(&mut self, idx: usize) -> Option<(String, CacheEntry)> {
        self.detach(idx);
        let node = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        self.map.remove(&node.key);
        Some((node.key, node.entry))
    }

    /// Asserts that the table and the list agree with each other.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut seen = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.node(idx).expect("linked slot is live");
            assert_eq!(node.prev, prev, "broken back link at {}", node.key);
            assert_eq!(self.map.get(&node.key), Some(&idx), "table out of sync");
            seen += 1;
            assert!(seen <= self.map.len(), "cycle in recency list");
            prev = cursor;
            cursor = node.next;
        }
        assert_eq!(self.tail, prev, "tail is not the last node");
        assert_eq!(seen, self.map.len(), "unreachable table entries");
        assert_eq!(self.head.is_none(), self.map.is_empty());
        if self.map.len() == 1 {
            assert_eq!(self.head, self.tail);
        }
    }
}
