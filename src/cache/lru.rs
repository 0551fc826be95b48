use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Slot index of the head sentinel (most-recently-used side).
const HEAD: usize = 0;
/// Slot index of the tail sentinel (least-recently-used side).
const TAIL: usize = 1;

pub const DEFAULT_CAPACITY: usize = 1000;

struct Node<K, V> {
    entry: Option<(K, V)>,
    prev: usize,
    next: usize,
}

/// Fixed-capacity least-recently-used cache.
///
/// Nodes live in an arena and are linked by index into a doubly linked list
/// ordered by recency, bracketed by two sentinel slots so that linking and
/// unlinking never has to special-case the ends. A hash map points from each
/// key to its slot, which keeps `get`, `set`, `has` and `delete` O(1).
///
/// Capacity never changes after construction. Once an insertion pushes the
/// size one past capacity, the least-recently-used entry is evicted.
pub struct LruCache<K, V> {
    capacity: usize,
    map: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    free: Vec<usize>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a cache holding at most `capacity` entries (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut nodes = Vec::with_capacity(capacity.min(4096) + 2);
        nodes.push(Node {
            entry: None,
            prev: HEAD,
            next: TAIL,
        });
        nodes.push(Node {
            entry: None,
            prev: HEAD,
            next: TAIL,
        });

        Self {
            capacity,
            map: HashMap::new(),
            nodes,
            free: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Look up `key`, promoting it to most-recently-used on a hit.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.detach(idx);
        self.attach_front(idx);
        self.nodes[idx].entry.as_ref().map(|(_, value)| value)
    }

    /// Insert or update `key`, promoting it to most-recently-used.
    pub fn set(&mut self, key: K, value: V) {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(entry) = self.nodes[idx].entry.as_mut() {
                entry.1 = value;
            }
            self.detach(idx);
            self.attach_front(idx);
            return;
        }

        let idx = self.allocate(key.clone(), value);
        self.attach_front(idx);
        self.map.insert(key, idx);

        if self.map.len() > self.capacity {
            self.evict_lru();
        }
    }

    /// Look up `key` without touching recency ordering.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.nodes[idx].entry.as_ref().map(|(_, value)| value)
    }

    /// Membership test that leaves recency ordering untouched.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.remove(key) {
            Some(idx) => {
                self.release(idx);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
        self.free.clear();
    }

    /// Keys from most- to least-recently-used.
    pub fn keys(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.map.len());
        let mut cursor = self.nodes[HEAD].next;
        while cursor != TAIL {
            if let Some((key, _)) = self.nodes[cursor].entry.as_ref() {
                keys.push(key);
            }
            cursor = self.nodes[cursor].next;
        }
        keys
    }

    fn evict_lru(&mut self) {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            return;
        }
        if let Some((key, _)) = self.nodes[idx].entry.as_ref() {
            self.map.remove(key);
        }
        self.release(idx);
    }

    fn allocate(&mut self, key: K, value: V) -> usize {
        let node = Node {
            entry: Some((key, value)),
            prev: HEAD,
            next: TAIL,
        };
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) {
        self.detach(idx);
        self.nodes[idx].entry = None;
        self.free.push(idx);
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn attach_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
