//! LRU List Module
//!
//! Recency order for the cache: an arena of nodes linked by index, with a
//! free list so removed slots are reused instead of reallocated.

// Null link marker for `prev`, `next` and the free list.
const NIL: usize = usize::MAX;

// == Node Handle ==
/// Stable handle to an item in an [`LruList`].
///
/// A handle stays valid until its item is removed. The generation counter
/// makes a handle to a removed item resolve to nothing, even after its slot
/// has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u64,
}

#[derive(Debug)]
struct Node<T> {
    item: T,
    prev: usize,
    next: usize,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    node: Option<Node<T>>,
    next_free: usize,
}

// == LRU List ==
/// Doubly-linked list ordered by access time.
///
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Every operation is O(1) except `clear`.
#[derive(Debug)]
pub struct LruList<T> {
    slots: Vec<Slot<T>>,
    head: usize,
    tail: usize,
    free_head: usize,
    len: usize,
}

impl<T> Default for LruList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LruList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            head: NIL,
            tail: NIL,
            free_head: NIL,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts an item as the most recently used and returns its handle.
    pub fn push_front(&mut self, item: T) -> NodeId {
        let index = self.alloc(item);
        self.link_front(index);
        self.len += 1;
        NodeId {
            index,
            generation: self.slots[index].generation,
        }
    }

    // == Move To Front ==
    /// Marks an item as the most recently used.
    ///
    /// Returns false if the handle no longer refers to a live item.
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        let Some(index) = self.resolve(id) else {
            return false;
        };
        if index != self.head {
            self.unlink(index);
            self.link_front(index);
        }
        true
    }

    // == Remove ==
    /// Removes an arbitrary item by handle.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        let index = self.resolve(id)?;
        self.unlink(index);
        self.release(index)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used item.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.tail == NIL {
            return None;
        }
        let index = self.tail;
        self.unlink(index);
        self.release(index)
    }

    // == Peek Back ==
    /// Returns the least recently used item without removing it.
    pub fn peek_back(&self) -> Option<&T> {
        self.node(self.tail).map(|node| &node.item)
    }

    // == Peek Front ==
    /// Returns the most recently used item.
    pub fn peek_front(&self) -> Option<&T> {
        self.node(self.head).map(|node| &node.item)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        let index = self.resolve(id)?;
        self.node(index).map(|node| &node.item)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        let index = self.resolve(id)?;
        self.slots[index].node.as_mut().map(|node| &mut node.item)
    }

    // == Length ==
    /// Returns the number of live items.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Clear ==
    /// Drops every item. Handles issued before the call stop resolving.
    pub fn clear(&mut self) {
        self.head = NIL;
        self.tail = NIL;
        self.free_head = NIL;
        self.len = 0;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            slot.next_free = self.free_head;
            self.free_head = index;
        }
    }

    // == Iterate ==
    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    // == Internal Helpers ==
    fn resolve(&self, id: NodeId) -> Option<usize> {
        match self.slots.get(id.index) {
            Some(slot) if slot.generation == id.generation && slot.node.is_some() => {
                Some(id.index)
            }
            _ => None,
        }
    }

    fn node(&self, index: usize) -> Option<&Node<T>> {
        self.slots.get(index).and_then(|slot| slot.node.as_ref())
    }

    fn set_prev(&mut self, index: usize, prev: usize) {
        if let Some(node) = self.slots[index].node.as_mut() {
            node.prev = prev;
        }
    }

    fn set_next(&mut self, index: usize, next: usize) {
        if let Some(node) = self.slots[index].node.as_mut() {
            node.next = next;
        }
    }

    fn alloc(&mut self, item: T) -> usize {
        let node = Node {
            item,
            prev: NIL,
            next: NIL,
        };

        if self.free_head == NIL {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
                next_free: NIL,
            });
            return self.slots.len() - 1;
        }

        let index = self.free_head;
        let slot = &mut self.slots[index];
        self.free_head = slot.next_free;
        slot.next_free = NIL;
        slot.node = Some(node);
        index
    }

    // Caller must unlink first.
    fn release(&mut self, index: usize) -> Option<T> {
        let slot = &mut self.slots[index];
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.next_free = self.free_head;
        self.free_head = index;
        self.len -= 1;
        Some(node.item)
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = match self.node(index) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        if prev == NIL {
            self.head = next;
        } else {
            self.set_next(prev, next);
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.set_prev(next, prev);
        }

        self.set_prev(index, NIL);
        self.set_next(index, NIL);
    }

    fn link_front(&mut self, index: usize) {
        let old_head = self.head;
        self.set_prev(index, NIL);
        self.set_next(index, old_head);

        if old_head == NIL {
            self.tail = index;
        } else {
            self.set_prev(old_head, index);
        }
        self.head = index;
    }
}

// == Iterator ==
/// Front-to-back iterator over an [`LruList`].
pub struct Iter<'a, T> {
    list: &'a LruList<T>,
    cursor: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let node = list.node(self.cursor)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
