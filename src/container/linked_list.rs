//! `LinkedList`: a doubly-linked list stored in an index arena.
//!
//! Nodes live in one `Vec` and link by index, so the list needs no unsafe
//! code and a deep copy is a single buffer clone. Removed nodes go on a free
//! list and are reused by later insertions.

use super::{Comparator, Container};
use crate::debug_invariants::DebugInvariants;
use crate::stg_error::StgError;

#[derive(Clone, Debug)]
struct Node<T> {
    value: Option<T>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Insertion-ordered doubly-linked list.
#[derive(Clone, Debug)]
pub struct LinkedList<T> {
    nodes: Vec<Node<T>>,
    head: Option<usize>,
    tail: Option<usize>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            head: None,
            tail: None,
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> LinkedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, value: T, prev: Option<usize>, next: Option<usize>) -> usize {
        let node = Node {
            value: Some(value),
            prev,
            next,
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

    /// Link a new node between `prev` and `next`, which must be adjacent.
    fn link(&mut self, value: T, prev: Option<usize>, next: Option<usize>) {
        let idx = self.alloc(value, prev, next);
        match prev {
            Some(p) => self.nodes[p].next = Some(idx),
            None => self.head = Some(idx),
        }
        match next {
            Some(n) => self.nodes[n].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.len += 1;
        crate::debug_invariants!(self.validate_invariants(), "LinkedList::link");
    }

    fn unlink(&mut self, idx: usize) -> Option<T> {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        let node = &mut self.nodes[idx];
        node.prev = None;
        node.next = None;
        let value = node.value.take();
        self.free.push(idx);
        self.len -= 1;
        crate::debug_invariants!(self.validate_invariants(), "LinkedList::unlink");
        value
    }

    pub fn push_back(&mut self, value: T) {
        self.link(value, self.tail, None);
    }

    pub fn push_front(&mut self, value: T) {
        self.link(value, None, self.head);
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.head.and_then(|idx| self.unlink(idx))
    }

    pub fn pop_back(&mut self) -> Option<T> {
        self.tail.and_then(|idx| self.unlink(idx))
    }

    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|idx| self.nodes[idx].value.as_ref())
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|idx| self.nodes[idx].value.as_ref())
    }

    /// Insert before the first element that compares greater than `value`,
    /// so equal elements keep their insertion order.
    pub fn insert_sorted<C: Comparator<T>>(&mut self, value: T, cmp: &C) {
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let greater = self.nodes[idx]
                .value
                .as_ref()
                .is_some_and(|x| cmp.compare(x, &value).is_gt());
            if greater {
                let prev = self.nodes[idx].prev;
                self.link(value, prev, Some(idx));
                return;
            }
            cursor = self.nodes[idx].next;
        }
        self.push_back(value);
    }

    fn position<C: Comparator<T>>(&self, value: &T, cmp: &C) -> Option<usize> {
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = &self.nodes[idx];
            if node
                .value
                .as_ref()
                .is_some_and(|x| cmp.compare(x, value).is_eq())
            {
                return Some(idx);
            }
            cursor = node.next;
        }
        None
    }

    /// First element equal to `value` under `cmp`.
    pub fn find<C: Comparator<T>>(&self, value: &T, cmp: &C) -> Option<&T> {
        let idx = self.position(value, cmp)?;
        self.nodes[idx].value.as_ref()
    }

    /// Remove and return the first element equal to `value` under `cmp`.
    pub fn remove_first<C: Comparator<T>>(&mut self, value: &T, cmp: &C) -> Option<T> {
        let idx = self.position(value, cmp)?;
        self.unlink(idx)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Deep copy using an explicit per-element copier. The copy is compacted:
    /// its arena holds exactly the live elements in list order.
    pub fn deep_copy_with<F: FnMut(&T) -> T>(&self, mut copier: F) -> Self {
        let mut out = Self::new();
        for x in self.iter() {
            out.push_back(copier(x));
        }
        out
    }
}

impl<T> Container for LinkedList<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.len
    }

    fn traverse<F: FnMut(&T)>(&self, visitor: F) {
        self.iter().for_each(visitor);
    }

    fn buffer_ptr(&self) -> *const () {
        self.nodes.as_ptr().cast()
    }

    fn deep_copy(&self) -> Self
    where
        T: Clone,
    {
        self.deep_copy_with(T::clone)
    }
}

impl<T> DebugInvariants for LinkedList<T> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "LinkedList invalid");
    }

    fn validate_invariants(&self) -> Result<(), StgError> {
        let mut count = 0usize;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| StgError::invariant("LinkedList", format!("dangling link {idx}")))?;
            if node.prev != prev {
                return Err(StgError::invariant(
                    "LinkedList",
                    format!("node {idx} has a broken back link"),
                ));
            }
            if node.value.is_none() {
                return Err(StgError::invariant(
                    "LinkedList",
                    format!("node {idx} is linked but empty"),
                ));
            }
            count += 1;
            if count > self.nodes.len() {
                return Err(StgError::invariant("LinkedList", "cycle in forward links"));
            }
            prev = Some(idx);
            cursor = node.next;
        }
        if prev != self.tail {
            return Err(StgError::invariant("LinkedList", "tail is not the last node"));
        }
        if count != self.len || count + self.free.len() != self.nodes.len() {
            return Err(StgError::invariant(
                "LinkedList",
                format!(
                    "{count} linked, len {}, {} free of {} nodes",
                    self.len,
                    self.free.len(),
                    self.nodes.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Iterator over a [`LinkedList`] in list order.
pub struct Iter<'a, T> {
    list: &'a LinkedList<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let idx = self.cursor?;
        let node = &self.list.nodes[idx];
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> IntoIterator for &'a LinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> FromIterator<T> for LinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = LinkedList::new();
        for x in iter {
            list.push_back(x);
        }
        list
    }
}
