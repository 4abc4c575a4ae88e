//! Fixed-capacity binary min-heap.
//!
//! The ordering is supplied as a comparator strategy instead of an `Ord`
//! bound, so the same heap serves any element type. Capacity is fixed at
//! construction: the Huffman builder knows the exact number of symbols up
//! front, and an insert past that is an invariant violation, not a reason to
//! grow.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};

/// Array-backed binary min-heap ordered by a comparator.
pub struct MinHeap<T, C> {
    elements: Vec<T>,
    capacity: usize,
    compare: C,
}

impl<T: fmt::Debug, C> fmt::Debug for MinHeap<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinHeap")
            .field("elements", &self.elements)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[inline]
fn parent(i: usize) -> usize {
    (i - 1) / 2
}

#[inline]
fn left(i: usize) -> usize {
    2 * i + 1
}

#[inline]
fn right(i: usize) -> usize {
    2 * i + 2
}

impl<T, C> MinHeap<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Create an empty heap that holds at most `capacity` elements.
    pub fn with_capacity(capacity: usize, compare: C) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
            capacity,
            compare,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True if the heap holds nothing.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Smallest element without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.elements.first()
    }

    /// Insert `value` and sift it up. Returns the index where it came to rest.
    pub fn insert(&mut self, value: T) -> Result<usize> {
        if self.elements.len() >= self.capacity {
            return Err(Error::HeapFull {
                capacity: self.capacity,
            });
        }
        self.elements.push(value);
        Ok(self.sift_up(self.elements.len() - 1))
    }

    /// Remove and return the smallest element.
    pub fn extract_min(&mut self) -> Result<T> {
        if self.elements.is_empty() {
            return Err(Error::HeapEmpty);
        }
        // Last element takes the root's place, then sinks.
        let min = self.elements.swap_remove(0);
        if !self.elements.is_empty() {
            self.sift_down(0);
        }
        Ok(min)
    }

    /// Check the heap property for every parent/child pair.
    pub fn is_valid(&self) -> bool {
        (1..self.elements.len()).all(|i| {
            (self.compare)(&self.elements[parent(i)], &self.elements[i]) != Ordering::Greater
        })
    }

    #[inline]
    fn less(&self, a: usize, b: usize) -> bool {
        (self.compare)(&self.elements[a], &self.elements[b]) == Ordering::Less
    }

    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let p = parent(index);
            if !self.less(index, p) {
                break;
            }
            self.elements.swap(index, p);
            index = p;
        }
        index
    }

    fn sift_down(&mut self, mut index: usize) -> usize {
        let len = self.elements.len();
        loop {
            let (l, r) = (left(index), right(index));
            let mut smallest = index;

            if l < len && self.less(l, smallest) {
                smallest = l;
            }
            if r < len && self.less(r, smallest) {
                smallest = r;
            }
            if smallest == index {
                return index;
            }
            self.elements.swap(index, smallest);
            index = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Key = (u64, u16);

    fn key_heap(capacity: usize) -> MinHeap<Key, impl Fn(&Key, &Key) -> Ordering> {
        MinHeap::with_capacity(capacity, |a: &Key, b: &Key| a.cmp(b))
    }

    #[test]
    fn test_extract_in_key_order() {
        let mut heap = key_heap(6);
        for key in [(5, 1), (2, 9), (2, 3), (7, 0), (1, 200), (2, 4)] {
            heap.insert(key).unwrap();
            assert!(heap.is_valid());
        }

        let mut out = Vec::new();
        while !heap.is_empty() {
            out.push(heap.extract_min().unwrap());
            assert!(heap.is_valid());
        }
        assert_eq!(out, vec![(1, 200), (2, 3), (2, 4), (2, 9), (5, 1), (7, 0)]);
    }

    #[test]
    fn test_insert_returns_final_index() {
        let mut heap = key_heap(3);
        assert_eq!(heap.insert((10, 0)).unwrap(), 0);
        assert_eq!(heap.insert((20, 0)).unwrap(), 1);
        // Smaller than the root: bubbles all the way up.
        assert_eq!(heap.insert((1, 0)).unwrap(), 0);
        assert_eq!(heap.peek(), Some(&(1, 0)));
    }

    #[test]
    fn test_insert_beyond_capacity_fails() {
        let mut heap = key_heap(2);
        heap.insert((1, 1)).unwrap();
        heap.insert((2, 2)).unwrap();
        assert!(matches!(
            heap.insert((3, 3)),
            Err(Error::HeapFull { capacity: 2 })
        ));
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn test_extract_from_empty_fails() {
        let mut heap = key_heap(1);
        assert!(matches!(heap.extract_min(), Err(Error::HeapEmpty)));
        heap.insert((4, 4)).unwrap();
        assert_eq!(heap.extract_min().unwrap(), (4, 4));
        assert!(matches!(heap.extract_min(), Err(Error::HeapEmpty)));
    }

    #[test]
    fn test_reverse_comparator() {
        let mut heap = MinHeap::with_capacity(4, |a: &i32, b: &i32| b.cmp(a));
        for v in [3, 9, -1, 4] {
            heap.insert(v).unwrap();
        }
        assert_eq!(heap.extract_min().unwrap(), 9);
        assert_eq!(heap.extract_min().unwrap(), 4);
    }
}
