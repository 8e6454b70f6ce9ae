//! Fixed-capacity LIFO stack used as flood-fill frontier storage.
//!
//! Storage is reserved once when the stack is created and never grows.
//! Pushing onto a full stack and popping from an empty one are reported as
//! errors; nothing is ever overwritten.

use thiserror::Error;

/// Failures reported by [`BoundedStack`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// Push attempted while `len == capacity`.
    #[error("stack is full (capacity {capacity})")]
    Full {
        /// Fixed capacity of the stack.
        capacity: usize,
    },

    /// Pop attempted on an empty stack.
    #[error("stack is empty")]
    Empty,

    /// Backing storage could not be reserved.
    #[error("failed to reserve storage for {capacity} entries")]
    Allocation {
        /// Requested capacity.
        capacity: usize,
    },
}

/// A last-in, first-out stack that holds at most `capacity` elements.
#[derive(Debug, Clone)]
pub struct BoundedStack<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> BoundedStack<T> {
    /// Creates an empty stack able to hold `capacity` elements.
    ///
    /// # Errors
    /// [`StackError::Allocation`] if the backing storage cannot be reserved.
    pub fn new(capacity: usize) -> Result<Self, StackError> {
        let mut items = Vec::new();
        items
            .try_reserve_exact(capacity)
            .map_err(|_| StackError::Allocation { capacity })?;
        Ok(Self { items, capacity })
    }

    /// Pushes `item` on top and returns the new length.
    ///
    /// # Errors
    /// [`StackError::Full`] if the stack already holds `capacity` elements.
    /// The stack is left unchanged in that case.
    pub fn push(&mut self, item: T) -> Result<usize, StackError> {
        if self.items.len() >= self.capacity {
            return Err(StackError::Full {
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(self.items.len())
    }

    /// Removes and returns the most recently pushed element.
    ///
    /// # Errors
    /// [`StackError::Empty`] if there is nothing to pop.
    pub fn pop(&mut self) -> Result<T, StackError> {
        self.items.pop().ok_or(StackError::Empty)
    }

    /// Returns the top element without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Number of elements currently on the stack.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the stack holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if a further push would fail.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Fixed maximum number of elements.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every element, keeping the reserved storage.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_is_lifo() {
        let mut stack = BoundedStack::new(4).unwrap();
        assert!(stack.is_empty());

        assert_eq!(stack.push((0, 0)).unwrap(), 1);
        assert_eq!(stack.push((1, 0)).unwrap(), 2);
        assert_eq!(stack.push((2, 5)).unwrap(), 3);
        assert_eq!(stack.len(), 3);

        assert_eq!(stack.pop().unwrap(), (2, 5));
        assert_eq!(stack.pop().unwrap(), (1, 0));
        assert_eq!(stack.push((7, 7)).unwrap(), 2);
        assert_eq!(stack.pop().unwrap(), (7, 7));
        assert_eq!(stack.pop().unwrap(), (0, 0));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_push_when_full_is_rejected() {
        let mut stack = BoundedStack::new(2).unwrap();
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert!(stack.is_full());

        assert_eq!(stack.push(3), Err(StackError::Full { capacity: 2 }));

        // Rejected push must not disturb stored entries
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop().unwrap(), 2);
        assert_eq!(stack.pop().unwrap(), 1);
    }

    #[test]
    fn test_pop_when_empty_is_rejected() {
        let mut stack: BoundedStack<u8> = BoundedStack::new(3).unwrap();
        assert_eq!(stack.pop(), Err(StackError::Empty));

        stack.push(9).unwrap();
        stack.pop().unwrap();
        assert_eq!(stack.pop(), Err(StackError::Empty));
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn test_peek_does_not_remove() {
        let mut stack = BoundedStack::new(3).unwrap();
        assert_eq!(stack.peek(), None);

        stack.push('a').unwrap();
        stack.push('b').unwrap();
        assert_eq!(stack.peek(), Some(&'b'));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop().unwrap(), 'b');
        assert_eq!(stack.peek(), Some(&'a'));
    }

    #[test]
    fn test_zero_capacity_rejects_everything() {
        let mut stack = BoundedStack::new(0).unwrap();
        assert!(stack.is_full());
        assert_eq!(stack.push(1), Err(StackError::Full { capacity: 0 }));
        assert_eq!(stack.pop(), Err(StackError::Empty));
    }

    #[test]
    fn test_refill_after_drain_keeps_capacity() {
        let mut stack = BoundedStack::new(3).unwrap();
        for round in 0..3 {
            for i in 0..3 {
                stack.push(round * 10 + i).unwrap();
            }
            assert!(stack.push(99).is_err());
            assert_eq!(stack.pop().unwrap(), round * 10 + 2);
            stack.clear();
            assert!(stack.is_empty());
        }
        assert_eq!(stack.capacity(), 3);
    }
}
