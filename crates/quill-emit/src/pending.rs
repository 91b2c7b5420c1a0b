//! Deferred bodies awaiting compilation.

use std::collections::VecDeque;
use std::rc::Rc;

use quill_core::DelegateShape;

use crate::companion::ImplSlot;

/// A body expression recorded at definition time and compiled when its type
/// is created.
#[derive(Debug)]
pub struct PendingInitializer<E> {
    /// The implementation method that will receive the compiled body.
    pub target: Rc<ImplSlot>,
    /// Name of the public member the body belongs to.
    pub member: String,
    pub body: E,
    /// Shape the compiled body must have.
    pub shape: DelegateShape,
}

/// FIFO of pending bodies for one draft.
#[derive(Debug)]
pub struct PendingQueue<E> {
    entries: VecDeque<PendingInitializer<E>>,
}

impl<E> Default for PendingQueue<E> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<E> PendingQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: PendingInitializer<E>) {
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry in definition order. Each entry is yielded exactly once.
    pub fn drain(&mut self) -> impl Iterator<Item = PendingInitializer<E>> + '_ {
        self.entries.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::CompanionType;
    use quill_core::DataType;

    #[test]
    fn drains_in_definition_order_once() {
        let mut companion = CompanionType::new("T");
        let mut queue = PendingQueue::new();
        for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
            let shape = DelegateShape::new(vec![], DataType::Int32);
            queue.push(PendingInitializer {
                target: companion.define_method(name, shape.clone()),
                member: name.to_string(),
                body: i,
                shape,
            });
        }
        let order: Vec<usize> = queue.drain().map(|entry| entry.body).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(queue.is_empty());
        assert_eq!(queue.drain().count(), 0);
    }
}
