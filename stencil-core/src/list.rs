//! List capability and its default implementation.
//!
//! The engine never requires host data to be copied into its own containers:
//! anything implementing [`ListIntf`] can be handed to the renderer as a
//! [`Value`]. [`TemplateList`] is the shipped array-backed implementation.

use std::cell::RefCell;

use crate::value::Value;

/// Read-only, index-addressable sequence of values.
pub trait ListIntf {
    /// Number of elements.
    fn count(&self) -> usize;

    /// Element at `index`; absent when `index >= count()`.
    fn at(&self, index: usize) -> Value;

    /// A fresh cursor positioned on the first element. Cursors created from
    /// the same list are independent of each other.
    fn create_iterator(&self) -> Box<dyn ListIterator + '_>;
}

/// Restartable bidirectional cursor over a [`ListIntf`].
pub trait ListIterator {
    fn to_first(&mut self);
    fn to_last(&mut self);
    fn to_next(&mut self);
    fn to_prev(&mut self);

    /// The element under the cursor, or `None` once it has moved off either end.
    fn current(&self) -> Option<Value>;
}

// ---------------------------------------------------------------------------
// IndexIterator
// ---------------------------------------------------------------------------

/// Cursor built purely on `count()`/`at()`; usable by any list implementation.
pub struct IndexIterator<'a, L: ListIntf + ?Sized> {
    list: &'a L,
    pos: Option<usize>,
}

impl<'a, L: ListIntf + ?Sized> IndexIterator<'a, L> {
    pub fn new(list: &'a L) -> Self {
        Self {
            list,
            pos: Some(0),
        }
    }
}

impl<L: ListIntf + ?Sized> ListIterator for IndexIterator<'_, L> {
    fn to_first(&mut self) {
        self.pos = Some(0);
    }

    fn to_last(&mut self) {
        self.pos = self.list.count().checked_sub(1);
    }

    fn to_next(&mut self) {
        self.pos = self.pos.and_then(|p| p.checked_add(1));
    }

    fn to_prev(&mut self) {
        self.pos = self.pos.and_then(|p| p.checked_sub(1));
    }

    fn current(&self) -> Option<Value> {
        match self.pos {
            Some(p) if p < self.list.count() => Some(self.list.at(p)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TemplateList
// ---------------------------------------------------------------------------

/// Default list: a growable vector of values.
///
/// Appending goes through a shared reference so a list already wrapped in a
/// [`Value`] can still be extended by the host.
#[derive(Debug, Default)]
pub struct TemplateList {
    items: RefCell<Vec<Value>>,
}

impl TemplateList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `v` to the end of the list.
    pub fn append(&self, v: impl Into<Value>) {
        self.items.borrow_mut().push(v.into());
    }
}

impl ListIntf for TemplateList {
    fn count(&self) -> usize {
        self.items.borrow().len()
    }

    fn at(&self, index: usize) -> Value {
        self.items.borrow().get(index).cloned().unwrap_or_default()
    }

    fn create_iterator(&self) -> Box<dyn ListIterator + '_> {
        Box::new(IndexIterator::new(self))
    }
}

impl From<Vec<Value>> for TemplateList {
    fn from(items: Vec<Value>) -> Self {
        Self {
            items: RefCell::new(items),
        }
    }
}

impl<V: Into<Value>> FromIterator<V> for TemplateList {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from(iter.into_iter().map(Into::into).collect::<Vec<_>>())
    }
}

/// Plain vectors act as immutable lists.
impl ListIntf for Vec<Value> {
    fn count(&self) -> usize {
        self.len()
    }

    fn at(&self, index: usize) -> Value {
        self.get(index).cloned().unwrap_or_default()
    }

    fn create_iterator(&self) -> Box<dyn ListIterator + '_> {
        Box::new(IndexIterator::new(self))
    }
}
