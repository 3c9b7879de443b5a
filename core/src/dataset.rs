//! An ordered-by-insertion, tag-indexed collection of [`Element`]s (§3,
//! §4.4).

use crate::element::Element;
use crate::error::{Error, Result};
use crate::tag::Tag;
use std::collections::HashMap;

/// A mapping `Tag -> Element` with unique keys. Iteration via
/// [`foreach`][DataSet::foreach] preserves insertion order; ascending order
/// is only materialized on demand, through [`copy_tags`][DataSet::copy_tags].
///
/// A `DataSet` exclusively owns its elements: [`insert`][DataSet::insert]
/// adopts the element, and [`remove`][DataSet::remove] drops it. Once
/// [`lock`][DataSet::lock]ed, `insert`/`remove` fail with
/// [`Error::Invalid`] while accessors keep working — this is the
/// mutable-then-locked builder pattern used throughout the crate in place
/// of a runtime mutability flag checked on every field access.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    order: Vec<Tag>,
    elements: HashMap<Tag, Element>,
    locked: bool,
}

impl DataSet {
    /// Construct an empty, mutable data set.
    pub fn new() -> Self {
        DataSet {
            order: Vec::new(),
            elements: HashMap::new(),
            locked: false,
        }
    }

    /// Insert an element, adopting it. If an element with the same tag is
    /// already present, it is replaced in place (its insertion position is
    /// kept). Fails if the data set is locked.
    pub fn insert(&mut self, element: Element) -> Result<()> {
        if self.locked {
            return Err(Error::invalid("cannot insert into a locked data set"));
        }
        let tag = element.tag();
        if !self.elements.contains_key(&tag) {
            self.order.push(tag);
        }
        self.elements.insert(tag, element);
        Ok(())
    }

    /// Remove the element with the given tag. Fails if the data set is
    /// locked or no such element exists.
    pub fn remove(&mut self, tag: Tag) -> Result<Element> {
        if self.locked {
            return Err(Error::invalid("cannot remove from a locked data set"));
        }
        let removed = self
            .elements
            .remove(&tag)
            .ok_or_else(|| Error::invalid(format!("no such data element {tag}")))?;
        self.order.retain(|t| *t != tag);
        Ok(removed)
    }

    /// Borrow the element with the given tag, if present.
    pub fn get(&self, tag: Tag) -> Option<&Element> {
        self.elements.get(&tag)
    }

    /// Whether an element with the given tag is present.
    pub fn contains(&self, tag: Tag) -> bool {
        self.elements.contains_key(&tag)
    }

    /// Obtain an owned deep copy of the element with the given tag.
    pub fn get_clone(&self, tag: Tag) -> Option<Element> {
        self.elements.get(&tag).cloned()
    }

    /// Number of elements in the data set.
    pub fn count(&self) -> usize {
        self.order.len()
    }

    /// Whether the data set holds no elements.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every tag in the data set, in ascending order.
    pub fn copy_tags(&self) -> Vec<Tag> {
        let mut tags = self.order.clone();
        tags.sort();
        tags
    }

    /// Visit every element in insertion order.
    pub fn foreach<F: FnMut(&Element)>(&self, mut f: F) {
        for tag in &self.order {
            if let Some(e) = self.elements.get(tag) {
                f(e);
            }
        }
    }

    /// Iterate over elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(move |t| self.elements.get(t))
    }

    /// Transition to the locked state. Idempotent.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Whether the data set is locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VR;

    fn elem(group: u16, elt: u16) -> Element {
        let mut e = Element::empty(Tag(group, elt), VR::CS);
        e.set_string("X").unwrap();
        e
    }

    #[test]
    fn insert_get_remove_roundtrip() {
        let mut ds = DataSet::new();
        let tag = Tag(0x0010, 0x0010);
        ds.insert(elem(0x0010, 0x0010)).unwrap();
        assert!(ds.get(tag).is_some());
        ds.remove(tag).unwrap();
        assert!(!ds.contains(tag));
    }

    #[test]
    fn count_matches_foreach_and_ascending_copy_tags() {
        let mut ds = DataSet::new();
        ds.insert(elem(0x0010, 0x0020)).unwrap();
        ds.insert(elem(0x0008, 0x0018)).unwrap();
        ds.insert(elem(0x0020, 0x000D)).unwrap();

        let mut seen = 0;
        ds.foreach(|_| seen += 1);
        assert_eq!(seen, ds.count());

        let tags = ds.copy_tags();
        assert_eq!(tags.len(), ds.count());
        assert!(tags.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn insertion_order_preserved_by_foreach() {
        let mut ds = DataSet::new();
        ds.insert(elem(0x0020, 0x000D)).unwrap();
        ds.insert(elem(0x0008, 0x0018)).unwrap();
        let mut order = Vec::new();
        ds.foreach(|e| order.push(e.tag()));
        assert_eq!(order, vec![Tag(0x0020, 0x000D), Tag(0x0008, 0x0018)]);
    }

    #[test]
    fn locked_data_set_rejects_mutation_but_not_reads() {
        let mut ds = DataSet::new();
        let tag = Tag(0x0010, 0x0010);
        ds.insert(elem(0x0010, 0x0010)).unwrap();
        ds.lock();
        assert!(ds.is_locked());
        assert!(ds.insert(elem(0x0010, 0x0020)).is_err());
        assert!(ds.remove(tag).is_err());
        assert!(ds.get(tag).is_some());
    }

    #[test]
    fn clone_is_deep() {
        let mut ds = DataSet::new();
        ds.insert(elem(0x0010, 0x0010)).unwrap();
        let mut clone = ds.clone();
        clone.insert(elem(0x0010, 0x0020)).unwrap();
        assert_eq!(ds.count(), 1);
        assert_eq!(clone.count(), 2);
    }
}
