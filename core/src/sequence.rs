//! A lockable, ordered list of [`DataSet`] items: the value of an SQ
//! element (§3, §4.4).

use crate::dataset::DataSet;
use crate::error::{Error, Result};

/// An ordered list of [`DataSet`] items. A `Sequence` exclusively owns its
/// items; once [`lock`][Sequence::lock]ed, `append`/`remove` fail with
/// [`Error::Invalid`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    items: Vec<DataSet>,
    locked: bool,
}

impl Sequence {
    /// Construct an empty, mutable sequence.
    pub fn new() -> Self {
        Sequence {
            items: Vec::new(),
            locked: false,
        }
    }

    /// Append an item, adopting it. Fails if the sequence is locked.
    pub fn append(&mut self, item: DataSet) -> Result<()> {
        if self.locked {
            return Err(Error::invalid("cannot append to a locked sequence"));
        }
        self.items.push(item);
        Ok(())
    }

    /// Borrow the item at the given zero-based index.
    pub fn get(&self, index: usize) -> Option<&DataSet> {
        self.items.get(index)
    }

    /// Remove and return the item at the given index. Fails if the sequence
    /// is locked or the index is out of range.
    pub fn remove(&mut self, index: usize) -> Result<DataSet> {
        if self.locked {
            return Err(Error::invalid("cannot remove from a locked sequence"));
        }
        if index >= self.items.len() {
            return Err(Error::invalid(format!(
                "item index {index} out of range (count = {})",
                self.items.len()
            )));
        }
        Ok(self.items.remove(index))
    }

    /// Number of items.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Whether the sequence holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Visit every item in order.
    pub fn foreach<F: FnMut(&DataSet)>(&self, mut f: F) {
        for item in &self.items {
            f(item);
        }
    }

    /// All items, in order.
    pub fn items(&self) -> &[DataSet] {
        &self.items
    }

    /// Transition to the locked state. Idempotent.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Whether the sequence is locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl FromIterator<DataSet> for Sequence {
    fn from_iter<I: IntoIterator<Item = DataSet>>(iter: I) -> Self {
        Sequence {
            items: iter.into_iter().collect(),
            locked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::{Tag, VR};

    fn ds_with_sh(value: &str) -> DataSet {
        let mut ds = DataSet::new();
        let mut e = Element::empty(Tag(0x0040, 0x0009), VR::SH);
        e.set_string(value).unwrap();
        ds.insert(e).unwrap();
        ds
    }

    #[test]
    fn append_and_get() {
        let mut seq = Sequence::new();
        seq.append(ds_with_sh("A")).unwrap();
        seq.append(ds_with_sh("B")).unwrap();
        assert_eq!(seq.count(), 2);
        assert_eq!(
            seq.get(0)
                .unwrap()
                .get(Tag(0x0040, 0x0009))
                .unwrap()
                .get_value_string(0)
                .unwrap(),
            "A"
        );
    }

    #[test]
    fn locked_sequence_rejects_mutation() {
        let mut seq = Sequence::new();
        seq.append(ds_with_sh("A")).unwrap();
        seq.lock();
        assert!(seq.append(ds_with_sh("B")).is_err());
        assert!(seq.remove(0).is_err());
        assert_eq!(seq.count(), 1);
    }
}
