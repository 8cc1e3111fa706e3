//! Live iteration over a list

use std::fmt::{self, Debug, Formatter};
use std::iter::FusedIterator;

use crate::element::Element;
use crate::error::ListError;
use crate::list::IList;

/// Iterator over the values of an [`IList`], yielding each one boxed.
///
/// The iterator reads the live list rather than a snapshot: values pushed while
/// iterating are visited, and shrinking the list ends the iteration early. It
/// holds a handle to the list until it is exhausted, then lets go of it, after
/// which it yields nothing more even if the list grows again.
pub struct ListIter<V> {
    list: Option<IList<V>>,
    position: usize,
}

impl<V: Element> ListIter<V> {
    pub(crate) fn new(list: IList<V>) -> Self {
        Self {
            list: Some(list),
            position: 0,
        }
    }

    /// Number of values left to visit if the list does not change.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.list
            .as_ref()
            .map_or(0, |list| list.len().saturating_sub(self.position))
    }
}

impl<V: Element> Iterator for ListIter<V> {
    type Item = Result<V, ListError>;

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list.as_ref()?;
        let entry = list.entries().entry(self.position);
        match entry {
            Some(entry) => {
                self.position += 1;
                Some(entry.into_boxed())
            }
            None => {
                self.list = None;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), None)
    }
}

impl<V: Element> FusedIterator for ListIter<V> {}

impl<V: Element> Debug for ListIter<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListIter")
            .field("position", &self.position)
            .field("remaining", &self.remaining())
            .finish()
    }
}

impl<V: Element> IList<V> {
    /// Returns an iterator over the live contents of the list.
    #[must_use]
    pub fn iter(&self) -> ListIter<V> {
        ListIter::new(self.clone())
    }
}

impl<V: Element> IntoIterator for &IList<V> {
    type Item = Result<V, ListError>;
    type IntoIter = ListIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: Element> IntoIterator for IList<V> {
    type Item = Result<V, ListError>;
    type IntoIter = ListIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        ListIter::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Tracked;

    #[mockalloc::test]
    fn can_iterate() {
        let x = IList::<Tracked>::from(vec![1_i64, 2, 3]);
        let values: Result<Vec<_>, _> = x.iter().collect();
        assert_eq!(values.unwrap(), [1, 2, 3].map(Tracked::int));

        let mut it = x.iter();
        assert_eq!(it.size_hint(), (3, None));
        it.next();
        assert_eq!(it.remaining(), 2);
    }

    #[mockalloc::test]
    fn sees_live_changes() {
        let x = IList::<Tracked>::from(vec![1_i64, 2]);
        let mut it = x.iter();
        assert_eq!(it.next().unwrap().unwrap(), Tracked::int(1));
        x.push(Tracked::text("a")).unwrap();
        assert_eq!(it.next().unwrap().unwrap(), Tracked::int(2));
        assert_eq!(it.next().unwrap().unwrap(), Tracked::text("a"));
        x.clear();
        assert!(it.next().is_none());
        x.push(Tracked::int(5)).unwrap();
        assert!(it.next().is_none());
        assert_eq!(it.remaining(), 0);
    }

    #[mockalloc::test]
    fn releases_list_when_exhausted() {
        let x = IList::<Tracked>::from(vec![1_i64]);
        let mut it = x.clone().into_iter();
        while it.next().is_some() {}
        drop(x);
        assert_eq!(it.remaining(), 0);
        let mut count = 0;
        for value in &IList::<Tracked>::from(vec![4.0_f64, 5.0]) {
            assert!(value.is_ok());
            count += 1;
        }
        assert_eq!(count, 2);
    }
}
