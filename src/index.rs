use std::{fmt::Debug, hash::Hash, marker::PhantomData};

/// Implemented by the newtype indices that address entries of an [`IndexVec`]
pub trait Idx: Copy + 'static + Eq + Debug + Hash {
    fn new(idx: usize) -> Self;

    fn index(self) -> usize;
}

/// Declares a `u32` backed index type usable as the key of an [`IndexVec`]
macro_rules! newtype_index {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
        $vis struct $name(u32);

        impl $crate::index::Idx for $name {
            fn new(idx: usize) -> Self {
                assert!(
                    idx < u32::MAX as usize,
                    concat!(stringify!($name), " space exhausted")
                );

                Self(idx as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

pub(crate) use newtype_index;

/// A vector addressed by a typed index instead of a bare `usize`. Entries are
/// never removed, so an index handed out by [`IndexVec::push`] stays valid for
/// the lifetime of the vector.
#[derive(Clone)]
pub struct IndexVec<I: Idx, T> {
    raw: Vec<T>,
    _marker: PhantomData<fn(&I)>,
}

impl<I: Idx, T> IndexVec<I, T> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            raw: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Appends an entry and returns the index it can be found at
    #[inline]
    pub fn push(&mut self, value: T) -> I {
        let idx = self.next_index();
        self.raw.push(value);
        idx
    }

    /// The index the next call to `push` will hand out
    #[inline]
    pub fn next_index(&self) -> I {
        I::new(self.raw.len())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[inline]
    pub fn get(&self, index: I) -> Option<&T> {
        self.raw.get(index.index())
    }

    #[inline]
    pub fn get_mut(&mut self, index: I) -> Option<&mut T> {
        self.raw.get_mut(index.index())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.raw.iter()
    }

    pub fn iter_enumerated(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.raw
            .iter()
            .enumerate()
            .map(|(index, value)| (I::new(index), value))
    }

    pub fn indices(&self) -> impl Iterator<Item = I> + '_ {
        (0..self.raw.len()).map(I::new)
    }
}

impl<I: Idx, T> Default for IndexVec<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Idx, T: Debug> Debug for IndexVec<I, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter_enumerated()).finish()
    }
}

impl<I: Idx, T> core::ops::Index<I> for IndexVec<I, T> {
    type Output = T;

    fn index(&self, index: I) -> &Self::Output {
        &self.raw[index.index()]
    }
}

impl<I: Idx, T> core::ops::IndexMut<I> for IndexVec<I, T> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.raw[index.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    newtype_index! {
        struct TestIdx;
    }

    #[test]
    fn push_hands_out_sequential_indices() {
        let mut vec = IndexVec::<TestIdx, &str>::new();

        assert_eq!(vec.next_index(), TestIdx::new(0));

        let a = vec.push("a");
        let b = vec.push("b");

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(vec[b], "b");
        assert_eq!(vec.len(), 2);
        assert_eq!(vec.indices().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn index_mut_updates_in_place() {
        let mut vec = IndexVec::<TestIdx, u32>::new();
        let idx = vec.push(1);

        vec[idx] += 41;

        assert_eq!(vec.get(idx), Some(&42));
        assert_eq!(vec.get(TestIdx::new(7)), None);
        assert_eq!(idx.to_string(), "#0");
    }
}
