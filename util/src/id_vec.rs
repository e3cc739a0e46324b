use std::marker::PhantomData;

/// Vec wrapper that uses typed indexes.
#[derive(Debug, Hash, PartialEq, Eq, Clone)]
pub struct IdVec<K, V> {
    vec: Vec<V>,
    _phantom: PhantomData<K>,
}

impl<K, V> Default for IdVec<K, V> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<K, V> IdVec<K, V> {
    /// Create a new `IdVec` backed by the given vec.
    fn new(vec: Vec<V>) -> Self {
        Self {
            vec,
            _phantom: PhantomData,
        }
    }

    /// Create a new `IdVec` with the given capacity.
    pub fn with_capacity(cap: usize) -> Self {
        Self::new(Vec::with_capacity(cap))
    }

    /// Get the current length
    #[inline]
    pub fn len(&self) -> usize {
        self.vec.len()
    }

    /// True if len == 0
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// Iterate through immutable references to values
    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.vec.iter()
    }
}

impl<K: Into<usize>, V> IdVec<K, V> {
    /// Get the value with id `k`.
    /// Panics if `k` was not handed out by this `IdVec`.
    #[inline]
    pub fn get(&self, k: K) -> &V {
        &self.vec[k.into()]
    }

    /// Get the value with id `k`, or `None` if it is out of range.
    #[inline]
    pub fn try_get(&self, k: K) -> Option<&V> {
        self.vec.get(k.into())
    }

    /// Get a mutable reference to value with id `k`.
    #[inline]
    pub fn get_mut(&mut self, k: K) -> &mut V {
        &mut self.vec[k.into()]
    }
}

impl<K: From<usize>, V> IdVec<K, V> {
    /// Push `v` into the underlying vec, and return an id that can be used to retrieve it later.
    #[inline]
    pub fn push(&mut self, v: V) -> K {
        let id = self.vec.len().into();
        self.vec.push(v);
        id
    }

    /// Iterate through (id, value) pairs in insertion order.
    pub fn enumerate(&self) -> impl Iterator<Item = (K, &V)> {
        self.vec.iter().enumerate().map(|(i, v)| (i.into(), v))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Key(usize);

    impl From<usize> for Key {
        fn from(val: usize) -> Self {
            Self(val)
        }
    }

    impl From<Key> for usize {
        fn from(k: Key) -> usize {
            k.0
        }
    }

    #[test]
    fn test_push_and_get() {
        let mut vec: IdVec<Key, &str> = IdVec::with_capacity(2);
        let a = vec.push("a");
        let b = vec.push("b");
        assert_eq!(Key(0), a);
        assert_eq!(Key(1), b);
        assert_eq!("b", *vec.get(b));
        assert_eq!(None, vec.try_get(Key(2)));
    }

    #[test]
    fn test_enumerate() {
        let mut vec: IdVec<Key, u8> = IdVec::default();
        vec.push(7);
        vec.push(9);
        let pairs: Vec<_> = vec.enumerate().map(|(k, v)| (k, *v)).collect();
        assert_eq!(vec![(Key(0), 7), (Key(1), 9)], pairs);
    }
}
