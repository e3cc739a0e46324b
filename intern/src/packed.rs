use anyhow::Result;
use std::hash::BuildHasher;

use super::{GetStr, InternStr, KeyToStr, LookupStr, StrToKey};

/// Interner that checks for duplicates and will only intern a given string once.
/// Using the lasso/rodeo hack for packed maps.
/// First param ("Key") is the id and must be big enough to fit total items;
/// Second param ("Idx") is an index into the string and must be greater than string len.
#[derive(Debug)]
pub struct PackedInterner<Key = u32, Idx = usize, H = crate::Hasher> {
    str_to_key: StrToKey<Key, H>,
    key_to_str: KeyToStr<Key, Idx>,
}

impl<Key, Idx> PackedInterner<Key, Idx, crate::Hasher> {
    pub fn with_capacity_and_str_len(cap: usize, str_len: usize) -> Self {
        Self {
            str_to_key: StrToKey::with_capacity(cap),
            key_to_str: KeyToStr::with_capacity_and_str_len(cap, str_len),
        }
    }
}

// LookupStr //////////////////
impl<Key, Idx, H> LookupStr for PackedInterner<Key, Idx, H>
where
    Key: Copy,
    H: BuildHasher,
    KeyToStr<Key, Idx>: GetStr<Key = Key>,
{
    type Key = Key;

    fn lookup(&self, s: &str) -> Option<Key> {
        self.str_to_key.lookup(s, &self.key_to_str)
    }
}

// GetStr /////////////////////
impl<Key, Idx, H: BuildHasher> GetStr for PackedInterner<Key, Idx, H>
where
    KeyToStr<Key, Idx>: GetStr<Key = Key>,
{
    type Key = Key;

    fn get(&self, k: Key) -> Result<&str> {
        self.key_to_str.get(k)
    }

    fn len(&self) -> usize {
        self.key_to_str.len()
    }

    fn str_len(&self) -> usize {
        self.key_to_str.str_len()
    }
}

// InternStr ///////////////////
impl<Key, Idx, H: BuildHasher> InternStr for PackedInterner<Key, Idx, H>
where
    Key: Copy,
    KeyToStr<Key, Idx>: GetStr<Key = Key> + InternStr<Key = Key>,
{
    type Key = Key;

    fn intern<T: AsRef<str>>(&mut self, s: T) -> Result<Key> {
        let s = s.as_ref();
        self.str_to_key.intern(s, &mut self.key_to_str)
    }
}
