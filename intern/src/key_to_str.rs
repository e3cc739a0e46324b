use anyhow::Result;
use std::marker::PhantomData;

use super::{Error, GetStr, InternStr};

/// Internals used by all of our interners.
/// Strings are stored back to back in one buffer; `key_to_str` holds start offsets.
#[derive(Debug)]
pub struct KeyToStr<Key = u32, Idx = usize> {
    key_to_str: Vec<Idx>,
    strings: String,
    _phantom: PhantomData<Key>,
}

impl<Key, Idx> KeyToStr<Key, Idx> {
    pub fn with_capacity_and_str_len(cap: usize, str_len: usize) -> Self {
        Self {
            key_to_str: Vec::with_capacity(cap),
            strings: String::with_capacity(str_len),
            _phantom: PhantomData,
        }
    }
}

// GetStr ////////////////////
impl<Key, Idx> GetStr for KeyToStr<Key, Idx>
where
    Key: TryInto<usize>,
    Idx: TryInto<usize> + Copy,
{
    type Key = Key;

    fn get(&self, k: Key) -> Result<&str> {
        let k = k.try_into().map_err(|_| Error::KeyNotFound(usize::MAX))?;
        let (start, end) = self.get_start_and_end(k)?;
        Ok(&self.strings[start..end])
    }

    fn len(&self) -> usize {
        self.key_to_str.len()
    }

    fn str_len(&self) -> usize {
        self.strings.len()
    }
}

// InternStr ///////////////////
impl<Key, Idx> InternStr for KeyToStr<Key, Idx>
where
    Key: TryFrom<usize>,
    Idx: TryFrom<usize>,
{
    type Key = Key;

    fn intern<T: AsRef<str>>(&mut self, s: T) -> Result<Key> {
        let s = s.as_ref();
        let len = self.key_to_str.len();
        let k = Key::try_from(len).map_err(|_| Error::OutOfKeys(len))?;
        let start = self.strings.len();
        let start = Idx::try_from(start).map_err(|_| Error::OutOfKeys(start))?;

        self.key_to_str.push(start);
        self.strings.push_str(s);

        Ok(k)
    }
}

impl<Key, Idx> KeyToStr<Key, Idx>
where
    Idx: TryInto<usize> + Copy,
{
    fn get_start_and_end(&self, k: usize) -> Result<(usize, usize), Error> {
        let start = self.offset(k)?;
        let end = if k + 1 == self.key_to_str.len() {
            self.strings.len()
        } else {
            self.offset(k + 1)?
        };
        Ok((start, end))
    }

    fn offset(&self, k: usize) -> Result<usize, Error> {
        let idx = self.key_to_str.get(k).ok_or(Error::KeyNotFound(k))?;
        (*idx).try_into().map_err(|_| Error::KeyNotFound(k))
    }
}
