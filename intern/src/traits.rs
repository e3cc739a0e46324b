use anyhow::Result;

/// Interners that can hand back a string given the key it was interned under.
pub trait GetStr {
    type Key;

    fn get(&self, k: Self::Key) -> Result<&str>;

    /// Number of distinct strings interned.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total length in bytes of all interned strings.
    fn str_len(&self) -> usize;
}

/// Interners that can store a string and return its key.
pub trait InternStr {
    type Key;

    /// Intern `s`, returning the existing key if it was seen before.
    fn intern<T: AsRef<str>>(&mut self, s: T) -> Result<Self::Key>;
}

/// Interners that can find the key of a string without interning it.
pub trait LookupStr {
    type Key;

    /// Key of `s`, or `None` if `s` was never interned.
    fn lookup(&self, s: &str) -> Option<Self::Key>;
}
