/// Interner that checks for duplicates and only stores each unique string once.
mod packed;
pub use packed::PackedInterner;

/// Internals for mapping keys to interned strings.
mod key_to_str;
use key_to_str::KeyToStr;

/// Wrapper around interners that uses typed keys.
mod typed;
pub use typed::TypedInterner;

/// Internals for mapping interned strings to keys.
mod str_to_key;
use str_to_key::StrToKey;

/// Traits implemented by all interners.
mod traits;
pub use traits::{GetStr, InternStr, LookupStr};

type Hasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Interned string key {0} is out of range")]
    KeyNotFound(usize),
    #[error("Out of interner keys; {0} does not fit in the key type")]
    OutOfKeys(usize),
}
