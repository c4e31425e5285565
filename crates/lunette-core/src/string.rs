//! Immutable Lua byte string.
//!
//! Lua strings are arbitrary byte sequences, not UTF-8. Values are cheap to
//! clone: the bytes live behind a shared reference-counted buffer and are
//! never mutated after construction.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Longest string the binary chunk format stores with the short-string tag.
pub const SHORT_STRING_MAX: usize = 40;

/// A shared, immutable Lua string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LuaStr(Rc<[u8]>);

impl LuaStr {
    /// Create a string from raw bytes.
    pub fn new(bytes: &[u8]) -> Self {
        LuaStr(Rc::from(bytes))
    }

    /// Get the bytes of this string.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the string is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if this string would be dumped with the short-string tag.
    pub fn is_short(&self) -> bool {
        self.0.len() <= SHORT_STRING_MAX
    }

    /// View as `&str` when the bytes are valid UTF-8.
    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

/// The empty string.
impl Default for LuaStr {
    fn default() -> Self {
        LuaStr::new(b"")
    }
}

impl Deref for LuaStr {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for LuaStr {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for LuaStr {
    fn from(s: &str) -> Self {
        LuaStr::new(s.as_bytes())
    }
}

impl From<String> for LuaStr {
    fn from(s: String) -> Self {
        LuaStr(Rc::from(s.into_bytes()))
    }
}

impl From<&[u8]> for LuaStr {
    fn from(bytes: &[u8]) -> Self {
        LuaStr::new(bytes)
    }
}

impl From<Vec<u8>> for LuaStr {
    fn from(bytes: Vec<u8>) -> Self {
        LuaStr(Rc::from(bytes))
    }
}

impl fmt::Debug for LuaStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.to_str() {
            write!(f, "{s:?}")
        } else {
            write!(f, "<binary string len={}>", self.len())
        }
    }
}

impl fmt::Display for LuaStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}
