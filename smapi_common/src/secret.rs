use std::{
    fmt,
    fmt::{Debug, Display},
};

use zeroize::Zeroize;

/// A wrapper around secret values (API secret keys, HMAC keys, tokens).
///
/// The wrapped value never appears in `Debug` or `Display` output, and is zeroed out when the
/// wrapper is dropped. Access to the underlying value is always explicit, via [`Secret::reveal`].
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Zeroize + Clone + Default
{
    value: T,
}

impl<T: Zeroize + Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl<T: Zeroize + Clone + Default> Drop for Secret<T> {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

impl<T: Zeroize + Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Zeroize + Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
