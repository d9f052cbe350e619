//! Builders for HTTP query parameters and request headers.
//!
//! Options structs translate themselves into query pairs or headers through
//! these builders. Zero values are skipped unless a field is required, in
//! which case a zero value is a build-time [`Error::MissingInput`].

use chrono::NaiveDateTime;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt::Display;
use url::Url;

use crate::error::{Error, Result};

/// Collected query parameter pairs, in insertion order.
pub type QueryPairs = Vec<(&'static str, String)>;

/// Format used for time-valued query parameters.
///
/// RFC3339 with milliseconds and without a zone suffix; callers pass UTC.
pub const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Options types that translate into URL query parameters.
pub trait ToQuery {
    /// Build the query pairs for these options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInput`] when a required field is zero.
    fn to_query(&self) -> Result<QueryPairs>;
}

impl ToQuery for () {
    fn to_query(&self) -> Result<QueryPairs> {
        Ok(Vec::new())
    }
}

/// Values with a well-defined zero value.
pub trait IsZero {
    /// Returns true for the zero value of the type.
    fn is_zero(&self) -> bool;
}

impl IsZero for str {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl IsZero for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl IsZero for bool {
    fn is_zero(&self) -> bool {
        !*self
    }
}

impl<T: IsZero + ?Sized> IsZero for &T {
    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }
}

macro_rules! int_is_zero {
    ($($ty:ty),*) => {
        $(impl IsZero for $ty {
            fn is_zero(&self) -> bool {
                *self == 0
            }
        })*
    };
}

int_is_zero!(i32, i64, u16, u32, u64, usize);

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: QueryPairs,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: &'static str, value: Option<T>)
    where
        T: ToString,
    {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append using a mapping function when the value is present.
    pub fn push_opt_with<T, F>(&mut self, key: &'static str, value: Option<T>, mut map: F)
    where
        F: FnMut(T) -> String,
    {
        if let Some(value) = value {
            self.pairs.push((key, map(value)));
        }
    }

    /// Append a key/value pair unless the value is zero.
    pub fn push_nonzero<T>(&mut self, key: &'static str, value: &T)
    where
        T: IsZero + Display + ?Sized,
    {
        if !value.is_zero() {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append a required key/value pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInput`] naming `key` when the value is zero.
    pub fn push_required<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: IsZero + Display + ?Sized,
    {
        if value.is_zero() {
            return Err(Error::MissingInput(key.to_string()));
        }
        self.pairs.push((key, value.to_string()));
        Ok(())
    }

    /// Append `key=true` when the flag is set.
    pub fn push_flag(&mut self, key: &'static str, flag: bool) {
        if flag {
            self.pairs.push((key, "true".to_string()));
        }
    }

    /// Append a key with an empty value when the flag is set (`?detail`).
    pub fn push_presence(&mut self, key: &'static str, flag: bool) {
        if flag {
            self.pairs.push((key, String::new()));
        }
    }

    /// Append one pair per element, expanding to repeated parameters.
    pub fn push_all<T>(&mut self, key: &'static str, values: &[T])
    where
        T: Display,
    {
        for value in values {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append a timestamp formatted with [`QUERY_TIME_FORMAT`].
    pub fn push_time(&mut self, key: &'static str, value: Option<&NaiveDateTime>) {
        if let Some(value) = value {
            self.pairs
                .push((key, value.format(QUERY_TIME_FORMAT).to_string()));
        }
    }

    /// Append a required key/value pair without a zero check.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> QueryPairs {
        self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Builder for assembling request headers from options.
#[derive(Debug, Default, Clone)]
pub struct HeaderParams {
    headers: HeaderMap,
}

impl HeaderParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
        }
    }

    /// Set a header unless the value is zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the name or value is not a valid header.
    pub fn push_nonzero<T>(&mut self, name: &'static str, value: &T) -> Result<()>
    where
        T: IsZero + Display + ?Sized,
    {
        if value.is_zero() {
            return Ok(());
        }
        self.insert(name, &value.to_string())
    }

    /// Set a header when the value is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the name or value is not a valid header.
    pub fn push_opt<T>(&mut self, name: &'static str, value: Option<T>) -> Result<()>
    where
        T: Display,
    {
        match value {
            Some(value) => self.insert(name, &value.to_string()),
            None => Ok(()),
        }
    }

    /// Set a required header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInput`] naming the header when the value is zero.
    pub fn push_required<T>(&mut self, name: &'static str, value: &T) -> Result<()>
    where
        T: IsZero + Display + ?Sized,
    {
        if value.is_zero() {
            return Err(Error::MissingInput(name.to_string()));
        }
        self.insert(name, &value.to_string())
    }

    fn insert(&mut self, name: &'static str, value: &str) -> Result<()> {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| Error::InvalidInput(format!("invalid header name `{name}`: {err}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| Error::InvalidInput(format!("invalid value for header `{name}`: {err}")))?;
        self.headers.insert(header, value);
        Ok(())
    }

    /// Return the collected headers.
    #[must_use]
    pub fn into_headers(self) -> HeaderMap {
        self.headers
    }

    /// Returns true if no headers have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Append query pairs to a URL, keeping any parameters it already has.
#[must_use]
pub fn url_with_query(mut url: Url, pairs: &[(&'static str, String)]) -> Url {
    if !pairs.is_empty() {
        let mut serializer = url.query_pairs_mut();
        for (key, value) in pairs {
            serializer.append_pair(key, value);
        }
    }
    url
}

/// Return `url` with every occurrence of `key` replaced by a single `key=value`.
#[must_use]
pub fn replace_query_param(url: &Url, key: &str, value: &str) -> Url {
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut next = url.clone();
    next.set_query(None);
    {
        let mut serializer = next.query_pairs_mut();
        for (k, v) in &retained {
            serializer.append_pair(k, v);
        }
        serializer.append_pair(key, value);
    }
    next
}

/// Look up the first value of a query parameter.
#[must_use]
pub fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Check that `value` can stand alone as one URL path segment.
///
/// # Errors
///
/// Returns [`Error::MissingInput`] when `value` is empty, and
/// [`Error::InvalidInput`] for `.`, `..` or a value holding a separator,
/// query, fragment, escape or control character.
pub fn path_segment<'a>(key: &'static str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(Error::MissingInput(key.to_string()));
    }
    let reserved = |c: char| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_control();
    if matches!(value, "." | "..") || value.contains(reserved) {
        return Err(Error::InvalidInput(format!(
            "`{key}` is not a valid path segment: {value:?}"
        )));
    }
    Ok(value)
}
