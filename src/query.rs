//! Query string construction.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Delimiter used when a sequence is packed into one query value.
const LIST_DELIMITER: &str = ",";

/// Fluent accumulator for URL query parameters.
///
/// Typed values are converted to strings on insertion. Keys are unique and
/// the last write wins. [`build_string`](Self::build_string) sorts keys so
/// the same parameter set always produces the same query string, whatever
/// order it was assembled in.
///
/// A builder is a plain mutable value; use one per request.
///
/// # Example
///
/// ```
/// use brewapi::QueryBuilder;
///
/// let mut query = QueryBuilder::new();
/// query
///     .add_string("filter", "user")
///     .add_bool("download", true)
///     .add_int_slice("ids", &[3, 1, 2]);
///
/// assert_eq!(query.build_string(), "download=true&filter=user&ids=3%2C1%2C2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    params: BTreeMap<String, String>,
}

impl QueryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a string value, replacing any previous value for `key`.
    pub fn add_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Insert a signed integer in base 10.
    pub fn add_int(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.add_string(key, value.to_string())
    }

    /// Insert an unsigned integer in base 10.
    pub fn add_uint(&mut self, key: impl Into<String>, value: u64) -> &mut Self {
        self.add_string(key, value.to_string())
    }

    /// Insert `"true"` or `"false"`.
    pub fn add_bool(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.add_string(key, if value { "true" } else { "false" })
    }

    /// Insert a timestamp as RFC3339 (UTC, `Z` suffix).
    pub fn add_time(&mut self, key: impl Into<String>, value: &DateTime<Utc>) -> &mut Self {
        self.add_string(key, value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    /// Insert strings joined by commas, keeping their order.
    ///
    /// An empty sequence inserts nothing.
    pub fn add_string_slice<I, S>(&mut self, key: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = values.into_iter();
        let Some(first) = values.next() else {
            return self;
        };
        let mut joined = first.as_ref().to_string();
        for value in values {
            joined.push_str(LIST_DELIMITER);
            joined.push_str(value.as_ref());
        }
        self.add_string(key, joined)
    }

    /// Insert integers joined by commas, keeping their order.
    ///
    /// An empty slice inserts nothing.
    pub fn add_int_slice(&mut self, key: impl Into<String>, values: &[i64]) -> &mut Self {
        self.add_string_slice(key, values.iter().map(i64::to_string))
    }

    /// Insert a value the caller has already formatted.
    pub fn add_custom(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.add_string(key, value)
    }

    /// Insert only if `value` is non-empty.
    pub fn add_if_not_empty(&mut self, key: impl Into<String>, value: &str) -> &mut Self {
        if value.is_empty() {
            return self;
        }
        self.add_string(key, value)
    }

    /// Insert only if `condition` holds.
    pub fn add_if_true(
        &mut self,
        condition: bool,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        if condition {
            self.add_string(key, value);
        }
        self
    }

    /// Overlay other parameters; they win on conflicting keys.
    pub fn merge<I, K, V>(&mut self, other: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in other {
            self.add_string(key, value);
        }
        self
    }

    /// Delete a key. Absent keys are ignored.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.params.remove(key);
        self
    }

    /// Empty the builder for reuse.
    pub fn clear(&mut self) -> &mut Self {
        self.params.clear();
        self
    }

    /// Whether `key` has a value.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// The value for `key`, or `""` if absent.
    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.params.get(key).map_or("", String::as_str)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The accumulated parameters.
    #[must_use]
    pub fn build(&self) -> BTreeMap<String, String> {
        self.params.clone()
    }

    /// Canonical query string: keys ascending, keys and values percent-encoded, `&`-joined.
    #[must_use]
    pub fn build_string(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build_string())
    }
}

impl Serialize for QueryBuilder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.params.serialize(serializer)
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for QueryBuilder {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.merge(iter);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryBuilder {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut builder = Self::new();
        builder.merge(iter);
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    #[test]
    fn test_build_string_sorted_and_encoded() {
        let mut query = QueryBuilder::new();
        query
            .add_string("filter", "user")
            .add_bool("download", true)
            .add_int_slice("ids", &[3, 1, 2]);

        assert_eq!(
            query.build_string(),
            "download=true&filter=user&ids=3%2C1%2C2"
        );
    }

    #[test]
    fn test_build_string_independent_of_insertion_order() {
        let mut a = QueryBuilder::new();
        a.add_string("b", "2").add_string("a", "1").add_string("c", "3");

        let mut b = QueryBuilder::new();
        b.add_string("c", "3").add_string("a", "1").add_string("b", "2");

        assert_eq!(a.build_string(), b.build_string());
        assert_eq!(a.build_string(), a.build_string());
        assert_eq!(a.build_string(), "a=1&b=2&c=3");
    }

    #[test]
    fn test_last_write_wins() {
        let mut query = QueryBuilder::new();
        query.add_string("k", "a").add_string("k", "b");

        assert_eq!(query.get("k"), "b");
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_typed_values() {
        let when = Utc.with_ymd_and_hms(2024, 1, 1, 12, 34, 56).unwrap();
        let mut query = QueryBuilder::new();
        query
            .add_int("limit", -5)
            .add_uint("offset", 40)
            .add_bool("archived", false)
            .add_time("since", &when)
            .add_custom("sort", "name:asc");

        assert_eq!(query.get("limit"), "-5");
        assert_eq!(query.get("offset"), "40");
        assert_eq!(query.get("archived"), "false");
        assert_eq!(query.get("since"), "2024-01-01T12:34:56Z");
        assert_eq!(query.get("sort"), "name:asc");
    }

    #[test]
    fn test_empty_slices_are_omitted() {
        let mut query = QueryBuilder::new();
        query
            .add_string_slice("names", Vec::<String>::new())
            .add_int_slice("ids", &[]);

        assert!(!query.has("names"));
        assert!(!query.has("ids"));
        assert!(query.is_empty());
    }

    #[test]
    fn test_string_slice_keeps_order() {
        let mut query = QueryBuilder::new();
        query.add_string_slice("groups", ["zeta", "alpha", "mid"]);
        assert_eq!(query.get("groups"), "zeta,alpha,mid");
    }

    #[test]
    fn test_conditional_insertion() {
        let mut query = QueryBuilder::new();
        query.add_if_not_empty("k", "");
        assert!(!query.has("k"));

        query.add_if_not_empty("k", "v");
        assert_eq!(query.get("k"), "v");

        query.add_if_true(false, "flag", "yes").add_if_true(true, "other", "yes");
        assert!(!query.has("flag"));
        assert_eq!(query.get("other"), "yes");
    }

    #[test]
    fn test_merge_overwrites_conflicts() {
        let mut query = QueryBuilder::new();
        query.add_string("a", "1").add_string("b", "2");

        let mut other = HashMap::new();
        other.insert("b", "20");
        other.insert("c", "30");
        query.merge(other);

        assert_eq!(query.get("a"), "1");
        assert_eq!(query.get("b"), "20");
        assert_eq!(query.get("c"), "30");
        assert_eq!(query.len(), 3);
    }

    #[test]
    fn test_remove_and_missing_get() {
        let mut query = QueryBuilder::new();
        query.add_string("a", "1").remove("a").remove("never-added");

        assert!(!query.has("a"));
        assert_eq!(query.get("a"), "");
    }

    #[test]
    fn test_clear_allows_reuse() {
        let mut query = QueryBuilder::new();
        query.add_string("a", "1").add_string("b", "2");
        query.clear().add_string("c", "3");

        assert_eq!(query.len(), 1);
        assert_eq!(query.build_string(), "c=3");
    }

    #[test]
    fn test_build_returns_map() {
        let query: QueryBuilder = [("x", "1"), ("y", "2")].into_iter().collect();
        let map = query.build();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("x").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_keys_with_reserved_characters_are_encoded() {
        let mut query = QueryBuilder::new();
        query.add_string("a&b=c", "1").add_string("x#y", "2");

        assert_eq!(query.build_string(), "a%26b%3Dc=1&x%23y=2");

        let encoded = query.build_string();
        let decoded: HashMap<String, String> =
            url::form_urlencoded::parse(encoded.as_bytes()).into_owned().collect();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get("a&b=c").map(String::as_str), Some("1"));
        assert_eq!(decoded.get("x#y").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_empty_build_string() {
        assert_eq!(QueryBuilder::new().build_string(), "");
    }

    #[test]
    fn test_values_survive_query_decoding() {
        let mut query = QueryBuilder::new();
        query
            .add_string("q", "a b&c=d/é")
            .add_string_slice("tags", ["x", "y"]);

        let decoded: HashMap<String, String> =
            serde_qs::from_str(&query.build_string()).expect("Failed to decode query");

        assert_eq!(decoded.get("q").map(String::as_str), Some("a b&c=d/é"));
        assert_eq!(decoded.get("tags").map(String::as_str), Some("x,y"));
    }
}
