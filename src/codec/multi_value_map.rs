/// Ordered multi-valued parameter map
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::value::Value;

/// An ordered mapping from parameter name to an ordered list of values
///
/// Key order is insertion order, and values keep the order they were added in.
/// A present key always owns a sequence; an empty sequence means the key
/// appeared without a value (`key=`), which is not the same as the key being
/// absent.
///
/// # Examples
///
/// ```
/// use paramwire::codec::MultiValueMap;
///
/// let mut map = MultiValueMap::new();
/// map.put("key1", [1i64, 2, 3]);
/// map.put_optional("key2", None);
///
/// assert_eq!(map.get("key1").map(|v| v.len()), Some(3));
/// assert_eq!(map.get("key2"), Some(&[][..]));
/// assert_eq!(map.get("key3"), None);
/// assert_eq!(map.keys().collect::<Vec<_>>(), vec!["key1", "key2"]);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct MultiValueMap {
    entries: IndexMap<String, Vec<Value>>,
}

impl MultiValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the values of `key`, replacing any previous sequence
    ///
    /// A key that already exists keeps its original position.
    pub fn put<K, I>(&mut self, key: K, values: I)
    where
        K: Into<String>,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.entries
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    /// Set the values of `key`, treating a missing list as an empty one
    pub fn put_optional<K: Into<String>>(&mut self, key: K, values: Option<Vec<Value>>) {
        self.entries.insert(key.into(), values.unwrap_or_default());
    }

    /// Make sure `key` is present, without touching existing values
    pub fn put_empty<K: Into<String>>(&mut self, key: K) -> &mut Vec<Value> {
        self.entries.entry(key.into()).or_default()
    }

    /// Append one value to `key`, creating the key on first sighting
    pub fn append<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.put_empty(key).push(value.into());
    }

    pub fn get(&self, key: &str) -> Option<&[Value]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove `key` and return its values, keeping the order of the other keys
    pub fn remove(&mut self, key: &str) -> Option<Vec<Value>> {
        self.entries.shift_remove(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of values across all keys
    pub fn value_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Parse a JSON object into a map
    ///
    /// Each member may be an array of scalars, a single scalar, or `null`.
    ///
    /// # Examples
    ///
    /// ```
    /// use paramwire::codec::MultiValueMap;
    ///
    /// let map = MultiValueMap::from_json(r#"{"key1": [1, 2], "key2": "abc", "key3": null}"#).unwrap();
    /// assert_eq!(map.len(), 3);
    /// assert!(map.get("key3").unwrap().is_empty());
    /// ```
    pub fn from_json(json: &str) -> Result<Self, super::CodecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the map as a JSON object, keys in order
    pub fn to_json_pretty(&self) -> Result<String, super::CodecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Two maps are equal when they have the same keys and, for every key, the
/// same values in the same order. Key order is not compared.
impl PartialEq for MultiValueMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.entries.get(k) == Some(v))
    }
}

impl Eq for MultiValueMap {}

impl<K, I> FromIterator<(K, I)> for MultiValueMap
where
    K: Into<String>,
    I: IntoIterator,
    I::Item: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut map = MultiValueMap::new();
        for (key, values) in iter {
            map.put(key, values);
        }
        map
    }
}

impl<'a> IntoIterator for &'a MultiValueMap {
    type Item = (&'a String, &'a Vec<Value>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonEntry {
    Many(Vec<Value>),
    One(Value),
}

impl<'de> Deserialize<'de> for MultiValueMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Option<JsonEntry>>::deserialize(deserializer)?;
        let entries = raw
            .into_iter()
            .map(|(key, entry)| {
                let values = match entry {
                    Some(JsonEntry::Many(values)) => values,
                    Some(JsonEntry::One(value)) => vec![value],
                    None => Vec::new(),
                };
                (key, values)
            })
            .collect();
        Ok(MultiValueMap { entries })
    }
}
