//! The aggregate value: a positional array segment plus keyed map entries.

use super::Value;

/// A recursive table-like value.
///
/// Positive integer keys live in the array segment only while they form the
/// gapless run `1..=N`. As soon as a gap appears every integer key moves to
/// the map segment, and moves back once the gap is filled. All other keys
/// (integers <= 0, floats, text, booleans, refs, aggregates) are map entries,
/// kept in insertion order.
///
/// Equality compares contents, not layout: two aggregates are equal when they
/// hold the same keys with equal values, whatever order the map entries were
/// inserted in.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    array: Vec<Value>,
    map: Vec<(Value, Value)>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an aggregate whose array segment is `items` (keys `1..=len`).
    pub fn from_array(items: Vec<Value>) -> Self {
        Self {
            array: items,
            map: Vec::new(),
        }
    }

    /// Builds an aggregate from key/value pairs.
    ///
    /// Later pairs replace earlier ones with an equal key, and an `Absent`
    /// value removes the key.
    pub fn from_entries(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut agg = Self::new();
        for (key, value) in entries {
            agg.insert(key, value);
        }
        agg
    }

    pub fn into_segments(self) -> (Vec<Value>, Vec<(Value, Value)>) {
        (self.array, self.map)
    }

    /// The positional segment, holding keys `1..=len()`.
    pub fn array(&self) -> &[Value] {
        &self.array
    }

    /// The keyed segment, in insertion order.
    pub fn map(&self) -> &[(Value, Value)] {
        &self.map
    }

    /// Length of the array segment.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// Number of entries across both segments.
    pub fn entry_count(&self) -> usize {
        self.array.len() + self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty() && self.map.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        if let Some(index) = self.array_slot(key) {
            return self.array.get(index);
        }
        self.map.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Stores `value` at key `len() + 1`.
    pub fn push(&mut self, value: impl Into<Value>) {
        let next = i64::try_from(self.array.len() + 1).unwrap_or(i64::MAX);
        self.insert(Value::Integer(next), value.into());
    }

    /// Sets `key` to `value`, returning the previous value if there was one.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        if value.is_absent() {
            return self.remove(&key);
        }

        if let Some(index) = self.array_slot(&key) {
            return Some(std::mem::replace(&mut self.array[index], value));
        }

        if let Some((_, slot)) = self.map.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(slot, value));
        }

        let rebalance = positive_index(&key).is_some();
        self.map.push((key, value));
        if rebalance {
            self.rebalance();
        }
        None
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        if let Some(index) = self.array_slot(key) {
            if index + 1 == self.array.len() {
                return self.array.pop();
            }
            let removed = self.array.remove(index);
            // The hole splits the run, so the tail becomes keyed entries.
            let tail: Vec<(Value, Value)> = self
                .array
                .drain(index..)
                .enumerate()
                .map(|(offset, v)| (key_for(index + offset + 2), v))
                .collect();
            self.map.extend(tail);
            self.rebalance();
            return Some(removed);
        }

        let position = self.map.iter().position(|(k, _)| k == key)?;
        let (_, removed) = self.map.remove(position);
        if positive_index(key).is_some() {
            self.rebalance();
        }
        Some(removed)
    }

    fn array_slot(&self, key: &Value) -> Option<usize> {
        positive_index(key)
            .filter(|&i| i <= self.array.len())
            .map(|i| i - 1)
    }

    // Restores the split rule after positive integer keys changed.
    fn rebalance(&mut self) {
        let len = self.array.len();
        let keyed: Vec<usize> = self
            .map
            .iter()
            .filter_map(|(k, _)| positive_index(k))
            .collect();
        let total = len + keyed.len();
        let gapless = keyed.iter().all(|&i| i > len && i <= total);

        if gapless {
            if keyed.is_empty() {
                return;
            }
            let mut moved = Vec::with_capacity(keyed.len());
            let mut rest = Vec::with_capacity(self.map.len() - keyed.len());
            for (k, v) in self.map.drain(..) {
                match positive_index(&k) {
                    Some(i) => moved.push((i, v)),
                    None => rest.push((k, v)),
                }
            }
            moved.sort_by_key(|(i, _)| *i);
            self.array.extend(moved.into_iter().map(|(_, v)| v));
            self.map = rest;
        } else if !self.array.is_empty() {
            let mut demoted: Vec<(Value, Value)> = self
                .array
                .drain(..)
                .enumerate()
                .map(|(i, v)| (key_for(i + 1), v))
                .collect();
            demoted.append(&mut self.map);
            self.map = demoted;
        }
    }
}

/// Returns the 1-based index if `key` is a positive integer.
fn positive_index(key: &Value) -> Option<usize> {
    match key {
        Value::Integer(i) if *i > 0 => usize::try_from(*i).ok(),
        _ => None,
    }
}

fn key_for(index: usize) -> Value {
    Value::Integer(i64::try_from(index).unwrap_or(i64::MAX))
}

impl PartialEq for Aggregate {
    fn eq(&self, other: &Self) -> bool {
        // Map keys are unique, so equal lengths plus containment is enough.
        self.array == other.array
            && self.map.len() == other.map.len()
            && self
                .map
                .iter()
                .all(|(key, value)| other.map.iter().any(|(k, v)| k == key && v == value))
    }
}

impl FromIterator<Value> for Aggregate {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_array(iter.into_iter().collect())
    }
}

impl FromIterator<(Value, Value)> for Aggregate {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}
