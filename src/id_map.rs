//! Insertion-ordered map from 64-bit entity ids to dense indices.
//!
//! Path serialization needs a map that keeps insertion order, rejects
//! duplicate keys, and stores i64 keys without boxing. Parallel arrays with
//! a linear membership scan cover that; paths are short enough that probing
//! structures would not pay for themselves.

pub(crate) struct IdIndexMap {
    keys: Vec<i64>,
    values: Vec<u32>,
}

impl IdIndexMap {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Clears the map and reserves room for `capacity` entries.
    pub(crate) fn reset(&mut self, capacity: usize) {
        self.keys.clear();
        self.values.clear();
        if self.keys.capacity() < capacity {
            self.keys.reserve(capacity - self.keys.len());
            self.values.reserve(capacity - self.values.len());
        }
    }

    /// Inserts `key -> value` unless the key is already present.
    /// Returns true if the entry was inserted.
    pub(crate) fn put_if_absent(&mut self, key: i64, value: u32) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        self.keys.push(key);
        self.values.push(value);
        true
    }

    /// Looks up the index stored for `key`, or `default` if absent.
    pub(crate) fn get_or(&self, key: i64, default: i64) -> i64 {
        self.keys
            .iter()
            .position(|&k| k == key)
            .map_or(default, |pos| i64::from(self.values[pos]))
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::IdIndexMap;

    #[test]
    fn test_insertion_order_and_dedup() {
        let mut map = IdIndexMap::with_capacity(4);
        assert!(map.put_if_absent(10, 0));
        assert!(map.put_if_absent(7, 1));
        assert!(!map.put_if_absent(10, 2));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_or(10, -1), 0);
        assert_eq!(map.get_or(7, -1), 1);
        assert_eq!(map.get_or(99, -1), -1);
    }

    #[test]
    fn test_reset_clears_entries() {
        let mut map = IdIndexMap::with_capacity(1);
        map.put_if_absent(1, 0);
        map.reset(8);
        assert_eq!(map.len(), 0);
        assert_eq!(map.get_or(1, -1), -1);
        assert!(map.put_if_absent(1, 5));
        assert_eq!(map.get_or(1, -1), 5);
    }
}
