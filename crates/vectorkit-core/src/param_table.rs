//! Parameter canonicalization table
//!
//! Decoders see parameters as a stream of field updates ("set power to
//! 200 W", "set speed to 800 mm/s") interleaved with geometry. The table
//! keeps one current state, and every time a block is finished the decoder
//! asks for the key of that state. Equal states share one key, so thousands
//! of blocks collapse into a handful of map entries.
//!
//! The current state lives in an `Arc`. Once it has been inserted, the map
//! holds a second reference, and the next update goes through
//! [`Arc::make_mut`], which clones before writing. Keys handed out earlier
//! therefore always describe the state as it was when the block was emitted.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::model::{MarkingParams, ParamChange, ParamsSignature};

/// Deduplicating map builder for [`MarkingParams`]
#[derive(Debug, Clone)]
pub struct ParamTable {
    current: Arc<MarkingParams>,
    committed: Option<i32>,
    cache: HashMap<ParamsSignature, i32>,
    params: BTreeMap<i32, Arc<MarkingParams>>,
    next_key: i32,
}

impl ParamTable {
    /// Create a table whose current state is the default record
    pub fn new() -> Self {
        Self::with_seed(MarkingParams::default())
    }

    /// Create a table starting from `seed`
    pub fn with_seed(seed: MarkingParams) -> Self {
        Self {
            current: Arc::new(seed),
            committed: None,
            cache: HashMap::new(),
            params: BTreeMap::new(),
            next_key: 0,
        }
    }

    /// Create a table pre-filled with an existing params map
    ///
    /// New keys are allocated after the highest existing key.
    pub fn from_map(map: BTreeMap<i32, MarkingParams>) -> Self {
        let mut table = Self::new();
        for (key, params) in map {
            table.cache.entry(params.signature()).or_insert(key);
            table.params.insert(key, Arc::new(params));
            table.next_key = table.next_key.max(key + 1);
        }
        table
    }

    /// The current parameter state
    pub fn current(&self) -> &MarkingParams {
        &self.current
    }

    /// Key of the current state if it has been inserted and not changed since
    pub fn committed_key(&self) -> Option<i32> {
        self.committed
    }

    /// Apply one field update to the current state
    ///
    /// Updates that do not change the value keep the commit. Otherwise the
    /// state is cloned first if the map still shares it.
    pub fn update(&mut self, change: ParamChange) {
        if self.current.already_has(&change) {
            return;
        }
        Arc::make_mut(&mut self.current).apply(change);
        self.committed = None;
    }

    /// Replace the whole current state
    pub fn replace_current(&mut self, params: MarkingParams) {
        if *self.current == params {
            return;
        }
        self.current = Arc::new(params);
        self.committed = None;
    }

    /// Return the key of the current state, inserting it if it is new
    pub fn insert_current(&mut self) -> i32 {
        if let Some(key) = self.committed {
            return key;
        }

        let signature = self.current.signature();
        let key = match self.cache.get(&signature) {
            Some(&key) => {
                if let Some(existing) = self.params.get(&key) {
                    self.current = Arc::clone(existing);
                }
                key
            }
            None => {
                let key = self.next_key;
                self.next_key += 1;
                self.cache.insert(signature, key);
                self.params.insert(key, Arc::clone(&self.current));
                tracing::trace!(key, "new marking params entry");
                key
            }
        };
        self.committed = Some(key);
        key
    }

    /// Intern a record without touching the current state
    pub fn intern(&mut self, params: MarkingParams) -> i32 {
        let signature = params.signature();
        if let Some(&key) = self.cache.get(&signature) {
            return key;
        }
        let key = self.next_key;
        self.next_key += 1;
        self.cache.insert(signature, key);
        self.params.insert(key, Arc::new(params));
        key
    }

    /// Intern every entry of a foreign map, returning old key → new key
    pub fn absorb(&mut self, map: BTreeMap<i32, MarkingParams>) -> HashMap<i32, i32> {
        map.into_iter()
            .map(|(old, params)| (old, self.intern(params)))
            .collect()
    }

    /// Look up a stored entry
    pub fn get(&self, key: i32) -> Option<&MarkingParams> {
        self.params.get(&key).map(|p| p.as_ref())
    }

    /// Number of distinct entries
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no entry has been inserted
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Copy of the output map
    pub fn to_map(&self) -> BTreeMap<i32, MarkingParams> {
        self.params
            .iter()
            .map(|(k, v)| (*k, v.as_ref().clone()))
            .collect()
    }

    /// Consume the table and return the output map
    pub fn into_map(self) -> BTreeMap<i32, MarkingParams> {
        drop(self.current);
        self.params
            .into_iter()
            .map(|(k, v)| (k, Arc::try_unwrap(v).unwrap_or_else(|shared| (*shared).clone())))
            .collect()
    }
}

impl Default for ParamTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_allocates_zero() {
        let mut table = ParamTable::new();
        assert_eq!(table.insert_current(), 0);
        assert_eq!(table.insert_current(), 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_update_after_insert_does_not_alias() {
        let mut table = ParamTable::new();
        table.update(ParamChange::LaserPower(100.0));
        let first = table.insert_current();

        table.update(ParamChange::LaserPower(200.0));
        let second = table.insert_current();

        assert_ne!(first, second);
        assert_eq!(table.get(first).unwrap().laser_power_in_w, 100.0);
        assert_eq!(table.get(second).unwrap().laser_power_in_w, 200.0);
    }

    #[test]
    fn test_returning_to_previous_state_reuses_key() {
        let mut table = ParamTable::new();
        table.update(ParamChange::MarkSpeed(500.0));
        let slow = table.insert_current();
        table.update(ParamChange::MarkSpeed(900.0));
        let fast = table.insert_current();
        table.update(ParamChange::MarkSpeed(500.0));
        assert_eq!(table.committed_key(), None);
        assert_eq!(table.insert_current(), slow);
        assert_ne!(slow, fast);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_noop_update_keeps_commit() {
        let mut table = ParamTable::new();
        table.update(ParamChange::JumpSpeed(3000.0));
        let key = table.insert_current();
        table.update(ParamChange::JumpSpeed(3000.0));
        assert_eq!(table.committed_key(), Some(key));
    }

    #[test]
    fn test_absorb_remaps_equal_entries() {
        let mut table = ParamTable::new();
        table.insert_current();

        let mut other = BTreeMap::new();
        let mut hot = MarkingParams::default();
        hot.laser_power_in_w = 370.0;
        other.insert(4, hot);
        other.insert(9, MarkingParams::default());

        let remap = table.absorb(other);
        assert_eq!(remap[&9], 0);
        assert_eq!(remap[&4], 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_from_map_continues_after_highest_key() {
        let mut map = BTreeMap::new();
        map.insert(3, MarkingParams::default());
        let mut table = ParamTable::from_map(map);
        table.update(ParamChange::LaserPower(50.0));
        assert_eq!(table.insert_current(), 4);
        table.update(ParamChange::LaserPower(0.0));
        assert_eq!(table.insert_current(), 3);
    }

    #[test]
    fn test_into_map() {
        let mut table = ParamTable::new();
        table.update(ParamChange::LaserPower(10.0));
        table.insert_current();
        let map = table.into_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&0].laser_power_in_w, 10.0);
    }
}
