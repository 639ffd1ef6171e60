use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;

/// Default bound for the state-id lookup cache.
const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// One named block property and its declared values. The value index is the
/// digit of the mixed-radix state encoding; declaration order of properties
/// sets the radix weighting, with the last-declared property being the
/// least-significant digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDefinition {
    pub name: String,
    pub values: Vec<String>,
}

impl PropertyDefinition {
    pub fn cardinality(&self) -> usize {
        self.values.len()
    }
}

/// Static per-block state data. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStateDefinition {
    pub base_id: i32,
    pub default_id: i32,
    pub properties: Vec<PropertyDefinition>,
}

impl BlockStateDefinition {
    fn state_count(&self) -> i32 {
        self.properties
            .iter()
            .map(|p| p.cardinality() as i32)
            .product()
    }
}

/// Half-open state-id range owned by one block, for binary search over the
/// partitioned id space.
#[derive(Debug, Clone, Copy)]
struct StateRange {
    base_id: i32,
    end_id: i32,
    block_id: i32,
}

/// Bounded cache for the encode direction of the state codec. Lookups take a
/// read lock; insertion and eviction take the write lock. Capacity 0 turns
/// the cache into a pass-through.
#[derive(Debug)]
struct StateIdCache {
    entries: RwLock<HashMap<u64, i32>>,
    capacity: usize,
}

impl StateIdCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    fn get(&self, key: u64) -> Option<i32> {
        if self.capacity == 0 {
            return None;
        }
        self.entries.read().ok()?.get(&key).copied()
    }

    fn insert(&self, key: u64, state_id: i32) {
        if self.capacity == 0 {
            return;
        }
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        if entries.len() >= self.capacity {
            // no usage signal is kept; arbitrary eviction down to half
            // capacity keeps the map bounded, which is the whole contract
            let keep = self.capacity / 2;
            let doomed: Vec<u64> = entries
                .keys()
                .copied()
                .take(entries.len() + 1 - keep.max(1))
                .collect();
            debug!("state id cache full, evicting {} entries", doomed.len());
            for key in doomed {
                entries.remove(&key);
            }
        }
        entries.insert(key, state_id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

/// Order-independent hash of a block id and its property name/value pairs.
/// Pair hashes are folded commutatively so map iteration order cannot change
/// the key.
fn cache_key(block_id: i32, properties: &HashMap<String, String>) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    let mut key = block_id as u64;
    for (name, value) in properties {
        let mut pair = FNV_OFFSET;
        for byte in name.bytes().chain([0xFF]).chain(value.bytes()) {
            pair ^= byte as u64;
            pair = pair.wrapping_mul(FNV_PRIME);
        }
        key = key.wrapping_add(pair);
    }
    key
}

/// The block-state codec: maps (block id, property values) to dense state
/// ids and back.
///
/// Lookup methods never fail with an error type; `-1` (and an empty map) is
/// the universal "not found" result.
#[derive(Debug)]
pub struct BlockRegistry {
    definitions: HashMap<i32, BlockStateDefinition>,
    ranges: Vec<StateRange>,
    cache: StateIdCache,
}

impl BlockRegistry {
    /// Builds the registry from per-block definitions. Ranges are derived
    /// from each block's property cardinalities and sorted for binary search.
    pub fn new(blocks: Vec<(i32, BlockStateDefinition)>) -> Self {
        let mut ranges: Vec<StateRange> = blocks
            .iter()
            .map(|(block_id, def)| StateRange {
                base_id: def.base_id,
                end_id: def.base_id + def.state_count(),
                block_id: *block_id,
            })
            .collect();
        ranges.sort_by_key(|r| r.base_id);

        Self {
            definitions: blocks.into_iter().collect(),
            ranges,
            cache: StateIdCache::new(DEFAULT_CACHE_CAPACITY),
        }
    }

    /// Replaces the cache with one of the given capacity. 0 disables caching.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = StateIdCache::new(capacity);
        self
    }

    /// Loads the registry from a `blocks.json`-style document: an array of
    /// blocks with `minStateId`/`maxStateId`/`defaultState` and an ordered
    /// `states` array of property descriptors.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let blocks: Vec<BlockJson> = serde_json::from_str(json)?;
        Ok(Self::new(
            blocks
                .into_iter()
                .map(|block| {
                    (
                        block.id,
                        BlockStateDefinition {
                            base_id: block.min_state_id,
                            default_id: block.default_state,
                            properties: block
                                .states
                                .into_iter()
                                .map(|p| PropertyDefinition {
                                    name: p.name,
                                    values: p.values,
                                })
                                .collect(),
                        },
                    )
                })
                .collect(),
        ))
    }

    /// Computes the state id for a block with the given property values.
    ///
    /// Properties are consumed in reverse declaration order so the
    /// last-declared property is the least-significant digit of the
    /// mixed-radix offset. Returns `-1` for an unknown block, a missing
    /// property, or a value not in the property's declared set; partial
    /// states are never produced.
    pub fn state_id(&self, block_id: i32, properties: &HashMap<String, String>) -> i32 {
        let key = cache_key(block_id, properties);
        if let Some(cached) = self.cache.get(key) {
            return cached;
        }

        let state_id = self.state_id_uncached(block_id, properties);
        if state_id != -1 {
            self.cache.insert(key, state_id);
        }
        state_id
    }

    fn state_id_uncached(&self, block_id: i32, properties: &HashMap<String, String>) -> i32 {
        let Some(def) = self.definitions.get(&block_id) else {
            return -1;
        };
        if def.properties.is_empty() {
            return def.base_id;
        }

        let mut offset: i32 = 0;
        let mut multiplier: i32 = 1;

        for property in def.properties.iter().rev() {
            let Some(value) = properties.get(&property.name) else {
                return -1;
            };
            let Some(value_index) = property.values.iter().position(|v| v == value) else {
                return -1;
            };
            offset += value_index as i32 * multiplier;
            multiplier *= property.cardinality() as i32;
        }

        def.base_id + offset
    }

    /// Inverts `state_id`: returns the owning block and its property values,
    /// or `(-1, empty)` when no block's range contains the id. O(log n) in
    /// the number of blocks.
    pub fn state_properties(&self, state_id: i32) -> (i32, HashMap<String, String>) {
        let found = self
            .ranges
            .binary_search_by(|range| {
                if state_id < range.base_id {
                    std::cmp::Ordering::Greater
                } else if state_id >= range.end_id {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok();

        let Some(index) = found else {
            return (-1, HashMap::new());
        };
        let block_id = self.ranges[index].block_id;
        let def = &self.definitions[&block_id];

        let mut offset = state_id - def.base_id;
        let mut properties = HashMap::new();
        for property in def.properties.iter().rev() {
            let cardinality = property.cardinality() as i32;
            let value_index = (offset % cardinality) as usize;
            offset /= cardinality;
            properties.insert(property.name.clone(), property.values[value_index].clone());
        }

        (block_id, properties)
    }

    /// Default state id for a block, `-1` if unknown.
    pub fn default_state_id(&self, block_id: i32) -> i32 {
        self.definitions
            .get(&block_id)
            .map_or(-1, |def| def.default_id)
    }
}

#[derive(Deserialize)]
struct BlockJson {
    id: i32,
    #[serde(rename = "minStateId")]
    min_state_id: i32,
    #[serde(rename = "defaultState")]
    default_state: i32,
    #[serde(default)]
    states: Vec<PropertyJson>,
}

#[derive(Deserialize)]
struct PropertyJson {
    name: String,
    #[serde(default)]
    values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// air (no properties), oak_slab (type x waterlogged), lever
    /// (face x facing x powered)
    fn test_registry() -> BlockRegistry {
        BlockRegistry::new(vec![
            (
                0,
                BlockStateDefinition {
                    base_id: 0,
                    default_id: 0,
                    properties: vec![],
                },
            ),
            (
                1,
                BlockStateDefinition {
                    base_id: 1,
                    default_id: 4,
                    properties: vec![
                        PropertyDefinition {
                            name: "type".to_string(),
                            values: vec![
                                "top".to_string(),
                                "bottom".to_string(),
                                "double".to_string(),
                            ],
                        },
                        PropertyDefinition {
                            name: "waterlogged".to_string(),
                            values: vec!["true".to_string(), "false".to_string()],
                        },
                    ],
                },
            ),
            (
                2,
                BlockStateDefinition {
                    base_id: 7,
                    default_id: 16,
                    properties: vec![
                        PropertyDefinition {
                            name: "face".to_string(),
                            values: vec![
                                "floor".to_string(),
                                "wall".to_string(),
                                "ceiling".to_string(),
                            ],
                        },
                        PropertyDefinition {
                            name: "facing".to_string(),
                            values: vec![
                                "north".to_string(),
                                "south".to_string(),
                                "west".to_string(),
                                "east".to_string(),
                            ],
                        },
                        PropertyDefinition {
                            name: "powered".to_string(),
                            values: vec!["true".to_string(), "false".to_string()],
                        },
                    ],
                },
            ),
        ])
    }

    #[test]
    fn test_state_id_no_properties() {
        let registry = test_registry();
        assert_eq!(registry.state_id(0, &HashMap::new()), 0);
    }

    #[test]
    fn test_state_id_mixed_radix() {
        let registry = test_registry();
        // waterlogged is least significant (cardinality 2), type most
        assert_eq!(
            registry.state_id(1, &props(&[("type", "top"), ("waterlogged", "true")])),
            1
        );
        assert_eq!(
            registry.state_id(1, &props(&[("type", "top"), ("waterlogged", "false")])),
            2
        );
        assert_eq!(
            registry.state_id(1, &props(&[("type", "bottom"), ("waterlogged", "true")])),
            3
        );
        assert_eq!(
            registry.state_id(1, &props(&[("type", "double"), ("waterlogged", "false")])),
            6
        );
        // lever: offset = ((face * 4) + facing) * 2 + powered
        assert_eq!(
            registry.state_id(
                2,
                &props(&[("face", "wall"), ("facing", "west"), ("powered", "false")])
            ),
            7 + ((1 * 4 + 2) * 2 + 1)
        );
    }

    #[test]
    fn test_state_id_invalid_inputs() {
        let registry = test_registry();
        assert_eq!(registry.state_id(99, &HashMap::new()), -1);
        // missing property
        assert_eq!(registry.state_id(1, &props(&[("type", "top")])), -1);
        // unknown value
        assert_eq!(
            registry.state_id(1, &props(&[("type", "sideways"), ("waterlogged", "true")])),
            -1
        );
        // extra properties are ignored as long as the declared ones resolve
        assert_eq!(
            registry.state_id(
                1,
                &props(&[
                    ("type", "top"),
                    ("waterlogged", "true"),
                    ("unrelated", "x")
                ])
            ),
            1
        );
    }

    #[test]
    fn test_state_properties_inverse() {
        let registry = test_registry();
        for state_id in 0..31 {
            let (block_id, properties) = registry.state_properties(state_id);
            assert_ne!(block_id, -1, "state {} should resolve", state_id);
            assert_eq!(
                registry.state_id(block_id, &properties),
                state_id,
                "state {} should round-trip",
                state_id
            );
        }
        let (block_id, properties) = registry.state_properties(31);
        assert_eq!(block_id, -1);
        assert!(properties.is_empty());
        assert_eq!(registry.state_properties(-5).0, -1);
    }

    #[test]
    fn test_state_properties_values() {
        let registry = test_registry();
        let (block_id, properties) = registry.state_properties(6);
        assert_eq!(block_id, 1);
        assert_eq!(properties["type"], "double");
        assert_eq!(properties["waterlogged"], "false");
    }

    #[test]
    fn test_default_state_id() {
        let registry = test_registry();
        assert_eq!(registry.default_state_id(1), 4);
        assert_eq!(registry.default_state_id(99), -1);
    }

    #[test]
    fn test_cache_stays_bounded() {
        let registry = test_registry().with_cache_capacity(8);
        // 30 distinct lookups against a capacity of 8
        for state_id in 1..31 {
            let (block_id, properties) = registry.state_properties(state_id);
            registry.state_id(block_id, &properties);
        }
        assert!(registry.cache.len() <= 8);

        // cached and uncached answers agree
        for state_id in 1..31 {
            let (block_id, properties) = registry.state_properties(state_id);
            assert_eq!(registry.state_id(block_id, &properties), state_id);
        }
    }

    #[test]
    fn test_cache_capacity_zero_disables_caching() {
        let registry = test_registry().with_cache_capacity(0);
        assert_eq!(
            registry.state_id(1, &props(&[("type", "top"), ("waterlogged", "true")])),
            1
        );
        assert_eq!(registry.cache.len(), 0);
    }

    #[test]
    fn test_negative_results_not_cached() {
        let registry = test_registry();
        registry.state_id(99, &HashMap::new());
        registry.state_id(1, &props(&[("type", "top")]));
        assert_eq!(registry.cache.len(), 0);
    }

    #[test]
    fn test_concurrent_lookups() {
        let registry = test_registry().with_cache_capacity(16);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        for state_id in 1..31 {
                            let (block_id, properties) = registry.state_properties(state_id);
                            assert_eq!(registry.state_id(block_id, &properties), state_id);
                        }
                    }
                });
            }
        });
    }

    #[test]
    fn test_cache_key_order_independent() {
        let a = props(&[("type", "top"), ("waterlogged", "true")]);
        // same pairs, different construction order
        let mut b = HashMap::new();
        b.insert("waterlogged".to_string(), "true".to_string());
        b.insert("type".to_string(), "top".to_string());
        assert_eq!(cache_key(1, &a), cache_key(1, &b));
        assert_ne!(cache_key(1, &a), cache_key(2, &a));
    }

    #[test]
    fn test_from_json_matches_programmatic() {
        let json = r#"[
            {"id": 0, "name": "minecraft:air", "minStateId": 0, "maxStateId": 0,
             "defaultState": 0, "states": []},
            {"id": 1, "name": "minecraft:oak_slab", "minStateId": 1, "maxStateId": 6,
             "defaultState": 4, "states": [
                {"name": "type", "num_values": 3, "values": ["top", "bottom", "double"]},
                {"name": "waterlogged", "num_values": 2, "values": ["true", "false"]}
             ]}
        ]"#;
        let registry = BlockRegistry::from_json(json).unwrap();
        assert_eq!(
            registry.state_id(1, &props(&[("type", "bottom"), ("waterlogged", "true")])),
            3
        );
        assert_eq!(registry.default_state_id(1), 4);
        assert_eq!(registry.state_properties(2).0, 1);
        assert_eq!(registry.state_properties(7).0, -1);
    }
}
