//! Stateless key-selectors: the engine stores an opaque entry `E` and never
//! needs to know whether it's a bare key (set form) or a `(key, value)` pair
//! (map form) — it only ever asks a `KeySelector` for the key. A zero-sized
//! marker type plus trait stands in for passing a selector function as a type
//! parameter.

/// Projects an entry `E` to the key it's homed on.
pub trait KeySelector<E> {
    type Key;
    fn key(entry: &E) -> &Self::Key;
}

/// Selector for the map façade: entries are `(K, V)` pairs.
pub struct MapKeySelect;

impl<K, V> KeySelector<(K, V)> for MapKeySelect {
    type Key = K;
    #[inline]
    fn key(entry: &(K, V)) -> &K {
        &entry.0
    }
}

/// Selector for the set façade: entries are bare keys.
pub struct SetKeySelect;

impl<K> KeySelector<K> for SetKeySelect {
    type Key = K;
    #[inline]
    fn key(entry: &K) -> &K {
        entry
    }
}
