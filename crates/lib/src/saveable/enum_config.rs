use std::fmt;

use super::SaveableMap;
use crate::schema::{Composite, Enumeration, FieldDescriptor};

/// A value for every variant of an enumeration.
///
/// Before every save and after every load, variants missing from the map
/// are filled in with `default_value`, so a document always lists each
/// variant even after new ones are added to the enum. Documents embed it
/// as their ancestor with [`ParentFields::embed`](crate::schema::ParentFields::embed);
/// its single `values` field is merged into the document's own fields.
///
/// The registry must know the map type, see
/// [`Registry::register_enum_config`](crate::schema::Registry::register_enum_config).
pub struct EnumConfig<K, V> {
    values: SaveableMap<K, V>,
    default_value: fn(K) -> V,
}

impl<K, V> EnumConfig<K, V>
where
    K: Enumeration,
    V: Send + 'static,
{
    pub fn new(default_value: fn(K) -> V) -> Self {
        let mut config = Self {
            values: SaveableMap::new(),
            default_value,
        };
        config.ensure_all_keys();
        config
    }

    /// Add the default value for each variant that has no entry.
    pub fn ensure_all_keys(&mut self) {
        for variant in K::variants() {
            if !self.values.contains_key(variant) {
                self.values.insert(*variant, (self.default_value)(*variant));
            }
        }
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.values.get(&key)
    }

    pub fn set(&mut self, key: K, value: V) {
        self.values.insert(key, value);
    }

    pub fn values(&self) -> &SaveableMap<K, V> {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut SaveableMap<K, V> {
        &mut self.values
    }
}

fn default_of<K, V: Default>(_: K) -> V {
    V::default()
}

impl<K, V> Default for EnumConfig<K, V>
where
    K: Enumeration,
    V: Default + Send + 'static,
{
    fn default() -> Self {
        Self::new(default_of::<K, V>)
    }
}

impl<K: Clone, V: Clone> Clone for EnumConfig<K, V> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            default_value: self.default_value,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for EnumConfig<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumConfig")
            .field("values", &self.values)
            .finish()
    }
}

impl<K, V> Composite for EnumConfig<K, V>
where
    K: Enumeration,
    V: Send + 'static,
{
    fn fields() -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::required(
            "values",
            |c: &EnumConfig<K, V>| &c.values,
            |c| &mut c.values,
        )]
    }

    fn before_save(&mut self) {
        self.ensure_all_keys();
    }

    fn after_load(&mut self) {
        self.ensure_all_keys();
    }
}
