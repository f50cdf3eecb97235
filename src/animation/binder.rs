use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::animation::binding::{Animated, AnimatedProperty};
use crate::animation::track_data::TrackData;
use crate::animation::values::{AnimationValue, DataType};
use crate::errors::{GorgonError, Result};

type PropertyCache = RwLock<FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

static RESOLVED: LazyLock<PropertyCache> = LazyLock::new(|| RwLock::new(FxHashMap::default()));

/// A property of `O` that a track may bind to by name.
pub struct ResolvedProperty<O> {
    property: AnimatedProperty<O>,
}

impl<O> ResolvedProperty<O> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.property.name
    }

    /// Display name, falling back to the property name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        self.property.display_name.unwrap_or(self.property.name)
    }

    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.property.data_type
    }

    /// Reads the current value from `target`.
    #[must_use]
    pub fn read(&self, target: &O) -> AnimationValue {
        (self.property.get)(target)
    }

    /// Writes `value` into `target`; `false` if the value does not fit the field.
    pub fn write(&self, target: &mut O, value: AnimationValue) -> bool {
        (self.property.set)(target, value)
    }
}

impl<O> fmt::Debug for ResolvedProperty<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.property.fmt(f)
    }
}

/// The animatable properties of one target type, keyed by name.
pub struct ResolvedProperties<O> {
    type_name: &'static str,
    properties: FxHashMap<&'static str, ResolvedProperty<O>>,
    order: SmallVec<[&'static str; 8]>,
}

impl<O> ResolvedProperties<O> {
    /// Name of the target type, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedProperty<O>> {
        self.properties.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedProperty<O>> {
        self.order.iter().filter_map(|name| self.properties.get(name))
    }

    /// One empty track per property, in declaration order.
    ///
    /// Properties whose type has no built-in track are skipped.
    #[must_use]
    pub fn create_tracks(&self) -> Vec<TrackData> {
        self.iter()
            .filter_map(|property| {
                let track = TrackData::for_data_type(property.name(), property.data_type());
                if track.is_none() {
                    log::warn!(
                        "Property '{}' of {} has data type {} with no built-in track; skipped",
                        property.name(),
                        self.type_name,
                        property.data_type()
                    );
                }
                track
            })
            .collect()
    }
}

impl<O> fmt::Debug for ResolvedProperties<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedProperties")
            .field("type_name", &self.type_name)
            .field("properties", &self.order)
            .finish()
    }
}

/// Resolves and caches the animatable properties of target types.
///
/// Resolution happens once per type; later calls share the cached table.
pub struct PropertyResolver;

impl PropertyResolver {
    /// Animatable properties of `O`.
    ///
    /// Fails with [`GorgonError::NoAnimatableProperties`] when `O` declares none.
    pub fn resolve<O: Animated>() -> Result<Arc<ResolvedProperties<O>>> {
        let key = TypeId::of::<O>();

        let cached = RESOLVED.read().get(&key).cloned();
        if let Some(entry) = cached {
            return Self::downcast(entry);
        }

        let resolved = Arc::new(Self::build::<O>()?);
        let entry = RESOLVED
            .write()
            .entry(key)
            .or_insert_with(|| resolved.clone() as Arc<dyn Any + Send + Sync>)
            .clone();
        Self::downcast(entry)
    }

    fn build<O: Animated>() -> Result<ResolvedProperties<O>> {
        let type_name = std::any::type_name::<O>();
        let declared = O::animated_properties();
        if declared.is_empty() {
            return Err(GorgonError::NoAnimatableProperties(type_name));
        }

        let mut properties = FxHashMap::default();
        let mut order = SmallVec::new();
        for property in declared {
            if properties.contains_key(property.name) {
                log::warn!("{type_name} declares animated property '{}' twice; keeping the first", property.name);
                continue;
            }
            properties.insert(property.name, ResolvedProperty { property: *property });
            order.push(property.name);
        }

        log::debug!("Resolved {} animated properties for {type_name}", order.len());
        Ok(ResolvedProperties {
            type_name,
            properties,
            order,
        })
    }

    fn downcast<O: Animated>(entry: Arc<dyn Any + Send + Sync>) -> Result<Arc<ResolvedProperties<O>>> {
        entry
            .downcast::<ResolvedProperties<O>>()
            .map_err(|_| GorgonError::NoAnimatableProperties(std::any::type_name::<O>()))
    }
}
