use crate::internal::entity_index::DEFAULT_VERSION_BITS;
use crate::internal::world_core::World;

#[derive(Clone, Debug, Default)]
pub struct WorldConfig {
    pub(crate) version_bits: Option<u8>,
    pub(crate) entity_capacity: usize,
}

impl WorldConfig {
    /// Width of the id version field, `None` for plain ids.
    pub fn version_bits(&self) -> Option<u8> {
        self.version_bits
    }

    pub fn entity_capacity(&self) -> usize {
        self.entity_capacity
    }
}

/// Builder of a [`World`].
///
/// ```
/// use relex_core::ConfigurableWorld;
/// let world = ConfigurableWorld::new()
///     .with_default_versioning()
///     .with_entity_capacity(1024)
///     .seal();
/// assert!(world.entity_index().is_versioned());
/// ```
pub struct ConfigurableWorld {
    config: WorldConfig,
}

impl ConfigurableWorld {
    pub fn new() -> ConfigurableWorld {
        ConfigurableWorld {
            config: WorldConfig::default(),
        }
    }

    /// Generational ids with a `version_bits` wide version.
    ///
    /// # Panics
    /// If `version_bits` is outside `1..=16`.
    pub fn with_versioning(mut self, version_bits: u8) -> ConfigurableWorld {
        assert!(
            (1..=16).contains(&version_bits),
            "version width must be within 1..=16 bits, got {}",
            version_bits
        );
        self.config.version_bits = Some(version_bits);
        self
    }

    pub fn with_default_versioning(self) -> ConfigurableWorld {
        self.with_versioning(DEFAULT_VERSION_BITS)
    }

    pub fn with_entity_capacity(mut self, capacity: usize) -> ConfigurableWorld {
        self.config.entity_capacity = capacity;
        self
    }

    pub fn seal(self) -> World {
        World::with_config(self.config)
    }
}
