//! Structure model - a grid of blocks with a shared power pool, a linear
//! velocity, and a single damage modifier the generator publishes to.
//!
//! Blocks are `hecs` entities carrying capability components; callers
//! describe new blocks with a [`BlockSpec`] so the core never has to
//! inspect concrete block types.

use hecs::{Entity, World};

use crate::components::{
    BlockHealth, BlockLabel, FunctionalSwitch, PowerProducer, SiegeExempt, Vec3,
};

/// Capability descriptor for spawning a block.
#[derive(Debug, Clone)]
pub struct BlockSpec {
    pub name: String,
    /// Rated output, if the block produces power.
    pub power_output: Option<f32>,
    /// Whether the block can be switched on/off.
    pub switchable: bool,
    /// Whether the block is excluded from the forced siege shutdown.
    pub siege_exempt: bool,
}

impl BlockSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            power_output: None,
            switchable: true,
            siege_exempt: false,
        }
    }

    pub fn producing(mut self, max_output: f32) -> Self {
        self.power_output = Some(max_output);
        self
    }

    pub fn siege_exempt(mut self) -> Self {
        self.siege_exempt = true;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.switchable = false;
        self
    }

    /// Power producer - reactors, batteries, solar panels, turbines.
    /// Producers are exempt so siege does not cut its own supply.
    pub fn reactor(name: impl Into<String>, max_output: f32) -> Self {
        Self::new(name).producing(max_output).siege_exempt()
    }

    /// Cockpit or control seat - exempt so the structure stays controllable.
    pub fn cockpit(name: impl Into<String>) -> Self {
        Self::new(name).siege_exempt()
    }

    /// The integrity-field generator block itself (a collector variant,
    /// exempt like other collectors).
    pub fn field_generator(name: impl Into<String>) -> Self {
        Self::new(name).siege_exempt()
    }
}

/// A vehicle or station: block entities plus the structure-wide state the
/// generator reads and writes.
pub struct Structure {
    pub name: String,
    world: World,
    /// Linear velocity, inverted each cycle while siege anchors the structure.
    pub velocity: Vec3,
    damage_modifier: f32,
    modifier_writes: u64,
}

impl Structure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            world: World::new(),
            velocity: Vec3::ZERO,
            damage_modifier: 1.0,
            modifier_writes: 0,
        }
    }

    /// Spawn a block from its capability descriptor.
    pub fn add_block(&mut self, spec: BlockSpec) -> Entity {
        let entity = self.world.spawn((
            BlockLabel::new(spec.name),
            BlockHealth::default(),
        ));
        if let Some(max_output) = spec.power_output {
            let _ = self.world.insert_one(entity, PowerProducer { max_output });
        }
        if spec.switchable {
            let _ = self.world.insert_one(entity, FunctionalSwitch::default());
        }
        if spec.siege_exempt {
            let _ = self.world.insert_one(entity, SiegeExempt);
        }
        entity
    }

    pub fn remove_block(&mut self, block: Entity) {
        let _ = self.world.despawn(block);
    }

    pub fn block_count(&self) -> usize {
        self.world.len() as usize
    }

    /// A block works when it is intact and, if switchable, switched on.
    pub fn block_working(&self, block: Entity) -> bool {
        let destroyed = self
            .world
            .get::<&BlockHealth>(block)
            .map(|h| h.is_destroyed())
            .unwrap_or(true);
        if destroyed {
            return false;
        }
        self.world
            .get::<&FunctionalSwitch>(block)
            .map(|s| s.enabled)
            .unwrap_or(true)
    }

    pub fn block_enabled(&self, block: Entity) -> bool {
        self.world
            .get::<&FunctionalSwitch>(block)
            .map(|s| s.enabled)
            .unwrap_or(false)
    }

    pub fn set_block_enabled(&mut self, block: Entity, enabled: bool) {
        if let Ok(mut switch) = self.world.get::<&mut FunctionalSwitch>(block) {
            switch.enabled = enabled;
        }
    }

    pub fn set_block_integrity(&mut self, block: Entity, integrity: f32) {
        if let Ok(mut health) = self.world.get::<&mut BlockHealth>(block) {
            health.integrity = integrity.clamp(0.0, 1.0);
        }
    }

    /// Total rated output of all intact power producers. Producers keep
    /// their rated output while intact; destroyed ones drop out.
    pub fn generation_capacity(&self) -> f32 {
        self.world
            .query::<(&PowerProducer, &BlockHealth)>()
            .iter()
            .filter(|(_, (_, health))| !health.is_destroyed())
            .map(|(_, (producer, _))| producer.max_output)
            .sum()
    }

    /// Force every switchable, non-exempt block off.
    pub fn shutdown_auxiliaries(&mut self) {
        for (_, (switch, exempt)) in self
            .world
            .query::<(&mut FunctionalSwitch, Option<&SiegeExempt>)>()
            .iter()
        {
            if exempt.is_none() {
                switch.enabled = false;
            }
        }
    }

    /// Re-enable every switchable, non-exempt block.
    pub fn reboot_auxiliaries(&mut self) {
        for (_, (switch, exempt)) in self
            .world
            .query::<(&mut FunctionalSwitch, Option<&SiegeExempt>)>()
            .iter()
        {
            if exempt.is_none() {
                switch.enabled = true;
            }
        }
    }

    /// Current structure-wide damage modifier.
    pub fn damage_modifier(&self) -> f32 {
        self.damage_modifier
    }

    /// Write the damage modifier. Applying it to the world is the host's
    /// job; the write counter lets callers verify de-duplication.
    pub fn set_damage_modifier(&mut self, value: f32) {
        self.damage_modifier = value;
        self.modifier_writes += 1;
    }

    pub fn modifier_writes(&self) -> u64 {
        self.modifier_writes
    }
}
