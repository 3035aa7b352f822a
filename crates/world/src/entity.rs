//! Entity records and the updates that mutate them.

use std::collections::BTreeMap;

use asciicraft_core::BlockPos;
use asciicraft_net::{EntityMetadata, MetadataValue, Slot, METADATA_CUSTOM_NAME, METADATA_FLAGS};
use bitflags::bitflags;
use glam::DVec3;

/// Server-assigned entity id.
pub type EntityId = i32;

/// Metadata index of a living entity's health.
pub const METADATA_HEALTH: u8 = 6;

/// Number of equipment slots (held item plus four armour pieces).
pub const EQUIPMENT_SLOTS: usize = 5;

bitflags! {
    /// Shared flag byte at metadata index 0.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntityFlags: u8 {
        const ON_FIRE = 0x01;
        const CROUCHING = 0x02;
        const RIDING = 0x04;
        const SPRINTING = 0x08;
        const ACTING = 0x10;
        const INVISIBLE = 0x20;
    }
}

/// What an entity is, as far as the spawn packet told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// Another player.
    Player { name: String },
    /// Living mob by network type id.
    Mob(u8),
    /// Vehicle, projectile or dropped item by network type id.
    Object(u8),
    ExperienceOrb { count: i16 },
    Painting { title: String },
    Lightning,
    /// Created implicitly by an update for an id we never saw spawn.
    Unknown,
}

impl EntityKind {
    /// Human-readable type name.
    pub fn name(&self) -> &str {
        match self {
            EntityKind::Player { name } => name,
            EntityKind::Mob(kind) => mob_name(*kind),
            EntityKind::Object(kind) => object_name(*kind),
            EntityKind::ExperienceOrb { .. } => "experience orb",
            EntityKind::Painting { title } => title,
            EntityKind::Lightning => "lightning",
            EntityKind::Unknown => "unknown entity",
        }
    }

    /// Map glyph.
    pub fn glyph(&self) -> char {
        match self {
            EntityKind::Player { .. } => '☺',
            EntityKind::Mob(kind) => mob_glyph(*kind),
            EntityKind::Object(kind) => object_glyph(*kind),
            EntityKind::ExperienceOrb { .. } => '°',
            EntityKind::Painting { .. } => '▣',
            EntityKind::Lightning => 'ϟ',
            EntityKind::Unknown => '?',
        }
    }

    pub fn is_hostile(&self) -> bool {
        matches!(self, EntityKind::Mob(50..=66))
    }
}

fn mob_name(kind: u8) -> &'static str {
    match kind {
        50 => "creeper",
        51 => "skeleton",
        52 => "spider",
        53 => "giant",
        54 => "zombie",
        55 => "slime",
        56 => "ghast",
        57 => "zombie pigman",
        58 => "enderman",
        59 => "cave spider",
        60 => "silverfish",
        61 => "blaze",
        62 => "magma cube",
        63 => "ender dragon",
        64 => "wither",
        65 => "bat",
        66 => "witch",
        90 => "pig",
        91 => "sheep",
        92 => "cow",
        93 => "chicken",
        94 => "squid",
        95 => "wolf",
        96 => "mooshroom",
        97 => "snow golem",
        98 => "ocelot",
        99 => "iron golem",
        120 => "villager",
        _ => "mob",
    }
}

fn mob_glyph(kind: u8) -> char {
    match kind {
        50 => 'C',
        51 => 'S',
        52 | 59 => 'x',
        53 | 54 => 'Z',
        55 | 62 => 'o',
        56 => 'G',
        57 => 'P',
        58 => 'E',
        60 => '~',
        61 => 'B',
        63 => 'D',
        64 => 'W',
        65 => 'v',
        66 => 'w',
        90 => 'p',
        91 => 's',
        92 | 96 => 'c',
        93 => 'h',
        94 => 'q',
        95 => 'd',
        97 => 'g',
        98 => 'f',
        99 => 'I',
        120 => 'V',
        _ => 'M',
    }
}

fn object_name(kind: u8) -> &'static str {
    match kind {
        1 => "boat",
        2 => "item",
        10 => "minecart",
        50 => "primed tnt",
        51 => "ender crystal",
        60 => "arrow",
        61 => "snowball",
        62 => "egg",
        63 => "fireball",
        64 => "small fireball",
        65 => "ender pearl",
        66 => "wither skull",
        70 => "falling block",
        71 => "item frame",
        72 => "eye of ender",
        73 => "potion",
        74 => "falling dragon egg",
        75 => "bottle o' enchanting",
        76 => "firework",
        90 => "fishing float",
        _ => "object",
    }
}

fn object_glyph(kind: u8) -> char {
    match kind {
        1 => 'b',
        2 => '*',
        10 => 'm',
        50 => 'T',
        51 => '◊',
        60 => '↑',
        61..=62 | 65 | 72..=73 | 75 => '•',
        63 | 64 | 66 => '○',
        70 | 74 => '▼',
        71 => '▫',
        76 => '!',
        90 => '⌐',
        _ => '%',
    }
}

/// A tracked entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Feet position in blocks.
    pub position: DVec3,
    pub yaw: f32,
    pub pitch: f32,
    pub head_yaw: f32,
    /// Blocks per tick.
    pub velocity: DVec3,
    pub flags: EntityFlags,
    pub custom_name: Option<String>,
    pub equipment: [Slot; EQUIPMENT_SLOTS],
    pub vehicle: Option<EntityId>,
    pub passenger: Option<EntityId>,
    pub last_status: Option<i8>,
    metadata: BTreeMap<u8, MetadataValue>,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, position: DVec3) -> Self {
        Self {
            id,
            kind,
            position,
            yaw: 0.0,
            pitch: 0.0,
            head_yaw: 0.0,
            velocity: DVec3::ZERO,
            flags: EntityFlags::empty(),
            custom_name: None,
            equipment: Default::default(),
            vehicle: None,
            passenger: None,
            last_status: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Voxel containing the entity's feet.
    pub fn block_pos(&self) -> BlockPos {
        BlockPos::containing(self.position)
    }

    /// Merge a metadata stream; later entries replace earlier ones per index.
    pub fn apply_metadata(&mut self, metadata: &EntityMetadata) {
        for entry in &metadata.entries {
            self.metadata.insert(entry.index, entry.value.clone());
        }
        if let Some(MetadataValue::Byte(bits)) = self.metadata.get(&METADATA_FLAGS) {
            self.flags = EntityFlags::from_bits_truncate(*bits as u8);
        }
        if let Some(MetadataValue::String(name)) = self.metadata.get(&METADATA_CUSTOM_NAME) {
            self.custom_name = (!name.is_empty()).then(|| name.clone());
        }
    }

    /// Raw metadata value at `index`.
    pub fn metadata(&self, index: u8) -> Option<&MetadataValue> {
        self.metadata.get(&index)
    }

    /// Health, when a living entity's metadata carried it.
    pub fn health(&self) -> Option<f32> {
        match (&self.kind, self.metadata.get(&METADATA_HEALTH)) {
            (EntityKind::Mob(_) | EntityKind::Player { .. }, Some(MetadataValue::Float(h))) => {
                Some(*h)
            }
            (EntityKind::Mob(_) | EntityKind::Player { .. }, Some(MetadataValue::Int(h))) => {
                Some(*h as f32)
            }
            _ => None,
        }
    }

    /// Display name: custom name tag if set, otherwise the type name.
    pub fn display_name(&self) -> &str {
        self.custom_name
            .as_deref()
            .unwrap_or_else(|| self.kind.name())
    }

    /// One-line description for the examine panel.
    pub fn describe(&self) -> String {
        let mut text = format!("{} #{} at {}", self.display_name(), self.id, self.block_pos());
        if let Some(health) = self.health() {
            text.push_str(&format!(", health {health:.0}"));
        }
        if let Some(Some(held)) = self.equipment.first() {
            text.push_str(&format!(", holding item {}", held.id));
        }
        if self.vehicle.is_some() {
            text.push_str(", riding");
        }
        if self.flags.contains(EntityFlags::ON_FIRE) {
            text.push_str(", on fire");
        }
        text
    }
}

/// A change to an existing entity, one variant per update packet.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityUpdate {
    /// Relative move in blocks.
    Move(DVec3),
    Look { yaw: f32, pitch: f32 },
    MoveLook { delta: DVec3, yaw: f32, pitch: f32 },
    Teleport { position: DVec3, yaw: f32, pitch: f32 },
    HeadLook(f32),
    /// Velocity in blocks per tick.
    Velocity(DVec3),
    Equipment { slot: usize, item: Slot },
    Metadata(EntityMetadata),
    /// `None` dismounts.
    Attach { vehicle: Option<EntityId> },
    Status(i8),
}

impl EntityUpdate {
    /// Whether the update moves the entity.
    pub fn moves(&self) -> bool {
        matches!(
            self,
            EntityUpdate::Move(_) | EntityUpdate::MoveLook { .. } | EntityUpdate::Teleport { .. }
        )
    }

    /// Position to use when the update has to create the entity.
    pub(crate) fn implicit_position(&self) -> DVec3 {
        match self {
            EntityUpdate::Teleport { position, .. } => *position,
            _ => DVec3::ZERO,
        }
    }
}
