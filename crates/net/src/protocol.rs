//! Packet definitions for protocol version 61 (game version 1.5.2).
//!
//! Every packet is a leading id byte followed by its fields, big-endian, with
//! no outer length prefix. A packet's byte length is therefore a function of
//! its variant and field values alone.

use bytes::BufMut;

use crate::error::CodecError;
use crate::types::{BlockRecord, ChunkMeta, EntityMetadata, ExplosionRecord, ObjectData, Slot};
use crate::wire::{
    checked_len, wire_struct, BytesI16, BytesI32, CountI16, CountI32, CountU8, Fault, Reader, Wire,
};

/// Protocol version sent in the handshake.
pub const PROTOCOL_VERSION: u8 = 61;

/// Direction a packet travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client to server.
    Serverbound,
    /// Server to client.
    Clientbound,
}

/// Which directions a packet id may travel in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Serverbound,
    Clientbound,
    Both,
}

impl Bound {
    const fn allows(self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (Bound::Both, _)
                | (Bound::Serverbound, Direction::Serverbound)
                | (Bound::Clientbound, Direction::Clientbound)
        )
    }
}

wire_struct! {
    /// Connection liveness probe; the client echoes the id back.
    pub struct KeepAlive {
        /// Random id chosen by the server.
        pub id: i32,
    }

    /// Join game. Moves the connection into play.
    pub struct LoginRequest {
        /// The local player's entity id.
        pub entity_id: i32,
        /// World generator name.
        pub level_type: String,
        /// Game mode.
        pub game_mode: i8,
        /// Dimension (-1, 0, 1).
        pub dimension: i8,
        /// Difficulty.
        pub difficulty: i8,
        /// Always zero.
        pub unused: i8,
        /// Player list size.
        pub max_players: i8,
    }

    /// First packet the client sends.
    pub struct Handshake {
        /// Must be [`PROTOCOL_VERSION`].
        pub protocol_version: u8,
        /// Player name.
        pub username: String,
        /// Server host as typed by the user.
        pub host: String,
        /// Server port.
        pub port: i32,
    }

    /// Chat line in either direction.
    pub struct ChatMessage {
        /// Message text (JSON on clientbound).
        pub message: String,
    }

    /// World age and time of day.
    pub struct TimeUpdate {
        /// Ticks since world creation.
        pub age: i64,
        /// Time of day in ticks.
        pub time: i64,
    }

    /// Held item or armour change of an entity.
    pub struct EntityEquipment {
        /// Entity id.
        pub entity_id: i32,
        /// Equipment slot (0 held, 1..=4 armour).
        pub slot: i16,
        /// New item.
        pub item: Slot,
    }

    /// Compass target; sent once after login.
    pub struct SpawnPosition {
        /// X.
        pub x: i32,
        /// Y.
        pub y: i32,
        /// Z.
        pub z: i32,
    }

    /// Attack or interact with an entity.
    pub struct UseEntity {
        /// The acting player's id.
        pub user: i32,
        /// Target entity id.
        pub target: i32,
        /// Left click when true.
        pub left_click: bool,
    }

    /// Local player health.
    pub struct UpdateHealth {
        /// Health in half hearts (0 means dead).
        pub health: i16,
        /// Food level.
        pub food: i16,
        /// Food saturation.
        pub saturation: f32,
    }

    /// Respawn or dimension change.
    pub struct Respawn {
        /// Dimension (-1, 0, 1).
        pub dimension: i32,
        /// Difficulty.
        pub difficulty: i8,
        /// Game mode.
        pub game_mode: i8,
        /// World height.
        pub world_height: i16,
        /// World generator name.
        pub level_type: String,
    }

    /// On-ground flag only.
    pub struct Player {
        /// Whether the player is on the ground.
        pub on_ground: bool,
    }

    /// Position only.
    pub struct PlayerPosition {
        /// X.
        pub x: f64,
        /// Feet Y.
        pub y: f64,
        /// Eye height (feet + 1.62).
        pub stance: f64,
        /// Z.
        pub z: f64,
        /// Whether the player is on the ground.
        pub on_ground: bool,
    }

    /// Look only.
    pub struct PlayerLook {
        /// Yaw in degrees.
        pub yaw: f32,
        /// Pitch in degrees.
        pub pitch: f32,
        /// Whether the player is on the ground.
        pub on_ground: bool,
    }

    /// Client position and look. Feet `y` precedes `stance`.
    pub struct PositionAndLook {
        /// X.
        pub x: f64,
        /// Feet Y.
        pub y: f64,
        /// Eye height (feet + 1.62).
        pub stance: f64,
        /// Z.
        pub z: f64,
        /// Yaw in degrees.
        pub yaw: f32,
        /// Pitch in degrees.
        pub pitch: f32,
        /// Whether the player is on the ground.
        pub on_ground: bool,
    }

    /// Server position correction. `stance` precedes feet `y`.
    pub struct ServerPositionAndLook {
        /// X.
        pub x: f64,
        /// Eye height.
        pub stance: f64,
        /// Feet Y.
        pub y: f64,
        /// Z.
        pub z: f64,
        /// Yaw in degrees.
        pub yaw: f32,
        /// Pitch in degrees.
        pub pitch: f32,
        /// Whether the player is on the ground.
        pub on_ground: bool,
    }

    /// Dig progress.
    pub struct PlayerDigging {
        /// 0 started, 1 cancelled, 2 finished, 3/4 drop item, 5 shoot/eat.
        pub status: i8,
        /// Block X.
        pub x: i32,
        /// Block Y.
        pub y: u8,
        /// Block Z.
        pub z: i32,
        /// Face (0 -Y, 1 +Y, 2 -Z, 3 +Z, 4 -X, 5 +X).
        pub face: i8,
    }

    /// Use the held item against a block face.
    pub struct PlayerBlockPlacement {
        /// Block X.
        pub x: i32,
        /// Block Y.
        pub y: u8,
        /// Block Z.
        pub z: i32,
        /// Face, or -1 for "use item".
        pub direction: i8,
        /// Held item.
        pub held_item: Slot,
        /// Cursor X on the face (0..16).
        pub cursor_x: i8,
        /// Cursor Y on the face.
        pub cursor_y: i8,
        /// Cursor Z on the face.
        pub cursor_z: i8,
    }

    /// Hotbar selection.
    pub struct HeldItemChange {
        /// Hotbar slot 0..9.
        pub slot: i16,
    }

    /// A player entered a bed.
    pub struct UseBed {
        /// Entity id.
        pub entity_id: i32,
        /// Unknown, always 0.
        pub unknown: i8,
        /// Bed X.
        pub x: i32,
        /// Bed Y.
        pub y: u8,
        /// Bed Z.
        pub z: i32,
    }

    /// Swing arm, take damage and similar.
    pub struct Animation {
        /// Entity id.
        pub entity_id: i32,
        /// Animation id.
        pub animation: i8,
    }

    /// Crouch, sprint, leave bed.
    pub struct EntityAction {
        /// Entity id.
        pub entity_id: i32,
        /// Action id.
        pub action: i8,
    }

    /// Another player came into view.
    pub struct SpawnNamedEntity {
        /// Entity id.
        pub entity_id: i32,
        /// Player name.
        pub name: String,
        /// Fixed-point X.
        pub x: i32,
        /// Fixed-point Y.
        pub y: i32,
        /// Fixed-point Z.
        pub z: i32,
        /// Packed yaw.
        pub yaw: i8,
        /// Packed pitch.
        pub pitch: i8,
        /// Held item id.
        pub current_item: i16,
        /// Initial metadata.
        pub metadata: EntityMetadata,
    }

    /// An item or XP orb was picked up.
    pub struct CollectItem {
        /// Collected entity id.
        pub collected: i32,
        /// Collector entity id.
        pub collector: i32,
    }

    /// Vehicle, projectile, dropped item and other non-living entities.
    pub struct SpawnObject {
        /// Entity id.
        pub entity_id: i32,
        /// Object type.
        pub kind: i8,
        /// Fixed-point X.
        pub x: i32,
        /// Fixed-point Y.
        pub y: i32,
        /// Fixed-point Z.
        pub z: i32,
        /// Packed pitch.
        pub pitch: i8,
        /// Packed yaw.
        pub yaw: i8,
        /// Trailing object data.
        pub data: ObjectData,
    }

    /// Living entity came into view.
    pub struct SpawnMob {
        /// Entity id.
        pub entity_id: i32,
        /// Mob type.
        pub kind: u8,
        /// Fixed-point X.
        pub x: i32,
        /// Fixed-point Y.
        pub y: i32,
        /// Fixed-point Z.
        pub z: i32,
        /// Packed pitch.
        pub pitch: i8,
        /// Packed head pitch.
        pub head_pitch: i8,
        /// Packed yaw.
        pub yaw: i8,
        /// Velocity X.
        pub velocity_x: i16,
        /// Velocity Y.
        pub velocity_y: i16,
        /// Velocity Z.
        pub velocity_z: i16,
        /// Initial metadata.
        pub metadata: EntityMetadata,
    }

    /// Painting placed on a wall.
    pub struct SpawnPainting {
        /// Entity id.
        pub entity_id: i32,
        /// Painting title.
        pub title: String,
        /// Block X.
        pub x: i32,
        /// Block Y.
        pub y: i32,
        /// Block Z.
        pub z: i32,
        /// Facing.
        pub direction: i32,
    }

    /// Experience orb.
    pub struct SpawnExperienceOrb {
        /// Entity id.
        pub entity_id: i32,
        /// Fixed-point X.
        pub x: i32,
        /// Fixed-point Y.
        pub y: i32,
        /// Fixed-point Z.
        pub z: i32,
        /// Experience carried.
        pub count: i16,
    }

    /// Entity velocity.
    pub struct EntityVelocity {
        /// Entity id.
        pub entity_id: i32,
        /// Velocity X.
        pub velocity_x: i16,
        /// Velocity Y.
        pub velocity_y: i16,
        /// Velocity Z.
        pub velocity_z: i16,
    }

    /// Entities left view or died.
    pub struct DestroyEntity {
        /// Destroyed ids.
        pub entity_ids: Vec<i32> as CountU8,
    }

    /// Entity still exists, nothing changed.
    pub struct EntityIdle {
        /// Entity id.
        pub entity_id: i32,
    }

    /// Small relative move.
    pub struct EntityRelativeMove {
        /// Entity id.
        pub entity_id: i32,
        /// Fixed-point delta X.
        pub dx: i8,
        /// Fixed-point delta Y.
        pub dy: i8,
        /// Fixed-point delta Z.
        pub dz: i8,
    }

    /// Orientation change.
    pub struct EntityLook {
        /// Entity id.
        pub entity_id: i32,
        /// Packed yaw.
        pub yaw: i8,
        /// Packed pitch.
        pub pitch: i8,
    }

    /// Relative move plus orientation.
    pub struct EntityLookAndRelativeMove {
        /// Entity id.
        pub entity_id: i32,
        /// Fixed-point delta X.
        pub dx: i8,
        /// Fixed-point delta Y.
        pub dy: i8,
        /// Fixed-point delta Z.
        pub dz: i8,
        /// Packed yaw.
        pub yaw: i8,
        /// Packed pitch.
        pub pitch: i8,
    }

    /// Absolute move.
    pub struct EntityTeleport {
        /// Entity id.
        pub entity_id: i32,
        /// Fixed-point X.
        pub x: i32,
        /// Fixed-point Y.
        pub y: i32,
        /// Fixed-point Z.
        pub z: i32,
        /// Packed yaw.
        pub yaw: i8,
        /// Packed pitch.
        pub pitch: i8,
    }

    /// Head rotation.
    pub struct EntityHeadLook {
        /// Entity id.
        pub entity_id: i32,
        /// Packed head yaw.
        pub head_yaw: i8,
    }

    /// Hurt, death, taming and similar events.
    pub struct EntityStatus {
        /// Entity id.
        pub entity_id: i32,
        /// Status code (2 hurt, 3 dead, ...).
        pub status: i8,
    }

    /// Entity mounted a vehicle (`vehicle_id == -1` dismounts).
    pub struct AttachEntity {
        /// Rider id.
        pub entity_id: i32,
        /// Vehicle id.
        pub vehicle_id: i32,
    }

    /// Metadata update.
    pub struct EntityMetadataUpdate {
        /// Entity id.
        pub entity_id: i32,
        /// Changed entries.
        pub metadata: EntityMetadata,
    }

    /// Potion effect applied.
    pub struct EntityEffect {
        /// Entity id.
        pub entity_id: i32,
        /// Effect id.
        pub effect_id: i8,
        /// Amplifier.
        pub amplifier: i8,
        /// Duration in ticks.
        pub duration: i16,
    }

    /// Potion effect ended.
    pub struct RemoveEntityEffect {
        /// Entity id.
        pub entity_id: i32,
        /// Effect id.
        pub effect_id: i8,
    }

    /// Local player experience.
    pub struct SetExperience {
        /// Bar progress 0..1.
        pub bar: f32,
        /// Level.
        pub level: i16,
        /// Total experience.
        pub total: i16,
    }

    /// One chunk column (zlib compressed section arrays).
    pub struct ChunkData {
        /// Chunk X.
        pub x: i32,
        /// Chunk Z.
        pub z: i32,
        /// Whole column including biomes; with an empty bitmap it unloads.
        pub ground_up: bool,
        /// Bitmap of sections present.
        pub primary_bitmap: u16,
        /// Bitmap of sections carrying the high id nibble.
        pub add_bitmap: u16,
        /// Compressed payload.
        pub data: Vec<u8> as BytesI32,
    }

    /// Single block change.
    pub struct BlockChange {
        /// Block X.
        pub x: i32,
        /// Block Y.
        pub y: u8,
        /// Block Z.
        pub z: i32,
        /// New block id.
        pub block_id: i16,
        /// New metadata.
        pub metadata: i8,
    }

    /// Note block, piston and chest animations.
    pub struct BlockAction {
        /// Block X.
        pub x: i32,
        /// Block Y.
        pub y: i16,
        /// Block Z.
        pub z: i32,
        /// First action byte.
        pub byte1: i8,
        /// Second action byte.
        pub byte2: i8,
        /// Block id.
        pub block_id: i16,
    }

    /// Crack overlay on a block.
    pub struct BlockBreakAnimation {
        /// Breaking entity id.
        pub entity_id: i32,
        /// Block X.
        pub x: i32,
        /// Block Y.
        pub y: i32,
        /// Block Z.
        pub z: i32,
        /// Stage 0..9.
        pub stage: i8,
    }

    /// Explosion and the blocks it removed.
    pub struct Explosion {
        /// Centre X.
        pub x: f64,
        /// Centre Y.
        pub y: f64,
        /// Centre Z.
        pub z: f64,
        /// Radius.
        pub radius: f32,
        /// Destroyed blocks relative to the centre.
        pub records: Vec<ExplosionRecord> as CountI32,
        /// Knockback X applied to the local player.
        pub motion_x: f32,
        /// Knockback Y.
        pub motion_y: f32,
        /// Knockback Z.
        pub motion_z: f32,
    }

    /// Sound or particle effect at a block.
    pub struct SoundOrParticleEffect {
        /// Effect id.
        pub effect_id: i32,
        /// Block X.
        pub x: i32,
        /// Block Y.
        pub y: u8,
        /// Block Z.
        pub z: i32,
        /// Effect data.
        pub data: i32,
        /// Play at full volume everywhere.
        pub disable_relative_volume: bool,
    }

    /// Named sound at a position.
    pub struct NamedSoundEffect {
        /// Sound name.
        pub name: String,
        /// X times 8.
        pub x: i32,
        /// Y times 8.
        pub y: i32,
        /// Z times 8.
        pub z: i32,
        /// Volume.
        pub volume: f32,
        /// Pitch (63 is normal).
        pub pitch: u8,
    }

    /// Particle burst.
    pub struct Particle {
        /// Particle name.
        pub name: String,
        /// X.
        pub x: f32,
        /// Y.
        pub y: f32,
        /// Z.
        pub z: f32,
        /// Spread X.
        pub offset_x: f32,
        /// Spread Y.
        pub offset_y: f32,
        /// Spread Z.
        pub offset_z: f32,
        /// Speed.
        pub speed: f32,
        /// Particle count.
        pub count: i32,
    }

    /// Rain, game mode change, credits.
    pub struct ChangeGameState {
        /// Reason code.
        pub reason: i8,
        /// Game mode when reason is 3.
        pub game_mode: i8,
    }

    /// Lightning bolt.
    pub struct SpawnGlobalEntity {
        /// Entity id.
        pub entity_id: i32,
        /// Type (1 = thunderbolt).
        pub kind: i8,
        /// Fixed-point X.
        pub x: i32,
        /// Fixed-point Y.
        pub y: i32,
        /// Fixed-point Z.
        pub z: i32,
    }

    /// Container opened.
    pub struct OpenWindow {
        /// Window id.
        pub window_id: i8,
        /// Inventory type.
        pub inventory_type: i8,
        /// Title.
        pub title: String,
        /// Slot count.
        pub slots: i8,
        /// Use the title verbatim.
        pub use_title: bool,
    }

    /// Container closed.
    pub struct CloseWindow {
        /// Window id.
        pub window_id: i8,
    }

    /// Click in a container.
    pub struct ClickWindow {
        /// Window id.
        pub window_id: i8,
        /// Slot index.
        pub slot: i16,
        /// Mouse button.
        pub button: i8,
        /// Action number for confirmation.
        pub action_number: i16,
        /// Click mode.
        pub mode: i8,
        /// Clicked item.
        pub item: Slot,
    }

    /// One slot changed.
    pub struct SetSlot {
        /// Window id.
        pub window_id: i8,
        /// Slot index.
        pub slot: i16,
        /// New contents.
        pub item: Slot,
    }

    /// Whole container contents.
    pub struct WindowItems {
        /// Window id.
        pub window_id: i8,
        /// Every slot.
        pub items: Vec<Slot> as CountI16,
    }

    /// Furnace progress and similar.
    pub struct UpdateWindowProperty {
        /// Window id.
        pub window_id: i8,
        /// Property index.
        pub property: i16,
        /// Value.
        pub value: i16,
    }

    /// Inventory transaction acknowledgement.
    pub struct ConfirmTransaction {
        /// Window id.
        pub window_id: i8,
        /// Action number.
        pub action_number: i16,
        /// Accepted flag.
        pub accepted: bool,
    }

    /// Creative inventory edit.
    pub struct CreativeInventoryAction {
        /// Slot index.
        pub slot: i16,
        /// Item.
        pub item: Slot,
    }

    /// Enchantment table choice.
    pub struct EnchantItem {
        /// Window id.
        pub window_id: i8,
        /// Enchantment slot.
        pub enchantment: i8,
    }

    /// Sign text.
    pub struct UpdateSign {
        /// Block X.
        pub x: i32,
        /// Block Y.
        pub y: i16,
        /// Block Z.
        pub z: i32,
        /// Line 1.
        pub line1: String,
        /// Line 2.
        pub line2: String,
        /// Line 3.
        pub line3: String,
        /// Line 4.
        pub line4: String,
    }

    /// Map item pixels.
    pub struct ItemData {
        /// Item type.
        pub item_type: i16,
        /// Item id.
        pub item_id: i16,
        /// Raw data.
        pub data: Vec<u8> as BytesI16,
    }

    /// Tile entity NBT (mob spawners, skulls, beacons).
    pub struct UpdateTileEntity {
        /// Block X.
        pub x: i32,
        /// Block Y.
        pub y: i16,
        /// Block Z.
        pub z: i32,
        /// Action id.
        pub action: i8,
        /// Gzipped NBT blob.
        pub nbt: Vec<u8> as BytesI16,
    }

    /// Statistic increment.
    pub struct IncrementStatistic {
        /// Statistic id.
        pub statistic_id: i32,
        /// Amount.
        pub amount: i8,
    }

    /// Tab list entry.
    pub struct PlayerListItem {
        /// Player name.
        pub name: String,
        /// Online flag.
        pub online: bool,
        /// Ping in milliseconds.
        pub ping: i16,
    }

    /// Flying and speed abilities.
    pub struct PlayerAbilities {
        /// Ability bit flags.
        pub flags: i8,
        /// Flying speed.
        pub flying_speed: i8,
        /// Walking speed.
        pub walking_speed: i8,
    }

    /// Tab completion request or reply.
    pub struct TabComplete {
        /// Text to complete, or NUL separated matches.
        pub text: String,
    }

    /// Locale and view settings.
    pub struct ClientSettings {
        /// Locale such as `en_US`.
        pub locale: String,
        /// View distance (0 far .. 3 tiny).
        pub view_distance: i8,
        /// Chat flags.
        pub chat_flags: i8,
        /// Difficulty.
        pub difficulty: i8,
        /// Render the cape.
        pub show_cape: bool,
    }

    /// Login complete (0) or respawn request (1).
    pub struct ClientStatuses {
        /// Status payload.
        pub payload: i8,
    }

    /// Scoreboard objective created or removed.
    pub struct ScoreboardObjective {
        /// Objective name.
        pub name: String,
        /// Display text.
        pub value: String,
        /// 0 create, 1 remove, 2 update.
        pub mode: i8,
    }

    /// Which objective shows where.
    pub struct DisplayScoreboard {
        /// Position (0 list, 1 sidebar, 2 below name).
        pub position: i8,
        /// Objective name.
        pub name: String,
    }

    /// Plugin channel payload.
    pub struct PluginMessage {
        /// Channel name.
        pub channel: String,
        /// Raw data.
        pub data: Vec<u8> as BytesI16,
    }

    /// Encryption reply. The client sends both arrays empty.
    pub struct EncryptionKeyResponse {
        /// Encrypted shared secret.
        pub shared_secret: Vec<u8> as BytesI16,
        /// Encrypted verify token.
        pub verify_token: Vec<u8> as BytesI16,
    }

    /// Server answer to the handshake.
    pub struct EncryptionKeyRequest {
        /// Server id (`-` for offline mode).
        pub server_id: String,
        /// DER public key.
        pub public_key: Vec<u8> as BytesI16,
        /// Verify token.
        pub verify_token: Vec<u8> as BytesI16,
    }

    /// Server list ping.
    pub struct ServerListPing {
        /// Always 1.
        pub magic: i8,
    }

    /// Kick (clientbound) or quit (serverbound).
    pub struct Disconnect {
        /// Reason text.
        pub reason: String,
    }
}

/// Batched block changes in one chunk column.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiBlockChange {
    /// Chunk X.
    pub chunk_x: i32,
    /// Chunk Z.
    pub chunk_z: i32,
    /// Packed change records.
    pub records: Vec<BlockRecord>,
}

impl Wire for MultiBlockChange {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
        let chunk_x = r.i32()?;
        let chunk_z = r.i32()?;
        let count = checked_len(r.i16()? as i32)?;
        let size = r.i32()?;
        let expected = count as i64 * 4;
        if size as i64 != expected {
            return Err(CodecError::LengthMismatch {
                declared: size,
                expected,
            }
            .into());
        }
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(BlockRecord::read(r)?);
        }
        Ok(Self {
            chunk_x,
            chunk_z,
            records,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.put_i32(self.chunk_x);
        out.put_i32(self.chunk_z);
        out.put_i16(self.records.len() as i16);
        out.put_i32(self.records.len() as i32 * 4);
        self.records.iter().for_each(|record| record.write(out));
    }
}

/// Several chunk columns sharing one compressed payload.
///
/// The column count is sent first but the column headers trail the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkBulk {
    /// Whether sky light arrays are present.
    pub sky_light: bool,
    /// Compressed payload for every column, concatenated before compression.
    pub data: Vec<u8>,
    /// Column headers in payload order.
    pub columns: Vec<ChunkMeta>,
}

impl Wire for ChunkBulk {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
        let count = checked_len(r.i16()? as i32)?;
        let len = checked_len(r.i32()?)?;
        let sky_light = bool::read(r)?;
        let data = r.bytes(len)?;
        let mut columns = Vec::with_capacity(count);
        for _ in 0..count {
            columns.push(ChunkMeta::read(r)?);
        }
        Ok(Self {
            sky_light,
            data,
            columns,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.put_i16(self.columns.len() as i16);
        out.put_i32(self.data.len() as i32);
        self.sky_light.write(out);
        out.put_slice(&self.data);
        self.columns.iter().for_each(|column| column.write(out));
    }
}

/// Score change. Removal carries only the item name.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateScore {
    /// Create or update a score.
    Set {
        /// Score holder.
        item_name: String,
        /// Objective name.
        score_name: String,
        /// New value.
        value: i32,
    },
    /// Remove a score holder.
    Remove {
        /// Score holder.
        item_name: String,
    },
}

impl Wire for UpdateScore {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
        let item_name = String::read(r)?;
        if r.i8()? == 1 {
            return Ok(UpdateScore::Remove { item_name });
        }
        Ok(UpdateScore::Set {
            item_name,
            score_name: String::read(r)?,
            value: r.i32()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        match self {
            UpdateScore::Set {
                item_name,
                score_name,
                value,
            } => {
                item_name.write(out);
                out.put_i8(0);
                score_name.write(out);
                out.put_i32(*value);
            }
            UpdateScore::Remove { item_name } => {
                item_name.write(out);
                out.put_i8(1);
            }
        }
    }
}

/// Display settings carried by team create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamInfo {
    /// Display name.
    pub display_name: String,
    /// Name prefix.
    pub prefix: String,
    /// Name suffix.
    pub suffix: String,
    /// Friendly fire flags.
    pub friendly_fire: i8,
}

/// Scoreboard team change. Which blocks follow depends on `mode`:
/// 0 create (info + players), 1 remove, 2 update (info), 3 add players,
/// 4 remove players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teams {
    /// Team name.
    pub name: String,
    /// Mode byte.
    pub mode: i8,
    /// Present for modes 0 and 2.
    pub info: Option<TeamInfo>,
    /// Present for modes 0, 3 and 4.
    pub players: Option<Vec<String>>,
}

impl Wire for Teams {
    fn read(r: &mut Reader<'_>) -> Result<Self, Fault> {
        let name = String::read(r)?;
        let mode = r.i8()?;
        let info = if matches!(mode, 0 | 2) {
            Some(TeamInfo {
                display_name: String::read(r)?,
                prefix: String::read(r)?,
                suffix: String::read(r)?,
                friendly_fire: r.i8()?,
            })
        } else {
            None
        };
        let players = if matches!(mode, 0 | 3 | 4) {
            let count = checked_len(r.i16()? as i32)?;
            let mut players = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                players.push(String::read(r)?);
            }
            Some(players)
        } else {
            None
        };
        Ok(Self {
            name,
            mode,
            info,
            players,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        self.name.write(out);
        out.put_i8(self.mode);
        if matches!(self.mode, 0 | 2) {
            let info = self.info.clone().unwrap_or(TeamInfo {
                display_name: String::new(),
                prefix: String::new(),
                suffix: String::new(),
                friendly_fire: 0,
            });
            info.display_name.write(out);
            info.prefix.write(out);
            info.suffix.write(out);
            out.put_i8(info.friendly_fire);
        }
        if matches!(self.mode, 0 | 3 | 4) {
            let players = self.players.as_deref().unwrap_or_default();
            out.put_i16(players.len() as i16);
            players.iter().for_each(|player| player.write(out));
        }
    }
}

macro_rules! packets {
    ($( $id:literal => $variant:ident($ty:ident), $bound:ident; )*) => {
        /// Every packet of the protocol, one variant per id and direction.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Packet {
            $(
                #[allow(missing_docs)]
                $variant($ty),
            )*
        }

        impl Packet {
            /// Leading id byte.
            pub fn id(&self) -> u8 {
                match self {
                    $( Packet::$variant(_) => $id, )*
                }
            }

            /// Variant name for logs and errors.
            pub fn name(&self) -> &'static str {
                match self {
                    $( Packet::$variant(_) => stringify!($variant), )*
                }
            }

            /// Whether this packet may travel in `direction`.
            pub fn travels(&self, direction: Direction) -> bool {
                match self {
                    $( Packet::$variant(_) => Bound::$bound.allows(direction), )*
                }
            }

            pub(crate) fn write_body(&self, out: &mut Vec<u8>) {
                match self {
                    $( Packet::$variant(body) => body.write(out), )*
                }
            }

            pub(crate) fn read_body(
                id: u8,
                direction: Direction,
                r: &mut Reader<'_>,
            ) -> Result<Self, Fault> {
                match id {
                    $(
                        $id if Bound::$bound.allows(direction) => {
                            Ok(Packet::$variant(<$ty as Wire>::read(r)?))
                        }
                    )*
                    _ => Err(CodecError::UnknownPacket { id, direction }.into()),
                }
            }
        }

        $(
            impl From<$ty> for Packet {
                fn from(body: $ty) -> Self {
                    Packet::$variant(body)
                }
            }
        )*
    };
}

packets! {
    0x00 => KeepAlive(KeepAlive), Both;
    0x01 => LoginRequest(LoginRequest), Clientbound;
    0x02 => Handshake(Handshake), Serverbound;
    0x03 => ChatMessage(ChatMessage), Both;
    0x04 => TimeUpdate(TimeUpdate), Clientbound;
    0x05 => EntityEquipment(EntityEquipment), Clientbound;
    0x06 => SpawnPosition(SpawnPosition), Clientbound;
    0x07 => UseEntity(UseEntity), Serverbound;
    0x08 => UpdateHealth(UpdateHealth), Clientbound;
    0x09 => Respawn(Respawn), Both;
    0x0A => Player(Player), Serverbound;
    0x0B => PlayerPosition(PlayerPosition), Serverbound;
    0x0C => PlayerLook(PlayerLook), Serverbound;
    0x0D => PositionAndLook(PositionAndLook), Serverbound;
    0x0D => ServerPositionAndLook(ServerPositionAndLook), Clientbound;
    0x0E => PlayerDigging(PlayerDigging), Serverbound;
    0x0F => PlayerBlockPlacement(PlayerBlockPlacement), Serverbound;
    0x10 => HeldItemChange(HeldItemChange), Both;
    0x11 => UseBed(UseBed), Clientbound;
    0x12 => Animation(Animation), Both;
    0x13 => EntityAction(EntityAction), Serverbound;
    0x14 => SpawnNamedEntity(SpawnNamedEntity), Clientbound;
    0x16 => CollectItem(CollectItem), Clientbound;
    0x17 => SpawnObject(SpawnObject), Clientbound;
    0x18 => SpawnMob(SpawnMob), Clientbound;
    0x19 => SpawnPainting(SpawnPainting), Clientbound;
    0x1A => SpawnExperienceOrb(SpawnExperienceOrb), Clientbound;
    0x1C => EntityVelocity(EntityVelocity), Clientbound;
    0x1D => DestroyEntity(DestroyEntity), Clientbound;
    0x1E => EntityIdle(EntityIdle), Clientbound;
    0x1F => EntityRelativeMove(EntityRelativeMove), Clientbound;
    0x20 => EntityLook(EntityLook), Clientbound;
    0x21 => EntityLookAndRelativeMove(EntityLookAndRelativeMove), Clientbound;
    0x22 => EntityTeleport(EntityTeleport), Clientbound;
    0x23 => EntityHeadLook(EntityHeadLook), Clientbound;
    0x26 => EntityStatus(EntityStatus), Clientbound;
    0x27 => AttachEntity(AttachEntity), Clientbound;
    0x28 => EntityMetadataUpdate(EntityMetadataUpdate), Clientbound;
    0x29 => EntityEffect(EntityEffect), Clientbound;
    0x2A => RemoveEntityEffect(RemoveEntityEffect), Clientbound;
    0x2B => SetExperience(SetExperience), Clientbound;
    0x33 => ChunkData(ChunkData), Clientbound;
    0x34 => MultiBlockChange(MultiBlockChange), Clientbound;
    0x35 => BlockChange(BlockChange), Clientbound;
    0x36 => BlockAction(BlockAction), Clientbound;
    0x37 => BlockBreakAnimation(BlockBreakAnimation), Clientbound;
    0x38 => ChunkBulk(ChunkBulk), Clientbound;
    0x3C => Explosion(Explosion), Clientbound;
    0x3D => SoundOrParticleEffect(SoundOrParticleEffect), Clientbound;
    0x3E => NamedSoundEffect(NamedSoundEffect), Clientbound;
    0x3F => Particle(Particle), Clientbound;
    0x46 => ChangeGameState(ChangeGameState), Clientbound;
    0x47 => SpawnGlobalEntity(SpawnGlobalEntity), Clientbound;
    0x64 => OpenWindow(OpenWindow), Clientbound;
    0x65 => CloseWindow(CloseWindow), Both;
    0x66 => ClickWindow(ClickWindow), Serverbound;
    0x67 => SetSlot(SetSlot), Clientbound;
    0x68 => WindowItems(WindowItems), Clientbound;
    0x69 => UpdateWindowProperty(UpdateWindowProperty), Clientbound;
    0x6A => ConfirmTransaction(ConfirmTransaction), Both;
    0x6B => CreativeInventoryAction(CreativeInventoryAction), Both;
    0x6C => EnchantItem(EnchantItem), Serverbound;
    0x82 => UpdateSign(UpdateSign), Both;
    0x83 => ItemData(ItemData), Clientbound;
    0x84 => UpdateTileEntity(UpdateTileEntity), Clientbound;
    0xC8 => IncrementStatistic(IncrementStatistic), Clientbound;
    0xC9 => PlayerListItem(PlayerListItem), Clientbound;
    0xCA => PlayerAbilities(PlayerAbilities), Both;
    0xCB => TabComplete(TabComplete), Both;
    0xCC => ClientSettings(ClientSettings), Serverbound;
    0xCD => ClientStatuses(ClientStatuses), Serverbound;
    0xCE => ScoreboardObjective(ScoreboardObjective), Clientbound;
    0xCF => UpdateScore(UpdateScore), Clientbound;
    0xD0 => DisplayScoreboard(DisplayScoreboard), Clientbound;
    0xD1 => Teams(Teams), Clientbound;
    0xFA => PluginMessage(PluginMessage), Both;
    0xFC => EncryptionKeyResponse(EncryptionKeyResponse), Both;
    0xFD => EncryptionKeyRequest(EncryptionKeyRequest), Clientbound;
    0xFE => ServerListPing(ServerListPing), Serverbound;
    0xFF => Disconnect(Disconnect), Both;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_and_look_shares_id_across_directions() {
        let client = Packet::from(PositionAndLook {
            x: 0.5,
            y: 64.0,
            stance: 65.62,
            z: 0.5,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: true,
        });
        let server = Packet::from(ServerPositionAndLook {
            x: 0.5,
            stance: 65.62,
            y: 64.0,
            z: 0.5,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: true,
        });
        assert_eq!(client.id(), server.id());
        assert!(client.travels(Direction::Serverbound));
        assert!(!client.travels(Direction::Clientbound));
        assert!(server.travels(Direction::Clientbound));
        assert!(!server.travels(Direction::Serverbound));
    }

    #[test]
    fn keep_alive_travels_both_ways() {
        let packet = Packet::from(KeepAlive { id: 7 });
        assert!(packet.travels(Direction::Serverbound));
        assert!(packet.travels(Direction::Clientbound));
        assert_eq!(packet.name(), "KeepAlive");
    }

    #[test]
    fn team_removal_has_no_trailing_blocks() {
        let teams = Teams {
            name: "red".into(),
            mode: 1,
            info: None,
            players: None,
        };
        let mut out = Vec::new();
        teams.write(&mut out);
        assert_eq!(out.len(), 2 + 6 + 1);
    }
}
