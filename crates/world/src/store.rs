//! The per-session world: chunk columns, entities and the local player.
//!
//! Only the session's network task mutates a [`World`]; the UI reads it
//! between updates. Every read here is pure.

use std::collections::HashMap;

use asciicraft_core::{BlockPos, ChunkPos, DimensionId};
use asciicraft_net::protocol::{ChunkBulk, ChunkData, Explosion, MultiBlockChange};
use glam::DVec3;
use tracing::{debug, trace, warn};

use crate::chunk::{BlockState, Chunk};
use crate::entity::{Entity, EntityId, EntityKind, EntityUpdate, EQUIPMENT_SLOTS};
use crate::error::WorldError;
use crate::payload::{decompress, parse_bulk, parse_single, ColumnData, ColumnLayout};

/// Player eye height above the feet, used for the stance field.
pub const PLAYER_EYE_HEIGHT: f64 = 1.62;

/// Counters for updates the store could not apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Block changes that targeted a chunk we do not have.
    pub dropped_block_changes: u64,
    /// Entity updates that arrived before any spawn.
    pub implicit_spawns: u64,
    /// Destroy requests for ids we were not tracking.
    pub unknown_despawns: u64,
}

/// World clock from the last time update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldTime {
    pub age: i64,
    pub time_of_day: i64,
}

/// What the server has told us about ourselves.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPlayer {
    pub entity_id: Option<EntityId>,
    /// Feet position; `None` until the first server position.
    pub position: Option<DVec3>,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
    pub health: f32,
    pub food: i16,
    pub saturation: f32,
    pub game_mode: i8,
    pub spawn: Option<BlockPos>,
    /// Server position packets applied so far. Local predictions older than
    /// the latest one are stale.
    pub corrections: u64,
}

impl Default for LocalPlayer {
    fn default() -> Self {
        Self {
            entity_id: None,
            position: None,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: true,
            health: 20.0,
            food: 20,
            saturation: 5.0,
            game_mode: 0,
            spawn: None,
            corrections: 0,
        }
    }
}

impl LocalPlayer {
    /// Voxel containing the feet.
    pub fn block_pos(&self) -> Option<BlockPos> {
        self.position.map(BlockPos::containing)
    }

    /// Eye-level y sent as the stance field.
    pub fn stance(&self) -> Option<f64> {
        self.position.map(|p| p.y + PLAYER_EYE_HEIGHT)
    }
}

/// Sole mutable truth for one session's view of the world.
#[derive(Debug, Clone, Default)]
pub struct World {
    dimension: DimensionId,
    chunks: HashMap<ChunkPos, Chunk>,
    entities: HashMap<EntityId, Entity>,
    player: LocalPlayer,
    time: WorldTime,
    stats: WorldStats,
}

impl World {
    pub fn new(dimension: DimensionId) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    #[inline]
    pub fn dimension(&self) -> DimensionId {
        self.dimension
    }

    #[inline]
    pub fn player(&self) -> &LocalPlayer {
        &self.player
    }

    #[inline]
    pub fn player_mut(&mut self) -> &mut LocalPlayer {
        &mut self.player
    }

    #[inline]
    pub fn stats(&self) -> WorldStats {
        self.stats
    }

    #[inline]
    pub fn time(&self) -> WorldTime {
        self.time
    }

    pub fn set_time(&mut self, age: i64, time_of_day: i64) {
        self.time = WorldTime { age, time_of_day };
    }

    /// Drop all chunks and entities, e.g. on respawn into another dimension.
    /// The local player's identity and stats survive.
    pub fn reset(&mut self, dimension: DimensionId) {
        debug!(dimension = dimension.as_str(), "world reset");
        self.dimension = dimension;
        self.chunks.clear();
        self.entities.clear();
        self.player.position = None;
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Number of columns currently holding data.
    pub fn loaded_chunks(&self) -> usize {
        self.chunks.values().filter(|c| c.is_loaded()).count()
    }

    /// Apply a single-column chunk packet.
    ///
    /// A ground-up packet with an empty bitmap unloads the column. A
    /// ground-up packet otherwise replaces the whole column; a partial one
    /// replaces only the sections it carries.
    pub fn apply_chunk_data(&mut self, packet: &ChunkData) -> Result<(), WorldError> {
        let pos = ChunkPos::new(packet.x, packet.z);
        if packet.ground_up && packet.primary_bitmap == 0 {
            if let Some(chunk) = self.chunks.get_mut(&pos) {
                chunk.unload();
            }
            debug!(chunk = %pos, "chunk unloaded");
            return Ok(());
        }
        let layout = ColumnLayout {
            primary_bitmap: packet.primary_bitmap,
            add_bitmap: packet.add_bitmap,
            sky_light: self.dimension.has_sky_light(),
            ground_up: packet.ground_up,
        };
        let raw = decompress(&packet.data, layout.expected_len())?;
        let column = parse_single(&raw, pos, layout)?;
        self.install(column, packet.ground_up);
        trace!(chunk = %pos, bitmap = packet.primary_bitmap, "chunk data applied");
        Ok(())
    }

    /// Apply a multi-column chunk packet; every column is ground-up.
    pub fn apply_chunk_bulk(&mut self, packet: &ChunkBulk) -> Result<(), WorldError> {
        let limit = packet
            .columns
            .iter()
            .map(|meta| {
                ColumnLayout {
                    primary_bitmap: meta.primary_bitmap,
                    add_bitmap: meta.add_bitmap,
                    sky_light: packet.sky_light,
                    ground_up: true,
                }
                .expected_len()
            })
            .sum();
        let raw = decompress(&packet.data, limit)?;
        for column in parse_bulk(&raw, &packet.columns, packet.sky_light)? {
            self.install(column, true);
        }
        debug!(columns = packet.columns.len(), "chunk bulk applied");
        Ok(())
    }

    fn install(&mut self, column: ColumnData, ground_up: bool) {
        let chunk = self
            .chunks
            .entry(column.position)
            .or_insert_with(|| Chunk::new(column.position));
        if ground_up {
            chunk.reset();
        }
        for (index, section) in column.sections {
            chunk.replace_section(index, section);
        }
        if let Some(biomes) = column.biomes {
            chunk.set_biomes(biomes);
        }
    }

    /// Set one voxel. Returns false, with a counted warning, when its column
    /// is not loaded.
    pub fn apply_block_change(&mut self, pos: BlockPos, state: BlockState) -> bool {
        let (x, y, z) = pos.local();
        let applied = match self.chunks.get_mut(&pos.chunk()) {
            Some(chunk) if chunk.is_loaded() => chunk.set_block(x, y, z, state),
            _ => false,
        };
        if !applied {
            self.stats.dropped_block_changes += 1;
            warn!(
                block = %pos,
                dropped = self.stats.dropped_block_changes,
                "block change outside loaded chunks dropped"
            );
        }
        applied
    }

    /// Apply every record of a multi-block change.
    pub fn apply_multi_block_change(&mut self, packet: &MultiBlockChange) {
        let chunk = ChunkPos::new(packet.chunk_x, packet.chunk_z);
        for record in &packet.records {
            let pos = chunk.block(record.x() as usize, record.y() as i32, record.z() as usize);
            self.apply_block_change(pos, BlockState::new(record.block_id(), record.metadata()));
        }
    }

    /// Clear the blocks an explosion destroyed.
    pub fn apply_explosion(&mut self, packet: &Explosion) {
        // Record offsets are relative to the truncated centre.
        let centre = BlockPos::new(packet.x as i32, packet.y as i32, packet.z as i32);
        for record in &packet.records {
            let pos = centre.offset(record.dx as i32, record.dy as i32, record.dz as i32);
            self.apply_block_change(pos, BlockState::AIR);
        }
    }

    /// Block at `pos`; unloaded columns and out-of-range heights read as air.
    pub fn block_at(&self, pos: BlockPos) -> BlockState {
        let (x, y, z) = pos.local();
        self.chunks
            .get(&pos.chunk())
            .map(|chunk| chunk.block(x, y, z))
            .unwrap_or(BlockState::AIR)
    }

    /// Whether the column holding `pos` has data.
    pub fn is_loaded(&self, pos: BlockPos) -> bool {
        self.chunks
            .get(&pos.chunk())
            .is_some_and(Chunk::is_loaded)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Insert an entity, or update the live record in place when the id is
    /// already tracked.
    pub fn spawn_entity(&mut self, id: EntityId, kind: EntityKind, position: DVec3) -> &mut Entity {
        let entity = self
            .entities
            .entry(id)
            .and_modify(|existing| {
                debug!(entity = id, "duplicate spawn merged");
                existing.kind = kind.clone();
                existing.position = position;
            })
            .or_insert_with(|| Entity::new(id, kind, position));
        trace!(entity = id, kind = entity.kind.name(), "entity spawned");
        entity
    }

    /// Apply an update; an unknown id is spawned implicitly first.
    pub fn update_entity(&mut self, id: EntityId, update: EntityUpdate) {
        if !self.entities.contains_key(&id) {
            self.stats.implicit_spawns += 1;
            debug!(entity = id, "update for unknown entity, spawning implicitly");
            self.entities.insert(
                id,
                Entity::new(id, EntityKind::Unknown, update.implicit_position()),
            );
        }
        let moves = update.moves();
        let mut attach = None;
        if let Some(entity) = self.entities.get_mut(&id) {
            match update {
                EntityUpdate::Move(delta) => entity.position += delta,
                EntityUpdate::Look { yaw, pitch } => {
                    entity.yaw = yaw;
                    entity.pitch = pitch;
                }
                EntityUpdate::MoveLook { delta, yaw, pitch } => {
                    entity.position += delta;
                    entity.yaw = yaw;
                    entity.pitch = pitch;
                }
                EntityUpdate::Teleport {
                    position,
                    yaw,
                    pitch,
                } => {
                    entity.position = position;
                    entity.yaw = yaw;
                    entity.pitch = pitch;
                }
                EntityUpdate::HeadLook(yaw) => entity.head_yaw = yaw,
                EntityUpdate::Velocity(velocity) => entity.velocity = velocity,
                EntityUpdate::Equipment { slot, item } => {
                    if slot < EQUIPMENT_SLOTS {
                        entity.equipment[slot] = item;
                    }
                }
                EntityUpdate::Metadata(metadata) => entity.apply_metadata(&metadata),
                EntityUpdate::Attach { vehicle } => attach = Some(vehicle),
                EntityUpdate::Status(status) => entity.last_status = Some(status),
            }
        }
        if let Some(vehicle) = attach {
            self.attach(id, vehicle);
        }
        if moves {
            self.carry_passenger(id);
        }
    }

    fn attach(&mut self, id: EntityId, vehicle: Option<EntityId>) {
        let previous = self.entities.get_mut(&id).and_then(|e| {
            let old = e.vehicle;
            e.vehicle = vehicle;
            old
        });
        if let Some(old) = previous.and_then(|v| self.entities.get_mut(&v)) {
            if old.passenger == Some(id) {
                old.passenger = None;
            }
        }
        if let Some(vehicle) = vehicle.and_then(|v| self.entities.get_mut(&v)) {
            vehicle.passenger = Some(id);
        }
        if let Some(vehicle) = vehicle {
            self.carry_passenger(vehicle);
        }
    }

    /// Move the passenger chain of `id` onto its vehicle.
    fn carry_passenger(&mut self, mut id: EntityId) {
        // Bounded walk: a malformed attach loop must not spin forever.
        for _ in 0..self.entities.len() {
            let Some(vehicle) = self.entities.get(&id) else {
                return;
            };
            let (position, Some(passenger)) = (vehicle.position, vehicle.passenger) else {
                return;
            };
            match self.entities.get_mut(&passenger) {
                Some(rider) if rider.vehicle == Some(id) => rider.position = position,
                _ => return,
            }
            id = passenger;
        }
    }

    /// Remove an entity. Unknown ids are counted and ignored.
    pub fn despawn_entity(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.entities.remove(&id);
        match &removed {
            Some(entity) => {
                if let Some(rider) = entity.passenger.and_then(|p| self.entities.get_mut(&p)) {
                    rider.vehicle = None;
                }
                if let Some(vehicle) = entity.vehicle.and_then(|v| self.entities.get_mut(&v)) {
                    vehicle.passenger = None;
                }
                trace!(entity = id, "entity despawned");
            }
            None => {
                self.stats.unknown_despawns += 1;
                debug!(entity = id, "despawn for unknown entity");
            }
        }
        removed
    }

    /// Entities within `radius` blocks of the bottom centre of `center`,
    /// nearest first.
    pub fn entities_near(&self, center: BlockPos, radius: f64) -> Vec<&Entity> {
        let origin = center.bottom_center();
        let mut found: Vec<(f64, &Entity)> = self
            .entities
            .values()
            .map(|e| (e.position.distance(origin), e))
            .filter(|(d, _)| *d <= radius)
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.id.cmp(&b.1.id)));
        found.into_iter().map(|(_, e)| e).collect()
    }

    /// Entities whose feet voxel is `pos`.
    pub fn entities_at(&self, pos: BlockPos) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(move |e| e.block_pos() == pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{compress, encode_column};
    use asciicraft_net::{BlockRecord, ExplosionRecord};

    fn chunk_packet(chunk: &Chunk, ground_up: bool) -> ChunkData {
        let encoded = encode_column(chunk, true, ground_up);
        ChunkData {
            x: chunk.position().x,
            z: chunk.position().z,
            ground_up,
            primary_bitmap: encoded.primary_bitmap,
            add_bitmap: encoded.add_bitmap,
            data: compress(&encoded.data),
        }
    }

    fn world_with_floor() -> World {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        for x in 0..16 {
            for z in 0..16 {
                chunk.set_block(x, 4, z, BlockState::new(1, 0));
            }
        }
        let mut world = World::new(DimensionId::Overworld);
        world.apply_chunk_data(&chunk_packet(&chunk, true)).unwrap();
        world
    }

    #[test]
    fn chunk_data_populates_blocks() {
        let world = world_with_floor();
        assert_eq!(world.block_at(BlockPos::new(3, 4, 7)), BlockState::new(1, 0));
        assert!(world.block_at(BlockPos::new(3, 5, 7)).is_air());
        assert!(world.block_at(BlockPos::new(20, 4, 7)).is_air());
        assert_eq!(world.loaded_chunks(), 1);
    }

    #[test]
    fn partial_update_merges_sections() {
        let mut world = world_with_floor();
        let mut upper = Chunk::new(ChunkPos::new(0, 0));
        upper.set_block(1, 40, 1, BlockState::new(17, 0));
        world.apply_chunk_data(&chunk_packet(&upper, false)).unwrap();

        assert_eq!(world.block_at(BlockPos::new(1, 40, 1)), BlockState::new(17, 0));
        assert_eq!(world.block_at(BlockPos::new(1, 4, 1)), BlockState::new(1, 0));
    }

    #[test]
    fn ground_up_replaces_column() {
        let mut world = world_with_floor();
        let mut other = Chunk::new(ChunkPos::new(0, 0));
        other.set_block(1, 40, 1, BlockState::new(17, 0));
        world.apply_chunk_data(&chunk_packet(&other, true)).unwrap();
        assert!(world.block_at(BlockPos::new(1, 4, 1)).is_air());
    }

    #[test]
    fn empty_ground_up_unloads() {
        let mut world = world_with_floor();
        world
            .apply_chunk_data(&ChunkData {
                x: 0,
                z: 0,
                ground_up: true,
                primary_bitmap: 0,
                add_bitmap: 0,
                data: compress(&[0u8; 256]),
            })
            .unwrap();
        assert!(!world.is_loaded(BlockPos::new(0, 4, 0)));
        assert!(world.block_at(BlockPos::new(0, 4, 0)).is_air());
        assert!(world.chunk(ChunkPos::new(0, 0)).is_some());
    }

    #[test]
    fn mismatched_payload_is_fatal() {
        let mut world = World::new(DimensionId::Overworld);
        let err = world
            .apply_chunk_data(&ChunkData {
                x: 0,
                z: 0,
                ground_up: false,
                primary_bitmap: 1,
                add_bitmap: 0,
                data: compress(&[0u8; 64]),
            })
            .unwrap_err();
        assert!(matches!(err, WorldError::PayloadSize { .. }));
    }

    #[test]
    fn nether_payload_has_no_sky_light() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set_block(0, 0, 0, BlockState::new(87, 0));
        let encoded = encode_column(&chunk, false, true);
        let mut world = World::new(DimensionId::Nether);
        world
            .apply_chunk_data(&ChunkData {
                x: 0,
                z: 0,
                ground_up: true,
                primary_bitmap: encoded.primary_bitmap,
                add_bitmap: 0,
                data: compress(&encoded.data),
            })
            .unwrap();
        assert_eq!(world.block_at(BlockPos::ORIGIN).id, 87);
    }

    #[test]
    fn block_change_on_unloaded_chunk_is_counted() {
        let mut world = World::new(DimensionId::Overworld);
        assert!(!world.apply_block_change(BlockPos::new(100, 10, 100), BlockState::new(1, 0)));
        assert_eq!(world.stats().dropped_block_changes, 1);
        assert!(world.block_at(BlockPos::new(100, 10, 100)).is_air());
    }

    #[test]
    fn block_change_handles_negative_coordinates() {
        let mut chunk = Chunk::new(ChunkPos::new(-1, -1));
        chunk.set_block(15, 0, 15, BlockState::new(1, 0));
        let mut world = World::new(DimensionId::Overworld);
        world.apply_chunk_data(&chunk_packet(&chunk, true)).unwrap();

        assert_eq!(world.block_at(BlockPos::new(-1, 0, -1)).id, 1);
        assert!(world.apply_block_change(BlockPos::new(-16, 70, -3), BlockState::new(4, 0)));
        assert_eq!(world.block_at(BlockPos::new(-16, 70, -3)).id, 4);
    }

    #[test]
    fn multi_block_change_applies_records() {
        let mut world = world_with_floor();
        world.apply_multi_block_change(&MultiBlockChange {
            chunk_x: 0,
            chunk_z: 0,
            records: vec![
                BlockRecord::new(1, 5, 2, 3, 0),
                BlockRecord::new(15, 200, 15, 35, 4),
            ],
        });
        assert_eq!(world.block_at(BlockPos::new(1, 5, 2)).id, 3);
        assert_eq!(world.block_at(BlockPos::new(15, 200, 15)), BlockState::new(35, 4));
    }

    #[test]
    fn explosion_offsets_use_truncated_centre() {
        let mut world = world_with_floor();
        world.apply_explosion(&Explosion {
            x: 2.9,
            y: 5.5,
            z: 2.1,
            radius: 3.0,
            records: vec![ExplosionRecord { dx: 0, dy: -1, dz: 0 }],
            motion_x: 0.0,
            motion_y: 0.0,
            motion_z: 0.0,
        });
        assert!(world.block_at(BlockPos::new(2, 4, 2)).is_air());
        assert!(!world.block_at(BlockPos::new(3, 4, 2)).is_air());
    }

    #[test]
    fn duplicate_spawn_updates_in_place() {
        let mut world = World::new(DimensionId::Overworld);
        world.spawn_entity(5, EntityKind::Mob(90), DVec3::new(1.0, 2.0, 3.0));
        world.spawn_entity(5, EntityKind::Mob(91), DVec3::new(4.0, 2.0, 3.0));
        assert_eq!(world.entity_count(), 1);
        let entity = world.entity(5).unwrap();
        assert_eq!(entity.kind, EntityKind::Mob(91));
        assert_eq!(entity.position.x, 4.0);
    }

    #[test]
    fn update_for_unknown_id_spawns_implicitly() {
        let mut world = World::new(DimensionId::Overworld);
        world.update_entity(
            9,
            EntityUpdate::Teleport {
                position: DVec3::new(8.0, 65.0, 8.0),
                yaw: 0.0,
                pitch: 0.0,
            },
        );
        assert_eq!(world.stats().implicit_spawns, 1);
        let entity = world.entity(9).unwrap();
        assert_eq!(entity.kind, EntityKind::Unknown);
        assert_eq!(entity.block_pos(), BlockPos::new(8, 65, 8));
    }

    #[test]
    fn relative_moves_accumulate() {
        let mut world = World::new(DimensionId::Overworld);
        world.spawn_entity(1, EntityKind::Mob(92), DVec3::new(0.5, 64.0, 0.5));
        world.update_entity(1, EntityUpdate::Move(DVec3::new(1.0, 0.0, 0.0)));
        world.update_entity(1, EntityUpdate::Move(DVec3::new(0.0, 1.0, -2.0)));
        assert_eq!(world.entity(1).unwrap().position, DVec3::new(1.5, 65.0, -1.5));
    }

    #[test]
    fn passengers_follow_their_vehicle() {
        let mut world = World::new(DimensionId::Overworld);
        world.spawn_entity(1, EntityKind::Object(10), DVec3::new(0.0, 64.0, 0.0));
        world.spawn_entity(2, EntityKind::Mob(90), DVec3::new(5.0, 64.0, 5.0));
        world.update_entity(2, EntityUpdate::Attach { vehicle: Some(1) });
        assert_eq!(world.entity(2).unwrap().position, DVec3::new(0.0, 64.0, 0.0));

        world.update_entity(1, EntityUpdate::Move(DVec3::new(3.0, 0.0, 0.0)));
        assert_eq!(world.entity(2).unwrap().position.x, 3.0);

        world.update_entity(2, EntityUpdate::Attach { vehicle: None });
        assert_eq!(world.entity(1).unwrap().passenger, None);
        world.update_entity(1, EntityUpdate::Move(DVec3::new(3.0, 0.0, 0.0)));
        assert_eq!(world.entity(2).unwrap().position.x, 3.0);
    }

    #[test]
    fn despawn_removes_and_counts_unknown() {
        let mut world = World::new(DimensionId::Overworld);
        world.spawn_entity(1, EntityKind::Mob(92), DVec3::ZERO);
        assert!(world.despawn_entity(1).is_some());
        assert!(world.entity(1).is_none());
        assert!(world.despawn_entity(1).is_none());
        assert_eq!(world.stats().unknown_despawns, 1);
    }

    #[test]
    fn entities_near_is_sorted_and_bounded() {
        let mut world = World::new(DimensionId::Overworld);
        world.spawn_entity(1, EntityKind::Mob(92), DVec3::new(3.5, 5.0, 0.5));
        world.spawn_entity(2, EntityKind::Mob(92), DVec3::new(1.5, 5.0, 0.5));
        world.spawn_entity(3, EntityKind::Mob(92), DVec3::new(10.5, 5.0, 0.5));
        let near: Vec<EntityId> = world
            .entities_near(BlockPos::new(0, 5, 0), 3.0)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(near, vec![2, 1]);
    }

    #[test]
    fn reset_clears_world_but_keeps_identity() {
        let mut world = world_with_floor();
        world.player_mut().entity_id = Some(42);
        world.player_mut().position = Some(DVec3::new(0.5, 5.0, 0.5));
        world.spawn_entity(1, EntityKind::Mob(92), DVec3::ZERO);
        world.reset(DimensionId::Nether);
        assert_eq!(world.dimension(), DimensionId::Nether);
        assert_eq!(world.loaded_chunks(), 0);
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.player().entity_id, Some(42));
        assert_eq!(world.player().position, None);
    }
}
