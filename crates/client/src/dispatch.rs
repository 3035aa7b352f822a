//! Routing of accepted inbound packets.
//!
//! Every packet the connection state machine lets through lands here and is
//! routed by variant to one world mutation, plus whatever the protocol
//! expects us to answer.

use asciicraft_core::{angle_to_degrees, fixed_to_vec, relative_to_vec, BlockPos, DimensionId};
use asciicraft_net::protocol::{
    ClientSettings, ClientStatuses, EncryptionKeyResponse, PositionAndLook, ServerPositionAndLook,
};
use asciicraft_net::{ItemStack, Packet};
use asciicraft_world::{BlockState, EntityKind, EntityUpdate, World};
use glam::DVec3;
use tracing::{debug, info, trace, warn};

use crate::error::SessionError;

/// Client status payload sent once login is acknowledged.
pub const STATUS_INITIAL_SPAWN: i8 = 0;
/// Client status payload asking to respawn after death.
pub const STATUS_RESPAWN: i8 = 1;

const VELOCITY_SCALE: f64 = 8000.0;

/// Settings announced after the spawn position arrives.
pub fn client_settings() -> ClientSettings {
    ClientSettings {
        locale: "en_US".to_string(),
        view_distance: 0,
        chat_flags: 8,
        difficulty: 2,
        show_cape: true,
    }
}

/// Serverbound echo of a position the server forced on us.
pub fn echo_position(correction: &ServerPositionAndLook) -> PositionAndLook {
    PositionAndLook {
        x: correction.x,
        y: correction.y,
        stance: correction.stance,
        z: correction.z,
        yaw: correction.yaw,
        pitch: correction.pitch,
        on_ground: correction.on_ground,
    }
}

fn velocity(x: i16, y: i16, z: i16) -> DVec3 {
    DVec3::new(x as f64, y as f64, z as f64) / VELOCITY_SCALE
}

fn dimension(wire: i32) -> DimensionId {
    DimensionId::from_wire(wire).unwrap_or_else(|| {
        warn!(dimension = wire, "unknown dimension, assuming overworld");
        DimensionId::Overworld
    })
}

/// Apply one accepted inbound packet to `world` and return the replies.
///
/// Errors are fatal to the session: a kick, a server that insists on
/// encryption, or a chunk payload that does not match its layout.
pub fn apply_inbound(world: &mut World, packet: Packet) -> Result<Vec<Packet>, SessionError> {
    let mut replies = Vec::new();
    match packet {
        Packet::EncryptionKeyRequest(request) => {
            debug!(server_id = %request.server_id, "key request, answering without encryption");
            replies.push(
                EncryptionKeyResponse {
                    shared_secret: Vec::new(),
                    verify_token: Vec::new(),
                }
                .into(),
            );
        }
        Packet::EncryptionKeyResponse(response) => {
            if !response.shared_secret.is_empty() || !response.verify_token.is_empty() {
                return Err(SessionError::EncryptionUnsupported);
            }
            replies.push(
                ClientStatuses {
                    payload: STATUS_INITIAL_SPAWN,
                }
                .into(),
            );
        }
        Packet::LoginRequest(login) => {
            info!(
                entity = login.entity_id,
                dimension = login.dimension,
                level = %login.level_type,
                "joined game"
            );
            world.reset(dimension(login.dimension as i32));
            let player = world.player_mut();
            player.entity_id = Some(login.entity_id);
            player.game_mode = login.game_mode;
        }
        Packet::Disconnect(disconnect) => return Err(SessionError::Kicked(disconnect.reason)),
        Packet::KeepAlive(keep_alive) => replies.push(keep_alive.into()),
        Packet::ChatMessage(chat) => info!(message = %chat.message, "chat"),
        Packet::TimeUpdate(time) => world.set_time(time.age, time.time),
        Packet::SpawnPosition(spawn) => {
            world.player_mut().spawn = Some(BlockPos::new(spawn.x, spawn.y, spawn.z));
            replies.push(client_settings().into());
        }
        Packet::UpdateHealth(health) => {
            let player = world.player_mut();
            player.health = health.health as f32;
            player.food = health.food;
            player.saturation = health.saturation;
            if health.health <= 0 {
                info!("player died, requesting respawn");
                replies.push(
                    ClientStatuses {
                        payload: STATUS_RESPAWN,
                    }
                    .into(),
                );
            }
        }
        Packet::Respawn(respawn) => {
            world.reset(dimension(respawn.dimension));
            world.player_mut().game_mode = respawn.game_mode;
        }
        Packet::ServerPositionAndLook(correction) => {
            let player = world.player_mut();
            player.position = Some(DVec3::new(correction.x, correction.y, correction.z));
            player.yaw = correction.yaw;
            player.pitch = correction.pitch;
            player.on_ground = correction.on_ground;
            player.corrections += 1;
            debug!(x = correction.x, y = correction.y, z = correction.z, "server position");
            replies.push(echo_position(&correction).into());
        }
        Packet::ChunkData(chunk) => world.apply_chunk_data(&chunk)?,
        Packet::ChunkBulk(bulk) => world.apply_chunk_bulk(&bulk)?,
        Packet::BlockChange(change) => {
            let pos = BlockPos::new(change.x, change.y as i32, change.z);
            let state = BlockState::new(change.block_id as u16, change.metadata as u8);
            world.apply_block_change(pos, state);
        }
        Packet::MultiBlockChange(changes) => world.apply_multi_block_change(&changes),
        Packet::Explosion(explosion) => world.apply_explosion(&explosion),
        Packet::SpawnNamedEntity(spawn) => {
            let kind = EntityKind::Player { name: spawn.name };
            let entity =
                world.spawn_entity(spawn.entity_id, kind, fixed_to_vec(spawn.x, spawn.y, spawn.z));
            entity.yaw = angle_to_degrees(spawn.yaw);
            entity.pitch = angle_to_degrees(spawn.pitch);
            entity.equipment[0] = (spawn.current_item > 0).then(|| ItemStack {
                id: spawn.current_item,
                count: 1,
                damage: 0,
                nbt: None,
            });
            entity.apply_metadata(&spawn.metadata);
        }
        Packet::SpawnObject(spawn) => {
            let kind = EntityKind::Object(spawn.kind as u8);
            let entity =
                world.spawn_entity(spawn.entity_id, kind, fixed_to_vec(spawn.x, spawn.y, spawn.z));
            entity.yaw = angle_to_degrees(spawn.yaw);
            entity.pitch = angle_to_degrees(spawn.pitch);
            if let Some([x, y, z]) = spawn.data.velocity {
                entity.velocity = velocity(x, y, z);
            }
        }
        Packet::SpawnMob(spawn) => {
            let kind = EntityKind::Mob(spawn.kind);
            let entity =
                world.spawn_entity(spawn.entity_id, kind, fixed_to_vec(spawn.x, spawn.y, spawn.z));
            entity.yaw = angle_to_degrees(spawn.yaw);
            entity.pitch = angle_to_degrees(spawn.pitch);
            entity.head_yaw = angle_to_degrees(spawn.head_pitch);
            entity.velocity = velocity(spawn.velocity_x, spawn.velocity_y, spawn.velocity_z);
            entity.apply_metadata(&spawn.metadata);
        }
        Packet::SpawnPainting(spawn) => {
            let kind = EntityKind::Painting { title: spawn.title };
            let position = BlockPos::new(spawn.x, spawn.y, spawn.z).bottom_center();
            world.spawn_entity(spawn.entity_id, kind, position);
        }
        Packet::SpawnExperienceOrb(spawn) => {
            let kind = EntityKind::ExperienceOrb { count: spawn.count };
            world.spawn_entity(spawn.entity_id, kind, fixed_to_vec(spawn.x, spawn.y, spawn.z));
        }
        Packet::SpawnGlobalEntity(spawn) => {
            world.spawn_entity(
                spawn.entity_id,
                EntityKind::Lightning,
                fixed_to_vec(spawn.x, spawn.y, spawn.z),
            );
        }
        Packet::EntityRelativeMove(moved) => world.update_entity(
            moved.entity_id,
            EntityUpdate::Move(relative_to_vec(moved.dx, moved.dy, moved.dz)),
        ),
        Packet::EntityLook(look) => world.update_entity(
            look.entity_id,
            EntityUpdate::Look {
                yaw: angle_to_degrees(look.yaw),
                pitch: angle_to_degrees(look.pitch),
            },
        ),
        Packet::EntityLookAndRelativeMove(moved) => world.update_entity(
            moved.entity_id,
            EntityUpdate::MoveLook {
                delta: relative_to_vec(moved.dx, moved.dy, moved.dz),
                yaw: angle_to_degrees(moved.yaw),
                pitch: angle_to_degrees(moved.pitch),
            },
        ),
        Packet::EntityTeleport(teleport) => world.update_entity(
            teleport.entity_id,
            EntityUpdate::Teleport {
                position: fixed_to_vec(teleport.x, teleport.y, teleport.z),
                yaw: angle_to_degrees(teleport.yaw),
                pitch: angle_to_degrees(teleport.pitch),
            },
        ),
        Packet::EntityHeadLook(look) => world.update_entity(
            look.entity_id,
            EntityUpdate::HeadLook(angle_to_degrees(look.head_yaw)),
        ),
        Packet::EntityVelocity(v) => world.update_entity(
            v.entity_id,
            EntityUpdate::Velocity(velocity(v.velocity_x, v.velocity_y, v.velocity_z)),
        ),
        Packet::EntityEquipment(equipment) => match usize::try_from(equipment.slot) {
            Ok(slot) => world.update_entity(
                equipment.entity_id,
                EntityUpdate::Equipment {
                    slot,
                    item: equipment.item,
                },
            ),
            Err(_) => warn!(entity = equipment.entity_id, slot = equipment.slot, "negative equipment slot"),
        },
        Packet::EntityMetadataUpdate(update) => {
            world.update_entity(update.entity_id, EntityUpdate::Metadata(update.metadata))
        }
        Packet::AttachEntity(attach) => world.update_entity(
            attach.entity_id,
            EntityUpdate::Attach {
                vehicle: (attach.vehicle_id >= 0).then_some(attach.vehicle_id),
            },
        ),
        Packet::EntityStatus(status) => {
            world.update_entity(status.entity_id, EntityUpdate::Status(status.status))
        }
        Packet::DestroyEntity(destroy) => {
            for id in destroy.entity_ids {
                world.despawn_entity(id);
            }
        }
        other => trace!(packet = other.name(), "ignored"),
    }
    Ok(replies)
}
