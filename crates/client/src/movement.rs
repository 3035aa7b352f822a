//! Movement and look controller.
//!
//! Turns discrete actions into the packets that carry them, rejecting
//! impossible moves locally so no round trip is wasted on them. Positions
//! are predicted locally until the server corrects them; a correction always
//! wins.

use asciicraft_core::{BlockPos, Compass};
use asciicraft_net::protocol::{PlayerDigging, PositionAndLook};
use asciicraft_net::Packet;
use asciicraft_render::surface_below;
use asciicraft_world::{Entity, World, PLAYER_EYE_HEIGHT};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::outcome::Rejection;

/// `PlayerDigging` status: started digging.
pub const DIG_STARTED: i8 = 0;
/// `PlayerDigging` status: finished digging.
pub const DIG_FINISHED: i8 = 2;
/// Block face `+Y`.
pub const FACE_TOP: i8 = 1;

/// Movement tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Deepest drop a single step may take.
    pub max_drop: u8,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self { max_drop: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Prediction {
    /// Server corrections seen when the prediction was made.
    epoch: u64,
    position: DVec3,
    yaw: f32,
}

/// Per-session movement state.
#[derive(Debug, Clone)]
pub struct MovementController {
    config: MovementConfig,
    predicted: Option<Prediction>,
    facing: Compass,
}

impl MovementController {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            predicted: None,
            facing: Compass::South,
        }
    }

    pub fn config(&self) -> MovementConfig {
        self.config
    }

    /// Direction of the last step.
    pub fn facing(&self) -> Compass {
        self.facing
    }

    /// Best known feet position: the local prediction unless the server has
    /// corrected us since it was made.
    pub fn position(&self, world: &World) -> Option<DVec3> {
        let player = world.player();
        match self.predicted {
            Some(p) if p.epoch == player.corrections && player.position.is_some() => {
                Some(p.position)
            }
            _ => player.position,
        }
    }

    fn yaw(&self, world: &World) -> f32 {
        match self.predicted {
            Some(p) if p.epoch == world.player().corrections => p.yaw,
            _ => world.player().yaw,
        }
    }

    /// Feet voxel.
    pub fn feet(&self, world: &World) -> Result<BlockPos, Rejection> {
        self.position(world)
            .map(BlockPos::containing)
            .ok_or(Rejection::NoPosition)
    }

    /// Where a step in `direction` would land, without taking it.
    ///
    /// A solid block ahead is climbed when the two voxels above it are
    /// clear. Otherwise the step needs head room ahead and lands on the
    /// first solid block at most `max_drop` voxels down.
    pub fn plan_step(&self, world: &World, direction: Compass) -> Result<BlockPos, Rejection> {
        let feet = self.feet(world)?;
        let (dx, dz) = direction.delta();
        let target = feet.offset(dx, 0, dz);
        if !world.is_loaded(target) {
            return Err(Rejection::Unloaded);
        }
        if is_solid(world, target) {
            return climb_onto(world, feet, target);
        }
        if is_solid(world, target.up()) {
            return Err(Rejection::Blocked);
        }
        let info = world.block_at(target).info();
        if info.is_climbable() || info.is_liquid() {
            return Ok(target);
        }
        for drop in 0..=self.config.max_drop as i32 {
            let floor = target.offset(0, -drop - 1, 0);
            if !floor.in_world_height() {
                break;
            }
            if is_solid(world, floor) {
                return Ok(floor.up());
            }
        }
        Err(Rejection::TooDeep)
    }

    /// Take a step. Returns the new feet voxel and the packet announcing it.
    pub fn step(&mut self, world: &World, direction: Compass) -> Result<(BlockPos, Packet), Rejection> {
        let destination = self.plan_step(world, direction)?;
        self.facing = direction;
        Ok((destination, self.move_to(world, destination, direction.yaw())))
    }

    /// Climb up a ladder or vine, or onto the block ahead.
    pub fn ascend(&mut self, world: &World) -> Result<(BlockPos, Packet), Rejection> {
        let feet = self.feet(world)?;
        let on_climbable = is_climbable(world, feet) || is_climbable(world, feet.up());
        let destination = if on_climbable {
            if is_solid(world, feet.up()) || is_solid(world, feet.up().up()) {
                return Err(Rejection::Blocked);
            }
            feet.up()
        } else {
            let (dx, dz) = self.facing.delta();
            let ahead = feet.offset(dx, 0, dz);
            if !world.is_loaded(ahead) {
                return Err(Rejection::Unloaded);
            }
            if !is_solid(world, ahead) {
                return Err(Rejection::NotClimbable);
            }
            climb_onto(world, feet, ahead)?
        };
        let yaw = self.yaw(world);
        Ok((destination, self.move_to(world, destination, yaw)))
    }

    /// Climb down a ladder or vine.
    pub fn descend(&mut self, world: &World) -> Result<(BlockPos, Packet), Rejection> {
        let feet = self.feet(world)?;
        let below = feet.down();
        if !(is_climbable(world, feet) || is_climbable(world, below)) {
            return Err(Rejection::NotClimbable);
        }
        if !below.in_world_height() || is_solid(world, below) {
            return Err(Rejection::Blocked);
        }
        let yaw = self.yaw(world);
        Ok((below, self.move_to(world, below, yaw)))
    }

    fn move_to(&mut self, world: &World, destination: BlockPos, yaw: f32) -> Packet {
        let position = destination.bottom_center();
        self.predicted = Some(Prediction {
            epoch: world.player().corrections,
            position,
            yaw,
        });
        trace!(to = %destination, "predicted move");
        PositionAndLook {
            x: position.x,
            y: position.y,
            stance: position.y + PLAYER_EYE_HEIGHT,
            z: position.z,
            yaw,
            pitch: world.player().pitch,
            on_ground: is_solid(world, destination.down()),
        }
        .into()
    }

    /// Break the block next to the player, or the ground in front when the
    /// adjacent voxel is air.
    pub fn dig(&self, world: &World, direction: Compass) -> Result<(BlockPos, Vec<Packet>), Rejection> {
        let feet = self.feet(world)?;
        let (dx, dz) = direction.delta();
        let side = feet.offset(dx, 0, dz);
        if !world.is_loaded(side) {
            return Err(Rejection::Unloaded);
        }
        let (target, face) = if !world.block_at(side).is_air() {
            let face = direction.facing_face().map_or(FACE_TOP, |f| f as i8);
            (side, face)
        } else if !world.block_at(side.down()).is_air() {
            (side.down(), FACE_TOP)
        } else {
            return Err(Rejection::NothingToDig);
        };
        let y = u8::try_from(target.y).map_err(|_| Rejection::NothingToDig)?;
        let packets = [DIG_STARTED, DIG_FINISHED]
            .into_iter()
            .map(|status| {
                PlayerDigging {
                    status,
                    x: target.x,
                    y,
                    z: target.z,
                    face,
                }
                .into()
            })
            .collect();
        Ok((target, packets))
    }

    /// Position packet restating where we are, for the periodic heartbeat.
    pub fn heartbeat(&self, world: &World) -> Option<Packet> {
        let position = self.position(world)?;
        let player = world.player();
        Some(
            PositionAndLook {
                x: position.x,
                y: position.y,
                stance: position.y + PLAYER_EYE_HEIGHT,
                z: position.z,
                yaw: self.yaw(world),
                pitch: player.pitch,
                on_ground: player.on_ground,
            }
            .into(),
        )
    }
}

impl Default for MovementController {
    fn default() -> Self {
        Self::new(MovementConfig::default())
    }
}

fn is_solid(world: &World, pos: BlockPos) -> bool {
    world.block_at(pos).info().is_solid()
}

fn is_climbable(world: &World, pos: BlockPos) -> bool {
    world.block_at(pos).info().is_climbable()
}

/// Step up onto the solid `target` next to `feet`.
fn climb_onto(world: &World, feet: BlockPos, target: BlockPos) -> Result<BlockPos, Rejection> {
    if is_solid(world, target.up()) || is_solid(world, target.up().up()) {
        return Err(Rejection::TooHigh);
    }
    if is_solid(world, feet.up().up()) {
        return Err(Rejection::Blocked);
    }
    Ok(target.up())
}

fn describe_entities(mut found: Vec<&Entity>) -> Option<String> {
    found.sort_by_key(|e| e.id);
    let first = found.first()?;
    Some(match found.len() {
        1 => first.describe(),
        n => format!("{} (+{} more)", first.describe(), n - 1),
    })
}

/// Describe what is at `target`, from local state only: an entity standing
/// there, the block there, or else the surface below it.
pub fn examine(world: &World, target: BlockPos, max_depth: u8) -> String {
    if !world.is_loaded(target) {
        return format!("{target}: not loaded");
    }
    if let Some(text) = describe_entities(world.entities_at(target).collect()) {
        return text;
    }
    let block = world.block_at(target);
    if !block.is_air() {
        return format!("{} at {target}", block.info().name);
    }
    match surface_below(target, max_depth, |pos| world.block_at(pos)) {
        Some((y, surface)) => {
            let pos = BlockPos::new(target.x, y, target.z);
            if let Some(text) = describe_entities(world.entities_at(pos.up()).collect()) {
                return text;
            }
            let name = surface.info().name;
            match target.y - y {
                d if d < 0 => format!("{name} at {pos}, overhead"),
                d => format!("{name} at {pos}, {d} below"),
            }
        }
        None => format!("nothing within {max_depth} blocks below {target}"),
    }
}
