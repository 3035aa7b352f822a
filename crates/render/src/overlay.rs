//! Entity and cursor markers drawn over projected terrain.

use std::collections::HashMap;

use asciicraft_core::BlockPos;
use asciicraft_world::{EntityFlags, EntityId, World};

use crate::frame::{DepthClass, EntityMarker, Frame, MarkerKind};

/// Glyph of the session's own player.
pub const PLAYER_GLYPH: char = '@';

/// Overlay every visible entity.
///
/// An entity is visible when its column is inside the frame and its feet
/// voxel lies within the projected depth range. Only a surface above the
/// camera's elevation that is also higher than the entity hides it. Several entities in one cell collapse to the
/// highest one (lowest id on ties) with a count.
pub fn overlay_entities(frame: &mut Frame, world: &World, max_depth: u8) {
    let origin = frame.origin();
    let lowest = origin.y - max_depth as i32;
    let highest = origin.y + 1;
    let own_id = world.player().entity_id;

    let mut cells: HashMap<(usize, usize), (BlockPos, EntityId, char, usize)> = HashMap::new();
    for entity in world.entities() {
        if Some(entity.id) == own_id || entity.flags.contains(EntityFlags::INVISIBLE) {
            continue;
        }
        let pos = entity.block_pos();
        if !(lowest..=highest).contains(&pos.y) {
            continue;
        }
        let Some(grid) = frame.grid_of(pos.x, pos.z) else {
            continue;
        };
        let occluded = frame
            .cell(grid.0, grid.1)
            .is_some_and(|cell| cell.depth == DepthClass::Above && highest > pos.y);
        if occluded {
            continue;
        }
        let glyph = entity.kind.glyph();
        cells
            .entry(grid)
            .and_modify(|(best, best_id, best_glyph, count)| {
                *count += 1;
                let higher = pos.y > best.y || (pos.y == best.y && entity.id < *best_id);
                if higher {
                    *best = pos;
                    *best_id = entity.id;
                    *best_glyph = glyph;
                }
            })
            .or_insert((pos, entity.id, glyph, 1));
    }

    for ((col, row), (pos, id, glyph, count)) in cells {
        if let Some(cell) = frame.cell_mut(col, row) {
            cell.marker = Some(EntityMarker {
                kind: MarkerKind::Entity(id),
                glyph,
                relative_y: pos.y - origin.y,
                count,
            });
        }
    }
}

/// Mark the local player's feet column. The player always shows, even
/// under an overhang.
pub fn overlay_player(frame: &mut Frame, feet: BlockPos) {
    let origin = frame.origin();
    let Some((col, row)) = frame.grid_of(feet.x, feet.z) else {
        return;
    };
    if let Some(cell) = frame.cell_mut(col, row) {
        cell.marker = Some(EntityMarker {
            kind: MarkerKind::LocalPlayer,
            glyph: PLAYER_GLYPH,
            relative_y: feet.y - origin.y,
            count: 1,
        });
    }
}

/// Flag the origin cell as the look-around cursor.
pub fn overlay_cursor(frame: &mut Frame) {
    let (col, row) = frame.center();
    if let Some(cell) = frame.cell_mut(col, row) {
        cell.cursor = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Cell, DepthClass};
    use asciicraft_world::{BlockState, EntityKind};
    use glam::DVec3;

    fn frame_with_surface(depth: DepthClass) -> Frame {
        let mut frame = Frame::new(5, 5, BlockPos::new(0, 64, 0));
        for row in 0..5 {
            for col in 0..5 {
                if let Some(cell) = frame.cell_mut(col, row) {
                    *cell = Cell {
                        glyph: '.',
                        depth,
                        block: BlockState::new(1, 0),
                        ..Cell::VOID
                    };
                }
            }
        }
        frame
    }

    fn spawn(world: &mut World, id: EntityId, kind: EntityKind, x: f64, y: f64, z: f64) {
        world.spawn_entity(id, kind, DVec3::new(x, y, z));
    }

    #[test]
    fn entity_on_the_surface_is_drawn() {
        let mut world = World::default();
        spawn(&mut world, 4, EntityKind::Mob(50), 1.5, 64.0, 0.5);
        let mut frame = frame_with_surface(DepthClass::Below(1));
        overlay_entities(&mut frame, &world, 8);

        let marker = frame.at_offset(1, 0).and_then(|c| c.marker).unwrap();
        assert_eq!(marker.kind, MarkerKind::Entity(4));
        assert_eq!(marker.glyph, EntityKind::Mob(50).glyph());
        assert_eq!(marker.relative_y, 0);
        assert_eq!(frame.at_offset(0, 0).and_then(|c| c.marker), None);
    }

    #[test]
    fn only_a_surface_above_the_camera_hides_entities() {
        let mut world = World::default();
        spawn(&mut world, 4, EntityKind::Mob(90), 0.5, 60.0, 0.5);

        let mut frame = frame_with_surface(DepthClass::Above);
        overlay_entities(&mut frame, &world, 8);
        assert!(frame.rows().flatten().all(|c| c.marker.is_none()));

        for depth in [DepthClass::Level, DepthClass::Below(1)] {
            let mut frame = frame_with_surface(depth);
            overlay_entities(&mut frame, &world, 8);
            let marker = frame.at_offset(0, 0).and_then(|c| c.marker).unwrap();
            assert_eq!(marker.kind, MarkerKind::Entity(4));
            assert_eq!(marker.relative_y, -4);
        }
    }

    #[test]
    fn entity_at_head_height_is_not_hidden_by_its_own_block() {
        let mut world = World::default();
        spawn(&mut world, 6, EntityKind::Mob(90), 0.5, 65.0, 0.5);
        let mut frame = frame_with_surface(DepthClass::Above);
        overlay_entities(&mut frame, &world, 8);
        assert!(frame.at_offset(0, 0).and_then(|c| c.marker).is_some());
    }

    #[test]
    fn entities_out_of_depth_range_are_skipped() {
        let mut world = World::default();
        spawn(&mut world, 1, EntityKind::Mob(90), 0.5, 66.0, 0.5);
        spawn(&mut world, 2, EntityKind::Mob(90), 0.5, 50.0, 0.5);
        let mut frame = Frame::new(5, 5, BlockPos::new(0, 64, 0));
        overlay_entities(&mut frame, &world, 8);
        assert!(frame.rows().flatten().all(|c| c.marker.is_none()));
    }

    #[test]
    fn stacked_entities_show_the_highest_with_a_count() {
        let mut world = World::default();
        spawn(&mut world, 9, EntityKind::Mob(90), 0.5, 63.0, 0.5);
        spawn(&mut world, 7, EntityKind::Mob(54), 0.5, 64.0, 0.5);
        spawn(&mut world, 3, EntityKind::Mob(50), 0.5, 64.2, 0.5);
        let mut frame = Frame::new(5, 5, BlockPos::new(0, 64, 0));
        overlay_entities(&mut frame, &world, 8);

        let marker = frame.at_offset(0, 0).and_then(|c| c.marker).unwrap();
        assert_eq!(marker.kind, MarkerKind::Entity(3));
        assert_eq!(marker.count, 3);
    }

    #[test]
    fn own_entity_is_left_to_the_player_marker() {
        let mut world = World::default();
        world.player_mut().entity_id = Some(5);
        world.player_mut().position = Some(DVec3::new(0.5, 64.0, 0.5));
        spawn(&mut world, 5, EntityKind::Player { name: "me".into() }, 0.5, 64.0, 0.5);
        let mut frame = Frame::new(5, 5, BlockPos::new(0, 64, 0));
        overlay_entities(&mut frame, &world, 8);
        overlay_player(&mut frame, BlockPos::new(0, 64, 0));
        overlay_cursor(&mut frame);

        let center = frame.at_offset(0, 0).unwrap();
        assert_eq!(center.marker.map(|m| m.kind), Some(MarkerKind::LocalPlayer));
        assert_eq!(center.display_glyph(), PLAYER_GLYPH);
        assert!(center.cursor);
    }
}
