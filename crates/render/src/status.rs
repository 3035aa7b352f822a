use std::fmt;

use asciicraft_core::BlockPos;
use asciicraft_world::World;

/// Summary line shown under the map.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    /// Zero-based index of the focused session.
    pub session_index: usize,
    /// Number of open sessions.
    pub session_count: usize,
    /// Session label, usually `user@host:port`.
    pub name: String,
    /// Connection state label.
    pub state: String,
    /// Player health.
    pub health: f32,
    /// Player food level.
    pub food: i16,
    /// Player feet voxel, once known.
    pub position: Option<BlockPos>,
    /// Block changes dropped for want of a loaded chunk.
    pub dropped: u64,
    /// Whether look-around mode is on.
    pub looking: bool,
}

impl StatusLine {
    /// Status for a session, with the player fields read from `world`.
    pub fn for_world(
        session_index: usize,
        session_count: usize,
        name: impl Into<String>,
        state: impl Into<String>,
        world: &World,
    ) -> Self {
        let player = world.player();
        Self {
            session_index,
            session_count,
            name: name.into(),
            state: state.into(),
            health: player.health,
            food: player.food,
            position: player.block_pos(),
            dropped: world.stats().dropped_block_changes,
            looking: false,
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {} {} | hp {:.0} food {}",
            self.session_index + 1,
            self.session_count,
            self.name,
            self.state,
            self.health,
            self.food
        )?;
        match self.position {
            Some(pos) => write!(f, " | {pos}")?,
            None => f.write_str(" | (?)")?,
        }
        if self.dropped > 0 {
            write!(f, " | dropped {}", self.dropped)?;
        }
        if self.looking {
            f.write_str(" | LOOK")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn status_reads_the_player() {
        let mut world = World::default();
        world.player_mut().position = Some(DVec3::new(10.5, 64.0, -3.2));
        world.player_mut().health = 13.0;
        let mut status = StatusLine::for_world(1, 3, "steve@localhost:25565", "play", &world);
        assert_eq!(
            status.to_string(),
            "[2/3] steve@localhost:25565 play | hp 13 food 20 | (10, 64, -4)"
        );

        status.looking = true;
        status.dropped = 2;
        assert!(status.to_string().ends_with("| dropped 2 | LOOK"));
    }

    #[test]
    fn unknown_position_is_marked() {
        let status = StatusLine::for_world(0, 1, "a", "login", &World::default());
        assert_eq!(status.to_string(), "[1/1] a login | hp 20 food 20 | (?)");
    }
}
