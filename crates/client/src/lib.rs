//! Multi-session game client.
//!
//! A [`SessionManager`] owns any number of [`Session`]s. Each session runs its
//! connection on its own tokio task, which decodes packets, drives the
//! connection state machine and applies every accepted packet to the
//! session's world. The UI loop reads those worlds to render and turns key
//! actions into outbound packets through the [`MovementController`].

mod dispatch;
mod error;
mod manager;
mod movement;
mod outcome;
mod session;

pub use dispatch::{apply_inbound, client_settings, echo_position, STATUS_INITIAL_SPAWN, STATUS_RESPAWN};
pub use error::SessionError;
pub use manager::{SessionManager, Tick, DEFAULT_VIEWPORT};
pub use movement::{examine, MovementConfig, MovementController, DIG_FINISHED, DIG_STARTED, FACE_TOP};
pub use outcome::{InputOutcome, Rejection};
pub use session::{parse_address, Session, SessionConfig, SessionId, SessionStatus, DEFAULT_PORT};
