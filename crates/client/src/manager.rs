//! The set of open sessions and which one has focus.

use asciicraft_input::Action;
use asciicraft_render::{Frame, ProjectionConfig};
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::SessionError;
use crate::outcome::{InputOutcome, Rejection};
use crate::session::{Session, SessionConfig, SessionId};

/// Default grid size until the front-end reports its own.
pub const DEFAULT_VIEWPORT: (usize, usize) = (61, 21);

/// What one UI tick produced.
#[derive(Debug, Default)]
pub struct Tick {
    /// Frame of the focused session, if there is one.
    pub frame: Option<Frame>,
    /// Sessions whose network task ended since the last tick, with the
    /// status they ended in.
    pub closed: Vec<(SessionId, String)>,
}

/// Owns every session; routes input to the focused one.
#[derive(Debug)]
pub struct SessionManager {
    sessions: Vec<Session>,
    focused: usize,
    next_id: u32,
    config: SessionConfig,
    projection: ProjectionConfig,
    viewport: (usize, usize),
}

impl SessionManager {
    pub fn new(config: SessionConfig, projection: ProjectionConfig) -> Self {
        Self {
            sessions: Vec::new(),
            focused: 0,
            next_id: 1,
            config,
            projection,
            viewport: DEFAULT_VIEWPORT,
        }
    }

    /// Connect to `address` and focus the new session.
    pub async fn open_session(&mut self, address: &str) -> Result<SessionId, SessionError> {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        let session = Session::open(id, address, &self.config).await?;
        info!(session = %id, name = session.name(), "session opened");
        self.sessions.push(session);
        self.focused = self.sessions.len() - 1;
        Ok(id)
    }

    /// Stop a session and forget it. The handle completes once its socket
    /// is released.
    pub fn close_session(&mut self, id: SessionId) -> Option<JoinHandle<()>> {
        let index = self.index_of(id)?;
        let session = self.remove(index);
        Some(session.close())
    }

    fn remove(&mut self, index: usize) -> Session {
        let session = self.sessions.remove(index);
        if index < self.focused || self.focused >= self.sessions.len() {
            self.focused = self.focused.saturating_sub(1);
        }
        session
    }

    fn index_of(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id() == id)
    }

    /// Give `id` the focus. Returns false for unknown ids.
    pub fn focus(&mut self, id: SessionId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.focused = index;
                true
            }
            None => false,
        }
    }

    pub fn focused(&self) -> Option<&Session> {
        self.sessions.get(self.focused)
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Grid size used for rendering.
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.viewport = (width.max(1), height.max(1));
    }

    /// Route one action: session switching is handled here, everything
    /// else goes to the focused session.
    pub fn dispatch_input(&mut self, action: Action) -> InputOutcome {
        match action {
            Action::Quit => InputOutcome::Quit,
            Action::NextSession => {
                if self.sessions.is_empty() {
                    return Rejection::NoSession.into();
                }
                self.focused = (self.focused + 1) % self.sessions.len();
                InputOutcome::Focused(self.sessions[self.focused].id())
            }
            Action::FocusSession(index) => match self.sessions.get(index) {
                Some(session) => {
                    self.focused = index;
                    InputOutcome::Focused(session.id())
                }
                None => Rejection::NoSession.into(),
            },
            Action::CloseSession => match self.focused().map(Session::id) {
                Some(id) => {
                    // Dropping the handle detaches the task; it still stops.
                    drop(self.close_session(id));
                    InputOutcome::Closed(id)
                }
                None => Rejection::NoSession.into(),
            },
            other => match self.sessions.get_mut(self.focused) {
                Some(session) => session.handle(other),
                None => Rejection::NoSession.into(),
            },
        }
    }

    /// One UI tick: queue position heartbeats, drop sessions whose
    /// connection ended, and render the focused session.
    pub fn tick(&mut self) -> Tick {
        for session in &self.sessions {
            session.heartbeat();
        }

        let mut closed = Vec::new();
        let mut index = 0;
        while index < self.sessions.len() {
            let status = self.sessions[index].status();
            if status.is_closed() {
                let session = self.remove(index);
                info!(session = %session.id(), status = %status.label(), "session removed");
                closed.push((session.id(), status.label()));
            } else {
                index += 1;
            }
        }

        let (width, height) = self.viewport;
        let count = self.sessions.len();
        let frame = self
            .focused()
            .map(|session| session.render(width, height, &self.projection, self.focused, count));
        Tick { frame, closed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manager_rejects_session_input() {
        let mut manager = SessionManager::new(SessionConfig::default(), ProjectionConfig::default());
        assert_eq!(
            manager.dispatch_input(Action::NextSession),
            InputOutcome::Rejected(Rejection::NoSession)
        );
        assert_eq!(
            manager.dispatch_input(Action::Examine),
            InputOutcome::Rejected(Rejection::NoSession)
        );
        assert_eq!(manager.dispatch_input(Action::Quit), InputOutcome::Quit);
        assert!(manager.tick().frame.is_none());
    }
}
