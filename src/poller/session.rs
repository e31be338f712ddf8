//! Active-session tracking.

use log::info;

use crate::domain::SessionStatus;

/// Tracks which session (if any) the dashboard last saw as active.
///
/// `NoSession -> Active(id) -> NoSession`. The transition back to
/// `NoSession` hands out the finished id exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTracker {
    active: Option<u64>,
}

impl SessionTracker {
    pub fn active(&self) -> Option<u64> {
        self.active
    }

    /// Feed the latest status. Returns the id of a session that just ended.
    pub fn observe(&mut self, status: &SessionStatus) -> Option<u64> {
        match *status {
            SessionStatus::Active { session_id } => {
                match self.active {
                    None => info!("Session {session_id} started"),
                    Some(previous) if previous != session_id => {
                        info!("Session {previous} replaced by session {session_id}");
                    }
                    Some(_) => {}
                }
                self.active = Some(session_id);
                None
            }
            SessionStatus::NoActiveSession => {
                let ended = self.active.take();
                if let Some(id) = ended {
                    info!("Session {id} is no longer active");
                }
                ended
            }
        }
    }
}
