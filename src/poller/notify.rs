//! User-facing notifications for session end and sync results.

use chrono::NaiveDateTime;

use crate::domain::{EndSessionResponse, Notification, SyncResult};

/// One notification per sync target. A failed target never hides a
/// successful one.
pub fn sync_notifications(result: &SyncResult) -> Vec<Notification> {
    result
        .targets()
        .into_iter()
        .map(|(target, outcome)| {
            if outcome.success {
                Notification::success(format!("{} sync completed", target.display_name()))
            } else {
                Notification::error(format!(
                    "{} sync failed: {}",
                    target.display_name(),
                    outcome.error.as_deref().unwrap_or("unknown error")
                ))
            }
        })
        .collect()
}

/// Shown once when the poller starts tracking a session.
pub fn session_started_notification(session_id: u64, start_time: Option<NaiveDateTime>) -> Notification {
    match start_time {
        Some(ts) => Notification::info(format!("Session {session_id} started at {}", ts.format("%H:%M"))),
        None => Notification::info(format!("Session {session_id} in progress")),
    }
}

pub fn end_session_notifications(session_id: u64, resp: &EndSessionResponse) -> Vec<Notification> {
    if !resp.success {
        return vec![Notification::error(format!(
            "Failed to end session {session_id}: {}",
            resp.error.as_deref().unwrap_or("unknown error")
        ))];
    }

    let mut out = vec![Notification::success(format!("Session {session_id} ended"))];
    if let Some(sync) = &resp.sync_result {
        out.extend(sync_notifications(sync));
    }
    out
}
