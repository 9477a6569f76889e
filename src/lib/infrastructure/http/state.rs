//! Application state module

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};

use crate::domain::communication::mailer::Mailer;

/// Global application state
#[derive(Clone)]
pub struct AppState<M: Mailer> {
    /// The time the server started
    pub start_time: DateTime<Utc>,

    /// Mailer shared by every request
    pub mailer: Arc<M>,
}

impl<M> AppState<M>
where
    M: Mailer,
{
    /// Create a new application state
    pub fn new(mailer: M) -> Self {
        Self {
            start_time: Utc::now(),
            mailer: Arc::new(mailer),
        }
    }
}

impl<M> fmt::Debug for AppState<M>
where
    M: Mailer,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("start_time", &self.start_time)
            .field("mailer", &"Mailer")
            .finish()
    }
}
