use crate::domain::model::CourseId;
use crate::utils::error::{DeskError, Result};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKey {
    Course(CourseId),
    NewCourse,
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKey::Course(id) => write!(f, "course {}", id),
            ActionKey::NewCourse => f.write_str("new course"),
        }
    }
}

/// Tracks which courses have a request outstanding. At most one ticket per key
/// exists at a time; the key is released when the ticket drops.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<ActionKey>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, key: ActionKey) -> Result<InFlightTicket> {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        if !keys.insert(key.clone()) {
            return Err(DeskError::ActionInFlight {
                key: key.to_string(),
            });
        }
        Ok(InFlightTicket {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    #[cfg(test)]
    fn is_pending(&self, key: &ActionKey) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }
}

#[derive(Debug)]
pub struct InFlightTicket {
    keys: Arc<Mutex<HashSet<ActionKey>>>,
    key: ActionKey,
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}
