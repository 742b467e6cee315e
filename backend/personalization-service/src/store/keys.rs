//! Redis key schema
//!
//! Key format: v{VERSION}:personalization:{kind}:{actor_id}

/// Bump when a key layout changes
pub const KEY_VERSION: u32 = 1;

pub struct StoreKey;

impl StoreKey {
    /// Format: v1:personalization:settings:{actor_id}
    pub fn settings(actor_id: &str) -> String {
        format!("v{}:personalization:settings:{}", KEY_VERSION, actor_id)
    }

    /// Hash of task name → pending flag
    /// Format: v1:personalization:pending:{actor_id}
    pub fn pending_tasks(actor_id: &str) -> String {
        format!("v{}:personalization:pending:{}", KEY_VERSION, actor_id)
    }

    /// Format: v1:personalization:visit:{actor_id}
    pub fn last_visit(actor_id: &str) -> String {
        format!("v{}:personalization:visit:{}", KEY_VERSION, actor_id)
    }

    /// Capped list, newest first
    /// Format: v1:personalization:interactions:{actor_id}
    pub fn interactions(actor_id: &str) -> String {
        format!("v{}:personalization:interactions:{}", KEY_VERSION, actor_id)
    }

    /// Signal write counter. Survives purges.
    /// Format: v1:personalization:epoch:{actor_id}
    pub fn signal_epoch(actor_id: &str) -> String {
        format!("v{}:personalization:epoch:{}", KEY_VERSION, actor_id)
    }

    /// Every key holding behavioral signals. Settings and the epoch are not included.
    pub fn signal_keys(actor_id: &str) -> [String; 3] {
        [
            Self::pending_tasks(actor_id),
            Self::last_visit(actor_id),
            Self::interactions(actor_id),
        ]
    }
}
