//! Mission status and event type vocabulary.
//!
//! Defines the valid values stored in `missions.status` and
//! `events.event_type` and provides the validation helpers used by the
//! repository layer.

/// Mission has been scheduled but not started.
pub const STATUS_PLANNED: &str = "planned";

/// Mission is underway.
pub const STATUS_IN_PROGRESS: &str = "in_progress";

/// Mission finished.
pub const STATUS_COMPLETED: &str = "completed";

/// Mission was called off.
pub const STATUS_CANCELLED: &str = "cancelled";

/// All valid mission statuses.
pub const MISSION_STATUSES: &[&str] = &[
    STATUS_PLANNED,
    STATUS_IN_PROGRESS,
    STATUS_COMPLETED,
    STATUS_CANCELLED,
];

pub const EVENT_COMBAT: &str = "combat";
pub const EVENT_LOGISTICS: &str = "logistics";
pub const EVENT_TRAINING: &str = "training";
pub const EVENT_OTHER: &str = "other";

/// All valid event types.
pub const EVENT_TYPES: &[&str] = &[EVENT_COMBAT, EVENT_LOGISTICS, EVENT_TRAINING, EVENT_OTHER];

/// Validate that a mission status is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), String> {
    if MISSION_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid mission status '{status}'. Must be one of: {}",
            MISSION_STATUSES.join(", ")
        ))
    }
}

/// Validate that an event type is one of the accepted values.
pub fn validate_event_type(event_type: &str) -> Result<(), String> {
    if EVENT_TYPES.contains(&event_type) {
        Ok(())
    } else {
        Err(format!(
            "Invalid event type '{event_type}'. Must be one of: {}",
            EVENT_TYPES.join(", ")
        ))
    }
}
