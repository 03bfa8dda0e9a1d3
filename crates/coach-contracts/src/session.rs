use serde::{Deserialize, Serialize};

/// Session type as reported by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Practice,
    Qualify,
    Race,
    Test,
}

/// Slow-changing session metadata. Replaced wholesale on change, never
/// mutated in place, downstream components treat identity change (track,
/// car, or driver) as a session-change event (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    pub track_display_name: String,
    pub track_config_name: String,
    pub car_screen_name: String,
    pub driver_identity: String,
    pub session_kind: SessionKind,
    pub weather: String,
    pub session_start_timestamp_s: f64,
}

impl SessionDescriptor {
    /// Identity used to detect a session change: track + car + driver.
    /// Weather and session kind can vary within one continuous session.
    pub fn identity(&self) -> (&str, &str, &str) {
        (
            self.track_config_name.as_str(),
            self.car_screen_name.as_str(),
            self.driver_identity.as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_changes_on_car_swap() {
        let a = SessionDescriptor {
            track_display_name: "Spa".into(),
            track_config_name: "spa_gp".into(),
            car_screen_name: "gt3".into(),
            driver_identity: "driver1".into(),
            session_kind: SessionKind::Practice,
            weather: "clear".into(),
            session_start_timestamp_s: 0.0,
        };
        let mut b = a.clone();
        b.car_screen_name = "gt4".into();
        assert_ne!(a.identity(), b.identity());
    }
}
