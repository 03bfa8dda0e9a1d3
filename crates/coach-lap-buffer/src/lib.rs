//! Lap/Sector Buffer Manager (spec §4.4): segments telemetry into sectors
//! and laps, validates and flags outliers, and tracks personal/session
//! bests. Persistence of promoted references is the caller's job, this
//! crate only reports promotion flags on [`LapCompletion`].

mod events;
mod manager;

pub use events::{LapCompletion, SectorCompletion};
pub use manager::LapBufferManager;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use racing_coach_contracts::{SessionKind, TelemetrySample};

    fn sample(ts: f64, lap: u32, frac: f32, on_pit_road: bool) -> TelemetrySample {
        TelemetrySample {
            timestamp_s: ts,
            lap_number: lap,
            lap_distance_fraction: frac,
            speed_kmh: 200.0,
            rpm: 7000.0,
            gear: 4,
            throttle: 1.0,
            brake: 0.0,
            steering_rad: 0.0,
            lateral_accel_ms2: 0.0,
            longitudinal_accel_ms2: 0.0,
            fuel_liters: 50.0,
            lap_current_s: None,
            lap_last_s: None,
            lap_best_s: None,
            on_pit_road,
            track_name: "monza".into(),
            car_name: "bmw_m4_gt3".into(),
            session_kind: SessionKind::Practice,
            tires: None,
        }
    }

    /// Scenario 1 (spec §8): lap_distance_pct sequence
    /// 0.01, 0.50, 0.97, 0.02 (lap unchanged), 0.05 completes a lap at the
    /// third→fourth transition, with the lap number synthesized.
    #[test]
    fn wrap_without_lap_number_increment_completes_a_lap() {
        let mut mgr = LapBufferManager::new("monza", "bmw_m4_gt3", vec![0.0, 0.33, 0.66], None, None);

        assert!(mgr.process_sample(sample(0.0, 1, 0.01, false)).1.is_none());
        assert!(mgr.process_sample(sample(20.0, 1, 0.50, false)).1.is_none());
        assert!(mgr.process_sample(sample(40.0, 1, 0.97, false)).1.is_none());

        let (_, completion) = mgr.process_sample(sample(41.0, 1, 0.02, false));
        let completion = completion.expect("lap should complete on wrap without increment");
        assert_eq!(completion.lap.lap_number, 2);

        let (_, none_completion) = mgr.process_sample(sample(42.0, 2, 0.05, false));
        assert!(none_completion.is_none());
    }

    /// Scenario 2 (spec §8): a valid 95.200s lap with no prior references
    /// is promoted to personal_best.
    #[test]
    fn valid_lap_is_promoted_to_personal_best() {
        let mut mgr = LapBufferManager::new("monza", "bmw_m4_gt3", vec![0.0, 0.33, 0.66], None, None);

        mgr.process_sample(sample(0.0, 1, 0.0, false));
        mgr.process_sample(sample(50.0, 1, 0.5, false));
        let (_, completion) = mgr.process_sample(sample(95.2, 1, 0.0, false));

        let completion = completion.expect("lap should complete");
        assert!(completion.lap.valid);
        assert!(completion.is_personal_best);
        assert!((completion.lap.total_time_s - 95.2).abs() < 1e-9);
        assert_eq!(mgr.personal_best_s(), Some(95.2));
    }

    #[test]
    fn on_pit_road_after_first_10pct_invalidates_lap() {
        let mut mgr = LapBufferManager::new("monza", "bmw_m4_gt3", vec![0.0, 0.33, 0.66], None, None);

        mgr.process_sample(sample(0.0, 1, 0.0, false));
        mgr.process_sample(sample(10.0, 1, 0.5, true));
        let (_, completion) = mgr.process_sample(sample(20.0, 1, 0.0, false));

        let completion = completion.expect("lap should complete");
        assert!(!completion.lap.valid);
        assert!(!completion.is_personal_best);
    }

    #[test]
    fn slower_lap_does_not_improve_personal_best() {
        let mut mgr = LapBufferManager::new("monza", "bmw_m4_gt3", vec![0.0, 0.33, 0.66], Some(90.0), None);

        mgr.process_sample(sample(0.0, 1, 0.0, false));
        let (_, completion) = mgr.process_sample(sample(95.0, 1, 0.0, false));

        let completion = completion.expect("lap should complete");
        assert!(!completion.is_personal_best);
        assert_eq!(mgr.personal_best_s(), Some(90.0));
    }

    #[test]
    fn sector_crossings_are_reported_before_lap_completion() {
        let mut mgr = LapBufferManager::new("monza", "bmw_m4_gt3", vec![0.0, 0.33, 0.66], None, None);

        mgr.process_sample(sample(0.0, 1, 0.0, false));
        let (sectors, completion) = mgr.process_sample(sample(33.0, 1, 0.33, false));
        assert!(completion.is_none());
        assert_eq!(sectors.len(), 1);
        assert_eq!(sectors[0].sector_index, 0);
    }
}
