use racing_coach_contracts::{LapRecord, TelemetrySample};
use racing_coach_ring_buffer::RingBuffer;

use crate::events::{LapCompletion, SectorCompletion};

/// How many valid laps the outlier threshold looks back across (spec
/// §4.4: "1.5x the rolling median of the last 5 valid laps").
const OUTLIER_WINDOW: usize = 5;
const OUTLIER_FACTOR: f64 = 1.5;
/// Samples with `lap_distance_fraction` below this are still "the start
/// of the lap" for the on-pit-road validity check (spec §4.4's first 10%).
const VALIDITY_GRACE_FRACTION: f32 = 0.10;

struct CurrentLap {
    lap_number: u32,
    start_time_s: f64,
    samples: Vec<TelemetrySample>,
    /// One slot per boundary in `sector_boundaries[1..]`; `None` until
    /// that boundary is crossed this lap.
    boundary_crossings: Vec<Option<f64>>,
}

impl CurrentLap {
    fn new(sample: TelemetrySample, boundary_count: usize) -> Self {
        Self {
            lap_number: sample.lap_number,
            start_time_s: sample.timestamp_s,
            samples: vec![sample],
            boundary_crossings: vec![None; boundary_count],
        }
    }
}

/// Segments telemetry into sectors and laps, tracks validity and
/// outlier status, and promotes personal-best / session-best times
/// (spec §4.4). Persistence is not this component's job: a completed
/// lap's promotion flags are reported on [`LapCompletion`] for whoever
/// owns the Reference Lap Store to act on.
pub struct LapBufferManager {
    track_name: String,
    car_name: String,
    /// Sector start fractions, e.g. `[0.0, 0.33, 0.66]`. First entry must
    /// be `0.0`.
    sector_boundaries: Vec<f32>,
    current: Option<CurrentLap>,
    recent_valid_lap_times: RingBuffer<f64>,
    personal_best_s: Option<f64>,
    session_best_s: Option<f64>,
}

impl LapBufferManager {
    /// `personal_best_s`/`session_best_s` seed the promotion comparison
    /// from references loaded at session start (spec §4.4).
    pub fn new(
        track_name: impl Into<String>,
        car_name: impl Into<String>,
        sector_boundaries: Vec<f32>,
        personal_best_s: Option<f64>,
        session_best_s: Option<f64>,
    ) -> Self {
        Self {
            track_name: track_name.into(),
            car_name: car_name.into(),
            sector_boundaries,
            current: None,
            recent_valid_lap_times: RingBuffer::new(OUTLIER_WINDOW),
            personal_best_s,
            session_best_s,
        }
    }

    pub fn personal_best_s(&self) -> Option<f64> {
        self.personal_best_s
    }

    pub fn session_best_s(&self) -> Option<f64> {
        self.session_best_s
    }

    /// Feed one sample. Returns any sector crossings detected this tick
    /// and, if a lap completed, its `LapCompletion`.
    pub fn process_sample(
        &mut self,
        sample: TelemetrySample,
    ) -> (Vec<SectorCompletion>, Option<LapCompletion>) {
        let boundary_count = self.sector_boundaries.len().saturating_sub(1);

        let Some(current) = self.current.as_mut() else {
            self.current = Some(CurrentLap::new(sample, boundary_count));
            return (Vec::new(), None);
        };

        let prev = match current.samples.last() {
            Some(prev) => prev.clone(),
            None => sample.clone(),
        };

        let mut sector_events = self.detect_sector_crossings(&prev, &sample);

        let increment_detected = sample.lap_number != prev.lap_number;
        let wrap_without_increment = !increment_detected
            && prev.lap_distance_fraction >= 0.95
            && sample.lap_distance_fraction <= 0.05;

        if !(increment_detected || wrap_without_increment) {
            if let Some(current) = self.current.as_mut() {
                current.samples.push(sample);
            }
            return (sector_events, None);
        }

        let wrap_time = wrap_crossing_time(&prev, &sample);
        let synthesized_lap_number = if wrap_without_increment {
            prev.lap_number + 1
        } else {
            sample.lap_number
        };

        let completion = self.finalize_lap(wrap_time, synthesized_lap_number, &mut sector_events);

        self.current = Some(CurrentLap::new(sample, boundary_count));

        (sector_events, Some(completion))
    }

    fn detect_sector_crossings(
        &mut self,
        prev: &TelemetrySample,
        sample: &TelemetrySample,
    ) -> Vec<SectorCompletion> {
        let mut events = Vec::new();
        let Some(current) = self.current.as_mut() else {
            return events;
        };
        // `sample.lap_distance_fraction` decreasing means a wrap is about
        // to be handled separately; internal boundaries only apply within
        // a monotonically advancing lap.
        if sample.lap_distance_fraction < prev.lap_distance_fraction {
            return events;
        }

        for (idx, boundary) in self.sector_boundaries.iter().skip(1).enumerate() {
            let Some(slot) = current.boundary_crossings.get_mut(idx) else {
                continue;
            };
            if slot.is_some() {
                continue;
            }
            if prev.lap_distance_fraction < *boundary && sample.lap_distance_fraction >= *boundary {
                let span = (sample.lap_distance_fraction - prev.lap_distance_fraction) as f64;
                let crossing_time = if span > 0.0 {
                    let gap = (*boundary - prev.lap_distance_fraction) as f64 / span;
                    prev.timestamp_s + gap * (sample.timestamp_s - prev.timestamp_s)
                } else {
                    sample.timestamp_s
                };
                *slot = Some(crossing_time);

                let previous_boundary_time = previous_crossing_time(current, idx);
                events.push(SectorCompletion {
                    sector_index: idx,
                    time_s: crossing_time - previous_boundary_time,
                });
            }
        }
        events
    }

    fn finalize_lap(
        &mut self,
        wrap_time: f64,
        lap_number: u32,
        sector_events: &mut Vec<SectorCompletion>,
    ) -> LapCompletion {
        let current = self
            .current
            .take()
            .unwrap_or_else(|| CurrentLap::new(dummy_sample(lap_number), 0));

        let last_sector_index = self.sector_boundaries.len().saturating_sub(1);
        let last_boundary_time = previous_crossing_time(&current, last_sector_index);
        sector_events.push(SectorCompletion {
            sector_index: last_sector_index,
            time_s: wrap_time - last_boundary_time,
        });

        let total_time_s = wrap_time - current.start_time_s;

        let mut sector_times_s = Vec::with_capacity(self.sector_boundaries.len());
        let mut previous_time = current.start_time_s;
        for crossing in current.boundary_crossings.iter().flatten() {
            sector_times_s.push(crossing - previous_time);
            previous_time = *crossing;
        }
        sector_times_s.push(wrap_time - previous_time);

        let pit_after_start = current.samples.iter().any(|s| {
            s.lap_distance_fraction > VALIDITY_GRACE_FRACTION && s.on_pit_road
        });
        let valid = total_time_s > 0.0 && !pit_after_start;

        let is_outlier = valid && self.is_outlier(total_time_s);

        let lap = LapRecord {
            lap_number,
            track_name: self.track_name.clone(),
            car_name: self.car_name.clone(),
            total_time_s,
            sector_times_s,
            segment_metrics: Vec::new(),
            valid,
            created_at_s: wrap_time,
        };

        let mut is_personal_best = false;
        let mut is_session_best = false;

        if valid {
            self.recent_valid_lap_times.push(total_time_s);

            if self.personal_best_s.is_none_or(|best| total_time_s < best) {
                self.personal_best_s = Some(total_time_s);
                is_personal_best = !is_outlier;
            }
            if self.session_best_s.is_none_or(|best| total_time_s < best) {
                self.session_best_s = Some(total_time_s);
                is_session_best = !is_outlier;
            }
        }

        LapCompletion {
            lap,
            is_personal_best,
            is_session_best,
            is_outlier,
        }
    }

    fn is_outlier(&self, total_time_s: f64) -> bool {
        let mut times: Vec<f64> = self.recent_valid_lap_times.iter().copied().collect();
        if times.is_empty() {
            return false;
        }
        times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let median = median_of(&times);
        total_time_s > OUTLIER_FACTOR * median
    }
}

fn median_of(sorted: &[f64]) -> f64 {
    let len = sorted.len();
    if len == 0 {
        return 0.0;
    }
    let mid = len / 2;
    if len % 2 == 0 {
        let a = sorted.get(mid - 1).copied().unwrap_or(0.0);
        let b = sorted.get(mid).copied().unwrap_or(0.0);
        (a + b) / 2.0
    } else {
        sorted.get(mid).copied().unwrap_or(0.0)
    }
}

fn previous_crossing_time(current: &CurrentLap, boundary_idx: usize) -> f64 {
    current
        .boundary_crossings
        .get(..boundary_idx)
        .into_iter()
        .flatten()
        .rev()
        .find_map(|t| *t)
        .unwrap_or(current.start_time_s)
}

/// Interpolated timestamp at which the lap distance fraction wraps from
/// `prev` to `curr` (spec §4.4's lap completion detection).
fn wrap_crossing_time(prev: &TelemetrySample, curr: &TelemetrySample) -> f64 {
    if curr.lap_distance_fraction < prev.lap_distance_fraction {
        let total = (1.0 - prev.lap_distance_fraction) as f64 + curr.lap_distance_fraction as f64;
        if total > 0.0 {
            let gap = (1.0 - prev.lap_distance_fraction) as f64 / total;
            prev.timestamp_s + gap * (curr.timestamp_s - prev.timestamp_s)
        } else {
            curr.timestamp_s
        }
    } else {
        curr.timestamp_s
    }
}

fn dummy_sample(lap_number: u32) -> TelemetrySample {
    TelemetrySample {
        timestamp_s: 0.0,
        lap_number,
        lap_distance_fraction: 0.0,
        speed_kmh: 0.0,
        rpm: 0.0,
        gear: 1,
        throttle: 0.0,
        brake: 0.0,
        steering_rad: 0.0,
        lateral_accel_ms2: 0.0,
        longitudinal_accel_ms2: 0.0,
        fuel_liters: 0.0,
        lap_current_s: None,
        lap_last_s: None,
        lap_best_s: None,
        on_pit_road: false,
        track_name: String::new(),
        car_name: String::new(),
        session_kind: racing_coach_contracts::SessionKind::Practice,
        tires: None,
    }
}
