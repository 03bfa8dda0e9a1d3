use racing_coach_contracts::{SessionKind, TelemetrySample};
use racing_coach_tracing::ComponentCounters;
use serde_json::Value;

use crate::adapter::RawSample;

/// Result of validating one `RawSample` (spec §4.3).
pub enum ValidationOutcome {
    /// Passed through, possibly after a rename/unit repair.
    Repaired(TelemetrySample),
    /// Dropped; the sample never reaches the fan-out.
    Dropped { reason: String },
}

/// Validates inbound samples against the documented schema, repairing
/// known rename/unit mismatches and dropping anything else instead of
/// propagating an error into the data path (spec §4.3, §7's
/// `data_integrity` kind).
pub struct SchemaValidator {
    counters: ComponentCounters,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self {
            counters: ComponentCounters::new(),
        }
    }

    pub fn counters(&self) -> &ComponentCounters {
        &self.counters
    }

    pub fn validate(&self, raw: &RawSample) -> ValidationOutcome {
        match build_sample(raw) {
            Ok(sample) => {
                self.counters.record_processed();
                ValidationOutcome::Repaired(sample)
            }
            Err(reason) => {
                self.counters.record_dropped();
                ValidationOutcome::Dropped { reason }
            }
        }
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads `key`, falling back to `alias` under the rename map (spec §4.3:
/// `lapDistPct`↔`lap_distance_pct`, `brake_pct`↔`brake`,
/// `throttle_pct`↔`throttle`, `trackName`↔`track_name`).
fn get<'a>(raw: &'a RawSample, key: &str, alias: &str) -> Option<&'a Value> {
    raw.get(key).or_else(|| raw.get(alias))
}

fn as_f64(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64)
}

fn as_f32(value: Option<&Value>) -> Option<f32> {
    as_f64(value).map(|v| v as f32)
}

fn as_str(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_owned)
}

fn build_sample(raw: &RawSample) -> Result<TelemetrySample, String> {
    let timestamp_s = as_f64(raw.get("timestamp_s")).ok_or("missing timestamp_s")?;
    let lap_number = raw
        .get("lap_number")
        .and_then(Value::as_u64)
        .ok_or("missing lap_number")? as u32;

    // `lap_distance_pct`/`lapDistPct` arrive as 0..=100; the canonical
    // field is a 0.0..=1.0 fraction.
    let lap_distance_fraction = if let Some(pct) = as_f32(get(raw, "lap_distance_pct", "lapDistPct")) {
        pct / 100.0
    } else {
        as_f32(raw.get("lap_distance_fraction")).ok_or("missing lap_distance_fraction")?
    };

    let speed_kmh = as_f32(raw.get("speed_kmh")).ok_or("missing speed_kmh")?;
    let rpm = as_f32(raw.get("rpm")).ok_or("missing rpm")?;
    let gear = raw
        .get("gear")
        .and_then(Value::as_i64)
        .ok_or("missing gear")? as i8;

    let throttle = if let Some(pct) = as_f32(get(raw, "throttle_pct", "throttle_pct")) {
        (pct / 100.0).clamp(0.0, 1.0)
    } else {
        as_f32(raw.get("throttle")).ok_or("missing throttle")?.clamp(0.0, 1.0)
    };
    let brake = if let Some(pct) = as_f32(raw.get("brake_pct")) {
        (pct / 100.0).clamp(0.0, 1.0)
    } else {
        as_f32(raw.get("brake")).ok_or("missing brake")?.clamp(0.0, 1.0)
    };

    let track_name = get(raw, "track_name", "trackName")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or("missing track_name")?;
    let car_name = as_str(raw.get("car_name")).ok_or("missing car_name")?;

    let session_kind = match as_str(raw.get("session_kind")).as_deref() {
        Some("practice") => SessionKind::Practice,
        Some("qualify") => SessionKind::Qualify,
        Some("race") => SessionKind::Race,
        Some("test") => SessionKind::Test,
        _ => return Err("missing or unknown session_kind".to_string()),
    };

    if !(0.0..=1.0).contains(&lap_distance_fraction) {
        return Err(format!("lap_distance_fraction out of range: {lap_distance_fraction}"));
    }

    Ok(TelemetrySample {
        timestamp_s,
        lap_number,
        lap_distance_fraction,
        speed_kmh,
        rpm,
        gear,
        throttle,
        brake,
        steering_rad: as_f32(raw.get("steering_rad")).unwrap_or(0.0),
        lateral_accel_ms2: as_f32(raw.get("lateral_accel_ms2")).unwrap_or(0.0),
        longitudinal_accel_ms2: as_f32(raw.get("longitudinal_accel_ms2")).unwrap_or(0.0),
        fuel_liters: as_f32(raw.get("fuel_liters")).unwrap_or(0.0),
        lap_current_s: as_f64(raw.get("lap_current_s")),
        lap_last_s: as_f64(raw.get("lap_last_s")),
        lap_best_s: as_f64(raw.get("lap_best_s")),
        on_pit_road: raw.get("on_pit_road").and_then(Value::as_bool).unwrap_or(false),
        track_name,
        car_name,
        session_kind,
        tires: None,
    })
}
