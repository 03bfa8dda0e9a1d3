/// A session's time lost to mistakes, normalized to a 0..=1 "how clean was
/// this session" figure. Not specified numerically by the interface; this
/// treats total mistake time loss as a fraction of session duration and
/// inverts it, floored at zero once mistakes exceed the whole session.
pub fn session_score(total_time_lost_s: f64, duration_s: f64) -> f32 {
    let duration = duration_s.max(1.0);
    (1.0 - (total_time_lost_s / duration)).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_session_scores_near_one() {
        assert!(session_score(0.0, 600.0) > 0.99);
    }

    #[test]
    fn heavy_time_loss_floors_at_zero() {
        assert_eq!(session_score(1000.0, 10.0), 0.0);
    }
}
