/// Turns focus-area descriptions into short actionable lines. The
/// descriptions already name the corner and mistake type (see
/// `MistakePattern::description`); this just phrases them as advice.
pub fn recommendations_for(focus_areas: &[String]) -> Vec<String> {
    focus_areas
        .iter()
        .map(|area| format!("Focus on: {area}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_each_area_as_a_recommendation() {
        let areas = vec!["LateBrake at turn_1".to_string()];
        assert_eq!(recommendations_for(&areas), vec!["Focus on: LateBrake at turn_1".to_string()]);
    }
}
