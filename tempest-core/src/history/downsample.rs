use chrono::Duration;

use crate::model::Observation;

/// Keeps the first observation at or after each boundary, starting from the
/// first timestamp and moving the boundary to `kept + interval` each time.
///
/// Input must be in ascending timestamp order. Gaps between kept points are
/// never shorter than `interval`. Callers skip this for non-positive
/// intervals.
pub fn downsample(observations: Vec<Observation>, interval: Duration) -> Vec<Observation> {
    let Some(first) = observations.first() else {
        return observations;
    };

    let mut boundary = first.timestamp;
    let mut kept = Vec::new();

    for obs in observations {
        if obs.timestamp < boundary {
            continue;
        }
        boundary = obs.timestamp + interval;
        kept.push(obs);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn minutes(offsets: &[i64]) -> Vec<Observation> {
        let base = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        offsets
            .iter()
            .map(|&m| {
                let mut obs = Observation::at(base + Duration::minutes(m));
                obs.air_temperature = m as f64;
                obs
            })
            .collect()
    }

    fn offsets(obs: &[Observation]) -> Vec<i64> {
        obs.iter().map(|o| o.air_temperature as i64).collect()
    }

    #[test]
    fn one_minute_data_to_five_minutes() {
        let obs = minutes(&(0..60).collect::<Vec<i64>>());

        let result = downsample(obs, Duration::minutes(5));

        assert!((10..=14).contains(&result.len()), "got {}", result.len());
        assert_eq!(result[0].air_temperature, 0.0);
        assert_eq!(offsets(&result), (0..60).step_by(5).collect::<Vec<i64>>());
    }

    #[test]
    fn empty_input() {
        assert!(downsample(Vec::new(), Duration::minutes(5)).is_empty());
    }

    #[test]
    fn irregular_spacing_never_shortens_gaps() {
        let obs = minutes(&[0, 3, 6, 7, 11, 12, 30, 31, 36]);

        let result = downsample(obs, Duration::minutes(5));

        assert_eq!(offsets(&result), vec![0, 6, 11, 30, 36]);
        for pair in result.windows(2) {
            assert!(pair[1].timestamp - pair[0].timestamp >= Duration::minutes(5));
        }
    }

    #[test]
    fn idempotent_at_the_same_interval() {
        let obs = minutes(&[0, 1, 2, 4, 5, 9, 10, 14, 16, 20, 21]);

        let once = downsample(obs, Duration::minutes(5));
        let twice = downsample(once.clone(), Duration::minutes(5));

        assert_eq!(once, twice);
    }
}
