/// Great-circle distance in kilometers between two points.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let r = 6371.0; // Earth's radius in km
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    r * c
}

/// Filter candidates to those within `radius_km` of the origin, sorted by
/// distance ascending and capped at `limit`. Each survivor is returned with
/// its computed distance for display.
pub fn nearest_within<T, F>(
    origin: (f64, f64),
    radius_km: f64,
    limit: usize,
    candidates: Vec<T>,
    coords: F,
) -> Vec<(T, f64)>
where
    F: Fn(&T) -> Option<(f64, f64)>,
{
    let mut hits: Vec<(T, f64)> = candidates
        .into_iter()
        .filter_map(|item| {
            let (lat, lng) = coords(&item)?;
            let distance = haversine_km(origin.0, origin.1, lat, lng);
            (distance <= radius_km).then_some((item, distance))
        })
        .collect();

    hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lagos Island to Ikeja is roughly 16-17 km as the crow flies.
    const LAGOS_ISLAND: (f64, f64) = (6.4541, 3.3947);
    const IKEJA: (f64, f64) = (6.6018, 3.3515);

    #[test]
    fn known_distance_is_close() {
        let d = haversine_km(LAGOS_ISLAND.0, LAGOS_ISLAND.1, IKEJA.0, IKEJA.1);
        assert!((15.0..19.0).contains(&d), "got {}", d);
    }

    #[test]
    fn zero_distance_for_same_point() {
        let d = haversine_km(IKEJA.0, IKEJA.1, IKEJA.0, IKEJA.1);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn radius_excludes_points_just_beyond_it() {
        // ~0.1 degree of latitude is ~11.1 km
        let candidates = vec![
            ("co-located", 6.4541, 3.3947),
            ("within", 6.5000, 3.3947),
            ("beyond", 6.5600, 3.3947),
        ];
        let hits = nearest_within(LAGOS_ISLAND, 10.0, 50, candidates, |c| Some((c.1, c.2)));

        let names: Vec<&str> = hits.iter().map(|(c, _)| c.0).collect();
        assert_eq!(names, vec!["co-located", "within"]);
    }

    #[test]
    fn co_located_sorts_first_and_limit_caps() {
        let candidates = vec![
            ("far", 6.5000, 3.3947),
            ("here", 6.4541, 3.3947),
            ("near", 6.4600, 3.3947),
        ];
        let hits = nearest_within(LAGOS_ISLAND, 10.0, 2, candidates, |c| Some((c.1, c.2)));

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0 .0, "here");
        assert!(hits[0].1.abs() < 1e-9);
        assert_eq!(hits[1].0 .0, "near");
    }

    #[test]
    fn candidates_without_coordinates_are_skipped() {
        let candidates = vec![("no-coords", None), ("here", Some((6.4541, 3.3947)))];
        let hits = nearest_within(LAGOS_ISLAND, 10.0, 10, candidates, |c| c.1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0 .0, "here");
    }
}
