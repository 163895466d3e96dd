//! Search, ordering and batching over the satellite list.

use std::cmp::Ordering;

use crate::model::Satellite;

/// Ordering applied to the filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Name, case-insensitive.
    #[default]
    Name,
    /// NORAD identifier, ascending.
    Norad,
    /// Last update, newest first.
    Updated,
    /// Keep the order the backend sent.
    Unsorted,
}

impl SortKey {
    /// Interpret a selector value. Unknown values keep the input order.
    #[must_use]
    pub fn from_select(value: &str) -> Self {
        match value {
            "name" => Self::Name,
            "norad" => Self::Norad,
            "updated" => Self::Updated,
            _ => Self::Unsorted,
        }
    }

    /// Selector value for this key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Norad => "norad",
            Self::Updated => "updated",
            Self::Unsorted => "unsorted",
        }
    }

    /// The next key in selector order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Norad,
            Self::Norad => Self::Updated,
            Self::Updated => Self::Unsorted,
            Self::Unsorted => Self::Name,
        }
    }

    /// Compare two satellites under this key.
    #[must_use]
    pub fn compare(self, a: &Satellite, b: &Satellite) -> Ordering {
        match self {
            Self::Name => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
            Self::Norad => a.norad_id.cmp(&b.norad_id),
            // `None` compares lowest, so missing timestamps sink to the end.
            Self::Updated => b.last_updated.cmp(&a.last_updated),
            Self::Unsorted => Ordering::Equal,
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether a satellite matches an already lower-cased search term.
#[must_use]
pub fn matches_search(satellite: &Satellite, term_lower: &str) -> bool {
    term_lower.is_empty()
        || satellite.name.to_lowercase().contains(term_lower)
        || satellite.norad_id.to_string().contains(term_lower)
}

/// Satellites whose name or identifier contains `search`, ignoring case.
#[must_use]
pub fn filter(satellites: &[Satellite], search: &str) -> Vec<Satellite> {
    let term = search.to_lowercase();
    satellites
        .iter()
        .filter(|s| matches_search(s, &term))
        .cloned()
        .collect()
}

/// Stable in-place sort.
pub fn sort(satellites: &mut [Satellite], key: SortKey) {
    if key != SortKey::Unsorted {
        satellites.sort_by(|a, b| key.compare(a, b));
    }
}

/// Identifiers of the first `limit` satellites.
#[must_use]
pub fn position_batch(satellites: &[Satellite], limit: usize) -> Vec<u32> {
    satellites.iter().take(limit).map(|s| s.norad_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
    }

    fn fleet() -> Vec<Satellite> {
        vec![
            Satellite::new(25544, "ISS (ZARYA)", at(2024, 1, 1)),
            Satellite::new(20580, "HST", at(2024, 2, 1)),
            Satellite::new(48274, "CSS (TIANHE)", None),
            Satellite::new(43013, "noaa 20", at(2023, 12, 1)),
            Satellite::new(33591, "NOAA 19", at(2024, 1, 15)),
        ]
    }

    fn names(list: &[Satellite]) -> Vec<&str> {
        list.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_empty_search_returns_everything() {
        let all = fleet();
        assert_eq!(filter(&all, ""), all);
    }

    #[test]
    fn test_search_is_case_insensitive_on_name() {
        let all = fleet();
        assert_eq!(names(&filter(&all, "noaa")), vec!["noaa 20", "NOAA 19"]);
        assert_eq!(names(&filter(&all, "ZaRyA")), vec!["ISS (ZARYA)"]);
    }

    #[test]
    fn test_search_matches_identifier() {
        let all = fleet();
        assert_eq!(names(&filter(&all, "255")), vec!["ISS (ZARYA)"]);
        // "3" appears in two identifiers and no names.
        let hits = filter(&all, "3");
        assert!(hits.iter().all(|s| s.norad_id.to_string().contains('3')));
        assert_eq!(names(&hits), vec!["noaa 20", "NOAA 19"]);
    }

    #[test]
    fn test_filter_is_exact_subset() {
        let all = fleet();
        for term in ["", "a", "SS", "19", "zz", "(", "noaa 2"] {
            let lower = term.to_lowercase();
            let expected: Vec<_> = all
                .iter()
                .filter(|s| {
                    s.name.to_lowercase().contains(&lower)
                        || s.norad_id.to_string().contains(&lower)
                })
                .cloned()
                .collect();
            assert_eq!(filter(&all, term), expected, "term {term:?}");
        }
    }

    #[test]
    fn test_sort_by_name() {
        let mut list = fleet();
        sort(&mut list, SortKey::Name);
        assert_eq!(
            names(&list),
            vec!["CSS (TIANHE)", "HST", "ISS (ZARYA)", "NOAA 19", "noaa 20"]
        );
    }

    #[test]
    fn test_sort_by_norad() {
        let mut list = fleet();
        sort(&mut list, SortKey::Norad);
        let ids: Vec<u32> = list.iter().map(|s| s.norad_id).collect();
        assert_eq!(ids, vec![20580, 25544, 33591, 43013, 48274]);
    }

    #[test]
    fn test_sort_by_updated_newest_first() {
        let mut list = fleet();
        sort(&mut list, SortKey::Updated);
        assert_eq!(
            names(&list),
            vec!["HST", "NOAA 19", "ISS (ZARYA)", "noaa 20", "CSS (TIANHE)"]
        );
        for pair in list.windows(2) {
            assert!(pair[0].last_updated >= pair[1].last_updated);
        }
    }

    #[test]
    fn test_unknown_key_keeps_order() {
        let mut list = fleet();
        sort(&mut list, SortKey::from_select("launch-date"));
        assert_eq!(list, fleet());
    }

    #[test]
    fn test_iss_hubble_example() {
        let sats = vec![
            Satellite::new(1, "ISS", at(2024, 1, 1)),
            Satellite::new(2, "Hubble", at(2024, 2, 1)),
        ];
        let mut by_updated = sats.clone();
        sort(&mut by_updated, SortKey::from_select("updated"));
        assert_eq!(names(&by_updated), vec!["Hubble", "ISS"]);

        assert_eq!(names(&filter(&sats, "iss")), vec!["ISS"]);
    }

    #[test]
    fn test_position_batch_is_capped() {
        let many: Vec<Satellite> = (1..=250)
            .map(|i| Satellite::new(i, format!("SAT {i}"), None))
            .collect();
        let batch = position_batch(&many, 100);
        assert_eq!(batch.len(), 100);
        assert_eq!(batch.first(), Some(&1));
        assert_eq!(batch.last(), Some(&100));

        assert_eq!(position_batch(&many[..3], 100), vec![1, 2, 3]);
        assert!(position_batch(&[], 100).is_empty());
    }

    #[test]
    fn test_sort_key_select_round_trip() {
        for key in [SortKey::Name, SortKey::Norad, SortKey::Updated] {
            assert_eq!(SortKey::from_select(key.as_str()), key);
        }
        assert_eq!(SortKey::from_select(""), SortKey::Unsorted);
    }

    #[test]
    fn test_sort_key_cycle() {
        let mut key = SortKey::Name;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(key);
            key = key.next();
        }
        assert_eq!(key, SortKey::Name);
        assert_eq!(
            seen,
            vec![SortKey::Name, SortKey::Norad, SortKey::Updated, SortKey::Unsorted]
        );
    }
}
