//! Place lookup: labels candidates and ranks cities before districts.

use crate::{
    error::Result,
    model::{PlaceCandidate, PlaceKind, SearchResult},
    provider::PlaceSearch,
};

/// Queries shorter than this never reach the endpoint.
pub const MIN_QUERY_CHARS: usize = 2;

pub async fn search(client: &dyn PlaceSearch, query: &str) -> Result<Vec<SearchResult>> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Ok(Vec::new());
    }

    let candidates = client.lookup(query).await?;
    Ok(rank(candidates))
}

/// Attach labels and order cities first, keeping the endpoint's order within each group.
pub fn rank(candidates: Vec<PlaceCandidate>) -> Vec<SearchResult> {
    let (cities, districts): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .map(|place| SearchResult {
            display_name: display_name(&place),
            kind: classify(&place),
            place,
        })
        .partition(|r| r.kind == PlaceKind::City);

    cities.into_iter().chain(districts).collect()
}

pub fn classify(place: &PlaceCandidate) -> PlaceKind {
    if place.region == place.name { PlaceKind::City } else { PlaceKind::District }
}

/// `name, region, country`, omitting an empty region or one equal to the name.
pub fn display_name(place: &PlaceCandidate) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(3);

    if !place.name.is_empty() {
        parts.push(&place.name);
    }
    if !place.region.is_empty() && place.region != place.name {
        parts.push(&place.region);
    }
    if !place.country.is_empty() {
        parts.push(&place.country);
    }

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeatherError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn place(name: &str, region: &str) -> PlaceCandidate {
        PlaceCandidate {
            id: None,
            name: name.into(),
            region: region.into(),
            country: "Turkey".into(),
            lat: 0.0,
            lon: 0.0,
            url: None,
        }
    }

    #[derive(Debug, Default)]
    struct Offline {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PlaceSearch for Offline {
        async fn lookup(&self, _query: &str) -> Result<Vec<PlaceCandidate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(WeatherError::NetworkUnreachable("offline".into()))
        }
    }

    #[tokio::test]
    async fn short_queries_skip_the_network() {
        let client = Offline::default();

        for q in ["", "a", "ş", "İ"] {
            assert!(search(&client, q).await.unwrap().is_empty());
        }
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn long_queries_hit_the_network() {
        let client = Offline::default();
        let err = search(&client, "an").await.unwrap_err();

        assert!(matches!(err, WeatherError::NetworkUnreachable(_)));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn length_counts_surrounding_whitespace() {
        let client = Offline::default();

        assert!(search(&client, " a").await.is_err());
        assert!(search(&client, "ş ").await.is_err());
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cities_come_before_districts_in_stable_order() {
        let ranked = rank(vec![
            place("Çankaya", "Ankara"),
            place("Ankara", "Ankara"),
            place("Keçiören", "Ankara"),
            place("Bursa", "Bursa"),
        ]);

        let names: Vec<_> = ranked.iter().map(|r| r.place.name.as_str()).collect();
        assert_eq!(names, ["Ankara", "Bursa", "Çankaya", "Keçiören"]);
        assert_eq!(ranked[0].kind, PlaceKind::City);
        assert_eq!(ranked[3].kind, PlaceKind::District);
    }

    #[test]
    fn display_name_skips_duplicate_or_empty_region() {
        assert_eq!(display_name(&place("Ankara", "Ankara")), "Ankara, Turkey");
        assert_eq!(display_name(&place("Çankaya", "Ankara")), "Çankaya, Ankara, Turkey");
        assert_eq!(display_name(&place("Nicosia", "")), "Nicosia, Turkey");
    }
}
