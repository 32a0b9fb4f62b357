use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use super::Trip;

/// A (city, country) pair ranked by how often it appears across trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteDestination {
    pub city: String,
    pub country: String,
    pub visits: usize,
}

/// Aggregate statistics over the whole trip collection.
///
/// Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelInsights {
    pub total_trips: usize,
    pub total_days_traveled: i64,
    pub total_spent: f64,
    pub favorite_destinations: Vec<FavoriteDestination>,
}

impl TravelInsights {
    /// Compute over `trips`, keeping the `top_n` most-visited destinations.
    pub fn compute<'a>(trips: impl IntoIterator<Item = &'a Trip>, top_n: usize) -> Self {
        let mut total_trips = 0;
        let mut total_days_traveled = 0;
        let mut total_spent = 0.0;
        let mut visits: HashMap<(String, String), usize> = HashMap::new();

        for trip in trips {
            total_trips += 1;
            total_days_traveled += trip.duration_days();
            total_spent += trip.total_spent();
            for destination in &trip.destinations {
                *visits
                    .entry((destination.city.clone(), destination.country.clone()))
                    .or_default() += 1;
            }
        }

        let favorite_destinations = visits
            .into_iter()
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
            .take(top_n)
            .map(|((city, country), visits)| FavoriteDestination {
                city,
                country,
                visits,
            })
            .collect();

        Self {
            total_trips,
            total_days_traveled,
            total_spent,
            favorite_destinations,
        }
    }
}
