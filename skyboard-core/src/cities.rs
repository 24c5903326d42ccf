use crate::model::Location;

/// Cities offered as search suggestions.
pub const CITY_NAMES: &[&str] = &[
    "Madrid",
    "Barcelona",
    "Valencia",
    "Sevilla",
    "Zaragoza",
    "Málaga",
    "Bilbao",
    "Palma",
    "Las Palmas",
    "Alicante",
    "Granada",
    "Salamanca",
    "Santander",
    "Lisboa",
    "Porto",
    "London",
    "Manchester",
    "Dublin",
    "Paris",
    "Marseille",
    "Lyon",
    "Berlin",
    "Munich",
    "Hamburg",
    "Amsterdam",
    "Brussels",
    "Vienna",
    "Zurich",
    "Rome",
    "Milan",
    "Naples",
    "Athens",
    "Stockholm",
    "Oslo",
    "Copenhagen",
    "Helsinki",
    "Warsaw",
    "Prague",
    "Budapest",
    "Istanbul",
    "Moscow",
    "Cairo",
    "Marrakech",
    "Lagos",
    "Nairobi",
    "Cape Town",
    "Dubai",
    "Mumbai",
    "New Delhi",
    "Bangkok",
    "Singapore",
    "Hong Kong",
    "Shanghai",
    "Beijing",
    "Seoul",
    "Tokyo",
    "Osaka",
    "Sydney",
    "Melbourne",
    "Auckland",
    "Honolulu",
    "Los Angeles",
    "San Francisco",
    "Seattle",
    "Vancouver",
    "Chicago",
    "Toronto",
    "Montreal",
    "New York",
    "Boston",
    "Miami",
    "Mexico City",
    "Havana",
    "Bogotá",
    "Lima",
    "Quito",
    "Santiago",
    "Buenos Aires",
    "São Paulo",
    "Rio de Janeiro",
];

/// The fixed set shown on the popular-cities panel.
pub fn popular_cities() -> Vec<Location> {
    [
        ("Madrid", "ES"),
        ("New York", "US"),
        ("Tokyo", "JP"),
        ("London", "GB"),
        ("Paris", "FR"),
        ("Sydney", "AU"),
        ("Dubai", "AE"),
        ("Singapore", "SG"),
    ]
    .into_iter()
    .map(|(name, country)| Location::with_country(name, country))
    .collect()
}

/// Case-insensitive substring match over [`CITY_NAMES`], in catalogue order.
pub fn suggest(query: &str, limit: usize) -> Vec<&'static str> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    CITY_NAMES
        .iter()
        .copied()
        .filter(|city| city.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}
