use crate::models::PlaceRecord;

const UNKNOWN: &str = "Unknown";
const NO_RATING: &str = "No rating";
const NO_REVIEWS: &str = "No reviews";
const NO_PRICE_LEVEL: &str = "N/A";

/// Render places as one prompt line each, in input order
pub fn format_places(places: &[PlaceRecord]) -> String {
    places
        .iter()
        .map(format_place)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_place(place: &PlaceRecord) -> String {
    let rating = place
        .rating
        .map_or_else(|| NO_RATING.to_string(), |r| r.to_string());
    let reviews = place
        .user_ratings_total
        .map_or_else(|| NO_REVIEWS.to_string(), |n| n.to_string());

    format!(
        "Name: {}, Address: {}, Rating: {}, Total Reviews: {}, Price Level: {}",
        single_line(place.display_name.as_deref().unwrap_or(UNKNOWN)),
        single_line(place.formatted_address.as_deref().unwrap_or(UNKNOWN)),
        rating,
        reviews,
        single_line(place.price_level.as_deref().unwrap_or(NO_PRICE_LEVEL)),
    )
}

/// Upstream text may carry line breaks; each place must stay on one line
fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.trim().is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
}
