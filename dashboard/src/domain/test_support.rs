//! Record builders shared by domain unit tests.

use serde_json::json;

use super::{AccessToken, Booking, Listing, Review, User};

pub fn token() -> AccessToken {
    AccessToken::new("h.eyJyb2xlIjoiQURNSU4ifQ.s").expect("token")
}

pub fn listing(id: u64, title: &str) -> Listing {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "description": format!("{title} near campus"),
        "singleOccupancy": 5200,
        "doubleOccupancy": 3900,
        "type": "AC",
        "images": [{ "id": id * 10, "url": format!("/uploads/{id}.jpg") }],
        "user": { "id": 1, "name": "Asha", "email": "asha@example.test", "role": "ADMIN" }
    }))
    .expect("listing decodes")
}

pub fn booking(id: u64) -> Booking {
    serde_json::from_value(json!({
        "id": id,
        "listingId": 3,
        "listing": { "id": 3, "title": "Garden room" },
        "user": { "id": 2, "name": "Ben", "email": "ben@example.test", "role": "STUDENT" },
        "startDate": "2025-01-01T00:00:00Z",
        "endDate": "2025-01-04T00:00:00Z",
        "total": 1500,
        "type": "AC"
    }))
    .expect("booking decodes")
}

pub fn user(id: u64, role: &str) -> User {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("User {id}"),
        "email": format!("user{id}@example.test"),
        "role": role,
        "phone": "9876543210"
    }))
    .expect("user decodes")
}

pub fn review(id: u64, rating: u8) -> Review {
    serde_json::from_value(json!({
        "id": id,
        "content": "Clean and quiet",
        "rating": rating,
        "createdAt": "2025-01-05T00:00:00Z",
        "listing": { "id": 3, "title": "Garden room" },
        "user": { "id": 2, "name": "Ben", "email": "ben@example.test", "role": "STUDENT" }
    }))
    .expect("review decodes")
}
