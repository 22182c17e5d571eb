//! Read-only projections of backend entities.
//!
//! These types mirror the JSON the StudentStay REST backend returns (camelCase
//! keys). The dashboard never mutates them locally; it displays, filters and
//! caches them, and refetches after mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ExistingImage, Role};

/// Backend identifier for listings, bookings, users and reviews.
pub type RecordId = u64;

/// Air-conditioning category of a room listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoomType {
    /// Air-conditioned.
    #[default]
    #[serde(rename = "AC")]
    Ac,
    /// Not air-conditioned.
    #[serde(rename = "NonAC")]
    NonAc,
    /// Both variants available.
    #[serde(rename = "Both")]
    Both,
}

impl RoomType {
    /// Wire value used in multipart forms and filters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ac => "AC",
            Self::NonAc => "NonAC",
            Self::Both => "Both",
        }
    }

    /// Parse a wire value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "AC" => Some(Self::Ac),
            "NonAC" => Some(Self::NonAc),
            "Both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// Minimal user reference embedded in other records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Minimal listing reference embedded in bookings and reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRef {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub single_occupancy: f64,
    #[serde(default)]
    pub double_occupancy: f64,
    #[serde(default)]
    pub images: Vec<ExistingImage>,
    #[serde(rename = "type", default)]
    pub room_type: Option<RoomType>,
}

/// A room listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub single_occupancy: f64,
    pub double_occupancy: f64,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    #[serde(default)]
    pub images: Vec<ExistingImage>,
    pub user: UserRef,
    #[serde(default)]
    pub bookings: Vec<serde_json::Value>,
    #[serde(default)]
    pub reviews: Vec<serde_json::Value>,
}

/// A booking made by a student or alumnus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: RecordId,
    pub listing_id: RecordId,
    pub listing: ListingRef,
    pub user: UserRef,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total: f64,
    #[serde(rename = "type")]
    pub room_type: RoomType,
}

impl Booking {
    /// Nights covered by the booking, rounded up.
    pub fn nights(&self) -> i64 {
        const DAY_MS: i64 = 24 * 60 * 60 * 1000;
        let millis = (self.end_date - self.start_date).num_milliseconds().abs();
        (millis + DAY_MS - 1) / DAY_MS
    }
}

/// A platform user as listed for administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub listings: Vec<serde_json::Value>,
    #[serde(default)]
    pub bookings: Vec<serde_json::Value>,
    #[serde(default)]
    pub reviews: Vec<serde_json::Value>,
}

/// A review left on a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: RecordId,
    pub content: String,
    pub rating: u8,
    pub created_at: DateTime<Utc>,
    pub listing: ListingRef,
    pub user: UserRef,
}

/// Platform-wide totals shown on the overview.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub booking: u64,
    pub users: u64,
    pub listings: u64,
    pub total_revenue: f64,
}

/// Records addressable by backend id.
pub trait Identified {
    /// Backend id of the record.
    fn record_id(&self) -> RecordId;
}

macro_rules! impl_identified {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identified for $ty {
                fn record_id(&self) -> RecordId {
                    self.id
                }
            }
        )*
    };
}

impl_identified!(Listing, Booking, User, Review);
