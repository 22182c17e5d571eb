//! Page view models: filtering and summary statistics.
//!
//! Filters always run over the full cached collection; statistics are
//! computed over the unfiltered collection so the header cards do not change
//! while the admin searches.

use serde::{Deserialize, Serialize};

use super::{Booking, Counts, Listing, Review, Role, RoomType, User};

/// Number of rows in the overview's "recent" panels.
pub const RECENT_LIMIT: usize = 4;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// `all` or a concrete room type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(RoomType),
}

impl TypeFilter {
    /// Parse a query value; anything unrecognised means `all`.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(RoomType::parse).map_or(Self::All, Self::Only)
    }

    fn matches(self, room_type: RoomType) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == room_type,
        }
    }
}

/// `all` or a concrete role.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoleFilter {
    #[default]
    All,
    Only(Role),
}

impl RoleFilter {
    /// Parse a query value; `all`, `all-role` and blank mean every role.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("" | "all" | "all-role") => Self::All,
            Some(role) => Self::Only(Role::parse(role)),
        }
    }

    fn matches(&self, role: &Role) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == role,
        }
    }
}

/// Raw page query string shared by every list page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, rename = "type")]
    pub room_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
}

impl PageQuery {
    fn needle(&self) -> String {
        self.search
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_lowercase()
    }

    fn type_filter(&self) -> TypeFilter {
        TypeFilter::parse(self.room_type.as_deref())
    }

    fn role_filter(&self) -> RoleFilter {
        RoleFilter::parse(self.role.as_deref())
    }

    fn rating_filter(&self) -> Option<u8> {
        self.rating
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u8>().ok())
            .filter(|rating| (1..=5).contains(rating))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingStats {
    pub total: usize,
    pub ac: usize,
    pub non_ac: usize,
    pub both: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingsView {
    pub stats: ListingStats,
    pub listings: Vec<Listing>,
}

/// Listings page: search over title, description and owner name.
pub fn listings_view(listings: &[Listing], query: &PageQuery) -> ListingsView {
    let count = |room_type: RoomType| listings.iter().filter(|l| l.room_type == room_type).count();
    let stats = ListingStats {
        total: listings.len(),
        ac: count(RoomType::Ac),
        non_ac: count(RoomType::NonAc),
        both: count(RoomType::Both),
    };
    let needle = query.needle();
    let type_filter = query.type_filter();
    let listings = listings
        .iter()
        .filter(|listing| {
            (contains_ci(&listing.title, &needle)
                || contains_ci(&listing.description, &needle)
                || contains_ci(&listing.user.name, &needle))
                && type_filter.matches(listing.room_type)
        })
        .cloned()
        .collect();
    ListingsView { stats, listings }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub total_bookings: usize,
    pub ac_bookings: usize,
    pub non_ac_bookings: usize,
    pub total_revenue: f64,
}

/// A booking row with its derived stay length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRow {
    #[serde(flatten)]
    pub booking: Booking,
    pub nights: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingsView {
    pub stats: BookingStats,
    pub bookings: Vec<BookingRow>,
}

/// Bookings page: search over guest name or booking id.
pub fn bookings_view(bookings: &[Booking], query: &PageQuery) -> BookingsView {
    let stats = BookingStats {
        total_bookings: bookings.len(),
        ac_bookings: bookings.iter().filter(|b| b.room_type == RoomType::Ac).count(),
        non_ac_bookings: bookings
            .iter()
            .filter(|b| b.room_type == RoomType::NonAc)
            .count(),
        total_revenue: bookings.iter().map(|b| b.total).sum(),
    };
    let needle = query.needle();
    let type_filter = query.type_filter();
    let role_filter = query.role_filter();
    let bookings = bookings
        .iter()
        .filter(|booking| {
            (contains_ci(&booking.user.name, &needle) || booking.id.to_string().contains(&needle))
                && type_filter.matches(booking.room_type)
                && role_filter.matches(&booking.user.role)
        })
        .map(|booking| BookingRow {
            nights: booking.nights(),
            booking: booking.clone(),
        })
        .collect();
    BookingsView { stats, bookings }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: usize,
    pub students: usize,
    pub alumni: usize,
    pub admins: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsersView {
    pub stats: UserStats,
    pub users: Vec<User>,
}

/// Users page: search over name only.
pub fn users_view(users: &[User], query: &PageQuery) -> UsersView {
    let count = |role: Role| users.iter().filter(|u| u.role == role).count();
    let stats = UserStats {
        total_users: users.len(),
        students: count(Role::Student),
        alumni: count(Role::Alumni),
        admins: count(Role::Admin),
    };
    let needle = query.needle();
    let users = users
        .iter()
        .filter(|user| contains_ci(&user.name, &needle))
        .cloned()
        .collect();
    UsersView { stats, users }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_reviews: usize,
    /// Mean rating rounded to one decimal; `0` without reviews.
    pub average_rating: f64,
    pub five_stars: usize,
    pub four_stars: usize,
    pub three_stars: usize,
    pub two_stars: usize,
    pub one_stars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewsView {
    pub stats: ReviewStats,
    pub reviews: Vec<Review>,
}

/// Reviews page: search over content, reviewer name and listing title.
pub fn reviews_view(reviews: &[Review], query: &PageQuery) -> ReviewsView {
    let stars = |rating: u8| reviews.iter().filter(|r| r.rating == rating).count();
    let average_rating = if reviews.is_empty() {
        0.0
    } else {
        let sum: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
        let mean = sum / reviews.len() as f64;
        (mean * 10.0).round() / 10.0
    };
    let stats = ReviewStats {
        total_reviews: reviews.len(),
        average_rating,
        five_stars: stars(5),
        four_stars: stars(4),
        three_stars: stars(3),
        two_stars: stars(2),
        one_stars: stars(1),
    };
    let needle = query.needle();
    let rating = query.rating_filter();
    let role_filter = query.role_filter();
    let reviews = reviews
        .iter()
        .filter(|review| {
            (contains_ci(&review.content, &needle)
                || contains_ci(&review.user.name, &needle)
                || contains_ci(&review.listing.title, &needle))
                && rating.is_none_or(|wanted| review.rating == wanted)
                && role_filter.matches(&review.user.role)
        })
        .cloned()
        .collect();
    ReviewsView { stats, reviews }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDistribution {
    pub student_percentage: f64,
    pub alumni_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewView {
    pub counts: Counts,
    pub distribution: UserDistribution,
    pub recent_bookings: Vec<Booking>,
    pub recent_listings: Vec<Listing>,
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ratio = part as f64 / total as f64;
    ratio * 100.0
}

fn most_recent<T: Clone>(items: &[T]) -> Vec<T> {
    items.iter().rev().take(RECENT_LIMIT).cloned().collect()
}

/// Dashboard home: totals, user mix and the latest activity.
pub fn overview(
    counts: Counts,
    users: &[User],
    bookings: &[Booking],
    listings: &[Listing],
) -> OverviewView {
    let students = users.iter().filter(|u| u.role == Role::Student).count();
    let alumni = users.iter().filter(|u| u.role == Role::Alumni).count();
    OverviewView {
        counts,
        distribution: UserDistribution {
            student_percentage: percentage(students, users.len()),
            alumni_percentage: percentage(alumni, users.len()),
        },
        recent_bookings: most_recent(bookings),
        recent_listings: most_recent(listings),
    }
}
