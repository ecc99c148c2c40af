//! Value objects supplied by the catalog: shows, seats, screens, users.
//!
//! These are immutable after construction. The reservation core only ever
//! refers to them by id.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a show (one screening of a movie on a screen).
    ShowId
);
numeric_id!(
    /// Identifier of a physical seat.
    SeatId
);
numeric_id!(
    /// Identifier of a screen inside a theatre.
    ScreenId
);
numeric_id!(
    /// Identifier of a movie.
    MovieId
);

/// Identifier of the user holding locks and owning bookings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identifier (email, session id, account id).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of a booking, generated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pricing tier of a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatCategory {
    /// Premium front row.
    Platinum,
    /// Mid-tier.
    Gold,
    /// Standard.
    Silver,
}

/// A physical seat on a screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seat {
    /// Seat identifier.
    pub id: SeatId,
    /// Row number.
    pub row: u32,
    /// Pricing tier.
    pub category: SeatCategory,
    /// Price in minor currency units.
    pub price: u32,
}

/// A screen and the seats it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    /// Screen identifier.
    pub id: ScreenId,
    /// Display name.
    pub name: String,
    /// All seats on the screen.
    pub seats: Vec<Seat>,
}

/// A single screening.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Show {
    /// Show identifier.
    pub id: ShowId,
    /// Movie being screened.
    pub movie: MovieId,
    /// Screen it runs on.
    pub screen: ScreenId,
    /// Start time in milliseconds since epoch.
    pub start_time_ms: u128,
    /// Running time in seconds.
    pub duration_secs: u32,
}

/// An authenticated customer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
}

impl User {
    /// Build a user whose id is its email address.
    #[must_use]
    pub fn with_email(name: impl Into<String>, email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            id: UserId::new(email.clone()),
            name: name.into(),
            email,
        }
    }
}
