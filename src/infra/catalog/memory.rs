//! In-memory catalog backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::core::{
    Catalog, Entity, MovieId, ReservationError, ReservationResult, Screen, ScreenId, Seat,
    SeatCategory, SeatId, Show, ShowId,
};

/// Simple in-memory catalog for development/testing.
///
/// Ids handed out by the `create_*` helpers start at 1 and are unique per
/// kind.
pub struct InMemoryCatalog {
    screens: RwLock<HashMap<ScreenId, Screen>>,
    shows: RwLock<HashMap<ShowId, Show>>,
    next_screen: AtomicU64,
    next_seat: AtomicU64,
    next_show: AtomicU64,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            screens: RwLock::new(HashMap::new()),
            shows: RwLock::new(HashMap::new()),
            next_screen: AtomicU64::new(0),
            next_seat: AtomicU64::new(0),
            next_show: AtomicU64::new(0),
        }
    }

    /// Register a screen with no seats.
    pub fn create_screen(&self, name: impl Into<String>) -> ScreenId {
        let id = ScreenId(self.next_screen.fetch_add(1, Ordering::Relaxed) + 1);
        self.screens.write().insert(
            id,
            Screen {
                id,
                name: name.into(),
                seats: Vec::new(),
            },
        );
        id
    }

    /// Add a seat to a screen.
    ///
    /// # Errors
    ///
    /// [`ReservationError::NotFound`] for an unknown screen.
    pub fn create_seat(
        &self,
        screen: ScreenId,
        row: u32,
        category: SeatCategory,
        price: u32,
    ) -> ReservationResult<SeatId> {
        let mut screens = self.screens.write();
        let screen = screens
            .get_mut(&screen)
            .ok_or_else(|| ReservationError::not_found(Entity::Screen, screen))?;
        let id = SeatId(self.next_seat.fetch_add(1, Ordering::Relaxed) + 1);
        screen.seats.push(Seat {
            id,
            row,
            category,
            price,
        });
        Ok(id)
    }

    /// Schedule a show on a screen.
    ///
    /// # Errors
    ///
    /// [`ReservationError::NotFound`] for an unknown screen.
    pub fn create_show(
        &self,
        movie: MovieId,
        screen: ScreenId,
        start_time_ms: u128,
        duration_secs: u32,
    ) -> ReservationResult<ShowId> {
        if !self.screens.read().contains_key(&screen) {
            return Err(ReservationError::not_found(Entity::Screen, screen));
        }
        let id = ShowId(self.next_show.fetch_add(1, Ordering::Relaxed) + 1);
        self.shows.write().insert(
            id,
            Show {
                id,
                movie,
                screen,
                start_time_ms,
                duration_secs,
            },
        );
        Ok(id)
    }

    /// Insert a fully built screen, replacing any with the same id.
    pub fn insert_screen(&self, screen: Screen) {
        self.screens.write().insert(screen.id, screen);
    }

    /// Insert a fully built show, replacing any with the same id.
    pub fn insert_show(&self, show: Show) {
        self.shows.write().insert(show.id, show);
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog for InMemoryCatalog {
    fn show(&self, id: ShowId) -> ReservationResult<Show> {
        self.shows
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| ReservationError::not_found(Entity::Show, id))
    }

    fn seats_for_show(&self, id: ShowId) -> ReservationResult<Vec<Seat>> {
        let show = self.show(id)?;
        self.screens
            .read()
            .get(&show.screen)
            .map(|screen| screen.seats.clone())
            .ok_or_else(|| ReservationError::not_found(Entity::Screen, show.screen))
    }
}
