use tracing::debug;

use crate::models::trip::{Expense, Trip};

/// All trips of one session, in creation order, plus the trip currently
/// shown on the dashboard.
#[derive(Debug, Clone, Default)]
pub struct TripStore {
    trips: Vec<Trip>,
    current: Option<String>,
}

impl TripStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn trip(&self, name: &str) -> Option<&Trip> {
        self.trips.iter().find(|trip| trip.name == name)
    }

    fn trip_mut(&mut self, name: &str) -> Option<&mut Trip> {
        self.trips.iter_mut().find(|trip| trip.name == name)
    }

    pub fn trip_names(&self) -> Vec<&str> {
        self.trips.iter().map(|trip| trip.name.as_str()).collect()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_trip(&self) -> Option<&Trip> {
        self.current().and_then(|name| self.trip(name))
    }

    /// Inserts an empty trip. Empty or already used names are ignored and
    /// the existing trip keeps its state.
    pub fn add_trip(&mut self, name: &str) -> bool {
        if name.is_empty() || self.trip(name).is_some() {
            debug!(trip = name, "add_trip ignored");
            return false;
        }
        self.trips.push(Trip::new(name));
        true
    }

    pub fn delete_trip(&mut self, name: &str) -> bool {
        let Some(index) = self.trips.iter().position(|trip| trip.name == name) else {
            debug!(trip = name, "delete_trip ignored, no such trip");
            return false;
        };
        self.trips.remove(index);
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        true
    }

    /// Sets the selection without checking that the trip exists.
    pub fn switch_trip(&mut self, name: &str) {
        self.current = Some(name.to_string());
    }

    /// Falls back to the first trip when nothing valid is selected.
    pub fn ensure_selection(&mut self) -> Option<&str> {
        let valid = self
            .current
            .as_deref()
            .is_some_and(|name| self.trip(name).is_some());
        if !valid {
            self.current = self.trips.first().map(|trip| trip.name.clone());
        }
        self.current.as_deref()
    }

    /// Appends a member; duplicate names are kept as-is.
    pub fn add_member(&mut self, trip_name: &str, member: &str) -> bool {
        if member.is_empty() {
            debug!(trip = trip_name, "add_member ignored, empty member name");
            return false;
        }
        match self.trip_mut(trip_name) {
            Some(trip) => {
                trip.members.push(member.to_string());
                true
            }
            None => {
                debug!(trip = trip_name, "add_member ignored, no such trip");
                false
            }
        }
    }

    /// Records an expense and bumps the running total. The payer is not
    /// checked against the member list and the amount is trusted.
    pub fn add_expense(
        &mut self,
        trip_name: &str,
        member: &str,
        description: &str,
        amount: f64,
    ) -> bool {
        let Some(trip) = self.trip_mut(trip_name) else {
            debug!(trip = trip_name, "add_expense ignored, no such trip");
            return false;
        };
        trip.expenses.push(Expense {
            member: member.to_string(),
            description: description.to_string(),
            amount,
        });
        trip.total_expense += amount;
        true
    }
}
