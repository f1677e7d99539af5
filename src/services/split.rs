//! Even-split arithmetic over a single trip.
//!
//! Every member owes the same share, `total_expense / members.len()`. A
//! member's net balance is what they paid minus that share: positive means
//! the group owes them, negative means they owe the group.
//!
//! Duplicate member names count towards the divisor but show up once in the
//! results. Expenses paid by someone outside the member list raise the total
//! without being credited to anybody; [`TripSummary::unattributed`] reports
//! that amount.

use serde::Serialize;

use crate::{
    models::trip::{MemberAmount, Trip},
    services::store::TripStore,
};

pub fn share_per_member(trip: &Trip) -> Option<f64> {
    if trip.members.is_empty() {
        return None;
    }
    Some(trip.total_expense / trip.members.len() as f64)
}

pub fn shares(trip: &Trip) -> Vec<MemberAmount> {
    let Some(share) = share_per_member(trip) else {
        return Vec::new();
    };
    trip.distinct_members()
        .into_iter()
        .map(|member| MemberAmount::new(member, share))
        .collect()
}

pub fn give_receive(trip: &Trip) -> Vec<MemberAmount> {
    let Some(share) = share_per_member(trip) else {
        return Vec::new();
    };
    trip.distinct_members()
        .into_iter()
        .map(|member| MemberAmount::new(member, trip.paid_by(member) - share))
        .collect()
}

/// Shares for `trip_name`; empty when the trip is unknown or has no members.
pub fn calculate_shares(store: &TripStore, trip_name: &str) -> Vec<MemberAmount> {
    store.trip(trip_name).map(shares).unwrap_or_default()
}

/// Net balances for `trip_name`; empty when the trip is unknown or has no members.
pub fn calculate_give_receive(store: &TripStore, trip_name: &str) -> Vec<MemberAmount> {
    store.trip(trip_name).map(give_receive).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberBalance {
    pub member: String,
    pub paid: f64,
    pub share: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSummary {
    pub total_expense: f64,
    pub member_count: usize,
    pub share: Option<f64>,
    pub balances: Vec<MemberBalance>,
    pub unattributed: f64,
}

pub fn summarize(trip: &Trip) -> TripSummary {
    let share = share_per_member(trip);
    let balances = match share {
        Some(share) => trip
            .distinct_members()
            .into_iter()
            .map(|member| {
                let paid = trip.paid_by(member);
                MemberBalance {
                    member: member.to_string(),
                    paid,
                    share,
                    net: paid - share,
                }
            })
            .collect(),
        None => Vec::new(),
    };
    let unattributed = trip
        .expenses
        .iter()
        .filter(|expense| !trip.has_member(&expense.member))
        .map(|expense| expense.amount)
        .sum();

    TripSummary {
        total_expense: trip.total_expense,
        member_count: trip.members.len(),
        share,
        balances,
        unattributed,
    }
}
