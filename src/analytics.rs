//! Derived, read-only views over the store contents.
//!
//! Everything here is a pure function of the records passed in; the store
//! takes a fresh snapshot on every call and nothing is cached.

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{Donation, Event, EventStatus, Member, Program, ProgramStatus, Role};

/// Illustrative growth figures shown on the dashboard for the months
/// before the live member count.
const GROWTH_HISTORY: [(&str, usize); 5] = [
    ("Jan", 1050),
    ("Feb", 1120),
    ("Mar", 1180),
    ("Apr", 1210),
    ("May", 1235),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub month: String,
    pub members: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_members: usize,
    pub active_members: usize,
    pub total_donations: f64,
    pub monthly_donations: f64,
    pub upcoming_events: usize,
    pub active_programs: usize,
    pub member_growth: Vec<GrowthPoint>,
}

/// Same calendar month of the same year.
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Same month number in any year. The dashboard's monthly donation card
/// has always counted this way.
pub fn same_month_any_year(a: NaiveDate, b: NaiveDate) -> bool {
    a.month() == b.month()
}

// Folding from +0.0 keeps empty sums from serializing as `-0.0`.
fn total<'a>(donations: impl Iterator<Item = &'a Donation>) -> f64 {
    donations.fold(0.0, |acc, d| acc + d.amount)
}

pub fn summarize(
    members: &[Member],
    events: &[Event],
    donations: &[Donation],
    programs: &[Program],
    today: NaiveDate,
) -> Analytics {
    let mut member_growth: Vec<GrowthPoint> = GROWTH_HISTORY
        .iter()
        .map(|(month, count)| GrowthPoint {
            month: (*month).to_string(),
            members: *count,
        })
        .collect();
    member_growth.push(GrowthPoint {
        month: "Jun".to_string(),
        members: members.len(),
    });

    Analytics {
        total_members: members.len(),
        active_members: members.iter().filter(|m| m.is_active).count(),
        total_donations: total(donations.iter()),
        monthly_donations: total(
            donations
                .iter()
                .filter(|d| same_month_any_year(d.date, today)),
        ),
        upcoming_events: events
            .iter()
            .filter(|e| e.status == EventStatus::Upcoming)
            .count(),
        active_programs: programs
            .iter()
            .filter(|p| p.status == ProgramStatus::Active)
            .count(),
        member_growth,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub total: usize,
    pub active: usize,
    pub volunteers: usize,
    pub new_this_month: usize,
}

pub fn member_stats(members: &[Member], today: NaiveDate) -> MemberStats {
    MemberStats {
        total: members.len(),
        active: members.iter().filter(|m| m.is_active).count(),
        volunteers: members.iter().filter(|m| m.role == Role::Volunteer).count(),
        new_this_month: members
            .iter()
            .filter(|m| same_month(m.join_date, today))
            .count(),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationStats {
    pub count: usize,
    pub total: f64,
    /// Mean amount rounded to a whole unit, 0 when there are no donations.
    pub average: f64,
}

pub fn donation_stats(donations: &[Donation]) -> DonationStats {
    let sum = total(donations.iter());
    let average = if donations.is_empty() {
        0.0
    } else {
        (sum / donations.len() as f64).round()
    };
    DonationStats {
        count: donations.len(),
        total: sum,
        average,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedDonor {
    pub rank: usize,
    pub member: Member,
}

/// Members ordered by their donation counter, highest first.
pub fn top_donors(members: &[Member], limit: usize) -> Vec<RankedDonor> {
    let mut sorted = members.to_vec();
    sorted.sort_by(|a, b| b.donations.total_cmp(&a.donations));
    sorted
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, member)| RankedDonor { rank: i + 1, member })
        .collect()
}

pub fn donated_by(member_id: &str, donations: &[Donation]) -> f64 {
    total(donations.iter().filter(|d| d.donor_id == member_id))
}

/// Side-by-side view of a member's donation counter and the donations
/// actually recorded against them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberLedger {
    pub member_id: String,
    pub member_name: String,
    /// Value of `Member::donations`.
    pub recorded_total: f64,
    /// Sum of donation amounts whose `donor_id` is this member.
    pub donation_total: f64,
    pub donation_count: usize,
    /// `recorded_total - donation_total`.
    pub difference: f64,
}

impl MemberLedger {
    pub fn compute(member: &Member, donations: &[Donation]) -> Self {
        let donation_total = donated_by(&member.id, donations);
        Self {
            member_id: member.id.clone(),
            member_name: member.name.clone(),
            recorded_total: member.donations,
            donation_total,
            donation_count: donations.iter().filter(|d| d.donor_id == member.id).count(),
            difference: member.donations - donation_total,
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.difference.abs() < f64::EPSILON
    }
}
