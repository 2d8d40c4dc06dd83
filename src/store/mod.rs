//! In-memory record store.
//!
//! [`TempleStore`] owns one [`Collection`] per record kind and is the only
//! data boundary of the crate. Construct it once and hand clones to whoever
//! needs it; clones share state.

mod collection;
mod latency;

use chrono::NaiveDate;
use thiserror::Error;

pub use collection::{Collection, Record};
pub use latency::Latency;

use crate::analytics::{self, Analytics, MemberLedger};
use crate::seed;
use crate::types::{
    Donation, DonationDraft, Event, EventDraft, EventPatch, Member, MemberDraft, MemberPatch,
    Program, ProgramDraft, ProgramPatch, today,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TempleStore {
    members: Collection<Member>,
    events: Collection<Event>,
    donations: Collection<Donation>,
    programs: Collection<Program>,
    latency: Latency,
}

impl TempleStore {
    /// Store with no records at all.
    pub fn empty(latency: Latency) -> Self {
        Self {
            members: Collection::new(),
            events: Collection::new(),
            donations: Collection::new(),
            programs: Collection::new(),
            latency,
        }
    }

    /// Store preloaded with the demo records.
    pub fn seeded(latency: Latency) -> Self {
        let data = seed::seed_data();
        Self {
            members: Collection::with_records(data.members),
            events: Collection::with_records(data.events),
            donations: Collection::with_records(data.donations),
            programs: Collection::with_records(data.programs),
            latency,
        }
    }

    pub fn latency(&self) -> Latency {
        self.latency
    }

    // Members

    pub async fn get_members(&self) -> Vec<Member> {
        latency::pause(self.latency.list).await;
        self.members.list().await
    }

    pub async fn get_member(&self, id: &str) -> Option<Member> {
        latency::pause(self.latency.get).await;
        let member = self.members.get(id).await;
        tracing::debug!(id = %id, found = member.is_some(), "member lookup");
        member
    }

    pub async fn create_member(&self, draft: MemberDraft) -> Member {
        latency::pause(self.latency.create).await;
        let member = self.members.create(draft).await;
        tracing::info!(id = %member.id, name = %member.name, "member created");
        member
    }

    pub async fn update_member(&self, id: &str, patch: MemberPatch) -> Result<Member, StoreError> {
        latency::pause(self.latency.update).await;
        let updated = self.members.update(id, patch).await.inspect_err(|_| {
            tracing::warn!(id = %id, "member update failed: not found");
        })?;
        tracing::info!(id = %id, "member updated");
        Ok(updated)
    }

    /// Removes the member. Donations referencing it are left untouched.
    pub async fn delete_member(&self, id: &str) {
        latency::pause(self.latency.delete).await;
        let removed = self.members.delete(id).await;
        tracing::info!(id = %id, removed, "member deleted");
    }

    // Events

    pub async fn get_events(&self) -> Vec<Event> {
        latency::pause(self.latency.list).await;
        self.events.list().await
    }

    pub async fn get_event(&self, id: &str) -> Option<Event> {
        latency::pause(self.latency.get).await;
        self.events.get(id).await
    }

    pub async fn create_event(&self, draft: EventDraft) -> Event {
        latency::pause(self.latency.create).await;
        let event = self.events.create(draft).await;
        tracing::info!(id = %event.id, name = %event.name, "event created");
        event
    }

    pub async fn update_event(&self, id: &str, patch: EventPatch) -> Result<Event, StoreError> {
        latency::pause(self.latency.update).await;
        let updated = self.events.update(id, patch).await.inspect_err(|_| {
            tracing::warn!(id = %id, "event update failed: not found");
        })?;
        tracing::info!(id = %id, "event updated");
        Ok(updated)
    }

    pub async fn delete_event(&self, id: &str) {
        latency::pause(self.latency.delete).await;
        let removed = self.events.delete(id).await;
        tracing::info!(id = %id, removed, "event deleted");
    }

    // Donations (create-only)

    pub async fn get_donations(&self) -> Vec<Donation> {
        latency::pause(self.latency.list).await;
        self.donations.list().await
    }

    pub async fn get_donation(&self, id: &str) -> Option<Donation> {
        latency::pause(self.latency.get).await;
        self.donations.get(id).await
    }

    /// Records a donation. The donor's `Member::donations` counter is not
    /// touched; use [`TempleStore::reconcile_member`] for that.
    pub async fn create_donation(&self, draft: DonationDraft) -> Donation {
        latency::pause(self.latency.create).await;
        let donation = self.donations.create(draft).await;
        tracing::info!(
            id = %donation.id,
            donor_id = %donation.donor_id,
            amount = donation.amount,
            "donation recorded"
        );
        donation
    }

    // Programs

    pub async fn get_programs(&self) -> Vec<Program> {
        latency::pause(self.latency.list).await;
        self.programs.list().await
    }

    pub async fn get_program(&self, id: &str) -> Option<Program> {
        latency::pause(self.latency.get).await;
        self.programs.get(id).await
    }

    pub async fn create_program(&self, draft: ProgramDraft) -> Program {
        latency::pause(self.latency.create).await;
        let program = self.programs.create(draft).await;
        tracing::info!(id = %program.id, title = %program.title, "program created");
        program
    }

    pub async fn update_program(
        &self,
        id: &str,
        patch: ProgramPatch,
    ) -> Result<Program, StoreError> {
        latency::pause(self.latency.update).await;
        let updated = self.programs.update(id, patch).await.inspect_err(|_| {
            tracing::warn!(id = %id, "program update failed: not found");
        })?;
        tracing::info!(id = %id, "program updated");
        Ok(updated)
    }

    // Analytics

    pub async fn get_analytics(&self) -> Analytics {
        self.analytics_on(today()).await
    }

    /// Analytics with "this month" taken from `day`.
    pub async fn analytics_on(&self, day: NaiveDate) -> Analytics {
        latency::pause(self.latency.analytics).await;
        let members = self.members.list().await;
        let events = self.events.list().await;
        let donations = self.donations.list().await;
        let programs = self.programs.list().await;
        analytics::summarize(&members, &events, &donations, &programs, day)
    }

    // Ledger

    pub async fn member_ledger(&self, id: &str) -> Result<MemberLedger, StoreError> {
        latency::pause(self.latency.get).await;
        let member = self
            .members
            .get(id)
            .await
            .ok_or_else(|| StoreError::not_found(Member::KIND, id))?;
        let donations = self.donations.list().await;
        Ok(MemberLedger::compute(&member, &donations))
    }

    pub async fn ledger_discrepancies(&self) -> Vec<MemberLedger> {
        latency::pause(self.latency.list).await;
        let members = self.members.list().await;
        let donations = self.donations.list().await;
        members
            .iter()
            .map(|m| MemberLedger::compute(m, &donations))
            .filter(|l| !l.is_balanced())
            .collect()
    }

    /// Overwrites the member's donation counter with the sum of donations
    /// recorded against it.
    pub async fn reconcile_member(&self, id: &str) -> Result<Member, StoreError> {
        latency::pause(self.latency.update).await;
        let donations = self.donations.list().await;
        let total = analytics::donated_by(id, &donations);
        let patch = MemberPatch {
            donations: Some(total),
            ..Default::default()
        };
        let member = self.members.update(id, patch).await?;
        tracing::info!(id = %id, total, "member donation counter reconciled");
        Ok(member)
    }

    /// Record counts per kind, without simulated latency.
    pub async fn counts(&self) -> RecordCounts {
        RecordCounts {
            members: self.members.len().await,
            events: self.events.len().await,
            donations: self.donations.len().await,
            programs: self.programs.len().await,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RecordCounts {
    pub members: usize,
    pub events: usize,
    pub donations: usize,
    pub programs: usize,
}
