use chrono::{Local, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::Record;

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn default_true() -> bool {
    true
}

fn default_admin() -> String {
    "admin".to_string()
}

fn default_manual_entry() -> String {
    "manual-entry".to_string()
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Devotee,
    Volunteer,
    Priest,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Devotee => "devotee",
            Role::Volunteer => "volunteer",
            Role::Priest => "priest",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DonationMethod {
    #[default]
    Cash,
    Online,
    BankTransfer,
    Check,
}

impl DonationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationMethod::Cash => "cash",
            DonationMethod::Online => "online",
            DonationMethod::BankTransfer => "bank_transfer",
            DonationMethod::Check => "check",
        }
    }
}

impl fmt::Display for DonationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    #[default]
    Completed,
    Pending,
    Failed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProgramStatus {
    Active,
    Inactive,
    #[default]
    Planning,
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// A registered community member.
///
/// `donations` and `events_attended` are counters kept on the member itself.
/// Nothing ties them to the donation or event collections; see
/// [`crate::analytics::MemberLedger`] for the comparison against recorded
/// donations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spiritual_name: Option<String>,
    pub join_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub is_active: bool,
    pub interests: Vec<String>,
    pub donations: f64,
    pub events_attended: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub spiritual_name: Option<String>,
    #[serde(default = "today")]
    pub join_date: NaiveDate,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub donations: f64,
    #[serde(default)]
    pub events_attended: u32,
}

impl MemberDraft {
    /// Draft with the defaults the member form applied on submit.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            role: Role::default(),
            spiritual_name: None,
            join_date: today(),
            avatar: None,
            is_active: true,
            interests: Vec::new(),
            donations: 0.0,
            events_attended: 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub spiritual_name: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub is_active: Option<bool>,
    pub interests: Option<Vec<String>>,
    pub donations: Option<f64>,
    pub events_attended: Option<u32>,
}

impl Record for Member {
    type Draft = MemberDraft;
    type Patch = MemberPatch;
    const KIND: &'static str = "Member";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, d: MemberDraft) -> Self {
        Self {
            id,
            name: d.name,
            email: d.email,
            phone: d.phone,
            role: d.role,
            spiritual_name: d.spiritual_name,
            join_date: d.join_date,
            avatar: d.avatar,
            is_active: d.is_active,
            interests: d.interests,
            donations: d.donations,
            events_attended: d.events_attended,
        }
    }

    fn apply_patch(&mut self, p: MemberPatch) {
        if let Some(v) = p.name {
            self.name = v;
        }
        if let Some(v) = p.email {
            self.email = v;
        }
        if let Some(v) = p.phone {
            self.phone = v;
        }
        if let Some(v) = p.role {
            self.role = v;
        }
        if let Some(v) = p.spiritual_name {
            self.spiritual_name = Some(v);
        }
        if let Some(v) = p.join_date {
            self.join_date = v;
        }
        if let Some(v) = p.avatar {
            self.avatar = Some(v);
        }
        if let Some(v) = p.is_active {
            self.is_active = v;
        }
        if let Some(v) = p.interests {
            self.interests = v;
        }
        if let Some(v) = p.donations {
            self.donations = v;
        }
        if let Some(v) = p.events_attended {
            self.events_attended = v;
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub category: String,
    pub max_attendees: u32,
    pub current_attendees: u32,
    pub budget: f64,
    pub spent: f64,
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub requires_registration: bool,
    pub send_reminders: bool,
    pub livestream: bool,
    pub created_by: String,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub max_attendees: u32,
    #[serde(default)]
    pub current_attendees: u32,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub spent: f64,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub requires_registration: bool,
    #[serde(default = "default_true")]
    pub send_reminders: bool,
    #[serde(default)]
    pub livestream: bool,
    #[serde(default = "default_admin")]
    pub created_by: String,
}

impl EventDraft {
    pub fn new(name: impl Into<String>, date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            date,
            time: time.into(),
            location: String::new(),
            category: String::new(),
            max_attendees: 0,
            current_attendees: 0,
            budget: 0.0,
            spent: 0.0,
            status: EventStatus::Upcoming,
            image: None,
            requires_registration: false,
            send_reminders: true,
            livestream: false,
            created_by: default_admin(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub max_attendees: Option<u32>,
    pub current_attendees: Option<u32>,
    pub budget: Option<f64>,
    pub spent: Option<f64>,
    pub status: Option<EventStatus>,
    pub image: Option<String>,
    pub requires_registration: Option<bool>,
    pub send_reminders: Option<bool>,
    pub livestream: Option<bool>,
    pub created_by: Option<String>,
}

impl Record for Event {
    type Draft = EventDraft;
    type Patch = EventPatch;
    const KIND: &'static str = "Event";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, d: EventDraft) -> Self {
        Self {
            id,
            name: d.name,
            description: d.description,
            date: d.date,
            time: d.time,
            location: d.location,
            category: d.category,
            max_attendees: d.max_attendees,
            current_attendees: d.current_attendees,
            budget: d.budget,
            spent: d.spent,
            status: d.status,
            image: d.image,
            requires_registration: d.requires_registration,
            send_reminders: d.send_reminders,
            livestream: d.livestream,
            created_by: d.created_by,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    fn apply_patch(&mut self, p: EventPatch) {
        if let Some(v) = p.name {
            self.name = v;
        }
        if let Some(v) = p.description {
            self.description = v;
        }
        if let Some(v) = p.date {
            self.date = v;
        }
        if let Some(v) = p.time {
            self.time = v;
        }
        if let Some(v) = p.location {
            self.location = v;
        }
        if let Some(v) = p.category {
            self.category = v;
        }
        if let Some(v) = p.max_attendees {
            self.max_attendees = v;
        }
        if let Some(v) = p.current_attendees {
            self.current_attendees = v;
        }
        if let Some(v) = p.budget {
            self.budget = v;
        }
        if let Some(v) = p.spent {
            self.spent = v;
        }
        if let Some(v) = p.status {
            self.status = v;
        }
        if let Some(v) = p.image {
            self.image = Some(v);
        }
        if let Some(v) = p.requires_registration {
            self.requires_registration = v;
        }
        if let Some(v) = p.send_reminders {
            self.send_reminders = v;
        }
        if let Some(v) = p.livestream {
            self.livestream = v;
        }
        if let Some(v) = p.created_by {
            self.created_by = v;
        }
    }
}

// ---------------------------------------------------------------------------
// Donation
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    pub donor_id: String,
    pub donor_name: String,
    pub amount: f64,
    pub purpose: String,
    pub method: DonationMethod,
    pub date: NaiveDate,
    pub recurring: bool,
    pub status: DonationStatus,
    pub receipt_sent: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationDraft {
    #[serde(default = "default_manual_entry")]
    pub donor_id: String,
    pub donor_name: String,
    pub amount: f64,
    pub purpose: String,
    #[serde(default)]
    pub method: DonationMethod,
    #[serde(default = "today")]
    pub date: NaiveDate,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub status: DonationStatus,
    #[serde(default)]
    pub receipt_sent: bool,
}

impl DonationDraft {
    pub fn new(donor_name: impl Into<String>, amount: f64, purpose: impl Into<String>) -> Self {
        Self {
            donor_id: default_manual_entry(),
            donor_name: donor_name.into(),
            amount,
            purpose: purpose.into(),
            method: DonationMethod::default(),
            date: today(),
            recurring: false,
            status: DonationStatus::Completed,
            receipt_sent: false,
        }
    }
}

impl Record for Donation {
    type Draft = DonationDraft;
    // Donations are create-only.
    type Patch = ();
    const KIND: &'static str = "Donation";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, d: DonationDraft) -> Self {
        Self {
            id,
            donor_id: d.donor_id,
            donor_name: d.donor_name,
            amount: d.amount,
            purpose: d.purpose,
            method: d.method,
            date: d.date,
            recurring: d.recurring,
            status: d.status,
            receipt_sent: d.receipt_sent,
        }
    }

    fn apply_patch(&mut self, _patch: ()) {}
}

// ---------------------------------------------------------------------------
// Program
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub schedule: String,
    pub participants: u32,
    pub max_participants: u32,
    pub status: ProgramStatus,
    pub category: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub participants: u32,
    #[serde(default)]
    pub max_participants: u32,
    #[serde(default)]
    pub status: ProgramStatus,
    #[serde(default)]
    pub category: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub schedule: Option<String>,
    pub participants: Option<u32>,
    pub max_participants: Option<u32>,
    pub status: Option<ProgramStatus>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Record for Program {
    type Draft = ProgramDraft;
    type Patch = ProgramPatch;
    const KIND: &'static str = "Program";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, d: ProgramDraft) -> Self {
        Self {
            id,
            title: d.title,
            description: d.description,
            instructor: d.instructor,
            schedule: d.schedule,
            participants: d.participants,
            max_participants: d.max_participants,
            status: d.status,
            category: d.category,
            start_date: d.start_date,
            end_date: d.end_date,
        }
    }

    fn apply_patch(&mut self, p: ProgramPatch) {
        if let Some(v) = p.title {
            self.title = v;
        }
        if let Some(v) = p.description {
            self.description = v;
        }
        if let Some(v) = p.instructor {
            self.instructor = v;
        }
        if let Some(v) = p.schedule {
            self.schedule = v;
        }
        if let Some(v) = p.participants {
            self.participants = v;
        }
        if let Some(v) = p.max_participants {
            self.max_participants = v;
        }
        if let Some(v) = p.status {
            self.status = v;
        }
        if let Some(v) = p.category {
            self.category = v;
        }
        if let Some(v) = p.start_date {
            self.start_date = v;
        }
        if let Some(v) = p.end_date {
            self.end_date = Some(v);
        }
    }
}
