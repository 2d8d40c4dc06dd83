//! Demo records loaded into a freshly seeded store.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{
    Donation, DonationMethod, DonationStatus, Event, EventStatus, Member, Program, ProgramStatus,
    Role,
};

#[derive(Clone, Debug, Serialize)]
pub struct SeedData {
    pub members: Vec<Member>,
    pub events: Vec<Event>,
    pub donations: Vec<Donation>,
    pub programs: Vec<Program>,
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    // Literal dates below are all valid.
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

pub fn seed_data() -> SeedData {
    SeedData {
        members: seed_members(),
        events: seed_events(),
        donations: seed_donations(),
        programs: seed_programs(),
    }
}

fn seed_members() -> Vec<Member> {
    vec![
        Member {
            id: "1".into(),
            name: "Radha Devi".into(),
            email: "radha@temple.org".into(),
            phone: "+1-555-0101".into(),
            role: Role::Devotee,
            spiritual_name: Some("Radha Devi Dasi".into()),
            join_date: ymd(2023, 1, 15),
            avatar: Some("/images/devotee-2.jpg".into()),
            is_active: true,
            interests: strings(&["bhagavad-gita", "kirtan"]),
            donations: 5000.0,
            events_attended: 25,
        },
        Member {
            id: "2".into(),
            name: "Govinda Das".into(),
            email: "govinda@temple.org".into(),
            phone: "+1-555-0102".into(),
            role: Role::Volunteer,
            spiritual_name: Some("Govinda Das".into()),
            join_date: ymd(2023, 3, 22),
            avatar: Some("/images/devotee-1.jpg".into()),
            is_active: true,
            interests: strings(&["service", "cooking"]),
            donations: 3500.0,
            events_attended: 18,
        },
        Member {
            id: "3".into(),
            name: "Krishna Priya".into(),
            email: "krishna@temple.org".into(),
            phone: "+1-555-0103".into(),
            role: Role::Priest,
            spiritual_name: Some("Krishna Priya Devi".into()),
            join_date: ymd(2022, 11, 8),
            avatar: Some("/images/devotee-3.jpg".into()),
            is_active: true,
            interests: strings(&["philosophy", "meditation"]),
            donations: 2800.0,
            events_attended: 32,
        },
    ]
}

fn seed_events() -> Vec<Event> {
    vec![
        Event {
            id: "1".into(),
            name: "Janmashtami Celebration".into(),
            description: "Celebrate the birth of Lord Krishna with kirtan, drama, and prasadam"
                .into(),
            date: ymd(2024, 8, 26),
            time: "18:00".into(),
            location: "Main Temple Hall".into(),
            category: "festival".into(),
            max_attendees: 500,
            current_attendees: 450,
            budget: 5000.0,
            spent: 3200.0,
            status: EventStatus::Upcoming,
            image: Some("/images/festival-celebration.jpg".into()),
            requires_registration: true,
            send_reminders: true,
            livestream: true,
            created_by: "admin".into(),
            created_at: "2024-06-01".into(),
        },
        Event {
            id: "2".into(),
            name: "Bhagavad Gita Study Circle".into(),
            description: "Weekly study and discussion of Krishna's teachings".into(),
            date: ymd(2024, 6, 15),
            time: "10:00".into(),
            location: "Study Hall".into(),
            category: "class".into(),
            max_attendees: 100,
            current_attendees: 85,
            budget: 200.0,
            spent: 150.0,
            status: EventStatus::Completed,
            image: Some("/images/spiritual-books.jpg".into()),
            requires_registration: false,
            send_reminders: true,
            livestream: false,
            created_by: "admin".into(),
            created_at: "2024-05-01".into(),
        },
    ]
}

fn seed_donations() -> Vec<Donation> {
    vec![
        Donation {
            id: "1".into(),
            donor_id: "1".into(),
            donor_name: "Radha Devi".into(),
            amount: 500.0,
            purpose: "Temple Maintenance".into(),
            method: DonationMethod::Online,
            date: ymd(2024, 6, 10),
            recurring: true,
            status: DonationStatus::Completed,
            receipt_sent: true,
        },
        Donation {
            id: "2".into(),
            donor_id: "2".into(),
            donor_name: "Govinda Das".into(),
            amount: 250.0,
            purpose: "Food Distribution".into(),
            method: DonationMethod::Cash,
            date: ymd(2024, 6, 9),
            recurring: false,
            status: DonationStatus::Completed,
            receipt_sent: true,
        },
    ]
}

fn seed_programs() -> Vec<Program> {
    vec![
        Program {
            id: "1".into(),
            title: "Bhagavad Gita Study Circle".into(),
            description: "Weekly study and discussion of Krishna's teachings".into(),
            instructor: "Govinda Das".into(),
            schedule: "Every Sunday, 10:00 AM".into(),
            participants: 45,
            max_participants: 60,
            status: ProgramStatus::Active,
            category: "spiritual-education".into(),
            start_date: ymd(2024, 1, 1),
            end_date: None,
        },
        Program {
            id: "2".into(),
            title: "Kirtan & Devotional Music".into(),
            description: "Learn and practice devotional singing".into(),
            instructor: "Radha Devi".into(),
            schedule: "Every Friday, 7:00 PM".into(),
            participants: 32,
            max_participants: 40,
            status: ProgramStatus::Active,
            category: "kirtan".into(),
            start_date: ymd(2024, 2, 1),
            end_date: None,
        },
    ]
}
