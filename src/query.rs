use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{Donation, DonationMethod, Event, Member, Role};

/// Predicate over one record kind.
pub trait Filter<T> {
    fn matches(&self, record: &T) -> bool;
}

pub fn apply<T, F: Filter<T>>(records: Vec<T>, filter: &F) -> Vec<T> {
    records.into_iter().filter(|r| filter.matches(r)).collect()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn normalized(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct MemberFilter {
    /// Matches name, email or spiritual name, case-insensitively.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl Filter<Member> for MemberFilter {
    fn matches(&self, m: &Member) -> bool {
        let search_ok = match normalized(&self.search) {
            None => true,
            Some(q) => {
                contains_ci(&m.name, &q)
                    || contains_ci(&m.email, &q)
                    || m.spiritual_name
                        .as_deref()
                        .is_some_and(|s| contains_ci(s, &q))
            }
        };
        search_ok && self.role.is_none_or(|r| m.role == r)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct EventFilter {
    /// Matches the event name, case-insensitively.
    #[serde(default)]
    pub search: Option<String>,
    /// Exact category.
    #[serde(default)]
    pub category: Option<String>,
}

impl Filter<Event> for EventFilter {
    fn matches(&self, e: &Event) -> bool {
        let search_ok = normalized(&self.search).is_none_or(|q| contains_ci(&e.name, &q));
        search_ok && self.category.as_deref().is_none_or(|c| e.category == c)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct DonationFilter {
    /// Matches donor name or purpose, case-insensitively.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub method: Option<DonationMethod>,
}

impl Filter<Donation> for DonationFilter {
    fn matches(&self, d: &Donation) -> bool {
        let search_ok = normalized(&self.search)
            .is_none_or(|q| contains_ci(&d.donor_name, &q) || contains_ci(&d.purpose, &q));
        search_ok && self.method.is_none_or(|m| d.method == m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_data;

    #[test]
    fn empty_filter_keeps_everything() {
        let members = seed_data().members;
        assert_eq!(apply(members, &MemberFilter::default()).len(), 3);
    }

    #[test]
    fn member_search_covers_spiritual_name() {
        let filter = MemberFilter {
            search: Some("DASI".into()),
            role: None,
        };
        let found = apply(seed_data().members, &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn member_role_and_search_combine() {
        let filter = MemberFilter {
            search: Some("temple.org".into()),
            role: Some(Role::Priest),
        };
        let found = apply(seed_data().members, &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Krishna Priya");
    }

    #[test]
    fn event_category_is_exact() {
        let filter = EventFilter {
            search: None,
            category: Some("festival".into()),
        };
        assert_eq!(apply(seed_data().events, &filter).len(), 1);

        let filter = EventFilter {
            search: Some("gita".into()),
            category: Some("festival".into()),
        };
        assert!(apply(seed_data().events, &filter).is_empty());
    }

    #[test]
    fn donation_search_and_method() {
        let filter = DonationFilter {
            search: Some("food".into()),
            method: None,
        };
        assert_eq!(apply(seed_data().donations, &filter).len(), 1);

        let filter = DonationFilter {
            search: Some("  ".into()),
            method: Some(DonationMethod::Online),
        };
        let found = apply(seed_data().donations, &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].donor_name, "Radha Devi");
    }
}
