//! Form checks applied before anything reaches the store.
//!
//! The store itself accepts any draft; these rules are what the admin and
//! signup forms enforce on submit.

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{DonationDraft, EventDraft, MemberDraft, MemberPatch};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("valid phone regex"));
static PASSWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[a-zA-Z0-9!@#$%^&*()_+\-=\[\]{};':"\\|,.<>/?]{6,}$"#)
        .expect("valid password regex")
});
static OTP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("valid otp regex"));

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn with_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn into_result(self) -> Result<(), Vec<String>> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

// Lengths are measured on the trimmed value, which is what gets sent.
fn check_length(errors: &mut Vec<String>, label: &str, value: &str, min: usize, max: usize) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(format!("{label} is required"));
    } else if len < min {
        errors.push(format!("{label} must be at least {min} characters"));
    } else if len > max {
        errors.push(format!("{label} must be less than {max} characters"));
    }
}

fn check_email(errors: &mut Vec<String>, email: &str) {
    if blank(email) {
        errors.push("Email is required".to_string());
    } else if !EMAIL_RE.is_match(email.trim()) {
        errors.push("Invalid email address".to_string());
    }
}

pub fn validate_member(draft: &MemberDraft) -> ValidationResult {
    let mut errors = Vec::new();
    if blank(&draft.name) {
        errors.push("Name is required".to_string());
    }
    check_email(&mut errors, &draft.email);
    ValidationResult::with_errors(errors)
}

/// The edit dialog re-checks name and email only when they are being changed.
pub fn validate_member_patch(patch: &MemberPatch) -> ValidationResult {
    let mut errors = Vec::new();
    if patch.name.as_deref().is_some_and(blank) {
        errors.push("Name is required".to_string());
    }
    if let Some(email) = &patch.email {
        check_email(&mut errors, email);
    }
    ValidationResult::with_errors(errors)
}

pub fn validate_event(draft: &EventDraft) -> ValidationResult {
    let mut errors = Vec::new();
    if blank(&draft.name) {
        errors.push("Event name is required".to_string());
    }
    if blank(&draft.time) {
        errors.push("Event time is required".to_string());
    }
    ValidationResult::with_errors(errors)
}

pub fn validate_donation(draft: &DonationDraft) -> ValidationResult {
    let mut errors = Vec::new();
    if blank(&draft.donor_name) {
        errors.push("Donor name is required".to_string());
    }
    if draft.amount == 0.0 || draft.amount.is_nan() {
        errors.push("Amount is required".to_string());
    }
    if blank(&draft.purpose) {
        errors.push("Purpose is required".to_string());
    }
    ValidationResult::with_errors(errors)
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
    pub confirm_password: String,
    pub spiritual_name: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub agree_to_terms: bool,
}

pub fn validate_signup(form: &SignupForm) -> ValidationResult {
    let mut errors = Vec::new();
    check_length(&mut errors, "First name", &form.first_name, 2, 50);
    check_length(&mut errors, "Last name", &form.last_name, 2, 50);
    check_email(&mut errors, &form.email);

    if blank(&form.phone) {
        errors.push("Phone number is required".to_string());
    } else if !PHONE_RE.is_match(form.phone.trim()) {
        errors.push("Invalid phone number".to_string());
    }

    check_length(&mut errors, "Address", &form.address, 10, 100);

    if form.password.is_empty() {
        errors.push("Password is required".to_string());
    } else if !PASSWORD_RE.is_match(&form.password) {
        errors.push(
            "Password must be at least 6 characters and contain only valid characters"
                .to_string(),
        );
    }
    if form.confirm_password.is_empty() {
        errors.push("Please confirm your password".to_string());
    } else if form.confirm_password != form.password {
        errors.push("Passwords must match".to_string());
    }

    if blank(&form.spiritual_name) {
        errors.push("Spiritual name is required".to_string());
    } else if form.spiritual_name.chars().count() > 100 {
        errors.push("Spiritual name must be less than 100 characters".to_string());
    }
    if !form.agree_to_terms {
        errors.push("You must agree to the terms and conditions".to_string());
    }
    ValidationResult::with_errors(errors)
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub fn validate_login(form: &LoginForm) -> ValidationResult {
    let mut errors = Vec::new();
    check_email(&mut errors, &form.email);
    if form.password.is_empty() {
        errors.push("Password is required".to_string());
    }
    ValidationResult::with_errors(errors)
}

pub fn validate_otp(code: &str) -> ValidationResult {
    if OTP_RE.is_match(code) {
        ValidationResult::with_errors(Vec::new())
    } else {
        ValidationResult::with_errors(vec!["Verification code must be 6 digits".to_string()])
    }
}
