use schemars::JsonSchema;
use serde::Deserialize;

use crate::types::{EventPatch, MemberPatch, ProgramPatch};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IdParams {
    /// Record identifier.
    pub id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateMemberParams {
    pub id: String,
    /// Fields to overwrite; omitted fields are kept.
    pub changes: MemberPatch,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateEventParams {
    pub id: String,
    pub changes: EventPatch,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateProgramParams {
    pub id: String,
    pub changes: ProgramPatch,
}

#[derive(Debug, Deserialize, JsonSchema, Default)]
pub struct TopDonorsParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VerifyEmailParams {
    pub token: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OtpParams {
    pub otp: String,
}
