use std::{future::ready, sync::Arc};

use rmcp::{
    ErrorData,
    handler::server::{ServerHandler, tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Implementation, PaginatedRequestParam as ListResourcesRequest,
        ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_handler, tool_router,
};
use serde::Serialize;
use serde_json::json;

use crate::{
    analytics::{self, DonationStats, MemberStats},
    auth_client::{AuthClient, AuthResponse, SignupRequest},
    error::{ServiceError, ServiceResult},
    query::{self, DonationFilter, EventFilter, MemberFilter},
    server::ServerState,
    tools::{
        HealthParams, IdParams, OtpParams, TopDonorsParams, UpdateEventParams,
        UpdateMemberParams, UpdateProgramParams, VerifyEmailParams, health_summary,
    },
    types::{DonationDraft, EventDraft, MemberDraft, ProgramDraft, today},
    validation::{self, LoginForm, SignupForm, ValidationResult},
};

const OVERVIEW_TOP_DONORS: usize = 3;
const OVERVIEW_EVENTS: usize = 3;

fn structured(value: impl Serialize) -> Result<CallToolResult, ErrorData> {
    let value = serde_json::to_value(value).map_err(ServiceError::from)?;
    Ok(CallToolResult::structured(value))
}

fn checked(result: ValidationResult) -> ServiceResult<()> {
    result.into_result().map_err(ServiceError::Validation)
}

pub struct TempleToolHandler {
    state: Arc<ServerState>,
    tool_router: ToolRouter<Self>,
}

impl TempleToolHandler {
    pub fn new(state: Arc<ServerState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub fn instructions() -> Option<String> {
        Some(include_str!("../docs/instructions.md").to_string())
    }

    fn auth_client(&self) -> ServiceResult<AuthClient> {
        self.state
            .auth
            .clone()
            .map(AuthClient::new)
            .ok_or_else(|| {
                ServiceError::Config(
                    "auth backend not configured (set TEMPLE_API_URL)".to_string(),
                )
            })
    }

    async fn run_auth<F>(&self, call: F) -> ServiceResult<AuthResponse>
    where
        F: FnOnce(&AuthClient) -> ServiceResult<AuthResponse> + Send + 'static,
    {
        let client = self.auth_client()?;
        tokio::task::spawn_blocking(move || call(&client))
            .await
            .map_err(|e| ServiceError::FromString(format!("auth task failed: {e}")))?
    }
}

#[tool_router]
impl TempleToolHandler {
    // Members

    #[tool(name = "list_members", description = "List members, optionally filtered by search text and role")]
    async fn list_members(&self, Parameters(filter): Parameters<MemberFilter>) -> Result<CallToolResult, ErrorData> {
        let members = query::apply(self.state.store.get_members().await, &filter);
        structured(json!({ "total": members.len(), "members": members }))
    }

    #[tool(name = "get_member", description = "Fetch one member by id; returns null when absent")]
    async fn get_member(&self, Parameters(params): Parameters<IdParams>) -> Result<CallToolResult, ErrorData> {
        let member = self.state.store.get_member(&params.id).await;
        structured(json!({ "member": member }))
    }

    #[tool(name = "create_member", description = "Add a member; name and email are required")]
    async fn create_member(&self, Parameters(draft): Parameters<MemberDraft>) -> Result<CallToolResult, ErrorData> {
        checked(validation::validate_member(&draft))?;
        structured(self.state.store.create_member(draft).await)
    }

    #[tool(name = "update_member", description = "Merge changes into an existing member")]
    async fn update_member(&self, Parameters(params): Parameters<UpdateMemberParams>) -> Result<CallToolResult, ErrorData> {
        checked(validation::validate_member_patch(&params.changes))?;
        let member = self
            .state
            .store
            .update_member(&params.id, params.changes)
            .await
            .map_err(ServiceError::from)?;
        structured(member)
    }

    #[tool(name = "delete_member", description = "Remove a member; their donations are kept")]
    async fn delete_member(&self, Parameters(params): Parameters<IdParams>) -> Result<CallToolResult, ErrorData> {
        self.state.store.delete_member(&params.id).await;
        structured(json!({ "deleted": params.id }))
    }

    #[tool(name = "member_stats", description = "Total, active, volunteer and new-this-month member counts")]
    async fn member_stats(&self) -> Result<CallToolResult, ErrorData> {
        let members = self.state.store.get_members().await;
        let stats: MemberStats = analytics::member_stats(&members, today());
        structured(stats)
    }

    #[tool(name = "top_donors", description = "Members ranked by their donation totals")]
    async fn top_donors(&self, Parameters(params): Parameters<TopDonorsParams>) -> Result<CallToolResult, ErrorData> {
        let members = self.state.store.get_members().await;
        let limit = params.limit.unwrap_or(OVERVIEW_TOP_DONORS);
        structured(json!({ "donors": analytics::top_donors(&members, limit) }))
    }

    // Events

    #[tool(name = "list_events", description = "List events, optionally filtered by name search and category")]
    async fn list_events(&self, Parameters(filter): Parameters<EventFilter>) -> Result<CallToolResult, ErrorData> {
        let events = query::apply(self.state.store.get_events().await, &filter);
        structured(json!({ "total": events.len(), "events": events }))
    }

    #[tool(name = "get_event", description = "Fetch one event by id; returns null when absent")]
    async fn get_event(&self, Parameters(params): Parameters<IdParams>) -> Result<CallToolResult, ErrorData> {
        let event = self.state.store.get_event(&params.id).await;
        structured(json!({ "event": event }))
    }

    #[tool(name = "create_event", description = "Create an event; name, date and time are required")]
    async fn create_event(&self, Parameters(draft): Parameters<EventDraft>) -> Result<CallToolResult, ErrorData> {
        checked(validation::validate_event(&draft))?;
        structured(self.state.store.create_event(draft).await)
    }

    #[tool(name = "update_event", description = "Merge changes into an existing event")]
    async fn update_event(&self, Parameters(params): Parameters<UpdateEventParams>) -> Result<CallToolResult, ErrorData> {
        let event = self
            .state
            .store
            .update_event(&params.id, params.changes)
            .await
            .map_err(ServiceError::from)?;
        structured(event)
    }

    #[tool(name = "delete_event", description = "Remove an event")]
    async fn delete_event(&self, Parameters(params): Parameters<IdParams>) -> Result<CallToolResult, ErrorData> {
        self.state.store.delete_event(&params.id).await;
        structured(json!({ "deleted": params.id }))
    }

    // Donations

    #[tool(name = "list_donations", description = "List donations, optionally filtered by search text and payment method")]
    async fn list_donations(&self, Parameters(filter): Parameters<DonationFilter>) -> Result<CallToolResult, ErrorData> {
        let donations = query::apply(self.state.store.get_donations().await, &filter);
        structured(json!({ "total": donations.len(), "donations": donations }))
    }

    #[tool(name = "get_donation", description = "Fetch one donation by id; returns null when absent")]
    async fn get_donation(&self, Parameters(params): Parameters<IdParams>) -> Result<CallToolResult, ErrorData> {
        let donation = self.state.store.get_donation(&params.id).await;
        structured(json!({ "donation": donation }))
    }

    #[tool(name = "record_donation", description = "Record a donation; donor name, amount and purpose are required")]
    async fn record_donation(&self, Parameters(draft): Parameters<DonationDraft>) -> Result<CallToolResult, ErrorData> {
        checked(validation::validate_donation(&draft))?;
        structured(self.state.store.create_donation(draft).await)
    }

    #[tool(name = "donation_stats", description = "Donation count, total and rounded average")]
    async fn donation_stats(&self) -> Result<CallToolResult, ErrorData> {
        let donations = self.state.store.get_donations().await;
        let stats: DonationStats = analytics::donation_stats(&donations);
        structured(stats)
    }

    // Programs

    #[tool(name = "list_programs", description = "List all programs")]
    async fn list_programs(&self) -> Result<CallToolResult, ErrorData> {
        let programs = self.state.store.get_programs().await;
        structured(json!({ "total": programs.len(), "programs": programs }))
    }

    #[tool(name = "get_program", description = "Fetch one program by id; returns null when absent")]
    async fn get_program(&self, Parameters(params): Parameters<IdParams>) -> Result<CallToolResult, ErrorData> {
        let program = self.state.store.get_program(&params.id).await;
        structured(json!({ "program": program }))
    }

    #[tool(name = "create_program", description = "Create a program")]
    async fn create_program(&self, Parameters(draft): Parameters<ProgramDraft>) -> Result<CallToolResult, ErrorData> {
        if draft.title.trim().is_empty() {
            return Err(ServiceError::Validation(vec!["Title is required".to_string()]).into());
        }
        structured(self.state.store.create_program(draft).await)
    }

    #[tool(name = "update_program", description = "Merge changes into an existing program")]
    async fn update_program(&self, Parameters(params): Parameters<UpdateProgramParams>) -> Result<CallToolResult, ErrorData> {
        let program = self
            .state
            .store
            .update_program(&params.id, params.changes)
            .await
            .map_err(ServiceError::from)?;
        structured(program)
    }

    // Dashboard

    #[tool(name = "get_analytics", description = "Summary statistics recomputed from current records")]
    async fn get_analytics(&self) -> Result<CallToolResult, ErrorData> {
        structured(self.state.store.get_analytics().await)
    }

    #[tool(name = "overview", description = "Analytics, events and top donors for the dashboard overview")]
    async fn overview(&self) -> Result<CallToolResult, ErrorData> {
        let store = &self.state.store;
        let (analytics, events, members) =
            futures::join!(store.get_analytics(), store.get_events(), store.get_members());
        let events: Vec<_> = events.into_iter().take(OVERVIEW_EVENTS).collect();
        structured(json!({
            "analytics": analytics,
            "events": events,
            "topDonors": analytics::top_donors(&members, OVERVIEW_TOP_DONORS),
        }))
    }

    #[tool(name = "member_ledger", description = "Compare a member's donation total with the donations recorded for them")]
    async fn member_ledger(&self, Parameters(params): Parameters<IdParams>) -> Result<CallToolResult, ErrorData> {
        let ledger = self
            .state
            .store
            .member_ledger(&params.id)
            .await
            .map_err(ServiceError::from)?;
        structured(ledger)
    }

    #[tool(name = "ledger_discrepancies", description = "Members whose donation total differs from their recorded donations")]
    async fn ledger_discrepancies(&self) -> Result<CallToolResult, ErrorData> {
        let ledgers = self.state.store.ledger_discrepancies().await;
        structured(json!({ "total": ledgers.len(), "ledgers": ledgers }))
    }

    #[tool(name = "reconcile_member", description = "Set a member's donation total to the sum of their recorded donations")]
    async fn reconcile_member(&self, Parameters(params): Parameters<IdParams>) -> Result<CallToolResult, ErrorData> {
        let member = self
            .state
            .store
            .reconcile_member(&params.id)
            .await
            .map_err(ServiceError::from)?;
        structured(member)
    }

    // Authentication backend

    #[tool(name = "register", description = "Validate a signup form and register the account with the auth backend")]
    async fn register(&self, Parameters(form): Parameters<SignupForm>) -> Result<CallToolResult, ErrorData> {
        checked(validation::validate_signup(&form))?;
        let request = SignupRequest::from(&form);
        let response = self.run_auth(move |client| client.register(&request)).await?;
        structured(response)
    }

    #[tool(name = "login", description = "Validate credentials and log in against the auth backend")]
    async fn login(&self, Parameters(form): Parameters<LoginForm>) -> Result<CallToolResult, ErrorData> {
        checked(validation::validate_login(&form))?;
        let response = self.run_auth(move |client| client.login(&form)).await?;
        structured(response)
    }

    #[tool(name = "verify_email", description = "Confirm an email verification token with the auth backend")]
    async fn verify_email(&self, Parameters(params): Parameters<VerifyEmailParams>) -> Result<CallToolResult, ErrorData> {
        let response = self
            .run_auth(move |client| client.verify_email(&params.token))
            .await?;
        structured(response)
    }

    #[tool(name = "validate_otp", description = "Check that a verification code has the expected format")]
    fn validate_otp(&self, Parameters(params): Parameters<OtpParams>) -> Result<CallToolResult, ErrorData> {
        structured(validation::validate_otp(&params.otp))
    }

    #[tool(name = "health", description = "Server health and record counts")]
    async fn health(&self, Parameters(params): Parameters<HealthParams>) -> String {
        health_summary(&self.state, params.verbose).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for TempleToolHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Self::instructions(),
        }
    }

    fn ping(
        &self,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<(), rmcp::ErrorData>> + Send {
        ready(Ok(()))
    }

    async fn list_resources(
        &self,
        _req: Option<ListResourcesRequest>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<rmcp::model::ListResourcesResult, rmcp::ErrorData> {
        use rmcp::model::{Annotated, RawResource};
        Ok(rmcp::model::ListResourcesResult {
            resources: vec![Annotated {
                raw: RawResource {
                    uri: "file://instructions".to_string(),
                    name: "Temple Admin Instructions".to_string(),
                    title: Some("Temple Admin Instructions".to_string()),
                    description: Some("How to use the temple admin tools".to_string()),
                    mime_type: Some("text/markdown".to_string()),
                    size: None,
                    icons: None,
                },
                annotations: None,
            }],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        req: rmcp::model::ReadResourceRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<rmcp::model::ReadResourceResult, rmcp::ErrorData> {
        if req.uri == "file://instructions" {
            Ok(rmcp::model::ReadResourceResult {
                contents: vec![rmcp::model::ResourceContents::text(
                    Self::instructions().unwrap_or_default(),
                    "file://instructions",
                )],
            })
        } else {
            Err(rmcp::ErrorData::invalid_params(
                format!("Unknown resource URI: {}", req.uri),
                None,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        server::TransportSummary,
        store::{Latency, TempleStore},
        types::MemberPatch,
    };
    use rmcp::model::ErrorCode;
    use serde_json::Value;

    fn handler() -> TempleToolHandler {
        let state = ServerState::new(
            TempleStore::seeded(Latency::none()),
            None,
            TransportSummary::default(),
        );
        TempleToolHandler::new(Arc::new(state))
    }

    fn content(result: CallToolResult) -> Value {
        result.structured_content.unwrap_or(Value::Null)
    }

    #[tokio::test]
    async fn list_members_applies_filter() {
        let filter = MemberFilter {
            search: Some("priya".into()),
            role: None,
        };
        let value = content(handler().list_members(Parameters(filter)).await.unwrap());
        assert_eq!(value["total"], 1);
        assert_eq!(value["members"][0]["name"], "Krishna Priya");
    }

    #[tokio::test]
    async fn create_member_rejects_invalid_draft() {
        let h = handler();
        let err = h
            .create_member(Parameters(MemberDraft::new("", "not-an-email")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(h.state.store.get_members().await.len(), 3);
    }

    #[tokio::test]
    async fn create_member_returns_record() {
        let h = handler();
        let value = content(
            h.create_member(Parameters(MemberDraft::new("Gopal", "gopal@temple.org")))
                .await
                .unwrap(),
        );
        assert_eq!(value["name"], "Gopal");
        assert!(value["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert_eq!(h.state.store.get_members().await.len(), 4);
    }

    #[tokio::test]
    async fn update_unknown_member_is_not_found() {
        let params = UpdateMemberParams {
            id: "999".into(),
            changes: MemberPatch {
                name: Some("Nobody".into()),
                ..Default::default()
            },
        };
        let err = handler().update_member(Parameters(params)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
    }

    #[tokio::test]
    async fn get_missing_event_is_null() {
        let value = content(
            handler()
                .get_event(Parameters(IdParams { id: "nope".into() }))
                .await
                .unwrap(),
        );
        assert!(value["event"].is_null());
    }

    #[tokio::test]
    async fn overview_ranks_top_donors() {
        let value = content(handler().overview().await.unwrap());
        let donors = value["topDonors"].as_array().unwrap();
        assert_eq!(donors.len(), 3);
        assert_eq!(donors[0]["rank"], 1);
        assert_eq!(value["analytics"]["totalMembers"], 3);
        assert_eq!(value["events"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn overview_shows_first_three_events() {
        let h = handler();
        let day = today();
        for name in ["Ekadashi Kirtan", "Gaura Purnima"] {
            h.state
                .store
                .create_event(EventDraft::new(name, day, "18:00"))
                .await;
        }
        assert_eq!(h.state.store.get_events().await.len(), 4);

        let value = content(h.overview().await.unwrap());
        let events = value["events"].as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["id"], "1");
        assert_eq!(events[2]["name"], "Ekadashi Kirtan");
    }

    #[tokio::test]
    async fn auth_tools_need_configured_backend() {
        let form = LoginForm {
            email: "radha@temple.org".into(),
            password: "hare#krishna".into(),
        };
        let err = handler().login(Parameters(form)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("TEMPLE_API_URL"));
    }

    #[test]
    fn otp_format_is_reported() {
        let h = handler();
        let ok = content(
            h.validate_otp(Parameters(OtpParams { otp: "123456".into() }))
                .unwrap(),
        );
        assert_eq!(ok["isValid"], true);
        let bad = content(h.validate_otp(Parameters(OtpParams { otp: "12ab".into() })).unwrap());
        assert_eq!(bad["isValid"], false);
    }

    #[test]
    fn info_carries_instructions() {
        let info = handler().get_info();
        assert!(info.instructions.is_some_and(|text| !text.is_empty()));
    }
}
