// src/application/commands/update_commands.rs
//
// Update Command Handlers
//
// RULES:
// - Accept raw context identifiers ("global", "user:<name>")
// - Call services
// - Return DTOs
// - Never contain business logic

use crate::application::{
    dto::*,
    error_handling::{ErrorResponse, ToErrorResponse},
    state::AppState,
};
use crate::domain::ViewingContext;

fn parse_context(raw: &str) -> Result<ViewingContext, String> {
    ViewingContext::parse(raw).map_err(|e| ErrorResponse::validation(e.to_string()).to_json())
}

/// Refresh every item of a context and rebuild its genre graph
pub async fn trigger_update(context_id: String, state: &AppState) -> Result<UpdateResponseDto, String> {
    let context = parse_context(&context_id)?;

    let report = state
        .update_service
        .trigger_update(&context)
        .await
        .to_error_response()?;

    Ok(UpdateResponseDto::from(report))
}

/// Strongest genre connections of a context
pub async fn get_connections(
    context_id: String,
    state: &AppState,
) -> Result<Vec<GenreLinkDto>, String> {
    let context = parse_context(&context_id)?;

    let links = state
        .update_service
        .get_connections(&context)
        .await
        .to_error_response()?;

    Ok(links.into_iter().map(GenreLinkDto::from).collect())
}

/// RFC 3339 time of the context's last successful update
pub async fn get_last_updated(
    context_id: String,
    state: &AppState,
) -> Result<Option<String>, String> {
    let context = parse_context(&context_id)?;

    let updated_at = state
        .update_service
        .get_last_updated(&context)
        .await
        .to_error_response()?;

    Ok(updated_at.map(|dt| dt.to_rfc3339()))
}

/// Members, connection count and last update of a context
pub async fn get_context_summary(
    context_id: String,
    state: &AppState,
) -> Result<ContextSummaryDto, String> {
    let context = parse_context(&context_id)?;

    let summary = state
        .update_service
        .get_context_summary(&context)
        .await
        .to_error_response()?;

    Ok(ContextSummaryDto::from(summary))
}
