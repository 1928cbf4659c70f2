//! HTTP request handlers for inquiries
//!
//! Two intake flows share this module: inquiries optionally linked to a
//! property and/or an authenticated user, and standalone general inquiries
//! whose type is client-supplied. Both are immutable once stored.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};
use serde_json::json;

use crate::database::{
    index_bounds, index_key, AppState, TABLE_GENERAL_INQUIRIES, TABLE_INQUIRIES,
    TABLE_INQUIRY_PROPERTY_INDEX, TABLE_INQUIRY_USER_INDEX,
};
use crate::error::ApiError;
use crate::middleware::{optional_claims, Claims};
use crate::model::{
    GeneralInquiry, Inquiry, SubmitGeneralInquiryRequest, SubmitInquiryRequest,
};

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts a contact-form submission, anonymous or authenticated
///
/// `inquiryType` is derived, never client-supplied: "Property-Specific"
/// when a `propertyId` accompanies the submission, "General" otherwise.
/// A valid bearer token attributes the inquiry to its holder.
///
/// # Response
///
/// - **201 Created** - `{success, message, data}`
/// - **400 Bad Request** - any of name/email/phone/message missing or empty
pub async fn submit_inquiry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitInquiryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(name), Some(email), Some(phone), Some(message)) = (
        non_empty(payload.name),
        non_empty(payload.email),
        non_empty(payload.phone),
        non_empty(payload.message),
    ) else {
        return Err(ApiError::Validation(
            "Name, email, phone, and message are required".to_string(),
        ));
    };

    let claims = optional_claims(&headers, &state.config.jwt_secret);
    let inquiry_type = if payload.property_id.is_some() {
        "Property-Specific"
    } else {
        "General"
    };

    let write_txn = state.db.begin_write()?;
    let record = {
        let mut table = write_txn.open_table(TABLE_INQUIRIES)?;
        let id = table.last()?.map(|(key, _)| key.value() + 1).unwrap_or(1);
        let record = Inquiry {
            id,
            name,
            email,
            phone,
            message,
            inquiry_type: inquiry_type.to_string(),
            user_id: claims.as_ref().map(|claims| claims.sub),
            property_id: payload.property_id,
            created_at: Utc::now(),
        };
        table.insert(id, serde_json::to_string(&record)?.as_str())?;

        if let Some(property_id) = record.property_id {
            let mut index = write_txn.open_table(TABLE_INQUIRY_PROPERTY_INDEX)?;
            index.insert(index_key(property_id, &record.created_at).as_str(), id)?;
        }
        if let Some(user_id) = record.user_id {
            let mut index = write_txn.open_table(TABLE_INQUIRY_USER_INDEX)?;
            index.insert(index_key(user_id, &record.created_at).as_str(), id)?;
        }

        record
    };
    write_txn.commit()?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Inquiry submitted successfully",
            "data": record
        })),
    ))
}

/// Fetches a single inquiry by id
pub async fn get_inquiry_by_id(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let read_txn = state.db.begin_read()?;
    let table = read_txn.open_table(TABLE_INQUIRIES)?;

    let inquiry: Inquiry = match table.get(id)? {
        Some(guard) => serde_json::from_str(guard.value())?,
        None => return Err(ApiError::NotFound("Inquiry not found")),
    };

    Ok(Json(json!({
        "success": true,
        "data": inquiry
    })))
}

/// Lists inquiries linked to one property, newest first
pub async fn get_inquiries_by_property(
    State(state): State<AppState>,
    Path(property_id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let inquiries = inquiries_by_reference(&state, TABLE_INQUIRY_PROPERTY_INDEX, property_id)?;

    Ok(Json(json!({
        "success": true,
        "count": inquiries.len(),
        "data": inquiries
    })))
}

/// Lists the authenticated caller's own inquiries, newest first
///
/// The identity comes from the verified token only; an arbitrary user id is
/// never accepted from the request.
pub async fn get_inquiries_by_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let inquiries = inquiries_by_reference(&state, TABLE_INQUIRY_USER_INDEX, claims.sub)?;

    Ok(Json(json!({
        "success": true,
        "count": inquiries.len(),
        "data": inquiries
    })))
}

/// Lists every inquiry, newest first
pub async fn get_all_inquiries(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let read_txn = state.db.begin_read()?;
    let table = read_txn.open_table(TABLE_INQUIRIES)?;

    // Ids are assigned monotonically, so reverse id order is creation
    // order, newest first.
    let mut inquiries: Vec<Inquiry> = Vec::new();
    for entry in table.iter()?.rev() {
        let (_, value) = entry?;
        inquiries.push(serde_json::from_str(value.value())?);
    }

    Ok(Json(json!({
        "success": true,
        "count": inquiries.len(),
        "data": inquiries
    })))
}

/// Resolves an index range into inquiry records, newest first
fn inquiries_by_reference(
    state: &AppState,
    index_table: redb::TableDefinition<&str, u64>,
    referenced_id: u64,
) -> Result<Vec<Inquiry>, ApiError> {
    let read_txn = state.db.begin_read()?;
    let index = read_txn.open_table(index_table)?;
    let table = read_txn.open_table(TABLE_INQUIRIES)?;

    let (start, end) = index_bounds(referenced_id);
    let mut inquiries = Vec::new();
    // Composite keys are chronological within the prefix; reversed for
    // newest-first ordering.
    for entry in index.range(start.as_str()..end.as_str())?.rev() {
        let (_, id_guard) = entry?;
        if let Some(guard) = table.get(id_guard.value())? {
            inquiries.push(serde_json::from_str(guard.value())?);
        }
    }

    Ok(inquiries)
}

/// Accepts a standalone general inquiry
///
/// Unlike the linked flow, `inquiryType` is client-supplied here and
/// required alongside the contact fields.
pub async fn submit_general_inquiry(
    State(state): State<AppState>,
    Json(payload): Json<SubmitGeneralInquiryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(inquiry_type), Some(name), Some(email), Some(phone), Some(message)) = (
        non_empty(payload.inquiry_type),
        non_empty(payload.name),
        non_empty(payload.email),
        non_empty(payload.phone),
        non_empty(payload.message),
    ) else {
        return Err(ApiError::Validation("All fields are required".to_string()));
    };

    let write_txn = state.db.begin_write()?;
    let record = {
        let mut table = write_txn.open_table(TABLE_GENERAL_INQUIRIES)?;
        let id = table.last()?.map(|(key, _)| key.value() + 1).unwrap_or(1);
        let record = GeneralInquiry {
            id,
            inquiry_type,
            name,
            email,
            phone,
            message,
            created_at: Utc::now(),
        };
        table.insert(id, serde_json::to_string(&record)?.as_str())?;
        record
    };
    write_txn.commit()?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Inquiry submitted successfully",
            "data": record
        })),
    ))
}

/// Fetches a single general inquiry by id
pub async fn get_general_inquiry_by_id(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let read_txn = state.db.begin_read()?;
    let table = read_txn.open_table(TABLE_GENERAL_INQUIRIES)?;

    let inquiry: GeneralInquiry = match table.get(id)? {
        Some(guard) => serde_json::from_str(guard.value())?,
        None => return Err(ApiError::NotFound("Inquiry not found")),
    };

    Ok(Json(json!({
        "success": true,
        "data": inquiry
    })))
}

/// Lists every general inquiry, newest first
pub async fn get_all_general_inquiries(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let read_txn = state.db.begin_read()?;
    let table = read_txn.open_table(TABLE_GENERAL_INQUIRIES)?;

    let mut inquiries: Vec<GeneralInquiry> = Vec::new();
    for entry in table.iter()?.rev() {
        let (_, value) = entry?;
        inquiries.push(serde_json::from_str(value.value())?);
    }

    Ok(Json(json!({
        "success": true,
        "count": inquiries.len(),
        "data": inquiries
    })))
}
