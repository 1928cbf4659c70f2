//! HTTP request handlers for property listings
//!
//! This module implements the property endpoints:
//! - Listing with exact-match and bounded filters
//! - Text search across title, city and description
//! - Distinct filter-menu values
//! - Structured single-property detail view
//! - Create/update/delete with synchronized image-file lifecycle

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use rand::{distr::Alphanumeric, Rng};
use redb::ReadableTable;
use serde_json::{json, Value};

use crate::database::{
    fetch_property, index_bounds, scan_properties, AppState, TABLE_INQUIRIES,
    TABLE_INQUIRY_PROPERTY_INDEX, TABLE_PROPERTIES,
};
use crate::error::ApiError;
use crate::image::{request_base_url, resolve_image_url};
use crate::middleware::Claims;
use crate::model::{Inquiry, ListQuery, ListingType, Property, SearchQuery};
use crate::query::{filter_options, PropertyFilter, SearchFilter};

/// Serializes a property for a list/detail response
///
/// Storage keeps the bare filename; the response carries the absolute URL.
fn present_property(property: &Property, base_url: &str) -> Result<Value, ApiError> {
    let mut value = serde_json::to_value(property)?;
    value["image"] = match resolve_image_url(base_url, &property.image) {
        Some(url) => Value::String(url),
        None => Value::Null,
    };
    Ok(value)
}

fn present_all(
    properties: &[Property],
    filter: impl Fn(&Property) -> bool,
    base_url: &str,
) -> Result<Vec<Value>, ApiError> {
    properties
        .iter()
        .filter(|property| filter(property))
        .map(|property| present_property(property, base_url))
        .collect()
}

fn list_response(listed: Vec<Value>) -> Json<Value> {
    Json(json!({
        "success": true,
        "count": listed.len(),
        "properties": listed
    }))
}

/// Lists properties matching the optional query filters
///
/// # Query Parameters
///
/// - `listingType` - "for-rent" / "for-sale" slug; unrecognized values are ignored
/// - `type` - exact property category match
/// - `city` - exact match
/// - `bedroom` - exact match
/// - `maxPrice` - inclusive upper bound
///
/// An empty result is a 200 with `count: 0`, never an error.
pub async fn list_properties(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let filter = PropertyFilter::from_query(&params);
    let properties = scan_properties(&state.db)?;
    let base_url = request_base_url(&state.config, &headers);

    let listed = present_all(&properties, |property| filter.matches(property), &base_url)?;
    Ok(list_response(listed))
}

/// Searches properties by free text combined with range filters
///
/// `query` matches case-insensitively against title, city and description;
/// `type`, `bedrooms`, `minPrice` and `maxPrice` AND-combine with it.
/// Absence of all parameters returns the unfiltered set.
pub async fn search_properties(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let filter = SearchFilter::from_query(&params);
    let properties = scan_properties(&state.db)?;
    let base_url = request_base_url(&state.config, &headers);

    let listed = present_all(&properties, |property| filter.matches(property), &base_url)?;
    Ok(list_response(listed))
}

/// Returns the distinct values available for client-side filter menus
pub async fn get_filter_options(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = scan_properties(&state.db)?;
    let options = filter_options(&properties);

    Ok(Json(json!({
        "success": true,
        "propertyTypes": options.property_types,
        "locations": options.locations,
        "bedroomSizes": options.bedroom_sizes
    })))
}

/// Lists all rental properties
pub async fn get_rent_properties(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    list_by_listing_type(&state, &headers, ListingType::ForRent)
}

/// Lists all properties for sale
pub async fn get_sale_properties(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    list_by_listing_type(&state, &headers, ListingType::ForSale)
}

fn list_by_listing_type(
    state: &AppState,
    headers: &HeaderMap,
    listing_type: ListingType,
) -> Result<Json<Value>, ApiError> {
    let properties = scan_properties(&state.db)?;
    let base_url = request_base_url(&state.config, headers);

    let listed = present_all(
        &properties,
        |property| property.listing_type == listing_type,
        &base_url,
    )?;
    Ok(list_response(listed))
}

/// Returns the structured detail view of a single property
///
/// # Response
///
/// - **200** - `{success, property}` with header fields, address block,
///   description, overview numerics and a `details` sub-object that carries
///   the human-readable property code (`PR-` + zero-padded id)
/// - **404** - no property with this id
pub async fn get_property_by_id(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let property =
        fetch_property(&state.db, id)?.ok_or(ApiError::NotFound("Property not found"))?;
    let base_url = request_base_url(&state.config, &headers);

    let structured = json!({
        // Main header info
        "id": property.id,
        "title": &property.title,
        "price": property.price,
        "type": &property.property_type,
        "listingType": property.listing_type,
        "image": resolve_image_url(&base_url, &property.image),

        // Address block
        "address": &property.address,
        "zip_code": &property.zip_code,
        "city": &property.city,
        "city_area": &property.city_area,
        "state": &property.state,
        "country": &property.country,

        // Description
        "description": &property.description,

        // Overview
        "year": property.year,
        "size": property.size,
        "bedroom": property.bedroom,
        "bathroom": property.bathroom,
        "garage": property.garage,

        // Details section
        "details": {
            "propertyId": format!("PR-{:06}", property.id),
            "propertySize": property.size,
            "propertyType": &property.property_type,
            "bedrooms": property.bedroom,
            "bathrooms": property.bathroom
        },

        "features": [
            "Air Conditioning", "Dryer", "Washer", "TV Cable", "Kitchen Appliances"
        ]
    });

    Ok(Json(json!({
        "success": true,
        "property": structured
    })))
}

/// Creates a new property listing from a multipart form
///
/// The `image` file part is mandatory; its bytes are written to the upload
/// directory under a generated name and only that bare filename is stored.
///
/// # Response
///
/// - **201 Created** - `{success, message, property}` with the resolved image URL
/// - **400 Bad Request** - missing image or invalid field values
pub async fn create_property(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (fields, upload) = collect_multipart(&mut multipart).await?;

    // Validate before touching the file system, so a rejected request
    // leaves no orphaned upload behind.
    let Some((original_name, data)) = upload else {
        return Err(ApiError::Validation("Image is required".to_string()));
    };

    let draft = Property {
        id: 0, // assigned below inside the write transaction
        title: required_text(&fields, "title")?,
        price: parse_price(&required_text(&fields, "price")?)?,
        city: required_text(&fields, "city")?,
        description: text_field(&fields, "description"),
        property_type: required_text(&fields, "type")?,
        listing_type: parse_listing_type(&required_text(&fields, "listingType")?)?,
        image: String::new(),
        size: parse_integer(&fields, "size")?,
        bedroom: parse_integer(&fields, "bedroom")?,
        bathroom: parse_integer(&fields, "bathroom")?,
        garage: parse_integer(&fields, "garage")?.unwrap_or(0),
        year: parse_integer(&fields, "year")?,
        address: required_text(&fields, "address")?,
        zip_code: text_field(&fields, "zip_code"),
        city_area: text_field(&fields, "city_area"),
        state: text_field(&fields, "state"),
        country: text_field(&fields, "country")
            .unwrap_or_else(|| "United States".to_string()),
    };

    let image = store_image(&state.config.upload_dir, &original_name, &data).await?;

    let write_txn = state.db.begin_write()?;
    let record = {
        let mut table = write_txn.open_table(TABLE_PROPERTIES)?;
        let id = table.last()?.map(|(key, _)| key.value() + 1).unwrap_or(1);
        let record = Property {
            id,
            image,
            ..draft
        };
        table.insert(id, serde_json::to_string(&record)?.as_str())?;
        record
    };
    write_txn.commit()?;

    let base_url = request_base_url(&state.config, &headers);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Property created",
            "property": present_property(&record, &base_url)?
        })),
    ))
}

/// Updates a property listing, optionally replacing its image
///
/// Admin only. Fields absent from the multipart form keep their stored
/// values. When a new image is uploaded the new file is written and the
/// record committed first; only then is the superseded file deleted, so a
/// crash in between never leaves the record pointing at a missing file.
pub async fn update_property(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    if !claims.is_admin {
        return Err(ApiError::Unauthorized("Not Authorized".to_string()));
    }

    let mut updated =
        fetch_property(&state.db, id)?.ok_or(ApiError::NotFound("Property not found"))?;

    let (fields, upload) = collect_multipart(&mut multipart).await?;

    if let Some(title) = text_field(&fields, "title") {
        updated.title = title;
    }
    if let Some(raw) = text_field(&fields, "price") {
        updated.price = parse_price(&raw)?;
    }
    if let Some(city) = text_field(&fields, "city") {
        updated.city = city;
    }
    if let Some(description) = text_field(&fields, "description") {
        updated.description = Some(description);
    }
    if let Some(property_type) = text_field(&fields, "type") {
        updated.property_type = property_type;
    }
    if let Some(raw) = text_field(&fields, "listingType") {
        updated.listing_type = parse_listing_type(&raw)?;
    }
    if let Some(size) = parse_integer(&fields, "size")? {
        updated.size = Some(size);
    }
    if let Some(bedroom) = parse_integer(&fields, "bedroom")? {
        updated.bedroom = Some(bedroom);
    }
    if let Some(bathroom) = parse_integer(&fields, "bathroom")? {
        updated.bathroom = Some(bathroom);
    }
    if let Some(garage) = parse_integer(&fields, "garage")? {
        updated.garage = garage;
    }
    if let Some(year) = parse_integer(&fields, "year")? {
        updated.year = Some(year);
    }
    if let Some(address) = text_field(&fields, "address") {
        updated.address = address;
    }
    if let Some(zip_code) = text_field(&fields, "zip_code") {
        updated.zip_code = Some(zip_code);
    }
    if let Some(city_area) = text_field(&fields, "city_area") {
        updated.city_area = Some(city_area);
    }
    if let Some(region) = text_field(&fields, "state") {
        updated.state = Some(region);
    }
    if let Some(country) = text_field(&fields, "country") {
        updated.country = country;
    }

    // Two-phase image replacement: the new file lands on disk and the
    // record switches to it before the old file is touched.
    let mut superseded_image = None;
    if let Some((original_name, data)) = upload {
        let new_image = store_image(&state.config.upload_dir, &original_name, &data).await?;
        superseded_image = Some(std::mem::replace(&mut updated.image, new_image));
    }

    let write_txn = state.db.begin_write()?;
    {
        let mut table = write_txn.open_table(TABLE_PROPERTIES)?;
        table.insert(id, serde_json::to_string(&updated)?.as_str())?;
    }
    write_txn.commit()?;

    if let Some(old_image) = superseded_image {
        remove_image_file(&state.config.upload_dir, &old_image).await;
    }

    let base_url = request_base_url(&state.config, &headers);
    Ok(Json(json!({
        "success": true,
        "message": "Property updated successfully",
        "property": present_property(&updated, &base_url)?
    })))
}

/// Deletes a property listing together with its image file
///
/// Admin only. The row removal and the nulling of inquiry back-references
/// happen in one transaction; the image file is removed afterwards on a
/// best-effort basis and a failure there never blocks the deletion.
pub async fn delete_property(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    if !claims.is_admin {
        return Err(ApiError::Unauthorized("Not Authorized".to_string()));
    }

    let write_txn = state.db.begin_write()?;
    let removed = {
        let mut table = write_txn.open_table(TABLE_PROPERTIES)?;
        let removed: Property = match table.remove(id)? {
            Some(guard) => serde_json::from_str(guard.value())?,
            None => return Err(ApiError::NotFound("Property not found")),
        };

        // Weak references: linked inquiries survive with the property
        // link nulled, mirroring ON DELETE SET NULL.
        let mut inquiries = write_txn.open_table(TABLE_INQUIRIES)?;
        let mut index = write_txn.open_table(TABLE_INQUIRY_PROPERTY_INDEX)?;
        let (start, end) = index_bounds(id);
        let linked: Vec<(String, u64)> = index
            .range(start.as_str()..end.as_str())?
            .map(|entry| entry.map(|(key, value)| (key.value().to_string(), value.value())))
            .collect::<Result<_, _>>()?;

        for (key, inquiry_id) in linked {
            let unlinked = match inquiries.get(inquiry_id)? {
                Some(guard) => {
                    let mut inquiry: Inquiry = serde_json::from_str(guard.value())?;
                    inquiry.property_id = None;
                    Some(inquiry)
                }
                None => None,
            };
            if let Some(inquiry) = unlinked {
                inquiries.insert(inquiry_id, serde_json::to_string(&inquiry)?.as_str())?;
            }
            index.remove(key.as_str())?;
        }

        removed
    };
    write_txn.commit()?;

    remove_image_file(&state.config.upload_dir, &removed.image).await;

    Ok(Json(json!({
        "success": true,
        "message": "Property deleted successfully"
    })))
}

/// Drains a multipart form into text fields plus the optional image part
async fn collect_multipart(
    multipart: &mut Multipart,
) -> Result<(HashMap<String, String>, Option<(String, Bytes)>), ApiError> {
    let mut fields = HashMap::new();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "image" {
            let original_name = field.file_name().unwrap_or("upload").to_owned();
            let data = field.bytes().await?;
            if !data.is_empty() {
                upload = Some((original_name, data));
            }
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    Ok((fields, upload))
}

/// Writes uploaded image bytes under a generated filename
///
/// The stored name is a random alphanumeric stem keeping the original
/// extension, so client-supplied names never reach the file system.
async fn store_image(
    upload_dir: &std::path::Path,
    original_name: &str,
    data: &[u8],
) -> Result<String, ApiError> {
    let stem: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    let filename = match std::path::Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    };

    tokio::fs::create_dir_all(upload_dir).await?;
    tokio::fs::write(upload_dir.join(&filename), data).await?;

    Ok(filename)
}

/// Best-effort removal of a stored image file
///
/// Failures (including an already-absent file) are logged and swallowed;
/// the record operation remains the source of truth.
async fn remove_image_file(upload_dir: &std::path::Path, stored: &str) {
    // Stored references are bare filenames; strip path components regardless.
    let Some(filename) = std::path::Path::new(stored).file_name() else {
        return;
    };

    let path = upload_dir.join(filename);
    if let Err(error) = tokio::fs::remove_file(&path).await {
        tracing::warn!(path = %path.display(), %error, "failed to remove image file");
    }
}

fn text_field(fields: &HashMap<String, String>, key: &str) -> Option<String> {
    fields.get(key).filter(|value| !value.is_empty()).cloned()
}

fn required_text(fields: &HashMap<String, String>, key: &str) -> Result<String, ApiError> {
    text_field(fields, key).ok_or_else(|| ApiError::Validation(format!("{key} is required")))
}

fn parse_price(raw: &str) -> Result<f64, ApiError> {
    let price: f64 = raw
        .parse()
        .map_err(|_| ApiError::Validation("price must be a number".to_string()))?;
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::Validation(
            "price must be a non-negative number".to_string(),
        ));
    }
    Ok(price)
}

fn parse_integer(fields: &HashMap<String, String>, key: &str) -> Result<Option<u32>, ApiError> {
    match fields.get(key).filter(|value| !value.is_empty()) {
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            ApiError::Validation(format!("{key} must be a non-negative integer"))
        }),
        None => Ok(None),
    }
}

fn parse_listing_type(raw: &str) -> Result<ListingType, ApiError> {
    ListingType::parse(raw).ok_or_else(|| {
        ApiError::Validation("listingType must be 'For Rent' or 'For Sale'".to_string())
    })
}
