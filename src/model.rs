//! Data models for the real-estate listing API
//!
//! This module defines the persisted record structures and the typed
//! request/query parameter structs. Filters are explicit structs with
//! optional fields rather than free-form maps, so the supported criteria
//! are enumerable at compile time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a property is offered on the market
///
/// Serializes to the exact strings stored and returned by the API.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingType {
    #[serde(rename = "For Rent")]
    ForRent,
    #[serde(rename = "For Sale")]
    ForSale,
}

impl ListingType {
    /// Maps the client-facing URL slugs onto stored values
    ///
    /// Matching is case-insensitive; unrecognized slugs yield `None` and the
    /// caller drops the filter rather than failing the request.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.to_ascii_lowercase().as_str() {
            "for-rent" => Some(Self::ForRent),
            "for-sale" => Some(Self::ForSale),
            _ => None,
        }
    }

    /// Parses either the canonical stored value or a URL slug
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "For Rent" => Some(Self::ForRent),
            "For Sale" => Some(Self::ForSale),
            other => Self::from_slug(other),
        }
    }
}

/// A property listing as stored in the database
///
/// The `image` field always holds the bare filename of the uploaded file;
/// it is expanded to an absolute URL only at the response boundary.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Property {
    /// Auto-assigned identifier, immutable after creation
    pub id: u64,

    pub title: String,

    /// Asking price (monthly for rentals); always non-negative
    pub price: f64,

    pub city: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Free-form property category, e.g. "Apartment" or "Condo"
    #[serde(rename = "type")]
    pub property_type: String,

    #[serde(rename = "listingType")]
    pub listing_type: ListingType,

    /// Bare filename of the uploaded image, never an absolute URL
    pub image: String,

    /// Floor area in square feet
    #[serde(default)]
    pub size: Option<u32>,

    #[serde(default)]
    pub bedroom: Option<u32>,

    #[serde(default)]
    pub bathroom: Option<u32>,

    /// Garage spots; zero when not supplied
    #[serde(default)]
    pub garage: u32,

    /// Year built
    #[serde(default)]
    pub year: Option<u32>,

    pub address: String,

    #[serde(default)]
    pub zip_code: Option<String>,

    #[serde(default)]
    pub city_area: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    pub country: String,
}

/// Query parameters accepted by `GET /properties`
#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    /// Listing-type slug ("for-rent" / "for-sale"); unrecognized values are ignored
    #[serde(rename = "listingType")]
    pub listing_type: Option<String>,

    #[serde(rename = "type")]
    pub property_type: Option<String>,

    pub city: Option<String>,

    pub bedroom: Option<u32>,

    /// Inclusive upper price bound
    #[serde(rename = "maxPrice")]
    pub max_price: Option<f64>,
}

/// Query parameters accepted by `GET /properties/search`
#[derive(Deserialize, Debug, Default)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against title, city and description
    pub query: Option<String>,

    #[serde(rename = "type")]
    pub property_type: Option<String>,

    #[serde(rename = "minPrice")]
    pub min_price: Option<f64>,

    #[serde(rename = "maxPrice")]
    pub max_price: Option<f64>,

    pub bedrooms: Option<u32>,
}

/// A contact-form submission optionally linked to a property and/or user
///
/// Immutable after creation. The weak references are nulled when the
/// referenced property is deleted.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Inquiry {
    pub id: u64,

    pub name: String,

    pub email: String,

    pub phone: String,

    pub message: String,

    /// Derived on submission: "Property-Specific" when linked to a listing,
    /// "General" otherwise. Never client-supplied.
    #[serde(rename = "inquiryType")]
    pub inquiry_type: String,

    /// Authenticated submitter, when the request carried a valid token
    #[serde(rename = "userId")]
    pub user_id: Option<u64>,

    #[serde(rename = "propertyId")]
    pub property_id: Option<u64>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Request payload for `POST /inquiries/submit`
///
/// Required fields are `Option` so that missing values produce the API's
/// own 400 envelope instead of a deserialization rejection.
#[derive(Deserialize, Debug)]
pub struct SubmitInquiryRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "propertyId")]
    pub property_id: Option<u64>,
}

/// An unlinked contact-form record with a client-supplied inquiry type
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GeneralInquiry {
    pub id: u64,

    #[serde(rename = "inquiryType")]
    pub inquiry_type: String,

    pub name: String,

    pub email: String,

    pub phone: String,

    pub message: String,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Request payload for `POST /general-inquiries/submit-general-inquiry`
#[derive(Deserialize, Debug)]
pub struct SubmitGeneralInquiryRequest {
    #[serde(rename = "inquiryType")]
    pub inquiry_type: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}
