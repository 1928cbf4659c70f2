//! Property query engine
//!
//! Filtering and search run over a full scan of the property table. The
//! criteria live in explicit structs built from the request's query
//! parameters; a field left `None` simply does not constrain the result.

use std::collections::BTreeSet;

use crate::model::{ListQuery, ListingType, Property, SearchQuery};

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_owned)
}

/// Exact-match and bounded filters for `GET /properties`
///
/// All present criteria AND-combine. An unrecognized listing-type slug is
/// dropped here, so it neither constrains nor fails the query.
#[derive(Debug, Default, Clone)]
pub struct PropertyFilter {
    pub listing_type: Option<ListingType>,
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub bedroom: Option<u32>,
    /// Inclusive upper bound
    pub max_price: Option<f64>,
}

impl PropertyFilter {
    pub fn from_query(params: &ListQuery) -> Self {
        Self {
            listing_type: params
                .listing_type
                .as_deref()
                .and_then(ListingType::from_slug),
            property_type: non_empty(&params.property_type),
            city: non_empty(&params.city),
            bedroom: params.bedroom,
            max_price: params.max_price,
        }
    }

    pub fn matches(&self, property: &Property) -> bool {
        if let Some(listing_type) = self.listing_type {
            if property.listing_type != listing_type {
                return false;
            }
        }
        if let Some(property_type) = &self.property_type {
            if &property.property_type != property_type {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if &property.city != city {
                return false;
            }
        }
        if let Some(bedroom) = self.bedroom {
            if property.bedroom != Some(bedroom) {
                return false;
            }
        }
        if let Some(max_price) = self.max_price {
            if property.price > max_price {
                return false;
            }
        }
        true
    }
}

/// Text search plus range filters for `GET /properties/search`
///
/// The text query OR-combines across title, city and description; every
/// other criterion ANDs with it. With no criteria at all the filter matches
/// everything.
#[derive(Debug, Default, Clone)]
pub struct SearchFilter {
    /// Lowercased needle for case-insensitive substring matching
    pub query: Option<String>,
    pub property_type: Option<String>,
    pub bedrooms: Option<u32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl SearchFilter {
    pub fn from_query(params: &SearchQuery) -> Self {
        Self {
            query: non_empty(&params.query).map(|q| q.to_lowercase()),
            property_type: non_empty(&params.property_type),
            bedrooms: params.bedrooms,
            min_price: params.min_price,
            max_price: params.max_price,
        }
    }

    pub fn matches(&self, property: &Property) -> bool {
        if let Some(needle) = &self.query {
            let hit = property.title.to_lowercase().contains(needle)
                || property.city.to_lowercase().contains(needle)
                || property
                    .description
                    .as_deref()
                    .is_some_and(|description| description.to_lowercase().contains(needle));
            if !hit {
                return false;
            }
        }
        if let Some(property_type) = &self.property_type {
            if &property.property_type != property_type {
                return false;
            }
        }
        if let Some(bedrooms) = self.bedrooms {
            if property.bedroom != Some(bedrooms) {
                return false;
            }
        }
        if let Some(min_price) = self.min_price {
            if property.price < min_price {
                return false;
            }
        }
        if let Some(max_price) = self.max_price {
            if property.price > max_price {
                return false;
            }
        }
        true
    }
}

/// Distinct values currently present in the store, for client filter menus
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Lexicographically sorted
    pub property_types: Vec<String>,
    /// Lexicographically sorted cities
    pub locations: Vec<String>,
    /// Numerically ascending bedroom counts
    pub bedroom_sizes: Vec<u32>,
}

/// Extracts the distinct filter menu values from the stored properties
pub fn filter_options(properties: &[Property]) -> FilterOptions {
    let mut property_types = BTreeSet::new();
    let mut locations = BTreeSet::new();
    let mut bedroom_sizes = BTreeSet::new();

    for property in properties {
        property_types.insert(property.property_type.clone());
        locations.insert(property.city.clone());
        if let Some(bedroom) = property.bedroom {
            bedroom_sizes.insert(bedroom);
        }
    }

    FilterOptions {
        property_types: property_types.into_iter().collect(),
        locations: locations.into_iter().collect(),
        bedroom_sizes: bedroom_sizes.into_iter().collect(),
    }
}
