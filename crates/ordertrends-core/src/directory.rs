//! Restaurant directory search
//!
//! Free-text search, exact cuisine/location match, sorting and pagination over
//! the restaurant list.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{parse_field, present};
use crate::models::Restaurant;

/// Default page size
pub const DEFAULT_LIMIT: usize = 10;

/// Raw, unvalidated directory parameters
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RestaurantParams {
    /// Free-text search
    pub q: Option<String>,
    /// Exact cuisine
    pub cuisine: Option<String>,
    /// Exact location
    pub location: Option<String>,
    /// Sort field name
    pub sort: Option<String>,
    /// 1-based page number
    pub page: Option<String>,
    /// Page size
    pub limit: Option<String>,
}

/// Field the directory is sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    /// Restaurant name
    #[default]
    Name,
    /// Location
    Location,
    /// Cuisine
    Cuisine,
}

impl SortField {
    fn key(self, restaurant: &Restaurant) -> String {
        match self {
            Self::Name => restaurant.name.to_lowercase(),
            Self::Location => restaurant.location.to_lowercase(),
            Self::Cuisine => restaurant.cuisine.to_lowercase(),
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(Self::Name),
            "location" => Ok(Self::Location),
            "cuisine" => Ok(Self::Cuisine),
            other => Err(Error::validation(format!(
                "sort must be one of name, location, cuisine, got '{other}'"
            ))),
        }
    }
}

/// Validated directory query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantQuery {
    /// Lowercase substring matched against name, cuisine and location
    pub q: Option<String>,
    /// Lowercase cuisine, matched exactly
    pub cuisine: Option<String>,
    /// Lowercase location, matched exactly
    pub location: Option<String>,
    /// Sort field
    pub sort: SortField,
    /// 1-based page number
    pub page: usize,
    /// Page size
    pub limit: usize,
}

impl Default for RestaurantQuery {
    fn default() -> Self {
        Self {
            q: None,
            cuisine: None,
            location: None,
            sort: SortField::Name,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl RestaurantQuery {
    /// Parse and validate raw parameters; page and limit are clamped to 1
    pub fn parse(params: &RestaurantParams) -> Result<Self> {
        let lower = |raw: &Option<String>| present(raw.as_deref()).map(str::to_lowercase);

        let page: Option<i64> = parse_field(params.page.as_deref(), "page")?;
        let limit: Option<i64> = parse_field(params.limit.as_deref(), "limit")?;

        Ok(Self {
            q: lower(&params.q),
            cuisine: lower(&params.cuisine),
            location: lower(&params.location),
            sort: present(params.sort.as_deref())
                .map(SortField::from_str)
                .transpose()?
                .unwrap_or_default(),
            page: clamp_positive(page, 1),
            limit: clamp_positive(limit, DEFAULT_LIMIT),
        })
    }

    fn matches(&self, restaurant: &Restaurant) -> bool {
        if let Some(q) = &self.q {
            let haystack = format!(
                "{} {} {}",
                restaurant.name, restaurant.cuisine, restaurant.location
            )
            .to_lowercase();
            if !haystack.contains(q.as_str()) {
                return false;
            }
        }
        if let Some(cuisine) = &self.cuisine {
            if restaurant.cuisine.to_lowercase() != *cuisine {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if restaurant.location.to_lowercase() != *location {
                return false;
            }
        }
        true
    }
}

fn clamp_positive(value: Option<i64>, default: usize) -> usize {
    value.map_or(default, |v| usize::try_from(v.max(1)).unwrap_or(usize::MAX))
}

/// One page of directory results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantPage {
    /// Restaurants on this page
    pub data: Vec<Restaurant>,
    /// 1-based page number
    pub page: usize,
    /// Page size
    pub limit: usize,
    /// Number of matches across all pages
    pub total: usize,
}

/// Filter, sort and paginate restaurants
pub fn search(restaurants: &[Restaurant], query: &RestaurantQuery) -> RestaurantPage {
    let mut matches: Vec<&Restaurant> = restaurants.iter().filter(|r| query.matches(r)).collect();
    matches.sort_by_cached_key(|r| query.sort.key(r));

    let total = matches.len();
    let start = (query.page - 1).saturating_mul(query.limit);
    let data = matches
        .into_iter()
        .skip(start)
        .take(query.limit)
        .cloned()
        .collect();

    RestaurantPage {
        data,
        page: query.page,
        limit: query.limit,
        total,
    }
}
