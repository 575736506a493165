// SPDX-License-Identifier: GPL-3.0-only

//! Filter catalog
//!
//! The catalog is static configuration: built once (the built-in film looks
//! or a JSON file), validated, then shared read-only through an `Arc`.

use super::expression::CompositeExpression;
use super::pixel::PixelTransform;
use crate::errors::FilterError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// One named filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    /// Unique id, also used as the tag on captured photos
    pub id: String,
    /// Label shown on the filter button
    pub display_name: String,
    /// Compositing expression (CSS filter syntax)
    pub expression: CompositeExpression,
    /// Optional numeric per-pixel rule run before the expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_transform: Option<PixelTransform>,
    /// Presentation style hook (CSS class of the photo frame)
    #[serde(default)]
    pub style_class: String,
}

impl FilterDescriptor {
    /// Build a descriptor, parsing the expression
    pub fn new(
        id: &str,
        display_name: &str,
        expression: &str,
        pixel_transform: Option<PixelTransform>,
        style_class: &str,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            expression: CompositeExpression::parse(expression)?,
            pixel_transform,
            style_class: style_class.to_string(),
        })
    }
}

/// Ordered, immutable set of filters with unique ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FilterDescriptor>", into = "Vec<FilterDescriptor>")]
pub struct FilterCatalog {
    filters: Vec<FilterDescriptor>,
}

impl FilterCatalog {
    /// Validate and wrap a list of filters
    pub fn new(filters: Vec<FilterDescriptor>) -> Result<Self, FilterError> {
        if filters.is_empty() {
            return Err(FilterError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for filter in &filters {
            if filter.id.trim().is_empty() {
                return Err(FilterError::EmptyId);
            }
            if !seen.insert(filter.id.as_str()) {
                return Err(FilterError::DuplicateId(filter.id.clone()));
            }
        }

        Ok(Self { filters })
    }

    /// The seven built-in film looks
    pub fn builtin() -> Self {
        let entries: [(&str, &str, Option<PixelTransform>, &str); 7] = [
            (
                "90s",
                "sepia(0.4) contrast(1.2) saturate(0.8) hue-rotate(-10deg)",
                Some(PixelTransform::WarmTone),
                "_90s",
            ),
            (
                "2000s",
                "saturate(1.6) contrast(1.1) brightness(1.05)",
                None,
                "_2000s",
            ),
            (
                "Noir",
                "grayscale(1) contrast(1.3)",
                Some(PixelTransform::MonoContrast),
                "noir",
            ),
            ("Fisheye", "brightness(1.1) contrast(1.2)", None, "fisheye"),
            (
                "Rainbow",
                "hue-rotate(90deg) saturate(1.5)",
                Some(PixelTransform::ChannelRotate),
                "rainbow",
            ),
            ("Glitch", "contrast(1.5) saturate(2)", None, "glitch"),
            ("Crosshatch", "grayscale(0.5) blur(0.5px)", None, "crosshatch"),
        ];

        let filters = entries
            .into_iter()
            .map(|(id, expression, pixel_transform, style_class)| FilterDescriptor {
                id: id.to_string(),
                display_name: id.to_string(),
                // Built-in expressions are covered by tests
                expression: CompositeExpression::parse(expression).unwrap_or_default(),
                pixel_transform,
                style_class: style_class.to_string(),
            })
            .collect();

        Self { filters }
    }

    /// Parse a catalog from JSON (an array of descriptors)
    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        serde_json::from_str(json).map_err(|e| FilterError::InvalidCatalog(e.to_string()))
    }

    /// Load a catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self, FilterError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| FilterError::InvalidCatalog(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json(&json)?;
        info!(path = %path.display(), filters = catalog.len(), "Loaded filter catalog");
        Ok(catalog)
    }

    /// Look up a filter by id
    pub fn get(&self, id: &str) -> Result<&FilterDescriptor, FilterError> {
        self.find(id)
            .ok_or_else(|| FilterError::UnknownFilter(id.to_string()))
    }

    /// Look up a filter by id, `None` when missing
    pub fn find(&self, id: &str) -> Option<&FilterDescriptor> {
        self.filters.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// First filter of the catalog
    pub fn first(&self) -> &FilterDescriptor {
        &self.filters[0]
    }

    /// Filters in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.filters.iter()
    }

    /// Filter ids in catalog order
    pub fn ids(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for FilterCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TryFrom<Vec<FilterDescriptor>> for FilterCatalog {
    type Error = FilterError;

    fn try_from(filters: Vec<FilterDescriptor>) -> Result<Self, Self::Error> {
        Self::new(filters)
    }
}

impl From<FilterCatalog> for Vec<FilterDescriptor> {
    fn from(catalog: FilterCatalog) -> Self {
        catalog.filters
    }
}
