//! Catalog product types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sweets_core::{Price, ProductId};

use super::ValidationErrors;

/// Image shown when a product has none.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

const MIN_NAME_LENGTH: usize = 2;
const MIN_DESCRIPTION_LENGTH: usize = 10;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub ingredients: Vec<String>,
    pub allergens: Vec<String>,
    pub is_available: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated product fields, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub ingredients: Vec<String>,
    pub allergens: Vec<String>,
    pub is_available: bool,
    pub is_featured: bool,
}

/// A list field that accepts either a JSON array or a comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    Items(Vec<String>),
    Text(String),
}

impl Default for ListInput {
    fn default() -> Self {
        Self::Items(Vec::new())
    }
}

impl ListInput {
    /// Trimmed, non-empty entries.
    #[must_use]
    pub fn into_items(self) -> Vec<String> {
        let raw = match self {
            Self::Items(items) => items,
            Self::Text(text) => text.split(',').map(str::to_owned).collect(),
        };
        raw.iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// Product input as submitted by an administrator.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ingredients: ListInput,
    #[serde(default)]
    pub allergens: ListInput,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub is_featured: bool,
}

const fn default_true() -> bool {
    true
}

impl ProductForm {
    /// Check every field and normalize list input.
    ///
    /// # Errors
    ///
    /// Returns all failed rules, not only the first.
    pub fn validate(self) -> Result<NewProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim().to_owned();
        if name.chars().count() < MIN_NAME_LENGTH {
            errors.add("name", "Name must be at least 2 characters.");
        }

        let description = self.description.trim().to_owned();
        if description.chars().count() < MIN_DESCRIPTION_LENGTH {
            errors.add(
                "description",
                "Description must be at least 10 characters.",
            );
        }

        let price = Price::new(self.price)
            .inspect_err(|_| errors.add("price", "Price must be greater than 0."))
            .ok();

        let ingredients = self.ingredients.into_items();
        if ingredients.is_empty() {
            errors.add("ingredients", "Ingredients cannot be empty.");
        }

        let image_url = self
            .image_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned());

        match price {
            Some(price) if errors.is_empty() => Ok(NewProduct {
                name,
                description,
                price,
                image_url,
                ingredients,
                allergens: self.allergens.into_items(),
                is_available: self.is_available,
                is_featured: self.is_featured,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(json: serde_json::Value) -> ProductForm {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_comma_separated_lists_are_split_and_trimmed() {
        let product = form(serde_json::json!({
            "name": "Snickerdoodle",
            "description": "Cinnamon sugar rolled and soft baked.",
            "price": "2.50",
            "ingredients": "Flour, Butter, , Cinnamon ",
            "allergens": ["Gluten", " ", "Dairy"],
        }))
        .validate()
        .unwrap();

        assert_eq!(product.ingredients, vec!["Flour", "Butter", "Cinnamon"]);
        assert_eq!(product.allergens, vec!["Gluten", "Dairy"]);
        assert_eq!(product.image_url, PLACEHOLDER_IMAGE);
        assert!(product.is_available);
        assert!(!product.is_featured);
    }

    #[test]
    fn test_collects_every_failed_rule() {
        let errors = form(serde_json::json!({
            "name": "S",
            "description": "short",
            "price": "0",
            "ingredients": " , ",
        }))
        .validate()
        .unwrap_err();

        for field in ["name", "description", "price", "ingredients"] {
            assert!(errors.has(field), "{field} should be rejected");
        }
        assert_eq!(errors.fields().len(), 4);
    }

    #[test]
    fn test_price_only_failure_is_reported() {
        let errors = form(serde_json::json!({
            "name": "Sugar Cookie",
            "description": "Simple yet delicious sugar cookies.",
            "price": "-2.00",
            "ingredients": ["Flour"],
        }))
        .validate()
        .unwrap_err();

        assert!(errors.has("price"));
        assert_eq!(errors.to_string(), "Price must be greater than 0.");
    }
}
