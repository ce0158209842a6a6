use crate::framework::Editable;
use crate::server::Record;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    /// Display price in cents.
    pub price_cents: u64,
    pub description: String,
    pub rating: f64,
}

impl Product {
    pub fn new(id: u32, name: impl Into<String>, price_cents: u64) -> Self {
        Self {
            id,
            name: name.into(),
            price_cents,
            description: String::new(),
            rating: 0.0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Price formatted as `$12.50`.
    pub fn price(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price_cents: Option<u64>,
    pub description: Option<String>,
    pub rating: Option<f64>,
}

impl Editable for Product {
    type Patch = ProductPatch;

    fn merged(&self, patch: ProductPatch) -> Self {
        Self {
            id: self.id,
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            price_cents: patch.price_cents.unwrap_or(self.price_cents),
            description: patch.description.unwrap_or_else(|| self.description.clone()),
            rating: patch.rating.unwrap_or(self.rating),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product name is empty")]
    EmptyName,
    #[error("Rating {0} is outside 0..=5")]
    RatingOutOfRange(f64),
}

impl Record for Product {
    type Id = u32;
    type Error = ProductError;

    fn id(&self) -> u32 {
        self.id
    }

    /// Trims the name and rounds the rating to one decimal.
    fn normalize(mut self, _previous: Option<&Self>) -> Result<Self, ProductError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(ProductError::EmptyName);
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(ProductError::RatingOutOfRange(self.rating));
        }
        self.rating = (self.rating * 10.0).round() / 10.0;
        Ok(self)
    }
}
