//! Category price catalog (external collaborator).

use std::sync::RwLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use treasury_core::CategoryId;

/// Price of a membership category over a validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPrice {
    pub category_id: CategoryId,
    pub price: Decimal,
    pub is_active: bool,
    /// First day the price applies (inclusive).
    pub date_from: NaiveDate,
    /// Last day the price applies (inclusive).
    pub date_until: NaiveDate,
}

impl CategoryPrice {
    pub fn applies(&self, category_id: CategoryId, on: NaiveDate) -> bool {
        self.is_active && self.category_id == category_id && self.date_from <= on && on <= self.date_until
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("category's price not found (category={category_id}, on={on})")]
    MissingPrice { category_id: CategoryId, on: NaiveDate },

    #[error("more than one price found (category={category_id}, on={on}, found={found})")]
    DuplicatePrice {
        category_id: CategoryId,
        on: NaiveDate,
        found: usize,
    },

    #[error("price catalog unavailable: {0}")]
    Unavailable(String),
}

/// Date-windowed price lookup.
pub trait PricingCatalog: Send + Sync {
    /// The single active price of `category_id` valid on `on`.
    ///
    /// Zero matches is `MissingPrice`, more than one is `DuplicatePrice`.
    fn find_active_price(&self, category_id: CategoryId, on: NaiveDate) -> Result<CategoryPrice, PricingError>;
}

/// In-memory price catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPriceCatalog {
    prices: RwLock<Vec<CategoryPrice>>,
}

impl InMemoryPriceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, price: CategoryPrice) -> Result<(), PricingError> {
        let mut prices = self.prices.write().map_err(|_| poisoned())?;
        prices.push(price);
        Ok(())
    }
}

fn poisoned() -> PricingError {
    PricingError::Unavailable("lock poisoned".to_string())
}

impl PricingCatalog for InMemoryPriceCatalog {
    fn find_active_price(&self, category_id: CategoryId, on: NaiveDate) -> Result<CategoryPrice, PricingError> {
        let prices = self
            .prices
            .read()
            .map_err(|_| poisoned())?;

        let mut matching = prices.iter().filter(|p| p.applies(category_id, on));
        match (matching.next(), matching.count()) {
            (None, _) => Err(PricingError::MissingPrice { category_id, on }),
            (Some(price), 0) => Ok(price.clone()),
            (Some(_), rest) => Err(PricingError::DuplicatePrice {
                category_id,
                on,
                found: rest + 1,
            }),
        }
    }
}
