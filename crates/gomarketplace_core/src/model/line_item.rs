//! Line item domain model.
//!
//! # Responsibility
//! - Define one product entry in the cart together with its quantity.
//! - Keep the persisted wire field names stable (`image_url`, `quantity`).
//!
//! # Invariants
//! - `quantity` is always >= 1 for items owned by a cart.
//! - `id`, `title` and `price` are taken as supplied by the catalog.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque stable product identifier supplied by the catalog.
pub type ProductId = String;

/// Violations of the invariants the cart store maintains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItemValidationError {
    ZeroQuantity { id: ProductId },
    DuplicateId { id: ProductId },
}

impl Display for LineItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroQuantity { id } => {
                write!(f, "line item `{id}` has quantity 0; expected >= 1")
            }
            Self::DuplicateId { id } => write!(f, "line item `{id}` appears more than once"),
        }
    }
}

impl Error for LineItemValidationError {}

/// Product data passed to `add_to_cart`: a line item without its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: f64,
}

impl NewLineItem {
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    /// Unit price; currency is implied by the storefront.
    pub price: f64,
    pub quantity: u32,
}

impl LineItem {
    /// Creates the first unit of `product` as it enters the cart.
    pub fn first_unit(product: NewLineItem) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity: 1,
        }
    }

    /// Returns a copy of this item with `quantity` replaced.
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    /// Checks the per-item invariant the store guarantees (`quantity >= 1`).
    ///
    /// Catalog-supplied fields are not checked: `add_to_cart` accepts them as
    /// is, so restoring must accept them too.
    pub fn validate(&self) -> Result<(), LineItemValidationError> {
        if self.quantity == 0 {
            return Err(LineItemValidationError::ZeroQuantity {
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Line subtotal (`price * quantity`).
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}
