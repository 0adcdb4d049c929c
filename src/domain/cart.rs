use serde::{Deserialize, Serialize};
use tracing::warn;

use super::product::{Product, ProductId};
use crate::error::{CartError, Operation};

/// A product sitting in the cart together with the requested amount.
///
/// Serializes flat, `{ id, title, price, image, amount }`, which is the
/// record shape of the persisted cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub amount: u32,
}

impl CartItem {
    pub fn new(product: Product, amount: u32) -> Self {
        Self { product, amount }
    }

    pub fn id(&self) -> ProductId {
        self.product.id
    }

    pub fn subtotal(&self) -> f64 {
        self.product.price * f64::from(self.amount)
    }
}

/// Ordered cart contents, unique by product id, in insertion order.
///
/// All mutations check their preconditions first and leave the cart
/// untouched when they fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from raw records, dropping entries that would break the
    /// uniqueness or `amount >= 1` invariants.
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.amount == 0 {
                warn!(product_id = item.id(), "Dropping cart entry with zero amount");
                continue;
            }
            if cart.contains(item.id()) {
                warn!(product_id = item.id(), "Dropping duplicate cart entry");
                continue;
            }
            cart.items.push(item);
        }
        cart
    }

    /// Parses a persisted snapshot.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let items: Vec<CartItem> = serde_json::from_str(raw)?;
        Ok(Self::from_items(items))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    pub fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Adds one unit of `product` given `available` units in stock.
    ///
    /// Increments an existing entry or appends a new one with amount 1.
    /// Returns the entry's new amount.
    pub fn add(&mut self, product: Product, available: u32) -> Result<u32, CartError> {
        let product_id = product.id;
        match self.position(product_id) {
            Some(index) => {
                let entry = &mut self.items[index];
                if entry.amount >= available {
                    return Err(CartError::OutOfStock {
                        product_id,
                        requested: u64::from(entry.amount) + 1,
                        available,
                    });
                }
                entry.amount += 1;
                Ok(entry.amount)
            }
            None => {
                if available < 1 {
                    return Err(CartError::OutOfStock { product_id, requested: 1, available });
                }
                self.items.push(CartItem::new(product, 1));
                Ok(1)
            }
        }
    }

    pub fn remove(&mut self, product_id: ProductId) -> Result<CartItem, CartError> {
        let index = self
            .position(product_id)
            .ok_or(CartError::NotFound { product_id, operation: Operation::Remove })?;
        Ok(self.items.remove(index))
    }

    /// Sets the amount of an existing entry, bounded by `available`.
    pub fn set_amount(&mut self, product_id: ProductId, amount: u32, available: u32) -> Result<(), CartError> {
        let index = self
            .position(product_id)
            .ok_or(CartError::NotFound { product_id, operation: Operation::UpdateAmount })?;
        if amount == 0 {
            return Err(CartError::InvalidAmount { product_id, amount: 0 });
        }
        if amount > available {
            return Err(CartError::OutOfStock { product_id, requested: u64::from(amount), available });
        }
        self.items[index].amount = amount;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
