//! Cart line items and the pure operations on a cart list.
//!
//! A cart holds at most one entry per product. Entry ids are assigned locally
//! as `1 + max(existing ids)`, so an id is never shared by two live entries.

use serde::{Deserialize, Serialize};

use super::id::CartEntryId;
use super::product::Product;

/// A line item awaiting checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: CartEntryId,
    pub product: Product,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartEntry {
    /// Create a single-quantity entry.
    #[must_use]
    pub const fn new(id: CartEntryId, product: Product) -> Self {
        Self {
            id,
            product,
            quantity: 1,
        }
    }
}

/// The id the next appended entry receives.
#[must_use]
pub fn next_entry_id(cart: &[CartEntry]) -> CartEntryId {
    let max = cart.iter().map(|entry| entry.id.as_i32()).max().unwrap_or(0);
    CartEntryId::new(max.saturating_add(1))
}

/// Whether any entry references `product`.
#[must_use]
pub fn contains_product(cart: &[CartEntry], product: &Product) -> bool {
    cart.iter().any(|entry| entry.product.same_product(product))
}

/// Sum of `price * quantity` over every entry, or `None` on overflow.
#[must_use]
pub fn total(cart: &[CartEntry]) -> Option<i64> {
    cart.iter().try_fold(0i64, |sum, entry| {
        entry
            .product
            .price
            .checked_mul(i64::from(entry.quantity))
            .and_then(|line| sum.checked_add(line))
    })
}

/// Toggle the presence of `product` in `cart`.
///
/// An existing entry is removed entirely regardless of its quantity; otherwise
/// a new single-quantity entry is appended. Returns `true` when an entry was
/// added.
// TODO: confirm with product whether adding a product already in the cart
// should increment its quantity instead of removing the line.
pub fn toggle_entry(cart: &mut Vec<CartEntry>, product: &Product) -> bool {
    if let Some(pos) = cart
        .iter()
        .position(|entry| entry.product.same_product(product))
    {
        cart.remove(pos);
        false
    } else {
        let id = next_entry_id(cart);
        cart.push(CartEntry::new(id, product.clone()));
        true
    }
}
