//! Wishlist, cart and price commands for the signed-in user.

use onlinestore_core::{Country, Product, ProductId, cart, convert_price};
use onlinestore_storefront::catalog::CatalogError;
use onlinestore_storefront::state::AppState;
use onlinestore_storefront::wishlist::ToggleOutcome;
use onlinestore_storefront::{Result, StoreError};

use super::{display_country, print_product, print_products};

/// Load the signed-in user into the store.
async fn load(state: &AppState) -> Result<()> {
    if state.store().refresh().await? {
        Ok(())
    } else {
        Err(StoreError::NotSignedIn)
    }
}

/// Look up `product_id` in the catalog, falling back to the copy mirrored in
/// the store so a product deleted upstream can still be toggled off.
async fn resolve_product(state: &AppState, product_id: ProductId) -> Result<Product> {
    match state.catalog().fetch_product(product_id).await {
        Ok(product) => Ok(product),
        Err(CatalogError::NotFound(what)) => state
            .store()
            .mirrored_product(product_id)
            .ok_or_else(|| CatalogError::NotFound(what).into()),
        Err(e) => Err(e.into()),
    }
}

/// List favorites whose title contains `query` (all of them when empty).
///
/// # Errors
///
/// Returns `StoreError::NotSignedIn` if nobody is signed in.
#[allow(clippy::print_stdout)]
pub async fn list_wishlist(state: &AppState, query: String) -> Result<()> {
    load(state).await?;
    let store = state.store();
    store.set_search_query(query);

    let favorites = store.filtered_favorites();
    if favorites.is_empty() && store.favorites().is_empty() {
        println!("Your wishlist is empty");
        return Ok(());
    }
    print_products(&favorites, store.current_country());
    Ok(())
}

/// Add a product to the wishlist, or remove it if already there.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the product is neither in the
/// catalog nor already mirrored, or the user file cannot be saved.
#[allow(clippy::print_stdout)]
pub async fn toggle_wishlist(state: &AppState, product_id: ProductId) -> Result<()> {
    load(state).await?;
    let product = resolve_product(state, product_id).await?;

    match state.store().toggle_favorite(&product).await? {
        ToggleOutcome::Added => println!("Added \"{}\" to your wishlist", product.title),
        ToggleOutcome::Removed => println!("Removed \"{}\" from your wishlist", product.title),
        ToggleOutcome::NoSession => return Err(StoreError::NotSignedIn),
    }
    Ok(())
}

/// List cart entries with their converted prices.
///
/// # Errors
///
/// Returns `StoreError::NotSignedIn` if nobody is signed in, or
/// `StoreError::CartTotalOverflow` if the total does not fit in a price.
#[allow(clippy::print_stdout)]
pub async fn list_cart(state: &AppState) -> Result<()> {
    load(state).await?;
    let store = state.store();
    let entries = store.cart();
    if entries.is_empty() {
        println!("Your cart is empty");
        return Ok(());
    }

    let country = store.current_country();
    for entry in &entries {
        print_product(&entry.product, country);
    }
    let total = cart::total(&entries).ok_or(StoreError::CartTotalOverflow)?;
    println!("Total: {}", store.convert_price(total));
    Ok(())
}

/// Put a product in the cart, or remove its line if already there.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the product is neither in the
/// catalog nor already mirrored, or the user file cannot be saved.
#[allow(clippy::print_stdout)]
pub async fn toggle_cart(state: &AppState, product_id: ProductId) -> Result<()> {
    load(state).await?;
    let product = resolve_product(state, product_id).await?;

    match state.store().toggle_cart_entry(&product).await? {
        ToggleOutcome::Added => println!("Added \"{}\" to your cart", product.title),
        ToggleOutcome::Removed => println!("Removed \"{}\" from your cart", product.title),
        ToggleOutcome::NoSession => return Err(StoreError::NotSignedIn),
    }
    Ok(())
}

/// Print `amount` converted for `country`, or for the signed-in user.
///
/// # Errors
///
/// Returns an error if the user file cannot be read.
#[allow(clippy::print_stdout)]
pub async fn price(state: &AppState, amount: i64, country: Option<Country>) -> Result<()> {
    let country = match country {
        Some(country) => country,
        None => display_country(state).await?,
    };
    println!("{}", convert_price(amount, country));
    Ok(())
}
