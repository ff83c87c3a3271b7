//! CLI command implementations.

pub mod catalog;
pub mod session;
pub mod shopping;

use onlinestore_core::{Country, Product, convert_price};
use onlinestore_storefront::Result;
use onlinestore_storefront::state::AppState;
use onlinestore_storefront::users::UserStore;

/// Country of the signed-in user, or the default when nobody is signed in.
async fn display_country(state: &AppState) -> Result<Country> {
    Ok(state
        .users()
        .current_user()
        .await?
        .map(|user| user.country)
        .unwrap_or_default())
}

#[allow(clippy::print_stdout)]
fn print_product(product: &Product, country: Country) {
    println!(
        "#{:<5} {:<40} {:>12}  [{}]",
        product.id,
        product.title,
        convert_price(product.price, country).to_string(),
        product.category.name
    );
}

#[allow(clippy::print_stdout)]
fn print_products(products: &[Product], country: Country) {
    if products.is_empty() {
        println!("No products found");
        return;
    }
    for product in products {
        print_product(product, country);
    }
}
