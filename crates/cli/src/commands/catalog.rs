//! Catalog browsing and manager CRUD commands.

use onlinestore_core::{CategoryId, CategoryRequest, ProductId, ProductRequest};
use onlinestore_storefront::Result;
use onlinestore_storefront::catalog::ProductFilter;
use onlinestore_storefront::state::AppState;
use tracing::info;

use super::{display_country, print_product, print_products};

/// Fields to change on an existing product. `None` keeps the current value.
pub struct ProductPatch {
    pub title: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub images: Option<Vec<String>>,
}

/// List products matching `filter`.
///
/// # Errors
///
/// Returns an error if the catalog API or the user store fails.
pub async fn list_products(state: &AppState, filter: &ProductFilter) -> Result<()> {
    let products = state.catalog().fetch_products(filter).await?;
    let country = display_country(state).await?;
    print_products(&products, country);
    Ok(())
}

/// Show one product with its description and images.
///
/// # Errors
///
/// Returns an error if the product does not exist or the API fails.
#[allow(clippy::print_stdout)]
pub async fn show_product(state: &AppState, id: ProductId) -> Result<()> {
    let product = state.catalog().fetch_product(id).await?;
    let country = display_country(state).await?;

    print_product(&product, country);
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
    for image in &product.images {
        println!("  {image}");
    }
    Ok(())
}

/// Create a product.
///
/// # Errors
///
/// Returns an error if the API rejects the request.
#[allow(clippy::print_stdout)]
pub async fn create_product(state: &AppState, request: ProductRequest) -> Result<()> {
    let product = state.catalog().create_product(&request).await?;
    info!(product_id = %product.id, "Product created");
    println!("Created product #{}", product.id);
    Ok(())
}

/// Update a product, keeping fields the patch leaves unset.
///
/// # Errors
///
/// Returns an error if the product does not exist or the API rejects the
/// request.
#[allow(clippy::print_stdout)]
pub async fn update_product(state: &AppState, id: ProductId, patch: ProductPatch) -> Result<()> {
    let current = state.catalog().fetch_product(id).await?;
    let request = ProductRequest {
        title: patch.title.unwrap_or(current.title),
        price: patch.price.unwrap_or(current.price),
        description: patch.description.unwrap_or(current.description),
        category_id: patch.category_id.unwrap_or(current.category.id),
        images: patch.images.unwrap_or(current.images),
    };

    let product = state.catalog().update_product(id, &request).await?;
    info!(product_id = %product.id, "Product updated");
    println!("Updated product #{}", product.id);
    Ok(())
}

/// Delete a product.
///
/// # Errors
///
/// Returns an error if the API fails.
#[allow(clippy::print_stdout)]
pub async fn delete_product(state: &AppState, id: ProductId) -> Result<()> {
    if state.catalog().delete_product(id).await? {
        info!(product_id = %id, "Product deleted");
        println!("Deleted product #{id}");
    } else {
        println!("Product #{id} was not deleted");
    }
    Ok(())
}

/// List categories.
///
/// # Errors
///
/// Returns an error if the API fails.
#[allow(clippy::print_stdout)]
pub async fn list_categories(state: &AppState, limit: u32) -> Result<()> {
    let categories = state.catalog().fetch_categories(limit).await?;
    if categories.is_empty() {
        println!("No categories found");
    }
    for category in categories {
        println!("#{:<5} {}", category.id, category.name);
    }
    Ok(())
}

/// Show one category.
///
/// # Errors
///
/// Returns an error if the category does not exist or the API fails.
#[allow(clippy::print_stdout)]
pub async fn show_category(state: &AppState, id: CategoryId) -> Result<()> {
    let category = state.catalog().fetch_category(id).await?;
    println!("#{:<5} {}", category.id, category.name);
    println!("  {}", category.image);
    Ok(())
}

/// List one page of a category's products.
///
/// # Errors
///
/// Returns an error if the category does not exist or the API fails.
pub async fn category_products(
    state: &AppState,
    id: CategoryId,
    limit: u32,
    offset: u32,
) -> Result<()> {
    let products = state
        .catalog()
        .fetch_category_products(id, limit, offset)
        .await?;
    let country = display_country(state).await?;
    print_products(&products, country);
    Ok(())
}

/// Create a category.
///
/// # Errors
///
/// Returns an error if the API rejects the request.
#[allow(clippy::print_stdout)]
pub async fn create_category(state: &AppState, name: String, image: String) -> Result<()> {
    let category = state
        .catalog()
        .create_category(&CategoryRequest { name, image })
        .await?;
    info!(category_id = %category.id, "Category created");
    println!("Created category #{}", category.id);
    Ok(())
}

/// Update a category, keeping fields left unset.
///
/// # Errors
///
/// Returns an error if the category does not exist or the API rejects the
/// request.
#[allow(clippy::print_stdout)]
pub async fn update_category(
    state: &AppState,
    id: CategoryId,
    name: Option<String>,
    image: Option<String>,
) -> Result<()> {
    let current = state.catalog().fetch_category(id).await?;
    let request = CategoryRequest {
        name: name.unwrap_or(current.name),
        image: image.unwrap_or(current.image),
    };

    let category = state.catalog().update_category(id, &request).await?;
    info!(category_id = %category.id, "Category updated");
    println!("Updated category #{}", category.id);
    Ok(())
}

/// Delete a category.
///
/// # Errors
///
/// Returns an error if the API fails.
#[allow(clippy::print_stdout)]
pub async fn delete_category(state: &AppState, id: CategoryId) -> Result<()> {
    if state.catalog().delete_category(id).await? {
        info!(category_id = %id, "Category deleted");
        println!("Deleted category #{id}");
    } else {
        println!("Category #{id} was not deleted");
    }
    Ok(())
}
