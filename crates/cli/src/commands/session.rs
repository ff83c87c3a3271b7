//! Sign-in state and live sync commands.

use onlinestore_core::Country;
use onlinestore_storefront::state::AppState;
use onlinestore_storefront::users::UserStore;
use onlinestore_storefront::wishlist::StoreSnapshot;
use onlinestore_storefront::{Result, StoreError};
use tracing::info;

/// Sign in on this device, creating the user on first use.
///
/// # Errors
///
/// Returns an error if the user file cannot be read or written.
#[allow(clippy::print_stdout)]
pub async fn login(state: &AppState, email: &str, name: &str, country: Option<Country>) -> Result<()> {
    let user = state.users().sign_in(email, name, country).await?;
    info!(user_id = %user.id, "Signed in");
    println!(
        "Signed in as {} <{}> (user #{}, {})",
        user.name, user.email, user.id, user.country
    );
    Ok(())
}

/// Sign out on this device. Stored users are kept.
///
/// # Errors
///
/// Returns an error if the user file cannot be written.
#[allow(clippy::print_stdout)]
pub async fn logout(state: &AppState) -> Result<()> {
    state.users().sign_out().await?;
    println!("Signed out");
    Ok(())
}

/// Show the signed-in user.
///
/// # Errors
///
/// Returns `StoreError::NotSignedIn` if nobody is signed in.
#[allow(clippy::print_stdout)]
pub async fn show(state: &AppState) -> Result<()> {
    let user = state
        .users()
        .current_user()
        .await?
        .ok_or(StoreError::NotSignedIn)?;

    println!("{} <{}> (user #{})", user.name, user.email, user.id);
    println!("Country:   {}", user.country);
    println!("Cart:      {} item(s)", user.cart_list.len());
    println!("Wishlist:  {} item(s)", user.favorite_products.len());
    Ok(())
}

/// Mirror the signed-in user's cart and wishlist until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the first load from the user file fails.
pub async fn watch(state: &AppState) -> Result<()> {
    if !state.store().refresh().await? {
        return Err(StoreError::NotSignedIn);
    }

    let mut snapshots = state.store().subscribe();
    print_snapshot(&snapshots.borrow_and_update());

    state.start_sync();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                print_snapshot(&snapshots.borrow_and_update());
            }
        }
    }

    info!("Stopping sync");
    state.stop_sync().await;
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_snapshot(snapshot: &StoreSnapshot) {
    let favorites: Vec<_> = snapshot
        .favorites
        .iter()
        .map(|product| format!("#{}", product.id))
        .collect();
    let cart: Vec<_> = snapshot
        .cart
        .iter()
        .map(|entry| format!("#{}x{}", entry.product.id, entry.quantity))
        .collect();

    println!(
        "[{}] cart: [{}]  wishlist: [{}]",
        snapshot.country,
        cart.join(", "),
        favorites.join(", ")
    );
}
