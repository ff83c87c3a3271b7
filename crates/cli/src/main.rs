//! Online Store CLI - Catalog browsing, manager CRUD, cart and wishlist.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! store-cli products list --title shirt --price-max 50
//! store-cli categories products 1
//!
//! # Sign in on this device, then manage the wishlist and cart
//! store-cli session login -e ana@example.com -n Ana -c BRAZIL
//! store-cli wishlist toggle 4
//! store-cli wishlist list -q shirt
//! store-cli cart toggle 4
//!
//! # Follow the signed-in user's cart and wishlist as they change
//! store-cli session watch
//!
//! # Manager CRUD
//! store-cli products create -t "Mug" -p 12 -d "Ceramic" -c 3 -i https://placehold.co/600x400
//! store-cli categories delete 7
//! ```
//!
//! # Commands
//!
//! - `products`, `categories` - Catalog reads and manager writes
//! - `session` - Sign in/out and watch the synced user record
//! - `wishlist`, `cart` - Toggle and list the signed-in user's items
//! - `price` - Convert a baseline price for a country

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use onlinestore_core::{CategoryId, Country, ProductId};
use onlinestore_storefront::catalog::{DEFAULT_CATEGORY_LIMIT, DEFAULT_PAGE_SIZE, ProductFilter};
use onlinestore_storefront::config::StorefrontConfig;
use onlinestore_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "store-cli")]
#[command(author, version, about = "Online store CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Browse and manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage the signed-in user on this device
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Favorite products of the signed-in user
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Cart of the signed-in user
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Convert a baseline price for display
    Price {
        /// Amount in the baseline currency
        amount: i64,

        /// Country to convert for (defaults to the signed-in user's)
        #[arg(short, long)]
        country: Option<Country>,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        /// Title substring
        #[arg(short, long)]
        title: Option<String>,

        /// Category ID
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Minimum price
        #[arg(long)]
        price_min: Option<i64>,

        /// Maximum price
        #[arg(long)]
        price_max: Option<i64>,

        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,

        #[arg(short, long, default_value_t = 0)]
        offset: u32,
    },
    /// Show one product
    Show { id: ProductId },
    /// Create a product
    Create(ProductFields),
    /// Update a product (unspecified fields keep their current value)
    Update {
        id: ProductId,
        #[command(flatten)]
        fields: ProductPatch,
    },
    /// Delete a product
    Delete { id: ProductId },
}

#[derive(Args)]
struct ProductFields {
    #[arg(short, long)]
    title: String,
    #[arg(short, long)]
    price: i64,
    #[arg(short, long, default_value = "")]
    description: String,
    #[arg(short, long)]
    category: CategoryId,
    /// Image URL (repeatable)
    #[arg(short, long = "image")]
    images: Vec<String>,
}

#[derive(Args)]
struct ProductPatch {
    #[arg(short, long)]
    title: Option<String>,
    #[arg(short, long)]
    price: Option<i64>,
    #[arg(short, long)]
    description: Option<String>,
    #[arg(short, long)]
    category: Option<CategoryId>,
    /// Image URL (repeatable; replaces all images)
    #[arg(short, long = "image")]
    images: Vec<String>,
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List {
        #[arg(short, long, default_value_t = DEFAULT_CATEGORY_LIMIT)]
        limit: u32,
    },
    /// Show one category
    Show { id: CategoryId },
    /// List products in a category
    Products {
        id: CategoryId,
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
        #[arg(short, long, default_value_t = 0)]
        offset: u32,
    },
    /// Create a category
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        image: String,
    },
    /// Update a category (unspecified fields keep their current value)
    Update {
        id: CategoryId,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        image: Option<String>,
    },
    /// Delete a category
    Delete { id: CategoryId },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Sign in (creates the user on first use)
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, default_value = "")]
        name: String,
        /// Shopping country (USA, BRAZIL, EUROPE, ...)
        #[arg(short, long)]
        country: Option<Country>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Show,
    /// Follow cart and wishlist changes until interrupted
    Watch,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// List favorites
    List {
        /// Only favorites whose title contains this text
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Add or remove a product
    Toggle { product_id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart entries
    List,
    /// Add or remove a product
    Toggle { product_id: ProductId },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to warn globally and info for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,onlinestore_storefront=info,onlinestore_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(cli, &state).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, state: &AppState) -> onlinestore_storefront::Result<()> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List {
                title,
                category,
                price_min,
                price_max,
                limit,
                offset,
            } => {
                let filter = ProductFilter {
                    limit,
                    offset,
                    title,
                    category_id: category,
                    price_min,
                    price_max,
                };
                commands::catalog::list_products(state, &filter).await?;
            }
            ProductAction::Show { id } => commands::catalog::show_product(state, id).await?,
            ProductAction::Create(fields) => {
                commands::catalog::create_product(state, fields.into_request()).await?;
            }
            ProductAction::Update { id, fields } => {
                commands::catalog::update_product(state, id, fields.into_patch()).await?;
            }
            ProductAction::Delete { id } => commands::catalog::delete_product(state, id).await?,
        },
        Commands::Categories { action } => match action {
            CategoryAction::List { limit } => commands::catalog::list_categories(state, limit).await?,
            CategoryAction::Show { id } => commands::catalog::show_category(state, id).await?,
            CategoryAction::Products { id, limit, offset } => {
                commands::catalog::category_products(state, id, limit, offset).await?;
            }
            CategoryAction::Create { name, image } => {
                commands::catalog::create_category(state, name, image).await?;
            }
            CategoryAction::Update { id, name, image } => {
                commands::catalog::update_category(state, id, name, image).await?;
            }
            CategoryAction::Delete { id } => commands::catalog::delete_category(state, id).await?,
        },
        Commands::Session { action } => match action {
            SessionAction::Login {
                email,
                name,
                country,
            } => commands::session::login(state, &email, &name, country).await?,
            SessionAction::Logout => commands::session::logout(state).await?,
            SessionAction::Show => commands::session::show(state).await?,
            SessionAction::Watch => commands::session::watch(state).await?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::List { query } => commands::shopping::list_wishlist(state, query).await?,
            WishlistAction::Toggle { product_id } => {
                commands::shopping::toggle_wishlist(state, product_id).await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::List => commands::shopping::list_cart(state).await?,
            CartAction::Toggle { product_id } => {
                commands::shopping::toggle_cart(state, product_id).await?;
            }
        },
        Commands::Price { amount, country } => {
            commands::shopping::price(state, amount, country).await?;
        }
    }
    Ok(())
}

impl ProductFields {
    fn into_request(self) -> onlinestore_core::ProductRequest {
        onlinestore_core::ProductRequest {
            title: self.title,
            price: self.price,
            description: self.description,
            category_id: self.category,
            images: self.images,
        }
    }
}

impl ProductPatch {
    fn into_patch(self) -> commands::catalog::ProductPatch {
        commands::catalog::ProductPatch {
            title: self.title,
            price: self.price,
            description: self.description,
            category_id: self.category,
            images: (!self.images.is_empty()).then_some(self.images),
        }
    }
}
