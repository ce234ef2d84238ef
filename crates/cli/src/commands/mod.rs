//! Command implementations.
//!
//! Each submodule handles one top-level command. Actions are parsed by
//! clap in [`crate`] and dispatched here with the [`Storefront`] handle.
//!
//! [`Storefront`]: nursery_storefront::Storefront

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod watch;

use std::path::PathBuf;

use clap::Subcommand;
use nursery_admin::AdminError;
use nursery_core::listing::{KindFilter, SortDirection, SortKey, StatusFilter};
use nursery_core::{CategoryId, OrderId, OrderStatus, ProductId, Role, UserId};
use nursery_storefront::auth::AuthError;
use nursery_storefront::{ApiError, CheckoutError};
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("Admin access required. Sign in with an admin account.")]
    AdminRequired,

    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Subcommand)]
pub enum ProductsAction {
    /// List products
    List {
        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Products per page
        #[arg(short, long)]
        limit: Option<u32>,

        /// Only products in this category
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one product and remember it as recently viewed
    Show {
        /// Product slug
        slug: String,
    },
    /// List recently viewed product ids
    Recent,
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// Print the category tree
    Tree,
    /// Flat, filterable category listing
    List {
        /// Match name, slug or description
        #[arg(short, long)]
        search: Option<String>,

        /// Only active or inactive categories
        #[arg(long, value_parser = parse_status)]
        status: Option<StatusFilter>,

        /// Only root (`parent`) or nested (`child`) categories
        #[arg(long, value_parser = parse_kind)]
        kind: Option<KindFilter>,

        /// Only categories at this depth (0 = root)
        #[arg(long)]
        level: Option<usize>,

        /// Sort column: tree, name, level, status, sort-order
        #[arg(long, value_parser = parse_sort_key, default_value = "tree")]
        sort: SortKey,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Show cart lines and subtotal
    Show,
    /// Add a product by slug
    Add {
        slug: String,
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product by id
    Remove { id: ProductId },
    /// Set a line's quantity (minimum 1)
    Update {
        id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Place an order for the cart
    Checkout {
        #[arg(long)]
        name: String,
        #[arg(long)]
        line1: String,
        #[arg(long)]
        line2: Option<String>,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        postal_code: String,
        #[arg(long, default_value = "IN")]
        country: String,
        #[arg(long)]
        phone: String,
    },
}

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List your orders
    List,
    /// Show one order
    Show { id: OrderId },
}

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in
    SignIn {
        #[arg(short, long)]
        email: String,
    },
    /// Create an account
    SignUp {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        name: String,
    },
    /// Sign out
    SignOut,
    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// Import products from a CSV file
    Import { file: PathBuf },
    /// Export products as CSV
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Download the server-rendered export
        #[arg(long)]
        server: bool,
    },
    /// Create a category
    CategoryCreate {
        #[arg(short, long)]
        name: String,
        /// Derived from the name when omitted
        #[arg(long)]
        slug: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        parent: Option<CategoryId>,
        #[arg(long)]
        inactive: bool,
        #[arg(long, default_value_t = 0)]
        sort_order: i32,
    },
    /// Update a category; omitted fields keep their value
    CategoryUpdate {
        id: CategoryId,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// New parent id
        #[arg(short, long, conflicts_with = "root")]
        parent: Option<CategoryId>,
        /// Move to the top level
        #[arg(long)]
        root: bool,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        sort_order: Option<i32>,
    },
    /// Delete a category without subcategories
    CategoryDelete { id: CategoryId },
    /// Move a category among its siblings
    CategoryMove {
        /// Parent whose children are reordered (top level when omitted)
        #[arg(short, long)]
        parent: Option<CategoryId>,
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
    },
    /// List categories the tree cannot reach
    CategoryDetached,
    /// List every order
    Orders,
    /// Change an order's status
    OrderStatus { id: OrderId, status: OrderStatus },
    /// List every user
    Users,
    /// Change a user's role
    UserRole { id: UserId, role: Role },
}

fn parse_status(s: &str) -> Result<StatusFilter, String> {
    match s.to_ascii_lowercase().as_str() {
        "active" => Ok(StatusFilter::Active),
        "inactive" => Ok(StatusFilter::Inactive),
        other => Err(format!("expected active or inactive, got '{other}'")),
    }
}

fn parse_kind(s: &str) -> Result<KindFilter, String> {
    match s.to_ascii_lowercase().as_str() {
        "parent" | "root" => Ok(KindFilter::Parent),
        "child" => Ok(KindFilter::Child),
        other => Err(format!("expected parent or child, got '{other}'")),
    }
}

fn parse_sort_key(s: &str) -> Result<SortKey, String> {
    match s.to_ascii_lowercase().replace('_', "-").as_str() {
        "tree" => Ok(SortKey::Tree),
        "name" => Ok(SortKey::Name),
        "level" => Ok(SortKey::Level),
        "status" => Ok(SortKey::Status),
        "sort-order" => Ok(SortKey::SortOrder),
        other => Err(format!("unknown sort column '{other}'")),
    }
}

/// Sort direction from the `--desc` flag.
const fn direction(desc: bool) -> SortDirection {
    if desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    }
}
