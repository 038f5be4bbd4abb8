//! Command line front end.

use std::io;

use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;
use tracing::{debug, warn};
use trolley::prelude::*;

mod config;
pub(crate) mod logging;

pub(crate) use config::{CliConfig, Command};

const BUNDLED_CATALOG: &str = include_str!("../../fixtures/products/shop.yml");

/// Errors surfaced to the command line user.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// The catalog fixture could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The promo code fixture could not be loaded.
    #[error(transparent)]
    Promotions(#[from] PromoRegistryError),

    /// A cart operation failed or was rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// No catalog product has this id.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// The product is not in stock.
    #[error("{0} is out of stock")]
    OutOfStock(String),

    /// Writing to the output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Run a single command against the persisted cart, writing the result to `out`.
///
/// # Errors
///
/// Returns an error if the fixtures cannot be loaded or the command fails. The
/// cart summary is still written when a cart operation is rejected.
pub(crate) async fn run(config: CliConfig, out: &mut impl io::Write) -> Result<(), CliError> {
    let catalog = match &config.store.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::from_yaml_str(BUNDLED_CATALOG)?,
    };

    if let Command::Products { search, category } = &config.command {
        let products = catalog.browse(search.as_deref(), *category);

        return write_products(&products, catalog.currency(), out);
    }

    let promotions = match &config.store.promotions {
        Some(path) => PromoRegistry::load(path)?,
        None => PromoRegistry::default(),
    };

    let storage = FileStorage::new(&config.store.storage_dir);
    let mut cart = Cart::new(storage, promotions, catalog.currency());

    cart.load_cart().await;

    let result = execute(&mut cart, &catalog, config.command).await;

    if let Err(error) = &result {
        warn!(%error, "command failed");
    }

    CartSummary::from_cart(&cart)?.write_to(&mut *out)?;

    result
}

async fn execute<S: Storage>(
    cart: &mut Cart<S>,
    catalog: &Catalog,
    command: Command,
) -> Result<(), CliError> {
    debug!(?command, "executing command");

    match command {
        Command::Products { .. } | Command::Show => {}
        Command::Add {
            product_id,
            quantity,
            size,
            color,
        } => {
            let product = catalog
                .get(&ProductId::new(product_id.as_str()))
                .ok_or(CliError::UnknownProduct(product_id))?;

            if !product.in_stock {
                return Err(CliError::OutOfStock(product.name.clone()));
            }

            let mut item = NewCartItem::new(product.clone()).quantity(quantity);

            if let Some(size) = size {
                item = item.size(size);
            }

            if let Some(color) = color {
                item = item.color(color);
            }

            cart.add_item(item).await?;
        }
        Command::Remove { item_id } => cart.remove_item(&CartItemId::new(item_id)).await?,
        Command::Update { item_id, quantity } => {
            cart.update_quantity(&CartItemId::new(item_id), quantity)
                .await?;
        }
        Command::ApplyPromo { code } => cart.apply_promo_code(&code).await?,
        Command::RemovePromo => cart.remove_promo_code().await?,
        Command::Clear => cart.clear_cart().await?,
    }

    Ok(())
}

fn write_products(
    products: &[&Product],
    currency: &'static Currency,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    if products.is_empty() {
        writeln!(out, "\nNo products found.\n")?;
        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Id", "Name", "Category", "Price", "Stock", "Sizes", "Colors"]);

    for product in products {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.to_string(),
            product.price_in(currency).to_string(),
            String::from(if product.in_stock { "yes" } else { "no" }),
            product.sizes.join(", "),
            product.colors.join(", "),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..4), Alignment::right());

    writeln!(out, "\n{table}\n")?;

    Ok(())
}
