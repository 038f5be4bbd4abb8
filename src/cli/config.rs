//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use trolley::products::Category;

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,
}

/// Where the cart and its reference data live.
#[derive(Debug, Args)]
pub(crate) struct StoreConfig {
    /// Directory the cart is persisted in
    #[arg(long, env = "TROLLEY_STORAGE_DIR", default_value = ".trolley")]
    pub(crate) storage_dir: PathBuf,

    /// Products YAML fixture, defaults to the bundled shop catalog
    #[arg(long, env = "TROLLEY_CATALOG")]
    pub(crate) catalog: Option<PathBuf>,

    /// Promo codes YAML fixture, defaults to the built-in codes
    #[arg(long, env = "TROLLEY_PROMOTIONS")]
    pub(crate) promotions: Option<PathBuf>,
}

/// Cart commands.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List the catalog
    Products {
        /// Only products whose name contains this text, ignoring case
        #[arg(short, long)]
        search: Option<String>,

        /// Only products in this category
        #[arg(short, long)]
        category: Option<Category>,
    },

    /// Add a product to the cart
    Add {
        /// Catalog product id
        product_id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Selected size
        #[arg(long)]
        size: Option<String>,

        /// Selected color
        #[arg(long)]
        color: Option<String>,
    },

    /// Remove a line from the cart
    Remove {
        /// Line id as shown by `show`
        item_id: String,
    },

    /// Set the quantity of a line, zero or less removes it
    Update {
        /// Line id as shown by `show`
        item_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Apply a promo code
    ApplyPromo {
        /// Promo code, case-insensitive
        code: String,
    },

    /// Remove the active promo code
    RemovePromo,

    /// Empty the cart
    Clear,

    /// Print the cart
    Show,
}

/// Trolley command line configuration
#[derive(Debug, Parser)]
#[command(name = "trolley", about = "Shopping cart with persistent storage", long_about = None)]
pub(crate) struct CliConfig {
    /// Storage and fixture locations.
    #[command(flatten)]
    pub(crate) store: StoreConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    /// Command to run.
    #[command(subcommand)]
    pub(crate) command: Command,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_add_with_options() -> TestResult {
        let config = CliConfig::try_parse_from([
            "trolley",
            "--storage-dir",
            "/tmp/cart",
            "add",
            "3",
            "-q",
            "2",
            "--size",
            "M",
            "--color",
            "red",
        ])?;

        assert_eq!(config.store.storage_dir, PathBuf::from("/tmp/cart"));
        assert!(matches!(
            config.command,
            Command::Add { ref product_id, quantity: 2, size: Some(ref size), color: Some(ref color) }
                if product_id == "3" && size == "M" && color == "red"
        ));

        Ok(())
    }

    #[test]
    fn update_accepts_negative_quantity() -> TestResult {
        let config = CliConfig::try_parse_from(["trolley", "update", "1_M_red_5", "-1"])?;

        assert!(matches!(
            config.command,
            Command::Update { ref item_id, quantity: -1 } if item_id == "1_M_red_5"
        ));

        Ok(())
    }

    #[test]
    fn products_accepts_search_and_category() -> TestResult {
        let config =
            CliConfig::try_parse_from(["trolley", "products", "--search", "air", "-c", "Shoes"])?;

        assert!(matches!(
            config.command,
            Command::Products { search: Some(ref search), category: Some(Category::Shoes) }
                if search == "air"
        ));
        assert!(CliConfig::try_parse_from(["trolley", "products", "--category", "toys"]).is_err());

        Ok(())
    }

    #[test]
    fn subcommands_use_kebab_case() -> TestResult {
        let config = CliConfig::try_parse_from(["trolley", "apply-promo", "save20"])?;

        assert!(matches!(config.command, Command::ApplyPromo { ref code } if code == "save20"));

        Ok(())
    }
}
