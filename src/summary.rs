//! Summary
//!
//! A printable snapshot of a cart: one row per line followed by the
//! subtotal, discount, shipping and total figures.

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::{cart::Cart, pricing::PricingError, storage::Storage};

/// A single cart line as displayed.
#[derive(Debug, Clone)]
struct SummaryLine {
    id: String,
    name: String,
    variant: String,
    unit_price: Money<'static, Currency>,
    quantity: u32,
    line_total: Money<'static, Currency>,
}

/// Priced snapshot of a cart.
#[derive(Debug, Clone)]
pub struct CartSummary {
    lines: Vec<SummaryLine>,
    subtotal: Money<'static, Currency>,
    discount: Money<'static, Currency>,
    shipping: Money<'static, Currency>,
    total: Money<'static, Currency>,
    promo_code: Option<String>,
}

impl CartSummary {
    /// Price the cart and capture its lines.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart cannot be priced.
    pub fn from_cart<S: Storage>(cart: &Cart<S>) -> Result<Self, PricingError> {
        let currency = cart.currency();

        let lines = cart
            .items()
            .iter()
            .map(|line| {
                let line_total = line.line_total().ok_or(PricingError::Overflow)?;

                Ok(SummaryLine {
                    id: line.id.to_string(),
                    name: line.product.name.clone(),
                    variant: variant_label(
                        line.selected_size.as_deref(),
                        line.selected_color.as_deref(),
                    ),
                    unit_price: line.product.price_in(currency),
                    quantity: line.quantity,
                    line_total: Money::from_minor(line_total, currency),
                })
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        let shipping = if cart.is_empty() {
            Money::from_minor(0, currency)
        } else {
            cart.shipping_fee()
        };

        Ok(Self {
            lines,
            subtotal: cart.subtotal()?,
            discount: cart.discount()?,
            shipping,
            total: cart.total()?,
            promo_code: cart.promo_code().map(|promo| promo.code.clone()),
        })
    }

    /// Subtotal before discount and shipping.
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Discount from the active promo code.
    pub fn discount(&self) -> Money<'static, Currency> {
        self.discount
    }

    /// Shipping charged, zero for an empty cart.
    pub fn shipping(&self) -> Money<'static, Currency> {
        self.shipping
    }

    /// Amount payable.
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Active promo code, if any.
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref()
    }

    /// Render the lines as a table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        if self.lines.is_empty() {
            writeln!(out, "\nYour cart is empty.")?;
        } else {
            writeln!(out, "\n{}", self.lines_table())?;
        }

        let discount_label = match &self.promo_code {
            Some(code) => format!("Discount ({code}):"),
            None => "Discount:".to_string(),
        };

        let rows = [
            ("Subtotal:".to_string(), self.subtotal.to_string()),
            (discount_label, format!("-{}", self.discount)),
            ("Shipping:".to_string(), self.shipping.to_string()),
            ("Total:".to_string(), self.total.to_string()),
        ];

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| value.chars().count()).max().unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")?;
        }

        writeln!(out)
    }

    fn lines_table(&self) -> String {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Variant", "Unit Price", "Qty", "Line Total", "Id"]);

        for line in &self.lines {
            builder.push_record([
                line.name.clone(),
                line.variant.clone(),
                line.unit_price.to_string(),
                line.quantity.to_string(),
                line.line_total.to_string(),
                line.id.clone(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..5), Alignment::right());

        table.to_string()
    }
}

fn variant_label(size: Option<&str>, color: Option<&str>) -> String {
    match (size, color) {
        (Some(size), Some(color)) => format!("{size} / {color}"),
        (Some(only), None) | (None, Some(only)) => only.to_string(),
        (None, None) => String::new(),
    }
}
