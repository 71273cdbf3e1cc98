//! Receipt
//!
//! Plain-text order summary, used on the terminal and in operator tooling.

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{delivery::DeliveryOption, orders::Order, pricing::format_price};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO(#[from] io::Error),
}

/// Render the order as a table of lines followed by totals.
pub fn render_order_summary(order: &Order) -> String {
    let mut builder = Builder::default();

    builder.push_record([
        "Item".to_string(),
        "Qty".to_string(),
        "Each".to_string(),
        "Total".to_string(),
    ]);

    for item in order.items() {
        builder.push_record([
            item.name.clone(),
            item.quantity.to_string(),
            format_price(&item.price),
            format_price(&item.line_total()),
        ]);
    }

    let totals = order.totals();
    let fee_label = match order.delivery_option() {
        DeliveryOption::Pickup => "Pickup",
        DeliveryOption::Delivery => "Delivery fee",
    };

    builder.push_record([
        "Subtotal".to_string(),
        String::new(),
        String::new(),
        format_price(&totals.subtotal),
    ]);
    builder.push_record([
        fee_label.to_string(),
        String::new(),
        String::new(),
        format_price(&totals.delivery_fee),
    ]);
    builder.push_record([
        "Total".to_string(),
        String::new(),
        String::new(),
        format_price(&totals.total),
    ]);

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(1..4), Alignment::right());
    table.modify(Rows::first(), Alignment::center());

    table.to_string()
}

/// Write the order summary with a reference header.
///
/// # Errors
///
/// Returns [`ReceiptError::IO`] if writing fails.
pub fn write_order_summary(out: &mut impl io::Write, order: &Order) -> Result<(), ReceiptError> {
    writeln!(
        out,
        "Order {} ({}, {} items)\n{}",
        order.reference_number(),
        order.delivery_option(),
        order.total_items(),
        render_order_summary(order)
    )?;

    Ok(())
}
