//! Order payloads sent to the order endpoint and kept in the local backup.

use bakehouse::{delivery::DeliveryOption, orders::Order};
use jiff::{Timestamp, tz::TimeZone};
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

/// Flat order record, in the shape the Apps Script endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    /// Customer name
    pub customer_name: String,

    /// Customer phone number
    pub customer_phone: String,

    /// Delivery address, delivery orders only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,

    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_notes: Option<String>,

    /// Pickup or delivery
    pub delivery_option: DeliveryOption,

    /// e.g. `Sourdough Loaf x2 (£4.50 each)`
    pub order_items: String,

    /// Sum of line totals, in pounds
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,

    /// Delivery fee, in pounds
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,

    /// Amount due, in pounds
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// Reference the customer pays with
    pub reference_number: String,

    /// Local date of checkout, `dd/mm/yyyy`
    pub order_date: String,

    /// Local time of checkout, `HH:MM:SS`
    pub order_time: String,

    /// Instant checkout was confirmed
    pub submitted_at: Timestamp,
}

fn major_units(money: &Money<'static, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}

fn pounds(amount: Decimal) -> String {
    format!("£{amount:.2}")
}

impl OrderSubmission {
    /// Flatten an order, rendering its date and time in `time_zone`.
    pub fn from_order(order: &Order, time_zone: &TimeZone) -> Self {
        let customer = order.customer();
        let totals = order.totals();
        let local = order.submitted_at().to_zoned(time_zone.clone());

        Self {
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            customer_address: customer.address.clone(),
            customer_notes: customer.notes.clone(),
            delivery_option: order.delivery_option(),
            order_items: order.itemized_text(),
            subtotal: major_units(&totals.subtotal),
            delivery_fee: major_units(&totals.delivery_fee),
            total_amount: major_units(&totals.total),
            reference_number: order.reference_number().to_string(),
            order_date: local.strftime("%d/%m/%Y").to_string(),
            order_time: local.strftime("%H:%M:%S").to_string(),
            submitted_at: order.submitted_at(),
        }
    }

    /// Human-readable summary used as the Formspree message and in fallback logs.
    pub fn summary_message(&self) -> String {
        let mut message = format!(
            "New bakery order received:\n\n\
             Reference: {}\n\
             Customer: {}\n\
             Phone: {}\n\
             Delivery: {}\n\
             Date: {} at {}\n\n\
             Items: {}\n\n\
             Subtotal: {}\n\
             Delivery Fee: {}\n\
             Total: {}\n",
            self.reference_number,
            self.customer_name,
            self.customer_phone,
            self.delivery_option,
            self.order_date,
            self.order_time,
            self.order_items,
            pounds(self.subtotal),
            pounds(self.delivery_fee),
            pounds(self.total_amount),
        );

        if let Some(address) = &self.customer_address {
            message.push_str(&format!("\nDelivery Address: {address}\n"));
        }

        if let Some(notes) = &self.customer_notes {
            message.push_str(&format!("\nCustomer Notes: {notes}\n"));
        }

        message
    }

    /// Formspree body for this order, optionally copying `cc`.
    pub fn formspree_form<'a>(&'a self, cc: Option<&'a str>) -> FormspreeForm<'a> {
        FormspreeForm {
            subject: format!("New Bakery Order: {}", self.reference_number),
            cc,
            reference_number: &self.reference_number,
            customer_name: &self.customer_name,
            customer_phone: &self.customer_phone,
            delivery_option: self.delivery_option.as_str(),
            order_items: &self.order_items,
            subtotal: pounds(self.subtotal),
            delivery_fee: pounds(self.delivery_fee),
            total_amount: pounds(self.total_amount),
            order_date: &self.order_date,
            order_time: &self.order_time,
            customer_address: self.customer_address.as_deref().unwrap_or("N/A (Pickup)"),
            customer_notes: self.customer_notes.as_deref().unwrap_or("None"),
            message: self.summary_message(),
        }
    }
}

/// Named form fields posted to Formspree.
#[derive(Debug, Serialize)]
pub struct FormspreeForm<'a> {
    #[serde(rename = "_subject")]
    subject: String,

    #[serde(rename = "_cc", skip_serializing_if = "Option::is_none")]
    cc: Option<&'a str>,

    #[serde(rename = "Reference Number")]
    reference_number: &'a str,

    #[serde(rename = "Customer Name")]
    customer_name: &'a str,

    #[serde(rename = "Customer Phone")]
    customer_phone: &'a str,

    #[serde(rename = "Delivery Option")]
    delivery_option: &'static str,

    #[serde(rename = "Order Items")]
    order_items: &'a str,

    #[serde(rename = "Subtotal")]
    subtotal: String,

    #[serde(rename = "Delivery Fee")]
    delivery_fee: String,

    #[serde(rename = "Total Amount")]
    total_amount: String,

    #[serde(rename = "Order Date")]
    order_date: &'a str,

    #[serde(rename = "Order Time")]
    order_time: &'a str,

    #[serde(rename = "Customer Address")]
    customer_address: &'a str,

    #[serde(rename = "Customer Notes")]
    customer_notes: &'a str,

    message: String,
}

#[cfg(test)]
pub(crate) mod tests {
    use bakehouse::{
        cart::CartLineItem,
        catalog::ProductId,
        orders::{OrderCustomer, ReferenceNumber},
    };
    use rusty_money::iso::GBP;
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    pub(crate) fn sample_order(option: DeliveryOption) -> TestResult<Order> {
        Ok(Order::new(
            "AWA-QRS-2024".parse::<ReferenceNumber>()?,
            vec![
                CartLineItem {
                    product_id: ProductId::new("sourdough"),
                    name: "Sourdough Loaf".to_string(),
                    price: Money::from_minor(450, GBP),
                    quantity: 2,
                    image: String::new(),
                },
                CartLineItem {
                    product_id: ProductId::new("flatwhite"),
                    name: "Flat White".to_string(),
                    price: Money::from_minor(350, GBP),
                    quantity: 1,
                    image: String::new(),
                },
            ],
            GBP,
            option,
            OrderCustomer {
                name: "Ada Lovelace".to_string(),
                phone: "07700 900456".to_string(),
                address: option
                    .requires_address()
                    .then(|| "12 Digbeth High St".to_string()),
                notes: None,
            },
            // 2024-07-01T11:30:00Z, 12:30 in London
            Timestamp::from_second(1_719_833_400)?,
        ))
    }

    #[test]
    fn submission_flattens_order_in_local_time() -> TestResult {
        let order = sample_order(DeliveryOption::Delivery)?;
        let submission = OrderSubmission::from_order(&order, &TimeZone::get("Europe/London")?);

        assert_eq!(submission.reference_number, "AWA-QRS-2024");
        assert_eq!(submission.subtotal, Decimal::new(1250, 2));
        assert_eq!(submission.delivery_fee, Decimal::new(500, 2));
        assert_eq!(submission.total_amount, Decimal::new(1750, 2));
        assert_eq!(submission.order_date, "01/07/2024");
        assert_eq!(submission.order_time, "12:30:00");
        assert_eq!(
            submission.order_items,
            "Sourdough Loaf x2 (£4.50 each), Flat White x1 (£3.50 each)"
        );

        Ok(())
    }

    #[test]
    fn apps_script_body_is_flat_camel_case() -> TestResult {
        let order = sample_order(DeliveryOption::Pickup)?;
        let submission = OrderSubmission::from_order(&order, &TimeZone::UTC);
        let body = serde_json::to_value(&submission)?;

        assert_eq!(body["customerName"], json!("Ada Lovelace"));
        assert_eq!(body["deliveryOption"], json!("pickup"));
        assert_eq!(body["totalAmount"], json!(12.5));
        assert!(body.get("customerAddress").is_none());

        Ok(())
    }

    #[test]
    fn formspree_form_uses_named_fields() -> TestResult {
        let order = sample_order(DeliveryOption::Pickup)?;
        let submission = OrderSubmission::from_order(&order, &TimeZone::UTC);
        let body = serde_json::to_value(submission.formspree_form(Some("orders@example.com")))?;

        assert_eq!(body["_subject"], json!("New Bakery Order: AWA-QRS-2024"));
        assert_eq!(body["_cc"], json!("orders@example.com"));
        assert_eq!(body["Customer Address"], json!("N/A (Pickup)"));
        assert_eq!(body["Customer Notes"], json!("None"));
        assert_eq!(body["Subtotal"], json!("£12.50"));
        assert_eq!(body["Delivery Fee"], json!("£0.00"));
        assert_eq!(body["Order Time"], json!("11:30:00"));

        let without_cc = serde_json::to_value(submission.formspree_form(None))?;

        assert!(without_cc.get("_cc").is_none());

        Ok(())
    }

    #[test]
    fn summary_message_mentions_address_only_for_delivery() -> TestResult {
        let pickup = OrderSubmission::from_order(&sample_order(DeliveryOption::Pickup)?, &TimeZone::UTC);
        let delivery =
            OrderSubmission::from_order(&sample_order(DeliveryOption::Delivery)?, &TimeZone::UTC);

        assert!(pickup.summary_message().contains("Total: £12.50"));
        assert!(!pickup.summary_message().contains("Delivery Address"));
        assert!(
            delivery
                .summary_message()
                .contains("Delivery Address: 12 Digbeth High St")
        );

        Ok(())
    }
}
