use bakehouse::{
    catalog::ProductId,
    delivery::DeliveryOption,
    orders::{CustomerInfo, SubmissionOutcome},
    pricing::{format_price, remaining_for_free_delivery},
    receipt::render_order_summary,
};
use bakehouse_app::{config::AppConfig, storefront::Storefront};
use clap::Args;
use tracing::debug;

#[derive(Debug, Clone)]
pub(crate) struct ItemArg {
    id: ProductId,
    quantity: u32,
}

fn parse_item(value: &str) -> Result<ItemArg, String> {
    let (id, quantity) = value
        .split_once('=')
        .ok_or_else(|| format!("expected product-id=quantity, got {value:?}"))?;

    let quantity = quantity
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid quantity in {value:?}: {error}"))?;

    if quantity == 0 {
        return Err(format!("quantity must be at least 1 in {value:?}"));
    }

    Ok(ItemArg {
        id: ProductId::new(id.trim()),
        quantity,
    })
}

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Item to order as `product-id=quantity`; repeats of a product add up
    #[arg(long = "item", value_parser = parse_item, required = true)]
    items: Vec<ItemArg>,

    /// Customer name
    #[arg(long)]
    name: String,

    /// Customer phone number
    #[arg(long)]
    phone: String,

    /// Delivery address; required for delivery
    #[arg(long, default_value = "")]
    address: String,

    /// Notes for the bakery
    #[arg(long, default_value = "")]
    notes: String,

    /// Pickup or delivery
    #[arg(long, default_value_t = DeliveryOption::Pickup)]
    delivery: DeliveryOption,
}

pub(crate) async fn run(config: &AppConfig, args: CheckoutArgs) -> Result<(), String> {
    let mut storefront = Storefront::from_config(config).map_err(|error| error.to_string())?;

    for item in &args.items {
        storefront
            .add_product(&item.id, item.quantity)
            .map_err(|error| error.to_string())?;
    }

    debug!(
        revision = storefront.cart().revision(),
        items = storefront.cart().total_items(),
        "cart ready"
    );

    if args.delivery == DeliveryOption::Delivery
        && let Some(remaining) = remaining_for_free_delivery(&storefront.cart().total_price())
    {
        println!(
            "Add {} more for free delivery.",
            format_price(&remaining)
        );
    }

    let checkout = storefront.checkout_mut();

    checkout
        .select_delivery(args.delivery)
        .map_err(|error| error.to_string())?;
    checkout
        .update_customer(CustomerInfo {
            name: args.name,
            phone: args.phone,
            address: args.address,
            notes: args.notes,
        })
        .map_err(|error| error.to_string())?;

    let placed = storefront
        .place_order()
        .await
        .map_err(|error| error.to_string())?;
    let confirmation = &placed.confirmation;

    println!("{}", render_order_summary(&placed.order));
    println!();
    println!("Order confirmed! Reference: {}", confirmation.reference_number);
    println!("{}", confirmation.handover_information());

    if let Some(address) = &confirmation.address {
        println!("Delivery address: {address}");
    }

    println!();

    for line in confirmation.payment_instructions() {
        println!("{line}");
    }

    if let SubmissionOutcome::Deferred(reason) = &confirmation.outcome {
        println!();
        println!("Note: order saved locally for manual processing ({reason}).");
    }

    Ok(())
}
