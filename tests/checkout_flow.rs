//! End-to-end checkout against the bundled bakery catalog.
//!
//! A delivery order of two sourdough loaves and a carrot cake comes to £14.25,
//! below the £45.00 threshold, so it carries the £5.00 fee for a £19.25 total.

use jiff::Timestamp;
use rand::{SeedableRng, rngs::StdRng};
use rusty_money::{Money, iso::GBP};
use testresult::TestResult;

use bakehouse::prelude::*;

fn fill_cart(catalog: &Catalog, cart: &mut CartStore) -> TestResult {
    let sourdough = catalog
        .product(&ProductId::new("sourdough"))
        .ok_or("sourdough missing from catalog")?;
    let carrot = catalog
        .product(&ProductId::new("carrot"))
        .ok_or("carrot cake missing from catalog")?;

    cart.add_to_cart(sourdough);
    cart.add_to_cart(sourdough);
    cart.add_to_cart(carrot);

    Ok(())
}

fn customer(address: &str) -> CustomerInfo {
    CustomerInfo {
        name: "Grace Hopper".to_string(),
        phone: "07700 900123".to_string(),
        address: address.to_string(),
        notes: String::new(),
    }
}

#[test]
fn deferred_delivery_order_confirms_and_clears_cart() -> TestResult {
    let catalog = Catalog::bakery()?;
    let mut cart = CartStore::new();
    let mut flow = CheckoutFlow::new();

    fill_cart(&catalog, &mut cart)?;

    flow.select_delivery(DeliveryOption::Delivery)?;
    flow.update_customer(customer("1 Canal Side, Birmingham"))?;

    let quote = flow.quote(&cart);

    assert_eq!(quote.subtotal, Money::from_minor(1425, GBP));
    assert_eq!(quote.delivery_fee, Money::from_minor(500, GBP));
    assert_eq!(quote.total, Money::from_minor(1925, GBP));

    let submitted_at = Timestamp::from_second(1_700_000_000)?;
    let effect = flow.confirm_with(&cart, &mut StdRng::seed_from_u64(11), submitted_at)?;

    let CheckoutEffect::SubmitOrder(order) = effect else {
        return Err("confirm should request submission".into());
    };

    assert_eq!(flow.stage(), CheckoutStage::Submitting);
    assert_eq!(order.total_items(), 3);
    assert_eq!(order.submitted_at(), submitted_at);
    assert!(order.reference_number().as_str().starts_with("AWA-"));
    assert_eq!(
        order.customer().address.as_deref(),
        Some("1 Canal Side, Birmingham")
    );

    let effect = flow.finish_submission(SubmissionOutcome::Deferred(
        DeferralReason::EndpointNotConfigured,
    ))?;

    assert_eq!(effect, CheckoutEffect::ClearCart);

    cart.clear_cart();

    let confirmation = flow.confirmation().ok_or("missing confirmation")?;

    assert_eq!(confirmation.reference_number, *order.reference_number());
    assert_eq!(confirmation.totals.total, Money::from_minor(1925, GBP));
    assert!(confirmation.outcome.is_success());
    assert!(cart.is_empty());
    assert_eq!(cart.total_items(), 0);

    flow.close()?;

    assert_eq!(flow.stage(), CheckoutStage::Collecting);
    assert_eq!(flow.delivery_option(), DeliveryOption::Pickup);
    assert_eq!(flow.customer(), &CustomerInfo::default());

    Ok(())
}

#[test]
fn validation_gate_leaves_cart_untouched() -> TestResult {
    let catalog = Catalog::bakery()?;
    let mut cart = CartStore::new();
    let mut flow = CheckoutFlow::new();

    fill_cart(&catalog, &mut cart)?;

    let revision = cart.revision();

    flow.select_delivery(DeliveryOption::Delivery)?;
    flow.update_customer(customer("   "))?;

    assert_eq!(
        flow.confirm(&cart, Timestamp::now()),
        Err(CheckoutError::MissingAddress)
    );

    flow.update_customer(CustomerInfo {
        name: " ".to_string(),
        ..customer("1 Canal Side")
    })?;

    assert_eq!(
        flow.confirm(&cart, Timestamp::now()),
        Err(CheckoutError::MissingNameOrPhone)
    );

    assert_eq!(flow.stage(), CheckoutStage::Collecting);
    assert_eq!(cart.revision(), revision);
    assert_eq!(cart.total_items(), 3);
    assert!(flow.confirmation().is_none());

    Ok(())
}

#[test]
fn pickup_over_threshold_reads_collection_details() -> TestResult {
    let catalog = Catalog::bakery()?;
    let mut cart = CartStore::new();
    let mut flow = CheckoutFlow::new();

    fill_cart(&catalog, &mut cart)?;
    cart.update_quantity(&ProductId::new("sourdough"), 20);

    flow.update_customer(customer(""))?;
    flow.confirm(&cart, Timestamp::now())?;
    flow.finish_submission(SubmissionOutcome::Delivered)?;

    let confirmation = flow.confirmation().ok_or("missing confirmation")?;

    assert_eq!(confirmation.totals.delivery_fee, Money::from_minor(0, GBP));
    assert_eq!(confirmation.totals.total, Money::from_minor(9525, GBP));
    assert!(confirmation.handover_information().contains("Wednesday"));
    assert_eq!(confirmation.address, None);

    Ok(())
}
