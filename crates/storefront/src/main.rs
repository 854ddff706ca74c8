use anyhow::{Context, Result};

use orderflow_core::Money;
use orderflow_payments::PaymentMethod;
use orderflow_storefront::Storefront;

fn main() -> Result<()> {
    orderflow_observability::init();

    let mut shop = Storefront::new();

    let notebook = shop.add_product("Notebook", Money::from_units(2500))?;
    let mouse = shop.add_product("Mouse", Money::from_units(50))?;
    let keyboard = shop.add_product("Keyboard", Money::from_units(150))?;

    let customer_id = shop.register_customer("João Silva", "Rua das Flores, 123")?;
    let customer_name = shop
        .customer(customer_id)
        .map(|c| c.name().to_string())
        .context("customer vanished after registration")?;

    let order = shop.place_order(customer_id)?;
    shop.add_to_order(order, notebook, 1)?;
    shop.add_to_order(order, mouse, 2)?;
    shop.add_to_order(order, keyboard, 1)?;

    println!("\n=== Order details ===");
    println!("Customer: {customer_name}");
    println!("Order total: {}", shop.order_total(order)?);

    let payment = shop.create_payment(order, PaymentMethod::Card)?;
    if shop.process_payment(payment).context("processing first payment")? {
        println!("Payment approved!");
    } else {
        println!("Payment declined - amount too high!");
    }

    let second = shop.place_order(customer_id)?;
    shop.add_to_order(second, mouse, 1)?;

    println!("\n=== Second order details ===");
    println!("Customer: {customer_name}");
    println!("Order total: {}", shop.order_total(second)?);

    let payment = shop.create_payment(second, PaymentMethod::Pix)?;
    if shop.process_payment(payment).context("processing second payment")? {
        println!("Payment approved!");

        let delivery = shop.create_delivery(second)?;
        let tracking_code = shop
            .delivery(delivery)
            .map(|d| d.tracking_code().to_string())
            .context("delivery vanished after creation")?;
        println!("Tracking code: {tracking_code}");

        shop.start_delivery(delivery).context("starting delivery")?;
        println!("Delivery started - in transit");

        shop.finish_delivery(delivery).context("finishing delivery")?;
        println!("Delivery finished - order delivered");
        if let Some(delivery) = shop.delivery(delivery) {
            println!("{delivery}");
        }
    }

    if let Some(order) = shop.order(second) {
        println!("{order}");
    }

    println!("\n=== Customer order history ===");
    for (idx, summary) in shop.customer_history(customer_id)?.iter().enumerate() {
        println!(
            "Order {}: {} - Status: {}",
            idx + 1,
            summary.total,
            summary.status
        );
    }

    Ok(())
}
