//! Cart commands.
//!
//! Every command first restores the cart (local backup, then server) so
//! the change applies on top of the latest known state.

use nursery_core::ShippingAddress;
use nursery_storefront::{Storefront, SyncOutcome};

use super::{CartAction, CommandResult};

pub async fn run(storefront: &mut Storefront, action: CartAction) -> CommandResult {
    let loaded = storefront.cart.load().await;

    let outcome = match action {
        CartAction::Show => {
            print_cart(storefront);
            report(&loaded);
            return Ok(());
        }
        CartAction::Add { slug, quantity } => {
            let product = storefront.api().get_product(&slug).await?;
            if !product.in_stock() {
                tracing::warn!(%slug, "Product is out of stock");
            }
            storefront.cart.add(product.to_cart_item(), quantity).await
        }
        CartAction::Remove { id } => storefront.cart.remove(id).await,
        CartAction::Update { id, quantity } => storefront.cart.update_quantity(id, quantity).await,
        CartAction::Clear => storefront.cart.clear().await,
        CartAction::Checkout {
            name,
            line1,
            line2,
            city,
            state,
            postal_code,
            country,
            phone,
        } => {
            let address = ShippingAddress {
                full_name: name,
                line1,
                line2,
                city,
                state,
                postal_code,
                country,
                phone,
            };
            let order = storefront.cart.checkout(address).await?;
            println!(
                "Order {} placed: {} ({})",
                order.id,
                order.total.display(storefront.config().currency),
                order.status
            );
            return Ok(());
        }
    };

    print_cart(storefront);
    report(&outcome);
    Ok(())
}

fn print_cart(storefront: &Storefront) {
    let currency = storefront.config().currency;
    let cart = &storefront.cart;

    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }
    for item in cart.items() {
        println!(
            "{:>6}  {:<40} {:>4} x {:>10} = {:>12}",
            item.id,
            item.name,
            item.quantity,
            item.price.display(currency),
            item.line_total().display(currency)
        );
    }
    println!(
        "\n{} items, subtotal {}",
        cart.item_count(),
        cart.subtotal().display(currency)
    );
}

fn report(outcome: &SyncOutcome) {
    if let SyncOutcome::LocalOnly { reason } = outcome {
        println!("(Saved on this device only: {reason})");
    }
}
