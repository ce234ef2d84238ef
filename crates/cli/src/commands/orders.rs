//! Order history.

use nursery_storefront::Storefront;

use super::{CommandResult, OrdersAction};

pub async fn run(storefront: &Storefront, action: OrdersAction) -> CommandResult {
    let currency = storefront.config().currency;

    match action {
        OrdersAction::List => {
            let orders = storefront.api().list_orders().await?;
            if orders.is_empty() {
                println!("No orders yet");
            }
            for order in &orders {
                println!(
                    "{:>6}  {}  {:<10} {:>12}  {} items",
                    order.id,
                    order.created_at.format("%Y-%m-%d %H:%M"),
                    order.status,
                    order.total.display(currency),
                    order.items.len()
                );
            }
        }
        OrdersAction::Show { id } => {
            let order = storefront.api().get_order(id).await?;
            println!("Order {} ({})", order.id, order.status);
            println!("  Placed: {}", order.created_at.format("%Y-%m-%d %H:%M UTC"));
            for line in &order.items {
                println!(
                    "  {:>4} x {:<40} {:>12}",
                    line.quantity,
                    line.name,
                    line.price.times(line.quantity).display(currency)
                );
            }
            println!("  Total:  {}", order.total.display(currency));
            let address = &order.shipping_address;
            println!(
                "  Ship to: {}, {}, {} {} {}",
                address.full_name, address.line1, address.city, address.postal_code, address.country
            );
        }
    }
    Ok(())
}
