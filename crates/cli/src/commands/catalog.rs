//! Product and category browsing.

use nursery_core::listing::{CategoryFilter, CategorySort, list_categories};
use nursery_core::tree::{CategoryNode, build_tree, flatten};
use nursery_storefront::Storefront;
use nursery_storefront::api::ProductQuery;

use super::{CategoriesAction, CommandResult, ProductsAction, direction};

pub async fn products(storefront: &mut Storefront, action: ProductsAction) -> CommandResult {
    let currency = storefront.config().currency;

    match action {
        ProductsAction::List {
            page,
            limit,
            category,
            search,
        } => {
            let listing = storefront
                .api()
                .list_products(&ProductQuery {
                    page,
                    limit,
                    category,
                    search,
                })
                .await?;

            for product in &listing.products {
                let stock = if product.in_stock() { "" } else { "  (out of stock)" };
                println!(
                    "{:>6}  {:<40} {:>12}{stock}",
                    product.id,
                    product.name,
                    product.price.display(currency)
                );
            }
            println!(
                "\nPage {} of {} ({} products)",
                listing.page,
                listing.page_count().max(1),
                listing.total
            );
        }
        ProductsAction::Show { slug } => {
            let product = storefront.view_product(&slug).await?;
            println!("{} ({})", product.name, product.slug);
            println!("  Id:        {}", product.id);
            println!("  Price:     {}", product.price.display(currency));
            println!("  Inventory: {}", product.inventory);
            if let Some(category) = product.category_id {
                println!("  Category:  {category}");
            }
            if let Some(description) = &product.description {
                println!("\n{description}");
            }
        }
        ProductsAction::Recent => {
            for id in storefront.recently_viewed.ids() {
                println!("{id}");
            }
        }
    }
    Ok(())
}

pub async fn categories(storefront: &Storefront, action: CategoriesAction) -> CommandResult {
    let categories = storefront.api().list_categories().await?;

    match action {
        CategoriesAction::Tree => {
            print_tree(&build_tree(&categories));
        }
        CategoriesAction::List {
            search,
            status,
            kind,
            level,
            sort,
            desc,
        } => {
            let filter = CategoryFilter {
                search,
                status,
                kind,
                level,
            };
            let sort = CategorySort {
                key: sort,
                direction: direction(desc),
            };
            let rows = list_categories(flatten(&build_tree(&categories)), &filter, sort);

            for row in &rows {
                let status = if row.category.is_active { "active" } else { "inactive" };
                println!(
                    "{:>5}  {:<32} {:<28} level {}  order {:>3}  {status}",
                    row.category.id,
                    row.category.name,
                    row.category.slug,
                    row.level,
                    row.category.sort_order
                );
            }
            println!("\n{} of {} categories", rows.len(), categories.len());
        }
    }
    Ok(())
}

fn print_tree(nodes: &[CategoryNode]) {
    for node in nodes {
        let marker = if node.category.is_active { "" } else { " [inactive]" };
        println!(
            "{}{} ({}){marker}",
            "  ".repeat(node.level),
            node.category.name,
            node.category.id
        );
        print_tree(&node.children);
    }
}
