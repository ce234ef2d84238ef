//! Back-office commands.
//!
//! All of these need a signed-in admin. The role is checked locally first
//! so a customer session fails fast; the backend still enforces it.

use nursery_admin::{CategoryManager, OrderAdmin, ProductAdmin, UserAdmin};
use nursery_core::CategoryInput;
use nursery_storefront::Storefront;

use super::{AdminAction, CommandError, CommandResult};

pub async fn run(storefront: &Storefront, action: AdminAction) -> CommandResult {
    if !storefront.auth.is_admin() {
        return Err(CommandError::AdminRequired);
    }
    let api = storefront.api().clone();
    let currency = storefront.config().currency;

    match action {
        AdminAction::Import { file } => {
            let contents = std::fs::read_to_string(&file).map_err(|source| CommandError::Read {
                path: file.clone(),
                source,
            })?;
            let file_name = file
                .file_name()
                .map_or_else(|| "products.csv".to_string(), |n| n.to_string_lossy().into_owned());

            let report = ProductAdmin::new(api).import_csv(&file_name, &contents).await?;
            println!(
                "Imported {} products, {} failed ({:?} layout)",
                report.created, report.failed, report.flavor
            );
            for error in &report.errors {
                println!("  {error}");
            }
        }
        AdminAction::Export { output, server } => {
            let products = ProductAdmin::new(api);
            let csv = if server {
                products.download_export().await?
            } else {
                products.export_csv().await?
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, csv).map_err(|source| CommandError::Write {
                        path: path.clone(),
                        source,
                    })?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{csv}"),
            }
        }
        AdminAction::CategoryCreate {
            name,
            slug,
            description,
            parent,
            inactive,
            sort_order,
        } => {
            let mut manager = CategoryManager::new(api);
            manager.try_load().await?;
            let input = CategoryInput {
                slug: slug.unwrap_or_default(),
                description,
                parent_id: parent,
                is_active: !inactive,
                sort_order,
                ..CategoryInput::named(&name)
            };
            let category = manager.create(input).await?;
            println!("Created category {} ({})", category.id, category.slug);
        }
        AdminAction::CategoryUpdate {
            id,
            name,
            slug,
            description,
            parent,
            root,
            active,
            sort_order,
        } => {
            let mut manager = CategoryManager::new(api);
            manager.try_load().await?;
            let Some(current) = manager.get(id) else {
                return Err(nursery_admin::AdminError::NotFound(format!("category {id}")).into());
            };
            let mut input = CategoryInput::from(current);
            if let Some(name) = name {
                input.name = name;
            }
            if let Some(slug) = slug {
                input.slug = slug;
            }
            if description.is_some() {
                input.description = description;
            }
            if root {
                input.parent_id = None;
            } else if parent.is_some() {
                input.parent_id = parent;
            }
            if let Some(active) = active {
                input.is_active = active;
            }
            if let Some(sort_order) = sort_order {
                input.sort_order = sort_order;
            }
            let category = manager.update(id, input).await?;
            println!("Updated category {} ({})", category.id, category.slug);
        }
        AdminAction::CategoryDelete { id } => {
            let mut manager = CategoryManager::new(api);
            manager.try_load().await?;
            manager.delete(id).await?;
            println!("Deleted category {id}");
        }
        AdminAction::CategoryMove { parent, from, to } => {
            let mut manager = CategoryManager::new(api);
            manager.try_load().await?;
            let changed = manager.move_sibling(parent, from, to).await?;
            println!("Reordered {changed} categories");
        }
        AdminAction::CategoryDetached => {
            let mut manager = CategoryManager::new(api);
            manager.load().await;
            let detached = manager.detached();
            if detached.is_empty() {
                println!("Every category is reachable");
            }
            for category in detached {
                let parent = category
                    .parent_id
                    .map_or_else(|| "-".to_string(), |p| p.to_string());
                println!("{:>5}  {:<32} parent {parent}", category.id, category.name);
            }
        }
        AdminAction::Orders => {
            for order in OrderAdmin::new(api).list().await? {
                println!(
                    "{:>6}  {}  {:<10} {:>12}  {}",
                    order.id,
                    order.created_at.format("%Y-%m-%d %H:%M"),
                    order.status,
                    order.total.display(currency),
                    order.shipping_address.full_name
                );
            }
        }
        AdminAction::OrderStatus { id, status } => {
            let order = OrderAdmin::new(api).update_status(id, status).await?;
            println!("Order {} is now {}", order.id, order.status);
        }
        AdminAction::Users => {
            for user in UserAdmin::new(api).list().await? {
                println!("{:>6}  {:<36} {:<24} {}", user.id, user.email, user.name, user.role);
            }
        }
        AdminAction::UserRole { id, role } => {
            let user = UserAdmin::new(api).set_role(id, role).await?;
            println!("{} is now {}", user.email, user.role);
        }
    }
    Ok(())
}
