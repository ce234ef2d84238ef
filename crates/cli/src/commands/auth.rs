//! Sign-in commands.

use nursery_storefront::Storefront;
use nursery_storefront::auth::AuthMode;

use super::{AuthAction, CommandResult};

pub async fn run(storefront: &mut Storefront, action: AuthAction) -> CommandResult {
    match action {
        AuthAction::SignIn { email } => {
            let (user, cart) = storefront.sign_in(&email).await?;
            println!("Signed in as {} <{}> ({})", user.name, user.email, user.role);
            if !cart.is_synced() {
                println!("(Cart not synced: {cart})");
            }
        }
        AuthAction::SignUp { email, name } => {
            let (user, _) = storefront.sign_up(&email, &name).await?;
            println!("Welcome, {}! Signed in as <{}>", user.name, user.email);
        }
        AuthAction::SignOut => {
            storefront.sign_out();
            println!("Signed out");
        }
        AuthAction::Whoami => {
            let mode = match storefront.auth.mode() {
                AuthMode::Clerk => "clerk",
                AuthMode::Demo => "demo",
            };
            match storefront.auth.current_user() {
                Some(user) => println!("{} <{}> ({}, {mode} mode)", user.name, user.email, user.role),
                None => println!("Not signed in ({mode} mode)"),
            }
        }
    }
    Ok(())
}
