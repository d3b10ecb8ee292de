//! Cart commands.

use qkart_core::ProductId;
use qkart_storefront::{Action, Notice, Storefront};

use super::{CommandError, During, show_notice};
use crate::output;

/// Load the catalog and, when logged in, the cart reconciled against it.
///
/// A catalog failure is reported and the command goes on with the cart
/// alone; a cart failure ends the command.
async fn load(storefront: &mut Storefront) -> Result<(), CommandError> {
    let mut cart_failure = None;
    for (action, source) in storefront.start().await {
        match action {
            Action::FetchCart => cart_failure = Some(CommandError { action, source }),
            _ => show_notice(action, &source),
        }
    }
    cart_failure.map_or(Ok(()), Err)
}

/// Show the cart with totals.
pub async fn show(storefront: &mut Storefront) -> Result<(), CommandError> {
    if !storefront.session().is_authenticated() {
        output::notice(&Notice::warning("Login to view your cart"));
        return Ok(());
    }

    load(storefront).await?;
    output::cart(storefront.cart());
    Ok(())
}

/// Add one of `product_id`, refusing products already in the cart.
pub async fn add(storefront: &mut Storefront, product_id: &ProductId) -> Result<(), CommandError> {
    load(storefront).await?;
    storefront
        .add_to_cart(product_id)
        .await
        .during(Action::UpdateCart)?;
    if let Some(product) = storefront.catalog().find(product_id) {
        output::notice(&Notice::success(format!("Added {} to cart", product.name)));
    }
    output::cart(storefront.cart());
    Ok(())
}

/// Set the quantity of `product_id`.
pub async fn set(
    storefront: &mut Storefront,
    product_id: &ProductId,
    quantity: u32,
) -> Result<(), CommandError> {
    load(storefront).await?;
    storefront
        .set_quantity(product_id, quantity)
        .await
        .during(Action::UpdateCart)?;
    output::cart(storefront.cart());
    Ok(())
}
