//! Terminal rendering.
//!
//! Everything a command prints goes through here.

#![allow(clippy::print_stdout)]

use qkart_core::Product;
use qkart_storefront::services::{CartState, CatalogState, Listing};
use qkart_storefront::{Notice, NoticeLevel};

/// Print a notice with a level tag.
pub fn notice(notice: &Notice) {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warn",
        NoticeLevel::Error => "error",
    };
    println!("[{tag}] {notice}");
}

/// Print the catalog as the product grid would show it.
pub fn catalog(catalog: &CatalogState) {
    match catalog.listing() {
        Listing::Products => products(catalog.displayed()),
        Listing::NoResults => println!("No products found"),
    }
}

fn products(products: &[Product]) {
    for product in products {
        println!(
            "{:<18} {:<40} {:<12} {:>8}  {}",
            product.id,
            product.name,
            product.category,
            product.cost.to_string(),
            product.rating,
        );
    }
}

/// Print the cart line items and totals.
pub fn cart(cart: &CartState) {
    let items = cart.items();
    if items.is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in items {
        println!(
            "{:<18} {:<40} {:>3} x {:>8} = {:>9}",
            item.product.id,
            item.product.name,
            item.quantity,
            item.product.cost.to_string(),
            item.subtotal.to_string(),
        );
    }
    println!(
        "Items: {}  Total: {}",
        items.total_quantity(),
        items.total_value()
    );
}

/// Print the current user.
pub fn whoami(username: Option<&str>) {
    match username {
        Some(username) => println!("Logged in as {username}"),
        None => println!("Not logged in"),
    }
}
