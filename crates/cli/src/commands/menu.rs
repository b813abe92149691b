use foodie_core::config::LoadOptions;
use serde::Serialize;

use crate::bootstrap;
use crate::commands::{load_config, CommandResult};

#[derive(Debug, Serialize)]
struct MenuOutput {
    command: &'static str,
    status: &'static str,
    currency_symbol: String,
    categories: Vec<String>,
    items: Vec<MenuEntry>,
}

#[derive(Debug, Serialize)]
struct MenuEntry {
    id: String,
    name: String,
    category: String,
    price: String,
    display: String,
}

pub fn run(options: &LoadOptions, category: Option<&str>) -> CommandResult {
    let config = match load_config(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("menu", &error),
    };
    let catalog = bootstrap::catalog(&config);

    let items = catalog
        .items()
        .iter()
        .filter(|item| category.map_or(true, |category| item.in_category(category)))
        .map(|item| MenuEntry {
            id: item.id.0.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            price: item.price.normalize().to_string(),
            display: catalog.format_item(item),
        })
        .collect();

    let payload = MenuOutput {
        command: "menu",
        status: "ok",
        currency_symbol: catalog.currency_symbol().to_string(),
        categories: catalog.categories(),
        items,
    };
    CommandResult::json(0, &payload)
}
