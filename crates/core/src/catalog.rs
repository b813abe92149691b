use rust_decimal::Decimal;

use crate::domain::menu::MenuItem;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Read-only menu loaded once at startup.
#[derive(Clone, Debug)]
pub struct Catalog {
    items: Vec<MenuItem>,
    currency_symbol: String,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(default_menu())
    }
}

impl Catalog {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items, currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string() }
    }

    pub fn with_currency_symbol(mut self, currency_symbol: impl Into<String>) -> Self {
        self.currency_symbol = currency_symbol.into();
        self
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    /// Distinct categories in first-seen order, lower-cased.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for item in &self.items {
            let category = item.category.to_lowercase();
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }

    pub fn items_in(&self, category: &str) -> impl Iterator<Item = &MenuItem> + '_ {
        let category = category.to_lowercase();
        self.items.iter().filter(move |item| item.in_category(&category))
    }

    /// One `"<name> - <price>"` line per item in `category`, in catalog order.
    /// An unknown category yields an empty list.
    pub fn recommendations_for(&self, category: &str) -> Vec<String> {
        self.items_in(category).map(|item| self.format_item(item)).collect()
    }

    pub fn format_price(&self, price: Decimal) -> String {
        format!("{}{}", self.currency_symbol, price.normalize())
    }

    pub fn format_item(&self, item: &MenuItem) -> String {
        format!("{} - {}", item.name, self.format_price(item.price))
    }
}

pub fn default_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("1", "Margherita Pizza", "pizza", Decimal::new(300, 0)),
        MenuItem::new("2", "Veggie Supreme Pizza", "pizza", Decimal::new(400, 0)),
        MenuItem::new("3", "Classic Burger", "burger", Decimal::new(200, 0)),
        MenuItem::new("4", "Chicken Burger", "burger", Decimal::new(250, 0)),
        MenuItem::new("5", "Caesar Salad", "salad", Decimal::new(150, 0)),
        MenuItem::new("6", "Greek Salad", "salad", Decimal::new(180, 0)),
    ]
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::Catalog;
    use crate::domain::menu::MenuItem;

    #[test]
    fn recommendations_are_filtered_and_keep_catalog_order() {
        let catalog = Catalog::default();
        assert_eq!(
            catalog.recommendations_for("pizza"),
            vec!["Margherita Pizza - ₹300".to_string(), "Veggie Supreme Pizza - ₹400".to_string()]
        );
    }

    #[test]
    fn category_lookup_ignores_case() {
        let catalog = Catalog::default();
        assert_eq!(catalog.recommendations_for("PIZZA"), catalog.recommendations_for("pizza"));
        assert_eq!(catalog.recommendations_for("Burger").len(), 2);
    }

    #[test]
    fn unknown_category_is_empty_not_an_error() {
        let catalog = Catalog::default();
        assert!(catalog.recommendations_for("sushi").is_empty());
    }

    #[test]
    fn currency_symbol_is_configurable() {
        let catalog = Catalog::default().with_currency_symbol("");
        assert_eq!(catalog.recommendations_for("salad")[0], "Caesar Salad - 150");
    }

    #[test]
    fn fractional_prices_render_without_trailing_zeros() {
        let catalog = Catalog::new(vec![MenuItem::new(
            "x1",
            "Garlic Bread",
            "Sides",
            Decimal::new(9950, 2),
        )])
        .with_currency_symbol("$");

        assert_eq!(catalog.recommendations_for("sides"), vec!["Garlic Bread - $99.5".to_string()]);
        assert_eq!(catalog.categories(), vec!["sides".to_string()]);
    }
}
