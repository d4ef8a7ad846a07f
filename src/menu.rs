use rust_decimal::Decimal;

use crate::data_types::canteen_data_types::{Category, MenuItem, MenuItemDraft, MenuItemId};
use crate::errors::CanteenError;

#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    items: Vec<MenuItem>,
    /// never lowered, so a deleted item's id is not handed out again
    next_id: MenuItemId,
}

fn next_free_id(items: &[MenuItem]) -> MenuItemId {
    items.iter().map(|i| i.id).max().unwrap_or(0) + 1
}

fn entry(id: MenuItemId, name: &str, description: &str, cents: i64, category: Category) -> MenuItem {
    MenuItem {
        id,
        name: name.to_string(),
        description: description.to_string(),
        price: Decimal::new(cents, 2),
        category,
    }
}

impl Default for Menu {
    fn default() -> Self {
        Menu::new(vec![
            entry(9, "Oatmeal with Berries", "Warm and hearty oatmeal topped with fresh seasonal berries and a drizzle of honey.", 500, Category::Breakfast),
            entry(10, "Scrambled Tofu", "A savory and protein-rich vegan alternative to scrambled eggs, with turmeric and black salt.", 650, Category::Breakfast),
            entry(1, "Veggie Burger", "A delicious plant-based patty with fresh lettuce, tomato, and vegan mayo.", 800, Category::Lunch),
            entry(2, "Margherita Pizza", "Simple and delicious with fresh mozzarella, tomatoes, and basil.", 1200, Category::Lunch),
            entry(3, "Greek Salad", "Crisp lettuce, cucumbers, tomatoes, olives, and feta cheese with a lemon vinaigrette.", 950, Category::Lunch),
            entry(8, "Vegetable Stir-fry", "A healthy mix of fresh vegetables stir-fried in a savory sauce.", 1050, Category::Lunch),
            entry(4, "French Fries", "Golden, crispy, and perfectly salted. The ideal side or snack.", 350, Category::EveningSnack),
            entry(5, "Onion Rings", "Battered and fried to perfection, served with a tangy dip.", 425, Category::EveningSnack),
            entry(6, "Iced Coffee", "Chilled and refreshing, a perfect pick-me-up.", 300, Category::Beverage),
            entry(7, "Fresh Orange Juice", "100% freshly squeezed orange juice, full of vitamins.", 400, Category::Beverage),
        ])
    }
}

fn validate(name: &str, price: Decimal) -> Result<(), CanteenError> {
    if name.trim().is_empty() {
        return Err(CanteenError::InvalidMenuItem("name cannot be empty".to_string()));
    }
    if price.is_sign_negative() {
        return Err(CanteenError::InvalidMenuItem(
            "price cannot be negative".to_string(),
        ));
    }
    Ok(())
}

impl Menu {
    pub fn new(items: Vec<MenuItem>) -> Self {
        let next_id = next_free_id(&items);
        Menu { items, next_id }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn get(&self, id: MenuItemId) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Items grouped in category order, menu order inside a category
    pub fn by_category(&self) -> Vec<(Category, Vec<&MenuItem>)> {
        Category::ALL
            .iter()
            .map(|c| (*c, self.items.iter().filter(|i| i.category == *c).collect()))
            .collect()
    }

    pub fn add(&mut self, draft: MenuItemDraft) -> Result<MenuItem, CanteenError> {
        validate(&draft.name, draft.price)?;

        let id = self.next_id;
        self.next_id += 1;
        let item = draft.into_item(id);
        self.items.push(item.clone());

        Ok(item)
    }

    pub fn update(&mut self, item: MenuItem) -> Result<MenuItem, CanteenError> {
        validate(&item.name, item.price)?;

        let slot = self
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or(CanteenError::UnknownItem(item.id))?;
        *slot = item.clone();

        Ok(item)
    }

    pub fn delete(&mut self, id: MenuItemId) -> Result<MenuItem, CanteenError> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(CanteenError::UnknownItem(id))?;

        Ok(self.items.remove(pos))
    }
}
