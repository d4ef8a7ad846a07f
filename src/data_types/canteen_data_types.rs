use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type MenuItemId = u32;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Breakfast,
    Lunch,
    #[serde(rename = "Evening Snack")]
    EveningSnack,
    Beverage,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Breakfast,
        Category::Lunch,
        Category::EveningSnack,
        Category::Beverage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Breakfast => "Breakfast",
            Category::Lunch => "Lunch",
            Category::EveningSnack => "Evening Snack",
            Category::Beverage => "Beverage",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown category '{}' (use Breakfast, Lunch, Snack or Beverage)",
            self.0
        )
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "breakfast" => Ok(Category::Breakfast),
            "lunch" | "main" | "maincourse" => Ok(Category::Lunch),
            "eveningsnack" | "snack" => Ok(Category::EveningSnack),
            "beverage" | "drink" => Ok(Category::Beverage),
            _ => Err(UnknownCategory(s.trim().to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
}

/// A menu item as entered by the admin, before an id is assigned
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
}

impl MenuItemDraft {
    pub fn into_item(self, id: MenuItemId) -> MenuItem {
        MenuItem {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub name: String,
    /// lower-cased, doubles as the employee's identity
    pub email: String,
    pub phone_number: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Selection {
    pub employee: Employee,
    pub items: Vec<MenuItem>,
    pub date: NaiveDate,
    pub opted_out: bool,
}

impl Selection {
    pub fn identity(&self) -> &str {
        &self.employee.email
    }
}
