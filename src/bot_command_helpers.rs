use std::str::FromStr;

use rust_decimal::Decimal;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

use crate::app_state::PlateView;
use crate::data_types::canteen_data_types::{Category, MenuItem, MenuItemDraft, MenuItemId};
use crate::data_types::PlateCallback;
use crate::errors::MenuCommandError;
use crate::menu::Menu;
use crate::plate::PlateState;

pub fn make_commands_keyrow() -> KeyboardMarkup {
    let keyboard = vec![
        vec![
            KeyboardButton::new("/menu"),
            KeyboardButton::new("/plate"),
            KeyboardButton::new("/special"),
        ],
        vec![
            KeyboardButton::new("/confirm"),
            KeyboardButton::new("/optout"),
            KeyboardButton::new("/coupon"),
        ],
    ];
    KeyboardMarkup::new(keyboard).resize_keyboard(true)
}

pub fn make_admin_keyrow() -> KeyboardMarkup {
    let keyboard = vec![vec![
        KeyboardButton::new("/report"),
        KeyboardButton::new("/history"),
        KeyboardButton::new("/menu"),
    ]];
    KeyboardMarkup::new(keyboard).resize_keyboard(true)
}

fn button(label: String, action: PlateCallback) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.encode())
}

pub fn make_menu_keyboard(menu: &Menu) -> InlineKeyboardMarkup {
    let mut keyboard = Vec::new();

    for (category, items) in menu.by_category() {
        // two items per row, rows never mix categories
        for chunk in items.chunks(2) {
            keyboard.push(
                chunk
                    .iter()
                    .map(|item| {
                        button(
                            format!("➕ {} ({})", item.name, short_category(category)),
                            PlateCallback::Pick(item.id),
                        )
                    })
                    .collect::<Vec<_>>(),
            );
        }
    }

    InlineKeyboardMarkup::new(keyboard)
}

fn short_category(category: Category) -> &'static str {
    match category {
        Category::Breakfast => "breakfast",
        Category::Lunch => "lunch",
        Category::EveningSnack => "snack",
        Category::Beverage => "drink",
    }
}

/// `None` once nothing can be changed anymore
pub fn make_plate_keyboard(view: &PlateView) -> Option<InlineKeyboardMarkup> {
    if view.locked {
        return None;
    }

    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    match view.plate.state {
        PlateState::Empty => {
            keyboard.push(vec![button("🚫 Opt out".into(), PlateCallback::OptOut)]);
        }
        PlateState::Building => {
            for item in &view.plate.items {
                keyboard.push(vec![button(
                    format!("✖ {}", item.name),
                    PlateCallback::Drop(item.id),
                )]);
            }
            keyboard.push(vec![
                button("✅ Confirm".into(), PlateCallback::Confirm),
                button("🚫 Opt out".into(), PlateCallback::OptOut),
            ]);
        }
        PlateState::Confirmed | PlateState::OptedOut => {
            keyboard.push(vec![button("✏️ Modify".into(), PlateCallback::Modify)]);
        }
    }

    Some(InlineKeyboardMarkup::new(keyboard))
}

fn split_fields(arg: &str, expected: usize) -> Result<Vec<&str>, MenuCommandError> {
    let fields: Vec<&str> = arg.split('|').map(str::trim).collect();
    if fields.len() != expected {
        return Err(MenuCommandError::FieldCount {
            expected,
            got: if arg.trim().is_empty() { 0 } else { fields.len() },
        });
    }
    Ok(fields)
}

fn parse_price(raw: &str) -> Result<Decimal, MenuCommandError> {
    Decimal::from_str(raw.trim_start_matches('$').trim())
        .map_err(|_| MenuCommandError::Price(raw.to_string()))
}

fn parse_category(raw: &str) -> Result<Category, MenuCommandError> {
    raw.parse::<Category>()
        .map_err(|e| MenuCommandError::Category(e.to_string()))
}

fn parse_id(raw: &str) -> Result<MenuItemId, MenuCommandError> {
    raw.trim()
        .parse::<MenuItemId>()
        .map_err(|_| MenuCommandError::Id(raw.trim().to_string()))
}

/// `<category> | <name> | <description> | <price>`
pub fn parse_menu_add(arg: &str) -> Result<MenuItemDraft, MenuCommandError> {
    let fields = split_fields(arg, 4)?;

    Ok(MenuItemDraft {
        category: parse_category(fields[0])?,
        name: fields[1].to_string(),
        description: fields[2].to_string(),
        price: parse_price(fields[3])?,
    })
}

/// `<id> | <category> | <name> | <description> | <price>`
pub fn parse_menu_edit(arg: &str) -> Result<MenuItem, MenuCommandError> {
    let fields = split_fields(arg, 5)?;

    Ok(MenuItem {
        id: parse_id(fields[0])?,
        category: parse_category(fields[1])?,
        name: fields[2].to_string(),
        description: fields[3].to_string(),
        price: parse_price(fields[4])?,
    })
}

pub fn parse_menu_delete(arg: &str) -> Result<MenuItemId, MenuCommandError> {
    parse_id(arg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::canteen_data_types::Employee;
    use crate::plate::Plate;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_menu_add() {
        let draft = parse_menu_add("snack | Samosa | Crispy pastry, spiced potato | $2.50").unwrap();
        assert_eq!(draft.category, Category::EveningSnack);
        assert_eq!(draft.name, "Samosa");
        assert_eq!(draft.description, "Crispy pastry, spiced potato");
        assert_eq!(draft.price, Decimal::new(250, 2));
    }

    #[test]
    fn test_parse_menu_add_errors() {
        assert_eq!(
            parse_menu_add(""),
            Err(MenuCommandError::FieldCount {
                expected: 4,
                got: 0
            })
        );
        assert_eq!(
            parse_menu_add("Lunch | Dal | Lentils | cheap"),
            Err(MenuCommandError::Price("cheap".to_string()))
        );
        assert!(matches!(
            parse_menu_add("Dessert | Kheer | Rice pudding | 3"),
            Err(MenuCommandError::Category(_))
        ));
    }

    #[test]
    fn test_parse_menu_edit_and_delete() {
        let item = parse_menu_edit("2 | Lunch | Margherita Pizza | Classic | 11.00").unwrap();
        assert_eq!(item.id, 2);
        assert_eq!(item.price, Decimal::new(1100, 2));

        assert_eq!(parse_menu_delete(" 7 "), Ok(7));
        assert_eq!(
            parse_menu_delete("seven"),
            Err(MenuCommandError::Id("seven".to_string()))
        );
    }

    #[test]
    fn test_plate_keyboard_follows_state() {
        let mut view = PlateView {
            employee: Employee {
                name: "Jane Doe".to_string(),
                email: "jane.doe@gmail.com".to_string(),
                phone_number: "555".to_string(),
            },
            plate: Plate::new(NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()),
            locked: false,
            recorded: None,
        };
        let item = Menu::default().get(1).cloned().unwrap();
        view.plate.pick(item, false).unwrap();

        let keyboard = make_plate_keyboard(&view).unwrap();
        assert_eq!(keyboard.inline_keyboard.len(), 2);

        view.plate.confirm(false).unwrap();
        let keyboard = make_plate_keyboard(&view).unwrap();
        assert_eq!(keyboard.inline_keyboard.len(), 1);

        view.locked = true;
        assert!(make_plate_keyboard(&view).is_none());
    }

    #[test]
    fn test_menu_keyboard_has_every_item() {
        let menu = Menu::default();
        let keyboard = make_menu_keyboard(&menu);
        let buttons: usize = keyboard.inline_keyboard.iter().map(|row| row.len()).sum();
        assert_eq!(buttons, menu.items().len());
    }
}
