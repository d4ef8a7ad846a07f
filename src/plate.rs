//! An employee's in-progress choice for one order date.
//!
//! Empty -> Building -> Confirmed | OptedOut. `modify` goes back from a
//! confirmed plate to Building (keeping the items) and from an opted-out one to
//! Empty. Once the date is locked by the cutoff every transition is refused,
//! whatever state the plate is in.

use chrono::NaiveDate;
use serde::Serialize;

use crate::data_types::canteen_data_types::{MenuItem, MenuItemId};
use crate::errors::CanteenError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum PlateState {
    Empty,
    Building,
    Confirmed,
    OptedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plate {
    pub date: NaiveDate,
    pub items: Vec<MenuItem>,
    pub state: PlateState,
}

impl Plate {
    pub fn new(date: NaiveDate) -> Self {
        Plate {
            date,
            items: Vec::new(),
            state: PlateState::Empty,
        }
    }

    fn ensure_editable(&self, locked: bool) -> Result<(), CanteenError> {
        if locked {
            return Err(CanteenError::DeadlinePassed);
        }
        match self.state {
            PlateState::Confirmed | PlateState::OptedOut => Err(CanteenError::AlreadyConfirmed),
            PlateState::Empty | PlateState::Building => Ok(()),
        }
    }

    /// Adds the item, replacing whatever was picked in its category
    pub fn pick(&mut self, item: MenuItem, locked: bool) -> Result<(), CanteenError> {
        self.ensure_editable(locked)?;

        if let Some(slot) = self.items.iter_mut().find(|i| i.category == item.category) {
            *slot = item;
        } else {
            self.items.push(item);
        }
        self.state = PlateState::Building;

        Ok(())
    }

    pub fn drop_item(&mut self, item_id: MenuItemId, locked: bool) -> Result<(), CanteenError> {
        self.ensure_editable(locked)?;

        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        if self.items.len() == before {
            return Err(CanteenError::UnknownItem(item_id));
        }
        if self.items.is_empty() {
            self.state = PlateState::Empty;
        }

        Ok(())
    }

    pub fn confirm(&mut self, locked: bool) -> Result<(), CanteenError> {
        self.ensure_editable(locked)?;

        if self.items.is_empty() {
            return Err(CanteenError::EmptySelection);
        }
        self.state = PlateState::Confirmed;

        Ok(())
    }

    /// Discards anything picked so far
    pub fn opt_out(&mut self, locked: bool) -> Result<(), CanteenError> {
        if locked {
            return Err(CanteenError::DeadlinePassed);
        }
        if self.state == PlateState::OptedOut {
            return Err(CanteenError::AlreadyOptedOut);
        }

        self.items.clear();
        self.state = PlateState::OptedOut;

        Ok(())
    }

    pub fn modify(&mut self, locked: bool) -> Result<(), CanteenError> {
        if locked {
            return Err(CanteenError::DeadlinePassed);
        }

        self.state = match self.state {
            PlateState::Confirmed => PlateState::Building,
            PlateState::OptedOut => PlateState::Empty,
            PlateState::Empty | PlateState::Building => {
                return Err(CanteenError::NothingToModify)
            }
        };

        Ok(())
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, PlateState::Confirmed | PlateState::OptedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::canteen_data_types::Category;
    use rust_decimal::Decimal;

    fn item(id: u32, category: Category) -> MenuItem {
        MenuItem {
            id,
            name: format!("Item {}", id),
            description: String::new(),
            price: Decimal::new(800, 2),
            category,
        }
    }

    fn plate() -> Plate {
        Plate::new(NaiveDate::from_ymd_opt(2025, 3, 11).unwrap())
    }

    #[test]
    fn test_second_lunch_replaces_first() {
        let mut p = plate();
        p.pick(item(1, Category::Lunch), false).unwrap();
        p.pick(item(4, Category::EveningSnack), false).unwrap();
        p.pick(item(2, Category::Lunch), false).unwrap();

        let lunches: Vec<_> = p
            .items
            .iter()
            .filter(|i| i.category == Category::Lunch)
            .collect();
        assert_eq!(lunches.len(), 1);
        assert_eq!(lunches[0].id, 2);
        assert_eq!(p.items.len(), 2);
        assert_eq!(p.state, PlateState::Building);
    }

    #[test]
    fn test_dropping_last_item_empties_plate() {
        let mut p = plate();
        p.pick(item(6, Category::Beverage), false).unwrap();
        p.drop_item(6, false).unwrap();

        assert_eq!(p.state, PlateState::Empty);
        assert_eq!(p.drop_item(6, false), Err(CanteenError::UnknownItem(6)));
    }

    #[test]
    fn test_confirm_requires_items() {
        let mut p = plate();
        assert_eq!(p.confirm(false), Err(CanteenError::EmptySelection));

        p.pick(item(1, Category::Lunch), false).unwrap();
        p.confirm(false).unwrap();
        assert_eq!(p.state, PlateState::Confirmed);
        assert_eq!(
            p.pick(item(2, Category::Lunch), false),
            Err(CanteenError::AlreadyConfirmed)
        );
    }

    #[test]
    fn test_modify_keeps_items() {
        let mut p = plate();
        p.pick(item(1, Category::Lunch), false).unwrap();
        p.confirm(false).unwrap();
        p.modify(false).unwrap();

        assert_eq!(p.state, PlateState::Building);
        assert_eq!(p.items.len(), 1);
        assert_eq!(p.modify(false), Err(CanteenError::NothingToModify));
    }

    #[test]
    fn test_opt_out_discards_items() {
        let mut p = plate();
        p.pick(item(1, Category::Lunch), false).unwrap();
        p.opt_out(false).unwrap();

        assert_eq!(p.state, PlateState::OptedOut);
        assert!(p.items.is_empty());

        assert_eq!(p.opt_out(false), Err(CanteenError::AlreadyOptedOut));

        p.modify(false).unwrap();
        assert_eq!(p.state, PlateState::Empty);
    }

    #[test]
    fn test_locked_plate_refuses_everything() {
        let mut p = plate();
        p.pick(item(1, Category::Lunch), false).unwrap();
        let before = p.clone();

        assert_eq!(
            p.pick(item(4, Category::EveningSnack), true),
            Err(CanteenError::DeadlinePassed)
        );
        assert_eq!(p.drop_item(1, true), Err(CanteenError::DeadlinePassed));
        assert_eq!(p.confirm(true), Err(CanteenError::DeadlinePassed));
        assert_eq!(p.opt_out(true), Err(CanteenError::DeadlinePassed));
        assert_eq!(p.modify(true), Err(CanteenError::DeadlinePassed));
        assert_eq!(p, before);
    }
}
