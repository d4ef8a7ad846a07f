//! Demo data: dummy employees, a month of history and live synthetic orders.
//!
//! Nothing in the store or the report aggregator depends on this module.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::data_types::canteen_data_types::{Category, Employee, MenuItem, Selection};
use crate::menu::Menu;

/// Probabilities (per candidate item) used when picking a dummy plate
#[derive(Debug, Copy, Clone)]
struct PickOdds {
    opt_out: f64,
    lunch: f64,
    snack: f64,
    beverage: f64,
}

const SEED_ODDS: PickOdds = PickOdds {
    opt_out: 0.2,
    lunch: 0.5,
    snack: 0.6,
    beverage: 0.7,
};

const LIVE_ODDS: PickOdds = PickOdds {
    opt_out: 0.15,
    lunch: 0.4,
    snack: 0.5,
    beverage: 0.6,
};

pub fn dummy_employees(n: usize) -> Vec<Employee> {
    (0..n)
        .map(|i| Employee {
            name: format!("Employee {}", i + 1),
            email: format!("employee{}@example.com", i + 1),
            phone_number: format!("555-555-{}", 5500 + i),
        })
        .collect()
}

// first item of the category whose roll beats the threshold
fn first_passing<R: Rng>(
    menu: &Menu,
    category: Category,
    threshold: f64,
    rng: &mut R,
) -> Option<MenuItem> {
    menu.items()
        .iter()
        .filter(|i| i.category == category)
        .find(|_| rng.gen::<f64>() > threshold)
        .cloned()
}

fn dummy_selection<R: Rng>(
    employee: &Employee,
    menu: &Menu,
    date: NaiveDate,
    odds: PickOdds,
    rng: &mut R,
) -> Option<Selection> {
    if rng.gen::<f64>() < odds.opt_out {
        return Some(Selection {
            employee: employee.clone(),
            items: Vec::new(),
            date,
            opted_out: true,
        });
    }

    let items: Vec<MenuItem> = [
        first_passing(menu, Category::Lunch, odds.lunch, rng),
        first_passing(menu, Category::EveningSnack, odds.snack, rng),
        first_passing(menu, Category::Beverage, odds.beverage, rng),
    ]
    .into_iter()
    .flatten()
    .collect();

    if items.is_empty() {
        return None;
    }

    Some(Selection {
        employee: employee.clone(),
        items,
        date,
        opted_out: false,
    })
}

pub fn create_dummy_selections<R: Rng>(
    employees: &[Employee],
    menu: &Menu,
    date: NaiveDate,
    rng: &mut R,
) -> Vec<Selection> {
    employees
        .iter()
        .filter_map(|e| dummy_selection(e, menu, date, SEED_ODDS, rng))
        .collect()
}

/// Selections for each of the `days` days before `today`
pub fn seed_history<R: Rng>(
    employees: &[Employee],
    menu: &Menu,
    today: NaiveDate,
    days: i64,
    rng: &mut R,
) -> Vec<Selection> {
    (1..=days)
        .flat_map(|ago| {
            let date = today - Duration::days(ago);
            create_dummy_selections(employees, menu, date, rng)
        })
        .collect()
}

/// Employees that have not answered for `date` yet
pub fn pending_employees<'a>(
    employees: &'a [Employee],
    existing: &[Selection],
    date: NaiveDate,
) -> Vec<&'a Employee> {
    let answered: HashSet<&str> = existing
        .iter()
        .filter(|s| s.date == date)
        .map(|s| s.identity())
        .collect();

    employees
        .iter()
        .filter(|e| !answered.contains(e.email.as_str()))
        .collect()
}

/// One synthetic order from a random employee who has not answered yet.
/// `None` if everybody answered or the roll picked nothing.
pub fn next_simulated_selection<R: Rng>(
    employees: &[Employee],
    menu: &Menu,
    existing: &[Selection],
    date: NaiveDate,
    rng: &mut R,
) -> Option<Selection> {
    let pending = pending_employees(employees, existing, date);
    if pending.is_empty() {
        return None;
    }

    let employee = pending[rng.gen_range(0..pending.len())];
    dummy_selection(employee, menu, date, LIVE_ODDS, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection_store::check_category_cap;
    use rand::{rngs::StdRng, SeedableRng};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
    }

    #[test]
    fn test_dummy_employees() {
        let employees = dummy_employees(25);
        assert_eq!(employees.len(), 25);
        assert_eq!(employees[0].email, "employee1@example.com");
        assert_eq!(employees[24].phone_number, "555-555-5524");
    }

    #[test]
    fn test_dummy_selections_respect_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        let employees = dummy_employees(25);
        let menu = Menu::default();

        let history = seed_history(&employees, &menu, date(), 30, &mut rng);
        assert!(!history.is_empty());

        for s in &history {
            if s.opted_out {
                assert!(s.items.is_empty());
            } else {
                assert!(!s.items.is_empty());
                assert!(check_category_cap(&s.items).is_ok());
            }
            assert!(s.date < date());
        }

        let days: HashSet<_> = history.iter().map(|s| s.date).collect();
        assert!(days.len() <= 30);
    }

    #[test]
    fn test_one_dummy_selection_per_employee_and_day() {
        let mut rng = StdRng::seed_from_u64(42);
        let employees = dummy_employees(25);
        let selections = create_dummy_selections(&employees, &Menu::default(), date(), &mut rng);

        let identities: HashSet<_> = selections.iter().map(|s| s.identity()).collect();
        assert_eq!(identities.len(), selections.len());
    }

    #[test]
    fn test_simulation_only_picks_pending_employees() {
        let mut rng = StdRng::seed_from_u64(3);
        let employees = dummy_employees(3);
        let menu = Menu::default();
        let mut existing: Vec<Selection> = Vec::new();

        for _ in 0..200 {
            if let Some(s) = next_simulated_selection(&employees, &menu, &existing, date(), &mut rng)
            {
                assert!(existing.iter().all(|e| e.identity() != s.identity()));
                existing.push(s);
            }
        }

        assert_eq!(existing.len(), 3);
        assert!(next_simulated_selection(&employees, &menu, &existing, date(), &mut rng).is_none());
    }
}
