use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::data_types::canteen_data_types::{Category, Employee, MenuItem, Selection};
use crate::errors::CanteenError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// the date is past its cutoff, nothing was changed
    Locked,
}

/// Per-day meal choices, at most one per (employee, date)
#[derive(Debug, Default, Clone)]
pub struct SelectionStore {
    entries: Vec<Selection>,
    locked_dates: BTreeSet<NaiveDate>,
}

/// Fails on the first category that appears twice in `items`
pub fn check_category_cap(items: &[MenuItem]) -> Result<(), CanteenError> {
    let mut seen: BTreeSet<Category> = BTreeSet::new();
    for item in items {
        if !seen.insert(item.category) {
            return Err(CanteenError::CategoryCapExceeded(item.category));
        }
    }
    Ok(())
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_selection(
        &mut self,
        employee: &Employee,
        items: Vec<MenuItem>,
        date: NaiveDate,
    ) -> Result<RecordOutcome, CanteenError> {
        check_category_cap(&items)?;

        Ok(self.replace(Selection {
            employee: employee.clone(),
            items,
            date,
            opted_out: false,
        }))
    }

    pub fn record_opt_out(&mut self, employee: &Employee, date: NaiveDate) -> RecordOutcome {
        self.replace(Selection {
            employee: employee.clone(),
            items: Vec::new(),
            date,
            opted_out: true,
        })
    }

    fn replace(&mut self, selection: Selection) -> RecordOutcome {
        if self.is_locked(selection.date) {
            log::debug!(
                "Ignoring selection of {} for locked {}",
                selection.identity(),
                selection.date
            );
            return RecordOutcome::Locked;
        }

        self.entries
            .retain(|s| !(s.date == selection.date && s.identity() == selection.identity()));
        self.entries.push(selection);

        RecordOutcome::Recorded
    }

    pub fn all_selections(&self, date: Option<NaiveDate>) -> Vec<Selection> {
        match date {
            Some(date) => self
                .entries
                .iter()
                .filter(|s| s.date == date)
                .cloned()
                .collect(),
            None => self.entries.clone(),
        }
    }

    pub fn get(&self, identity: &str, date: NaiveDate) -> Option<&Selection> {
        self.entries
            .iter()
            .find(|s| s.date == date && s.identity() == identity)
    }

    /// Returns true if the date was not locked before
    pub fn lock(&mut self, date: NaiveDate) -> bool {
        self.locked_dates.insert(date)
    }

    pub fn is_locked(&self, date: NaiveDate) -> bool {
        self.locked_dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
