//! The whole application state and the reducer that updates it.
//!
//! Bot handlers and scheduled jobs never mutate anything themselves: they send
//! a [`StoreAction`] through a [`StateHandle`] and the single state task applies
//! it with [`AppState::apply`], one action at a time.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::{mpsc, oneshot};

use crate::coupon::Coupon;
use crate::cutoff::{is_after_cutoff, order_date};
use crate::data_types::canteen_data_types::{
    Employee, MenuItem, MenuItemDraft, MenuItemId, Selection,
};
use crate::errors::CanteenError;
use crate::menu::Menu;
use crate::plate::{Plate, PlateState};
use crate::report::{historical_insights, summarize, tally_by_item, DailySummary, HistoricalInsights, ItemTally};
use crate::selection_store::{RecordOutcome, SelectionStore};

pub type ChatId = i64;

#[derive(Debug, Clone)]
pub enum Session {
    Employee { employee: Employee, plate: Plate },
    Admin,
}

#[derive(Debug, Clone)]
pub enum StoreAction {
    Login { chat_id: ChatId, employee: Employee },
    AdminLogin { chat_id: ChatId },
    Logout { chat_id: ChatId },
    RequireAdmin { chat_id: ChatId },
    ShowPlate { chat_id: ChatId },
    PickItem { chat_id: ChatId, item_id: MenuItemId },
    DropItem { chat_id: ChatId, item_id: MenuItemId },
    Confirm { chat_id: ChatId },
    OptOut { chat_id: ChatId },
    Modify { chat_id: ChatId },
    ShowCoupon { chat_id: ChatId },
    ShowMenu,
    DailyReport { chat_id: ChatId },
    HistoricalReport { chat_id: ChatId },
    AddMenuItem { chat_id: ChatId, draft: MenuItemDraft },
    UpdateMenuItem { chat_id: ChatId, item: MenuItem },
    DeleteMenuItem { chat_id: ChatId, item_id: MenuItemId },
    CutoffTick,
    PendingReminders,
    Snapshot,
    InjectSelection(Selection),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlateView {
    pub employee: Employee,
    pub plate: Plate,
    pub locked: bool,
    /// what the store holds for the plate's date
    pub recorded: Option<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    LoggedIn(PlateView),
    AdminLoggedIn,
    LoggedOut,
    Plate(PlateView),
    Confirmed { view: PlateView, coupon: Coupon },
    Coupon(Coupon),
    Menu { menu: Menu, date: NaiveDate, locked: bool },
    DailyReport {
        date: NaiveDate,
        summary: DailySummary,
        tally: Vec<ItemTally>,
    },
    Historical(Option<HistoricalInsights>),
    MenuItemSaved(MenuItem),
    MenuItemDeleted(MenuItem),
    CutoffReached { date: NaiveDate, unsettled: Vec<ChatId> },
    Reminders(Vec<ChatId>),
    Snapshot {
        menu: Menu,
        selections: Vec<Selection>,
        date: NaiveDate,
    },
    Injected(RecordOutcome),
    Done,
}

#[derive(Debug, Clone)]
pub struct AppState {
    sessions: BTreeMap<ChatId, Session>,
    menu: Menu,
    store: SelectionStore,
    history: Vec<Selection>,
    total_employees: usize,
    /// locked dates whose deadline notice has not gone out yet
    unannounced: BTreeSet<NaiveDate>,
}

impl AppState {
    pub fn new(menu: Menu, total_employees: usize) -> Self {
        AppState {
            sessions: BTreeMap::new(),
            menu,
            store: SelectionStore::new(),
            history: Vec::new(),
            total_employees,
            unannounced: BTreeSet::new(),
        }
    }

    /// Seeds past days and today's orders; seeded selections go through the store's checks
    pub fn seed(&mut self, history: Vec<Selection>, current: Vec<Selection>) -> Result<(), CanteenError> {
        self.history.extend(history);
        for selection in current {
            if selection.opted_out {
                self.store.record_opt_out(&selection.employee, selection.date);
            } else {
                self.store
                    .record_selection(&selection.employee, selection.items, selection.date)?;
            }
        }
        Ok(())
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    /// Locks tomorrow once past the cutoff and queues its deadline notice
    fn refresh_cutoff(&mut self, now: NaiveDateTime) {
        let date = order_date(now);
        if is_after_cutoff(now) && self.store.lock(date) {
            self.unannounced.insert(date);
        }
    }

    fn restored_plate(&self, employee: &Employee, date: NaiveDate) -> Plate {
        match self.store.get(&employee.email, date) {
            Some(selection) if selection.opted_out => Plate {
                date,
                items: Vec::new(),
                state: PlateState::OptedOut,
            },
            Some(selection) => Plate {
                date,
                items: selection.items.clone(),
                state: PlateState::Confirmed,
            },
            None => Plate::new(date),
        }
    }

    fn require_admin(&self, chat_id: ChatId) -> Result<(), CanteenError> {
        match self.sessions.get(&chat_id) {
            Some(Session::Admin) => Ok(()),
            Some(Session::Employee { .. }) => Err(CanteenError::AdminOnly),
            None => Err(CanteenError::NotLoggedIn),
        }
    }

    /// The employee session of the chat, with its plate moved to the current order date
    fn employee_session(
        &mut self,
        chat_id: ChatId,
        date: NaiveDate,
    ) -> Result<(&Employee, &mut Plate, &mut SelectionStore), CanteenError> {
        let stale = match self.sessions.get(&chat_id) {
            Some(Session::Employee { employee, plate }) if plate.date != date => {
                Some(self.restored_plate(employee, date))
            }
            Some(Session::Employee { .. }) => None,
            Some(Session::Admin) => return Err(CanteenError::AdminOnly),
            None => return Err(CanteenError::NotLoggedIn),
        };

        match self.sessions.get_mut(&chat_id) {
            Some(Session::Employee { employee, plate }) => {
                if let Some(fresh) = stale {
                    *plate = fresh;
                }
                Ok((employee, plate, &mut self.store))
            }
            _ => Err(CanteenError::NotLoggedIn),
        }
    }

    fn plate_view(&mut self, chat_id: ChatId, date: NaiveDate) -> Result<PlateView, CanteenError> {
        let locked = self.store.is_locked(date);
        let (employee, plate, store) = self.employee_session(chat_id, date)?;
        let recorded = store.get(&employee.email, date).cloned();
        Ok(PlateView {
            employee: employee.clone(),
            plate: plate.clone(),
            locked,
            recorded,
        })
    }

    fn unsettled_chats(&self, date: NaiveDate) -> Vec<ChatId> {
        self.sessions
            .iter()
            .filter_map(|(chat_id, session)| match session {
                Session::Employee { employee, plate } => {
                    let settled = if plate.date == date {
                        plate.is_settled()
                    } else {
                        self.store.get(&employee.email, date).is_some()
                    };
                    (!settled).then_some(*chat_id)
                }
                Session::Admin => None,
            })
            .collect()
    }

    /// Past days: the seeded history plus everything recorded before `date`
    fn past_selections(&self, date: NaiveDate) -> Vec<Selection> {
        let mut past = self.history.clone();
        past.extend(
            self.store
                .all_selections(None)
                .into_iter()
                .filter(|s| s.date < date),
        );
        past
    }

    pub fn apply(
        &mut self,
        action: StoreAction,
        now: NaiveDateTime,
    ) -> Result<ActionOutcome, CanteenError> {
        self.refresh_cutoff(now);
        let date = order_date(now);
        let locked = self.store.is_locked(date);

        match action {
            StoreAction::Login { chat_id, employee } => {
                log::info!("{} logged in as {}", chat_id, employee.email);
                let plate = self.restored_plate(&employee, date);
                self.sessions
                    .insert(chat_id, Session::Employee { employee, plate });
                Ok(ActionOutcome::LoggedIn(self.plate_view(chat_id, date)?))
            }

            StoreAction::AdminLogin { chat_id } => {
                log::info!("{} logged in as admin", chat_id);
                self.sessions.insert(chat_id, Session::Admin);
                Ok(ActionOutcome::AdminLoggedIn)
            }

            StoreAction::Logout { chat_id } => match self.sessions.remove(&chat_id) {
                Some(_) => Ok(ActionOutcome::LoggedOut),
                None => Err(CanteenError::NotLoggedIn),
            },

            StoreAction::RequireAdmin { chat_id } => {
                self.require_admin(chat_id)?;
                Ok(ActionOutcome::Done)
            }

            StoreAction::ShowPlate { chat_id } => {
                Ok(ActionOutcome::Plate(self.plate_view(chat_id, date)?))
            }

            StoreAction::PickItem { chat_id, item_id } => {
                let item = self
                    .menu
                    .get(item_id)
                    .cloned()
                    .ok_or(CanteenError::UnknownItem(item_id))?;
                let (_, plate, _) = self.employee_session(chat_id, date)?;
                plate.pick(item, locked)?;
                Ok(ActionOutcome::Plate(self.plate_view(chat_id, date)?))
            }

            StoreAction::DropItem { chat_id, item_id } => {
                let (_, plate, _) = self.employee_session(chat_id, date)?;
                plate.drop_item(item_id, locked)?;
                Ok(ActionOutcome::Plate(self.plate_view(chat_id, date)?))
            }

            StoreAction::Confirm { chat_id } => {
                let (employee, plate, store) = self.employee_session(chat_id, date)?;

                let mut next = plate.clone();
                next.confirm(locked)?;
                match store.record_selection(employee, next.items.clone(), date)? {
                    RecordOutcome::Recorded => *plate = next,
                    RecordOutcome::Locked => return Err(CanteenError::DeadlinePassed),
                }
                log::info!("{} confirmed {} items for {}", employee.email, plate.items.len(), date);

                let coupon = Coupon::new(employee, date, &plate.items);
                Ok(ActionOutcome::Confirmed {
                    view: self.plate_view(chat_id, date)?,
                    coupon,
                })
            }

            StoreAction::OptOut { chat_id } => {
                let (employee, plate, store) = self.employee_session(chat_id, date)?;

                let mut next = plate.clone();
                next.opt_out(locked)?;
                match store.record_opt_out(employee, date) {
                    RecordOutcome::Recorded => *plate = next,
                    RecordOutcome::Locked => return Err(CanteenError::DeadlinePassed),
                }
                log::info!("{} opted out for {}", employee.email, date);

                Ok(ActionOutcome::Plate(self.plate_view(chat_id, date)?))
            }

            StoreAction::Modify { chat_id } => {
                let (_, plate, _) = self.employee_session(chat_id, date)?;
                plate.modify(locked)?;
                Ok(ActionOutcome::Plate(self.plate_view(chat_id, date)?))
            }

            StoreAction::ShowCoupon { chat_id } => {
                let (employee, _, store) = self.employee_session(chat_id, date)?;
                match store.get(&employee.email, date) {
                    Some(selection) if !selection.opted_out => Ok(ActionOutcome::Coupon(
                        Coupon::new(employee, date, &selection.items),
                    )),
                    _ => Err(CanteenError::NoCoupon),
                }
            }

            StoreAction::ShowMenu => Ok(ActionOutcome::Menu {
                menu: self.menu.clone(),
                date,
                locked,
            }),

            StoreAction::DailyReport { chat_id } => {
                self.require_admin(chat_id)?;
                let selections = self.store.all_selections(Some(date));
                Ok(ActionOutcome::DailyReport {
                    date,
                    summary: summarize(&selections),
                    tally: tally_by_item(&selections),
                })
            }

            StoreAction::HistoricalReport { chat_id } => {
                self.require_admin(chat_id)?;
                let past = self.past_selections(date);
                Ok(ActionOutcome::Historical(historical_insights(
                    &past,
                    self.total_employees,
                )))
            }

            StoreAction::AddMenuItem { chat_id, draft } => {
                self.require_admin(chat_id)?;
                let item = self.menu.add(draft)?;
                log::info!("Menu item {} added: {}", item.id, item.name);
                Ok(ActionOutcome::MenuItemSaved(item))
            }

            StoreAction::UpdateMenuItem { chat_id, item } => {
                self.require_admin(chat_id)?;
                let item = self.menu.update(item)?;
                log::info!("Menu item {} updated", item.id);
                Ok(ActionOutcome::MenuItemSaved(item))
            }

            StoreAction::DeleteMenuItem { chat_id, item_id } => {
                self.require_admin(chat_id)?;
                let item = self.menu.delete(item_id)?;
                log::info!("Menu item {} deleted", item.id);
                Ok(ActionOutcome::MenuItemDeleted(item))
            }

            StoreAction::CutoffTick => {
                // only the latest date matters, older plates have moved on
                let pending = std::mem::take(&mut self.unannounced);
                match pending.into_iter().next_back() {
                    Some(locked_date) => {
                        log::info!("Cutoff reached, selections for {} are final", locked_date);
                        Ok(ActionOutcome::CutoffReached {
                            date: locked_date,
                            unsettled: self.unsettled_chats(locked_date),
                        })
                    }
                    None => Ok(ActionOutcome::Done),
                }
            }

            StoreAction::PendingReminders => {
                if locked {
                    Ok(ActionOutcome::Reminders(Vec::new()))
                } else {
                    Ok(ActionOutcome::Reminders(self.unsettled_chats(date)))
                }
            }

            StoreAction::Snapshot => Ok(ActionOutcome::Snapshot {
                menu: self.menu.clone(),
                selections: self.store.all_selections(Some(date)),
                date,
            }),

            StoreAction::InjectSelection(selection) => {
                let outcome = if selection.opted_out {
                    self.store
                        .record_opt_out(&selection.employee, selection.date)
                } else {
                    self.store.record_selection(
                        &selection.employee,
                        selection.items,
                        selection.date,
                    )?
                };
                Ok(ActionOutcome::Injected(outcome))
            }
        }
    }
}

struct StateTask {
    action: StoreAction,
    reply: oneshot::Sender<Result<ActionOutcome, CanteenError>>,
}

/// Cloneable sender side of the state task
#[derive(Clone)]
pub struct StateHandle {
    tx: mpsc::Sender<StateTask>,
}

impl StateHandle {
    pub async fn dispatch(&self, action: StoreAction) -> Result<Result<ActionOutcome, CanteenError>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(StateTask { action, reply })
            .await
            .map_err(|_| anyhow!("state task is gone"))?;

        rx.await.map_err(|_| anyhow!("state task dropped the reply"))
    }
}

/// Moves the state into its own task; it lives as long as any handle does
pub fn spawn_state_task(mut state: AppState) -> StateHandle {
    let (tx, mut rx) = mpsc::channel::<StateTask>(32);

    tokio::spawn(async move {
        while let Some(task) = rx.recv().await {
            let now = chrono::Local::now().naive_local();
            let result = state.apply(task.action, now);
            if let Err(e) = &result {
                log::debug!("Action rejected: {}", e);
            }
            // the requester may have given up waiting
            let _ = task.reply.send(result);
        }
        log::info!("State task stopped");
    });

    StateHandle { tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::canteen_data_types::Category;
    use crate::login::employee_login;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn logged_in_state() -> AppState {
        let mut state = AppState::new(Menu::default(), 25);
        let employee = employee_login("jane.doe@gmail.com", "555-123-4567").unwrap();
        state
            .apply(StoreAction::Login { chat_id: 1, employee }, at(10, 9, 0))
            .unwrap();
        state
    }

    #[test]
    fn test_actions_require_login() {
        let mut state = AppState::new(Menu::default(), 25);
        assert_eq!(
            state.apply(StoreAction::Confirm { chat_id: 1 }, at(10, 9, 0)),
            Err(CanteenError::NotLoggedIn)
        );
    }

    #[test]
    fn test_admin_actions_require_admin() {
        let mut state = logged_in_state();
        assert_eq!(
            state.apply(StoreAction::DailyReport { chat_id: 1 }, at(10, 9, 0)),
            Err(CanteenError::AdminOnly)
        );

        state
            .apply(StoreAction::AdminLogin { chat_id: 2 }, at(10, 9, 0))
            .unwrap();
        assert_eq!(
            state.apply(StoreAction::PickItem { chat_id: 2, item_id: 1 }, at(10, 9, 0)),
            Err(CanteenError::AdminOnly)
        );
    }

    #[test]
    fn test_confirm_records_selection_for_tomorrow() {
        let mut state = logged_in_state();
        state
            .apply(StoreAction::PickItem { chat_id: 1, item_id: 1 }, at(10, 9, 0))
            .unwrap();
        state
            .apply(StoreAction::PickItem { chat_id: 1, item_id: 6 }, at(10, 9, 1))
            .unwrap();

        let outcome = state
            .apply(StoreAction::Confirm { chat_id: 1 }, at(10, 9, 2))
            .unwrap();

        let tomorrow = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        match outcome {
            ActionOutcome::Confirmed { view, coupon } => {
                assert_eq!(view.plate.state, PlateState::Confirmed);
                assert_eq!(coupon.date, tomorrow);
                assert_eq!(coupon.items, vec!["Veggie Burger", "Iced Coffee"]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let recorded = state.store().get("jane.doe@gmail.com", tomorrow).unwrap();
        assert_eq!(recorded.items.len(), 2);
    }

    #[test]
    fn test_unknown_item() {
        let mut state = logged_in_state();
        assert_eq!(
            state.apply(StoreAction::PickItem { chat_id: 1, item_id: 99 }, at(10, 9, 0)),
            Err(CanteenError::UnknownItem(99))
        );
    }

    #[test]
    fn test_cutoff_locks_and_reports_unsettled_once() {
        let mut state = logged_in_state();
        state
            .apply(StoreAction::PickItem { chat_id: 1, item_id: 2 }, at(10, 20, 0))
            .unwrap();

        assert_eq!(
            state.apply(StoreAction::CutoffTick, at(10, 20, 59)),
            Ok(ActionOutcome::Done)
        );

        let outcome = state.apply(StoreAction::CutoffTick, at(10, 21, 1)).unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::CutoffReached {
                date: NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
                unsettled: vec![1],
            }
        );
        assert_eq!(
            state.apply(StoreAction::CutoffTick, at(10, 21, 2)),
            Ok(ActionOutcome::Done)
        );

        assert_eq!(
            state.apply(StoreAction::Confirm { chat_id: 1 }, at(10, 21, 3)),
            Err(CanteenError::DeadlinePassed)
        );
        assert!(state.store().is_empty());
    }

    #[test]
    fn test_deadline_notice_survives_earlier_actions() {
        let mut state = logged_in_state();
        state
            .apply(StoreAction::PickItem { chat_id: 1, item_id: 2 }, at(10, 20, 0))
            .unwrap();

        // the simulation snapshot and a late tap both reach the state before the tick
        let late = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(21, 0, 4)
            .unwrap();
        state.apply(StoreAction::Snapshot, late).unwrap();
        assert_eq!(
            state.apply(StoreAction::PickItem { chat_id: 1, item_id: 3 }, late),
            Err(CanteenError::DeadlinePassed)
        );

        assert_eq!(
            state.apply(StoreAction::CutoffTick, at(10, 21, 1)),
            Ok(ActionOutcome::CutoffReached {
                date: NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
                unsettled: vec![1],
            })
        );
        assert_eq!(
            state.apply(StoreAction::CutoffTick, at(10, 21, 2)),
            Ok(ActionOutcome::Done)
        );
    }

    #[test]
    fn test_plate_resets_on_new_order_date() {
        let mut state = logged_in_state();
        state
            .apply(StoreAction::PickItem { chat_id: 1, item_id: 3 }, at(10, 9, 0))
            .unwrap();
        state
            .apply(StoreAction::Confirm { chat_id: 1 }, at(10, 9, 1))
            .unwrap();

        match state.apply(StoreAction::ShowPlate { chat_id: 1 }, at(11, 8, 0)).unwrap() {
            ActionOutcome::Plate(view) => {
                assert_eq!(view.plate.state, PlateState::Empty);
                assert_eq!(view.plate.date, NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
                assert!(!view.locked);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_relogin_restores_confirmed_plate() {
        let mut state = logged_in_state();
        state
            .apply(StoreAction::PickItem { chat_id: 1, item_id: 8 }, at(10, 9, 0))
            .unwrap();
        state
            .apply(StoreAction::Confirm { chat_id: 1 }, at(10, 9, 1))
            .unwrap();
        state
            .apply(StoreAction::Logout { chat_id: 1 }, at(10, 9, 2))
            .unwrap();

        let employee = employee_login("jane.doe@gmail.com", "555-123-4567").unwrap();
        match state
            .apply(StoreAction::Login { chat_id: 1, employee }, at(10, 9, 3))
            .unwrap()
        {
            ActionOutcome::LoggedIn(view) => {
                assert_eq!(view.plate.state, PlateState::Confirmed);
                assert_eq!(view.plate.items[0].category, Category::Lunch);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_state_handle_roundtrip() {
        let handle = spawn_state_task(AppState::new(Menu::default(), 25));

        let outcome = handle.dispatch(StoreAction::ShowMenu).await.unwrap().unwrap();
        match outcome {
            ActionOutcome::Menu { menu, .. } => assert_eq!(menu.items().len(), 10),
            other => panic!("unexpected outcome {:?}", other),
        }

        let rejected = handle
            .dispatch(StoreAction::ShowPlate { chat_id: 5 })
            .await
            .unwrap();
        assert_eq!(rejected, Err(CanteenError::NotLoggedIn));
    }
}
