use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Timelike;
use teloxide::{requests::Requester, types::ChatId, Bot};
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

use crate::{
    app_state::{ActionOutcome, StateHandle, StoreAction},
    constants::{DEADLINE_MSG, REMINDER_HOUR, REMINDER_MSG},
    data_types::canteen_data_types::Employee,
    simulation::{next_simulated_selection, pending_employees},
};

const TARGET: &str = "canteen_telegram_rs::TaskSched";

/// Cron expressions run in UTC, this converts a local wall clock time for today
pub fn local_to_utc(hour: u32, minute: u32) -> Result<(u32, u32)> {
    let local_time = chrono::Local::now()
        .with_hour(hour)
        .and_then(|t| t.with_minute(minute))
        .and_then(|t| t.with_second(0))
        .ok_or_else(|| anyhow!("invalid local time {:02}:{:02}", hour, minute))?;
    let utc_time = local_time.naive_utc();

    Ok((utc_time.hour(), utc_time.minute()))
}

/// Every day at the given UTC time
pub fn daily_cron(utc_hour: u32, utc_minute: u32) -> String {
    format!("0 {} {} * * *", utc_minute, utc_hour)
}

async fn broadcast(bot: &Bot, chats: &[i64], text: &str) {
    for chat_id in chats {
        if let Err(e) = bot.send_message(ChatId(*chat_id), text).await {
            log::error!(target: TARGET, "Failed to notify {}: {}", chat_id, e);
        }
    }
}

/// Checks the cutoff every minute; whoever is left with an unconfirmed plate is told
pub async fn start_cutoff_job(bot: Bot, sched: &JobScheduler, state: StateHandle) -> Result<Uuid> {
    let job = Job::new_async("0 * * * * *", move |_uuid, mut _l| {
        let bot = bot.clone();
        let state = state.clone();

        Box::pin(async move {
            match state.dispatch(StoreAction::CutoffTick).await {
                Ok(Ok(ActionOutcome::CutoffReached { date, unsettled })) => {
                    log::info!(target: TARGET, "Locked {}, {} plates left open", date, unsettled.len());
                    broadcast(&bot, &unsettled, DEADLINE_MSG).await;
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => log::error!(target: TARGET, "Cutoff tick rejected: {}", e),
                Err(e) => log::error!(target: TARGET, "Cutoff tick failed: {}", e),
            }
        })
    })
    .map_err(|e| anyhow!("{:?}", e))?;

    sched.add(job).await.map_err(|e| anyhow!("{:?}", e))
}

pub async fn start_reminder_job(bot: Bot, sched: &JobScheduler, state: StateHandle) -> Result<Uuid> {
    let (hour, minute) = local_to_utc(REMINDER_HOUR, 0)?;
    log::info!(target: TARGET, "Reminders at {:02}:{:02} UTC", hour, minute);

    let job = Job::new_async(daily_cron(hour, minute).as_str(), move |_uuid, mut _l| {
        let bot = bot.clone();
        let state = state.clone();

        Box::pin(async move {
            match state.dispatch(StoreAction::PendingReminders).await {
                Ok(Ok(ActionOutcome::Reminders(chats))) => {
                    log::info!(target: TARGET, "Sending {} reminders", chats.len());
                    broadcast(&bot, &chats, REMINDER_MSG).await;
                }
                Ok(other) => log::error!(target: TARGET, "Unexpected reminder result: {:?}", other),
                Err(e) => log::error!(target: TARGET, "Reminder query failed: {}", e),
            }
        })
    })
    .map_err(|e| anyhow!("{:?}", e))?;

    sched.add(job).await.map_err(|e| anyhow!("{:?}", e))
}

/// Injects one synthetic order every 4 seconds until every dummy employee has answered
pub async fn start_simulation_job(
    sched: &JobScheduler,
    state: StateHandle,
    employees: Arc<Vec<Employee>>,
) -> Result<Uuid> {
    let job = Job::new_async("0/4 * * * * *", move |uuid, mut l| {
        let state = state.clone();
        let employees = employees.clone();

        Box::pin(async move {
            let (menu, selections, date) = match state.dispatch(StoreAction::Snapshot).await {
                Ok(Ok(ActionOutcome::Snapshot {
                    menu,
                    selections,
                    date,
                })) => (menu, selections, date),
                other => {
                    log::error!(target: TARGET, "Simulation snapshot failed: {:?}", other);
                    return;
                }
            };

            if pending_employees(&employees, &selections, date).is_empty() {
                log::info!(target: TARGET, "Every dummy employee answered, stopping simulation");
                if let Err(e) = l.remove(&uuid).await {
                    log::error!(target: TARGET, "Could not remove simulation job: {:?}", e);
                }
                return;
            }

            let next = {
                let mut rng = rand::thread_rng();
                next_simulated_selection(&employees, &menu, &selections, date, &mut rng)
            };
            let Some(selection) = next else {
                return;
            };

            log::debug!(target: TARGET, "Simulated order from {}", selection.identity());
            if let Ok(Err(e)) = state.dispatch(StoreAction::InjectSelection(selection)).await {
                log::warn!(target: TARGET, "Simulated order rejected: {}", e);
            }
        })
    })
    .map_err(|e| anyhow!("{:?}", e))?;

    sched.add(job).await.map_err(|e| anyhow!("{:?}", e))
}

pub async fn run_task_scheduler(
    bot: Bot,
    state: StateHandle,
    simulated_employees: Option<Arc<Vec<Employee>>>,
) -> Result<JobScheduler> {
    let sched = JobScheduler::new().await.map_err(|e| anyhow!("{:?}", e))?;

    start_cutoff_job(bot.clone(), &sched, state.clone()).await?;
    start_reminder_job(bot, &sched, state.clone()).await?;
    if let Some(employees) = simulated_employees {
        start_simulation_job(&sched, state, employees).await?;
        log::info!(target: TARGET, "Simulation enabled");
    }

    // start scheduler (non blocking)
    sched.start().await.map_err(|e| anyhow!("{:?}", e))?;
    log::info!(target: TARGET, "Ready.");

    Ok(sched)
}
