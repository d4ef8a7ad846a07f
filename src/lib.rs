pub mod app_state;
pub mod bot_command_handlers;
pub mod bot_command_helpers;
pub mod constants;
pub mod coupon;
pub mod cutoff;
pub mod data_types;
pub mod errors;
pub mod gemini;
pub mod login;
pub mod menu;
pub mod message_builder;
pub mod notifications;
pub mod plate;
pub mod report;
pub mod selection_store;
pub mod shared_main;
pub mod simulation;
pub mod task_scheduler_funcs;
