use crate::constants::{CONFIRMATION_MSG, OPT_OUT_MSG};
use crate::data_types::canteen_data_types::Employee;

/// There is no SMS gateway; the message only ends up in the log
pub fn send_simulated_sms(employee: &Employee, message: &str) {
    if employee.phone_number.is_empty() {
        log::debug!("No phone number for {}, SMS skipped", employee.email);
        return;
    }
    log::info!("SIMULATING SMS to {}: \"{}\"", employee.phone_number, message);
}

pub fn notify_confirmed(employee: &Employee) {
    send_simulated_sms(employee, CONFIRMATION_MSG);
}

pub fn notify_opted_out(employee: &Employee) {
    send_simulated_sms(employee, OPT_OUT_MSG);
}
