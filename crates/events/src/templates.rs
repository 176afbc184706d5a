//! Plain-text guest emails for booking events.

use crate::bus::{ReservationNotice, RESERVATION_CANCELLED, RESERVATION_CREATED};
use crate::delivery::email::OutgoingEmail;

const LODGE_NAME: &str = "Molly Butler Lodge";
const LODGE_PHONE: &str = "(928) 735-7226";
const LODGE_ADDRESS: &str = "109 Main Street, Greer, AZ 85927";

/// Render the email for an event type, or `None` for events guests are not
/// notified about.
pub fn render(event_type: &str, notice: &ReservationNotice) -> Option<OutgoingEmail> {
    match event_type {
        RESERVATION_CREATED => Some(confirmation(notice)),
        RESERVATION_CANCELLED => Some(cancellation(notice)),
        _ => None,
    }
}

pub fn confirmation(notice: &ReservationNotice) -> OutgoingEmail {
    let mut body = format!(
        "Dear {first} {last},\n\n\
         Your reservation at {LODGE_NAME} is confirmed.\n\n\
         Confirmation number: {code}\n\
         Room: {room}\n\
         Check-in: {check_in} (from 3:00 PM)\n\
         Check-out: {check_out} (by 11:00 AM)\n\
         Nights: {nights}\n\
         Guests: {guests}\n\
         Total: ${total:.2}\n",
        first = notice.guest_first_name,
        last = notice.guest_last_name,
        code = notice.confirmation_code,
        room = notice.room_name,
        check_in = notice.check_in.format("%B %-d, %Y"),
        check_out = notice.check_out.format("%B %-d, %Y"),
        nights = notice.nights,
        guests = notice.guests,
        total = notice.total_amount,
    );

    if !notice.special_requests.trim().is_empty() {
        body.push_str(&format!("\nSpecial requests: {}\n", notice.special_requests.trim()));
    }

    body.push_str(&format!(
        "\n{LODGE_NAME}\n{LODGE_ADDRESS}\n\
         Questions? Call us at {LODGE_PHONE}.\n"
    ));

    OutgoingEmail {
        to: notice.guest_email.clone(),
        subject: format!("Reservation Confirmation - {}", notice.confirmation_code),
        body,
    }
}

pub fn cancellation(notice: &ReservationNotice) -> OutgoingEmail {
    let body = format!(
        "Dear {first} {last},\n\n\
         Your reservation {code} at {LODGE_NAME} has been cancelled.\n\n\
         Room: {room}\n\
         Check-in: {check_in}\n\
         Check-out: {check_out}\n\
         Total: ${total:.2}\n\n\
         If you paid a deposit, it will be refunded according to our cancellation \
         policy. Please allow 5-7 business days.\n\n\
         We hope to welcome you another time. Call us at {LODGE_PHONE} to rebook.\n",
        first = notice.guest_first_name,
        last = notice.guest_last_name,
        code = notice.confirmation_code,
        room = notice.room_name,
        check_in = notice.check_in.format("%B %-d, %Y"),
        check_out = notice.check_out.format("%B %-d, %Y"),
        total = notice.total_amount,
    );

    OutgoingEmail {
        to: notice.guest_email.clone(),
        subject: format!("Reservation Cancellation - {}", notice.confirmation_code),
        body,
    }
}
