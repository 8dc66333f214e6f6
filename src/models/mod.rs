pub mod booking_histories;
pub mod bookings;
pub mod tables;
pub mod users;

pub mod password_resets;
pub mod user_logins;
