pub mod booking;
pub mod overlap;
pub mod store;

#[cfg(test)]
mod booking_test;
