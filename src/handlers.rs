pub mod bookings;
pub mod documents;
pub mod enquiries;
pub mod session;
pub mod surveys;
