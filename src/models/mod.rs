pub mod clock_request;
pub mod punch;
pub mod session_state;
pub mod summary;
