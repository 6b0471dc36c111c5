pub mod clock;
pub mod login;
pub mod notifier;
pub mod runner;
pub mod selectors;
pub mod session;
pub mod wait;
