pub mod output;
pub mod payment;
pub mod user;
