// Premium tier payments: IntaSend M-Pesa STK push, status polling, signed
// webhooks, and the manual WhatsApp unlock path.
// All status writes go through store.rs, which enforces pending -> final only.

pub mod handlers;
pub mod intasend;
pub mod store;
pub mod unlock;
pub mod webhook;
