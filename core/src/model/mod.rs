// lensflow/src/model/mod.rs

//! Order, payment and action types shared by every part of the crate.

pub mod action;
pub mod money;
pub mod order;
pub mod payment;
pub mod status;

pub use action::{Action, ActionSet, PendingTransition};
pub use money::Money;
pub use order::{DeliveryMode, KioskId, Order, OrderId, OrderLine};
pub use payment::{PaymentContext, PaymentDetails, PaymentRecord};
pub use status::OrderStatus;
