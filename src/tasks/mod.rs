pub mod payment;

pub use payment::{PaymentSequencer, PaymentState};
