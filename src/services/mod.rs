mod checkout;
mod payment;

pub use checkout::CheckoutService;
pub use payment::{PaymentIntent, PaymentService};
