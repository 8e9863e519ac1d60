//! Domain services layered over the API client.

pub mod appointments;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod quotes;

pub use appointments::{AppointmentDraft, AppointmentService};
pub use auth::{AuthService, LoginOutcome};
pub use cart::CartService;
pub use checkout::{CheckoutForm, CheckoutReceipt, CheckoutService, PaymentError};
pub use quotes::{QuoteDraft, QuoteService};
