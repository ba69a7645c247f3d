pub mod api;

pub use api::{BoxedGateway, CommercePlatform, PaymentGateway};
