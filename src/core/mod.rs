pub mod currency;
pub mod error;
pub mod traits;

pub use currency::Currency;
pub use error::{CallbackError, Error, RawResponse, Result, TransitionError};
