pub mod client;
pub mod minor_units;
pub mod transport;

pub use client::PayuClient;
pub use minor_units::{to_major_units, to_minor_units};
pub use transport::{HttpTransport, RequestBody, Transport, TransportRequest, TransportResponse};
