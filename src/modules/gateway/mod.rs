pub mod models;
pub mod services;

pub use models::api_types::{
    BuyerData, CancellationResponse, ChargeResponse, NewOrderRequest, NewOrderResponse, OrderData,
    OrderInfoResponse, OrderStatus, PayoutRequest, ProductData, RefundRecord, RefundRequest,
    RefundResponse, RefundStatus, ResponseStatus, ShopBalance, ShopInfoResponse, StatusObj,
};
pub use services::client::PayuClient;
pub use services::minor_units::{to_major_units, to_minor_units};
pub use services::transport::{
    HttpTransport, RequestBody, Transport, TransportRequest, TransportResponse,
};
