pub mod api_types;

pub use api_types::{
    BuyerData, CancellationResponse, ChargeResponse, NewOrderRequest, NewOrderResponse, OrderData,
    OrderInfoResponse, OrderStatus, PayoutRequest, ProductData, RefundRecord, RefundRequest,
    RefundResponse, RefundStatus, ResponseStatus, ShopBalance, ShopInfoResponse, StatusObj,
};
