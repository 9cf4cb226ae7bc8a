pub mod callbacks;
pub mod gateway;
pub mod processor;
