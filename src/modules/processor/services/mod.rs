pub mod processor;

pub use processor::PayuProcessor;
