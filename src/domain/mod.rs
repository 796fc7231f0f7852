pub mod data_type;
pub mod encoded_point;

pub use data_type::DataType;
pub use encoded_point::EncodedPoint;
