mod merchant_validator;
mod notification_parser;

pub use merchant_validator::MerchantIdentity;
pub use notification_parser::parse_status_url;
