pub mod claims;
pub mod errors;
pub mod maker;

pub use claims::TokenPayload;
pub use errors::JwtError;
pub use maker::JwtMaker;
pub use maker::MIN_SECRET_LENGTH;
