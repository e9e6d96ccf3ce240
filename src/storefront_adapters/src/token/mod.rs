pub mod jwt_token_decoder;

pub use jwt_token_decoder::JwtTokenDecoder;
