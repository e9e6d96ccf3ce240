pub mod token_decoder;
