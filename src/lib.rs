pub mod ecc;
pub mod error;

pub use ecc::{
    bch_decoded_len, bch_decoded_size, bch_encoded_size, calculate_decoded_size,
    calculate_encoded_size, decode_bch, decode_hamming_array, encode_bch, encode_hamming_array,
    BchCode, CodecConfig, ErrorCorrection, HammingCode,
};
pub use error::{Error, Result};
