//! Raw byte encoding for stored embeddings

use bytes::{Buf, BufMut};

use crate::domain::DomainError;

const F32_WIDTH: usize = std::mem::size_of::<f32>();

/// Encode a vector as packed little-endian f32 values
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(vector.len() * F32_WIDTH);

    for value in vector {
        buf.put_f32_le(*value);
    }

    buf
}

/// Decode packed little-endian f32 values
pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>, DomainError> {
    if bytes.len() % F32_WIDTH != 0 {
        return Err(DomainError::storage(format!(
            "Stored embedding has {} bytes, not a multiple of {}",
            bytes.len(),
            F32_WIDTH
        )));
    }

    let mut cursor = bytes;
    let mut vector = Vec::with_capacity(bytes.len() / F32_WIDTH);

    while cursor.has_remaining() {
        vector.push(cursor.get_f32_le());
    }

    Ok(vector)
}
