use alloy_primitives::Bytes;

use crate::constants::{RECOVERY_ID_OFFSET, SIGNATURE_LENGTH};
use crate::errors::ProtocolError;

/// Normalize an ECDSA signature to the `r || s || v` layout Safe expects for an owner
/// signature, with `v` in `{27, 28}`.
///
/// A `v` of 0 or 1 is shifted by 27. Any other value outside `{27, 28}` is rejected:
/// Safe gives `v` values 0, 1 and above 30 special meaning (contract signature,
/// approved hash, `eth_sign`), so passing one through would change how the signature
/// is checked.
pub fn normalize_signature(signature: &[u8]) -> Result<Bytes, ProtocolError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(ProtocolError::InvalidSignatureLength(signature.len()));
    }

    let mut normalized = [0u8; SIGNATURE_LENGTH];
    normalized.copy_from_slice(signature);

    let v = normalized[64];
    let v = if v < RECOVERY_ID_OFFSET { v + RECOVERY_ID_OFFSET } else { v };
    if v != RECOVERY_ID_OFFSET && v != RECOVERY_ID_OFFSET + 1 {
        return Err(ProtocolError::InvalidRecoveryId(v));
    }
    normalized[64] = v;

    Ok(Bytes::copy_from_slice(&normalized))
}
