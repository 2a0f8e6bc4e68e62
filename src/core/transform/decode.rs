//! Key decoding
//!
//! Extracts the entity's own kind and identifier from a key's flattened path.
//! Ancestor pairs in front of the final pair are discarded.

use crate::domain::key::{render_path, EntKey, IdOrName, Key};
use crate::domain::DecodeError;

/// Decode a key into its final (kind, identifier) pair
///
/// The pair is always read from the end of the flattened path, so keys with
/// any number of ancestor levels decode to the entity's own kind and id.
///
/// # Errors
///
/// - [`DecodeError::PathTooShort`] when the path holds fewer than two elements
/// - [`DecodeError::IncompleteKey`] when the path has odd length
/// - [`DecodeError::KindNotAName`] when the kind slot is an integer
///
/// # Examples
///
/// ```
/// use ferry::core::transform::decode::decode_key;
/// use ferry::domain::key::{IdOrName, Key};
///
/// let key = Key::new(["Customer".into(), "alice".into(), "Order".into(), 42.into()]);
/// let decoded = decode_key(&key).unwrap();
/// assert_eq!(decoded.kind, "Order");
/// assert_eq!(decoded.id_or_name, IdOrName::Id(42));
/// ```
pub fn decode_key(key: &Key) -> Result<EntKey, DecodeError> {
    decode_path(&key.path_elements)
}

/// Decode a raw flattened path
pub fn decode_path(path: &[IdOrName]) -> Result<EntKey, DecodeError> {
    let len = path.len();
    if len < 2 {
        return Err(DecodeError::PathTooShort {
            path: render_path(path),
        });
    }
    if len % 2 != 0 {
        return Err(DecodeError::IncompleteKey {
            path: render_path(path),
        });
    }

    let kind = path[len - 2]
        .as_name()
        .ok_or_else(|| DecodeError::KindNotAName {
            path: render_path(path),
        })?;

    Ok(EntKey::new(kind, path[len - 1].clone()))
}
