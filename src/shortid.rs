use rand::Rng;

use crate::checksum::crc8;

const ALPHABET: &[u8] = b"123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";
const BASE: u16 = ALPHABET.len() as u16;

pub const DEFAULT_SHORT_ID_SIZE: usize = 7;
pub const MIN_SHORT_ID_SIZE: usize = 3;

/// Generates a random, non-reversible display id of `size` characters.
///
/// `None` (or zero) gives [`DEFAULT_SHORT_ID_SIZE`]; smaller sizes are raised to
/// [`MIN_SHORT_ID_SIZE`].
/// The last two characters are a check suffix over the random part.
///
/// # Examples
///
/// ```
/// assert_eq!(b58id::generate(None).len(), 7);
/// assert_eq!(b58id::generate(Some(2)).len(), 3);
/// assert_eq!(b58id::generate(Some(12)).len(), 12);
/// ```
pub fn generate(size: Option<usize>) -> String {
    generate_with_rng(size, &mut rand::thread_rng())
}

/// Like [`generate`], drawing from `rng`.
pub fn generate_with_rng<R: Rng + ?Sized>(size: Option<usize>, rng: &mut R) -> String {
    let size = match size {
        None | Some(0) => DEFAULT_SHORT_ID_SIZE,
        Some(size) => size.max(MIN_SHORT_ID_SIZE),
    };

    let mut text: String = (0..size - 2)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    text.push_str(&check_suffix(&text));
    text
}

/// Tells whether `text` ends with the check suffix of its random part.
pub fn is_well_formed_short_id(text: &str) -> bool {
    if text.len() < MIN_SHORT_ID_SIZE || !text.is_ascii() {
        return false;
    }
    let (random, suffix) = text.split_at(text.len() - 2);
    random.bytes().all(|b| ALPHABET.contains(&b)) && check_suffix(random) == suffix
}

// The seed lies in 58..=313, which is always two base58 digits.
fn check_suffix(random: &str) -> String {
    let seed = u16::from(crc8(random.as_bytes())) + BASE;
    let bytes = seed.to_be_bytes();
    let significant = if bytes[0] == 0 { &bytes[1..] } else { &bytes[..] };
    bs58::encode(significant).into_string()
}
