//! Small shared helpers: timestamps, guids, random codes

/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// New random GUID string (UUID v4).
pub fn new_guid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Random `[A-Z0-9]` code of the given length.
///
/// Used for order codes (configurable length, default 8) and gift
/// voucher codes (13 characters).
pub fn random_code(length: usize) -> String {
    use rand::Rng;
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
