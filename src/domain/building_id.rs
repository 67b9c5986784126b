const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Derive a building id from its WKT geometry text.
///
/// The FNV-1a hash of the UTF-8 bytes is reinterpreted as `i64` and folded into
/// the positive range, so the same geometry text always maps to the same id.
/// Distinct geometries may collide; the store reports that as a duplicate id.
pub fn generate_building_id(wkt: &str) -> i64 {
    let id = fnv1a64(wkt.as_bytes()) as i64;

    // i64::MIN has no positive counterpart
    let id = if id < 0 {
        id.checked_neg().unwrap_or(i64::MAX)
    } else {
        id
    };

    if id == 0 {
        1
    } else {
        id
    }
}
