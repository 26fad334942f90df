//! Postgres column length normalization.
//!
//! Fixed-width types report their byte width in `attlen`. Variable-width
//! types report `-1` there and encode their declared size in `atttypmod`,
//! with a 4-byte header offset for the character and numeric types.

const VARHDRSZ: i64 = 4;

/// Derives the documented length of a column.
///
/// | type                 | length                         |
/// |----------------------|--------------------------------|
/// | fixed width          | `attlen`                       |
/// | `varchar`, `bpchar`  | `atttypmod - 4`                |
/// | `numeric`            | `"precision.scale"`            |
/// | other variable width | raw `atttypmod`                |
/// | no declared modifier | `None`                         |
pub fn column_length(type_name: &str, attlen: i64, typmod: i64) -> Option<String> {
    if attlen > 0 {
        return Some(attlen.to_string());
    }

    if typmod < 0 {
        return None;
    }

    let length = match type_name {
        "varchar" | "bpchar" => (typmod - VARHDRSZ).to_string(),
        "numeric" => {
            let packed = typmod - VARHDRSZ;
            format!("{}.{}", (packed >> 16) & 0xffff, packed & 0xffff)
        }
        _ => typmod.to_string(),
    };

    Some(length)
}
