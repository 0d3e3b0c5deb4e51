use rand::RngCore;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
pub const ATTACHMENT_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "jpeg", "txt", "doc", "docx", "xls", "xlsx", "csv", "odt", "ods",
];

const TIMESTAMP: &[FormatItem<'static>] =
    format_description!("[year][month][day][hour][minute][second]");

pub fn extension_of(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

pub fn is_allowed(filename: &str, allowed: &[&str]) -> bool {
    extension_of(filename).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Strip anything that could escape the uploads directory or confuse a
/// filesystem: path separators, parent references, control characters.
pub fn sanitize_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}

/// Stored name: timestamp + random suffix + sanitized original name, so two
/// uploads of the same file never collide.
pub fn stored_name(original: &str) -> String {
    let timestamp = OffsetDateTime::now_utc()
        .format(TIMESTAMP)
        .unwrap_or_else(|_| "00000000000000".into());
    let mut suffix = [0u8; 4];
    rand::rngs::OsRng.fill_bytes(&mut suffix);
    format!(
        "{}_{}_{}",
        timestamp,
        hex(&suffix),
        sanitize_filename(original)
    )
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
