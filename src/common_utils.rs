use chrono::Utc;

/// Get current timestamp in milliseconds (UTC)
pub fn get_current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// File extension of an uploaded file name, `default` when it has none
pub fn file_extension<'a>(file_name: &'a str, default: &'a str) -> &'a str {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => ext,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("passport.png", "jpg"), "png");
        assert_eq!(file_extension("scan.final.jpeg", "jpg"), "jpeg");
        assert_eq!(file_extension("noext", "jpg"), "jpg");
        assert_eq!(file_extension("trailing.", "unknown"), "unknown");
    }

    #[test]
    fn test_timestamp_is_positive() {
        assert!(get_current_timestamp_ms() > 0);
    }
}
