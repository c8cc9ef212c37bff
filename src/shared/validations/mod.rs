/// Default page size for list endpoints.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;
/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Clamp raw pagination input: `page >= 1`, `1 <= limit <= 100`.
pub fn validate_pagination(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    (page, limit)
}

/// Trim optional free text, dropping it when blank.
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_becomes_none() {
        assert_eq!(normalize_optional_text(Some("   ".into())), None);
        assert_eq!(
            normalize_optional_text(Some(" gate code 42 ".into())),
            Some("gate code 42".to_string())
        );
        assert_eq!(normalize_optional_text(None), None);
    }
}
