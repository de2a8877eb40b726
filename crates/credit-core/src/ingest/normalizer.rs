use csv::StringRecord;

/// Canonical form of a spreadsheet header: `" Monthly Salary "` becomes `monthly_salary`.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_lowercase()
}

pub(crate) fn normalize_headers(headers: &StringRecord) -> StringRecord {
    headers.iter().map(normalize_header).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_lose_bom_case_and_spacing() {
        assert_eq!(normalize_header("\u{feff}Customer ID"), "customer_id");
        assert_eq!(normalize_header("  Monthly   Salary "), "monthly_salary");
        assert_eq!(normalize_header("EMIs-paid on Time"), "emis_paid_on_time");
        assert_eq!(normalize_header("loan_id"), "loan_id");
    }
}
