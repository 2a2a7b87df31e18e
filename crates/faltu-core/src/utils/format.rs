use chrono::NaiveDate;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a timestamp string to a more readable format
pub fn format_date(date: &str) -> String {
    // The backend sends both RFC 3339 and naive ISO timestamps
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y %H:%M").to_string()
    } else if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
        dt.format("%b %d, %Y %H:%M").to_string()
    } else if date.len() >= 10 {
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// File name for a downloaded analysis report:
/// `stock-analysis-<SYMBOL>-<YYYY-MM-DD>.md`
pub fn report_file_name(symbol: Option<&str>, date: NaiveDate) -> String {
    let symbol: String = symbol
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("report")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("stock-analysis-{}-{}.md", symbol, date.format("%Y-%m-%d"))
}

/// File name for an exported learning plan:
/// `learning_plan_<topic>_<assessment id>.pdf`
pub fn learning_plan_file_name(topic: Option<&str>, assessment_id: &str) -> String {
    let topic = topic
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join("_"))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "assessment".to_string());
    let safe = |s: &str| -> String {
        s.chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect()
    };
    format!("learning_plan_{}_{}.pdf", safe(&topic), safe(assessment_id))
}
