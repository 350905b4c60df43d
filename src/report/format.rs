//! Cell text for model attributes.

use crate::catalog::TOKENS_PER_MILLION;

/// Placeholder for values the catalog does not publish.
pub const NOT_AVAILABLE: &str = "N/A";

pub const CHECK: &str = "✓";
pub const CROSS: &str = "×";

/// Token counts with a `k`/`M` suffix, e.g. `128k`, `1.049M`.
pub fn format_tokens(tokens: Option<u64>) -> String {
    let Some(tokens) = tokens else {
        return NOT_AVAILABLE.to_string();
    };
    if tokens >= 1_000_000 {
        format!("{}M", group_thousands(tokens as f64 / 1_000_000.0))
    } else if tokens >= 1_000 {
        format!("{}k", group_thousands(tokens as f64 / 1_000.0))
    } else {
        group_thousands(tokens as f64)
    }
}

/// Per-token cost shown per million tokens: two decimals from $1, three below.
pub fn format_cost(cost_per_token: Option<f64>) -> String {
    let Some(cost) = cost_per_token else {
        return NOT_AVAILABLE.to_string();
    };
    if cost == 0.0 {
        return "$0.00".to_string();
    }
    let per_million = cost * TOKENS_PER_MILLION;
    if per_million >= 1.0 {
        format!("${per_million:.2}")
    } else {
        format!("${per_million:.3}")
    }
}

/// One glyph per modality: `T`, `I`, `A`, `V`, `P`, otherwise the first letter.
pub fn format_modalities(modalities: &[String]) -> String {
    if modalities.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    modalities
        .iter()
        .filter_map(|m| modality_glyph(m))
        .collect()
}

fn modality_glyph(modality: &str) -> Option<char> {
    let glyph = match modality.to_lowercase().as_str() {
        "text" => 'T',
        "image" => 'I',
        "audio" => 'A',
        "video" => 'V',
        "pdf" => 'P',
        other => other.chars().next()?.to_ascii_uppercase(),
    };
    Some(glyph)
}

pub fn format_flag(flag: Option<bool>) -> String {
    match flag {
        Some(true) => CHECK.to_string(),
        _ => CROSS.to_string(),
    }
}

pub fn format_text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Up to three decimals, trailing zeros dropped, with `,` thousands separators.
fn group_thousands(value: f64) -> String {
    let rounded = format!("{value:.3}");
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let digits = int_part.len();
    let mut grouped = String::with_capacity(digits + digits / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if frac_part.is_empty() {
        grouped
    } else {
        format!("{grouped}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, "N/A")]
    #[case(Some(0), "0")]
    #[case(Some(512), "512")]
    #[case(Some(8_192), "8.192k")]
    #[case(Some(128_000), "128k")]
    #[case(Some(200_000), "200k")]
    #[case(Some(1_000_000), "1M")]
    #[case(Some(1_048_576), "1.049M")]
    #[case(Some(2_000_000_000), "2,000M")]
    fn test_format_tokens(#[case] tokens: Option<u64>, #[case] expected: &str) {
        assert_eq!(format_tokens(tokens), expected);
    }

    #[rstest]
    #[case(None, "N/A")]
    #[case(Some(0.0), "$0.00")]
    #[case(Some(0.00003), "$30.00")]
    #[case(Some(0.0000025), "$2.50")]
    #[case(Some(0.0000005), "$0.500")]
    #[case(Some(0.00000015), "$0.150")]
    fn test_format_cost(#[case] cost: Option<f64>, #[case] expected: &str) {
        assert_eq!(format_cost(cost), expected);
    }

    #[test]
    fn test_format_modalities() {
        let modalities: Vec<String> = ["text", "image", "Audio", "video", "pdf", "embedding"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(format_modalities(&modalities), "TIAVPE");
        assert_eq!(format_modalities(&[]), "N/A");
    }

    #[test]
    fn test_format_flag_and_text() {
        assert_eq!(format_flag(Some(true)), "✓");
        assert_eq!(format_flag(Some(false)), "×");
        assert_eq!(format_flag(None), "×");
        assert_eq!(format_text(Some(" 2024-04 ")), "2024-04");
        assert_eq!(format_text(Some("")), "N/A");
        assert_eq!(format_text(None), "N/A");
    }
}
