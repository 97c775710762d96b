//! Terminal rendering of a pipeline report.

use std::fmt::Write as _;

use disability_map_aggregate_models::Aggregation;
use disability_map_dataset_models::Provenance;

/// Formats a head count as whole people with thousands separators, e.g.
/// `12,345 Jiwa`. Fractions are truncated.
#[must_use]
pub fn format_people(value: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = value.max(0.0).trunc() as u64;
    format!("{} Jiwa", group_thousands(whole))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Whether a status line reports normal operation or a degraded mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Success,
    Warning,
}

/// Returns the status line shown above every successful run.
///
/// Cached data is always flagged so stale numbers are never presented as
/// live.
#[must_use]
pub fn status_line(provenance: Provenance, fallback_reason: Option<&str>) -> (StatusLevel, String) {
    match provenance {
        Provenance::Remote => (
            StatusLevel::Success,
            "Sumber Data: API JabarProv (Live)".to_string(),
        ),
        Provenance::Cached => (
            StatusLevel::Warning,
            format!(
                "Mode: Siaga, memakai data lokal ({})",
                fallback_reason.unwrap_or("server tidak dapat dihubungi")
            ),
        ),
        Provenance::Absent => (StatusLevel::Warning, "Mode: Tanpa data".to_string()),
    }
}

/// Renders the KPI block, the top-region list, and the category list.
#[must_use]
pub fn render_summary(aggregation: &Aggregation) -> String {
    let kpi = &aggregation.kpi;
    let mut out = String::new();

    let _ = writeln!(out, "Peta Sebaran ({})", aggregation.period);
    let _ = writeln!(out, "{}", "-".repeat(50));
    let _ = writeln!(out, "{:<20} {}", "Total Data", format_people(kpi.total));
    let _ = writeln!(out, "{:<20} {}", "Wilayah Tertinggi", kpi.top_name);
    let _ = writeln!(
        out,
        "{:<20} {}",
        "Jumlah Tertinggi",
        format_people(kpi.top_value)
    );
    let _ = writeln!(
        out,
        "{:<20} {} dari {}",
        "Wilayah Cocok",
        aggregation.matched_count(),
        aggregation.regions.len()
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "Top {} Wilayah", aggregation.top_regions.len());
    let _ = writeln!(out, "{}", "-".repeat(50));
    for (rank, region) in aggregation.top_regions.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {:<32} {}",
            rank + 1,
            region.region,
            format_people(region.total)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Per Kategori");
    let _ = writeln!(out, "{}", "-".repeat(50));
    for category in &aggregation.categories {
        let _ = writeln!(
            out,
            "{:<36} {}",
            category.category,
            format_people(category.total)
        );
    }

    if !aggregation.unmatched_keys.is_empty() {
        let _ = writeln!(out);
        let keys: Vec<&str> = aggregation
            .unmatched_keys
            .iter()
            .map(AsRef::as_ref)
            .collect();
        let _ = writeln!(out, "Tidak ada di peta: {}", keys.join(", "));
    }

    out
}

#[cfg(test)]
mod tests {
    use disability_map_aggregate_models::{CategoryTotal, KpiSummary, RegionTotal};
    use disability_map_region::normalize;

    use super::*;

    #[test]
    fn people_are_grouped_by_thousands() {
        assert_eq!(format_people(0.0), "0 Jiwa");
        assert_eq!(format_people(999.0), "999 Jiwa");
        assert_eq!(format_people(12_345.0), "12,345 Jiwa");
        assert_eq!(format_people(1_234_567.9), "1,234,567 Jiwa");
    }

    #[test]
    fn cached_status_is_a_warning_with_reason() {
        let (level, text) = status_line(Provenance::Cached, Some("HTTP 403"));
        assert_eq!(level, StatusLevel::Warning);
        assert!(text.contains("HTTP 403"));
    }

    #[test]
    fn remote_status_is_success() {
        let (level, _) = status_line(Provenance::Remote, None);
        assert_eq!(level, StatusLevel::Success);
    }

    #[test]
    fn summary_lists_kpis_and_rankings() {
        let aggregation = Aggregation {
            period: 2023,
            regions: Vec::new(),
            kpi: KpiSummary {
                period: 2023,
                total: 15_000.0,
                top_name: "BANDUNG".to_string(),
                top_value: 9_000.0,
            },
            categories: vec![
                CategoryTotal {
                    category: "MENTAL".to_string(),
                    total: 1_000.0,
                },
                CategoryTotal {
                    category: "FISIK".to_string(),
                    total: 14_000.0,
                },
            ],
            top_regions: vec![RegionTotal {
                region: "KABUPATEN BANDUNG".to_string(),
                total: 9_000.0,
            }],
            unmatched_keys: vec![normalize("KOTA ANTAH")],
            collisions: Vec::new(),
        };

        let text = render_summary(&aggregation);

        assert!(text.contains("Peta Sebaran (2023)"));
        assert!(text.contains("15,000 Jiwa"));
        assert!(text.contains(" 1. KABUPATEN BANDUNG"));
        assert!(text.find("MENTAL").unwrap() < text.find("FISIK").unwrap());
        assert!(text.contains("Tidak ada di peta: ANTAH"));
    }
}
