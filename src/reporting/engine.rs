// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::reporting::mappings::RecommendationMapper;
use crate::reporting::types::{Recommendation, SummaryReport};
use crate::types::Finding;
use std::collections::BTreeMap;

/// Build the remediation summary for a finished run.
///
/// Recommendations follow finding order and are not deduplicated; resources
/// hold one key per distinct recommendation id. Findings without a mapped
/// recommendation only count towards `total_findings`.
pub fn generate_summary_report(findings: &[Finding]) -> SummaryReport {
    let mut recommendations = Vec::new();
    let mut resources: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for finding in findings {
        let Some(entry) = RecommendationMapper::recommendation_for(&finding.finding_type) else {
            continue;
        };

        recommendations.push(Recommendation {
            id: entry.id.to_string(),
            text: entry.text.to_string(),
            priority: entry.priority,
        });

        resources.entry(entry.id.to_string()).or_insert_with(|| {
            RecommendationMapper::resources_for(entry.id)
                .iter()
                .map(|link| link.to_string())
                .collect()
        });
    }

    SummaryReport {
        recommendations,
        resources,
        total_findings: findings.len(),
    }
}

/// Markdown rendering of a summary, used by the CLI's text output
pub fn render_markdown(report: &SummaryReport) -> String {
    let mut out = String::new();
    out.push_str("# Audit Summary\n\n");
    out.push_str(&format!("Total findings: {}\n\n", report.total_findings));

    if report.recommendations.is_empty() {
        out.push_str("No recommendations.\n");
        return out;
    }

    let mut seen = std::collections::HashSet::new();
    let mut ordered: Vec<&Recommendation> = report
        .recommendations
        .iter()
        .filter(|rec| seen.insert(rec.id.as_str()))
        .collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

    out.push_str("## Recommendations\n\n");
    for rec in ordered {
        out.push_str(&format!("- **{}** ({:?}): {}\n", rec.id, rec.priority, rec.text));
        if let Some(links) = report.resources.get(&rec.id) {
            for link in links {
                out.push_str(&format!("  - {}\n", link));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Confidence, FindingType, Severity};

    fn finding(finding_type: FindingType) -> Finding {
        Finding {
            finding_type,
            url: "https://example.com".to_string(),
            detail: "d".to_string(),
            confidence: Confidence::Medium,
            severity: Severity::Medium,
            discovered_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_empty_report() {
        let report = generate_summary_report(&[]);
        assert!(report.recommendations.is_empty());
        assert!(report.resources.is_empty());
        assert_eq!(report.total_findings, 0);
    }

    #[test]
    fn test_unknown_type_counts_without_recommendation() {
        let report = generate_summary_report(&[finding(FindingType::Other("mystery".into()))]);
        assert_eq!(report.total_findings, 1);
        assert!(report.recommendations.is_empty());
        assert!(report.resources.is_empty());
    }

    #[test]
    fn test_recommendations_repeat_and_resources_are_unique() {
        let findings = vec![
            finding(FindingType::InsecureCookie),
            finding(FindingType::InsecureCookie),
            finding(FindingType::InsecureTransport),
        ];
        let report = generate_summary_report(&findings);

        let ids: Vec<&str> = report.recommendations.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["COOKIE_FLAGS", "COOKIE_FLAGS", "HTTPS_ENFORCEMENT"]);
        assert_eq!(
            report.resources.keys().collect::<Vec<_>>(),
            vec!["COOKIE_FLAGS", "HTTPS_ENFORCEMENT"]
        );
        assert_eq!(report.total_findings, 3);
    }

    #[test]
    fn test_markdown_lists_each_recommendation_once() {
        let findings = vec![
            finding(FindingType::InsecureCookie),
            finding(FindingType::InsecureCookie),
        ];
        let markdown = render_markdown(&generate_summary_report(&findings));
        assert_eq!(markdown.matches("**COOKIE_FLAGS**").count(), 1);
        assert!(markdown.contains("Total findings: 2"));
    }
}
