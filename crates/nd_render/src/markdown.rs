use std::collections::HashMap;

use chrono::NaiveDate;
use nd_core::{ArticleRecord, ERROR_LABEL, UNCLASSIFIED_LABEL, UNKNOWN_DATE};

use crate::locale::{Locale, CATEGORY_ORDER};

/// Reformats a `YYYY-MM-DD[ HH:MM:SS]` timestamp for display. Empty and `"N/A"`
/// give `"N/A"`; other text is returned unchanged.
pub fn format_published_date(raw: &str, locale: Locale) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw == UNKNOWN_DATE {
        return UNKNOWN_DATE.to_string();
    }
    let day = raw.split_whitespace().next().unwrap_or(raw);
    match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        Ok(date) => locale.format_date(date),
        Err(_) => raw.to_string(),
    }
}

fn primary_category(record: &ArticleRecord) -> &str {
    record
        .classification
        .as_ref()
        .and_then(|c| c.top_label())
        .unwrap_or(UNCLASSIFIED_LABEL)
}

fn front_matter(title: &str, date: NaiveDate) -> String {
    format!(
        "---\ntitle: \"{}\"\ndate: {}\n---\n",
        title.replace('"', "\\\""),
        date.format("%Y-%m-%d")
    )
}

/// Renders the publishable records as a Hugo markdown page, one section per
/// primary category. Categories outside the standard set follow the standard
/// ones in first-seen order.
pub fn render_newsletter(records: &[ArticleRecord], date: NaiveDate, locale: Locale) -> String {
    let mut by_category: HashMap<&str, Vec<&ArticleRecord>> = HashMap::new();
    let mut extra_categories = Vec::new();
    for record in records.iter().filter(|r| r.is_publishable()) {
        let category = primary_category(record);
        if category == ERROR_LABEL {
            continue;
        }
        if !CATEGORY_ORDER.iter().any(|c| *c == category) && !extra_categories.contains(&category) {
            extra_categories.push(category);
        }
        by_category.entry(category).or_default().push(record);
    }

    if by_category.is_empty() {
        let heading = format!("{} - {}", locale.newsletter_title(), locale.no_content());
        return format!(
            "{}\n# {}\n\n{}\n",
            front_matter(&heading, date),
            heading,
            locale.empty_body()
        );
    }

    let heading = format!("{} - {}", locale.newsletter_title(), locale.format_date(date));
    let mut lines = vec![front_matter(&heading, date), format!("# {}\n", heading)];

    let mut categories: Vec<&str> = CATEGORY_ORDER.to_vec();
    categories.extend(extra_categories);
    for category in categories {
        let Some(articles) = by_category.get(category) else {
            continue;
        };
        lines.push(format!("\n## {}\n", locale.category_title(category)));
        for record in articles {
            let summary = record
                .popular_summary
                .as_ref()
                .and_then(|s| s.as_summary())
                .unwrap_or_default();
            lines.push(format!("### [{}]({})", record.title, record.link));
            lines.push(format!(
                "**{}** {} | **{}** {}\n",
                locale.source_label(),
                record.source,
                locale.published_label(),
                format_published_date(&record.published_date, locale)
            ));
            lines.push(format!("{}\n", summary));
            lines.push(format!("[{}]({})", locale.read_original(), record.link));
            lines.push("\n---\n".to_string());
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nd_core::{Classification, SkipReason, SummaryOutcome};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn record(title: &str, label: Option<&str>, summary: SummaryOutcome) -> ArticleRecord {
        let mut record = ArticleRecord::new("MIT Technology Review", title, format!("https://x.com/{}", title))
            .with_published_date("2024-04-30 08:15:00");
        record.classification = label.map(|l| Classification::from_pairs(vec![(l.to_string(), 0.9)]));
        record.popular_summary = Some(summary);
        record
    }

    fn summary(text: &str) -> SummaryOutcome {
        SummaryOutcome::Summary(text.to_string())
    }

    #[test]
    fn test_format_published_date() {
        assert_eq!(format_published_date("2024-04-30 08:15:00", Locale::ZhTw), "2024年04月30日");
        assert_eq!(format_published_date("2024-04-30", Locale::En), "April 30, 2024");
        assert_eq!(format_published_date("N/A", Locale::En), "N/A");
        assert_eq!(format_published_date("", Locale::ZhTw), "N/A");
        assert_eq!(format_published_date("Apr 24", Locale::En), "Apr 24");
    }

    #[test]
    fn test_sections_follow_category_order_and_skip_unpublishable() {
        let records = vec![
            record("policy", Some("Ethics, Governance & Policy"), summary("Rules are coming.")),
            record("paper", Some("Research & Breakthroughs"), summary("A faster model.")),
            record("skipped", Some("Research & Breakthroughs"), SummaryOutcome::Skipped(SkipReason::LimitReached)),
            record("failed", Some("Research & Breakthroughs"), SummaryOutcome::Failed("timeout".to_string())),
            record("broken", Some(ERROR_LABEL), summary("Should not appear.")),
            record("loose", None, summary("No label yet.")),
        ];

        let markdown = render_newsletter(&records, date(), Locale::En);
        assert!(markdown.starts_with("---\ntitle: \"AI Science Digest - May 1, 2024\"\ndate: 2024-05-01\n---\n"));

        let research = markdown.find("## Research & Breakthroughs").unwrap();
        let ethics = markdown.find("## Ethics, Governance & Policy").unwrap();
        let unclassified = markdown.find("## Unclassified").unwrap();
        assert!(research < ethics && ethics < unclassified);

        assert!(markdown.contains("### [paper](https://x.com/paper)"));
        assert!(markdown.contains("**Source:** MIT Technology Review | **Published:** April 30, 2024"));
        assert!(markdown.contains("[Read the original](https://x.com/policy)"));
        for hidden in ["skipped", "failed", "broken", "Should not appear"] {
            assert!(!markdown.contains(hidden), "{} leaked into the newsletter", hidden);
        }
    }

    #[test]
    fn test_custom_categories_follow_standard_ones() {
        let records = vec![
            record("robots", Some("Robotics"), summary("Robots fold laundry.")),
            record("paper", Some("Research & Breakthroughs"), summary("A faster model.")),
        ];
        let markdown = render_newsletter(&records, date(), Locale::En);
        assert!(markdown.find("## Research & Breakthroughs").unwrap() < markdown.find("## Robotics").unwrap());
    }

    #[test]
    fn test_traditional_chinese_rendering() {
        let records = vec![record("paper", Some("Research & Breakthroughs"), summary("更快的模型。"))];
        let markdown = render_newsletter(&records, date(), Locale::ZhTw);
        assert!(markdown.contains("# AI 科普速遞 - 2024年05月01日"));
        assert!(markdown.contains("## 研究與突破"));
        assert!(markdown.contains("**來源：** MIT Technology Review | **原文發布日期：** 2024年04月30日"));
        assert!(markdown.contains("[閱讀原文](https://x.com/paper)"));
    }

    #[test]
    fn test_nothing_publishable_gives_placeholder() {
        let records = vec![record("skipped", None, SummaryOutcome::Skipped(SkipReason::MissingApiKey))];
        let markdown = render_newsletter(&records, date(), Locale::ZhTw);
        assert!(markdown.contains("# AI 科普速遞 - 無內容"));
        assert!(markdown.contains("今日未擷取或處理任何文章。"));
        assert!(!markdown.contains("##"));
    }

    #[test]
    fn test_summary_mentioning_error_marker_is_left_out() {
        let records = vec![
            record("clean", Some("Research & Breakthroughs"), summary("A tidy summary.")),
            record("tainted", Some("Research & Breakthroughs"), summary("Half a summary. Error: cut off")),
        ];
        let markdown = render_newsletter(&records, date(), Locale::En);
        assert!(markdown.contains("A tidy summary."));
        assert!(!markdown.contains("tainted"));
    }
}
