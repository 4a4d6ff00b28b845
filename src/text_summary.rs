//! Text output for `--text` mode.
//!
//! Every card is printed fully expanded since there is nothing to click.

use crate::cards::{self, LaunchStatus};
use crate::feed::QueryController;
use time::OffsetDateTime;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

pub(crate) fn build_text_summary(query: &QueryController, now: OffsetDateTime) -> TextSummary {
    let mut lines = Vec::new();

    for record in query.records() {
        lines.push(format!(
            "{} [{}]",
            record.name,
            LaunchStatus::of(record).label()
        ));

        let when = cards::calculate_time(&record.date_local, now)
            .unwrap_or_else(|| format!("date unavailable ({})", record.date_local));
        match cards::links_text(record.links.as_ref()) {
            Some(links) => lines.push(format!("  {}{}{}", when, cards::LINK_SEPARATOR, links)),
            None => lines.push(format!("  {}", when)),
        }
        for item in cards::link_items(record.links.as_ref()) {
            lines.push(format!("  {}: {}", item.label, item.url));
        }
        lines.push(format!("  {}", cards::details_text(record)));
        lines.push(String::new());
    }

    if query.records().is_empty() && !query.search_text().trim().is_empty() {
        lines.push(format!(
            "No Flight Record Found for \"{}\"",
            query.search_text()
        ));
    } else if !query.records().is_empty() && !query.has_more() {
        lines.push("End of List.".to_string());
    }

    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LaunchRecord, Links};
    use time::macros::datetime;

    fn record() -> LaunchRecord {
        LaunchRecord {
            id: "1".into(),
            name: "CRS-20".into(),
            date_local: "2020-03-06T23:50:00-05:00".into(),
            upcoming: false,
            success: Some(true),
            details: Some("Last CRS-1 mission".into()),
            links: Some(Links {
                article: Some("https://a".into()),
                webcast: None,
                patch: None,
            }),
        }
    }

    #[test]
    fn cards_are_printed_expanded() {
        let mut q = QueryController::new("CRS");
        let t = q.next_fetch().unwrap();
        q.apply(&t, Ok(vec![record()]));

        let summary = build_text_summary(&q, datetime!(2020-03-08 04:50 UTC));
        assert_eq!(
            summary.lines,
            vec![
                "CRS-20 [Completed]",
                "  1 day(s) ago | Article",
                "  Article: https://a",
                "  Last CRS-1 mission",
                "",
            ]
        );
    }

    #[test]
    fn empty_search_result_message() {
        let mut q = QueryController::new("nothing");
        let t = q.next_fetch().unwrap();
        q.apply(&t, Ok(Vec::new()));
        let summary = build_text_summary(&q, datetime!(2020-01-01 00:00 UTC));
        assert_eq!(summary.lines, vec!["No Flight Record Found for \"nothing\""]);
    }
}
