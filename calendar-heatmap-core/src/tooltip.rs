//! Tooltip overlay.
//!
//! One reusable overlay whose content is rebuilt on every hover. Content is
//! kept as structured lines and rendered to HTML only when the heatmap is
//! serialised.

use crate::animation::TooltipOpacity;
use crate::format::{
    format_long_date, format_long_datetime, format_time, format_time_breakdown, format_tracked,
};
use crate::types::{AggregateNode, CategorySummary, DayRecord, DetailEntry};

/// Categories listed by name before the rest fold into "Other".
pub const TOP_CATEGORIES: usize = 5;

/// Step used when nudging the tooltip back inside the viewport.
const NUDGE_STEP: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TooltipLine {
    /// Bold heading line
    Header(String),
    /// Plain line
    Text(String),
    /// Bold label followed by a value
    Row { label: String, value: String },
    /// Vertical gap
    Break,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    pub lines: Vec<TooltipLine>,
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
}

impl TooltipOpacity for Tooltip {
    fn opacity(&self) -> f64 {
        self.opacity
    }

    fn set_opacity(&mut self, value: f64) {
        self.opacity = value;
    }
}

impl Tooltip {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0 && !self.lines.is_empty()
    }

    /// Replace the content and move the overlay.
    pub fn show(&mut self, lines: Vec<TooltipLine>, x: f64, y: f64) {
        self.lines = lines;
        self.x = x;
        self.y = y;
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .filter_map(|line| match line {
                TooltipLine::Header(s) | TooltipLine::Text(s) => Some(s.clone()),
                TooltipLine::Row { label, value } if label.is_empty() => Some(value.clone()),
                TooltipLine::Row { label, value } => Some(format!("{} {}", label, value)),
                TooltipLine::Break => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for line in &self.lines {
            match line {
                TooltipLine::Header(s) => {
                    html.push_str(&format!(
                        "<div class=\"header\"><strong>{}</strong></div>",
                        escape(s)
                    ));
                }
                TooltipLine::Text(s) => html.push_str(&format!("<div>{}</div>", escape(s))),
                TooltipLine::Row { label, value } => {
                    let label = if label.is_empty() {
                        String::new()
                    } else {
                        format!("<strong>{}</strong>", escape(label))
                    };
                    html.push_str(&format!(
                        "<div><span>{}</span><span>{}</span></div>",
                        label,
                        escape(value)
                    ));
                }
                TooltipLine::Break => html.push_str("<br>"),
            }
        }
        html
    }
}

/// Minimal HTML text escaping.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The first `limit` categories; anything beyond folds into one "Other" entry
/// holding the sum of the remainder.
pub fn top_categories(summary: &[CategorySummary], limit: usize) -> Vec<CategorySummary> {
    if summary.len() <= limit {
        return summary.to_vec();
    }
    let mut top = summary[..limit].to_vec();
    let rest = summary[limit..]
        .iter()
        .fold(0, |sum, c| u64::saturating_add(sum, c.value));
    top.push(CategorySummary::new("Other", rest));
    top
}

/// Move `x` left in fixed steps until a tooltip needing `needed` pixels fits
/// inside `width`.
pub fn nudge_left(mut x: f64, width: f64, needed: f64) -> f64 {
    if width - x >= needed {
        return x;
    }
    let steps = ((needed - (width - x)) / NUDGE_STEP).ceil();
    x -= steps * NUDGE_STEP;
    x
}

/// Year block on the global overview: breakdown of the total and top categories.
pub fn period_lines(node: &AggregateNode) -> Vec<TooltipLine> {
    let mut lines = Vec::new();
    let breakdown = format_time_breakdown(node.total);
    let mut parts = breakdown.into_iter();
    lines.push(TooltipLine::Row {
        label: "Total time tracked:".to_string(),
        value: parts.next().unwrap_or_default(),
    });
    for part in parts {
        lines.push(TooltipLine::Row {
            label: String::new(),
            value: part,
        });
    }
    lines.push(TooltipLine::Break);

    let top = top_categories(&node.summary, TOP_CATEGORIES);
    let folded = node.summary.len() > TOP_CATEGORIES;
    for (i, category) in top.iter().enumerate() {
        if folded && i == TOP_CATEGORIES {
            lines.push(TooltipLine::Break);
            lines.push(TooltipLine::Row {
                label: "Other:".to_string(),
                value: format_time(category.value),
            });
        } else {
            lines.push(TooltipLine::Row {
                label: category.name.clone(),
                value: format_time(category.value),
            });
        }
    }
    lines
}

/// Day cell on the year overview: total, date and every category.
pub fn day_lines(record: &DayRecord, summary: &[CategorySummary]) -> Vec<TooltipLine> {
    let mut lines = vec![
        TooltipLine::Header(format!("{} tracked", format_tracked(record.total))),
        TooltipLine::Text(format!("on {}", format_long_date(record.date))),
        TooltipLine::Break,
    ];
    lines.extend(summary.iter().map(|c| TooltipLine::Row {
        label: c.name.clone(),
        value: format_time(c.value),
    }));
    lines
}

/// One category segment of a day block on the month/week overviews.
pub fn segment_lines(category: &CategorySummary, date: chrono::NaiveDate) -> Vec<TooltipLine> {
    vec![
        TooltipLine::Header(category.name.clone()),
        TooltipLine::Break,
        TooltipLine::Text(format!("{} tracked", format_tracked(category.value))),
        TooltipLine::Text(format!("on {}", format_long_date(date))),
    ]
}

/// One tracked interval on the day overview.
pub fn detail_lines(detail: &DetailEntry) -> Vec<TooltipLine> {
    vec![
        TooltipLine::Header(detail.name.clone()),
        TooltipLine::Break,
        TooltipLine::Text(format!("{} tracked", format_tracked(detail.value))),
        TooltipLine::Text(format!("on {}", format_long_datetime(detail.date))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn summary(values: &[u64]) -> Vec<CategorySummary> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| CategorySummary::new(format!("c{}", i), *v))
            .collect()
    }

    #[test]
    fn test_top_categories_short_list_unchanged() {
        let s = summary(&[50, 40, 30, 20, 10]);
        assert_eq!(top_categories(&s, TOP_CATEGORIES), s);
        assert!(top_categories(&[], TOP_CATEGORIES).is_empty());
    }

    #[test]
    fn test_top_categories_folds_remainder() {
        let s = summary(&[70, 60, 50, 40, 30, 20, 10, 5]);
        let top = top_categories(&s, TOP_CATEGORIES);
        assert_eq!(top.len(), 6);
        assert_eq!(top[..5], s[..5]);
        assert_eq!(top[5], CategorySummary::new("Other", 35));
    }

    #[test]
    fn test_nudge_left() {
        assert_eq!(nudge_left(100.0, 1000.0, 325.0), 100.0);
        // 1000 - 700 = 300 < 325: needs 25 more, i.e. three steps
        assert_eq!(nudge_left(700.0, 1000.0, 325.0), 670.0);
        let x = nudge_left(995.0, 1000.0, 325.0);
        assert!(1000.0 - x >= 325.0);
        assert!(1000.0 - x < 335.0);
    }

    #[test]
    fn test_period_lines() {
        let node = AggregateNode {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            total: 86_400 + 3_600,
            summary: summary(&[60_000, 20_000, 5_000, 3_000, 1_000, 600, 400]),
        };
        let lines = period_lines(&node);
        assert_eq!(
            lines[0],
            TooltipLine::Row {
                label: "Total time tracked:".into(),
                value: "1 day".into()
            }
        );
        assert_eq!(
            lines[1],
            TooltipLine::Row {
                label: String::new(),
                value: "1 hour".into()
            }
        );
        assert_eq!(
            lines.last(),
            Some(&TooltipLine::Row {
                label: "Other:".into(),
                value: "16 minutes".into()
            })
        );
    }

    #[test]
    fn test_html_is_escaped() {
        let mut tooltip = Tooltip::default();
        tooltip.show(vec![TooltipLine::Header("<b>&".into())], 0.0, 0.0);
        assert_eq!(
            tooltip.to_html(),
            "<div class=\"header\"><strong>&lt;b&gt;&amp;</strong></div>"
        );
        assert!(!tooltip.is_visible());
        tooltip.opacity = 1.0;
        assert!(tooltip.is_visible());
        assert_eq!(tooltip.text(), "<b>&");
    }
}
