use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::CopyTarget;
use crate::app::{App, ReviewLoad};
use crate::domain::types::{Issue, LinterIssue, ReviewResult};

use super::util::truncate;

const ISSUE_PREVIEW_WIDTH: usize = 80;

/// Where things land in the unwrapped results view, one line per row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsLayout {
    /// Row of each issue's header line, by issue index
    pub issue_rows: Vec<u16>,
    /// Total rows of content
    pub height: u16,
}

pub fn results_layout(app: &App) -> ResultsLayout {
    let (lines, issue_rows) = result_lines(app);
    ResultsLayout {
        issue_rows,
        height: lines.len() as u16,
    }
}

pub fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let (lines, _) = result_lines(app);
    let paragraph = Paragraph::new(lines).scroll((app.scroll_offset, 0));

    frame.render_widget(paragraph, area);
}

fn result_lines(app: &App) -> (Vec<Line<'static>>, Vec<u16>) {
    let mut issue_rows = Vec::new();
    let mut lines: Vec<Line<'static>> = vec![Line::from(Span::styled(
        "✅ Review complete",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ))];

    if let Some(notice) = &app.notice {
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Cyan),
        )));
    }
    lines.push(Line::from(""));

    match &app.review {
        None | Some(ReviewLoad::Loading) => lines.push(Line::from(Span::styled(
            "⏳ Loading review results...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))),
        Some(ReviewLoad::Failed(err)) => {
            lines.push(Line::from(Span::styled(
                format!("Error: {}", err),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled("r", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::styled(" to retry", Style::default().fg(Color::Gray)),
            ]));
        }
        Some(ReviewLoad::Loaded(review)) => {
            push_review(&mut lines, &mut issue_rows, app, review)
        }
    }

    (lines, issue_rows)
}

fn push_review(
    lines: &mut Vec<Line<'static>>,
    issue_rows: &mut Vec<u16>,
    app: &App,
    review: &ReviewResult,
) {
    if let Some(summary) = app.summary() {
        let mut spans = vec![
            label("Total Issues: "),
            value(summary.total_issues.to_string()),
            separator(),
            label("Files Affected: "),
            value(summary.files_affected.to_string()),
            separator(),
            label("Linter Findings: "),
            value(summary.linter_findings.to_string()),
        ];
        if let Some(score) = summary.quality_score {
            spans.push(separator());
            spans.push(label("Quality Score: "));
            spans.push(value(format!("{:.1}", score)));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    lines.push(heading("Issues"));
    if review.ai_log.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No issues found",
            Style::default().fg(Color::Green),
        )));
    }
    for (idx, issue) in review.ai_log.iter().enumerate() {
        issue_rows.push(lines.len() as u16);
        push_issue(lines, app, idx, issue);
    }

    if !review.linter_results.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading("Linter Results"));
        for (file, entries) in &review.linter_results {
            lines.push(Line::from(Span::styled(
                format!("  {}", file),
                Style::default().fg(Color::Cyan),
            )));
            if entries.is_empty() {
                lines.push(Line::from(Span::styled(
                    "    clean",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            for entry in entries {
                lines.push(linter_line(entry));
            }
        }
    }

    if let Some(comments) = review.pr_comments() {
        lines.push(Line::from(""));
        lines.push(heading("PR Comments"));
        for line in comments.lines() {
            lines.push(Line::from(Span::styled(
                format!("  {}", line),
                Style::default().fg(Color::White),
            )));
        }
    }

    if let Some(patch) = review.unified_patch() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                "Unified Patch  ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            copy_affordance(app, CopyTarget::Patch, "[p] Copy patch"),
        ]));
        push_diff(lines, patch, "  ");
    }
}

fn push_issue(lines: &mut Vec<Line<'static>>, app: &App, idx: usize, issue: &Issue) {
    let selected = idx == app.selected_issue;
    let expanded = app.is_expanded(idx);
    let marker = if expanded { "▼ " } else { "▶ " };
    let row_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    lines.push(Line::from(vec![
        Span::styled(if selected { "›" } else { " " }, row_style),
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::styled(format!("{}:{} ", issue.file, issue.line), Style::default().fg(Color::Cyan)),
        Span::styled(truncate(&issue.issue.message(), ISSUE_PREVIEW_WIDTH), row_style),
    ]));

    if !expanded {
        return;
    }

    if !issue.suggestion.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("    Suggestion: ", Style::default().fg(Color::Gray)),
            Span::styled(issue.suggestion.clone(), Style::default().fg(Color::White)),
        ]));
    }
    if !issue.current_code.is_empty() {
        lines.push(Line::from(Span::styled("    Current code:", Style::default().fg(Color::Gray))));
        for line in issue.current_code.lines() {
            lines.push(Line::from(Span::styled(
                format!("      {}", line),
                Style::default().fg(Color::Red),
            )));
        }
    }
    if !issue.recommended_code.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("    Recommended code:  ", Style::default().fg(Color::Gray)),
            copy_affordance(app, CopyTarget::Issue(idx), "[y] Copy"),
        ]));
        for line in issue.recommended_code.lines() {
            lines.push(Line::from(Span::styled(
                format!("      {}", line),
                Style::default().fg(Color::Green),
            )));
        }
    }
    if let Some(patch) = issue.patch.as_deref().filter(|p| !p.trim().is_empty()) {
        lines.push(Line::from(Span::styled("    Patch:", Style::default().fg(Color::Gray))));
        push_diff(lines, patch, "      ");
    }
}

fn push_diff(lines: &mut Vec<Line<'static>>, diff: &str, indent: &str) {
    for diff_line in diff.lines() {
        let style = if diff_line.starts_with("+++") || diff_line.starts_with("---") {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else if diff_line.starts_with('+') {
            Style::default().fg(Color::Green)
        } else if diff_line.starts_with('-') {
            Style::default().fg(Color::Red)
        } else if diff_line.starts_with("@@") {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(format!("{}{}", indent, diff_line), style)));
    }
}

fn linter_line(entry: &LinterIssue) -> Line<'static> {
    match entry {
        LinterIssue::Finding { line, col, message } => {
            let location = match (line, col) {
                (Some(l), Some(c)) => format!("{}:{} ", l, c),
                (Some(l), None) => format!("{} ", l),
                _ => String::new(),
            };
            Line::from(vec![
                Span::styled(format!("    {}", location), Style::default().fg(Color::DarkGray)),
                Span::styled(message.clone(), Style::default().fg(Color::White)),
            ])
        }
        LinterIssue::Error { error } => Line::from(Span::styled(
            format!("    {}", error),
            Style::default().fg(Color::Red),
        )),
        LinterIssue::Info { info } => Line::from(Span::styled(
            format!("    {}", info),
            Style::default().fg(Color::DarkGray),
        )),
        LinterIssue::Other(value) => Line::from(Span::styled(
            format!("    {}", value),
            Style::default().fg(Color::Gray),
        )),
    }
}

fn copy_affordance(app: &App, target: CopyTarget, idle: &'static str) -> Span<'static> {
    if app.is_copied(target) {
        Span::styled("Copied!", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled(idle, Style::default().fg(Color::Yellow))
    }
}

fn heading(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn label(text: &'static str) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::Gray))
}

fn value(text: String) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
}

fn separator() -> Span<'static> {
    Span::styled(" │ ", Style::default().fg(Color::DarkGray))
}
