//! Console rendering of tracker snapshots.

use ladder_core::{Entry, TrackerState, TrackerStatus, format_xp_rate};
use owo_colors::{OwoColorize, Style};

/// Text for a snapshot, or `None` when nothing new is worth printing
///
/// Re-searches after a previous outcome stay quiet so the console only
/// scrolls on outcomes.
pub fn render_state(
    state: &TrackerState,
    character: &str,
    xp_rate: Option<f64>,
    color: bool,
) -> Option<String> {
    match state.status {
        TrackerStatus::Idle => None,
        TrackerStatus::Searching if state.result.is_some() || state.not_found => None,
        TrackerStatus::Searching => Some(paint(
            &format!("Searching for '{}'...", character),
            Style::new().dimmed(),
            color,
        )),
        TrackerStatus::NotFound => Some(paint(
            &format!("'{}' is not on the ladder", character),
            Style::new().yellow(),
            color,
        )),
        TrackerStatus::Error => {
            let message = state.last_error.as_deref().unwrap_or("unknown error");
            Some(paint(&format!("Error: {}", message), Style::new().red(), color))
        }
        TrackerStatus::Found => {
            let result = state.result.as_ref()?;
            let mut lines = Vec::with_capacity(3);

            if let Some(before) = &result.before {
                lines.push(neighbor_line("above", before, &result.target, color));
            }

            let mut line = format!(
                "#{} {} ({} lvl {}) {} xp",
                result.target.rank,
                result.target.name,
                result.target.class,
                result.target.level,
                thousands(result.target.experience)
            );
            if let Some(rate) = xp_rate {
                line.push_str(&format!("  {}", format_xp_rate(rate)));
            }
            lines.push(paint(&line, Style::new().green().bold(), color));

            if let Some(after) = &result.after {
                lines.push(neighbor_line("below", after, &result.target, color));
            }
            Some(lines.join("\n"))
        }
    }
}

fn neighbor_line(label: &str, neighbor: &Entry, target: &Entry, color: bool) -> String {
    let gap = neighbor.experience.abs_diff(target.experience);
    paint(
        &format!(
            "  {} #{} {} ({} xp apart)",
            label,
            neighbor.rank,
            neighbor.name,
            thousands(gap)
        ),
        Style::new().dimmed(),
        color,
    )
}

fn paint(text: &str, style: Style, color: bool) -> String {
    if color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Format `1234567` as `1,234,567`
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
