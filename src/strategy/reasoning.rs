//! Reasoning - human-readable signal reports
//!
//! Turns a pattern list into the one-line summaries shown to users, plus the
//! follow-up reminders and price-action change notices for an open setup.

use crate::types::{Pattern, PatternKind};

/// Reminders sent per setup before going quiet
pub const MAX_REMINDERS: u32 = 2;

const STABLE_REPORT: &str = "Stable market conditions. Trend following setup.";

/// Summary of the confluence (or the first POI setup) and PD zone.
pub fn initial_report(patterns: &[Pattern]) -> String {
    if patterns.is_empty() {
        return STABLE_REPORT.to_string();
    }

    let confluence = patterns
        .iter()
        .find(|p| matches!(p.kind, PatternKind::Confluence { .. }));
    let pd_zone = patterns.iter().find_map(|p| match p.kind {
        PatternKind::PremiumDiscountZone { zone, .. } => Some(zone),
        _ => None,
    });

    let mut parts = Vec::new();

    if let Some(c) = confluence {
        parts.push(format!("HIGH CONFLUENCE ({:.1}): {}", c.strength, c.context));
    }

    if let Some(zone) = pd_zone {
        parts.push(format!("Price in {} Zone", zone));
    }

    if confluence.is_none() {
        if let Some(p) = patterns.iter().find(|p| p.is_poi()) {
            parts.push(format!(
                "SETUP: {} {} detected ({})",
                p.direction, p.kind, p.context
            ));
        }
    }

    parts.join(" | ")
}

/// Follow-up for an unexecuted setup; `None` past the second reminder.
pub fn reminder(count: u32, symbol: &str) -> Option<String> {
    match count {
        1 => Some(format!(
            "REMINDER 1: {} setup still active. No execution detected.",
            symbol
        )),
        2 => Some(format!(
            "FINAL REMINDER: {} entry window closing. Standing by.",
            symbol
        )),
        _ => None,
    }
}

/// Notice when a fresh analysis reads differently from `previous_report`.
///
/// Structural events take priority over a generic update.
pub fn price_action_change(previous_report: &str, new_patterns: &[Pattern]) -> Option<String> {
    if new_patterns.is_empty() {
        return None;
    }

    let report = initial_report(new_patterns);
    if report == previous_report {
        return None;
    }

    if let Some(p) = new_patterns.iter().find(|p| p.is_structural()) {
        return Some(format!(
            "STRUCTURAL SHIFT: {} {} detected. Context: {}",
            p.direction, p.kind, p.context
        ));
    }

    Some(format!("PA UPDATE: {}", report))
}
