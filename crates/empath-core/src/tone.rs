//! Static tone table: closed set of tones the Mood Agent may pick from.
//!
//! Each row carries the weights the Conductor uses to balance the three insights:
//!
//! | Weight   | Insight source      | Emphasis                 |
//! |----------|---------------------|--------------------------|
//! | `e_conf` | Emotional Agent     | empathy, validation      |
//! | `b_conf` | Behavioural Agent   | one concrete action      |
//! | `i_conf` | Intellectual Agent  | evidence-flavoured fact  |
//!
//! The three weights of a row sum to 1.0. This is checked by tests only; the table is
//! rendered into the classifier prompt and never queried at runtime beyond [`lookup`].

use serde::Serialize;

/// Label the Conductor treats specially: insights are ignored and a casual opener is returned.
pub const SMALL_TALK: &str = "small_talk";

/// One row of the tone table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToneEntry {
    pub label: &'static str,
    pub e_conf: f64,
    pub b_conf: f64,
    pub i_conf: f64,
    pub description: &'static str,
}

impl ToneEntry {
    const fn new(
        label: &'static str,
        e_conf: f64,
        b_conf: f64,
        i_conf: f64,
        description: &'static str,
    ) -> Self {
        Self {
            label,
            e_conf,
            b_conf,
            i_conf,
            description,
        }
    }

    pub fn confidence_sum(&self) -> f64 {
        self.e_conf + self.b_conf + self.i_conf
    }

    /// One line of the classifier's decision space.
    pub fn prompt_line(&self) -> String {
        format!(
            "- {}: e_conf={:.2}, b_conf={:.2}, i_conf={:.2} ({})",
            self.label, self.e_conf, self.b_conf, self.i_conf, self.description
        )
    }
}

pub const TONE_TABLE: &[ToneEntry] = &[
    ToneEntry::new(SMALL_TALK, 0.00, 0.00, 1.00, "Casual greeting or chit-chat with no emotional load"),
    ToneEntry::new("neutral_checkin", 0.30, 0.30, 0.40, "Calm, matter-of-fact update about their day"),
    ToneEntry::new("curious_question", 0.10, 0.20, 0.70, "Asking for information or an explanation"),
    ToneEntry::new("positive_excited", 0.20, 0.45, 0.35, "Thrilled about good news or an upcoming event"),
    ToneEntry::new("positive_grateful", 0.45, 0.20, 0.35, "Thankful, appreciative, reflecting on something good"),
    ToneEntry::new("proud_accomplished", 0.30, 0.45, 0.25, "Proud of a win or milestone they worked for"),
    ToneEntry::new("hopeful", 0.30, 0.40, 0.30, "Cautiously optimistic about what comes next"),
    ToneEntry::new("bored_restless", 0.15, 0.60, 0.25, "Under-stimulated, looking for something to do"),
    ToneEntry::new("tired_drained", 0.45, 0.40, 0.15, "Low energy, worn out, short on rest"),
    ToneEntry::new("stressed_overwhelmed", 0.50, 0.35, 0.15, "Too much on their plate, struggling to keep up"),
    ToneEntry::new("anxious_worried", 0.55, 0.30, 0.15, "Uneasy about an outcome they cannot control"),
    ToneEntry::new("nervous_anticipation", 0.45, 0.35, 0.20, "Jittery before an interview, exam or big moment"),
    ToneEntry::new("frustrated_annoyed", 0.50, 0.30, 0.20, "Irritated by a setback, person or situation"),
    ToneEntry::new("angry", 0.60, 0.25, 0.15, "Strong anger or resentment, needs to vent"),
    ToneEntry::new("sad_down", 0.60, 0.25, 0.15, "Low mood, disappointed, feeling blue"),
    ToneEntry::new("lonely_isolated", 0.65, 0.25, 0.10, "Feeling disconnected or left out"),
    ToneEntry::new("heartbroken", 0.70, 0.20, 0.10, "Hurt by a breakup or a broken relationship"),
    ToneEntry::new("grieving_loss", 0.80, 0.10, 0.10, "Mourning a death or a significant loss"),
    ToneEntry::new("guilty_ashamed", 0.65, 0.15, 0.20, "Blaming themselves for something they did"),
    ToneEntry::new("insecure_self_doubt", 0.55, 0.25, 0.20, "Questioning their worth or abilities"),
    ToneEntry::new("confused_uncertain", 0.25, 0.30, 0.45, "Unsure what is happening or what to think"),
    ToneEntry::new("indecisive_stuck", 0.20, 0.50, 0.30, "Torn between options, unable to move forward"),
    ToneEntry::new("burnout", 0.55, 0.35, 0.10, "Chronic exhaustion and detachment from work or study"),
    ToneEntry::new("panicked_acute_distress", 0.80, 0.15, 0.05, "Acute panic, racing thoughts, needs grounding now"),
    ToneEntry::new("hopeless_despair", 0.85, 0.10, 0.05, "Sees no way forward, deep despair"),
    ToneEntry::new("suicidal_ideation", 0.90, 0.05, 0.05, "Mentions wanting to die or not being around; crisis care first"),
];

/// Finds a tone row by its exact label.
pub fn lookup(label: &str) -> Option<&'static ToneEntry> {
    TONE_TABLE.iter().find(|entry| entry.label == label)
}

/// All tone labels in table order.
pub fn labels() -> Vec<&'static str> {
    TONE_TABLE.iter().map(|entry| entry.label).collect()
}

/// The table rendered as the classifier's enumerated decision space.
pub fn render_for_prompt() -> String {
    TONE_TABLE
        .iter()
        .map(ToneEntry::prompt_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_row_sums_to_one() {
        for entry in TONE_TABLE {
            assert!(
                (entry.confidence_sum() - 1.0).abs() < 1e-9,
                "{} sums to {}",
                entry.label,
                entry.confidence_sum()
            );
        }
    }

    #[test]
    fn every_weight_is_in_unit_range() {
        for entry in TONE_TABLE {
            for w in [entry.e_conf, entry.b_conf, entry.i_conf] {
                assert!((0.0..=1.0).contains(&w), "{} has weight {}", entry.label, w);
            }
        }
    }

    #[test]
    fn labels_are_unique() {
        let unique: HashSet<_> = labels().into_iter().collect();
        assert_eq!(unique.len(), TONE_TABLE.len());
        assert!(TONE_TABLE.len() >= 25);
    }

    #[test]
    fn table_spans_small_talk_to_crisis() {
        let small_talk = lookup(SMALL_TALK).unwrap();
        assert_eq!(small_talk.i_conf, 1.0);
        let crisis = lookup("suicidal_ideation").unwrap();
        assert_eq!((crisis.e_conf, crisis.b_conf, crisis.i_conf), (0.90, 0.05, 0.05));
        assert!(lookup("elated_but_unlisted").is_none());
    }

    #[test]
    fn prompt_rendering_uses_two_decimals() {
        let rendered = render_for_prompt();
        assert!(rendered.contains("- suicidal_ideation: e_conf=0.90, b_conf=0.05, i_conf=0.05"));
        assert_eq!(rendered.lines().count(), TONE_TABLE.len());
    }
}
