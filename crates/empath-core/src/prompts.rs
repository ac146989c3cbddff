//! Prompt templates for the support pipeline.
//!
//! Every template is a pure function from typed inputs to the prompt text sent to the
//! generation client. The first line of each prompt names its role so a prompt can be
//! traced back to the step that produced it (see [`PromptRole::detect`]).

use crate::tone::{self, SMALL_TALK};
use std::fmt;

/// Context rule handed to the Intellectual Agent outside 06:00–22:00.
pub const LATE_NIGHT_RULES: &str = "Late night: only recommend quiet, indoor activities.";
/// Context rule handed to the Intellectual Agent during the day.
pub const NO_TIME_RULES: &str = "No special time restrictions.";

/// Insights whose weight exceeds this are woven into the Conductor reply.
pub const SECONDARY_INSIGHT_THRESHOLD: f64 = 0.40;

const EMPTY_HISTORY: &str = "(no earlier messages)";

/// Time-of-day rule for the Intellectual Agent, from the local hour (0–23).
pub fn context_rules(hour: u32) -> &'static str {
    if hour < 6 || hour >= 22 {
        LATE_NIGHT_RULES
    } else {
        NO_TIME_RULES
    }
}

/// The three role agents whose output is reflected and merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Emotion,
    Behaviour,
    Intelligence,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [AgentKind::Emotion, AgentKind::Behaviour, AgentKind::Intelligence];

    /// Name the Reflection module uses for this agent.
    pub fn reflection_name(self) -> &'static str {
        match self {
            AgentKind::Emotion => "Emotional",
            AgentKind::Behaviour => "Behavioural",
            AgentKind::Intelligence => "Intellectual",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentKind::Emotion => "emotion",
            AgentKind::Behaviour => "behaviour",
            AgentKind::Intelligence => "intelligence",
        };
        f.write_str(s)
    }
}

/// Which template a prompt was rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    Mood,
    Agent(AgentKind),
    Reflection(AgentKind),
    Conductor,
}

impl PromptRole {
    /// Identifies the template from the prompt's header line.
    pub fn detect(prompt: &str) -> Option<Self> {
        let header = prompt.trim_start().lines().next()?;
        if header.starts_with("System: You are the Mood Agent") {
            return Some(PromptRole::Mood);
        }
        if header.starts_with("System: You are the Conductor Agent") {
            return Some(PromptRole::Conductor);
        }
        if let Some(rest) = header.strip_prefix("System: You are the Reflection module for the ") {
            return AgentKind::ALL
                .into_iter()
                .find(|kind| rest.starts_with(kind.reflection_name()))
                .map(PromptRole::Reflection);
        }
        AgentKind::ALL
            .into_iter()
            .find(|kind| header.starts_with(&format!("System: You are the {} Agent", kind.reflection_name())))
            .map(PromptRole::Agent)
    }
}

impl fmt::Display for PromptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptRole::Mood => f.write_str("mood"),
            PromptRole::Agent(kind) => write!(f, "{kind} agent"),
            PromptRole::Reflection(kind) => write!(f, "{kind} reflection"),
            PromptRole::Conductor => f.write_str("conductor"),
        }
    }
}

fn history_block(history: &str) -> &str {
    if history.trim().is_empty() {
        EMPTY_HISTORY
    } else {
        history
    }
}

/// Mood Agent: picks exactly one tone row and returns it as JSON.
pub fn mood_prompt(history: &str, user_input: &str) -> String {
    format!(
        r#"System: You are the Mood Agent in EmpathAI.
Conversation so far:
{history}

User's new message:
{user_input}

Known tones (label: weights (meaning)):
{tones}

Task:
1. Identify the user's predominant tone and choose exactly ONE label from the list above.
2. Copy that row's e_conf, b_conf and i_conf values; they sum to 1.0.
3. Write a one-sentence description of how the user seems to feel.
Output ONLY this JSON object, with no prose and no code fences:
{{"tone": "<label>", "description": "<description>", "e_conf": <float>, "b_conf": <float>, "i_conf": <float>}}
"#,
        history = history_block(history),
        user_input = user_input,
        tones = tone::render_for_prompt(),
    )
}

/// Emotional Agent: one warm sentence that names the feeling and asks a follow-up.
pub fn emotion_prompt(history: &str, user_input: &str) -> String {
    format!(
        r#"System: You are the Emotional Agent in EmpathAI. Your style is friendly, curious, and warm, like a supportive friend.
System: Don't just repeat what the user says; respond with genuine curiosity or brief encouragement.

Conversation so far:
{history}

User's new message:
{user_input}

Task: In one varied, human-like sentence, name and validate the user's feeling and then ask a simple follow-up question to learn more.
* Vary your openings: e.g. "That sounds exciting,", "I bet that feels...", "How wonderful that..."
* Avoid parroting ("You said it's raining"); share a relatable thought instead if you like.
* Keep it under 25 words.

Examples:
- "That's awesome, congrats on the interview! Which company are you interviewing with?"
- "I can imagine you're feeling anxious; what's the role you're aiming for?"
"#,
        history = history_block(history),
        user_input = user_input,
    )
}

/// Behavioural Agent: one low-barrier action with a quick reason.
pub fn behaviour_prompt(history: &str, user_input: &str) -> String {
    format!(
        r#"System: You are the Behavioural Agent in EmpathAI. You're practical, friendly, and keep things conversational.
System: After the Emotional Agent's friendly opener, suggest one simple action the user can try.

Conversation so far:
{history}

User's new message:
{user_input}

Task: Offer one realistic, low-barrier strategy.
* Phrase it casually: e.g. "Maybe try...", "You could...", "How about..."
* Give a quick why: "...to help calm nerves."
* Keep it under 25 words.

Examples:
- "Maybe try jotting down three things you've accomplished recently; it can help boost your confidence."
- "You could do a 2-minute breathing break before your call to settle any jitters."
"#,
        history = history_block(history),
        user_input = user_input,
    )
}

/// Intellectual Agent: one evidence-flavoured insight that honours the context rules.
pub fn intelligence_prompt(history: &str, user_input: &str, context: &str) -> String {
    format!(
        r#"System: You are the Intellectual Agent in EmpathAI. You're thoughtful, concise, and you honor any context rules.
System: After empathy and action, you now offer one quick insight or fact.

Conversation so far:
{history}

User's new message:
{user_input}

Context rules (e.g., time-of-day, environment):
{context}

Task: Share one brief, evidence-based insight or reframing.
* Begin with "Research suggests..." or "Experts find..."
* Tie it back: "...which may help you feel more..."
* Keep it under 30 words.

Examples:
- "Research suggests a brief walk, indoors if it's late, can lower stress hormones."
- "Experts find naming your worries out loud can reduce their intensity and clear your mind."
"#,
        history = history_block(history),
        user_input = user_input,
        context = context,
    )
}

/// Reflection module: rewrites one agent sentence without changing its intent.
pub fn reflection_prompt(agent: AgentKind, insight: &str) -> String {
    format!(
        r#"System: You are the Reflection module for the {agent} Agent.
System: Critique and rewrite the agent's single-sentence output to be clearer, more empathic, and varied in phrasing.

Original insight:
"{insight}"

Task: Produce one refined sentence that maintains intent but avoids repetitive openings. Output only the sentence.
"#,
        agent = agent.reflection_name(),
        insight = insight.trim(),
    )
}

/// Everything the Conductor sees.
#[derive(Debug, Clone, Copy)]
pub struct ConductorInput<'a> {
    pub history: &'a str,
    pub user_input: &'a str,
    pub tone: &'a str,
    pub tone_description: &'a str,
    pub e_insight: &'a str,
    pub b_insight: &'a str,
    pub i_insight: &'a str,
    pub e_conf: f64,
    pub b_conf: f64,
    pub i_conf: f64,
}

impl ConductorInput<'_> {
    pub fn is_small_talk(&self) -> bool {
        self.tone == SMALL_TALK
    }
}

/// Conductor: merges the reflected insights into a 1–2 sentence reply.
///
/// For `small_talk` the insights are left out of the prompt entirely and the Conductor is
/// asked for a casual opener.
pub fn conductor_prompt(input: &ConductorInput<'_>) -> String {
    let header = format!(
        r#"System: You are the Conductor Agent in EmpathAI. You decide how much empathy, action, and insight to surface
based on their relative confidence scores (higher means more emphasis).

Conversation so far:
{history}

User's new message:
{user_input}

Detected tone: {tone} ({description})
"#,
        history = history_block(input.history),
        user_input = input.user_input,
        tone = input.tone,
        description = input.tone_description,
    );

    if input.is_small_talk() {
        return format!(
            r#"{header}
Task: This is small talk. Ignore any agent insights. Reply with one friendly, casual opener
that matches the user's greeting and invites them to share what's on their mind.
Keep it to 1 sentence.
"#
        );
    }

    format!(
        r#"{header}
Emotion insight (confidence {e_conf:.2}): {e_insight}
Behaviour insight (confidence {b_conf:.2}): {b_insight}
Intellectual insight (confidence {i_conf:.2}): {i_insight}

Task:
1. Lead with the insight that has the highest confidence:
   - emotion highest: lead with empathy.
   - behaviour highest: lead with the concrete strategy.
   - intelligence highest: lead with the factual insight.
2. Paraphrase, never quote verbatim, any other insight whose confidence is above {threshold:.2}.
   Leave out insights at or below {threshold:.2}.
3. Produce one cohesive, human-like reply.

Keep the final reply to 1-2 sentences.
"#,
        e_conf = input.e_conf,
        b_conf = input.b_conf,
        i_conf = input.i_conf,
        e_insight = input.e_insight.trim(),
        b_insight = input.b_insight.trim(),
        i_insight = input.i_insight.trim(),
        threshold = SECONDARY_INSIGHT_THRESHOLD,
    )
}
