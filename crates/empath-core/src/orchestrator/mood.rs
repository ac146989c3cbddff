//! Typed decoder for the Mood Agent's JSON output.

use crate::error::{PipelineError, Result};
use crate::tone;
use serde::Serialize;
use serde_json::{Map, Value};

/// Sums further than this from 1.0 are logged.
const SUM_TOLERANCE: f64 = 0.05;

/// Tone and weights chosen by the Mood Agent for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodResult {
    pub tone: String,
    pub description: String,
    pub e_conf: f64,
    pub b_conf: f64,
    pub i_conf: f64,
}

impl MoodResult {
    /// Decodes the raw classifier text. Surrounding whitespace is the only thing tolerated
    /// around the JSON object; nothing is repaired.
    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw.trim())
            .map_err(|e| PipelineError::MalformedMood(format!("not valid JSON ({})", e)))?;
        let obj = value
            .as_object()
            .ok_or_else(|| PipelineError::MalformedMood("expected a JSON object".to_string()))?;

        let mood = MoodResult {
            tone: string_field(obj, "tone")?,
            description: string_field(obj, "description")?,
            e_conf: confidence_field(obj, "e_conf")?,
            b_conf: confidence_field(obj, "b_conf")?,
            i_conf: confidence_field(obj, "i_conf")?,
        };

        if tone::lookup(&mood.tone).is_none() {
            tracing::warn!(target: "empath::pipeline", tone = %mood.tone, "Mood Agent returned a tone outside the table");
        }
        let sum = mood.confidence_sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            tracing::warn!(target: "empath::pipeline", sum, "Mood confidences do not sum to 1.0");
        }
        Ok(mood)
    }

    pub fn confidence_sum(&self) -> f64 {
        self.e_conf + self.b_conf + self.i_conf
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Result<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(PipelineError::MalformedMood(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
        None => Err(PipelineError::MalformedMood(format!("missing key '{}'", key))),
    }
}

/// Accepts a JSON number or a numeric string; the value must be finite and within [0, 1].
fn confidence_field(obj: &Map<String, Value>, key: &str) -> Result<f64> {
    let raw = obj
        .get(key)
        .ok_or_else(|| PipelineError::MalformedMood(format!("missing key '{}'", key)))?;
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && (0.0..=1.0).contains(&v) => Ok(v),
        Some(v) => Err(PipelineError::MalformedMood(format!(
            "'{}' must be within [0, 1], got {}",
            key, v
        ))),
        None => Err(PipelineError::MalformedMood(format!(
            "'{}' is not a number: {}",
            key, raw
        ))),
    }
}
