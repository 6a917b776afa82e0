//! Keyed string templates for metric reports and norms.
//!
//! Placeholders are written as `{key}` or `{key:.Nf}` (fixed precision for
//! numbers). `{{` and `}}` produce literal braces. Rendering fails when a
//! placeholder has no value, so a misconfigured metric surfaces immediately
//! instead of producing a half-filled sentence.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template parameter '{0}' has no value")]
    MissingParameter(String),

    #[error("malformed template at byte {position}: {reason}")]
    Malformed { position: usize, reason: String },
}

/// A single template value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    Number(f64),
}

impl Param {
    fn render(&self, precision: Option<usize>) -> String {
        match (self, precision) {
            (Param::Number(v), Some(p)) => format!("{:.*}", p, v),
            (Param::Number(v), None) => format_number(*v),
            (Param::Text(s), _) => s.clone(),
        }
    }
}

/// Integral values render without a fraction so `10.0` reads as `10`.
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Text(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::Text(s)
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Param::Number(v)
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Number(v as f64)
    }
}

impl From<u32> for Param {
    fn from(v: u32) -> Self {
        Param::Number(f64::from(v))
    }
}

impl From<usize> for Param {
    fn from(v: usize) -> Self {
        Param::Number(v as f64)
    }
}

/// Named parameters for a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, Param>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Param>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Overwrite entries with those from `other`.
    pub fn merge(&mut self, other: Parameters) {
        self.values.extend(other.values);
    }
}

/// Render `template`, substituting every placeholder from `params`.
pub fn render(template: &str, params: &Parameters) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut field = String::new();
                let mut closed = false;
                for (_, fc) in chars.by_ref() {
                    if fc == '}' {
                        closed = true;
                        break;
                    }
                    field.push(fc);
                }
                if !closed {
                    return Err(TemplateError::Malformed {
                        position: pos,
                        reason: "unclosed placeholder".to_string(),
                    });
                }
                let (key, precision) = parse_field(&field, pos)?;
                let value = params
                    .get(key)
                    .ok_or_else(|| TemplateError::MissingParameter(key.to_string()))?;
                out.push_str(&value.render(precision));
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(TemplateError::Malformed {
                        position: pos,
                        reason: "single '}' outside placeholder".to_string(),
                    });
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn parse_field(field: &str, position: usize) -> Result<(&str, Option<usize>), TemplateError> {
    let malformed = |reason: &str| TemplateError::Malformed {
        position,
        reason: reason.to_string(),
    };

    let (key, spec) = match field.split_once(':') {
        Some((key, spec)) => (key.trim(), Some(spec.trim())),
        None => (field.trim(), None),
    };
    if key.is_empty() {
        return Err(malformed("empty placeholder"));
    }

    let precision = match spec {
        None => None,
        Some(spec) => {
            let digits = spec
                .strip_prefix('.')
                .and_then(|s| s.strip_suffix('f'))
                .ok_or_else(|| malformed("only '.Nf' format specs are supported"))?;
            Some(
                digits
                    .parse::<usize>()
                    .map_err(|_| malformed("invalid precision"))?,
            )
        }
    };

    Ok((key, precision))
}
