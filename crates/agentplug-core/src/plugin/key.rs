//! Item key parser.
//!
//! Accepts `key` or `key[param1,param2,...]`. Parameters are positional
//! strings; a parameter may be quoted with `"` to carry commas or
//! brackets. Inside quotes `\"` stands for a quote and `\\` for a
//! backslash; any other backslash is kept as is. Spaces before a
//! parameter are skipped, unquoted parameters are otherwise taken
//! verbatim.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::AgentError;

/// A parsed item request: key plus positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemKey {
    pub key: String,
    pub params: Vec<String>,
}

impl ItemKey {
    pub fn new(key: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            key: key.into(),
            params,
        }
    }

    /// Parses an item key in `key[params]` form.
    ///
    /// `key` yields no parameters, `key[]` yields a single empty one.
    pub fn parse(text: &str) -> Result<Self, AgentError> {
        let (key, body) = match text.find('[') {
            Some(pos) => (&text[..pos], Some(&text[pos + 1..])),
            None => (text, None),
        };

        if key.is_empty() {
            return Err(AgentError::invalid_argument(format!(
                "item key is empty in {:?}",
                text
            )));
        }
        if let Some(c) = key.chars().find(|c| !is_key_char(*c)) {
            return Err(AgentError::invalid_argument(format!(
                "invalid character {:?} in item key {:?}",
                c, text
            )));
        }

        let params = match body {
            Some(body) => parse_params(body)?,
            None => Vec::new(),
        };

        Ok(Self::new(key, params))
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)?;
        if self.params.is_empty() {
            return Ok(());
        }
        f.write_str("[")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if needs_quoting(param) {
                f.write_str("\"")?;
                for c in param.chars() {
                    if matches!(c, '"' | '\\') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str("\"")?;
            } else {
                f.write_str(param)?;
            }
        }
        f.write_str("]")
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

fn needs_quoting(param: &str) -> bool {
    param.starts_with([' ', '"', '[']) || param.contains([',', ']'])
}

fn parse_params(body: &str) -> Result<Vec<String>, AgentError> {
    let mut chars = body.chars().peekable();
    let mut params = Vec::new();

    loop {
        while chars.next_if_eq(&' ').is_some() {}

        let param = match chars.peek() {
            Some('"') => {
                chars.next();
                let param = parse_quoted(&mut chars)?;
                while chars.next_if_eq(&' ').is_some() {}
                param
            }
            Some('[') => {
                return Err(AgentError::invalid_argument(
                    "nested parameter arrays are not supported",
                ));
            }
            _ => {
                let mut param = String::new();
                while let Some(c) = chars.next_if(|c| *c != ',' && *c != ']') {
                    param.push(c);
                }
                param
            }
        };
        params.push(param);

        match chars.next() {
            Some(',') => continue,
            Some(']') => break,
            Some(c) => {
                return Err(AgentError::invalid_argument(format!(
                    "unexpected character {:?} after quoted parameter",
                    c
                )));
            }
            None => return Err(AgentError::invalid_argument("missing closing ']'")),
        }
    }

    if chars.next().is_some() {
        return Err(AgentError::invalid_argument(
            "unexpected characters after closing ']'",
        ));
    }
    Ok(params)
}

fn parse_quoted(chars: &mut Peekable<Chars<'_>>) -> Result<String, AgentError> {
    let mut param = String::new();
    loop {
        match chars.next() {
            Some('\\') => match chars.next_if(|c| matches!(c, '"' | '\\')) {
                Some(escaped) => param.push(escaped),
                None => param.push('\\'),
            },
            Some('"') => return Ok(param),
            Some(c) => param.push(c),
            None => {
                return Err(AgentError::invalid_argument(
                    "unterminated quoted parameter",
                ));
            }
        }
    }
}
