//! Query compilation and matching.

use super::XQueryError;

/// A compiled path query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XQuery {
    expression: String,
    anywhere: bool,
    steps: Vec<Step>,
    selector: Selector,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    /// `None` matches any element (`*`).
    name: Option<String>,
    predicate: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    HasAttribute(String),
    AttributeEquals(String, String),
    AttributeNotEquals(String, String),
    Position(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Attribute(String),
    Text,
}

/// One open element on the traversal stack.
#[derive(Debug)]
pub(crate) struct Frame<'a> {
    pub name: &'a str,
    pub attributes: Vec<(&'a str, &'a str)>,
    /// 1-based position among siblings with the same name.
    pub position: usize,
    /// 1-based position among all element siblings.
    pub element_position: usize,
    pub text: String,
}

impl Frame<'_> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

impl XQuery {
    /// Compile a query expression.
    pub fn parse(expression: &str) -> Result<Self, XQueryError> {
        let syntax = |message: &str| XQueryError::Syntax {
            expression: expression.to_string(),
            message: message.to_string(),
        };

        let (anywhere, rest) = if let Some(rest) = expression.strip_prefix("//") {
            (true, rest)
        } else if let Some(rest) = expression.strip_prefix('/') {
            (false, rest)
        } else {
            return Err(syntax("a query must start with `/` or `//`"));
        };

        let mut segments = split_segments(rest).map_err(|m| syntax(m))?;

        let selector = match segments.last().map(String::as_str) {
            Some("text()") => {
                segments.pop();
                Selector::Text
            }
            Some(last) if last.starts_with('@') => {
                let name = last[1..].to_string();
                if name.is_empty() {
                    return Err(syntax("empty attribute name"));
                }
                segments.pop();
                Selector::Attribute(name)
            }
            _ => Selector::Text,
        };

        if segments.is_empty() {
            return Err(syntax("a query needs at least one element step"));
        }

        let steps = segments
            .iter()
            .map(|segment| parse_step(segment).map_err(|m| syntax(&m)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(XQuery {
            expression: expression.to_string(),
            anywhere,
            steps,
            selector,
        })
    }

    /// The source expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Check whether the innermost frames of `stack` match this query.
    pub(crate) fn matches(&self, stack: &[Frame<'_>]) -> bool {
        if stack.len() < self.steps.len() || (!self.anywhere && stack.len() != self.steps.len()) {
            return false;
        }

        let frames = &stack[stack.len() - self.steps.len()..];
        self.steps
            .iter()
            .zip(frames)
            .all(|(step, frame)| step.matches(frame))
    }

    /// Select the value of a matched element.
    pub(crate) fn select(&self, frame: &Frame<'_>) -> Option<String> {
        match &self.selector {
            Selector::Attribute(name) => frame.attribute(name).map(str::to_string),
            Selector::Text => Some(frame.text.clone()),
        }
    }
}

impl Step {
    fn matches(&self, frame: &Frame<'_>) -> bool {
        if let Some(name) = &self.name {
            if name != frame.name {
                return false;
            }
        }

        match &self.predicate {
            None => true,
            Some(Predicate::HasAttribute(attr)) => frame.attribute(attr).is_some(),
            Some(Predicate::AttributeEquals(attr, value)) => {
                frame.attribute(attr) == Some(value.as_str())
            }
            Some(Predicate::AttributeNotEquals(attr, value)) => {
                frame.attribute(attr) != Some(value.as_str())
            }
            Some(Predicate::Position(n)) if self.name.is_some() => frame.position == *n,
            Some(Predicate::Position(n)) => frame.element_position == *n,
        }
    }
}

/// Split on `/` outside of predicates and quotes.
fn split_segments(input: &str) -> Result<Vec<String>, &'static str> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '[') => {
                depth += 1;
                current.push(c);
            }
            (None, ']') => {
                depth = depth.checked_sub(1).ok_or("unbalanced `]`")?;
                current.push(c);
            }
            (None, '/') if depth == 0 => {
                if current.is_empty() {
                    return Err("empty step");
                }
                segments.push(std::mem::take(&mut current));
            }
            (None, c) => current.push(c),
        }
    }

    if quote.is_some() {
        return Err("unterminated string literal");
    }
    if depth != 0 {
        return Err("unbalanced `[`");
    }
    if current.is_empty() {
        return Err("empty step");
    }
    segments.push(current);
    Ok(segments)
}

fn parse_step(segment: &str) -> Result<Step, String> {
    let (name, predicate) = match segment.find('[') {
        Some(open) => {
            let body = segment[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| format!("step `{segment}` has trailing characters"))?;
            (&segment[..open], Some(parse_predicate(body)?))
        }
        None => (segment, None),
    };

    if name.is_empty() {
        return Err(format!("step `{segment}` has no element name"));
    }
    if name.starts_with('@') {
        return Err(format!("attribute `{name}` may only appear in the last segment"));
    }

    Ok(Step {
        name: (name != "*").then(|| name.to_string()),
        predicate,
    })
}

fn parse_predicate(body: &str) -> Result<Predicate, String> {
    let body = body.trim();

    if let Ok(position) = body.parse::<usize>() {
        if position == 0 {
            return Err("positions are 1-based".to_string());
        }
        return Ok(Predicate::Position(position));
    }

    let attr = body
        .strip_prefix('@')
        .ok_or_else(|| format!("unsupported predicate `[{body}]`"))?;

    let (name, value, negated) = if let Some((name, value)) = attr.split_once("!=") {
        (name, Some(value), true)
    } else if let Some((name, value)) = attr.split_once('=') {
        (name, Some(value), false)
    } else {
        (attr, None, false)
    };

    let name = name.trim().to_string();
    if name.is_empty() {
        return Err("empty attribute name in predicate".to_string());
    }

    match value {
        None => Ok(Predicate::HasAttribute(name)),
        Some(value) => {
            let value = unquote(value.trim())
                .ok_or_else(|| format!("predicate value `{value}` must be quoted"))?;
            if negated {
                Ok(Predicate::AttributeNotEquals(name, value))
            } else {
                Ok(Predicate::AttributeEquals(name, value))
            }
        }
    }
}

fn unquote(value: &str) -> Option<String> {
    ['\'', '"'].iter().find_map(|&q| {
        value
            .strip_prefix(q)
            .and_then(|v| v.strip_suffix(q))
            .map(str::to_string)
    })
}
