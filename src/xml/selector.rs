use indexmap::IndexMap;

use crate::error::{Result, TestLensError};
use crate::xml::document::Element;

/// A compiled path selector.
///
/// Supported syntax: `/` (child) and `//` (descendant) axes, element names,
/// `*`, terminal `@attr` and `text()` steps, predicates `[@attr]`,
/// `[@attr='v']`, `[contains(text(),'v')]`, `[contains(@attr,'v')]`, `[n]`,
/// `[last()]`, and `count(path)` around any path.
#[derive(Debug, Clone)]
pub struct Selector {
    count: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Clone)]
pub enum Match<'a> {
    Element(&'a Element),
    Attribute { name: String, value: String },
    Text(String),
    Count(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    Element(String),
    AnyElement,
    Attribute(String),
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    HasAttr(String),
    AttrEquals(String, String),
    AttrContains(String, String),
    TextContains(String),
    Position(usize),
    Last,
}

#[derive(Debug, Clone)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

impl Selector {
    pub fn compile(expression: &str) -> Result<Self> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(invalid(expression, "empty selector"));
        }

        let (count, path) = match trimmed
            .strip_prefix("count(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => (true, inner.trim()),
            None => (false, trimmed),
        };

        let steps = parse_steps(expression, path)?;

        // Attribute and text() tests select leaves, so they only make
        // sense on the final step.
        for step in &steps[..steps.len() - 1] {
            if matches!(step.test, NodeTest::Attribute(_) | NodeTest::Text) {
                return Err(invalid(expression, "attribute and text() steps must be last"));
            }
        }

        Ok(Selector { count, steps })
    }

    pub fn evaluate<'a>(&self, root: &'a Element) -> Vec<Match<'a>> {
        let matches = run_steps(root, &self.steps);
        if self.count {
            return vec![Match::Count(matches.len())];
        }
        matches
    }
}

impl Match<'_> {
    /// The scalar value this match contributes to a report.
    pub fn value(&self) -> String {
        match self {
            Match::Element(element) => element.text_content(),
            Match::Attribute { value, .. } => value.clone(),
            Match::Text(text) => text.clone(),
            Match::Count(count) => count.to_string(),
        }
    }

    /// Attributes carried by the matched node; empty for non-element matches.
    pub fn attributes(&self) -> IndexMap<String, String> {
        match self {
            Match::Element(element) => element.attributes.clone(),
            _ => IndexMap::new(),
        }
    }
}

fn parse_steps(expression: &str, path: &str) -> Result<Vec<Step>> {
    if !path.starts_with('/') {
        return Err(invalid(expression, "selector must start with '/' or '//'"));
    }

    let chars: Vec<char> = path.chars().collect();
    let mut steps = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let axis = if chars[pos] == '/' && chars.get(pos + 1) == Some(&'/') {
            pos += 2;
            Axis::Descendant
        } else {
            pos += 1;
            Axis::Child
        };

        // Step body runs to the next '/' outside predicates and quotes.
        let start = pos;
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        while pos < chars.len() {
            let c = chars[pos];
            if let Some(open) = quote {
                if c == open {
                    quote = None;
                }
            } else {
                match c {
                    '\'' | '"' => quote = Some(c),
                    '[' => depth += 1,
                    ']' => depth = depth.saturating_sub(1),
                    '/' if depth == 0 => break,
                    _ => {}
                }
            }
            pos += 1;
        }
        if quote.is_some() {
            return Err(invalid(expression, "unterminated quoted string"));
        }

        let body: String = chars[start..pos].iter().collect();
        steps.push(parse_step(expression, axis, &body)?);
    }

    Ok(steps)
}

fn parse_step(expression: &str, axis: Axis, body: &str) -> Result<Step> {
    if body.is_empty() {
        return Err(invalid(expression, "empty step"));
    }

    let (test_src, predicates_src) = match body.find('[') {
        Some(idx) => (&body[..idx], &body[idx..]),
        None => (body, ""),
    };

    let test = parse_node_test(expression, test_src)?;
    let predicates = parse_predicates(expression, predicates_src)?;

    if !predicates.is_empty() && matches!(test, NodeTest::Attribute(_) | NodeTest::Text) {
        return Err(invalid(
            expression,
            "predicates are not supported on attribute or text() steps",
        ));
    }

    Ok(Step {
        axis,
        test,
        predicates,
    })
}

fn parse_node_test(expression: &str, source: &str) -> Result<NodeTest> {
    if source == "*" {
        return Ok(NodeTest::AnyElement);
    }
    if source == "text()" {
        return Ok(NodeTest::Text);
    }
    if let Some(name) = source.strip_prefix('@') {
        validate_name(expression, name)?;
        return Ok(NodeTest::Attribute(name.to_string()));
    }
    validate_name(expression, source)?;
    Ok(NodeTest::Element(source.to_string()))
}

fn validate_name(expression: &str, name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
    if valid {
        Ok(())
    } else {
        Err(invalid(expression, &format!("invalid name '{name}'")))
    }
}

fn parse_predicates(expression: &str, source: &str) -> Result<Vec<Predicate>> {
    let mut predicates = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut pos = 0;

    while pos < chars.len() {
        if chars[pos] != '[' {
            return Err(invalid(expression, "malformed predicate list"));
        }
        pos += 1;

        let start = pos;
        let mut quote: Option<char> = None;
        while pos < chars.len() {
            let c = chars[pos];
            if let Some(open) = quote {
                if c == open {
                    quote = None;
                }
            } else if c == '\'' || c == '"' {
                quote = Some(c);
            } else if c == ']' {
                break;
            }
            pos += 1;
        }
        if pos >= chars.len() {
            return Err(invalid(expression, "unclosed predicate"));
        }

        let inner: String = chars[start..pos].iter().collect();
        predicates.push(parse_predicate(expression, inner.trim())?);
        pos += 1;
    }

    Ok(predicates)
}

fn parse_predicate(expression: &str, inner: &str) -> Result<Predicate> {
    if inner.is_empty() {
        return Err(invalid(expression, "empty predicate"));
    }
    if inner == "last()" {
        return Ok(Predicate::Last);
    }
    if inner.chars().all(|c| c.is_ascii_digit()) {
        let position: usize = inner
            .parse()
            .map_err(|_| invalid(expression, "position out of range"))?;
        if position == 0 {
            return Err(invalid(expression, "positions are 1-based"));
        }
        return Ok(Predicate::Position(position));
    }
    if let Some(rest) = inner.strip_prefix("contains(") {
        let args = rest
            .strip_suffix(')')
            .ok_or_else(|| invalid(expression, "expected ')' in contains()"))?;
        let (target, value_src) = args
            .split_once(',')
            .ok_or_else(|| invalid(expression, "contains() takes two arguments"))?;
        let value = parse_quoted(expression, value_src.trim())?;
        let target = target.trim();
        if target == "text()" {
            return Ok(Predicate::TextContains(value));
        }
        if let Some(name) = target.strip_prefix('@') {
            validate_name(expression, name)?;
            return Ok(Predicate::AttrContains(name.to_string(), value));
        }
        return Err(invalid(expression, "contains() expects text() or @attribute"));
    }
    if let Some(rest) = inner.strip_prefix('@') {
        return match rest.split_once('=') {
            Some((name, value_src)) => {
                let name = name.trim();
                validate_name(expression, name)?;
                let value = parse_quoted(expression, value_src.trim())?;
                Ok(Predicate::AttrEquals(name.to_string(), value))
            }
            None => {
                let name = rest.trim();
                validate_name(expression, name)?;
                Ok(Predicate::HasAttr(name.to_string()))
            }
        };
    }
    Err(invalid(expression, &format!("unsupported predicate '{inner}'")))
}

fn parse_quoted(expression: &str, source: &str) -> Result<String> {
    let quoted = source.len() >= 2
        && ((source.starts_with('\'') && source.ends_with('\''))
            || (source.starts_with('"') && source.ends_with('"')));
    if !quoted {
        return Err(invalid(expression, "expected quoted string"));
    }
    Ok(source[1..source.len() - 1].to_string())
}

fn run_steps<'a>(root: &'a Element, steps: &[Step]) -> Vec<Match<'a>> {
    let Some((last, prefix)) = steps.split_last() else {
        return Vec::new();
    };

    match &last.test {
        NodeTest::Attribute(name) => owner_elements(root, prefix, last.axis)
            .into_iter()
            .filter_map(|element| {
                element.attr(name).map(|value| Match::Attribute {
                    name: name.clone(),
                    value: value.to_string(),
                })
            })
            .collect(),
        NodeTest::Text => owner_elements(root, prefix, last.axis)
            .into_iter()
            .flat_map(Element::text_nodes)
            .map(|text| Match::Text(text.to_string()))
            .collect(),
        NodeTest::Element(_) | NodeTest::AnyElement => element_contexts(root, steps)
            .into_iter()
            .map(Match::Element)
            .collect(),
    }
}

/// Elements whose attributes or direct text a terminal `@attr`/`text()`
/// step reads.
fn owner_elements<'a>(root: &'a Element, prefix: &[Step], axis: Axis) -> Vec<&'a Element> {
    if prefix.is_empty() {
        // The context is the document itself; only the descendant axis
        // reaches attributes or text from there.
        return match axis {
            Axis::Child => Vec::new(),
            Axis::Descendant => root.descendants(),
        };
    }

    let contexts = element_contexts(root, prefix);
    match axis {
        Axis::Child => contexts,
        Axis::Descendant => contexts
            .into_iter()
            .flat_map(Element::descendants)
            .collect(),
    }
}

fn element_contexts<'a>(root: &'a Element, steps: &[Step]) -> Vec<&'a Element> {
    let mut contexts: Vec<&Element> = Vec::new();

    for (index, step) in steps.iter().enumerate() {
        let mut next = Vec::new();
        if index == 0 {
            // The first step starts at the document node, whose only
            // child is the root element.
            let candidates = match step.axis {
                Axis::Child => vec![root],
                Axis::Descendant => root.descendants(),
            };
            next.extend(filter_step(candidates, step));
        } else {
            for context in &contexts {
                let candidates: Vec<&Element> = match step.axis {
                    Axis::Child => context.child_elements().collect(),
                    Axis::Descendant => context
                        .child_elements()
                        .flat_map(Element::descendants)
                        .collect(),
                };
                next.extend(filter_step(candidates, step));
            }
        }
        contexts = next;
    }

    contexts
}

fn filter_step<'a>(candidates: Vec<&'a Element>, step: &Step) -> Vec<&'a Element> {
    let mut matched: Vec<&Element> = candidates
        .into_iter()
        .filter(|element| test_matches(&step.test, element))
        .collect();

    // Predicates apply left to right; positional ones index into the
    // matches narrowed so far for this context.
    for predicate in &step.predicates {
        matched = match predicate {
            Predicate::Position(position) => matched
                .get(position - 1)
                .map(|element| vec![*element])
                .unwrap_or_default(),
            Predicate::Last => matched
                .last()
                .map(|element| vec![*element])
                .unwrap_or_default(),
            value_test => matched
                .into_iter()
                .filter(|element| satisfies(element, value_test))
                .collect(),
        };
    }

    matched
}

fn test_matches(test: &NodeTest, element: &Element) -> bool {
    match test {
        NodeTest::Element(name) => element.name == *name,
        NodeTest::AnyElement => true,
        NodeTest::Attribute(_) | NodeTest::Text => false,
    }
}

fn satisfies(element: &Element, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::HasAttr(name) => element.attr(name).is_some(),
        Predicate::AttrEquals(name, value) => element.attr(name) == Some(value.as_str()),
        Predicate::AttrContains(name, value) => element
            .attr(name)
            .is_some_and(|attr| attr.contains(value.as_str())),
        Predicate::TextContains(value) => element.text().contains(value.as_str()),
        Predicate::Position(_) | Predicate::Last => true,
    }
}

fn invalid(expression: &str, message: &str) -> TestLensError {
    TestLensError::InvalidSelector {
        expression: expression.to_string(),
        message: message.to_string(),
    }
}
