//! Selector string parser.
//!
//! The selector is split on commas at brace depth zero; each fragment is
//! a name, an optional brace-delimited sub-selection (parsed
//! recursively), and an optional `.order(...)` suffix. Unknown order
//! tokens are kept as [`OrderDirective::Invalid`]; only structural
//! problems are syntax errors.

use crate::selection::{OrderDirective, SelectionNode};
use prism_core::{PrismError, PrismResult};

const RESERVED: &[char] = &['{', '}', '(', ')', ',', '.'];

/// Parse a selector string into a selection tree
///
/// # Errors
///
/// Returns [`PrismError::Syntax`] if braces are unbalanced, a field is
/// empty or has an invalid name, or unexpected text follows a field.
pub fn parse(selector: &str) -> PrismResult<Vec<SelectionNode>> {
    parse_selection(selector, 0)
}

/// Parse `input`, which starts at byte `offset` of the full selector
fn parse_selection(input: &str, offset: usize) -> PrismResult<Vec<SelectionNode>> {
    split_top_level(input, offset)?
        .into_iter()
        .map(|(start, fragment)| parse_field(fragment, start))
        .collect()
}

/// Split on commas that are not inside braces
fn split_top_level(input: &str, offset: usize) -> PrismResult<Vec<(usize, &str)>> {
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    return Err(PrismError::syntax(offset + i, "unexpected '}'"));
                }
                depth -= 1;
            }
            ',' if depth == 0 => {
                fragments.push((offset + start, &input[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(PrismError::syntax(offset + input.len(), "unclosed '{'"));
    }

    fragments.push((offset + start, &input[start..]));
    Ok(fragments)
}

fn parse_field(fragment: &str, offset: usize) -> PrismResult<SelectionNode> {
    let leading = fragment.len() - fragment.trim_start().len();
    let field = fragment.trim();
    let offset = offset + leading;

    if field.is_empty() {
        return Err(PrismError::syntax(offset, "empty field"));
    }

    let (name, children, suffix_at) = match field.find('{') {
        Some(open) => {
            let close = matching_brace(field, open, offset)?;
            let children = parse_selection(&field[open + 1..close], offset + open + 1)?;
            (&field[..open], Some(children), close + 1)
        }
        None => {
            let dot = field.find('.').unwrap_or(field.len());
            (&field[..dot], None, dot)
        }
    };

    let name = validate_name(name, offset)?;
    let order = parse_order(&field[suffix_at..], offset + suffix_at)?;

    Ok(SelectionNode {
        name: name.to_string(),
        children,
        order,
    })
}

/// Index of the `}` closing the `{` at `open`
fn matching_brace(field: &str, open: usize, offset: usize) -> PrismResult<usize> {
    let mut depth = 0usize;
    for (i, c) in field[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(open + i);
                }
            }
            _ => {}
        }
    }
    Err(PrismError::syntax(offset + open, "unclosed '{'"))
}

fn validate_name(name: &str, offset: usize) -> PrismResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PrismError::syntax(offset, "missing field name"));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| c.is_whitespace() || RESERVED.contains(c))
    {
        return Err(PrismError::syntax(
            offset,
            format!("invalid character {:?} in field name {:?}", bad, name),
        ));
    }
    Ok(name)
}

/// Parse what follows the name or closing brace: nothing, or `.order(...)`
fn parse_order(suffix: &str, offset: usize) -> PrismResult<Option<OrderDirective>> {
    let suffix = suffix.trim();
    if suffix.is_empty() {
        return Ok(None);
    }

    let args = suffix
        .strip_prefix('.')
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix("order"))
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('('))
        .ok_or_else(|| {
            PrismError::syntax(offset, format!("unexpected {:?} after field", suffix))
        })?;

    // An unterminated `.order(` is read leniently as an invalid directive.
    let token = match args.rfind(')') {
        Some(close) => {
            if !args[close + 1..].trim().is_empty() {
                return Err(PrismError::syntax(
                    offset,
                    format!("unexpected text after {:?}", suffix),
                ));
            }
            &args[..close]
        }
        None => args,
    };

    Ok(Some(OrderDirective::from_token(token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::render;
    use proptest::prelude::*;

    fn names(nodes: &[SelectionNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_parse_flat() {
        let nodes = parse("name,description").unwrap();
        assert_eq!(names(&nodes), vec!["name", "description"]);
        assert!(nodes.iter().all(SelectionNode::is_leaf));
    }

    #[test]
    fn test_parse_brace_balance() {
        let nodes = parse("a{b,c{d,e},f}").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "a");

        let children = nodes[0].children.as_ref().unwrap();
        assert_eq!(names(children), vec!["b", "c", "f"]);

        let grandchildren = children[1].children.as_ref().unwrap();
        assert_eq!(names(grandchildren), vec!["d", "e"]);
        assert!(children[0].is_leaf());
        assert!(children[2].is_leaf());
    }

    #[test]
    fn test_parse_unclosed_brace() {
        let err = parse("a{b").unwrap_err();
        assert!(matches!(err, PrismError::Syntax { .. }));
    }

    #[test]
    fn test_parse_unexpected_closing_brace() {
        let err = parse("a},b").unwrap_err();
        assert_eq!(err, PrismError::syntax(1, "unexpected '}'"));
    }

    #[test]
    fn test_parse_order_on_association() {
        let nodes = parse("title,posts{content}.order(reverse_chronological)").unwrap();
        assert_eq!(nodes[0].order, None);
        assert_eq!(nodes[1].name, "posts");
        assert_eq!(nodes[1].order, Some(OrderDirective::ReverseChronological));
        assert_eq!(names(nodes[1].children.as_ref().unwrap()), vec!["content"]);
    }

    #[test]
    fn test_parse_order_on_leaf() {
        let nodes = parse("field.order(chronological)").unwrap();
        assert_eq!(nodes[0].name, "field");
        assert!(nodes[0].is_leaf());
        assert_eq!(nodes[0].order, Some(OrderDirective::Chronological));
    }

    #[test]
    fn test_parse_invalid_order_is_not_an_error() {
        let nodes = parse("posts{content}.order(invalid_ordering)").unwrap();
        assert_eq!(
            nodes[0].order,
            Some(OrderDirective::Invalid("invalid_ordering".to_string()))
        );
    }

    #[test]
    fn test_parse_unterminated_order() {
        let nodes = parse("field.order(").unwrap();
        assert_eq!(nodes[0].order, Some(OrderDirective::Invalid(String::new())));
    }

    #[test]
    fn test_parse_nested_order() {
        let nodes = parse("blog{posts{title}.order(chronological),name}").unwrap();
        let children = nodes[0].children.as_ref().unwrap();
        assert_eq!(children[0].order, Some(OrderDirective::Chronological));
        assert_eq!(children[1].name, "name");
    }

    #[test]
    fn test_parse_whitespace() {
        let nodes = parse(" title , posts { content } .order( chronological ) ").unwrap();
        assert_eq!(names(&nodes), vec!["title", "posts"]);
        assert_eq!(nodes[1].order, Some(OrderDirective::Chronological));
    }

    #[test]
    fn test_parse_empty_fields() {
        assert!(parse("").is_err());
        assert!(parse("a,,b").is_err());
        assert!(parse("a,").is_err());
        assert!(parse("a{}").is_err());
        assert!(parse("{a}").is_err());
    }

    #[test]
    fn test_parse_malformed_suffix() {
        assert!(parse("a.b").is_err());
        assert!(parse("a{b}c").is_err());
        assert!(parse("a{b}{c}").is_err());
        assert!(parse("a.order(x)y").is_err());
        assert!(parse("a b").is_err());
    }

    #[test]
    fn test_parse_error_position_in_nested_selection() {
        let err = parse("title,posts{content,,}").unwrap_err();
        assert_eq!(err, PrismError::syntax(20, "empty field"));
    }

    fn name() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_]{0,8}"
    }

    fn order() -> impl Strategy<Value = Option<OrderDirective>> {
        prop_oneof![
            Just(None),
            Just(Some(OrderDirective::Chronological)),
            Just(Some(OrderDirective::ReverseChronological)),
            "[a-z]{1,8}".prop_map(|token| Some(OrderDirective::from_token(&token))),
        ]
    }

    fn node() -> impl Strategy<Value = SelectionNode> {
        let leaf = (name(), order()).prop_map(|(name, order)| SelectionNode {
            name,
            children: None,
            order,
        });
        leaf.prop_recursive(4, 32, 4, |inner| {
            (name(), prop::collection::vec(inner, 1..4), order()).prop_map(
                |(name, children, order)| SelectionNode {
                    name,
                    children: Some(children),
                    order,
                },
            )
        })
    }

    proptest! {
        #[test]
        fn prop_render_parse_roundtrip(nodes in prop::collection::vec(node(), 1..4)) {
            let rendered = render(&nodes);
            let parsed = parse(&rendered).unwrap();
            prop_assert_eq!(parsed, nodes);
        }

        #[test]
        fn prop_parse_never_panics(input in "[a-z{},.() ]{0,24}") {
            let _ = parse(&input);
        }
    }
}
