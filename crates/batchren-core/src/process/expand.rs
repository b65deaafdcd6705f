//! `$(attribute)` and `$[shell]` expressions embedded in target names.

use std::path::Path;

use serde::Serialize;

use super::attr::AttributeSource;
use super::shell::ShellRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    /// `$(name)`: an extended attribute of the source entry.
    Attribute,
    /// `$[script]`: the output of a shell command.
    Shell,
}

impl ExpressionKind {
    fn from_open(open: u8) -> Option<Self> {
        match open {
            b'(' => Some(Self::Attribute),
            b'[' => Some(Self::Shell),
            _ => None,
        }
    }

    fn delimiters(self) -> (u8, u8) {
        match self {
            Self::Attribute => (b'(', b')'),
            Self::Shell => (b'[', b']'),
        }
    }
}

/// One well-formed expression found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub kind: ExpressionKind,
    /// Byte offset of the `$`.
    pub start: usize,
    /// Byte offset one past the closing delimiter.
    pub end: usize,
    pub body: String,
}

/// A substitution applied to a target name.
///
/// `from..to` is the range the expression occupied, expressed in the
/// coordinates of the partially expanded name (earlier edits already
/// applied), so edits can be replayed in order on a copy of the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub from: usize,
    pub to: usize,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub expanded: String,
    pub edits: Vec<Edit>,
}

/// Finds every `$(...)` and `$[...]` in `template`, left to right.
///
/// Nested delimiters of the same kind are balanced. Unterminated or empty
/// expressions are skipped and stay literal.
pub fn scan_expressions(template: &str) -> Vec<Expression> {
    let bytes = template.as_bytes();
    let mut expressions = Vec::new();
    let mut index = 0;

    while index + 3 < bytes.len() {
        let kind = (bytes[index] == b'$')
            .then(|| ExpressionKind::from_open(bytes[index + 1]))
            .flatten();
        let body_start = index + 2;
        let body_len = kind.and_then(|kind| closing_offset(&bytes[body_start..], kind));

        match (kind, body_len) {
            (Some(kind), Some(body_len)) if body_len > 0 => {
                let end = body_start + body_len + 1;
                expressions.push(Expression {
                    kind,
                    start: index,
                    end,
                    body: template[body_start..body_start + body_len].to_string(),
                });
                index = end;
            }
            _ => index += 1,
        }
    }

    expressions
}

/// Offset of the delimiter closing an expression whose body starts `bytes`.
fn closing_offset(bytes: &[u8], kind: ExpressionKind) -> Option<usize> {
    let (open, close) = kind.delimiters();
    let mut depth = 0usize;
    for (offset, &byte) in bytes.iter().enumerate() {
        if byte == open {
            depth += 1;
        } else if byte == close {
            if depth == 0 {
                return Some(offset);
            }
            depth -= 1;
        }
    }
    None
}

/// Evaluates every expression in `template` for the entry at `source`.
///
/// Failures (missing attribute, failing command) substitute empty text.
pub fn expand(
    template: &str,
    source: &Path,
    attributes: &dyn AttributeSource,
    shell: &ShellRunner,
) -> Expansion {
    let mut expanded = String::with_capacity(template.len());
    let mut edits = Vec::new();
    let mut cursor = 0;

    for expression in scan_expressions(template) {
        let replacement = match expression.kind {
            ExpressionKind::Attribute => attributes
                .read(source, &expression.body)
                .map(|value| value.render())
                .unwrap_or_default(),
            ExpressionKind::Shell => shell.run(&expression.body, source),
        };

        expanded.push_str(&template[cursor..expression.start]);
        let from = expanded.len();
        edits.push(Edit {
            from,
            to: from + (expression.end - expression.start),
            replacement: replacement.clone(),
        });
        expanded.push_str(&replacement);
        cursor = expression.end;
    }
    expanded.push_str(&template[cursor..]);

    Expansion { expanded, edits }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::attr::AttributeValue;
    use std::collections::HashMap;

    struct FakeAttributes(HashMap<&'static str, AttributeValue>);

    impl AttributeSource for FakeAttributes {
        fn read(&self, _path: &Path, name: &str) -> Option<AttributeValue> {
            self.0.get(name).cloned()
        }
    }

    fn attributes() -> FakeAttributes {
        FakeAttributes(HashMap::from([
            ("artist", AttributeValue::String("Queen".to_string())),
            ("track", AttributeValue::Int32(7)),
        ]))
    }

    fn bodies(template: &str) -> Vec<(ExpressionKind, String)> {
        scan_expressions(template)
            .into_iter()
            .map(|e| (e.kind, e.body))
            .collect()
    }

    #[test]
    fn scans_both_kinds() {
        let found = scan_expressions("$(artist) - $[echo hi]");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, ExpressionKind::Attribute);
        assert_eq!((found[0].start, found[0].end), (0, 9));
        assert_eq!(found[0].body, "artist");
        assert_eq!(found[1].kind, ExpressionKind::Shell);
        assert_eq!((found[1].start, found[1].end), (12, 22));
        assert_eq!(found[1].body, "echo hi");
    }

    #[test]
    fn nested_delimiters_are_balanced() {
        assert_eq!(
            bodies("x$[echo $[a] b]y"),
            vec![(ExpressionKind::Shell, "echo $[a] b".to_string())]
        );
        assert_eq!(
            bodies("$(a(b)c)"),
            vec![(ExpressionKind::Attribute, "a(b)c".to_string())]
        );
    }

    #[test]
    fn other_delimiter_does_not_nest() {
        assert_eq!(
            bodies("$[echo )]"),
            vec![(ExpressionKind::Shell, "echo )".to_string())]
        );
    }

    #[test]
    fn unterminated_and_empty_expressions_are_literal() {
        assert!(scan_expressions("$(artist").is_empty());
        assert!(scan_expressions("$()").is_empty());
        assert!(scan_expressions("a $() b").is_empty());
        assert!(scan_expressions("$ (a)").is_empty());
        assert!(scan_expressions("price $5").is_empty());
    }

    #[test]
    fn inner_expression_of_unterminated_outer_one_is_found() {
        assert_eq!(
            bodies("$[echo $[x]"),
            vec![(ExpressionKind::Shell, "x".to_string())]
        );
    }

    #[test]
    fn shortest_expression_at_end_is_found() {
        assert_eq!(
            bodies("x$(a)"),
            vec![(ExpressionKind::Attribute, "a".to_string())]
        );
    }

    #[test]
    fn multibyte_text_around_expressions() {
        let found = scan_expressions("日本 $(曲名).mp3");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].body, "曲名");
        assert_eq!(found[0].start, 7);
    }

    #[test]
    fn expansion_reports_shifted_offsets() {
        let expansion = expand(
            "$(artist) - $[echo hi]",
            Path::new("/tmp/song.mp3"),
            &attributes(),
            &ShellRunner::default(),
        );
        assert_eq!(expansion.expanded, "Queen - hi");
        assert_eq!(
            expansion.edits,
            vec![
                Edit {
                    from: 0,
                    to: 9,
                    replacement: "Queen".to_string(),
                },
                Edit {
                    from: 8,
                    to: 18,
                    replacement: "hi".to_string(),
                },
            ]
        );
    }

    #[test]
    fn missing_attribute_expands_to_nothing() {
        let expansion = expand(
            "$(album)-$(track).ogg",
            Path::new("/tmp/a.ogg"),
            &attributes(),
            &ShellRunner::default(),
        );
        assert_eq!(expansion.expanded, "-7.ogg");
        assert_eq!(expansion.edits[0].replacement, "");
        assert_eq!((expansion.edits[1].from, expansion.edits[1].to), (1, 9));
    }

    #[test]
    fn template_without_expressions_is_untouched() {
        let expansion = expand(
            "plain.txt",
            Path::new("/tmp/a"),
            &attributes(),
            &ShellRunner::default(),
        );
        assert_eq!(expansion.expanded, "plain.txt");
        assert!(expansion.edits.is_empty());
    }

    #[test]
    fn replaying_edits_reproduces_expansion() {
        let template = "[$(track)] $(artist) $[printf x]!";
        let expansion = expand(
            template,
            Path::new("/tmp/a"),
            &attributes(),
            &ShellRunner::default(),
        );
        let mut patched = template.to_string();
        for edit in &expansion.edits {
            patched.replace_range(edit.from..edit.to, &edit.replacement);
        }
        assert_eq!(patched, expansion.expanded);
        assert_eq!(patched, "[7] Queen x!");
    }
}
