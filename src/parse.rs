//! Auxiliary constituency parse and syntactic head finding.
//!
//! Relaxed alignment compares the syntactic head token of a system base filler
//! with the heads of gold mentions. The alignment engine only needs the
//! [`HeadFinder`] capability, so tests can stub it with a fixed table; the
//! production implementation is [`ParsedDocument`], a constituency parse with
//! character spans on every node, headed by Collins-style English Penn
//! Treebank rules.
//!
//! ```text
//! (S (NP (DT The) (JJ rebel) (NN army))
//!    (VP (VBD attacked) (NP (DT the) (NN base))))
//!
//! head_token("The rebel army")  -> "army"
//! head_token("the base")        -> "base"
//! head_token(whole sentence)    -> "attacked"
//! ```

use crate::offset::CharSpan;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A token identified by its position in the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token {
    /// Sentence index within the document
    pub sentence: usize,
    /// Token index within the sentence
    pub index: usize,
    /// Character span of the token
    pub span: CharSpan,
}

/// How a span is located in the parse before its head is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadLookup {
    /// Only a constituent with exactly these offsets qualifies.
    Exact,
    /// The smallest constituent covering the offsets.
    #[default]
    Covering,
}

/// Computes the syntactic head token of an arbitrary character span.
pub trait HeadFinder {
    /// Head token of `span`, or `None` if the parse has no suitable constituent.
    fn head_token(&self, span: CharSpan, lookup: HeadLookup) -> Option<Token>;
}

impl<H: HeadFinder + ?Sized> HeadFinder for &H {
    fn head_token(&self, span: CharSpan, lookup: HeadLookup) -> Option<Token> {
        (**self).head_token(span, lookup)
    }
}

/// A constituency parse node. Nodes without children are tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseNode {
    /// Phrase label, POS tag, or word
    pub label: String,
    /// Character span covered by this node
    pub span: CharSpan,
    /// Child nodes, left to right
    #[serde(default)]
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    /// Create a leaf (token) node.
    #[must_use]
    pub fn leaf(label: impl Into<String>, span: CharSpan) -> Self {
        Self {
            label: label.into(),
            span,
            children: Vec::new(),
        }
    }

    /// Create an internal node spanning its children.
    #[must_use]
    pub fn phrase(label: impl Into<String>, children: Vec<ParseNode>) -> Self {
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => CharSpan::new(first.span.start, last.span.end),
            _ => CharSpan::new(0, 0),
        };
        Self {
            label: label.into(),
            span,
            children,
        }
    }

    /// Whether this node is a token.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn leaves<'a>(&'a self, out: &mut Vec<&'a ParseNode>) {
        if self.is_leaf() {
            out.push(self);
        } else {
            for child in &self.children {
                child.leaves(out);
            }
        }
    }

    /// First node in pre-order whose span is exactly `span`.
    fn find_exact(&self, span: CharSpan) -> Option<&ParseNode> {
        if self.span == span {
            return Some(self);
        }
        if !self.span.contains(&span) {
            return None;
        }
        self.children.iter().find_map(|child| child.find_exact(span))
    }

    /// Deepest node whose span covers `span`.
    fn find_covering(&self, span: CharSpan) -> Option<&ParseNode> {
        if !self.span.contains(&span) {
            return None;
        }
        let mut node = self;
        while let Some(child) = node.children.iter().find(|c| c.span.contains(&span)) {
            node = child;
        }
        Some(node)
    }

    /// Descend through head children to the head leaf.
    fn head_leaf(&self, rules: &HeadRules) -> &ParseNode {
        let mut node = self;
        while !node.is_leaf() {
            node = &node.children[rules.head_child(node)];
        }
        node
    }
}

/// A parsed document: one tree per sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Document identifier
    pub doc_id: String,
    /// Sentence trees in document order
    pub sentences: Vec<ParseNode>,
}

impl ParsedDocument {
    /// Create a parsed document.
    #[must_use]
    pub fn new(doc_id: impl Into<String>, sentences: Vec<ParseNode>) -> Self {
        Self {
            doc_id: doc_id.into(),
            sentences,
        }
    }

    /// Load a parse serialized as JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_input(format!("cannot read parse {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl HeadFinder for ParsedDocument {
    fn head_token(&self, span: CharSpan, lookup: HeadLookup) -> Option<Token> {
        self.sentences
            .iter()
            .enumerate()
            .find_map(|(sentence, tree)| {
                let node = match lookup {
                    HeadLookup::Exact => tree.find_exact(span),
                    HeadLookup::Covering => tree.find_covering(span),
                }?;
                let head = node.head_leaf(&ENGLISH_PTB);
                let mut leaves = Vec::new();
                tree.leaves(&mut leaves);
                let index = leaves.iter().position(|leaf| std::ptr::eq(*leaf, head))?;
                Some(Token {
                    sentence,
                    index,
                    span: head.span,
                })
            })
    }
}

// =============================================================================
// Head Rules
// =============================================================================

static ENGLISH_PTB: Lazy<HeadRules> = Lazy::new(HeadRules::english_ptb);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Scan children left to right.
    Left,
    /// Scan children right to left.
    Right,
}

#[derive(Debug, Clone)]
enum Rule {
    /// For each category in priority order, the first child with that label.
    Priority(Direction, &'static [&'static str]),
    /// The first child whose label is any of the categories.
    AnyOf(Direction, &'static [&'static str]),
    /// The last child, if its label is the category.
    LastIs(&'static str),
}

/// Head-percolation table keyed by phrase label.
#[derive(Debug, Clone)]
pub struct HeadRules {
    rules: HashMap<&'static str, (Vec<Rule>, Direction)>,
}

impl HeadRules {
    /// Collins (1999) head rules for English Penn Treebank trees.
    #[must_use]
    pub fn english_ptb() -> Self {
        use Direction::{Left, Right};
        use Rule::{AnyOf, LastIs, Priority};

        let mut rules = HashMap::new();
        let mut add = |label: &'static str, direction: Direction, list: &'static [&'static str]| {
            rules.insert(label, (vec![Priority(direction, list)], direction));
        };

        add(
            "ADJP",
            Left,
            &[
                "NNS", "QP", "NN", "$", "ADVP", "JJ", "VBN", "VBG", "ADJP", "JJR", "NP", "JJS",
                "DT", "FW", "RBR", "RBS", "SBAR", "RB",
            ],
        );
        add(
            "ADVP",
            Right,
            &[
                "RB", "RBR", "RBS", "FW", "ADVP", "TO", "CD", "JJR", "JJ", "IN", "NP", "JJS", "NN",
            ],
        );
        add("CONJP", Right, &["CC", "RB", "IN"]);
        add("FRAG", Right, &[]);
        add("INTJ", Left, &[]);
        add("LST", Right, &["LS", ":"]);
        add(
            "NAC",
            Left,
            &[
                "NN", "NNS", "NNP", "NNPS", "NP", "NAC", "EX", "$", "CD", "QP", "PRP", "VBG", "JJ",
                "JJS", "JJR", "ADJP", "FW",
            ],
        );
        add("PP", Left, &["IN", "TO", "VBG", "VBN", "RP", "FW"]);
        add("PRN", Left, &[]);
        add("PRT", Right, &["RP"]);
        add(
            "QP",
            Left,
            &[
                "$", "IN", "NNS", "NN", "JJ", "RB", "DT", "CD", "NCD", "QP", "JJR", "JJS",
            ],
        );
        add("RRC", Right, &["VP", "NP", "ADVP", "ADJP", "PP"]);
        add("S", Left, &["TO", "IN", "VP", "S", "SBAR", "ADJP", "UCP", "NP"]);
        add(
            "SBAR",
            Left,
            &[
                "WHNP", "WHPP", "WHADVP", "WHADJP", "IN", "DT", "S", "SQ", "SINV", "SBAR", "FRAG",
            ],
        );
        add("SBARQ", Left, &["SQ", "S", "SINV", "SBARQ", "FRAG"]);
        add("SINV", Left, &["VBZ", "VBD", "VBP", "VB", "MD", "VP", "S", "SINV", "ADJP", "NP"]);
        add("SQ", Left, &["VBZ", "VBD", "VBP", "VB", "MD", "VP", "SQ"]);
        add("UCP", Right, &[]);
        add(
            "VP",
            Left,
            &[
                "TO", "VBD", "VBN", "MD", "VBZ", "VB", "VBG", "VBP", "VP", "ADJP", "NN", "NNS",
                "NP",
            ],
        );
        add("WHADJP", Left, &["CC", "WRB", "JJ", "ADJP"]);
        add("WHADVP", Right, &["CC", "WRB"]);
        add("WHNP", Left, &["WDT", "WP", "WP$", "WHADJP", "WHPP", "WHNP"]);
        add("WHPP", Right, &["IN", "TO", "FW"]);

        let np = vec![
            LastIs("POS"),
            AnyOf(Right, &["NN", "NNP", "NNPS", "NNS", "NX", "POS", "JJR"]),
            AnyOf(Left, &["NP"]),
            AnyOf(Right, &["$", "ADJP", "PRN"]),
            AnyOf(Right, &["CD"]),
            AnyOf(Right, &["JJ", "JJS", "RB", "QP"]),
        ];
        rules.insert("NP", (np.clone(), Right));
        rules.insert("NX", (np, Right));

        Self { rules }
    }

    /// Index of the head child of an internal node.
    fn head_child(&self, node: &ParseNode) -> usize {
        let children = &node.children;
        if children.len() == 1 {
            return 0;
        }
        let Some((rules, fallback)) = self.rules.get(base_label(&node.label)) else {
            return 0;
        };
        let labels: Vec<&str> = children.iter().map(|c| base_label(&c.label)).collect();
        let ordered = |direction: Direction| -> Vec<usize> {
            match direction {
                Direction::Left => (0..labels.len()).collect(),
                Direction::Right => (0..labels.len()).rev().collect(),
            }
        };

        for rule in rules {
            let found = match rule {
                Rule::Priority(direction, categories) => categories.iter().find_map(|category| {
                    ordered(*direction)
                        .into_iter()
                        .find(|&i| labels[i] == *category)
                }),
                Rule::AnyOf(direction, categories) => ordered(*direction)
                    .into_iter()
                    .find(|&i| categories.contains(&labels[i])),
                Rule::LastIs(category) => {
                    let last = labels.len() - 1;
                    (labels[last] == *category).then_some(last)
                }
            };
            if let Some(index) = found {
                return index;
            }
        }

        match fallback {
            Direction::Left => 0,
            Direction::Right => children.len() - 1,
        }
    }
}

/// Strip function tags and indices: `NP-SBJ-1` -> `NP`.
fn base_label(label: &str) -> &str {
    if label.starts_with('-') {
        return label;
    }
    label
        .split(|c| c == '-' || c == '=')
        .next()
        .unwrap_or(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(tag: &str, start: usize, end: usize) -> ParseNode {
        ParseNode::phrase(tag, vec![ParseNode::leaf("w", CharSpan::new(start, end))])
    }

    /// "The rebel army attacked the base"
    fn sentence() -> ParseNode {
        ParseNode::phrase(
            "S",
            vec![
                ParseNode::phrase(
                    "NP-SBJ",
                    vec![word("DT", 0, 3), word("JJ", 4, 9), word("NN", 10, 14)],
                ),
                ParseNode::phrase(
                    "VP",
                    vec![
                        word("VBD", 15, 23),
                        ParseNode::phrase("NP", vec![word("DT", 24, 27), word("NN", 28, 32)]),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn test_np_head_is_rightmost_noun() {
        let doc = ParsedDocument::new("d1", vec![sentence()]);
        let head = doc
            .head_token(CharSpan::new(0, 14), HeadLookup::Exact)
            .unwrap();
        assert_eq!(head.span, CharSpan::new(10, 14));
        assert_eq!(head.index, 2);
    }

    #[test]
    fn test_sentence_head_is_verb() {
        let doc = ParsedDocument::new("d1", vec![sentence()]);
        let head = doc
            .head_token(CharSpan::new(0, 32), HeadLookup::Exact)
            .unwrap();
        assert_eq!(head.span, CharSpan::new(15, 23));
    }

    #[test]
    fn test_exact_lookup_rejects_non_constituent() {
        let doc = ParsedDocument::new("d1", vec![sentence()]);
        // "rebel army" is not a constituent
        assert!(doc
            .head_token(CharSpan::new(4, 14), HeadLookup::Exact)
            .is_none());
        let covering = doc
            .head_token(CharSpan::new(4, 14), HeadLookup::Covering)
            .unwrap();
        assert_eq!(covering.span, CharSpan::new(10, 14));
    }

    #[test]
    fn test_span_outside_parse() {
        let doc = ParsedDocument::new("d1", vec![sentence()]);
        assert!(doc
            .head_token(CharSpan::new(100, 110), HeadLookup::Covering)
            .is_none());
    }

    #[test]
    fn test_possessive_np_head() {
        let rules = HeadRules::english_ptb();
        let np = ParseNode::phrase("NP", vec![word("NNP", 0, 4), word("POS", 4, 6)]);
        assert_eq!(rules.head_child(&np), 1);
    }

    #[test]
    fn test_base_label() {
        assert_eq!(base_label("NP-SBJ-1"), "NP");
        assert_eq!(base_label("PP=2"), "PP");
        assert_eq!(base_label("-NONE-"), "-NONE-");
    }
}
