//! The CSS selector subset understood by [`super::memory::MemoryDocument`]:
//! type, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`, compound
//! selectors, the descendant combinator and comma-separated lists.

/// Element-side view the matcher needs.
pub(crate) trait Subject: Copy {
    fn tag(&self) -> &str;
    fn attr(&self, name: &str) -> Option<&str>;
    fn parent(&self) -> Option<Self>;

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectorList(Vec<Complex>);

/// Compounds from left to right, joined by descendant combinators.
#[derive(Debug, Clone, PartialEq)]
struct Complex(Vec<Compound>);

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl SelectorList {
    /// `None` when the selector uses syntax outside the supported subset.
    pub(crate) fn parse(input: &str) -> Option<Self> {
        let list = input
            .split(',')
            .map(parse_complex)
            .collect::<Option<Vec<_>>>()?;
        Some(Self(list))
    }

    pub(crate) fn matches<S: Subject>(&self, subject: S) -> bool {
        self.0.iter().any(|complex| complex.matches(subject))
    }
}

impl Complex {
    fn matches<S: Subject>(&self, subject: S) -> bool {
        let Some((last, ancestors)) = self.0.split_last() else {
            return false;
        };
        if !last.matches(subject) {
            return false;
        }
        // Descendant-only chains can be matched greedily against the
        // nearest qualifying ancestor.
        let mut cursor = subject.parent();
        for compound in ancestors.iter().rev() {
            loop {
                let Some(node) = cursor else {
                    return false;
                };
                cursor = node.parent();
                if compound.matches(node) {
                    break;
                }
            }
        }
        true
    }
}

impl Compound {
    fn matches<S: Subject>(&self, subject: S) -> bool {
        if let Some(tag) = &self.tag
            && !subject.tag().eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && subject.attr("id") != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| subject.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| match value {
            None => subject.attr(name).is_some(),
            Some(expected) => subject.attr(name) == Some(expected.as_str()),
        })
    }
}

fn parse_complex(input: &str) -> Option<Complex> {
    let compounds = input
        .split_ascii_whitespace()
        .map(parse_compound)
        .collect::<Option<Vec<_>>>()?;
    if compounds.is_empty() {
        return None;
    }
    Some(Complex(compounds))
}

fn parse_compound(input: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = input;

    if let Some(stripped) = rest.strip_prefix('*') {
        rest = stripped;
    } else {
        let end = rest.find(['#', '.', '[']).unwrap_or(rest.len());
        if end > 0 {
            let tag = &rest[..end];
            if !is_ident(tag) {
                return None;
            }
            compound.tag = Some(tag.to_ascii_lowercase());
            rest = &rest[end..];
        }
    }

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('#') {
            let end = after.find(['#', '.', '[']).unwrap_or(after.len());
            let id = &after[..end];
            if !is_ident(id) {
                return None;
            }
            compound.id = Some(id.to_string());
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(['#', '.', '[']).unwrap_or(after.len());
            let class = &after[..end];
            if !is_ident(class) {
                return None;
            }
            compound.classes.push(class.to_string());
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = after.find(']')?;
            compound.attrs.push(parse_attr(&after[..end])?);
            rest = &after[end + 1..];
        } else {
            return None;
        }
    }
    Some(compound)
}

fn parse_attr(inner: &str) -> Option<(String, Option<String>)> {
    match inner.split_once('=') {
        None => {
            let name = inner.trim();
            is_ident(name).then(|| (name.to_string(), None))
        }
        Some((name, value)) => {
            let name = name.trim();
            if !is_ident(name) {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Some((name.to_string(), Some(value.to_string())))
        }
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tiny tree: html > body > nav[data-gumshoe] > ul > li.item > a#home
    #[derive(Clone, Copy)]
    struct Node(usize);

    const TREE: &[(&str, Option<usize>, &[(&str, &str)])] = &[
        ("html", None, &[]),
        ("body", Some(0), &[]),
        ("nav", Some(1), &[("data-gumshoe", ""), ("class", "navbar-collapse")]),
        ("ul", Some(2), &[]),
        ("li", Some(3), &[("class", "item first")]),
        ("a", Some(4), &[("id", "home"), ("href", "#top")]),
    ];

    impl Subject for Node {
        fn tag(&self) -> &str {
            TREE[self.0].0
        }

        fn attr(&self, name: &str) -> Option<&str> {
            TREE[self.0]
                .2
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| *v)
        }

        fn parent(&self) -> Option<Self> {
            TREE[self.0].1.map(Node)
        }
    }

    fn matches(selector: &str, node: usize) -> bool {
        SelectorList::parse(selector)
            .map(|s| s.matches(Node(node)))
            .unwrap_or(false)
    }

    #[test]
    fn simple_selectors() {
        assert!(matches("a", 5));
        assert!(matches("#home", 5));
        assert!(matches(".first", 4));
        assert!(matches("[data-gumshoe]", 2));
        assert!(matches("[href=\"#top\"]", 5));
        assert!(matches("*", 0));
        assert!(!matches("li", 5));
    }

    #[test]
    fn compound_and_descendant() {
        assert!(matches("li.item.first", 4));
        assert!(matches("[data-gumshoe] a", 5));
        assert!(matches(".navbar-collapse ul li a", 5));
        assert!(!matches("ul nav a", 5));
    }

    #[test]
    fn selector_lists() {
        assert!(matches("button, a", 5));
        assert!(!matches("button, li", 5));
    }

    #[test]
    fn unsupported_syntax_is_rejected() {
        assert!(SelectorList::parse("ul > li").is_none());
        assert!(SelectorList::parse("a:hover").is_none());
        assert!(SelectorList::parse("").is_none());
    }
}
