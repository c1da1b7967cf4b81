//! Expression trees and their layout.
//!
//! Layout is deterministic: a group is written on one line when it fits the
//! width budget for its delimiter, otherwise one item per line with a
//! trailing comma. A call whose only argument is block-like keeps the block
//! attached to the call (`Some(Dog {` ... `})`).

/// Maximum line width
pub const MAX_WIDTH: usize = 100;

const INDENT: usize = 4;
const STRUCT_LIT_WIDTH: usize = 18;
const CALL_WIDTH: usize = 60;
const ARRAY_WIDTH: usize = 60;
const REST: &str = "..Default::default()";

/// Delimiters of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    /// `head(a, b)`
    Paren,
    /// `(a, b)`, with `(a,)` for one element
    Tuple,
    /// `head[a, b]`
    Bracket,
    /// `head { a: 1 }`
    Brace,
}

impl Delim {
    fn open_flat(self, empty: bool) -> &'static str {
        match self {
            Self::Paren | Self::Tuple => "(",
            Self::Bracket => "[",
            Self::Brace if empty => " {",
            Self::Brace => " { ",
        }
    }

    fn close_flat(self, empty: bool) -> &'static str {
        match self {
            Self::Paren | Self::Tuple => ")",
            Self::Bracket => "]",
            Self::Brace if empty => "}",
            Self::Brace => " }",
        }
    }

    fn open_broken(self) -> &'static str {
        match self {
            Self::Paren | Self::Tuple => "(",
            Self::Bracket => "[",
            Self::Brace => " {",
        }
    }

    fn close_broken(self) -> &'static str {
        match self {
            Self::Paren | Self::Tuple => ")",
            Self::Bracket => "]",
            Self::Brace => "}",
        }
    }

    fn width_limit(self) -> usize {
        match self {
            Self::Paren | Self::Tuple => CALL_WIDTH,
            Self::Bracket => ARRAY_WIDTH,
            Self::Brace => STRUCT_LIT_WIDTH,
        }
    }
}

/// Item inside a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// Positional expression
    Value(Expr),
    /// `name: expr`
    Field(String, Expr),
    /// `..Default::default()`
    Rest,
}

impl Item {
    fn flat(&self) -> Option<String> {
        match self {
            Self::Value(expr) => expr.flat(),
            Self::Field(name, expr) => expr.flat().map(|flat| format!("{name}: {flat}")),
            Self::Rest => Some(REST.to_string()),
        }
    }

    fn write(&self, out: &mut String, indent: usize, reserve: usize) {
        match self {
            Self::Value(expr) => expr.write(out, indent, reserve),
            Self::Field(name, expr) => {
                out.push_str(name);
                out.push_str(": ");
                expr.write(out, indent, reserve);
            }
            Self::Rest => out.push_str(REST),
        }
    }
}

/// Delimited list of items after a head (`Some(..)`, `vec![..]`, `Dog { .. }`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    head: String,
    delim: Delim,
    items: Vec<Item>,
}

impl Group {
    fn contents(&self) -> Option<String> {
        let mut parts = Vec::with_capacity(self.items.len());
        for item in &self.items {
            parts.push(item.flat()?);
        }
        let mut joined = parts.join(", ");
        if self.delim == Delim::Tuple && self.items.len() == 1 {
            joined.push(',');
        }
        Some(joined)
    }

    fn flat(&self) -> Option<String> {
        let contents = self.contents()?;
        if contents.len() > self.delim.width_limit() {
            return None;
        }
        let empty = self.items.is_empty();
        Some(format!(
            "{}{}{}{}",
            self.head,
            self.delim.open_flat(empty),
            contents,
            self.delim.close_flat(empty)
        ))
    }

    fn is_block(&self) -> bool {
        match self.delim {
            Delim::Brace | Delim::Bracket => !self.items.is_empty(),
            Delim::Paren => self.overflow_item().is_some(),
            Delim::Tuple => false,
        }
    }

    fn overflow_item(&self) -> Option<&Expr> {
        match self.items.as_slice() {
            [Item::Value(expr)] if self.delim == Delim::Paren && expr.is_block() => Some(expr),
            _ => None,
        }
    }

    fn write(&self, out: &mut String, indent: usize, reserve: usize) {
        if let Some(flat) = self.flat() {
            if current_column(out) + flat.len() + reserve <= MAX_WIDTH {
                out.push_str(&flat);
                return;
            }
        }

        if let Some(expr) = self.overflow_item() {
            out.push_str(&self.head);
            out.push('(');
            expr.write(out, indent, reserve + 1);
            out.push(')');
            return;
        }

        out.push_str(&self.head);
        out.push_str(self.delim.open_broken());
        for item in &self.items {
            newline(out, indent + INDENT);
            item.write(out, indent + INDENT, 1);
            if *item != Item::Rest {
                out.push(',');
            }
        }
        newline(out, indent);
        out.push_str(self.delim.close_broken());
    }
}

/// Expression tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Token or pre-rendered text
    Atom(String),
    /// Text followed by an expression (`&[..]`)
    Prefix(String, Box<Expr>),
    /// Expression followed by text (`[..].into()`, `decode(..)?`)
    Suffix(Box<Expr>, String),
    /// Delimited group
    Group(Group),
}

impl Expr {
    /// Atom from text
    pub fn atom(text: impl Into<String>) -> Self {
        Self::Atom(text.into())
    }

    /// `head(args..)`
    pub fn call(head: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::group(head, Delim::Paren, args.into_iter().map(Item::Value).collect())
    }

    /// `(a, b)`
    #[must_use]
    pub fn tuple(elems: Vec<Expr>) -> Self {
        Self::group("", Delim::Tuple, elems.into_iter().map(Item::Value).collect())
    }

    /// `head[a, b]`, e.g. `vec![..]` or a bare `[..]`
    pub fn list(head: impl Into<String>, elems: Vec<Expr>) -> Self {
        Self::group(head, Delim::Bracket, elems.into_iter().map(Item::Value).collect())
    }

    /// `head { field: value, .. }`
    pub fn structure(head: impl Into<String>, fields: Vec<(String, Expr)>, rest: bool) -> Self {
        let mut items: Vec<Item> = fields
            .into_iter()
            .map(|(name, expr)| Item::Field(name, expr))
            .collect();
        if rest {
            items.push(Item::Rest);
        }
        Self::group(head, Delim::Brace, items)
    }

    /// Generic group constructor
    pub fn group(head: impl Into<String>, delim: Delim, items: Vec<Item>) -> Self {
        Self::Group(Group {
            head: head.into(),
            delim,
            items,
        })
    }

    /// Append text, e.g. `.into()`
    #[must_use]
    pub fn suffixed(self, suffix: impl Into<String>) -> Self {
        Self::Suffix(Box::new(self), suffix.into())
    }

    /// Prepend text, e.g. `&`
    #[must_use]
    pub fn prefixed(self, prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into(), Box::new(self))
    }

    /// Single-line rendering, if the expression has one
    #[must_use]
    pub fn flat(&self) -> Option<String> {
        match self {
            Self::Atom(text) => (!text.contains('\n')).then(|| text.clone()),
            Self::Prefix(prefix, expr) => expr.flat().map(|flat| format!("{prefix}{flat}")),
            Self::Suffix(expr, suffix) => expr.flat().map(|flat| format!("{flat}{suffix}")),
            Self::Group(group) => group.flat(),
        }
    }

    /// Render starting at column zero
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, 0, 0);
        out
    }

    /// Append the rendering to `out`
    ///
    /// `indent` is the indentation of the line the expression starts on and
    /// `reserve` the width of text that will follow it on its last line.
    pub fn write(&self, out: &mut String, indent: usize, reserve: usize) {
        match self {
            Self::Atom(text) => out.push_str(text),
            Self::Prefix(prefix, expr) => {
                out.push_str(prefix);
                expr.write(out, indent, reserve);
            }
            Self::Suffix(expr, suffix) => {
                expr.write(out, indent, reserve + suffix.len());
                out.push_str(suffix);
            }
            Self::Group(group) => group.write(out, indent, reserve),
        }
    }

    fn is_block(&self) -> bool {
        match self {
            Self::Atom(_) => false,
            Self::Prefix(_, expr) | Self::Suffix(expr, _) => expr.is_block(),
            Self::Group(group) => group.is_block(),
        }
    }
}

fn current_column(out: &str) -> usize {
    match out.rfind('\n') {
        Some(pos) => out.len() - pos - 1,
        None => out.len(),
    }
}

fn newline(out: &mut String, indent: usize) {
    out.push('\n');
    out.extend(std::iter::repeat_n(' ', indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn into(text: &str) -> Expr {
        Expr::atom(format!("{text:?}.into()"))
    }

    #[test]
    fn test_short_struct_is_flat() {
        let expr = Expr::structure("Dog", vec![("age".to_string(), Expr::atom("9"))], false);
        assert_eq!(expr.render(), "Dog { age: 9 }");
        assert_eq!(Expr::structure("Unit", vec![], false).render(), "Unit {}");
    }

    #[test]
    fn test_long_struct_breaks_with_rest() {
        let expr = Expr::structure(
            "crate::Dog",
            vec![
                ("name".to_string(), into("Lido")),
                ("breed".to_string(), into("Terrier")),
            ],
            true,
        );
        assert_eq!(
            expr.render(),
            "crate::Dog {\n    name: \"Lido\".into(),\n    breed: \"Terrier\".into(),\n    ..Default::default()\n}"
        );
    }

    #[test]
    fn test_single_block_argument_overflows() {
        let inner = Expr::structure(
            "Dog",
            vec![("name".to_string(), into("Lido")), ("age".to_string(), Expr::atom("9"))],
            false,
        );
        let expr = Expr::call("Some", vec![inner]);
        assert_eq!(
            expr.render(),
            "Some(Dog {\n    name: \"Lido\".into(),\n    age: 9,\n})"
        );
    }

    #[test]
    fn test_tuple_single_element() {
        assert_eq!(Expr::tuple(vec![Expr::atom("1u8")]).render(), "(1u8,)");
        assert_eq!(Expr::tuple(vec![]).render(), "()");
    }

    #[test]
    fn test_list_breaks_past_array_width() {
        let items: Vec<Expr> = (0..20).map(|i| Expr::atom(format!("{i}u64"))).collect();
        let rendered = Expr::list("vec!", items).render();
        assert!(rendered.starts_with("vec![\n    0u64,\n"));
        assert!(rendered.ends_with("    19u64,\n]"));
    }

    #[test]
    fn test_multiline_atom_forces_break() {
        let raw = Expr::atom("r#\"a\nb\"#.into()");
        let expr = Expr::structure("Note", vec![("text".to_string(), raw)], false);
        assert_eq!(expr.render(), "Note {\n    text: r#\"a\nb\"#.into(),\n}");
    }

    #[test]
    fn test_suffix_reserves_width() {
        let elems: Vec<Expr> = (0..4).map(|i| Expr::atom(format!("{i}"))).collect();
        let expr = Expr::list("", elems).suffixed(".into()");
        assert_eq!(expr.render(), "[0, 1, 2, 3].into()");
        assert_eq!(expr.flat().as_deref(), Some("[0, 1, 2, 3].into()"));
    }
}
