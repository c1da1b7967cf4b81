//! Type hints parsed from `std::any::type_name`.
//!
//! `type_name` reports paths as the compiler sees them, which are often
//! private module paths (`alloc::string::String`,
//! `std::collections::hash::map::HashMap`). Parsing normalizes them into
//! paths generated code can name.

use std::fmt;

/// Primitive type names
const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32",
    "u64", "u128", "usize", "f32", "f64",
];

/// Std paths whose defining module is private
const STD_PATHS: &[(&str, &str)] = &[
    ("alloc::string::String", "String"),
    ("alloc::vec::Vec", "Vec"),
    ("alloc::boxed::Box", "Box"),
    ("core::option::Option", "Option"),
    ("core::result::Result", "Result"),
    ("alloc::rc::Rc", "std::rc::Rc"),
    ("alloc::sync::Arc", "std::sync::Arc"),
    ("alloc::borrow::Cow", "std::borrow::Cow"),
    ("std::collections::hash::map::HashMap", "std::collections::HashMap"),
    ("std::collections::hash::set::HashSet", "std::collections::HashSet"),
    ("alloc::collections::btree::map::BTreeMap", "std::collections::BTreeMap"),
    ("alloc::collections::btree::set::BTreeSet", "std::collections::BTreeSet"),
    ("alloc::collections::vec_deque::VecDeque", "std::collections::VecDeque"),
    ("alloc::collections::linked_list::LinkedList", "std::collections::LinkedList"),
    ("alloc::collections::binary_heap::BinaryHeap", "std::collections::BinaryHeap"),
    ("alloc::ffi::c_str::CString", "std::ffi::CString"),
    ("std::ffi::os_str::OsString", "std::ffi::OsString"),
    ("core::num::nonzero::NonZero", "std::num::NonZero"),
    ("core::net::ip_addr::IpAddr", "std::net::IpAddr"),
    ("core::net::ip_addr::Ipv4Addr", "std::net::Ipv4Addr"),
    ("core::net::ip_addr::Ipv6Addr", "std::net::Ipv6Addr"),
    ("std::net::ip_addr::IpAddr", "std::net::IpAddr"),
    ("std::net::ip_addr::Ipv4Addr", "std::net::Ipv4Addr"),
    ("std::net::ip_addr::Ipv6Addr", "std::net::Ipv6Addr"),
    ("core::net::socket_addr::SocketAddr", "std::net::SocketAddr"),
    ("core::net::socket_addr::SocketAddrV4", "std::net::SocketAddrV4"),
    ("core::net::socket_addr::SocketAddrV6", "std::net::SocketAddrV6"),
    ("std::net::socket_addr::SocketAddr", "std::net::SocketAddr"),
];

/// Pointer types rendered through the `ptr` helper
const POINTERS: &[&str] = &["Box", "std::rc::Rc", "std::sync::Arc"];

/// How paths of the crate under test are rewritten
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathRules {
    crate_name: Option<String>,
}

impl PathRules {
    /// Create rules, optionally naming the crate whose paths become `crate::`
    #[must_use]
    pub fn new(crate_name: Option<&str>) -> Self {
        Self {
            crate_name: crate_name.map(|name| name.replace('-', "_")),
        }
    }

    fn normalize(&self, raw: &str) -> String {
        if let Some((_, public)) = STD_PATHS.iter().find(|(private, _)| *private == raw) {
            return (*public).to_string();
        }
        let segments: Vec<&str> = raw.split("::").collect();
        let Some((first, rest)) = segments.split_first() else {
            return raw.to_string();
        };
        if rest.is_empty() {
            return raw.to_string();
        }
        match *first {
            "core" | "alloc" | "std" => format!("std::{}", rest.join("::")),
            krate if Some(krate) == self.crate_name.as_deref() => {
                format!("crate::{}", rest.join("::"))
            }
            // Third-party crates re-export their public types at the root.
            krate => match rest.last() {
                Some(last) => format!("{krate}::{last}"),
                None => raw.to_string(),
            },
        }
    }
}

/// A parsed, normalized type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Named type with generic arguments
    Path {
        /// Normalized path
        path: String,
        /// Generic arguments
        args: Vec<TypeExpr>,
    },
    /// Reference
    Ref {
        /// Whether the reference is `&mut`
        mutable: bool,
        /// Referenced type
        inner: Box<TypeExpr>,
    },
    /// Tuple, including `()`
    Tuple(Vec<TypeExpr>),
    /// Fixed-size array
    Array {
        /// Element type
        elem: Box<TypeExpr>,
        /// Length
        len: usize,
    },
    /// Slice
    Slice(Box<TypeExpr>),
}

impl TypeExpr {
    /// Parse a `type_name` string
    ///
    /// Returns `None` for types generated code cannot name (closures,
    /// trait objects, function pointers, qualified paths).
    #[must_use]
    pub fn parse(raw: &str, rules: &PathRules) -> Option<Self> {
        let mut parser = Parser {
            tokens: tokenize(raw)?,
            pos: 0,
            rules,
        };
        let ty = parser.parse_type()?;
        if parser.pos == parser.tokens.len() {
            Some(ty)
        } else {
            None
        }
    }

    /// Path of a named type
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Path { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Generic argument at `index`
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&TypeExpr> {
        match self {
            Self::Path { args, .. } => args.get(index),
            _ => None,
        }
    }

    /// Last path segment
    #[must_use]
    pub fn last_segment(&self) -> Option<&str> {
        self.path().and_then(|path| path.rsplit("::").next())
    }

    /// Name of a primitive type
    #[must_use]
    pub fn primitive(&self) -> Option<&str> {
        self.path().filter(|path| PRIMITIVES.contains(path))
    }

    /// Check for a named type at `path`
    #[must_use]
    pub fn is(&self, path: &str) -> bool {
        self.path() == Some(path)
    }

    /// Check for `Box`, `Rc` or `Arc`
    #[must_use]
    pub fn is_pointer(&self) -> bool {
        self.path().is_some_and(|path| POINTERS.contains(&path))
    }

    /// Check for `Vec<u8>`
    #[must_use]
    pub fn is_byte_vec(&self) -> bool {
        self.is("Vec") && self.arg(0).is_some_and(|arg| arg.is("u8"))
    }

    /// Element type of a sequence-like type
    #[must_use]
    pub fn element(&self) -> Option<&TypeExpr> {
        match self {
            Self::Array { elem, .. } | Self::Slice(elem) => Some(elem),
            Self::Path { args, .. } if args.len() == 1 => args.first(),
            _ => None,
        }
    }

    /// Key and value types of a map-like type
    #[must_use]
    pub fn entry(&self) -> Option<(&TypeExpr, &TypeExpr)> {
        match self {
            Self::Path { args, .. } if args.len() >= 2 => Some((&args[0], &args[1])),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path { path, args } => {
                f.write_str(path)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    write_list(f, args)?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Ref { mutable, inner } => {
                f.write_str(if *mutable { "&mut " } else { "&" })?;
                write!(f, "{inner}")
            }
            Self::Tuple(elems) => {
                f.write_str("(")?;
                write_list(f, elems)?;
                if elems.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Self::Array { elem, len } => write!(f, "[{elem}; {len}]"),
            Self::Slice(elem) => write!(f, "[{elem}]"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeExpr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    PathSep,
    Punct(char),
}

fn tokenize(raw: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ' ' => {}
            ':' => {
                if chars.next() != Some(':') {
                    return None;
                }
                tokens.push(Token::PathSep);
            }
            '<' | '>' | ',' | '(' | ')' | '[' | ']' | ';' | '&' => tokens.push(Token::Punct(c)),
            c if c.is_alphanumeric() || c == '_' => {
                let mut ident = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            _ => return None,
        }
    }
    Some(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    rules: &'a PathRules,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(&Token::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Option<TypeExpr> {
        match self.bump()? {
            Token::Punct('&') => {
                let mutable = matches!(self.peek(), Some(Token::Ident(kw)) if kw == "mut");
                if mutable {
                    self.pos += 1;
                }
                let inner = self.parse_type()?;
                Some(TypeExpr::Ref {
                    mutable,
                    inner: Box::new(inner),
                })
            }
            Token::Punct('(') => {
                let elems = self.parse_list(')')?;
                Some(TypeExpr::Tuple(elems))
            }
            Token::Punct('[') => {
                let elem = Box::new(self.parse_type()?);
                if self.eat(']') {
                    return Some(TypeExpr::Slice(elem));
                }
                if !self.eat(';') {
                    return None;
                }
                let len = match self.bump()? {
                    Token::Ident(digits) => digits.parse().ok()?,
                    _ => return None,
                };
                self.eat(']').then_some(TypeExpr::Array { elem, len })
            }
            Token::Ident(first) => self.parse_path(first),
            _ => None,
        }
    }

    fn parse_path(&mut self, first: String) -> Option<TypeExpr> {
        if matches!(first.as_str(), "dyn" | "impl" | "fn" | "unsafe" | "extern" | "mut") {
            return None;
        }
        let mut raw = first;
        while self.peek() == Some(&Token::PathSep) {
            self.pos += 1;
            match self.bump()? {
                Token::Ident(segment) => {
                    raw.push_str("::");
                    raw.push_str(&segment);
                }
                _ => return None,
            }
        }
        let mut args = if self.eat('<') {
            self.parse_list('>')?
        } else {
            Vec::new()
        };
        args.retain(|arg| !is_default_param(arg));
        Some(TypeExpr::Path {
            path: self.rules.normalize(&raw),
            args,
        })
    }

    fn parse_list(&mut self, close: char) -> Option<Vec<TypeExpr>> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Some(items);
            }
            items.push(self.parse_type()?);
            if !self.eat(',') {
                return self.eat(close).then_some(items);
            }
        }
    }
}

// Allocator and hasher parameters left at their defaults.
fn is_default_param(arg: &TypeExpr) -> bool {
    matches!(
        arg.path(),
        Some("std::alloc::Global" | "std::hash::random::RandomState" | "std::collections::hash::map::RandomState")
    )
}
