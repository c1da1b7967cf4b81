//! Literal emission.
//!
//! [`Emitter`] turns a [`Value`] into an [`Expr`]. Every position is
//! described by a [`Slot`]: the type hint known for it, if any, and whether
//! the compiler can infer the expected type there. Inferred positions get
//! unsuffixed numbers and `.into()` conversions; the rest must be
//! self-typed.

use crate::config::LiteralConfig;
use crate::error::LiteralError;
use crate::expr::Expr;
use crate::types::TypeExpr;
use crate::value::{Float, Int, Payload, Value};

const INT_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
];

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "static", "struct", "trait", "true", "try", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv",
    "typeof", "unsized", "virtual", "yield",
];

/// Emission context of one position
#[derive(Debug, Clone, Copy, Default)]
pub struct Slot<'a> {
    hint: Option<&'a TypeExpr>,
    inferred: bool,
}

impl<'a> Slot<'a> {
    /// Slot with an explicit hint and inference flag
    #[must_use]
    pub fn new(hint: Option<&'a TypeExpr>, inferred: bool) -> Self {
        Self { hint, inferred }
    }

    /// Root position; inferred whenever its type can be named
    #[must_use]
    pub fn root(hint: Option<&'a TypeExpr>) -> Self {
        Self {
            hint,
            inferred: hint.is_some(),
        }
    }

    /// Position whose type the compiler knows but the emitter does not
    #[must_use]
    pub fn inferred() -> Self {
        Self {
            hint: None,
            inferred: true,
        }
    }

    /// Type hint
    #[must_use]
    pub fn hint(&self) -> Option<&'a TypeExpr> {
        self.hint
    }

    /// Whether the expected type is inferred
    #[must_use]
    pub fn is_inferred(&self) -> bool {
        self.inferred
    }

    fn with_hint(self, hint: Option<&'a TypeExpr>) -> Self {
        Self {
            hint,
            inferred: self.inferred,
        }
    }
}

/// Dispatches values to literal expressions
#[derive(Debug, Clone, Copy)]
pub struct Emitter<'c> {
    config: &'c LiteralConfig,
}

impl<'c> Emitter<'c> {
    /// Create an emitter
    #[must_use]
    pub fn new(config: &'c LiteralConfig) -> Self {
        Self { config }
    }

    /// Emit the literal for `value` in `slot`
    ///
    /// # Errors
    ///
    /// Returns error if the value has no literal representation
    pub fn emit(&self, value: &Value, slot: Slot<'_>) -> Result<Expr, LiteralError> {
        if let Some(hint) = slot.hint {
            if let TypeExpr::Ref { inner, .. } = hint {
                return self.reference(value, inner, slot.inferred);
            }
            if self.config.is_canonical(hint) {
                return match value {
                    Value::Str(form) | Value::Canonical { form, .. } => {
                        Ok(self.decode_call(&hint.to_string(), form))
                    }
                    other => Err(LiteralError::Marshal {
                        type_name: hint.to_string(),
                        reason: format!("expected canonical text, found {}", other.kind()),
                    }),
                };
            }
            if hint.is_pointer() {
                let pointee = match value {
                    Value::Pointer(inner) => inner.as_ref(),
                    other => other,
                };
                return self.pointer(pointee, hint, slot.inferred);
            }
        }

        match value {
            Value::Null => Ok(Expr::atom("None")),
            Value::Unit => Ok(Expr::atom("()")),
            Value::Bool(b) => Ok(Expr::atom(b.to_string())),
            Value::Int(i) => Ok(Expr::atom(int_literal(*i, slot))),
            Value::Float(f) => Ok(Expr::atom(float_literal(*f, slot))),
            Value::Char(c) => Ok(Expr::atom(format!("{c:?}"))),
            Value::Str(s) => Ok(string_expr(s, slot)),
            Value::Bytes(bytes) => Ok(bytes_expr(bytes, slot)),
            Value::Some(inner) => {
                let hint = slot.hint.filter(|h| h.is("Option")).and_then(|h| h.arg(0));
                Ok(Expr::call("Some", vec![self.emit(inner, slot.with_hint(hint))?]))
            }
            Value::Seq(items) => self.sequence(value, items, slot),
            Value::Tuple(items) => self.tuple(items, slot),
            Value::Set(items) => self.set(items, slot),
            Value::Map(entries) => self.map(entries, slot),
            Value::Struct {
                name,
                fields,
                skipped,
            } => self.structure(name, fields, *skipped, slot.hint),
            Value::TupleStruct { name, elems } => {
                Ok(Expr::call(nominal_path(name, slot.hint)?, self.emit_fields(elems)?))
            }
            Value::UnitStruct(name) => Ok(Expr::atom(nominal_path(name, slot.hint)?)),
            Value::Newtype { name, inner } => Ok(Expr::call(
                nominal_path(name, slot.hint)?,
                vec![self.emit(inner, Slot::inferred())?],
            )),
            Value::Variant {
                enum_name,
                variant,
                payload,
            } => self.variant(enum_name, variant, payload, slot.hint),
            Value::Pointer(inner) => {
                let expr = self.emit(inner, Slot::new(None, false))?;
                Ok(Expr::call(format!("{}::ptr", self.config.runtime), vec![expr]))
            }
            Value::Canonical { type_path, form } => {
                if type_path.is_empty() {
                    return Err(LiteralError::unsupported("canonical form without a type path"));
                }
                Ok(self.decode_call(type_path, form))
            }
        }
    }

    fn emit_each(&self, items: &[Value], slot: Slot<'_>) -> Result<Vec<Expr>, LiteralError> {
        items.iter().map(|item| self.emit(item, slot)).collect()
    }

    fn emit_fields(&self, items: &[Value]) -> Result<Vec<Expr>, LiteralError> {
        self.emit_each(items, Slot::inferred())
    }

    fn decode_call(&self, type_path: &str, form: &str) -> Expr {
        Expr::call(
            format!("{}::decode::<{type_path}>", self.config.runtime),
            vec![Expr::atom(string_literal(form))],
        )
        .suffixed("?")
    }

    fn pointer(&self, pointee: &Value, hint: &TypeExpr, inferred: bool) -> Result<Expr, LiteralError> {
        let inner = self.emit(pointee, Slot::new(hint.arg(0), false))?;
        let head = if inferred {
            format!("{}::ptr", self.config.runtime)
        } else {
            format!("{}::ptr::<{hint}, _>", self.config.runtime)
        };
        Ok(Expr::call(head, vec![inner]))
    }

    fn reference(&self, value: &Value, inner: &TypeExpr, inferred: bool) -> Result<Expr, LiteralError> {
        if let (true, Value::Str(s)) = (inner.is("str"), value) {
            return Ok(Expr::atom(string_literal(s)));
        }
        if let TypeExpr::Slice(elem) = inner {
            if elem.is("u8") {
                if let Some(bytes) = value.as_byte_seq().filter(|b| b.is_ascii() && is_text(b)) {
                    return Ok(Expr::atom(format!("b\"{}\"", bytes.escape_ascii())));
                }
            }
            let (Value::Seq(items) | Value::Tuple(items)) = value else {
                return Err(LiteralError::unsupported(format!("{} behind a slice reference", value.kind())));
            };
            let elems = self.emit_each(items, Slot::new(Some(elem), inferred))?;
            return Ok(Expr::list("", elems).prefixed("&"));
        }
        Ok(self.emit(value, Slot::new(Some(inner), inferred))?.prefixed("&"))
    }

    fn sequence(&self, value: &Value, items: &[Value], slot: Slot<'_>) -> Result<Expr, LiteralError> {
        let hint = slot.hint;
        let text_bytes = value.as_byte_seq().and_then(|bytes| byte_text(&bytes));
        if let Some(text) = &text_bytes {
            match hint {
                Some(h) if h.is_byte_vec() => return Ok(Expr::atom(text.clone())),
                None if slot.inferred => return Ok(Expr::atom(format!("{text}.into()"))),
                _ => {}
            }
        }

        let elem_hint = hint.and_then(TypeExpr::element);
        let elem_slot = Slot::new(elem_hint, slot.inferred);
        match hint {
            Some(h) if h.is("Vec") || matches!(h, TypeExpr::Slice(_)) => {
                if items.is_empty() && !slot.inferred {
                    return Ok(Expr::atom(match elem_hint {
                        Some(elem) => format!("Vec::<{elem}>::new()"),
                        None => "Vec::new()".to_string(),
                    }));
                }
                Ok(Expr::list("vec!", self.emit_each(items, elem_slot)?))
            }
            Some(TypeExpr::Array { .. }) => Ok(Expr::list("", self.emit_each(items, elem_slot)?)),
            Some(TypeExpr::Path { path, .. }) if elem_hint.is_some() => {
                let mut elems = self.emit_each(items, elem_slot)?;
                if path == "std::collections::HashSet" {
                    elems.sort_by_cached_key(text_of);
                }
                if elems.is_empty() {
                    return Ok(Expr::atom(format!("{path}::new()")));
                }
                Ok(Expr::call(format!("{path}::from"), vec![Expr::list("", elems)]))
            }
            _ if slot.inferred => {
                Ok(Expr::list("", self.emit_each(items, Slot::inferred())?).suffixed(".into()"))
            }
            _ => Ok(Expr::list("vec!", self.emit_each(items, Slot::new(None, false))?)),
        }
    }

    fn set(&self, items: &[Value], slot: Slot<'_>) -> Result<Expr, LiteralError> {
        let elem_hint = slot.hint.and_then(TypeExpr::element);
        let mut elems = self.emit_each(items, Slot::new(elem_hint, slot.inferred))?;
        elems.sort_by_cached_key(text_of);
        match slot.hint.and_then(TypeExpr::path).filter(|_| elem_hint.is_some()) {
            Some(path) if elems.is_empty() => Ok(Expr::atom(format!("{path}::new()"))),
            Some(path) => Ok(Expr::call(format!("{path}::from"), vec![Expr::list("", elems)])),
            None if slot.inferred => Ok(Expr::list("", elems).suffixed(".into()")),
            None => Ok(Expr::call(
                "std::collections::HashSet::from",
                vec![Expr::list("", elems)],
            )),
        }
    }

    fn tuple(&self, items: &[Value], slot: Slot<'_>) -> Result<Expr, LiteralError> {
        match slot.hint {
            Some(TypeExpr::Array { elem, .. }) => Ok(Expr::list(
                "",
                self.emit_each(items, Slot::new(Some(elem), slot.inferred))?,
            )),
            Some(TypeExpr::Tuple(hints)) if hints.len() == items.len() => {
                let elems = items
                    .iter()
                    .zip(hints)
                    .map(|(item, hint)| self.emit(item, Slot::new(Some(hint), slot.inferred)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expr::tuple(elems))
            }
            _ => Ok(Expr::tuple(
                self.emit_each(items, Slot::new(None, slot.inferred))?,
            )),
        }
    }

    fn map(&self, entries: &[(Value, Value)], slot: Slot<'_>) -> Result<Expr, LiteralError> {
        let (key_hint, value_hint) = match slot.hint.and_then(TypeExpr::entry) {
            Some((k, v)) => (Some(k), Some(v)),
            None => (None, None),
        };
        let path = slot.hint.and_then(TypeExpr::path).filter(|_| key_hint.is_some());

        let mut pairs = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let key = self.emit(key, Slot::new(key_hint, slot.inferred))?;
            let value = self.emit(value, Slot::new(value_hint, slot.inferred))?;
            pairs.push((text_of(&key), Expr::tuple(vec![key, value])));
        }
        // Iteration order of hashed maps is unstable; rendered keys are not.
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        let elems: Vec<Expr> = pairs.into_iter().map(|(_, pair)| pair).collect();

        match path {
            Some(path) if elems.is_empty() => Ok(Expr::atom(format!("{path}::new()"))),
            Some(path) => Ok(Expr::call(format!("{path}::from"), vec![Expr::list("", elems)])),
            None if slot.inferred => Ok(Expr::list("", elems).suffixed(".into()")),
            None => Ok(Expr::call(
                "std::collections::HashMap::from",
                vec![Expr::list("", elems)],
            )),
        }
    }

    fn structure(
        &self,
        name: &str,
        fields: &[(&'static str, Value)],
        skipped: bool,
        hint: Option<&TypeExpr>,
    ) -> Result<Expr, LiteralError> {
        let path = nominal_path(name, hint)?;
        let defaults = &self.config.defaults;
        let mut rest = skipped;
        let mut items = Vec::with_capacity(fields.len());
        for (field, value) in fields {
            if defaults.field(name, field).is_some_and(|default| default.same_as(value)) {
                rest = true;
                continue;
            }
            items.push((field_ident(field)?, self.emit(value, Slot::inferred())?));
        }
        if items.is_empty() && rest {
            return Ok(Expr::atom(format!("{path}::default()")));
        }
        Ok(Expr::structure(path, items, rest))
    }

    fn variant(
        &self,
        enum_name: &str,
        variant: &str,
        payload: &Payload,
        hint: Option<&TypeExpr>,
    ) -> Result<Expr, LiteralError> {
        if !is_ident(variant) {
            return Err(LiteralError::unsupported(format!("variant name `{variant}`")));
        }
        let path = format!("{}::{variant}", nominal_path(enum_name, hint)?);
        let payload_hint = match (hint, variant) {
            (Some(h), "Ok") if h.is("Result") => h.arg(0),
            (Some(h), "Err") if h.is("Result") => h.arg(1),
            _ => None,
        };
        match payload {
            Payload::Unit => Ok(Expr::atom(path)),
            Payload::Newtype(inner) => Ok(Expr::call(
                path,
                vec![self.emit(inner, Slot::new(payload_hint, true))?],
            )),
            Payload::Tuple(items) => Ok(Expr::call(path, self.emit_fields(items)?)),
            Payload::Struct(fields) => {
                let items = fields
                    .iter()
                    .map(|(field, value)| Ok((field_ident(field)?, self.emit(value, Slot::inferred())?)))
                    .collect::<Result<Vec<_>, LiteralError>>()?;
                Ok(Expr::structure(path, items, false))
            }
        }
    }
}

/// Quote a string, switching to a raw literal for multi-line text
#[must_use]
pub fn string_literal(s: &str) -> String {
    let breaks = s.matches('\n').count();
    let multiline = breaks > 1 || (breaks == 1 && !s.ends_with('\n'));
    if !multiline || s.contains('\r') {
        return format!("{s:?}");
    }
    let mut hashes = 1;
    while s.contains(&format!("\"{}", "#".repeat(hashes))) {
        hashes += 1;
    }
    let fence = "#".repeat(hashes);
    format!("r{fence}\"{s}\"{fence}")
}

fn int_literal(value: Int, slot: Slot<'_>) -> String {
    if slot.inferred {
        return value.to_string();
    }
    let suffix = slot
        .hint
        .and_then(TypeExpr::primitive)
        .filter(|p| INT_TYPES.contains(p))
        .unwrap_or(value.suffix());
    format!("{value}{suffix}")
}

fn float_literal(value: Float, slot: Slot<'_>) -> String {
    let ty = slot
        .hint
        .and_then(TypeExpr::primitive)
        .filter(|p| matches!(*p, "f32" | "f64"))
        .unwrap_or(value.suffix());
    if let Some(special) = value.special() {
        return format!("{ty}::{special}");
    }
    if slot.inferred {
        value.digits()
    } else {
        format!("{}{ty}", value.digits())
    }
}

fn string_expr(s: &str, slot: Slot<'_>) -> Expr {
    let literal = string_literal(s);
    match slot.hint {
        Some(hint) if hint.is("str") => Expr::atom(literal),
        _ if slot.inferred => Expr::atom(format!("{literal}.into()")),
        _ => Expr::atom(format!("String::from({literal})")),
    }
}

fn bytes_expr(bytes: &[u8], slot: Slot<'_>) -> Expr {
    if let Some(text) = byte_text(bytes) {
        return Expr::atom(text);
    }
    if bytes.is_empty() {
        return Expr::atom(if slot.inferred { "Vec::new()" } else { "Vec::<u8>::new()" });
    }
    let elems = bytes
        .iter()
        .enumerate()
        .map(|(i, b)| {
            if i == 0 && !slot.inferred {
                Expr::atom(format!("{b:#04x}u8"))
            } else {
                Expr::atom(format!("{b:#04x}"))
            }
        })
        .collect();
    Expr::list("vec!", elems)
}

fn is_text(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes)
        .is_ok_and(|text| text.chars().all(|c| !c.is_control() || matches!(c, '\n' | '\t')))
}

// Byte vectors holding text are rendered as their text.
fn byte_text(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() || !is_text(bytes) {
        return None;
    }
    if bytes.is_ascii() {
        return Some(format!("b\"{}\".to_vec()", bytes.escape_ascii()));
    }
    let text = std::str::from_utf8(bytes).ok()?;
    Some(format!("{text:?}.as_bytes().to_vec()"))
}

fn text_of(expr: &Expr) -> String {
    expr.flat().unwrap_or_else(|| expr.render())
}

fn is_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            name != "_" && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn field_ident(name: &str) -> Result<String, LiteralError> {
    if !is_ident(name) || matches!(name, "self" | "Self" | "super" | "crate") {
        return Err(LiteralError::unsupported(format!("field name `{name}`")));
    }
    if KEYWORDS.contains(&name) {
        return Ok(format!("r#{name}"));
    }
    Ok(name.to_string())
}

fn nominal_path(name: &str, hint: Option<&TypeExpr>) -> Result<String, LiteralError> {
    if !is_ident(name) {
        return Err(LiteralError::unsupported(format!("type name `{name}`")));
    }
    match hint.and_then(|h| h.path().filter(|_| h.last_segment() == Some(name))) {
        Some(path) => Ok(path.to_string()),
        None => Ok(name.to_string()),
    }
}
