// types.rs — Type resolution and symbol mangling
//
// Every emission decision that depends on a type goes through one resolver:
// a type template plus a concrete instantiation type yields a `ResolvedType`
// carrying the substituted name, the vector width, and the pointer marker.
// The four emitters all consume the same resolved value, so they cannot
// drift apart on classification.
//
// Preconditions: templates and instantiation types come from the parser.
// Postconditions: resolution is a pure function of its inputs.
// Side effects: none.

use crate::ast::Function;

/// Vector width of a concrete type: the maximal trailing run of decimal
/// digits, read as an element count. `None` for scalars.
///
/// `float` → None, `float4` → 4, `double16` → 16.
pub fn vector_width(ty: &str) -> Option<u32> {
    let prefix = ty.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &ty[prefix.len()..];
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Substitute the placeholders of a template for one instantiation type:
/// `$vecdim` becomes the width string (`"1"` for scalars), `$type` becomes
/// the instantiation type itself. Purely textual, applied before any
/// structural reading of the template.
pub fn substitute(template: &str, ty: &str) -> String {
    let vecdim = vector_width(ty).unwrap_or(1).to_string();
    template.replace("$vecdim", &vecdim).replace("$type", ty)
}

/// A type template resolved against one instantiation type.
///
/// Computed fresh per (template, instantiation) pair and never shared
/// across instantiations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// Substituted type name with the pointer marker stripped; keeps the
    /// vector width suffix (`float2`, not `float`).
    pub name: String,
    /// Trailing element count, `None` for scalars.
    pub width: Option<u32>,
    /// Template carried a leading `*` marker.
    pub is_pointer: bool,
}

impl ResolvedType {
    pub fn resolve(template: &str, ty: &str) -> Self {
        let substituted = substitute(template, ty);
        let (is_pointer, name) = match substituted.strip_prefix('*') {
            Some(rest) => (true, rest.to_string()),
            None => (false, substituted),
        };
        let width = vector_width(&name);
        ResolvedType {
            name,
            width,
            is_pointer,
        }
    }

    /// Element type: the name with the width suffix stripped.
    pub fn base(&self) -> &str {
        self.name.trim_end_matches(|c: char| c.is_ascii_digit())
    }

    /// True for widths >= 2. Width-1 and scalar types behave identically.
    pub fn is_vector(&self) -> bool {
        self.width.map_or(false, |w| w >= 2)
    }
}

/// Mangled host-tier symbol for a function at one instantiation type.
///
/// Layout: `<return>_<name>_<arg><arg>...` — the substituted return type,
/// the function name, then every substituted argument template with `*`
/// replaced by the letter `p`, concatenated without separators. The second
/// `_` appears only when the function has arguments. Uniqueness across a
/// run is enforced by the generator.
pub fn mangled_name(function: &Function, ty: &str) -> String {
    let mut mangled = substitute(&function.return_type, ty);
    mangled.push('_');
    mangled.push_str(&function.name);
    if !function.args.is_empty() {
        mangled.push('_');
    }
    for arg in &function.args {
        mangled.push_str(&substitute(&arg.ty, ty).replace('*', "p"));
    }
    mangled
}
