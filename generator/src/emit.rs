// emit.rs — C source rendering for the four output tiers
//
// Renders one function at one concrete instantiation type into one artifact.
// Every renderer is a pure function; the generator owns buffer routing and
// ordering. Signatures come in two shapes: the public shape, where vectors
// travel by value, and the host shape, where a vector return becomes a
// leading `result` pointer and vector arguments are passed by address with
// the width suffix stripped.
//
// Preconditions: `function` came from the parser; `ty` is one of its
//                instantiation types.
// Postconditions: output is a deterministic function of the inputs.
// Side effects: none.

use std::fmt::Write as _;

use crate::ast::Function;
use crate::types::{mangled_name, substitute, ResolvedType};

// ── Public types ────────────────────────────────────────────────────────────

/// The four output artifacts.
///
/// Native functions produce all four per instantiation. Non-native
/// functions produce only `HostImpl` (their executable logic, rendered with
/// the public signature) and `PublicDecl`; the other two render empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Executable logic: a `static` mangled definition for native
    /// functions, the public `OVERLOAD` definition for non-native ones.
    HostImpl,
    /// Name → address registration entry consumed by the runtime
    /// dispatcher.
    HostRegistry,
    /// Public forward declaration, one overload per instantiation.
    PublicDecl,
    /// Host entry-point declaration plus the marshaling stub (native only).
    PublicDef,
}

/// One registration entry of the host dispatch table, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Lookup key: the mangled name behind the host-symbol prefix.
    pub key: String,
    /// Symbol whose address the dispatcher hands out.
    pub symbol: String,
}

impl RegistryEntry {
    pub fn render(&self) -> String {
        format!(
            "    else if (name == \"{}\")\n        return (void *)&{};\n",
            self.key, self.symbol
        )
    }
}

/// Registry entry for a native function at one instantiation type.
pub fn registry_entry(function: &Function, ty: &str) -> RegistryEntry {
    let symbol = mangled_name(function, ty);
    RegistryEntry {
        key: format!("__cpu_{}", symbol),
        symbol,
    }
}

// ── Rendering ───────────────────────────────────────────────────────────────

/// Render one artifact for one function at one instantiation type.
pub fn render(function: &Function, ty: &str, artifact: Artifact) -> String {
    match artifact {
        Artifact::HostImpl => render_impl(function, ty),
        Artifact::HostRegistry => {
            if function.native {
                registry_entry(function, ty).render()
            } else {
                String::new()
            }
        }
        Artifact::PublicDecl => render_decl(function, ty),
        Artifact::PublicDef => {
            if function.native {
                render_stub(function, ty)
            } else {
                String::new()
            }
        }
    }
}

fn render_impl(function: &Function, ty: &str) -> String {
    let ret = ResolvedType::resolve(&function.return_type, ty);
    let body = substitute(&function.body, ty);
    if function.native {
        format!(
            "static {} {}({})\n{{\n{}\n}}\n\n",
            host_return(&ret),
            mangled_name(function, ty),
            param_list(function, ty, Shape::Host),
            body
        )
    } else {
        format!(
            "{} OVERLOAD {}({})\n{{\n{}\n}}\n\n",
            public_return(&ret),
            function.name,
            param_list(function, ty, Shape::Public),
            body
        )
    }
}

fn render_decl(function: &Function, ty: &str) -> String {
    let ret = ResolvedType::resolve(&function.return_type, ty);
    format!(
        "{} OVERLOAD {}({});\n",
        public_return(&ret),
        function.name,
        param_list(function, ty, Shape::Public)
    )
}

/// Forward declaration of the host entry point, then the stub that bridges
/// the public calling convention to it: a vector return becomes a local
/// temporary whose address travels first, vector arguments travel by
/// address, everything else by value.
fn render_stub(function: &Function, ty: &str) -> String {
    let ret = ResolvedType::resolve(&function.return_type, ty);
    let mangled = mangled_name(function, ty);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} __cpu_{}({});",
        host_return(&ret),
        mangled,
        param_list(function, ty, Shape::Host)
    );

    let _ = write!(
        out,
        "{} OVERLOAD {}({})\n{{\n",
        public_return(&ret),
        function.name,
        param_list(function, ty, Shape::Public)
    );

    if ret.is_vector() {
        let _ = write!(out, "    {} result;\n\n", ret.name);
    }

    out.push_str("    ");
    if !ret.is_vector() {
        out.push_str("return ");
    }
    let _ = write!(out, "__cpu_{}(", mangled);

    let mut first = true;
    if ret.is_vector() {
        let _ = write!(out, "({} *)&result", ret.base());
        first = false;
    }
    for arg in &function.args {
        let rt = ResolvedType::resolve(&arg.ty, ty);
        if !first {
            out.push_str(", ");
        }
        first = false;
        if rt.is_vector() {
            let _ = write!(out, "({} *)", rt.base());
            if !rt.is_pointer {
                out.push('&');
            }
        }
        out.push_str(&arg.name);
    }
    out.push_str(");\n");

    if ret.is_vector() {
        out.push_str("\n    return result;\n");
    }
    out.push_str("}\n\n");
    out
}

// ── Signature pieces ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Public,
    Host,
}

fn public_return(ret: &ResolvedType) -> String {
    if ret.is_pointer {
        format!("{} *", ret.name)
    } else {
        ret.name.clone()
    }
}

/// Host tier cannot return a vector by value: the return collapses to
/// `void` and a `result` pointer is injected by `param_list`.
fn host_return(ret: &ResolvedType) -> String {
    if ret.is_vector() {
        "void".to_string()
    } else {
        public_return(ret)
    }
}

fn param_list(function: &Function, ty: &str, shape: Shape) -> String {
    let mut out = String::new();
    let mut first = true;

    if shape == Shape::Host {
        let ret = ResolvedType::resolve(&function.return_type, ty);
        if ret.is_vector() {
            let _ = write!(out, "{} *result", ret.base());
            first = false;
        }
    }

    for arg in &function.args {
        let rt = ResolvedType::resolve(&arg.ty, ty);
        if !first {
            out.push_str(", ");
        }
        first = false;

        let by_address = rt.is_pointer || (shape == Shape::Host && rt.is_vector());
        let type_name = match shape {
            Shape::Host => rt.base(),
            Shape::Public => rt.name.as_str(),
        };
        out.push_str(type_name);
        out.push(' ');
        if by_address {
            out.push('*');
        }
        out.push_str(&arg.name);
    }

    out
}

// ── Tests ──
