// generate.rs — Output orchestration
//
// Owns the four accumulation buffers and the output directory for one run.
// `add` appends emission output per instantiation type in call order, so
// the files mirror the declaration order of the definition file and stay
// diff-stable. The registry is kept as an explicit ordered entry list and
// rendered once at flush time. A run is all-or-nothing: nothing touches
// disk until the whole input parsed and emitted without error.
//
// Failure modes: mangled-name collision during `add`, I/O failure during
//                `write`. Both abort the run.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::ast::Function;
use crate::emit::{self, Artifact, RegistryEntry};
use crate::parser::{self, ParseError};
use crate::types::mangled_name;

// ── Output contract ─────────────────────────────────────────────────────────

/// Host-tier implementation file: `static` mangled definitions.
pub const HOST_IMPL_FILE: &str = "builtins_impl.h";
/// Host-tier registry file: the dispatcher's name → address table body.
pub const HOST_REGISTRY_FILE: &str = "builtins_def.h";
/// Public declaration file: one `OVERLOAD` declaration per instantiation.
pub const PUBLIC_DECL_FILE: &str = "stdlib_def.h";
/// Public implementation file: native marshaling stubs and non-native
/// definitions.
pub const PUBLIC_IMPL_FILE: &str = "stdlib_impl.h";

/// The four rendered output files of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub host_impl: String,
    pub host_registry: String,
    pub public_decl: String,
    pub public_impl: String,
}

impl GeneratedFiles {
    /// Write the four files into `dir`, replacing any prior content. The
    /// directory must exist.
    pub fn write_to(&self, dir: &Path) -> Result<(), GenerateError> {
        let write = |name: &str, contents: &str| {
            let path = dir.join(name);
            std::fs::write(&path, contents).map_err(|source| GenerateError::Io { path, source })
        };
        write(HOST_IMPL_FILE, &self.host_impl)?;
        write(HOST_REGISTRY_FILE, &self.host_registry)?;
        write(PUBLIC_DECL_FILE, &self.public_decl)?;
        write(PUBLIC_IMPL_FILE, &self.public_impl)?;
        Ok(())
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum GenerateError {
    Parse(ParseError),
    /// Two (function, instantiation) pairs resolved to one host symbol.
    /// Left unchecked this would silently alias two implementations behind
    /// one registry key.
    MangleCollision {
        mangled: String,
        first: String,
        second: String,
    },
    Io {
        path: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Parse(e) => write!(f, "{}", e),
            GenerateError::MangleCollision {
                mangled,
                first,
                second,
            } => write!(
                f,
                "mangled name '{}' generated by both '{}' and '{}'",
                mangled, first, second
            ),
            GenerateError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<ParseError> for GenerateError {
    fn from(e: ParseError) -> Self {
        GenerateError::Parse(e)
    }
}

// ── Generator ───────────────────────────────────────────────────────────────

/// Accumulates emission output for one run and flushes it to the output
/// directory.
pub struct Generator {
    out_dir: PathBuf,
    host_impl: String,
    public_decl: String,
    public_impl: String,
    registry: Vec<RegistryEntry>,
    /// mangled name → function that produced it, for collision reporting.
    seen: HashMap<String, String>,
}

impl Generator {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Generator {
            out_dir: out_dir.into(),
            host_impl: String::new(),
            public_decl: String::new(),
            public_impl: String::new(),
            registry: Vec::new(),
            seen: HashMap::new(),
        }
    }

    /// Append the output of one function, every instantiation type in
    /// declared order.
    pub fn add(&mut self, function: &Function) -> Result<(), GenerateError> {
        for ty in &function.types {
            let mangled = mangled_name(function, ty);
            if let Some(first) = self.seen.insert(mangled.clone(), function.name.clone()) {
                return Err(GenerateError::MangleCollision {
                    mangled,
                    first,
                    second: function.name.clone(),
                });
            }

            if function.native {
                self.public_impl
                    .push_str(&emit::render(function, ty, Artifact::PublicDef));
                self.public_decl
                    .push_str(&emit::render(function, ty, Artifact::PublicDecl));
                self.host_impl
                    .push_str(&emit::render(function, ty, Artifact::HostImpl));
                self.registry.push(emit::registry_entry(function, ty));
            } else {
                self.public_decl
                    .push_str(&emit::render(function, ty, Artifact::PublicDecl));
                // The executable logic of a non-native function carries the
                // public signature and lives next to its declaration's
                // target object, not in the host tier.
                self.public_impl
                    .push_str(&emit::render(function, ty, Artifact::HostImpl));
            }
        }
        Ok(())
    }

    /// Render the buffers into their final file contents.
    pub fn finish(self) -> GeneratedFiles {
        GeneratedFiles {
            host_impl: self.host_impl,
            host_registry: self.registry.iter().map(RegistryEntry::render).collect(),
            public_decl: self.public_decl,
            public_impl: self.public_impl,
        }
    }

    /// Flush the four files into the output directory.
    pub fn write(self) -> Result<(), GenerateError> {
        let out_dir = self.out_dir.clone();
        self.finish().write_to(&out_dir)
    }
}

/// Run the whole pipeline on definition-file source text without touching
/// disk: parse, emit every function, return the rendered files.
pub fn generate(source: &str) -> Result<GeneratedFiles, GenerateError> {
    let program = parser::parse(source)?;
    let mut generator = Generator::new(PathBuf::new());
    for function in &program.functions {
        generator.add(function)?;
    }
    Ok(generator.finish())
}

// ── Tests ──
