/// Shader stages and `#include` resolution for GLSL compilation

use std::fmt;
use std::path::{Path, PathBuf};

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    /// Fragment/Pixel shader
    Fragment,
    Compute,
    RayGeneration,
    AnyHit,
    ClosestHit,
    Miss,
    Intersection,
    Callable,
    Task,
    Mesh,
}

impl ShaderStage {
    /// Guess the stage from a conventional GLSL file extension (`.vert`, `.frag`, ...)
    pub fn from_extension(path: &Path) -> Option<Self> {
        let stage = match path.extension()?.to_str()? {
            "vert" => ShaderStage::Vertex,
            "tesc" => ShaderStage::TessControl,
            "tese" => ShaderStage::TessEvaluation,
            "geom" => ShaderStage::Geometry,
            "frag" => ShaderStage::Fragment,
            "comp" => ShaderStage::Compute,
            "rgen" => ShaderStage::RayGeneration,
            "rahit" => ShaderStage::AnyHit,
            "rchit" => ShaderStage::ClosestHit,
            "rmiss" => ShaderStage::Miss,
            "rint" => ShaderStage::Intersection,
            "rcall" => ShaderStage::Callable,
            "task" => ShaderStage::Task,
            "mesh" => ShaderStage::Mesh,
            _ => return None,
        };
        Some(stage)
    }

    /// Whether the stage runs in a graphics pipeline
    pub fn is_graphics(self) -> bool {
        matches!(
            self,
            ShaderStage::Vertex
                | ShaderStage::TessControl
                | ShaderStage::TessEvaluation
                | ShaderStage::Geometry
                | ShaderStage::Fragment
                | ShaderStage::Task
                | ShaderStage::Mesh
        )
    }
}

/// How an include was spelled in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeKind {
    /// `#include "file"`: looked up next to the including file first
    Relative,
    /// `#include <file>`: looked up under the include root only
    Standard,
}

/// A resolved include: the canonical name used in diagnostics and its text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInclude {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeError {
    /// No candidate path could be read
    NotFound { requested: String, searched: Vec<PathBuf> },
    /// The include chain is deeper than the resolver allows (likely a cycle)
    DepthExceeded { requested: String, depth: usize, max_depth: usize },
}

impl fmt::Display for IncludeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeError::NotFound { requested, searched } => {
                write!(f, "include \"{}\" not found (searched:", requested)?;
                for path in searched {
                    write!(f, " {}", path.display())?;
                }
                write!(f, ")")
            }
            IncludeError::DepthExceeded { requested, depth, max_depth } => write!(
                f,
                "include \"{}\" at depth {} exceeds the maximum of {}",
                requested, depth, max_depth
            ),
        }
    }
}

impl std::error::Error for IncludeError {}

/// Resolves `#include` directives against an include root
///
/// Resolution depends only on its arguments and the files it reads, so the
/// same request always produces the same answer.
#[derive(Debug, Clone)]
pub struct IncludeResolver {
    root: PathBuf,
    max_depth: usize,
}

impl IncludeResolver {
    pub const DEFAULT_MAX_DEPTH: usize = 32;

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Resolve `requested`, included from `requesting` at `depth`, from disk
    pub fn resolve(
        &self,
        requested: &str,
        kind: IncludeKind,
        requesting: &str,
        depth: usize,
    ) -> Result<ResolvedInclude, IncludeError> {
        self.resolve_with(requested, kind, requesting, depth, |path| {
            std::fs::read_to_string(path).ok()
        })
    }

    /// Same as [`resolve`](Self::resolve) with a caller-supplied file reader
    pub fn resolve_with<F>(
        &self,
        requested: &str,
        kind: IncludeKind,
        requesting: &str,
        depth: usize,
        read: F,
    ) -> Result<ResolvedInclude, IncludeError>
    where
        F: Fn(&Path) -> Option<String>,
    {
        if depth > self.max_depth {
            return Err(IncludeError::DepthExceeded {
                requested: requested.to_string(),
                depth,
                max_depth: self.max_depth,
            });
        }

        let searched = self.candidates(requested, kind, requesting);
        for candidate in &searched {
            if let Some(content) = read(candidate) {
                return Ok(ResolvedInclude {
                    name: candidate.display().to_string(),
                    content,
                });
            }
        }

        Err(IncludeError::NotFound {
            requested: requested.to_string(),
            searched,
        })
    }

    fn candidates(&self, requested: &str, kind: IncludeKind, requesting: &str) -> Vec<PathBuf> {
        let requested_path = Path::new(requested);
        if requested_path.is_absolute() {
            return vec![requested_path.to_path_buf()];
        }

        let mut candidates = Vec::with_capacity(2);
        if kind == IncludeKind::Relative {
            let parent = Path::new(requesting).parent().filter(|p| !p.as_os_str().is_empty());
            if let Some(parent) = parent {
                candidates.push(parent.join(requested_path));
            }
        }
        let from_root = self.root.join(requested_path);
        if !candidates.contains(&from_root) {
            candidates.push(from_root);
        }
        candidates
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
