//! Stage compilation and program linking.
//!
//! Compilation parses and validates WGSL with naga, so shader errors surface
//! as `GpuError::Compile` before any device object exists. Linking checks the
//! stage combination and resolves every uniform parameter name to a byte slot
//! once, so per-frame code never looks names up in shader source.

use crate::error::GpuError;
use naga::valid::{Capabilities, ValidationFlags, Validator};
use std::collections::HashMap;

/// Built-in escape-time kernel.
pub const KERNEL_SOURCE: &str = include_str!("shaders/fractal.wgsl");

/// Built-in full-screen presentation pass (vertex + fragment).
pub const PRESENT_SOURCE: &str = include_str!("shaders/present.wgsl");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKind {
    Compute,
    Vertex,
    Fragment,
}

impl StageKind {
    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            StageKind::Compute => naga::ShaderStage::Compute,
            StageKind::Vertex => naga::ShaderStage::Vertex,
            StageKind::Fragment => naga::ShaderStage::Fragment,
        }
    }

    fn attribute(self) -> &'static str {
        match self {
            StageKind::Compute => "@compute",
            StageKind::Vertex => "@vertex",
            StageKind::Fragment => "@fragment",
        }
    }
}

/// A validated single stage, ready to be linked.
#[derive(Debug)]
pub struct ShaderStage {
    source_id: String,
    kind: StageKind,
    source: String,
    module: naga::Module,
    entry_point: String,
    workgroup_size: [u32; 3],
}

impl ShaderStage {
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn workgroup_size(&self) -> [u32; 3] {
        self.workgroup_size
    }
}

/// Scalar/vector types a kernel parameter may have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    F32,
    F64,
    I32,
    U32,
    F64x2,
    I32x2,
}

impl ParamType {
    pub fn size(self) -> u32 {
        match self {
            ParamType::F32 | ParamType::I32 | ParamType::U32 => 4,
            ParamType::F64 | ParamType::I32x2 => 8,
            ParamType::F64x2 => 16,
        }
    }

    fn from_naga(inner: &naga::TypeInner) -> Option<Self> {
        use naga::{Scalar, ScalarKind, TypeInner, VectorSize};
        match *inner {
            TypeInner::Scalar(Scalar { kind, width }) => match (kind, width) {
                (ScalarKind::Float, 4) => Some(ParamType::F32),
                (ScalarKind::Float, 8) => Some(ParamType::F64),
                (ScalarKind::Sint, 4) => Some(ParamType::I32),
                (ScalarKind::Uint, 4) => Some(ParamType::U32),
                _ => None,
            },
            TypeInner::Vector {
                size: VectorSize::Bi,
                scalar: Scalar { kind, width },
            } => match (kind, width) {
                (ScalarKind::Float, 8) => Some(ParamType::F64x2),
                (ScalarKind::Sint, 4) => Some(ParamType::I32x2),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Byte offset and type of one named parameter inside the uniform block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamSlot {
    pub offset: u32,
    pub ty: ParamType,
}

/// Name → slot mapping of a program's uniform parameter block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamLayout {
    group: u32,
    binding: u32,
    size: u32,
    slots: HashMap<String, ParamSlot>,
}

impl ParamLayout {
    pub fn slot(&self, name: &str) -> Option<ParamSlot> {
        self.slots.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Block size in bytes as declared by the shader.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn binding(&self) -> (u32, u32) {
        (self.group, self.binding)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}

/// A stage entry retained after linking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkedStage {
    pub kind: StageKind,
    pub source_id: String,
    pub source: String,
    pub entry_point: String,
    pub workgroup_size: [u32; 3],
}

/// Stages that form a valid pipeline, with parameter slots resolved.
#[derive(Clone, Debug)]
pub struct LinkedProgram {
    pub(crate) label: String,
    pub(crate) stages: Vec<LinkedStage>,
    pub(crate) params: Option<ParamLayout>,
}

impl LinkedProgram {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stage(&self, kind: StageKind) -> Option<&LinkedStage> {
        self.stages.iter().find(|s| s.kind == kind)
    }

    pub fn params(&self) -> Option<&ParamLayout> {
        self.params.as_ref()
    }

    pub fn is_compute(&self) -> bool {
        self.stage(StageKind::Compute).is_some()
    }
}

/// Parse and validate `source` and locate its entry point for `kind`.
///
/// `source_id` names the source in diagnostics (a file path or a built-in
/// name). The first entry point of the requested stage is used.
pub fn compile_stage(
    source_id: &str,
    source: &str,
    kind: StageKind,
) -> Result<ShaderStage, GpuError> {
    let compile_error = |diagnostic: String| GpuError::Compile {
        source_id: source_id.to_string(),
        diagnostic,
    };

    if source.trim().is_empty() {
        return Err(compile_error("source is empty".to_string()));
    }

    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| compile_error(e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::FLOAT64)
        .validate(&module)
        .map_err(|e| compile_error(e.emit_to_string(source)))?;

    let (entry_point, workgroup_size) = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == kind.naga_stage())
        .map(|ep| (ep.name.clone(), ep.workgroup_size))
        .ok_or_else(|| compile_error(format!("no {} entry point", kind.attribute())))?;

    log::debug!("Compiled {kind:?} stage '{entry_point}' from {source_id}");

    Ok(ShaderStage {
        source_id: source_id.to_string(),
        kind,
        source: source.to_string(),
        module,
        entry_point,
        workgroup_size,
    })
}

/// Link `stages` into a program.
///
/// Valid combinations are a single compute stage, or one vertex plus one
/// fragment stage. The stages are consumed on both success and failure.
pub fn link_program(label: &str, stages: Vec<ShaderStage>) -> Result<LinkedProgram, GpuError> {
    let link_error = |diagnostic: String| GpuError::Link {
        program: label.to_string(),
        diagnostic,
    };

    let mut kinds: Vec<StageKind> = stages.iter().map(|s| s.kind).collect();
    kinds.sort();
    match kinds.as_slice() {
        [StageKind::Compute] | [StageKind::Vertex, StageKind::Fragment] => {}
        other => {
            return Err(link_error(format!(
                "invalid stage combination {other:?}; expected [Compute] or [Vertex, Fragment]"
            )))
        }
    }

    let mut params: Option<ParamLayout> = None;
    for stage in &stages {
        let Some(layout) = reflect_params(&stage.module) else {
            continue;
        };
        match &params {
            Some(existing) if *existing != layout => {
                return Err(link_error(format!(
                    "stage {} declares a parameter block that conflicts with another stage",
                    stage.source_id
                )));
            }
            Some(_) => {}
            None => params = Some(layout),
        }
    }

    let stages = stages
        .into_iter()
        .map(|s| LinkedStage {
            kind: s.kind,
            source_id: s.source_id,
            source: s.source,
            entry_point: s.entry_point,
            workgroup_size: s.workgroup_size,
        })
        .collect();

    if let Some(layout) = &params {
        log::debug!(
            "Linked '{label}' with parameters {:?}",
            layout.names().collect::<Vec<_>>()
        );
    }

    Ok(LinkedProgram {
        label: label.to_string(),
        stages,
        params,
    })
}

/// Find the uniform struct of `module` and map its member names to slots.
///
/// Members of unsupported types are left out; uploads to them are skipped
/// the same way as uploads to absent names.
fn reflect_params(module: &naga::Module) -> Option<ParamLayout> {
    module.global_variables.iter().find_map(|(_, var)| {
        if var.space != naga::AddressSpace::Uniform {
            return None;
        }
        let naga::TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
            return None;
        };
        let binding = var.binding.as_ref()?;

        let slots = members
            .iter()
            .filter_map(|member| {
                let name = member.name.clone()?;
                let ty = ParamType::from_naga(&module.types[member.ty].inner);
                if ty.is_none() {
                    log::debug!("Parameter '{name}' has an unsupported type and is not bindable");
                }
                Some((
                    name,
                    ParamSlot {
                        offset: member.offset,
                        ty: ty?,
                    },
                ))
            })
            .collect();

        Some(ParamLayout {
            group: binding.group,
            binding: binding.binding,
            size: *span,
            slots,
        })
    })
}
