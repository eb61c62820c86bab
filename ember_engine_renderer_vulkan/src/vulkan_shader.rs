/// Shader modules from SPIR-V, and GLSL -> SPIR-V compilation (feature `shader-compiler`)

use ash::vk;
use ember_engine::ember::shader::ShaderStage;
use ember_engine::ember::{Error, Result};
use ember_engine::engine_error;

#[cfg(feature = "shader-compiler")]
use ember_engine::ember::shader::{IncludeKind, IncludeResolver};

use crate::vulkan_context::{vk_error, VulkanContext};

/// Convert a shader stage to its Vulkan stage flag
pub fn shader_stage_to_vk(stage: ShaderStage) -> vk::ShaderStageFlags {
    match stage {
        ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
        ShaderStage::TessControl => vk::ShaderStageFlags::TESSELLATION_CONTROL,
        ShaderStage::TessEvaluation => vk::ShaderStageFlags::TESSELLATION_EVALUATION,
        ShaderStage::Geometry => vk::ShaderStageFlags::GEOMETRY,
        ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
        ShaderStage::Compute => vk::ShaderStageFlags::COMPUTE,
        ShaderStage::RayGeneration => vk::ShaderStageFlags::RAYGEN_KHR,
        ShaderStage::AnyHit => vk::ShaderStageFlags::ANY_HIT_KHR,
        ShaderStage::ClosestHit => vk::ShaderStageFlags::CLOSEST_HIT_KHR,
        ShaderStage::Miss => vk::ShaderStageFlags::MISS_KHR,
        ShaderStage::Intersection => vk::ShaderStageFlags::INTERSECTION_KHR,
        ShaderStage::Callable => vk::ShaderStageFlags::CALLABLE_KHR,
        ShaderStage::Task => vk::ShaderStageFlags::TASK_EXT,
        ShaderStage::Mesh => vk::ShaderStageFlags::MESH_EXT,
    }
}

/// Create a shader module from SPIR-V words
pub fn create_shader_module(device: &ash::Device, spirv: &[u32]) -> Result<vk::ShaderModule> {
    if spirv.is_empty() {
        engine_error!("ember::vulkan", "Cannot create a shader module from empty SPIR-V");
        return Err(Error::InvalidResource("empty SPIR-V".to_string()));
    }

    let create_info = vk::ShaderModuleCreateInfo::default().code(spirv);

    unsafe { device.create_shader_module(&create_info, None) }.map_err(|e| {
        engine_error!("ember::vulkan", "Could not create shader module: {:?}", e);
        vk_error("Could not create shader module", e)
    })
}

impl VulkanContext {
    /// Create a shader module on this context's device
    ///
    /// The module is owned by the caller and must be destroyed with
    /// [`destroy_shader_module`](Self::destroy_shader_module) before the
    /// context is dropped.
    pub fn create_shader_module(&self, spirv: &[u32]) -> Result<vk::ShaderModule> {
        create_shader_module(self.device(), spirv)
    }

    pub fn destroy_shader_module(&self, module: vk::ShaderModule) {
        unsafe { self.device().destroy_shader_module(module, None) }
    }
}

#[cfg(feature = "shader-compiler")]
fn shader_kind(stage: ShaderStage) -> shaderc::ShaderKind {
    match stage {
        ShaderStage::Vertex => shaderc::ShaderKind::Vertex,
        ShaderStage::TessControl => shaderc::ShaderKind::TessControl,
        ShaderStage::TessEvaluation => shaderc::ShaderKind::TessEvaluation,
        ShaderStage::Geometry => shaderc::ShaderKind::Geometry,
        ShaderStage::Fragment => shaderc::ShaderKind::Fragment,
        ShaderStage::Compute => shaderc::ShaderKind::Compute,
        ShaderStage::RayGeneration => shaderc::ShaderKind::RayGeneration,
        ShaderStage::AnyHit => shaderc::ShaderKind::AnyHit,
        ShaderStage::ClosestHit => shaderc::ShaderKind::ClosestHit,
        ShaderStage::Miss => shaderc::ShaderKind::Miss,
        ShaderStage::Intersection => shaderc::ShaderKind::Intersection,
        ShaderStage::Callable => shaderc::ShaderKind::Callable,
        ShaderStage::Task => shaderc::ShaderKind::Task,
        ShaderStage::Mesh => shaderc::ShaderKind::Mesh,
    }
}

/// Compile GLSL source to SPIR-V
///
/// Targets Vulkan 1.2 with performance optimization and NaN clamping.
/// `#include` directives go through `includes`. With `debug`, `DEBUG` is
/// defined and debug info is emitted.
///
/// # Arguments
///
/// * `file_name` - Name reported in diagnostics and used to resolve relative includes
/// * `source` - GLSL source text
/// * `stage` - Pipeline stage the shader is compiled for
/// * `includes` - Include resolver
/// * `debug` - Define `DEBUG` and generate debug info
#[cfg(feature = "shader-compiler")]
pub fn compile_glsl(
    file_name: &str,
    source: &str,
    stage: ShaderStage,
    includes: &IncludeResolver,
    debug: bool,
) -> Result<Vec<u32>> {
    let compiler = shaderc::Compiler::new().ok_or_else(|| {
        engine_error!("ember::shader", "Failed to create shader compiler");
        Error::InitializationFailed("Failed to create shader compiler".to_string())
    })?;
    let mut options = shaderc::CompileOptions::new().ok_or_else(|| {
        engine_error!("ember::shader", "Failed to create shader compile options");
        Error::InitializationFailed("Failed to create shader compile options".to_string())
    })?;

    if debug {
        options.add_macro_definition("DEBUG", None);
        options.set_generate_debug_info();
    }
    options.set_optimization_level(shaderc::OptimizationLevel::Performance);
    options.set_target_env(shaderc::TargetEnv::Vulkan, shaderc::EnvVersion::Vulkan1_2 as u32);
    options.set_nan_clamp(true);

    options.set_include_callback(|requested, include_type, requesting, depth| {
        let kind = match include_type {
            shaderc::IncludeType::Relative => IncludeKind::Relative,
            shaderc::IncludeType::Standard => IncludeKind::Standard,
        };
        includes
            .resolve(requested, kind, requesting, depth)
            .map(|resolved| shaderc::ResolvedInclude {
                resolved_name: resolved.name,
                content: resolved.content,
            })
            .map_err(|e| e.to_string())
    });

    let artifact = compiler
        .compile_into_spirv(source, shader_kind(stage), file_name, "main", Some(&options))
        .map_err(|e| {
            engine_error!("ember::shader", "{} compilation failure: {}", file_name, e);
            Error::BackendError(format!("{} compilation failure: {}", file_name, e))
        })?;

    if artifact.get_num_warnings() > 0 {
        ember_engine::engine_warn!(
            "ember::shader",
            "{}: {}",
            file_name,
            artifact.get_warning_messages()
        );
    }

    Ok(artifact.as_binary().into())
}

#[cfg(test)]
#[path = "vulkan_shader_tests.rs"]
mod tests;
