use crate::error::RenderError;
use std::path::Path;

/// Lit program: Blinn-Phong point light in view space, optional facade texture.
///
/// Entry points `vs_main` / `fs_main`. Overrides must keep the same
/// bindings and vertex layout.
pub const LIT_SHADER: &str = r#"
struct Uniforms {
    model_view: mat4x4<f32>,
    projection: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    light_position: vec4<f32>,
    light_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var facade: texture_2d<f32>;
@group(1) @binding(1)
var facade_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) color: vec4<f32>,
    @location(4) textured: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_position: vec3<f32>,
    @location(1) view_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) color: vec4<f32>,
    @location(4) textured: f32,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let view_position = uniforms.model_view * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.projection * view_position;
    out.view_position = view_position.xyz;
    out.view_normal = (uniforms.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.uv = vertex.uv;
    out.color = vertex.color;
    out.textured = vertex.textured;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let sampled = textureSample(facade, facade_sampler, in.uv);
    let base = mix(in.color, in.color * sampled, in.textured);

    let n = normalize(in.view_normal);
    let l = normalize(uniforms.light_position.xyz - in.view_position);
    let v = normalize(-in.view_position);
    let h = normalize(l + v);

    let ambient = 0.25;
    let diffuse = max(dot(n, l), 0.0);
    let specular = select(0.0, pow(max(dot(n, h), 0.0), 32.0), diffuse > 0.0);
    let light = uniforms.light_color.rgb;

    let rgb = base.rgb * (ambient + diffuse * light) + 0.3 * specular * light;
    return vec4<f32>(rgb, base.a);
}
"#;

/// Skybox program: cube map sampled by direction, pinned to the far plane.
///
/// Entry points `vs_sky` / `fs_sky`.
pub const SKYBOX_SHADER: &str = r#"
struct Uniforms {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var sky: texture_cube<f32>;
@group(1) @binding(1)
var sky_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_sky(@location(0) position: vec3<f32>) -> SkyOutput {
    let clip = uniforms.projection * uniforms.view * vec4<f32>(position, 1.0);

    var out: SkyOutput;
    // z = w puts every sky fragment at depth 1.0.
    out.clip_position = clip.xyww;
    out.direction = position;
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    return textureSample(sky, sky_sampler, in.direction);
}
"#;

pub const LIT_FILE: &str = "lit.wgsl";
pub const SKYBOX_FILE: &str = "skybox.wgsl";

/// WGSL source for both programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub lit: String,
    pub skybox: String,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ShaderSources {
    pub fn builtin() -> Self {
        Self {
            lit: LIT_SHADER.to_owned(),
            skybox: SKYBOX_SHADER.to_owned(),
        }
    }

    /// Built-in sources, with `lit.wgsl` / `skybox.wgsl` from `dir` taking
    /// their place where present.
    pub fn load(dir: Option<&Path>) -> Result<Self, RenderError> {
        let mut sources = Self::builtin();
        let Some(dir) = dir else {
            return Ok(sources);
        };
        for (file, slot) in [(LIT_FILE, &mut sources.lit), (SKYBOX_FILE, &mut sources.skybox)] {
            let path = dir.join(file);
            if !path.exists() {
                tracing::debug!(path = %path.display(), "no shader override, using built-in");
                continue;
            }
            *slot = std::fs::read_to_string(&path)
                .map_err(|source| RenderError::ShaderRead { path: path.clone(), source })?;
            tracing::info!(path = %path.display(), "loaded shader override");
        }
        Ok(sources)
    }
}
