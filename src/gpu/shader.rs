//! WGSL source for the particle billboard pipeline.

/// Billboard shader.
///
/// Instance attributes follow the buffer layout in [`crate::sync`]. Each
/// instance expands into a camera-facing quad whose side is the particle
/// size. Free slots (negative remaining lifetime) are pushed outside the clip
/// volume.
pub const PARTICLE_SHADER: &str = r#"struct Uniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position_size: vec4<f32>,
    @location(1) velocity_damping: vec4<f32>,
    @location(2) color: vec4<f32>,
    @location(3) lifetime: vec2<f32>,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let corner = quad_vertices[vertex_index];

    var out: VertexOutput;
    out.uv = corner;
    out.color = color;

    if lifetime.x < 0.0 {
        out.clip_position = vec4<f32>(0.0, 0.0, 2.0, 1.0);
        out.color = vec4<f32>(0.0);
        return out;
    }

    let view_pos = uniforms.view * vec4<f32>(position_size.xyz, 1.0);
    let offset = vec4<f32>(corner * position_size.w * 0.5, 0.0, 0.0);
    out.clip_position = uniforms.proj * (view_pos + offset);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv);
    if dist > 1.0 {
        discard;
    }
    let falloff = 1.0 - smoothstep(0.5, 1.0, dist);
    return vec4<f32>(in.color.rgb, in.color.a * falloff);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_particle_shader_validates() {
        validate_wgsl(PARTICLE_SHADER).unwrap();
    }

    #[test]
    fn test_shader_locations_match_buffers() {
        for (location, name) in [
            (0, "position_size"),
            (1, "velocity_damping"),
            (2, "color"),
            (3, "lifetime"),
        ] {
            let attr = format!("@location({location}) {name}:");
            assert!(PARTICLE_SHADER.contains(&attr), "missing {attr}");
        }
    }
}
