/// WGSL shader for textured or flat-colored meshes.
///
/// Group 0 holds the per-object uniforms at a dynamic offset; group 1 the
/// texture and its sampler. `flags.x != 0` selects the texture over the flat
/// color. Meshes without normals are drawn unlit.
pub const MESH_SHADER: &str = r#"
struct ObjectUniforms {
    projection: mat4x4<f32>,
    model_view: mat4x4<f32>,
    color: vec4<f32>,
    flags: vec4<u32>,
};

@group(0) @binding(0)
var<uniform> object: ObjectUniforms;

@group(1) @binding(0)
var base_texture: texture_2d<f32>;
@group(1) @binding(1)
var base_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) texcoord: vec2<f32>,
    @location(2) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) texcoord: vec2<f32>,
    @location(1) view_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = object.projection * object.model_view * vec4<f32>(vertex.position, 1.0);
    out.texcoord = vertex.texcoord;
    out.view_normal = (object.model_view * vec4<f32>(vertex.normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let sampled = textureSample(base_texture, base_sampler, in.texcoord);
    let base = select(object.color, sampled, object.flags.x != 0u);

    var lighting = 1.0;
    let n2 = dot(in.view_normal, in.view_normal);
    if (n2 > 0.0) {
        let light_dir = normalize(vec3<f32>(0.3, 0.8, 0.6));
        lighting = 0.35 + 0.65 * max(dot(in.view_normal * inverseSqrt(n2), light_dir), 0.0);
    }
    return vec4<f32>(base.rgb * lighting, base.a);
}
"#;
