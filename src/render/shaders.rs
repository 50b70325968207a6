//! GLSL ES 3.00 sources.
//!
//! Strand shader permutations are assembled with `concat!` at compile time;
//! [`ShaderVariant`] picks one when the pipeline is built.

use serde::{Deserialize, Serialize};

macro_rules! glsl_header {
    () => {
        "#version 300 es\nprecision highp float;\n"
    };
}

macro_rules! strand_fragment_inputs {
    () => {
        r#"
in vec3 v_color;
in float v_progress;

out vec4 fragColor;
"#
    };
}

/// Vertex shader for the base model
pub const MESH_VERTEX_SHADER: &str = concat!(glsl_header!(), r#"
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;

uniform mat4 u_model;
uniform mat4 u_view;
uniform mat4 u_projection;

out vec3 v_normal;

void main() {
    v_normal = mat3(u_model) * a_normal;
    gl_Position = u_projection * u_view * u_model * vec4(a_position, 1.0);
}
"#);

/// Fragment shader for the base model: one directional light plus ambient
pub const MESH_FRAGMENT_SHADER: &str = concat!(glsl_header!(), r#"
in vec3 v_normal;

uniform vec3 u_base_color;

out vec4 fragColor;

void main() {
    vec3 normal = normalize(v_normal);
    vec3 light_dir = normalize(vec3(-5.0, 5.0, -5.0));
    float diffuse = max(dot(normal, light_dir), 0.0) * 0.8;
    vec3 color = u_base_color * (0.4 + diffuse);
    fragColor = vec4(color, 1.0);
}
"#);

/// Vertex shader shared by every strand variant
///
/// `v_progress` runs from 0 at the root to 1 at the tip, derived from the
/// point's position inside its strand's run of `2 * u_segments` points.
pub const STRAND_VERTEX_SHADER: &str = concat!(glsl_header!(), r#"
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;

uniform mat4 u_model;
uniform mat4 u_view;
uniform mat4 u_projection;
uniform int u_segments;

out vec3 v_color;
out float v_progress;

void main() {
    int local = gl_VertexID % (2 * u_segments);
    int along = local / 2 + local % 2;
    v_progress = float(along) / float(u_segments);
    v_color = a_color;
    gl_Position = u_projection * u_view * u_model * vec4(a_position, 1.0);
}
"#);

/// Vertex colors as they are
pub const STRAND_FRAGMENT_PLAIN: &str = concat!(glsl_header!(), strand_fragment_inputs!(), r#"
void main() {
    fragColor = vec4(v_color, 1.0);
}
"#);

/// Vertex colors with a slow shimmer travelling up the strand
pub const STRAND_FRAGMENT_TIMED: &str = concat!(glsl_header!(), strand_fragment_inputs!(), r#"
uniform float u_time;

void main() {
    float shimmer = 0.9 + 0.1 * sin(u_time * 3.0 - v_progress * 6.0);
    fragColor = vec4(v_color * shimmer, 1.0);
}
"#);

/// Shimmer plus alpha fading towards the tip, drawn with blending enabled
pub const STRAND_FRAGMENT_TIMED_BLEND: &str = concat!(glsl_header!(), strand_fragment_inputs!(), r#"
uniform float u_time;

void main() {
    float shimmer = 0.9 + 0.1 * sin(u_time * 3.0 - v_progress * 6.0);
    float alpha = mix(1.0, 0.25, v_progress);
    fragColor = vec4(v_color * shimmer, alpha);
}
"#);

/// Strand shader permutation, chosen once when the pipeline is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderVariant {
    /// Static vertex colors
    Plain,
    /// Time uniform driving a color shimmer
    #[default]
    Timed,
    /// Time uniform plus alpha blending that fades strand tips
    TimedBlend,
}

impl ShaderVariant {
    pub fn vertex_source(self) -> &'static str {
        STRAND_VERTEX_SHADER
    }

    pub fn fragment_source(self) -> &'static str {
        match self {
            ShaderVariant::Plain => STRAND_FRAGMENT_PLAIN,
            ShaderVariant::Timed => STRAND_FRAGMENT_TIMED,
            ShaderVariant::TimedBlend => STRAND_FRAGMENT_TIMED_BLEND,
        }
    }

    /// Whether the program reads `u_time`
    pub fn uses_time(self) -> bool {
        !matches!(self, ShaderVariant::Plain)
    }

    /// Whether strands are drawn with alpha blending
    pub fn blends(self) -> bool {
        matches!(self, ShaderVariant::TimedBlend)
    }
}
