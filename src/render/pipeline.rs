use log::{debug, info};
use web_sys::{WebGl2RenderingContext, WebGlBuffer, WebGlProgram, WebGlUniformLocation, WebGlVertexArrayObject};
use crate::config::RenderSettings;
use crate::error::{FurError, FurResult};
use crate::math::{Mat4, Vec3};
use crate::mesh::SourceMesh;
use crate::strands::StrandBuffer;
use super::shaders::*;
use super::webgl::WebGLContext;

/// Convert an element count to the `GLsizei` WebGL draw calls take
fn gl_count(count: usize, what: &str) -> FurResult<i32> {
    i32::try_from(count)
        .map_err(|_| FurError::Render(format!("{} count {} exceeds the WebGL limit", what, count)))
}

/// Cached uniform locations for the base mesh shader
struct MeshUniforms {
    model: Option<WebGlUniformLocation>,
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    base_color: Option<WebGlUniformLocation>,
}

/// Cached uniform locations for the strand shader
struct StrandUniforms {
    model: Option<WebGlUniformLocation>,
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    segments: Option<WebGlUniformLocation>,
    time: Option<WebGlUniformLocation>,
}

/// GPU copy of the base mesh
struct MeshGpu {
    vao: WebGlVertexArrayObject,
    _buffers: Vec<WebGlBuffer>,
    count: i32,
    indexed: bool,
}

/// GPU copy of the strand buffer
struct StrandGpu {
    vao: WebGlVertexArrayObject,
    positions: WebGlBuffer,
    _colors: WebGlBuffer,
    point_count: i32,
    segment_count: i32,
}

/// Draws the base model and its fur
pub struct RenderPipeline {
    ctx: WebGLContext,
    variant: ShaderVariant,
    settings: RenderSettings,

    mesh_program: WebGlProgram,
    strand_program: WebGlProgram,
    mesh_uniforms: MeshUniforms,
    strand_uniforms: StrandUniforms,

    mesh: Option<MeshGpu>,
    strands: Option<StrandGpu>,

    width: i32,
    height: i32,
}

impl RenderPipeline {
    pub fn new(
        gl: WebGl2RenderingContext,
        width: i32,
        height: i32,
        variant: ShaderVariant,
        settings: RenderSettings,
    ) -> FurResult<Self> {
        let ctx = WebGLContext::new(gl);

        let mesh_program = ctx.create_program(MESH_VERTEX_SHADER, MESH_FRAGMENT_SHADER)?;
        let strand_program = ctx.create_program(variant.vertex_source(), variant.fragment_source())?;
        debug!("Compiled strand shader variant {:?}", variant);

        let mesh_uniforms = MeshUniforms {
            model: ctx.get_uniform_location(&mesh_program, "u_model"),
            view: ctx.get_uniform_location(&mesh_program, "u_view"),
            projection: ctx.get_uniform_location(&mesh_program, "u_projection"),
            base_color: ctx.get_uniform_location(&mesh_program, "u_base_color"),
        };

        let strand_uniforms = StrandUniforms {
            model: ctx.get_uniform_location(&strand_program, "u_model"),
            view: ctx.get_uniform_location(&strand_program, "u_view"),
            projection: ctx.get_uniform_location(&strand_program, "u_projection"),
            segments: ctx.get_uniform_location(&strand_program, "u_segments"),
            time: if variant.uses_time() {
                ctx.get_uniform_location(&strand_program, "u_time")
            } else {
                None
            },
        };

        Ok(Self {
            ctx,
            variant,
            settings,
            mesh_program,
            strand_program,
            mesh_uniforms,
            strand_uniforms,
            mesh: None,
            strands: None,
            width,
            height,
        })
    }

    /// Upload the model the fur grows on
    pub fn upload_base_mesh(&mut self, mesh: &SourceMesh) -> FurResult<()> {
        let gl = &self.ctx.gl;

        let vao = self.ctx.create_vao()?;
        gl.bind_vertex_array(Some(&vao));

        let positions = self.ctx.create_buffer_f32(mesh.positions(), WebGl2RenderingContext::STATIC_DRAW)?;
        self.ctx.bind_vec3_attribute(&positions, 0);
        let mut buffers = vec![positions];

        match mesh.normals() {
            Some(normals) => {
                let normals = self.ctx.create_buffer_f32(normals, WebGl2RenderingContext::STATIC_DRAW)?;
                self.ctx.bind_vec3_attribute(&normals, 1);
                buffers.push(normals);
            }
            None => {
                gl.disable_vertex_attrib_array(1);
                gl.vertex_attrib3f(1, 0.0, 1.0, 0.0);
            }
        }

        let (count, indexed) = match mesh.indices() {
            Some(indices) => {
                let index_buffer = self.ctx.create_index_buffer(indices, WebGl2RenderingContext::STATIC_DRAW)?;
                gl.bind_buffer(WebGl2RenderingContext::ELEMENT_ARRAY_BUFFER, Some(&index_buffer));
                buffers.push(index_buffer);
                (gl_count(indices.len(), "index")?, true)
            }
            None => (gl_count(mesh.vertex_count(), "vertex")?, false),
        };

        gl.bind_vertex_array(None);
        gl.bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, None);

        debug!("Uploaded base mesh '{}' ({} vertices)", mesh.name, mesh.vertex_count());
        self.mesh = Some(MeshGpu {
            vao,
            _buffers: buffers,
            count,
            indexed,
        });
        Ok(())
    }

    /// Upload a freshly generated strand buffer
    ///
    /// Positions go to a dynamic buffer rewritten by [`Self::sync_strands`];
    /// colors never change.
    pub fn upload_strands(&mut self, buffer: &StrandBuffer) -> FurResult<()> {
        if buffer.is_empty() {
            self.strands = None;
            return Ok(());
        }
        let point_count = gl_count(buffer.point_count(), "strand point")?;
        let segment_count = gl_count(buffer.segment_count(), "strand segment")?;

        let gl = &self.ctx.gl;
        let vao = self.ctx.create_vao()?;
        gl.bind_vertex_array(Some(&vao));

        let positions = self.ctx.create_buffer_f32(buffer.positions(), WebGl2RenderingContext::DYNAMIC_DRAW)?;
        self.ctx.bind_vec3_attribute(&positions, 0);

        let colors = self.ctx.create_buffer_f32(buffer.colors(), WebGl2RenderingContext::STATIC_DRAW)?;
        self.ctx.bind_vec3_attribute(&colors, 1);

        gl.bind_vertex_array(None);
        gl.bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, None);

        info!(
            "Uploaded {} fur strands ({} line segments)",
            buffer.strand_count(),
            buffer.total_segments()
        );
        self.strands = Some(StrandGpu {
            vao,
            positions,
            _colors: colors,
            point_count,
            segment_count,
        });
        Ok(())
    }

    /// Re-upload strand positions if the buffer changed since the last sync
    pub fn sync_strands(&mut self, buffer: &mut StrandBuffer) -> bool {
        let Some(gpu) = self.strands.as_ref() else {
            return false;
        };
        if !buffer.take_dirty() {
            return false;
        }
        if i32::try_from(buffer.point_count()) != Ok(gpu.point_count) {
            return false;
        }
        self.ctx.update_buffer_f32(&gpu.positions, buffer.positions());
        true
    }

    pub fn clear_strands(&mut self) {
        self.strands = None;
    }

    /// Render a frame
    pub fn render(&self, time: f32) {
        let gl = &self.ctx.gl;
        let settings = &self.settings;

        let aspect = self.width as f32 / self.height.max(1) as f32;
        let projection = Mat4::perspective(settings.fov_radians(), aspect, settings.near, settings.far);
        let view = Mat4::look_at(settings.camera_position, settings.camera_target, Vec3::UP);
        let model = Mat4::rotation_y(settings.model_yaw);

        self.ctx.viewport(0, 0, self.width, self.height);
        let clear = settings.clear_color;
        self.ctx.clear(clear.r, clear.g, clear.b, 1.0);
        self.ctx.enable_depth_test();
        self.ctx.disable_blending();

        if let Some(mesh) = &self.mesh {
            gl.use_program(Some(&self.mesh_program));

            self.ctx.uniform_matrix4fv(self.mesh_uniforms.model.as_ref(), model.as_slice());
            self.ctx.uniform_matrix4fv(self.mesh_uniforms.view.as_ref(), view.as_slice());
            self.ctx.uniform_matrix4fv(self.mesh_uniforms.projection.as_ref(), projection.as_slice());
            let color = settings.mesh_color;
            self.ctx.uniform_3f(self.mesh_uniforms.base_color.as_ref(), color.r, color.g, color.b);

            gl.bind_vertex_array(Some(&mesh.vao));
            if mesh.indexed {
                gl.draw_elements_with_i32(
                    WebGl2RenderingContext::TRIANGLES,
                    mesh.count,
                    WebGl2RenderingContext::UNSIGNED_INT,
                    0,
                );
            } else {
                gl.draw_arrays(WebGl2RenderingContext::TRIANGLES, 0, mesh.count);
            }
        }

        // Missing or empty fur is simply not drawn
        if let Some(strands) = &self.strands {
            gl.use_program(Some(&self.strand_program));
            if self.variant.blends() {
                self.ctx.enable_blending();
            }

            self.ctx.uniform_matrix4fv(self.strand_uniforms.model.as_ref(), model.as_slice());
            self.ctx.uniform_matrix4fv(self.strand_uniforms.view.as_ref(), view.as_slice());
            self.ctx.uniform_matrix4fv(self.strand_uniforms.projection.as_ref(), projection.as_slice());
            self.ctx.uniform_1i(self.strand_uniforms.segments.as_ref(), strands.segment_count);
            if self.variant.uses_time() {
                self.ctx.uniform_1f(self.strand_uniforms.time.as_ref(), time);
            }

            gl.line_width(settings.line_width);
            gl.bind_vertex_array(Some(&strands.vao));
            gl.draw_arrays(WebGl2RenderingContext::LINES, 0, strands.point_count);
        }

        gl.bind_vertex_array(None);
    }

    /// Track a new viewport size
    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }
}
