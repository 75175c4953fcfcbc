//! WebGL port overlay.
//!
//! Ports are drawn as point sprites on a transparent canvas stacked above
//! the Canvas2D layer. Hover and drag origin get a soft glow, connected
//! ports get a plug dot. The whole layer is optional: context or shader
//! failures leave the Canvas2D fallback ports in charge.

use fc_render::surface::{PortOverlay, PortSprite, PortState};
use web_sys::{WebGlBuffer, WebGlProgram, WebGlRenderingContext as Gl, WebGlShader, WebGlUniformLocation};

/// Floats per sprite: x, y, radius, r, g, b, a, glow, plug.
pub const STRIDE: usize = 9;
/// Sprite extent relative to the port radius; the rest is glow.
const GLOW_SPREAD: f32 = 2.0;

const VERTEX_SHADER: &str = r#"
attribute vec2 a_pos;
attribute float a_radius;
attribute vec4 a_color;
attribute float a_glow;
attribute float a_plug;
uniform vec2 u_resolution;
uniform float u_pixel_ratio;
uniform float u_spread;
varying vec4 v_color;
varying float v_glow;
varying float v_plug;
varying float v_core;
void main() {
    vec2 clip = (a_pos / u_resolution) * 2.0 - 1.0;
    gl_Position = vec4(clip.x, -clip.y, 0.0, 1.0);
    gl_PointSize = a_radius * u_spread * 2.0 * u_pixel_ratio;
    v_color = a_color;
    v_glow = a_glow;
    v_plug = a_plug;
    v_core = 1.0 / u_spread;
}
"#;

const FRAGMENT_SHADER: &str = r#"
precision mediump float;
varying vec4 v_color;
varying float v_glow;
varying float v_plug;
varying float v_core;
void main() {
    float d = length(gl_PointCoord - vec2(0.5)) * 2.0;
    if (d > 1.0) discard;
    float edge = 0.08;
    float body = 1.0 - smoothstep(v_core - edge, v_core, d);
    float halo = v_glow * (1.0 - body) * pow(1.0 - d, 2.0);
    vec3 rgb = v_color.rgb;
    float plug = v_plug * (1.0 - smoothstep(v_core * 0.4 - edge, v_core * 0.4, d));
    rgb = mix(rgb, vec3(1.0), plug * 0.85);
    float alpha = max(body * v_color.a, halo * 0.6);
    gl_FragColor = vec4(rgb * alpha, alpha);
}
"#;

/// Interleave sprites into the vertex layout described by [`STRIDE`].
pub fn pack_sprites(sprites: &[PortSprite]) -> Vec<f32> {
    let mut out = Vec::with_capacity(sprites.len() * STRIDE);
    for s in sprites {
        let glow = match s.state {
            PortState::Idle => 0.0,
            PortState::Hover => 0.6,
            PortState::Active => 1.0,
        };
        out.extend_from_slice(&[
            s.center.x as f32,
            s.center.y as f32,
            s.radius as f32,
            s.color.r,
            s.color.g,
            s.color.b,
            s.color.a,
            glow,
            if s.connected { 1.0 } else { 0.0 },
        ]);
    }
    out
}

struct Attribs {
    pos: u32,
    radius: u32,
    color: u32,
    glow: u32,
    plug: u32,
}

pub struct WebGlPortOverlay {
    gl: Gl,
    program: WebGlProgram,
    buffer: WebGlBuffer,
    attribs: Attribs,
    u_resolution: Option<WebGlUniformLocation>,
    u_pixel_ratio: Option<WebGlUniformLocation>,
    u_spread: Option<WebGlUniformLocation>,
    pixel_ratio: f32,
    drawn: usize,
}

impl WebGlPortOverlay {
    /// Compile shaders and allocate the sprite buffer. `None` when any
    /// step fails; the reason is logged.
    pub fn new(gl: Gl) -> Option<Self> {
        let program = match link_program(&gl) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("port overlay disabled: {e}");
                return None;
            }
        };
        let attrib = |name: &str| {
            let loc = gl.get_attrib_location(&program, name);
            u32::try_from(loc).ok()
        };
        let attribs = Attribs {
            pos: attrib("a_pos")?,
            radius: attrib("a_radius")?,
            color: attrib("a_color")?,
            glow: attrib("a_glow")?,
            plug: attrib("a_plug")?,
        };
        let Some(buffer) = gl.create_buffer() else {
            log::warn!("port overlay disabled: no vertex buffer");
            return None;
        };
        let u_resolution = gl.get_uniform_location(&program, "u_resolution");
        let u_pixel_ratio = gl.get_uniform_location(&program, "u_pixel_ratio");
        let u_spread = gl.get_uniform_location(&program, "u_spread");
        Some(Self {
            gl,
            program,
            buffer,
            attribs,
            u_resolution,
            u_pixel_ratio,
            u_spread,
            pixel_ratio: 1.0,
            drawn: 0,
        })
    }

    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl PortOverlay for WebGlPortOverlay {
    fn begin_frame(&mut self, width: f64, height: f64) {
        let gl = &self.gl;
        let (bw, bh) = (gl.drawing_buffer_width(), gl.drawing_buffer_height());
        self.pixel_ratio = if width > 0.0 {
            (bw as f64 / width) as f32
        } else {
            1.0
        };
        gl.viewport(0, 0, bw, bh);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(Gl::COLOR_BUFFER_BIT);
        gl.use_program(Some(&self.program));
        gl.uniform2f(self.u_resolution.as_ref(), width as f32, height as f32);
        gl.uniform1f(self.u_pixel_ratio.as_ref(), self.pixel_ratio);
        gl.uniform1f(self.u_spread.as_ref(), GLOW_SPREAD);
        gl.enable(Gl::BLEND);
        gl.blend_func(Gl::ONE, Gl::ONE_MINUS_SRC_ALPHA);
        self.drawn = 0;
    }

    fn draw_ports(&mut self, sprites: &[PortSprite]) {
        if sprites.is_empty() {
            return;
        }
        let data = pack_sprites(sprites);
        let gl = &self.gl;
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&self.buffer));
        let array = js_sys::Float32Array::from(data.as_slice());
        gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &array, Gl::STREAM_DRAW);

        let stride = (STRIDE * 4) as i32;
        let a = &self.attribs;
        for (index, size, offset) in [
            (a.pos, 2, 0),
            (a.radius, 1, 2),
            (a.color, 4, 3),
            (a.glow, 1, 7),
            (a.plug, 1, 8),
        ] {
            gl.enable_vertex_attrib_array(index);
            gl.vertex_attrib_pointer_with_i32(index, size, Gl::FLOAT, false, stride, offset * 4);
        }
        gl.draw_arrays(Gl::POINTS, 0, sprites.len() as i32);
        self.drawn += sprites.len();
        log::trace!("overlay drew {} ports", sprites.len());
    }

    fn end_frame(&mut self) {
        self.gl.flush();
    }
}

// ─── Shader setup ────────────────────────────────────────────────────────

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader, String> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| "unable to create shader".to_string())?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    let ok = gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(format!("shader compile failed: {log}"))
    }
}

fn link_program(gl: &Gl) -> Result<WebGlProgram, String> {
    let vs = compile_shader(gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
    let fs = compile_shader(gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
    let program = gl
        .create_program()
        .ok_or_else(|| "unable to create program".to_string())?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    let ok = gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        Err(format!("program link failed: {log}"))
    }
}
