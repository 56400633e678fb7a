//! Accelerated tier: particle field drawn with WebGL
//!
//! Owns a canvas appended to the backdrop container, one shader program,
//! two dynamic vertex buffers (points and line segments), a frame-limited
//! animation loop and the window resize / mousemove listeners. Everything is
//! created in [`OptimizedStrategy::mount`] and released in `dispose`.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Float32Array, Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, HtmlElement, MouseEvent, WebGlBuffer, WebGlProgram,
    WebGlRenderingContext as GL, WebGlShader, WebGlUniformLocation, Window,
};

use super::probe::{lose_context, open_context};
use crate::core::backdrop::{
    AnimationLoop, BackdropError, BackdropResult, Camera, FrameLimiter, FrameScheduler,
    ParticleField, PointerPosition, RenderStrategy, RenderTier, TierSettings, backing_size,
};

const VERTEX_SHADER: &str = r#"
attribute vec3 a_position;
uniform mat4 u_mvp;
uniform float u_point_scale;
void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    gl_PointSize = max(1.0, u_point_scale / gl_Position.w);
}
"#;

const FRAGMENT_SHADER: &str = r#"
precision mediump float;
uniform vec4 u_color;
uniform float u_round;
void main() {
    if (u_round > 0.5 && length(gl_PointCoord - vec2(0.5)) > 0.5) {
        discard;
    }
    gl_FragColor = u_color;
}
"#;

/// Indigo particles (#6366f1 at 60%)
const POINT_COLOR: [f32; 4] = [0.388, 0.4, 0.945, 0.6];

/// Faint violet links (#553388 at 10%)
const LINE_COLOR: [f32; 4] = [0.333, 0.2, 0.533, 0.1];

/// Particle diameter in world units
const POINT_SIZE: f32 = 0.2;

fn dom_error(context: &str, err: JsValue) -> BackdropError {
    BackdropError::Dom(format!("{context}: {err:?}"))
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> BackdropResult<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or(BackdropError::ResourceAllocation("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(BackdropError::ShaderCompile(log))
    }
}

fn link_program(gl: &GL, vertex: &WebGlShader, fragment: &WebGlShader) -> BackdropResult<WebGlProgram> {
    let program = gl
        .create_program()
        .ok_or(BackdropError::ResourceAllocation("shader program"))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(BackdropError::ProgramLink(log))
    }
}

/// Dynamic vertex buffer sized for `floats` values
fn create_buffer(gl: &GL, floats: usize, what: &'static str) -> BackdropResult<WebGlBuffer> {
    let buffer = gl
        .create_buffer()
        .ok_or(BackdropError::ResourceAllocation(what))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    gl.buffer_data_with_i32(GL::ARRAY_BUFFER, (floats * 4) as i32, GL::DYNAMIC_DRAW);
    Ok(buffer)
}

/// GPU objects, each released only if it was created
#[derive(Default)]
struct GlResources {
    vertex_shader: Option<WebGlShader>,
    fragment_shader: Option<WebGlShader>,
    program: Option<WebGlProgram>,
    point_buffer: Option<WebGlBuffer>,
    segment_buffer: Option<WebGlBuffer>,
}

impl GlResources {
    fn build(&mut self, gl: &GL, field: &ParticleField) -> BackdropResult<()> {
        let vertex = compile_shader(gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
        self.vertex_shader = Some(vertex.clone());
        let fragment = compile_shader(gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        self.fragment_shader = Some(fragment.clone());
        self.program = Some(link_program(gl, &vertex, &fragment)?);
        self.point_buffer = Some(create_buffer(gl, field.position_buffer_len(), "point buffer")?);
        self.segment_buffer = Some(create_buffer(gl, field.segment_buffer_len(), "segment buffer")?);
        Ok(())
    }

    fn release(&mut self, gl: &GL) {
        if let Some(buffer) = self.point_buffer.take() {
            gl.delete_buffer(Some(&buffer));
        }
        if let Some(buffer) = self.segment_buffer.take() {
            gl.delete_buffer(Some(&buffer));
        }
        if let Some(program) = self.program.take() {
            gl.delete_program(Some(&program));
        }
        if let Some(shader) = self.vertex_shader.take() {
            gl.delete_shader(Some(&shader));
        }
        if let Some(shader) = self.fragment_shader.take() {
            gl.delete_shader(Some(&shader));
        }
    }
}

struct Uniforms {
    mvp: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    point_scale: Option<WebGlUniformLocation>,
    round: Option<WebGlUniformLocation>,
}

/// Everything the frame loop and the listeners touch
struct Scene {
    gl: GL,
    canvas: HtmlCanvasElement,
    program: WebGlProgram,
    point_buffer: WebGlBuffer,
    segment_buffer: WebGlBuffer,
    position_attribute: u32,
    uniforms: Uniforms,
    field: ParticleField,
    camera: Camera,
    pointer: PointerPosition,
    limiter: FrameLimiter,
    viewport: (f64, f64),
    backing_height: f64,
    // Host-side staging and the persistent JS views uploaded from them
    point_data: Vec<f32>,
    segment_data: Vec<f32>,
    point_array: Float32Array,
    segment_array: Float32Array,
}

impl Scene {
    fn new(
        gl: GL,
        canvas: HtmlCanvasElement,
        resources: &GlResources,
        field: ParticleField,
        settings: &TierSettings,
    ) -> BackdropResult<Self> {
        let (Some(program), Some(point_buffer), Some(segment_buffer)) = (
            resources.program.clone(),
            resources.point_buffer.clone(),
            resources.segment_buffer.clone(),
        ) else {
            return Err(BackdropError::ResourceAllocation("scene resources"));
        };

        let position_attribute = gl.get_attrib_location(&program, "a_position");
        if position_attribute < 0 {
            return Err(BackdropError::ProgramLink("a_position is not active".into()));
        }

        let uniforms = Uniforms {
            mvp: gl.get_uniform_location(&program, "u_mvp"),
            color: gl.get_uniform_location(&program, "u_color"),
            point_scale: gl.get_uniform_location(&program, "u_point_scale"),
            round: gl.get_uniform_location(&program, "u_round"),
        };

        let point_data = vec![0.0; field.position_buffer_len()];
        let segment_data = vec![0.0; field.segment_buffer_len()];

        Ok(Self {
            gl,
            canvas,
            program,
            point_buffer,
            segment_buffer,
            position_attribute: position_attribute as u32,
            uniforms,
            point_array: Float32Array::new_with_length(point_data.len() as u32),
            segment_array: Float32Array::new_with_length(segment_data.len() as u32),
            point_data,
            segment_data,
            field,
            camera: Camera::default(),
            pointer: PointerPosition::default(),
            limiter: FrameLimiter::new(settings.frame_interval_ms()),
            viewport: (1.0, 1.0),
            backing_height: 1.0,
        })
    }

    /// Match the canvas to the window; particles are left untouched
    fn resize(&mut self, window: &Window) {
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let (backing_width, backing_height) = backing_size(width, height, window.device_pixel_ratio());

        self.canvas.set_width(backing_width);
        self.canvas.set_height(backing_height);
        self.gl.viewport(0, 0, backing_width as i32, backing_height as i32);
        self.camera.set_viewport(width, height);
        self.viewport = (width, height);
        self.backing_height = f64::from(backing_height);
    }

    fn pointer_moved(&mut self, event: &MouseEvent) {
        let (width, height) = self.viewport;
        self.pointer = PointerPosition::from_client(
            f64::from(event.client_x()),
            f64::from(event.client_y()),
            width,
            height,
        );
    }

    fn frame(&mut self, now: f64) {
        if !self.limiter.should_render(now) {
            return;
        }
        self.field.step(self.pointer);
        self.draw();
    }

    fn draw(&mut self) {
        let gl = &self.gl;
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.use_program(Some(&self.program));

        let mvp = self.camera.model_view_projection(self.field.rotation());
        gl.uniform_matrix4fv_with_f32_array(self.uniforms.mvp.as_ref(), false, &mvp.to_cols_array());
        gl.uniform1f(
            self.uniforms.point_scale.as_ref(),
            self.camera.point_scale(self.backing_height, POINT_SIZE),
        );
        gl.enable_vertex_attrib_array(self.position_attribute);

        if !self.segment_data.is_empty() {
            self.field.write_segments(&mut self.segment_data);
            self.segment_array.copy_from(&self.segment_data);
            self.upload(&self.segment_buffer, &self.segment_array);
            set_color(gl, self.uniforms.color.as_ref(), LINE_COLOR);
            gl.uniform1f(self.uniforms.round.as_ref(), 0.0);
            gl.draw_arrays(GL::LINES, 0, (self.segment_data.len() / 3) as i32);
        }

        if !self.point_data.is_empty() {
            self.field.write_positions(&mut self.point_data);
            self.point_array.copy_from(&self.point_data);
            self.upload(&self.point_buffer, &self.point_array);
            set_color(gl, self.uniforms.color.as_ref(), POINT_COLOR);
            gl.uniform1f(self.uniforms.round.as_ref(), 1.0);
            gl.draw_arrays(GL::POINTS, 0, (self.point_data.len() / 3) as i32);
        }
    }

    fn upload(&self, buffer: &WebGlBuffer, data: &Float32Array) {
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        self.gl
            .buffer_sub_data_with_i32_and_array_buffer_view(GL::ARRAY_BUFFER, 0, data);
        self.gl
            .vertex_attrib_pointer_with_i32(self.position_attribute, 3, GL::FLOAT, false, 0, 0);
    }
}

fn set_color(gl: &GL, location: Option<&WebGlUniformLocation>, [r, g, b, a]: [f32; 4]) {
    gl.uniform4f(location, r, g, b, a);
}

/// A window listener removed on [`remove`](Self::remove)
struct WindowListener {
    event: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl WindowListener {
    fn add(
        window: &Window,
        event: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> BackdropResult<Self> {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        window
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|err| dom_error(event, err))?;
        Ok(Self { event, closure })
    }

    fn remove(self) {
        if let Some(window) = web_sys::window() {
            let _ = window
                .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
        }
    }
}

/// Context attributes: no antialiasing, transparent, prefer the fast GPU
fn context_attributes() -> JsValue {
    let attributes = Object::new();
    let _ = Reflect::set(&attributes, &"antialias".into(), &JsValue::FALSE);
    let _ = Reflect::set(&attributes, &"alpha".into(), &JsValue::TRUE);
    let _ = Reflect::set(&attributes, &"powerPreference".into(), &"high-performance".into());
    attributes.into()
}

pub struct OptimizedStrategy {
    gl: Option<GL>,
    canvas: Option<HtmlCanvasElement>,
    resources: GlResources,
    scene: Option<Rc<RefCell<Scene>>>,
    animation: Option<AnimationLoop>,
    listeners: Vec<WindowListener>,
}

impl OptimizedStrategy {
    /// Build the canvas, context and GPU objects and start drawing.
    /// Anything created before a failure is released again.
    pub fn mount(
        container: &HtmlElement,
        settings: TierSettings,
        scheduler: Rc<dyn FrameScheduler>,
    ) -> BackdropResult<Self> {
        let mut strategy = Self {
            gl: None,
            canvas: None,
            resources: GlResources::default(),
            scene: None,
            animation: None,
            listeners: Vec::new(),
        };

        match strategy.start(container, settings.clamped(), scheduler) {
            Ok(()) => Ok(strategy),
            Err(err) => {
                strategy.dispose();
                Err(err)
            }
        }
    }

    fn start(
        &mut self,
        container: &HtmlElement,
        settings: TierSettings,
        scheduler: Rc<dyn FrameScheduler>,
    ) -> BackdropResult<()> {
        let window = web_sys::window().ok_or_else(|| BackdropError::Dom("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| BackdropError::Dom("no document".into()))?;

        let canvas = document
            .create_element("canvas")
            .map_err(|err| dom_error("create canvas", err))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| BackdropError::Dom("canvas element has the wrong type".into()))?;
        self.canvas = Some(canvas.clone());

        let gl = open_context(&canvas, Some(&context_attributes()))
            .ok_or(BackdropError::ContextUnavailable)?;
        self.gl = Some(gl.clone());

        let field = ParticleField::generate(&settings, &mut rand::thread_rng());
        self.resources.build(&gl, &field)?;

        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);

        let mut scene = Scene::new(gl, canvas.clone(), &self.resources, field, &settings)?;
        scene.resize(&window);
        let scene = Rc::new(RefCell::new(scene));
        self.scene = Some(scene.clone());

        container
            .append_child(&canvas)
            .map_err(|err| dom_error("append canvas", err))?;

        let on_resize = {
            let scene = scene.clone();
            move |_: web_sys::Event| {
                if let (Some(window), Ok(mut scene)) = (web_sys::window(), scene.try_borrow_mut()) {
                    scene.resize(&window);
                }
            }
        };
        self.listeners.push(WindowListener::add(&window, "resize", on_resize)?);

        let on_pointer = {
            let scene = scene.clone();
            move |event: web_sys::Event| {
                if let (Some(mouse), Ok(mut scene)) =
                    (event.dyn_ref::<MouseEvent>(), scene.try_borrow_mut())
                {
                    scene.pointer_moved(mouse);
                }
            }
        };
        self.listeners.push(WindowListener::add(&window, "mousemove", on_pointer)?);

        self.animation = Some(AnimationLoop::start(scheduler, move |now| {
            if let Ok(mut scene) = scene.try_borrow_mut() {
                scene.frame(now);
            }
        }));

        Ok(())
    }
}

impl RenderStrategy for OptimizedStrategy {
    fn tier(&self) -> RenderTier {
        RenderTier::Optimized
    }

    fn dispose(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.cancel();
        }
        for listener in self.listeners.drain(..) {
            listener.remove();
        }
        self.scene = None;
        if let Some(gl) = self.gl.take() {
            self.resources.release(&gl);
            lose_context(&gl);
        }
        if let Some(canvas) = self.canvas.take() {
            canvas.remove();
        }
    }
}

impl Drop for OptimizedStrategy {
    fn drop(&mut self) {
        self.dispose();
    }
}
