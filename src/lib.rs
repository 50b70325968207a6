use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

pub mod animation;
pub mod config;
pub mod error;
pub mod loading;
pub mod math;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod strands;

pub use config::FurConfig;
pub use error::{FurError, FurResult, FurWarning};
pub use scene::FurScene;

use loading::{LoadCallbacks, MODEL_ASSET};
use mesh::SourceMesh;
use render::RenderPipeline;

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(target_arch = "wasm32")]
    {
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
    }
}

/// Loading UI hooks supplied by the page
struct JsLoadCallbacks {
    on_progress: Option<js_sys::Function>,
    on_complete: Option<js_sys::Function>,
    on_error: Option<js_sys::Function>,
}

fn call_hook(name: &str, result: Result<JsValue, JsValue>) {
    if let Err(e) = result {
        warn!("{} callback threw: {:?}", name, e);
    }
}

impl LoadCallbacks for JsLoadCallbacks {
    fn on_progress(&self, percent: f32) {
        if let Some(f) = &self.on_progress {
            call_hook("onProgress", f.call1(&JsValue::NULL, &JsValue::from_f64(percent as f64)));
        }
    }

    fn on_complete(&self) {
        if let Some(f) = &self.on_complete {
            call_hook("onComplete", f.call0(&JsValue::NULL));
        }
    }

    fn on_error(&self, error: &FurError) {
        if let Some(f) = &self.on_error {
            call_hook("onError", f.call1(&JsValue::NULL, &JsValue::from_str(&error.to_string())));
        }
    }
}

/// Furred model viewer exposed to JavaScript
///
/// The page loads the model and environment itself and reports back through
/// `begin_asset` / `report_progress` / `add_mesh` / `finish_asset` /
/// `fail_asset`; `render` draws nothing until every asset has finished.
#[wasm_bindgen]
pub struct FurViewer {
    pipeline: RenderPipeline,
    scene: FurScene,
}

#[wasm_bindgen]
impl FurViewer {
    /// Create a viewer on `canvas`, configured by an optional YAML document
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config_yaml: Option<String>) -> Result<FurViewer, JsValue> {
        let config = FurConfig::from_yaml(config_yaml.as_deref().unwrap_or(""))?;

        let width = canvas.width() as i32;
        let height = canvas.height() as i32;

        let gl = canvas
            .get_context("webgl2")?
            .ok_or("Failed to get WebGL2 context")?
            .dyn_into::<WebGl2RenderingContext>()?;

        let pipeline = RenderPipeline::new(gl, width, height, config.shader, config.render)?;
        info!("Fur viewer created ({}x{}, {:?} strands)", width, height, config.shader);

        Ok(Self {
            pipeline,
            scene: FurScene::new(config),
        })
    }

    /// Install loading UI callbacks: `onProgress(percent)`, `onComplete()`,
    /// `onError(message)`
    #[wasm_bindgen]
    pub fn set_callbacks(
        &mut self,
        on_progress: Option<js_sys::Function>,
        on_complete: Option<js_sys::Function>,
        on_error: Option<js_sys::Function>,
    ) {
        self.scene.set_callbacks(Box::new(JsLoadCallbacks {
            on_progress,
            on_complete,
            on_error,
        }));
    }

    /// Announce an asset that must finish before rendering starts
    #[wasm_bindgen]
    pub fn begin_asset(&mut self, name: &str) -> Result<(), JsValue> {
        Ok(self.scene.begin_asset(name)?)
    }

    /// Forward a loader progress event
    #[wasm_bindgen]
    pub fn report_progress(&mut self, name: &str, loaded: f64, total: f64) {
        self.scene.report_progress(name, loaded, total);
    }

    /// Hand over one mesh of the model
    #[wasm_bindgen]
    pub fn add_mesh(
        &mut self,
        name: &str,
        positions: Vec<f32>,
        normals: Option<Vec<f32>>,
        indices: Option<Vec<u32>>,
    ) -> Result<(), JsValue> {
        let mesh = SourceMesh::new(name, positions, normals, indices)?;
        Ok(self.scene.add_mesh(mesh)?)
    }

    /// The model finished loading: grow the fur and upload it
    ///
    /// An upload failure fails the whole load, so rendering never starts
    /// with missing GPU data.
    #[wasm_bindgen]
    pub fn finish_model(&mut self) -> Result<(), JsValue> {
        self.scene.build_fur()?;
        if let Err(err) = self.upload_scene() {
            self.pipeline.clear_strands();
            return Err(self.scene.fail_model(err).into());
        }
        self.scene.complete_model()?;
        Ok(())
    }

    /// Mark an asset finished; returns whether loading is now complete
    #[wasm_bindgen]
    pub fn finish_asset(&mut self, name: &str) -> Result<bool, JsValue> {
        if name == MODEL_ASSET {
            self.finish_model()?;
            return Ok(self.scene.is_ready());
        }
        Ok(self.scene.finish_asset(name)?)
    }

    /// Report a failed asset; loading stops and the viewer never renders.
    /// Returns the error message also passed to `onError`. Failures after
    /// loading completed are ignored.
    #[wasm_bindgen]
    pub fn fail_asset(&mut self, name: &str, message: &str) -> String {
        let err = self.scene.fail_asset(name, message);
        if self.scene.has_failed() {
            self.pipeline.clear_strands();
        }
        err.to_string()
    }

    /// Advance by `dt` seconds and draw; returns `false` when nothing was drawn
    #[wasm_bindgen]
    pub fn render(&mut self, dt: f32) -> bool {
        if !self.scene.advance(dt) {
            return false;
        }
        if let Some(buffer) = self.scene.strands_mut() {
            self.pipeline.sync_strands(buffer);
        }
        self.pipeline.render(self.scene.time());
        true
    }

    /// Resize the viewport
    #[wasm_bindgen]
    pub fn resize(&mut self, width: i32, height: i32) {
        self.pipeline.resize(width, height);
    }

    #[wasm_bindgen]
    pub fn is_ready(&self) -> bool {
        self.scene.is_ready()
    }

    #[wasm_bindgen]
    pub fn has_failed(&self) -> bool {
        self.scene.has_failed()
    }

    /// Overall load progress, 0 to 100
    #[wasm_bindgen]
    pub fn load_percent(&self) -> f32 {
        self.scene.load_percent()
    }

    /// Number of fur line segments being drawn
    #[wasm_bindgen]
    pub fn strand_segment_count(&self) -> u32 {
        self.scene
            .fur()
            .map(|f| u32::try_from(f.buffer.total_segments()).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }

    /// Animation time in seconds
    #[wasm_bindgen]
    pub fn time(&self) -> f32 {
        self.scene.time()
    }

    /// Non-fatal warnings from the fur build
    #[wasm_bindgen]
    pub fn warnings(&self) -> js_sys::Array {
        self.scene
            .warnings()
            .iter()
            .map(|w| JsValue::from_str(&w.to_string()))
            .collect()
    }
}

impl FurViewer {
    fn upload_scene(&mut self) -> FurResult<()> {
        if let Some(mesh) = self.scene.display_mesh() {
            self.pipeline.upload_base_mesh(mesh)?;
        }
        match self.scene.fur() {
            Some(fur) => self.pipeline.upload_strands(&fur.buffer),
            None => {
                self.pipeline.clear_strands();
                Ok(())
            }
        }
    }
}
