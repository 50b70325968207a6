//! Fur scene state driven by the page: load lifecycle, strand build and
//! per-frame animation, independent of WebGL.

use log::{info, warn};
use crate::animation::{FrameClock, StrandAnimator};
use crate::config::FurConfig;
use crate::error::{FurError, FurResult, FurWarning};
use crate::loading::{LoadCallbacks, LoadState, LoadTracker, MODEL_ASSET};
use crate::mesh::SourceMesh;
use crate::strands::{StrandBuffer, StrandGenerator};

/// Strands grown on the selected mesh, with their animator
pub struct Fur {
    pub buffer: StrandBuffer,
    animator: StrandAnimator,
    /// Index into the scene's meshes of the mesh the fur grows on
    pub mesh_index: Option<usize>,
}

pub struct FurScene {
    config: FurConfig,
    tracker: LoadTracker,
    meshes: Vec<SourceMesh>,
    fur: Option<Fur>,
    warnings: Vec<FurWarning>,
    clock: FrameClock,
}

impl FurScene {
    /// New scene; the model is a required asset from the start, so loading
    /// never completes without it
    pub fn new(config: FurConfig) -> Self {
        let mut tracker = LoadTracker::default();
        tracker.require(MODEL_ASSET);
        Self {
            config,
            tracker,
            meshes: Vec::new(),
            fur: None,
            warnings: Vec::new(),
            clock: FrameClock::new(),
        }
    }

    pub fn config(&self) -> &FurConfig {
        &self.config
    }

    pub fn set_callbacks(&mut self, callbacks: Box<dyn LoadCallbacks>) {
        self.tracker.set_callbacks(callbacks);
    }

    pub fn load_state(&self) -> &LoadState {
        self.tracker.state()
    }

    pub fn is_ready(&self) -> bool {
        self.tracker.is_ready()
    }

    pub fn has_failed(&self) -> bool {
        self.tracker.has_failed()
    }

    /// Overall load progress, 0 to 100
    pub fn load_percent(&self) -> f32 {
        self.tracker.overall_percent()
    }

    pub fn begin_asset(&mut self, name: &str) -> FurResult<()> {
        self.tracker.begin(name)
    }

    pub fn report_progress(&mut self, name: &str, loaded: f64, total: f64) -> Option<f32> {
        self.tracker.progress(name, loaded, total)
    }

    /// Add a mesh of the model; only accepted while the model is loading
    pub fn add_mesh(&mut self, mesh: SourceMesh) -> FurResult<()> {
        if self.fur.is_some()
            || self.tracker.state().is_terminal()
            || self.tracker.is_finished(MODEL_ASSET)
        {
            return Err(FurError::InvalidState(format!(
                "cannot add mesh '{}' after the model finished loading",
                mesh.name
            )));
        }
        self.tracker.begin(MODEL_ASSET)?;
        self.meshes.push(mesh);
        Ok(())
    }

    /// The model finished loading: grow the fur and complete the model, once
    ///
    /// A generation error fails the whole load. Returns the non-fatal
    /// warnings of the build.
    pub fn finish_model(&mut self) -> FurResult<&[FurWarning]> {
        self.build_fur()?;
        self.complete_model()?;
        Ok(self.warnings.as_slice())
    }

    /// Grow the fur without yet marking the model finished
    ///
    /// Lets the caller upload the result first and report a failure through
    /// [`Self::fail_model`] before the render loop may start.
    pub fn build_fur(&mut self) -> FurResult<&[FurWarning]> {
        if self.fur.is_some() || self.tracker.is_finished(MODEL_ASSET) {
            return Err(FurError::InvalidState("model already finished loading".into()));
        }
        if self.tracker.state().is_terminal() {
            return Err(FurError::InvalidState("loading is already over".into()));
        }

        let generator = StrandGenerator::new(self.config.strands, self.config.color);
        let build = match generator.generate_for_selection(&self.meshes, &self.config.selection) {
            Ok(build) => build,
            Err(err) => return Err(self.tracker.fail(MODEL_ASSET, err)),
        };

        let mesh_index = self
            .config
            .selection
            .select(&self.meshes)
            .and_then(|picked| self.meshes.iter().position(|m| std::ptr::eq(m, picked)));

        info!(
            "Model loaded: {} meshes, {} fur strands",
            self.meshes.len(),
            build.buffer.strand_count()
        );

        let animator = StrandAnimator::attach(&build.buffer, self.config.wave);
        self.fur = Some(Fur {
            buffer: build.buffer,
            animator,
            mesh_index,
        });
        self.warnings = build.warnings;
        Ok(self.warnings.as_slice())
    }

    /// Mark the model asset finished after [`Self::build_fur`]; returns
    /// whether loading is now complete
    pub fn complete_model(&mut self) -> FurResult<bool> {
        if self.fur.is_none() {
            return Err(FurError::InvalidState("fur has not been built".into()));
        }
        self.tracker.finish(MODEL_ASSET)
    }

    /// Fail loading because the model could not be prepared for display
    pub fn fail_model(&mut self, error: FurError) -> FurError {
        self.fur = None;
        self.tracker.fail(MODEL_ASSET, error)
    }

    pub fn finish_asset(&mut self, name: &str) -> FurResult<bool> {
        if name == MODEL_ASSET {
            self.finish_model()?;
            return Ok(self.tracker.is_ready());
        }
        self.tracker.finish(name)
    }

    /// Abort loading; no strands are built afterwards
    pub fn fail_asset(&mut self, name: &str, message: &str) -> FurError {
        self.tracker.fail(name, FurError::AssetLoad(format!("{}: {}", name, message)))
    }

    pub fn warnings(&self) -> &[FurWarning] {
        &self.warnings
    }

    pub fn fur(&self) -> Option<&Fur> {
        self.fur.as_ref()
    }

    pub fn strands_mut(&mut self) -> Option<&mut StrandBuffer> {
        self.fur.as_mut().map(|f| &mut f.buffer)
    }

    /// Mesh the fur grows on, if any
    pub fn fur_mesh(&self) -> Option<&SourceMesh> {
        self.fur
            .as_ref()
            .and_then(|f| f.mesh_index)
            .and_then(|i| self.meshes.get(i))
    }

    /// Mesh to draw as the base model: the furred one, else the first loaded
    pub fn display_mesh(&self) -> Option<&SourceMesh> {
        self.fur_mesh().or_else(|| self.meshes.first())
    }

    pub fn time(&self) -> f32 {
        self.clock.time()
    }

    /// Advance one frame and animate the fur
    ///
    /// Returns `false` while loading is not complete; nothing should be
    /// drawn then. A missing or empty strand buffer is not an error.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.tracker.is_ready() {
            return false;
        }
        let time = self.clock.advance(dt);
        if let Some(fur) = self.fur.as_mut() {
            if !fur.animator.apply(&mut fur.buffer, time) && !fur.buffer.is_empty() {
                warn!("Fur animation skipped at t={:.3}", time);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::NoopCallbacks;

    fn furred_mesh() -> SourceMesh {
        SourceMesh::new(
            "body",
            vec![0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.5],
            Some(vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]),
            Some(vec![0, 1, 2]),
        )
        .unwrap()
    }

    fn bare_mesh() -> SourceMesh {
        SourceMesh::new("eyes", vec![0.0; 9], None, None).unwrap()
    }

    #[test]
    fn test_full_lifecycle() {
        let mut scene = FurScene::new(FurConfig::default());
        scene.set_callbacks(Box::new(NoopCallbacks));
        scene.begin_asset("environment").unwrap();
        scene.add_mesh(bare_mesh()).unwrap();
        scene.add_mesh(furred_mesh()).unwrap();

        assert!(!scene.advance(0.016));

        let warnings = scene.finish_model().unwrap();
        assert!(warnings.is_empty());
        assert!(!scene.is_ready());
        assert!(scene.finish_asset("environment").unwrap());
        assert!(scene.is_ready());

        let fur = scene.fur().unwrap();
        assert_eq!(fur.buffer.strand_count(), 3);
        assert_eq!(scene.fur_mesh().unwrap().name, "body");

        assert!(scene.advance(0.016));
        assert!(scene.strands_mut().unwrap().is_dirty());
        assert!((scene.time() - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_model_completes_once() {
        let mut scene = FurScene::new(FurConfig::default());
        scene.begin_asset("environment").unwrap();
        scene.add_mesh(furred_mesh()).unwrap();
        scene.finish_model().unwrap();
        assert!(matches!(scene.finish_model(), Err(FurError::InvalidState(_))));
        assert!(scene.add_mesh(furred_mesh()).is_err());
    }

    #[test]
    fn test_no_eligible_mesh_renders_without_fur() {
        let mut scene = FurScene::new(FurConfig::default());
        scene.add_mesh(bare_mesh()).unwrap();

        let warnings = scene.finish_model().unwrap().to_vec();
        assert_eq!(warnings, vec![FurWarning::NoEligibleMesh]);
        assert!(scene.is_ready());
        assert!(scene.fur().unwrap().buffer.is_empty());
        assert!(scene.fur_mesh().is_none());
        assert_eq!(scene.display_mesh().unwrap().name, "eyes");

        // Render loop keeps going with empty fur
        for _ in 0..3 {
            assert!(scene.advance(0.016));
        }
        assert!(!scene.strands_mut().unwrap().is_dirty());
    }

    #[test]
    fn test_failed_load_never_builds_strands() {
        let mut scene = FurScene::new(FurConfig::default());
        scene.begin_asset(MODEL_ASSET).unwrap();
        scene.report_progress(MODEL_ASSET, 10.0, 100.0);
        let err = scene.fail_asset(MODEL_ASSET, "network error");

        assert!(matches!(err, FurError::AssetLoad(_)));
        assert!(scene.has_failed());
        assert!(scene.finish_model().is_err());
        assert!(scene.fur().is_none());
        assert!(!scene.advance(0.016));
    }

    #[test]
    fn test_generation_error_fails_load() {
        let mut config = FurConfig::default();
        config.strands.degenerate_normals = crate::strands::DegenerateNormalPolicy::Fail;
        let mut scene = FurScene::new(config);
        scene
            .add_mesh(SourceMesh::new("flat", vec![0.0; 3], Some(vec![0.0; 3]), None).unwrap())
            .unwrap();

        let err = scene.finish_model().unwrap_err();
        assert_eq!(err, FurError::DegenerateNormal { vertex: 0 });
        assert!(scene.has_failed());
        assert!(scene.fur().is_none());
    }

    #[test]
    fn test_finish_asset_routes_model() {
        let mut scene = FurScene::new(FurConfig::default());
        scene.add_mesh(furred_mesh()).unwrap();
        assert!(scene.finish_asset(MODEL_ASSET).unwrap());
        assert!(scene.fur().is_some());
    }

    #[test]
    fn test_environment_first_waits_for_model() {
        let mut scene = FurScene::new(FurConfig::default());
        assert_eq!(scene.load_state(), &LoadState::Idle);
        scene.begin_asset("environment").unwrap();
        assert!(!scene.finish_asset("environment").unwrap());

        assert!(!scene.is_ready());
        assert!(!scene.advance(0.016));

        scene.add_mesh(furred_mesh()).unwrap();
        assert!(scene.finish_model().unwrap().is_empty());
        assert!(scene.is_ready());
        assert_eq!(scene.fur().unwrap().buffer.strand_count(), 3);
        assert!(scene.advance(0.016));
    }

    #[test]
    fn test_oversized_segment_count_fails_load() {
        let mut config = FurConfig::default();
        config.strands.segment_count = usize::MAX / 4;
        let mut scene = FurScene::new(config);
        scene.add_mesh(furred_mesh()).unwrap();

        assert!(matches!(scene.finish_model(), Err(FurError::Config(_))));
        assert!(scene.has_failed());
        assert!(scene.fur().is_none());
    }

    #[test]
    fn test_failed_upload_fails_model() {
        let mut scene = FurScene::new(FurConfig::default());
        scene.add_mesh(furred_mesh()).unwrap();
        scene.build_fur().unwrap();
        assert!(!scene.is_ready());
        assert!(scene.add_mesh(furred_mesh()).is_err());

        let err = scene.fail_model(FurError::Render("out of memory".into()));
        assert_eq!(err, FurError::Render("out of memory".into()));
        assert!(scene.has_failed());
        assert!(scene.fur().is_none());
        assert!(scene.complete_model().is_err());
        assert!(!scene.advance(0.016));
    }

    #[test]
    fn test_complete_model_needs_fur() {
        let mut scene = FurScene::new(FurConfig::default());
        assert!(matches!(scene.complete_model(), Err(FurError::InvalidState(_))));
    }

    #[test]
    fn test_failure_after_ready_keeps_fur() {
        let mut scene = FurScene::new(FurConfig::default());
        scene.begin_asset("environment").unwrap();
        scene.add_mesh(furred_mesh()).unwrap();
        scene.finish_model().unwrap();
        assert!(scene.finish_asset("environment").unwrap());

        scene.fail_asset("environment", "retry failed");
        assert!(!scene.has_failed());
        assert!(scene.is_ready());
        assert!(scene.fur().is_some());
        assert!(scene.advance(0.016));
    }

    #[test]
    fn test_animation_is_rest_relative_across_frames() {
        let mut scene = FurScene::new(FurConfig::default());
        scene.add_mesh(furred_mesh()).unwrap();
        scene.finish_model().unwrap();

        let amplitude = scene.config().wave.amplitude;
        let rest = scene.fur().unwrap().buffer.positions().to_vec();
        for _ in 0..500 {
            scene.advance(0.05);
        }
        let animated = scene.fur().unwrap().buffer.positions();
        for (a, r) in animated.iter().zip(rest.iter()) {
            assert!((a - r).abs() <= amplitude + 1e-6);
        }
    }
}
