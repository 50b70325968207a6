use log::{debug, error, info, warn};
use crate::error::{FurError, FurResult};

/// Hooks the loading UI supplies; the core never touches UI state itself
pub trait LoadCallbacks {
    /// Overall progress across all registered assets, 0 to 100
    fn on_progress(&self, percent: f32);
    /// Every registered asset finished
    fn on_complete(&self);
    /// Loading stopped for good
    fn on_error(&self, error: &FurError);
}

/// Callbacks that ignore everything
pub struct NoopCallbacks;

impl LoadCallbacks for NoopCallbacks {
    fn on_progress(&self, _percent: f32) {}
    fn on_complete(&self) {}
    fn on_error(&self, _error: &FurError) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// Nothing registered yet
    Idle,
    Loading,
    /// All assets finished
    Ready,
    /// An asset failed; terminal
    Failed(FurError),
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Failed(_))
    }
}

#[derive(Debug, Clone)]
struct AssetProgress {
    name: String,
    fraction: f32,
    finished: bool,
}

/// Tracks concurrently loading assets and reports through [`LoadCallbacks`]
pub struct LoadTracker {
    assets: Vec<AssetProgress>,
    state: LoadState,
    callbacks: Box<dyn LoadCallbacks>,
}

impl Default for LoadTracker {
    fn default() -> Self {
        Self::new(Box::new(NoopCallbacks))
    }
}

impl LoadTracker {
    pub fn new(callbacks: Box<dyn LoadCallbacks>) -> Self {
        Self {
            assets: Vec::new(),
            state: LoadState::Idle,
            callbacks,
        }
    }

    pub fn set_callbacks(&mut self, callbacks: Box<dyn LoadCallbacks>) {
        self.callbacks = callbacks;
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    pub fn has_failed(&self) -> bool {
        matches!(self.state, LoadState::Failed(_))
    }

    pub fn is_finished(&self, name: &str) -> bool {
        self.assets.iter().any(|a| a.name == name && a.finished)
    }

    fn ensure_open(&self) -> FurResult<()> {
        match &self.state {
            LoadState::Ready => Err(FurError::InvalidState("loading already completed".into())),
            LoadState::Failed(err) => Err(FurError::InvalidState(format!("loading failed: {}", err))),
            _ => Ok(()),
        }
    }

    fn asset_mut(&mut self, name: &str) -> &mut AssetProgress {
        let index = match self.assets.iter().position(|a| a.name == name) {
            Some(index) => index,
            None => {
                debug!("Loading asset '{}'", name);
                self.assets.push(AssetProgress {
                    name: name.to_string(),
                    fraction: 0.0,
                    finished: false,
                });
                self.assets.len() - 1
            }
        };
        &mut self.assets[index]
    }

    /// Register an asset that must finish before loading can complete,
    /// without leaving `Idle`. Ignored once loading is over.
    pub fn require(&mut self, name: &str) {
        if self.ensure_open().is_ok() {
            self.asset_mut(name);
        }
    }

    /// Register an asset; registering twice is harmless
    pub fn begin(&mut self, name: &str) -> FurResult<()> {
        self.ensure_open()?;
        self.asset_mut(name);
        self.state = LoadState::Loading;
        Ok(())
    }

    /// Record `loaded` of `total` bytes for `name` and report overall progress
    ///
    /// Returns the reported percentage, or `None` when nothing was reported
    /// (unknown total, or loading already over).
    pub fn progress(&mut self, name: &str, loaded: f64, total: f64) -> Option<f32> {
        if self.ensure_open().is_err() {
            return None;
        }
        if !(total.is_finite() && total > 0.0) || !loaded.is_finite() {
            return None;
        }

        self.state = LoadState::Loading;
        let asset = self.asset_mut(name);
        if !asset.finished {
            asset.fraction = (loaded / total).clamp(0.0, 1.0) as f32;
        }

        let percent = self.overall_percent();
        self.callbacks.on_progress(percent);
        Some(percent)
    }

    /// Mean progress over registered assets, 0 to 100
    pub fn overall_percent(&self) -> f32 {
        if self.assets.is_empty() {
            return 0.0;
        }
        let sum: f32 = self
            .assets
            .iter()
            .map(|a| if a.finished { 1.0 } else { a.fraction })
            .sum();
        (sum / self.assets.len() as f32 * 100.0).clamp(0.0, 100.0)
    }

    /// Mark `name` finished; returns `true` when this completes loading
    pub fn finish(&mut self, name: &str) -> FurResult<bool> {
        self.ensure_open()?;

        let asset = self.asset_mut(name);
        if asset.finished {
            return Err(FurError::InvalidState(format!("asset '{}' already finished", name)));
        }
        asset.finished = true;
        asset.fraction = 1.0;
        debug!("Asset '{}' loaded", name);

        if self.assets.iter().all(|a| a.finished) {
            info!("All {} assets loaded", self.assets.len());
            self.state = LoadState::Ready;
            self.callbacks.on_progress(100.0);
            self.callbacks.on_complete();
            Ok(true)
        } else {
            self.state = LoadState::Loading;
            self.callbacks.on_progress(self.overall_percent());
            Ok(false)
        }
    }

    /// Enter the terminal failure state because of `name`
    ///
    /// Returns the error passed to `on_error`. Once failed, later failures are
    /// ignored and the first error is kept.
    pub fn fail(&mut self, name: &str, error: FurError) -> FurError {
        match &self.state {
            LoadState::Failed(first) => return first.clone(),
            LoadState::Ready => {
                warn!("Ignoring failure of '{}' after loading completed: {}", name, error);
                return error;
            }
            _ => {}
        }
        error!("Failed to load '{}': {}", name, error);
        self.state = LoadState::Failed(error.clone());
        self.callbacks.on_error(&error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Progress(f32),
        Complete,
        Error(FurError),
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Event>>>);

    impl Recorder {
        fn events(&self) -> Vec<Event> {
            self.0.borrow().clone()
        }
    }

    impl LoadCallbacks for Recorder {
        fn on_progress(&self, percent: f32) {
            self.0.borrow_mut().push(Event::Progress(percent));
        }
        fn on_complete(&self) {
            self.0.borrow_mut().push(Event::Complete);
        }
        fn on_error(&self, error: &FurError) {
            self.0.borrow_mut().push(Event::Error(error.clone()));
        }
    }

    fn tracker() -> (LoadTracker, Recorder) {
        let recorder = Recorder::default();
        (LoadTracker::new(Box::new(recorder.clone())), recorder)
    }

    #[test]
    fn test_progress_is_averaged_over_assets() {
        let (mut tracker, recorder) = tracker();
        tracker.begin("model").unwrap();
        tracker.begin("environment").unwrap();

        assert_eq!(tracker.progress("model", 50.0, 100.0), Some(25.0));
        assert_eq!(tracker.progress("environment", 100.0, 100.0), Some(75.0));
        assert_eq!(recorder.events(), vec![Event::Progress(25.0), Event::Progress(75.0)]);
        assert_eq!(tracker.state(), &LoadState::Loading);
    }

    #[test]
    fn test_unknown_total_reports_nothing() {
        let (mut tracker, recorder) = tracker();
        tracker.begin("model").unwrap();
        assert_eq!(tracker.progress("model", 10.0, 0.0), None);
        assert_eq!(tracker.progress("model", f64::NAN, 10.0), None);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_progress_is_clamped() {
        let (mut tracker, _) = tracker();
        assert_eq!(tracker.progress("model", 300.0, 100.0), Some(100.0));
    }

    #[test]
    fn test_ready_after_all_assets_finish() {
        let (mut tracker, recorder) = tracker();
        tracker.begin("model").unwrap();
        tracker.begin("environment").unwrap();

        assert!(!tracker.finish("model").unwrap());
        assert!(!tracker.is_ready());
        assert!(tracker.finish("environment").unwrap());
        assert!(tracker.is_ready());

        let events = recorder.events();
        assert_eq!(events.last(), Some(&Event::Complete));
        assert!(events.contains(&Event::Progress(50.0)));
        assert!(events.contains(&Event::Progress(100.0)));
    }

    #[test]
    fn test_finish_twice_is_rejected() {
        let (mut tracker, _) = tracker();
        tracker.begin("model").unwrap();
        tracker.begin("environment").unwrap();
        tracker.finish("model").unwrap();
        assert!(matches!(tracker.finish("model"), Err(FurError::InvalidState(_))));
    }

    #[test]
    fn test_failure_is_terminal() {
        let (mut tracker, recorder) = tracker();
        tracker.begin("model").unwrap();
        let err = tracker.fail("model", FurError::AssetLoad("404 leo.glb".into()));

        assert!(tracker.has_failed());
        assert_eq!(recorder.events(), vec![Event::Error(err.clone())]);

        // No further transitions or callbacks
        assert!(tracker.begin("environment").is_err());
        assert!(tracker.finish("model").is_err());
        assert_eq!(tracker.progress("model", 1.0, 2.0), None);
        let second = tracker.fail("environment", FurError::AssetLoad("other".into()));
        assert_eq!(second, err);
        assert_eq!(recorder.events().len(), 1);
    }

    #[test]
    fn test_required_asset_blocks_ready() {
        let (mut tracker, recorder) = tracker();
        tracker.require("model");
        assert_eq!(tracker.state(), &LoadState::Idle);

        tracker.begin("environment").unwrap();
        assert!(!tracker.finish("environment").unwrap());
        assert!(!tracker.is_ready());
        assert!(!recorder.events().contains(&Event::Complete));

        assert!(tracker.finish("model").unwrap());
        assert!(tracker.is_ready());
    }

    #[test]
    fn test_ready_is_terminal() {
        let (mut tracker, _) = tracker();
        tracker.begin("model").unwrap();
        tracker.finish("model").unwrap();
        assert!(tracker.state().is_terminal());
        assert!(tracker.begin("late").is_err());
    }
}
