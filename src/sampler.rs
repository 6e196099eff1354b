//! Terrain sampling under a drawn polyline.
//!
//! [`TerrainSampler`] lets the user draw polylines and, for each one,
//! asks a [`TerrainProvider`] for the most detailed terrain heights under its
//! vertices. Progress goes to a [`StatusIndicator`]; the heights (or the
//! failure) go to the callback given to [`TerrainSampler::start`].

use std::rc::Rc;

use tracing::{debug, warn};

use crate::drawing::{DrawOptions, Drawer, DrawerOptions, EventOutcome};
use crate::error::{Result, SamplingError};
use crate::host::{PointerEvent, Viewer};
use crate::math::{Cartographic, Point3};

/// Name of the data source holding the sampler's polylines.
pub const DATA_SOURCE_NAME: &str = "terrainSampler";

/// Result of one sampling request.
pub type SampleResult = std::result::Result<Vec<Cartographic>, SamplingError>;

/// Receives the result of a sampling request. Called exactly once.
pub type SampleResponder = Box<dyn FnOnce(SampleResult)>;

/// Receives every sampling outcome of a [`TerrainSampler`].
pub type SampledCallback = Rc<dyn Fn(SampleResult)>;

/// Source of terrain heights.
pub trait TerrainProvider {
    /// Samples terrain at `positions` at the highest available detail.
    ///
    /// `respond` gets the positions with their heights replaced by terrain
    /// heights, in the same order. It may be called before this method
    /// returns or at any later point.
    fn sample_most_detailed(&self, positions: Vec<Cartographic>, respond: SampleResponder);
}

/// State shown to the user while sampling.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplerStatus {
    Idle,
    Drawing,
    Sampling { points: usize },
    Sampled { points: usize },
    Failed(String),
}

/// A visible status line.
pub trait StatusIndicator {
    fn set_status(&self, status: SamplerStatus);
}

/// Polyline drawing tool that samples terrain under every finished line.
pub struct TerrainSampler<V: Viewer> {
    drawer: Drawer<V>,
    provider: Rc<dyn TerrainProvider>,
    status: Rc<dyn StatusIndicator>,
}

impl<V: Viewer> TerrainSampler<V> {
    /// Creates the sampler and its `terrainSampler` data source.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::MissingViewer`](crate::error::HostError::MissingViewer)
    /// if no viewer is given.
    pub fn new(
        viewer: Option<V>,
        provider: Rc<dyn TerrainProvider>,
        status: Rc<dyn StatusIndicator>,
    ) -> Result<Self> {
        let drawer = Drawer::new(DrawerOptions {
            viewer,
            data_source_name: Some(DATA_SOURCE_NAME.to_owned()),
        })?;
        status.set_status(SamplerStatus::Idle);
        Ok(Self {
            drawer,
            provider,
            status,
        })
    }

    /// Starts drawing. Every finished polyline is sampled and the outcome
    /// reported to both the status indicator and `on_sampled`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying drawer was torn down or lost its
    /// data source.
    pub fn start(&mut self, on_sampled: impl Fn(SampleResult) + 'static) -> Result<()> {
        let provider = Rc::clone(&self.provider);
        let status = Rc::clone(&self.status);
        let on_sampled: SampledCallback = Rc::new(on_sampled);
        self.drawer
            .begin_polyline_drawing_with(DrawOptions::default(), move |_, shape| {
                submit(provider.as_ref(), &status, &on_sampled, &shape.positions);
            })?;
        self.status.set_status(SamplerStatus::Drawing);
        debug!("terrain sampler started");
        Ok(())
    }

    /// Forwards a pointer event to the drawer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying drawer was torn down or lost its
    /// data source.
    pub fn handle_event(&mut self, event: PointerEvent) -> Result<EventOutcome> {
        self.drawer.handle_event(event)
    }

    /// Stops drawing without sampling.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying drawer was torn down or lost its
    /// data source.
    pub fn cancel(&mut self) -> Result<()> {
        self.drawer.cancel()?;
        self.status.set_status(SamplerStatus::Idle);
        Ok(())
    }

    #[must_use]
    pub fn drawer(&self) -> &Drawer<V> {
        &self.drawer
    }

    pub fn drawer_mut(&mut self) -> &mut Drawer<V> {
        &mut self.drawer
    }

    /// Tears the underlying drawer down.
    ///
    /// # Errors
    ///
    /// Returns an error if it was already torn down.
    pub fn teardown(&mut self, keep_entities: bool) -> Result<()> {
        self.drawer.teardown(keep_entities)?;
        self.status.set_status(SamplerStatus::Idle);
        Ok(())
    }
}

fn submit(
    provider: &dyn TerrainProvider,
    status: &Rc<dyn StatusIndicator>,
    on_sampled: &SampledCallback,
    positions: &[Point3],
) {
    let request = match to_cartographic(positions) {
        Ok(request) => request,
        Err(err) => {
            report(status.as_ref(), on_sampled.as_ref(), Err(err));
            return;
        }
    };
    let points = request.len();
    status.set_status(SamplerStatus::Sampling { points });
    debug!(points, "sampling terrain");

    let status = Rc::clone(status);
    let on_sampled = Rc::clone(on_sampled);
    provider.sample_most_detailed(
        request,
        Box::new(move |result| report(status.as_ref(), on_sampled.as_ref(), result)),
    );
}

fn to_cartographic(positions: &[Point3]) -> std::result::Result<Vec<Cartographic>, SamplingError> {
    if positions.is_empty() {
        return Err(SamplingError::EmptyRequest);
    }
    positions
        .iter()
        .enumerate()
        .map(|(index, p)| {
            Cartographic::from_cartesian(p).ok_or(SamplingError::InvalidPosition { index })
        })
        .collect()
}

fn report(status: &dyn StatusIndicator, on_sampled: &dyn Fn(SampleResult), result: SampleResult) {
    match &result {
        Ok(samples) => {
            debug!(points = samples.len(), "terrain sampled");
            status.set_status(SamplerStatus::Sampled {
                points: samples.len(),
            });
        }
        Err(err) => {
            warn!(%err, "terrain sampling failed");
            status.set_status(SamplerStatus::Failed(err.to_string()));
        }
    }
    on_sampled(result);
}
