//! Binding chart specs to render surfaces
//!
//! A [`ChartSlot`] owns at most one live binding to its surface. Configuring
//! it again disposes the previous binding first; dropping the slot releases
//! whatever is bound. A surface that is not available turns configuration
//! into a no-op.

use super::overlay::{CharWidth, TextMeasure};
use super::spec::ChartSpec;
use super::svg::{self, SvgSize};
use crate::error::Result;

/// Something a chart can be drawn on.
pub trait RenderTarget {
    type Binding;

    fn is_available(&self) -> bool;

    fn bind(&mut self, spec: &ChartSpec) -> Result<Self::Binding>;

    fn dispose(&mut self, binding: Self::Binding);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configured {
    Bound,
    /// Surface unavailable; nothing was created.
    Skipped,
}

pub struct ChartSlot<T: RenderTarget> {
    target: T,
    binding: Option<T::Binding>,
    spec: Option<ChartSpec>,
}

impl<T: RenderTarget> ChartSlot<T> {
    pub fn new(target: T) -> Self {
        Self { target, binding: None, spec: None }
    }

    pub fn configure(&mut self, spec: ChartSpec) -> Result<Configured> {
        if !self.target.is_available() {
            tracing::debug!(chart = %spec.id, "render surface unavailable, skipping");
            return Ok(Configured::Skipped);
        }

        self.release();
        let binding = self.target.bind(&spec)?;
        tracing::debug!(chart = %spec.id, "chart bound");
        self.binding = Some(binding);
        self.spec = Some(spec);
        Ok(Configured::Bound)
    }

    /// Dispose the current binding, if any.
    pub fn release(&mut self) {
        if let Some(old) = self.binding.take() {
            self.target.dispose(old);
        }
        self.spec = None;
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn spec(&self) -> Option<&ChartSpec> {
        self.spec.as_ref()
    }

    pub fn target(&self) -> &T {
        &self.target
    }
}

impl<T: RenderTarget> Drop for ChartSlot<T> {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgBinding(u64);

/// Renders bound charts to an SVG document held in memory.
pub struct SvgTarget<M: TextMeasure = CharWidth> {
    size: SvgSize,
    measure: M,
    available: bool,
    next_id: u64,
    live: usize,
    document: Option<String>,
}

impl SvgTarget<CharWidth> {
    pub fn new(size: SvgSize) -> Self {
        Self::with_measure(size, CharWidth::default())
    }
}

impl<M: TextMeasure> SvgTarget<M> {
    pub fn with_measure(size: SvgSize, measure: M) -> Self {
        Self { size, measure, available: true, next_id: 0, live: 0, document: None }
    }

    /// A target that reports itself missing, like an absent canvas.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn live_bindings(&self) -> usize {
        self.live
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

impl<M: TextMeasure> RenderTarget for SvgTarget<M> {
    type Binding = SvgBinding;

    fn is_available(&self) -> bool {
        self.available
    }

    fn bind(&mut self, spec: &ChartSpec) -> Result<SvgBinding> {
        self.document = Some(svg::render(spec, self.size, &self.measure));
        self.next_id += 1;
        self.live += 1;
        Ok(SvgBinding(self.next_id))
    }

    fn dispose(&mut self, _binding: SvgBinding) {
        self.live = self.live.saturating_sub(1);
        self.document = None;
    }
}

/// Render one spec to a standalone SVG string through a throwaway slot.
pub fn render_svg(spec: &ChartSpec, size: SvgSize) -> Result<String> {
    let mut slot = ChartSlot::new(SvgTarget::new(size));
    slot.configure(spec.clone())?;
    Ok(slot.target().document().unwrap_or_default().to_string())
}
