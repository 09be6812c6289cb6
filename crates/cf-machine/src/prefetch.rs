//! Image prefetch — warms the winner's full-size image while the strip scrolls

use cf_core::CfResult;

/// Best-effort image warmer supplied by the host.
///
/// Called once per spin with the winner's reveal image. Failures are logged
/// and ignored; the reveal panel shows a placeholder until the host reports
/// the image as loaded.
pub trait ImagePrefetcher: Send {
    fn prefetch(&mut self, image_ref: &str) -> CfResult<()>;
}

/// Prefetcher that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPrefetcher;

impl ImagePrefetcher for NoopPrefetcher {
    fn prefetch(&mut self, _image_ref: &str) -> CfResult<()> {
        Ok(())
    }
}

impl<F> ImagePrefetcher for F
where
    F: FnMut(&str) -> CfResult<()> + Send,
{
    fn prefetch(&mut self, image_ref: &str) -> CfResult<()> {
        self(image_ref)
    }
}
