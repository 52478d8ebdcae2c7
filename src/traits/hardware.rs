#[cfg(test)]
use mockall::automock;

use crate::{
    core::types::{SeriesKey, WidgetType},
    error::ReadError,
};

/// A blocking platform call that produces one snapshot of a hardware domain.
///
/// Implementations may take a while (sysfs walks, subprocesses, framework
/// calls). They are always invoked on the blocking pool and raced against a
/// timeout, so they must never be called from the main context directly.
///
/// # Examples
///
/// ```rust
/// use tonic_telemetry::traits::NativeSource;
/// use tonic_telemetry::error::ReadError;
///
/// struct FixedLoad(f64);
///
/// impl NativeSource<f64> for FixedLoad {
///     fn sample(&mut self) -> Result<f64, ReadError> {
///         Ok(self.0)
///     }
/// }
/// ```
#[cfg_attr(test, automock)]
pub trait NativeSource<S: Send + 'static>: Send {
    /// Takes one sample from the hardware
    fn sample(&mut self) -> Result<S, ReadError>;
}

/// Per-domain snapshot payload.
///
/// A snapshot is immutable once produced. It knows which domain it belongs
/// to, which numeric series it contributes to history, and whether the
/// hardware behind it is actually present.
pub trait MetricSnapshot: Clone + Send + Sync + 'static {
    /// The domain this snapshot describes
    const WIDGET_TYPE: WidgetType;

    /// Numeric series extracted for history and thresholds.
    ///
    /// Series whose value is unknown for this sample are omitted rather than
    /// reported as zero.
    fn series(&self) -> Vec<(SeriesKey, f64)>;

    /// `false` when the sample shows the hardware is absent (no battery, no
    /// Bluetooth controller). The widget is hidden instead of showing zeros.
    fn is_present(&self) -> bool {
        true
    }
}
