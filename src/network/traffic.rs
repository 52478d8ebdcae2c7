use tokio::time::Instant;

/// Cumulative interface counters at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficData {
    /// Time when this data point was collected
    pub timestamp: Instant,

    /// Total bytes received
    pub bytes_received: u64,

    /// Total bytes sent
    pub bytes_sent: u64,

    /// Total packets received
    pub packets_received: u64,

    /// Total packets sent
    pub packets_sent: u64,

    /// Total receive errors
    pub receive_errors: u64,

    /// Total send errors
    pub send_errors: u64,
}

/// Tracks network traffic counters over time and calculates rates.
///
/// Rates are `None` until two data points exist. Counters that go backwards
/// (interface reset) produce a zero rate for that interval.
#[derive(Debug, Clone)]
pub struct TrafficTracker {
    /// Current network traffic data
    current: TrafficData,

    /// Previous network traffic data for rate calculations
    previous: Option<TrafficData>,
}

impl TrafficTracker {
    /// Creates a tracker from its first data point
    pub fn new(current: TrafficData) -> Self {
        Self { current, previous: None }
    }

    /// Shifts current data to previous and records a new data point
    pub fn update(&mut self, data: TrafficData) {
        self.previous = Some(self.current);
        self.current = data;
    }

    pub fn current(&self) -> &TrafficData {
        &self.current
    }

    /// Download speed in bytes per second
    pub fn download_speed(&self) -> Option<f64> {
        self.rate(|data| data.bytes_received)
    }

    /// Upload speed in bytes per second
    pub fn upload_speed(&self) -> Option<f64> {
        self.rate(|data| data.bytes_sent)
    }

    /// Packets received per second
    pub fn packet_receive_rate(&self) -> Option<f64> {
        self.rate(|data| data.packets_received)
    }

    /// Packets sent per second
    pub fn packet_send_rate(&self) -> Option<f64> {
        self.rate(|data| data.packets_sent)
    }

    /// Fraction of received packets that were errors
    pub fn receive_error_rate(&self) -> f64 {
        if self.current.packets_received > 0 {
            self.current.receive_errors as f64 / self.current.packets_received as f64
        } else {
            0.0
        }
    }

    /// Fraction of sent packets that were errors
    pub fn send_error_rate(&self) -> f64 {
        if self.current.packets_sent > 0 {
            self.current.send_errors as f64 / self.current.packets_sent as f64
        } else {
            0.0
        }
    }

    fn rate(&self, counter: impl Fn(&TrafficData) -> u64) -> Option<f64> {
        let previous = self.previous?;
        let time_diff = self.current.timestamp.checked_duration_since(previous.timestamp)?.as_secs_f64();
        if time_diff <= 0.0 {
            return None;
        }
        Some(counter(&self.current).saturating_sub(counter(&previous)) as f64 / time_diff)
    }
}
