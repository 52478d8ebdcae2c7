use serde::Serialize;

/// Represents the type of network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceType {
    Ethernet,
    WiFi,
    Loopback,
    Virtual,
    Other,
}

impl InterfaceType {
    /// Best-effort classification from the interface name
    pub fn from_name(name: &str) -> Self {
        const VIRTUAL_PREFIXES: &[&str] =
            &["docker", "veth", "br-", "virbr", "vmnet", "utun", "tun", "tap", "bridge", "awdl", "llw", "gif", "stf"];

        if name == "lo" || name.starts_with("lo0") {
            InterfaceType::Loopback
        } else if name.starts_with("wl") {
            InterfaceType::WiFi
        } else if name.starts_with("en") || name.starts_with("eth") {
            InterfaceType::Ethernet
        } else if VIRTUAL_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
            InterfaceType::Virtual
        } else {
            InterfaceType::Other
        }
    }
}

impl std::fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfaceType::Ethernet => write!(f, "Ethernet"),
            InterfaceType::WiFi => write!(f, "WiFi"),
            InterfaceType::Loopback => write!(f, "Loopback"),
            InterfaceType::Virtual => write!(f, "Virtual"),
            InterfaceType::Other => write!(f, "Other"),
        }
    }
}

/// Wireless link quality for one interface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WifiLink {
    pub interface: String,
    /// Link quality normalized to 0-100
    pub link_quality: f64,
    pub signal_dbm: Option<f64>,
    pub noise_dbm: Option<f64>,
}

impl WifiLink {
    /// Parses `/proc/net/wireless`, returning one link per wireless interface.
    ///
    /// The kernel reports link quality on a 0-70 scale and levels as dBm with a
    /// trailing dot; placeholder levels at or below -256 are dropped.
    pub fn parse_proc_net_wireless(text: &str) -> Vec<WifiLink> {
        text.lines()
            .skip(2)
            .filter_map(|line| {
                let (name, rest) = line.split_once(':')?;
                let fields: Vec<f64> =
                    rest.split_whitespace().skip(1).take(3).filter_map(|f| f.trim_end_matches('.').parse().ok()).collect();
                let &[link, level, noise] = fields.as_slice() else {
                    return None;
                };
                let dbm = |value: f64| (value > -256.0 && value < 0.0).then_some(value);
                Some(WifiLink {
                    interface: name.trim().to_string(),
                    link_quality: (link / super::WIRELESS_QUALITY_MAX * 100.0).clamp(0.0, 100.0),
                    signal_dbm: dbm(level),
                    noise_dbm: dbm(noise),
                })
            })
            .collect()
    }
}

/// Per-interface counters and rates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceStats {
    pub name: String,
    pub interface_type: InterfaceType,
    pub mac_address: Option<String>,
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub download_bytes_per_sec: Option<f64>,
    pub upload_bytes_per_sec: Option<f64>,
    pub receive_error_rate: f64,
    pub send_error_rate: f64,
}

impl InterfaceStats {
    pub fn is_loopback(&self) -> bool {
        self.interface_type == InterfaceType::Loopback
    }

    pub fn total_bytes(&self) -> u64 {
        self.bytes_received.saturating_add(self.bytes_sent)
    }
}
