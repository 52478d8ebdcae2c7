use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use super::{MemorySnapshot, SwapUsage};
use crate::{error::ReadError, traits::NativeSource};

/// Memory source backed by sysinfo
pub struct SystemMemorySource {
    system: System,
}

impl SystemMemorySource {
    pub fn new() -> Result<Self, ReadError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ReadError::unavailable("memory statistics are not supported on this platform"));
        }
        let system = System::new_with_specifics(RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()));
        Ok(Self { system })
    }
}

impl NativeSource<MemorySnapshot> for SystemMemorySource {
    fn sample(&mut self) -> Result<MemorySnapshot, ReadError> {
        self.system.refresh_memory();

        let total = self.system.total_memory();
        if total == 0 {
            return Err(ReadError::native("total memory reported as zero"));
        }

        let swap = SwapUsage { total: self.system.total_swap(), used: self.system.used_swap() };
        Ok(MemorySnapshot::new(total, self.system.used_memory(), self.system.available_memory(), swap))
    }
}
