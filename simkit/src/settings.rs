//! Simulator defaults, layered as: built-in values, an optional config file,
//! then `OSSIM_*` environment variables (`OSSIM_MEMORY__FRAMES=3`).

use std::path::Path;

use serde_derive::Deserialize;

use crate::error::Result;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Settings {
    pub disk: DiskSettings,
    pub memory: MemorySettings,
    pub cpu: CpuSettings,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DiskSettings {
    /// highest cylinder, the far boundary for SCAN and C-SCAN
    pub max_cylinder: usize,
    pub head: usize,
    pub direction: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MemorySettings {
    pub frames: usize,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CpuSettings {
    pub quantum: usize,
    /// "waiting" or "turnaround"
    pub rank_by: String,
}

impl Settings {
    pub fn load(file: Option<&Path>) -> Result<Settings> {
        let mut c = config::Config::default();
        c.set_default("disk.max_cylinder", 199_i64)?;
        c.set_default("disk.head", 0_i64)?;
        c.set_default("disk.direction", "ASC")?;
        c.set_default("memory.frames", 4_i64)?;
        c.set_default("cpu.quantum", 2_i64)?;
        c.set_default("cpu.rank_by", "waiting")?;

        if let Some(path) = file {
            c.merge(config::File::from(path))?;
        }
        c.merge(config::Environment::with_prefix("OSSIM").separator("__"))?;

        Ok(c.try_into()?)
    }
}
