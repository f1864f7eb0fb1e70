use std::io;

use crate::Region;

/// Configuration for a [`Region`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Size in bytes of the initial, non-freeable segment. Must be a
    /// positive multiple of `alignment`.
    pub initial_size: usize,
    /// Word size in bytes, and the unit every access is measured in. Every
    /// read and write covers a positive multiple of this, at an address
    /// aligned to it. Must be a power of two.
    pub alignment: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            initial_size: 4096,
            alignment: 8,
        }
    }
}

impl Config {
    pub(crate) fn validate(&self) -> io::Result<()> {
        if !self.alignment.is_power_of_two() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "Config's alignment must be a power of two",
            ));
        }

        if self.initial_size == 0 || self.initial_size % self.alignment != 0 {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "Config's initial_size must be a positive multiple of the alignment",
            ));
        }

        Ok(())
    }

    pub fn create(&self) -> io::Result<Region> {
        Region::create_with_config(self.clone())
    }
}
