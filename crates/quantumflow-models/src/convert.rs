//! Price conversion between external floats and internal scaled integers.
//!
//! Books are keyed on `u32` prices to make level ordering exact; market data
//! arrives as `f64`. The scale factor sets the precision: 100.0 keeps two
//! decimal places. The configured scale must keep representable external
//! prices inside the `u32` range; out-of-range inputs saturate.

use std::collections::HashMap;

use crate::Price;

/// Bidirectional f64 ⇄ scaled-u32 converter for one symbol.
#[derive(Debug, Clone, Copy)]
pub struct PriceConverter {
    scale: f64,
    inv_scale: f64,
}

impl PriceConverter {
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            inv_scale: 1.0 / scale,
        }
    }

    /// Round half away from zero, saturating at the `u32` bounds.
    pub fn to_internal(&self, external: f64) -> Price {
        let scaled = (external * self.scale).round();
        if scaled <= 0.0 {
            0
        } else if scaled >= Price::MAX as f64 {
            Price::MAX
        } else {
            scaled as Price
        }
    }

    pub fn to_external(&self, internal: Price) -> f64 {
        internal as f64 * self.inv_scale
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for PriceConverter {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE)
    }
}

/// Two decimal places unless a symbol is configured otherwise.
pub const DEFAULT_SCALE: f64 = 100.0;

/// Per-symbol converter registry with a default for unknown symbols.
#[derive(Debug, Default)]
pub struct PriceConverterRegistry {
    default: PriceConverter,
    converters: HashMap<String, PriceConverter>,
}

impl PriceConverterRegistry {
    pub fn new(default_scale: f64) -> Self {
        Self {
            default: PriceConverter::new(default_scale),
            converters: HashMap::new(),
        }
    }

    pub fn set_scale(&mut self, symbol: &str, scale: f64) {
        self.converters
            .insert(symbol.to_string(), PriceConverter::new(scale));
    }

    pub fn get(&self, symbol: &str) -> &PriceConverter {
        self.converters.get(symbol).unwrap_or(&self.default)
    }
}
