use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named gradient the depth service uses to render a single-channel depth map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Turbo,
    Viridis,
    Plasma,
    Magma,
    Inferno,
    Gray,
}

const TURBO_STOPS: &[[u8; 3]] = &[
    [0x30, 0x12, 0x3b],
    [0x7a, 0x04, 0x03],
    [0xd9, 0x38, 0x06],
    [0xf1, 0xb3, 0x2c],
    [0xa5, 0xfc, 0x4e],
    [0x28, 0xbb, 0xec],
    [0x46, 0x62, 0xd7],
];
const VIRIDIS_STOPS: &[[u8; 3]] = &[
    [0x44, 0x01, 0x54],
    [0x41, 0x44, 0x87],
    [0x2a, 0x78, 0x8e],
    [0x22, 0xa8, 0x84],
    [0x7a, 0xd1, 0x51],
    [0xfd, 0xe7, 0x25],
];
const PLASMA_STOPS: &[[u8; 3]] = &[
    [0x0d, 0x08, 0x87],
    [0x6a, 0x00, 0xa8],
    [0xb1, 0x2a, 0x90],
    [0xe1, 0x64, 0x62],
    [0xfc, 0xa6, 0x36],
    [0xf0, 0xf9, 0x21],
];
const MAGMA_STOPS: &[[u8; 3]] = &[
    [0x00, 0x00, 0x04],
    [0x3b, 0x0f, 0x70],
    [0x8c, 0x29, 0x81],
    [0xde, 0x49, 0x68],
    [0xfe, 0x9f, 0x6d],
    [0xfc, 0xfd, 0xbf],
];
const INFERNO_STOPS: &[[u8; 3]] = &[
    [0x00, 0x00, 0x04],
    [0x42, 0x0a, 0x68],
    [0x93, 0x26, 0x67],
    [0xdd, 0x51, 0x3a],
    [0xfc, 0xa5, 0x0a],
    [0xfc, 0xff, 0xa4],
];
const GRAY_STOPS: &[[u8; 3]] = &[[0x00, 0x00, 0x00], [0xff, 0xff, 0xff]];

impl Colormap {
    pub const ALL: [Colormap; 6] = [
        Colormap::Turbo,
        Colormap::Viridis,
        Colormap::Plasma,
        Colormap::Magma,
        Colormap::Inferno,
        Colormap::Gray,
    ];

    /// Identifier sent in the `colormap` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Colormap::Turbo => "turbo",
            Colormap::Viridis => "viridis",
            Colormap::Plasma => "plasma",
            Colormap::Magma => "magma",
            Colormap::Inferno => "inferno",
            Colormap::Gray => "gray",
        }
    }

    /// Evenly spaced RGB stops of the legend gradient, near to far.
    pub fn legend_stops(&self) -> &'static [[u8; 3]] {
        match self {
            Colormap::Turbo => TURBO_STOPS,
            Colormap::Viridis => VIRIDIS_STOPS,
            Colormap::Plasma => PLASMA_STOPS,
            Colormap::Magma => MAGMA_STOPS,
            Colormap::Inferno => INFERNO_STOPS,
            Colormap::Gray => GRAY_STOPS,
        }
    }

    /// Linear interpolation along the legend, `t` clamped to `0.0..=1.0`.
    pub fn sample(&self, t: f32) -> [u8; 3] {
        let stops = self.legend_stops();
        let t = t.clamp(0.0, 1.0);
        let scaled = t * (stops.len() - 1) as f32;
        let lower = (scaled.floor() as usize).min(stops.len() - 1);
        let upper = (lower + 1).min(stops.len() - 1);
        let frac = scaled - lower as f32;

        let mut out = [0u8; 3];
        for (channel, value) in out.iter_mut().enumerate() {
            let a = stops[lower][channel] as f32;
            let b = stops[upper][channel] as f32;
            *value = (a + (b - a) * frac).round() as u8;
        }
        out
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown colormap '{0}'")]
pub struct UnknownColormap(pub String);

impl FromStr for Colormap {
    type Err = UnknownColormap;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Colormap::ALL
            .into_iter()
            .find(|colormap| colormap.as_str() == s)
            .ok_or_else(|| UnknownColormap(s.to_string()))
    }
}
