//! Anti-aliased splatting of a single colour onto a 2x2 neighbourhood.

/// Contributions whose weight falls below this are dropped.
pub(crate) const EPSILON: f64 = 0.0000001;

/// One target pixel of a splat and the share of the colour it receives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SplatTarget {
    pub x: i64,
    pub y: i64,
    pub weight: f64,
}

/// Bilinear weights of the four pixels around the real-valued point `(x, y)`.
///
/// Targets are ordered `(x0, y0)`, `(x0, y0 + 1)`, `(x0 + 1, y0)`,
/// `(x0 + 1, y0 + 1)`. The nearer a pixel is to the point, the larger its
/// weight; the four weights sum to 1.
pub(crate) fn splat_targets(x: f64, y: f64) -> [SplatTarget; 4] {
    let x0 = x.floor();
    let y0 = y.floor();
    let tx = x - x0;
    let ty = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    [
        SplatTarget {
            x: x0,
            y: y0,
            weight: (1.0 - tx) * (1.0 - ty),
        },
        SplatTarget {
            x: x0,
            y: y0 + 1,
            weight: (1.0 - tx) * ty,
        },
        SplatTarget {
            x: x0 + 1,
            y: y0,
            weight: tx * (1.0 - ty),
        },
        SplatTarget {
            x: x0 + 1,
            y: y0 + 1,
            weight: tx * ty,
        },
    ]
}

/// Splat weight and weighted alpha accumulated by one destination pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Coverage {
    weight: f64,
    alpha: f64,
}

impl Coverage {
    /// True until the first splat lands.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weight == 0.0
    }

    /// Weighted mean of every contributing alpha.
    pub fn alpha(&self) -> u8 {
        if self.is_empty() {
            return 0;
        }
        (self.alpha / self.weight).round().clamp(0.0, 255.0) as u8
    }
}

/// Blend `color` into the 4-byte pixel `dst` with the given weight.
///
/// A pixel with zero alpha takes the incoming colour as-is. Otherwise each
/// of R, G, B becomes the mean of the incoming and existing value. Alpha is
/// the weight-normalised mean of all alphas splatted so far, so it never
/// exceeds the largest contributing alpha.
pub(crate) fn blend_pixel(dst: &mut [u8], coverage: &mut Coverage, color: [u8; 4], weight: f64) {
    if dst[3] == 0 {
        dst[..3].copy_from_slice(&color[..3]);
    } else {
        for c in 0..3 {
            dst[c] = ((u16::from(dst[c]) + u16::from(color[c])) / 2) as u8;
        }
    }

    coverage.weight += weight;
    coverage.alpha += weight * f64::from(color[3]);
    dst[3] = coverage.alpha();
}
