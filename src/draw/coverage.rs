/// Per-pixel clip coverage in device space; 255 is fully visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ClipMask {
    width: u32,
    coverage: Vec<u8>,
}

impl ClipMask {
    pub(crate) fn from_coverage(width: u32, coverage: Vec<u8>) -> Self {
        Self { width, coverage }
    }

    pub(crate) fn at(&self, x: u32, y: u32) -> u8 {
        self.coverage[y as usize * self.width as usize + x as usize]
    }

    pub(crate) fn unit_at(&self, x: u32, y: u32) -> f32 {
        f32::from(self.at(x, y)) / 255.0
    }

    /// Multiply `next` into the existing clip, if any.
    pub(crate) fn intersect(existing: Option<&ClipMask>, mut next: ClipMask) -> ClipMask {
        if let Some(prev) = existing {
            for (n, &p) in next.coverage.iter_mut().zip(prev.coverage.iter()) {
                *n = crate::foundation::math::mul_div255_u8(u16::from(*n), u16::from(p));
            }
        }
        next
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/coverage.rs"]
mod tests;
