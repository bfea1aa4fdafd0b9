//! Points and sizes in logical (scale-independent) and physical pixels.

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogicalPoint {
    pub x: f64,
    pub y: f64,
}

impl LogicalPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Convert to device pixels, rounding to the nearest pixel.
    pub fn to_physical(self, scale: f64) -> PhysicalSize {
        PhysicalSize::new(
            (self.width * scale).round() as i32,
            (self.height * scale).round() as i32,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PhysicalPoint {
    pub x: i32,
    pub y: i32,
}

impl PhysicalPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PhysicalSize {
    pub width: i32,
    pub height: i32,
}

impl PhysicalSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

struct_codec!(LogicalPoint { x, y });
struct_codec!(LogicalSize { width, height });
struct_codec!(PhysicalPoint { x, y });
struct_codec!(PhysicalSize { width, height });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_to_physical_rounds() {
        let size = LogicalSize::new(100.5, 50.0);
        assert_eq!(size.to_physical(2.0), PhysicalSize::new(201, 100));
        assert_eq!(
            LogicalSize::new(10.0, 10.0).to_physical(1.25),
            PhysicalSize::new(13, 13)
        );
    }
}
