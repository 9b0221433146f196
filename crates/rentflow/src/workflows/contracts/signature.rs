use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// One sampled pointer position on the signature surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Pen state driven by the pointer events the surface receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenState {
    Idle,
    Drawing,
}

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

const INK: u8 = 0x00;
const PAPER: u8 = 0xFF;
const PEN_RADIUS: i64 = 1;

/// Freehand signature capture.
///
/// Strokes accumulate as point sequences; the raster image and the
/// blank/non-blank predicate are both derived from that accumulator, so
/// "was anything drawn" never depends on when the image was produced.
/// Drawing is purely in-memory and never touches the network.
#[derive(Debug, Clone)]
pub struct SignaturePad {
    width: u32,
    height: u32,
    strokes: Vec<Vec<Point>>,
    pen: PenState,
}

impl SignaturePad {
    pub fn new(width: u32, height: u32) -> Result<Self, SignatureError> {
        if width == 0 || height == 0 {
            return Err(SignatureError::EmptySurface);
        }
        Ok(Self {
            width,
            height,
            strokes: Vec::new(),
            pen: PenState::Idle,
        })
    }

    /// Rebuilds a pad from recorded stroke sequences, replaying them as
    /// pointer gestures. Empty sequences are skipped.
    pub fn from_strokes(
        width: u32,
        height: u32,
        strokes: Vec<Vec<Point>>,
    ) -> Result<Self, SignatureError> {
        let mut pad = Self::new(width, height)?;
        for stroke in strokes {
            let mut points = stroke.into_iter();
            let Some(first) = points.next() else {
                continue;
            };
            pad.pointer_down(first);
            for point in points {
                pad.pointer_move(point);
            }
            pad.pointer_up();
        }
        Ok(pad)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pen(&self) -> PenState {
        self.pen
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn pointer_down(&mut self, point: Point) {
        self.pen = PenState::Drawing;
        self.strokes.push(vec![self.clamp(point)]);
    }

    /// Extends the current stroke. Moves while the pen is up are ignored,
    /// matching a pointer that re-enters the surface without pressing.
    pub fn pointer_move(&mut self, point: Point) {
        if self.pen != PenState::Drawing {
            return;
        }
        let clamped = self.clamp(point);
        if let Some(stroke) = self.strokes.last_mut() {
            stroke.push(clamped);
        }
    }

    pub fn pointer_up(&mut self) {
        self.pen = PenState::Idle;
    }

    /// Leaving the surface ends the stroke the same way lifting does.
    pub fn pointer_leave(&mut self) {
        self.pen = PenState::Idle;
    }

    /// Wipes all strokes, returning to the blank reference state.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.pen = PenState::Idle;
    }

    /// Compares the serialized raster of this surface against a same-size
    /// never-drawn reference, pixel for pixel. A cleared pad is
    /// indistinguishable from one that was never touched.
    pub fn is_blank(&self) -> bool {
        let reference = vec![PAPER; (self.width * self.height) as usize];
        self.rasterize() == reference
    }

    /// Renders the strokes onto a white grayscale surface. Consecutive
    /// points are joined by interpolated line segments with a round pen,
    /// so even a single-point tap leaves ink.
    pub fn rasterize(&self) -> Vec<u8> {
        let mut raster = vec![PAPER; (self.width * self.height) as usize];

        for stroke in &self.strokes {
            match stroke.as_slice() {
                [] => {}
                [only] => self.stamp(&mut raster, *only),
                segments => {
                    for pair in segments.windows(2) {
                        self.draw_segment(&mut raster, pair[0], pair[1]);
                    }
                }
            }
        }

        raster
    }

    /// Serializes the surface as a grayscale PNG, produced on demand at
    /// approval time rather than continuously.
    pub fn to_png(&self) -> Result<Vec<u8>, SignatureError> {
        let raster = self.rasterize();
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&raster)?;
        }
        Ok(out)
    }

    pub fn to_image(&self) -> Result<SignatureImage, SignatureError> {
        Ok(SignatureImage {
            width: self.width,
            height: self.height,
            png_bytes: self.to_png()?,
        })
    }

    fn clamp(&self, point: Point) -> Point {
        Point {
            x: point.x.clamp(0.0, (self.width - 1) as f32),
            y: point.y.clamp(0.0, (self.height - 1) as f32),
        }
    }

    fn draw_segment(&self, raster: &mut [u8], from: Point, to: Point) {
        let (mut x0, mut y0) = (from.x.round() as i64, from.y.round() as i64);
        let (x1, y1) = (to.x.round() as i64, to.y.round() as i64);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.stamp_at(raster, x0, y0);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                x0 += sx;
            }
            if doubled <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn stamp(&self, raster: &mut [u8], point: Point) {
        self.stamp_at(raster, point.x.round() as i64, point.y.round() as i64);
    }

    fn stamp_at(&self, raster: &mut [u8], cx: i64, cy: i64) {
        for dy in -PEN_RADIUS..=PEN_RADIUS {
            for dx in -PEN_RADIUS..=PEN_RADIUS {
                if dx * dx + dy * dy > PEN_RADIUS * PEN_RADIUS {
                    continue;
                }
                let (x, y) = (cx + dx, cy + dy);
                if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
                    continue;
                }
                raster[(y * self.width as i64 + x) as usize] = INK;
            }
        }
    }
}

/// A serialized signature ready for transport, kept transient until it is
/// attached to an approval submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureImage {
    pub width: u32,
    pub height: u32,
    pub png_bytes: Vec<u8>,
}

impl SignatureImage {
    /// Accepts transported base64, insisting on an actual PNG payload.
    pub fn from_base64(
        width: u32,
        height: u32,
        encoded: &str,
    ) -> Result<Self, SignatureError> {
        let png_bytes = STANDARD.decode(encoded)?;
        if png_bytes.len() < PNG_MAGIC.len() || !png_bytes.starts_with(&PNG_MAGIC) {
            return Err(SignatureError::NotPng);
        }
        Ok(Self {
            width,
            height,
            png_bytes,
        })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png_bytes)
    }
}

/// Errors raised while capturing or serializing a signature.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signature surface must have non-zero dimensions")]
    EmptySurface,
    #[error("failed to encode signature raster: {0}")]
    Encoding(#[from] png::EncodingError),
    #[error("signature transport payload is not valid base64: {0}")]
    Transport(#[from] base64::DecodeError),
    #[error("signature transport payload is not a PNG image")]
    NotPng,
}
