//! Pixel comparison of paper type output.
//!
//! Provides buffer comparison, BMP and raw RGBA I/O, diff image generation,
//! and the reference scatter scenes in [`scene`].

use std::fs::File;
use std::io::{self, Read as IoRead, Write as IoWrite};
use std::path::Path;

use plot_paper::rgb_image::RgbImage;

pub mod scene;

// ============================================================================
// Pixel Buffer
// ============================================================================

/// An RGBA pixel buffer with dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, row-major, top-to-bottom. Length = width * height * 4.
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width * height * 4) as usize],
        }
    }

    pub fn from_image(image: &RgbImage) -> Self {
        Self {
            width: image.width() as u32,
            height: image.height() as u32,
            data: image.to_rgba_bytes(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

// ============================================================================
// Comparison Result
// ============================================================================

/// A single differing pixel.
#[derive(Debug, Clone)]
pub struct DiffInfo {
    pub x: u32,
    pub y: u32,
    pub pixel_a: [u8; 4],
    pub pixel_b: [u8; 4],
}

/// Result of comparing two pixel buffers.
#[derive(Debug, Clone)]
pub struct CompareResult {
    pub total_pixels: u64,
    /// Pixels differing by at least 1 in any channel.
    pub different_pixels: u64,
    /// Pixels differing by more than the tolerance.
    pub failing_pixels: u64,
    pub max_channel_diff: u8,
    /// Mean absolute difference over the differing channels.
    pub mean_channel_diff: f64,
    /// First pixel over the tolerance, scanning top to bottom.
    pub first_failure: Option<DiffInfo>,
    /// Count of differing channels per absolute difference.
    pub diff_histogram: [u64; 256],
}

impl CompareResult {
    /// True when no channel differs by more than the tolerance.
    pub fn passed(&self) -> bool {
        self.failing_pixels == 0
    }
}

impl std::fmt::Display for CompareResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.different_pixels == 0 {
            return write!(f, "IDENTICAL: {} pixels match", self.total_pixels);
        }
        write!(
            f,
            "{}: {}/{} pixels differ ({:.2}%), {} over tolerance, max_diff={}, mean_diff={:.4}",
            if self.passed() { "CLOSE" } else { "DIFFERENT" },
            self.different_pixels,
            self.total_pixels,
            self.different_pixels as f64 / self.total_pixels as f64 * 100.0,
            self.failing_pixels,
            self.max_channel_diff,
            self.mean_channel_diff,
        )?;
        if let Some(ref d) = self.first_failure {
            write!(
                f,
                "\n  First failure at ({}, {}): A={:?} B={:?}",
                d.x, d.y, d.pixel_a, d.pixel_b
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// Buffer Comparison
// ============================================================================

fn check_same_size(a: &PixelBuffer, b: &PixelBuffer) -> io::Result<()> {
    if a.width != b.width || a.height != b.height || a.data.len() != b.data.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "size mismatch: {}x{} vs {}x{}",
                a.width, a.height, b.width, b.height
            ),
        ));
    }
    Ok(())
}

/// Compare two RGBA buffers channel by channel. Channels differing by at
/// most `tolerance` count as differences but not failures.
pub fn compare_buffers(a: &PixelBuffer, b: &PixelBuffer, tolerance: u8) -> io::Result<CompareResult> {
    check_same_size(a, b)?;

    let mut result = CompareResult {
        total_pixels: a.width as u64 * a.height as u64,
        different_pixels: 0,
        failing_pixels: 0,
        max_channel_diff: 0,
        mean_channel_diff: 0.0,
        first_failure: None,
        diff_histogram: [0; 256],
    };
    let mut diff_sum = 0u64;
    let mut diff_channels = 0u64;

    for y in 0..a.height {
        for x in 0..a.width {
            let pa = a.pixel(x, y);
            let pb = b.pixel(x, y);
            let mut worst = 0u8;
            for c in 0..4 {
                let diff = pa[c].abs_diff(pb[c]);
                if diff > 0 {
                    worst = worst.max(diff);
                    diff_sum += diff as u64;
                    diff_channels += 1;
                    result.diff_histogram[diff as usize] += 1;
                }
            }
            if worst == 0 {
                continue;
            }
            result.different_pixels += 1;
            result.max_channel_diff = result.max_channel_diff.max(worst);
            if worst > tolerance {
                result.failing_pixels += 1;
                if result.first_failure.is_none() {
                    result.first_failure = Some(DiffInfo {
                        x,
                        y,
                        pixel_a: pa,
                        pixel_b: pb,
                    });
                }
            }
        }
    }

    if diff_channels > 0 {
        result.mean_channel_diff = diff_sum as f64 / diff_channels as f64;
    }
    Ok(result)
}

/// Visual diff: identical pixels dark gray, differing pixels red with
/// brightness proportional to the difference (amplified 10x).
pub fn generate_diff_image(a: &PixelBuffer, b: &PixelBuffer) -> io::Result<PixelBuffer> {
    check_same_size(a, b)?;
    let mut diff = PixelBuffer::new(a.width, a.height);
    for (i, out) in diff.data.chunks_exact_mut(4).enumerate() {
        let o = i * 4;
        let max_diff = (0..3)
            .map(|c| a.data[o + c].abs_diff(b.data[o + c]))
            .max()
            .unwrap_or(0);
        if max_diff == 0 {
            out.copy_from_slice(&[40, 40, 40, 255]);
        } else {
            let v = (max_diff as u16 * 10).min(255) as u8;
            out.copy_from_slice(&[v, 0, 0, 255]);
        }
    }
    Ok(diff)
}

/// Side-by-side comparison image: [A | Diff | B]
pub fn generate_sidebyside(a: &PixelBuffer, b: &PixelBuffer) -> io::Result<PixelBuffer> {
    let diff = generate_diff_image(a, b)?;
    let row = (a.width * 4) as usize;
    let mut out = PixelBuffer::new(a.width * 3, a.height);
    for (y, dst) in out.data.chunks_exact_mut(row * 3).enumerate() {
        let src = y * row..(y + 1) * row;
        dst[..row].copy_from_slice(&a.data[src.clone()]);
        dst[row..row * 2].copy_from_slice(&diff.data[src.clone()]);
        dst[row * 2..].copy_from_slice(&b.data[src]);
    }
    Ok(out)
}

// ============================================================================
// BMP I/O (32-bit BGRA, top-down)
// ============================================================================

/// Save a pixel buffer as a 32-bit BMP file (top-down, BGRA).
pub fn save_bmp(path: &Path, buf: &PixelBuffer) -> io::Result<()> {
    let w = buf.width;
    let h = buf.height;
    let row_size = w * 4;
    let image_size = row_size * h;
    let file_size = 14 + 40 + image_size;

    let mut f = File::create(path)?;

    // BMP file header
    f.write_all(b"BM")?;
    f.write_all(&file_size.to_le_bytes())?;
    f.write_all(&[0u8; 4])?;
    f.write_all(&(14u32 + 40).to_le_bytes())?;

    // BITMAPINFOHEADER
    f.write_all(&40u32.to_le_bytes())?;
    f.write_all(&w.to_le_bytes())?;
    f.write_all(&(-(h as i32)).to_le_bytes())?; // top-down
    f.write_all(&1u16.to_le_bytes())?;
    f.write_all(&32u16.to_le_bytes())?;
    f.write_all(&0u32.to_le_bytes())?; // BI_RGB
    f.write_all(&image_size.to_le_bytes())?;
    f.write_all(&[0u8; 8])?;
    f.write_all(&0u32.to_le_bytes())?;
    f.write_all(&0u32.to_le_bytes())?;

    let mut row = vec![0u8; row_size as usize];
    for src in buf.data.chunks_exact(row_size as usize) {
        for (d, s) in row.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
            d.copy_from_slice(&[s[2], s[1], s[0], s[3]]);
        }
        f.write_all(&row)?;
    }
    Ok(())
}

/// Load a 24-bit or 32-bit BMP file.
pub fn load_bmp(path: &Path) -> io::Result<PixelBuffer> {
    let mut data = Vec::new();
    File::open(path)?.read_to_end(&mut data)?;

    if data.len() < 54 || &data[0..2] != b"BM" {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "not a BMP file"));
    }

    let pixel_offset = u32::from_le_bytes([data[10], data[11], data[12], data[13]]) as usize;
    let w = i32::from_le_bytes([data[18], data[19], data[20], data[21]]);
    let h = i32::from_le_bytes([data[22], data[23], data[24], data[25]]);
    let bytes_pp = u16::from_le_bytes([data[28], data[29]]) as usize / 8;
    if bytes_pp != 3 && bytes_pp != 4 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported BMP depth: {} bits", bytes_pp * 8),
        ));
    }

    let width = w.unsigned_abs();
    let height = h.unsigned_abs();
    let top_down = h < 0;
    let row_stride = (width as usize * bytes_pp + 3) / 4 * 4;

    let mut buf = PixelBuffer::new(width, height);
    for y in 0..height as usize {
        let src_y = if top_down { y } else { height as usize - 1 - y };
        let row_offset = pixel_offset + src_y * row_stride;
        for x in 0..width as usize {
            let si = row_offset + x * bytes_pp;
            let di = (y * width as usize + x) * 4;
            if si + bytes_pp > data.len() {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated BMP"));
            }
            let a = if bytes_pp == 4 { data[si + 3] } else { 255 };
            buf.data[di..di + 4].copy_from_slice(&[data[si + 2], data[si + 1], data[si], a]);
        }
    }
    Ok(buf)
}

// ============================================================================
// Raw RGBA I/O
// ============================================================================

/// Save as raw RGBA with a header: [width:u32][height:u32][rgba_data].
pub fn save_raw(path: &Path, buf: &PixelBuffer) -> io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(&buf.width.to_le_bytes())?;
    f.write_all(&buf.height.to_le_bytes())?;
    f.write_all(&buf.data)?;
    Ok(())
}

pub fn load_raw(path: &Path) -> io::Result<PixelBuffer> {
    let mut data = Vec::new();
    File::open(path)?.read_to_end(&mut data)?;

    if data.len() < 8 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "raw file too small"));
    }
    let width = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let height = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let expected = (width * height * 4) as usize + 8;
    if data.len() < expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("raw file too small: expected {} bytes, got {}", expected, data.len()),
        ));
    }
    Ok(PixelBuffer {
        width,
        height,
        data: data[8..expected].to_vec(),
    })
}

/// Load an image file, detecting format by extension.
pub fn load_image(path: &Path) -> io::Result<PixelBuffer> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("bmp") => load_bmp(path),
        Some("raw") | Some("rgba") => load_raw(path),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsupported image format: {:?}", path),
        )),
    }
}

/// Save an image file, detecting format by extension.
pub fn save_image(path: &Path, buf: &PixelBuffer) -> io::Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("bmp") => save_bmp(path, buf),
        Some("raw") | Some("rgba") => save_raw(path, buf),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsupported image format: {:?}", path),
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================
