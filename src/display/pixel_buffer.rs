use super::DEFAULT_SIZE;

// ============================================================================
// Utility Functions
// ============================================================================

/// Scale a channel by an 8-bit factor.
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255
#[inline]
fn scale_channel(c: u8, factor: u16) -> u8 {
    let result = c as u16 * factor;
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Write ABGR pixel with custom alpha (RGBA8888 little-endian byte order)
#[inline]
pub(crate) fn write_pixel_rgba(dest: &mut [u8], r: u8, g: u8, b: u8, a: u8) {
    dest[0] = a; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

/// Byte length of a `width` x `height` RGBA8888 surface
#[inline]
fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

/// Read an ABGR pixel back as (r, g, b, a)
#[inline]
fn read_pixel_rgba(src: &[u8]) -> (u8, u8, u8, u8) {
    (src[3], src[2], src[1], src[0])
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering.
///
/// The orb renders premultiplied color into this; `composite_premultiplied`
/// lays one buffer over another.
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a square pixel buffer at the default orb size
    pub fn new() -> Self {
        Self::with_size(DEFAULT_SIZE, DEFAULT_SIZE)
    }

    /// Create a new pixel buffer with custom resolution, fully transparent
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; byte_len(width, height)],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Clear to an opaque solid color
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        self.clear_rgba(r, g, b, 255);
    }

    /// Clear to a solid color with custom alpha
    pub fn clear_rgba(&mut self, r: u8, g: u8, b: u8, a: u8) {
        for px in self.pixels.chunks_exact_mut(4) {
            write_pixel_rgba(px, r, g, b, a);
        }
    }

    /// Set a single pixel with custom alpha (bounds checked)
    #[inline]
    pub fn set_pixel_rgba(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel_rgba(&mut self.pixels[idx..idx + 4], r, g, b, a);
        }
    }

    /// Read all 4 channels of a pixel (bounds checked)
    /// Returns (r, g, b, a) or None if out of bounds
    #[inline]
    pub fn get_pixel_rgba(&self, x: i32, y: i32) -> Option<(u8, u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some(read_pixel_rgba(&self.pixels[idx..idx + 4]))
        } else {
            None
        }
    }

    /// Fill with a vertical two-color gradient (opaque), top to bottom
    pub fn fill_vertical_gradient(&mut self, top: (u8, u8, u8), bottom: (u8, u8, u8)) {
        let stride = self.stride();
        let rows = self.height.max(2) - 1;
        for (y, row) in self.pixels.chunks_exact_mut(stride).enumerate() {
            let t = y as f32 / rows as f32;
            let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
            let (r, g, b) = (lerp(top.0, bottom.0), lerp(top.1, bottom.1), lerp(top.2, bottom.2));
            for px in row.chunks_exact_mut(4) {
                write_pixel_rgba(px, r, g, b, 255);
            }
        }
    }

    /// Composite a premultiplied-alpha source of the same size over this
    /// buffer: dst = src + dst * (1 - src_alpha).
    pub fn composite_premultiplied(&mut self, src: &PixelBuffer) {
        debug_assert_eq!((self.width, self.height), (src.width, src.height));

        for (dst, src) in self.pixels.chunks_exact_mut(4).zip(src.pixels.chunks_exact(4)) {
            let (sr, sg, sb, sa) = read_pixel_rgba(src);
            if sa == 255 {
                dst.copy_from_slice(src);
                continue;
            }
            if sa == 0 && sr == 0 && sg == 0 && sb == 0 {
                continue;
            }
            let (dr, dg, db, da) = read_pixel_rgba(dst);
            let inv = 255 - sa as u16;
            write_pixel_rgba(
                dst,
                sr.saturating_add(scale_channel(dr, inv)),
                sg.saturating_add(scale_channel(dg, inv)),
                sb.saturating_add(scale_channel(db, inv)),
                sa.saturating_add(scale_channel(da, inv)),
            );
        }
    }

    /// Get raw pixel data (for SDL texture upload)
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Get mutable raw pixel data, row-major, `stride()` bytes per row
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_transparent() {
        let buf = PixelBuffer::with_size(4, 3);
        assert_eq!(buf.as_bytes().len(), 4 * 3 * 4);
        assert_eq!(buf.stride(), 16);
        assert_eq!(buf.get_pixel_rgba(3, 2), Some((0, 0, 0, 0)));
        assert_eq!(buf.get_pixel_rgba(4, 0), None);
        assert_eq!(buf.get_pixel_rgba(-1, 0), None);
    }

    #[test]
    fn test_abgr_byte_layout() {
        let mut buf = PixelBuffer::with_size(1, 1);
        buf.set_pixel_rgba(0, 0, 10, 20, 30, 40);
        assert_eq!(buf.as_bytes(), &[40, 30, 20, 10]);
        assert_eq!(buf.get_pixel_rgba(0, 0), Some((10, 20, 30, 40)));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_byte_len_does_not_wrap_at_u32() {
        assert_eq!(byte_len(70_000, 20_000), 5_600_000_000);
        assert_eq!(byte_len(u32::MAX, 1), u32::MAX as usize * 4);
    }

    #[test]
    fn test_wide_row_indexing() {
        let mut buf = PixelBuffer::with_size(70_000, 1);
        assert_eq!(buf.as_bytes().len(), 280_000);
        buf.set_pixel_rgba(69_999, 0, 1, 2, 3, 4);
        assert_eq!(buf.get_pixel_rgba(69_999, 0), Some((1, 2, 3, 4)));
        assert_eq!(&buf.as_bytes()[279_996..], &[4, 3, 2, 1]);
    }

    #[test]
    fn test_clear() {
        let mut buf = PixelBuffer::with_size(2, 2);
        buf.clear(1, 2, 3);
        assert_eq!(buf.get_pixel_rgba(1, 1), Some((1, 2, 3, 255)));
    }

    #[test]
    fn test_composite_premultiplied() {
        let mut dst = PixelBuffer::with_size(3, 1);
        dst.clear(200, 100, 0);

        let mut src = PixelBuffer::with_size(3, 1);
        src.set_pixel_rgba(0, 0, 0, 0, 0, 0); // transparent: untouched
        src.set_pixel_rgba(1, 0, 50, 60, 70, 255); // opaque: replaces
        src.set_pixel_rgba(2, 0, 64, 0, 64, 128); // half coverage, premultiplied

        dst.composite_premultiplied(&src);
        assert_eq!(dst.get_pixel_rgba(0, 0), Some((200, 100, 0, 255)));
        assert_eq!(dst.get_pixel_rgba(1, 0), Some((50, 60, 70, 255)));

        let (r, g, b, a) = dst.get_pixel_rgba(2, 0).unwrap();
        assert!((163..=165).contains(&r), "r = {}", r);
        assert!((49..=51).contains(&g), "g = {}", g);
        assert_eq!(b, 64);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_vertical_gradient_endpoints() {
        let mut buf = PixelBuffer::with_size(2, 5);
        buf.fill_vertical_gradient((0, 0, 0), (200, 100, 40));
        assert_eq!(buf.get_pixel_rgba(0, 0), Some((0, 0, 0, 255)));
        assert_eq!(buf.get_pixel_rgba(1, 4), Some((200, 100, 40, 255)));
    }
}
