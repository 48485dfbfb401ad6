// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::{Error, Result, Role};
use core::fmt;
use rga_sys::{
    im_rect, RK_FORMAT_BGRA_8888, RK_FORMAT_BGRX_8888, RK_FORMAT_BGR_888, RK_FORMAT_RGBA_8888,
    RK_FORMAT_RGBX_8888, RK_FORMAT_RGB_888,
};
use std::{
    error::Error as StdError, ffi::c_void, fs, io, marker::PhantomData, path::Path, ptr::NonNull,
};
use tracing::debug;
use turbojpeg::OwnedBuf;

/// Packed pixel formats the RGA can scale, tagged with their `RK_FORMAT_*`
/// values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 32-bit R, G, B, A
    Rgba8888,
    /// 32-bit R, G, B, unused
    Rgbx8888,
    /// 24-bit R, G, B
    Rgb888,
    /// 32-bit B, G, R, A
    Bgra8888,
    /// 24-bit B, G, R
    Bgr888,
    /// 32-bit B, G, R, unused
    Bgrx8888,
}

impl PixelFormat {
    /// Maps an `RK_FORMAT_*` tag onto a supported format.
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            RK_FORMAT_RGBA_8888 => Some(PixelFormat::Rgba8888),
            RK_FORMAT_RGBX_8888 => Some(PixelFormat::Rgbx8888),
            RK_FORMAT_RGB_888 => Some(PixelFormat::Rgb888),
            RK_FORMAT_BGRA_8888 => Some(PixelFormat::Bgra8888),
            RK_FORMAT_BGR_888 => Some(PixelFormat::Bgr888),
            RK_FORMAT_BGRX_8888 => Some(PixelFormat::Bgrx8888),
            _ => None,
        }
    }

    pub const fn to_raw(self) -> i32 {
        match self {
            PixelFormat::Rgba8888 => RK_FORMAT_RGBA_8888,
            PixelFormat::Rgbx8888 => RK_FORMAT_RGBX_8888,
            PixelFormat::Rgb888 => RK_FORMAT_RGB_888,
            PixelFormat::Bgra8888 => RK_FORMAT_BGRA_8888,
            PixelFormat::Bgr888 => RK_FORMAT_BGR_888,
            PixelFormat::Bgrx8888 => RK_FORMAT_BGRX_8888,
        }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb888 | PixelFormat::Bgr888 => 3,
            _ => 4,
        }
    }

    /// Number of bytes a tightly packed `width` x `height` image occupies,
    /// or `None` on overflow.
    pub fn image_size(self, width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(self.bytes_per_pixel())
    }

    fn turbojpeg(self) -> turbojpeg::PixelFormat {
        match self {
            PixelFormat::Rgba8888 => turbojpeg::PixelFormat::RGBA,
            PixelFormat::Rgbx8888 => turbojpeg::PixelFormat::RGBX,
            PixelFormat::Rgb888 => turbojpeg::PixelFormat::RGB,
            PixelFormat::Bgra8888 => turbojpeg::PixelFormat::BGRA,
            PixelFormat::Bgr888 => turbojpeg::PixelFormat::BGR,
            PixelFormat::Bgrx8888 => turbojpeg::PixelFormat::BGRX,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PixelFormat::Rgba8888 => "RGBA8888",
            PixelFormat::Rgbx8888 => "RGBX8888",
            PixelFormat::Rgb888 => "RGB888",
            PixelFormat::Bgra8888 => "BGRA8888",
            PixelFormat::Bgr888 => "BGR888",
            PixelFormat::Bgrx8888 => "BGRX8888",
        };
        f.write_str(name)
    }
}

/// Rectangular region of an image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: i32,
    /// Y coordinate of top-left corner
    pub y: i32,
    /// Width of the rectangle in pixels
    pub width: i32,
    /// Height of the rectangle in pixels
    pub height: i32,
}

impl Rect {
    /// The rectangle covering a whole `width` x `height` frame.
    pub fn full(width: u32, height: u32) -> Self {
        Rect {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        }
    }
}

impl From<Rect> for im_rect {
    fn from(r: Rect) -> Self {
        im_rect {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        }
    }
}

/// Caller-owned pixel memory described for the driver.
///
/// A `Surface` never allocates or frees pixels. It borrows them for `'a`,
/// which keeps the memory valid and in place for as long as the driver may
/// hold a registration of it.
#[derive(Debug)]
pub struct Surface<'a> {
    ptr: NonNull<u8>,
    len: usize,
    width: u32,
    height: u32,
    format: PixelFormat,
    _pixels: PhantomData<&'a mut [u8]>,
}

// A Surface is an exclusive or read-only borrow of plain bytes.
unsafe impl Send for Surface<'_> {}

impl<'a> Surface<'a> {
    /// Describes read-only pixels, used as a resize source.
    pub fn new(pixels: &'a [u8], width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            // the driver only ever reads from source buffers
            ptr: NonNull::from(pixels).cast(),
            len: pixels.len(),
            width,
            height,
            format,
            _pixels: PhantomData,
        }
    }

    /// Describes writable pixels, used as a resize destination.
    pub fn new_mut(pixels: &'a mut [u8], width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            len: pixels.len(),
            ptr: NonNull::from(pixels).cast(),
            width,
            height,
            format,
            _pixels: PhantomData,
        }
    }

    /// Describes pixels at a raw address.
    ///
    /// # Safety
    ///
    /// `ptr` must point to at least `len` bytes that stay valid, unmoved and
    /// not otherwise mutated for the whole lifetime `'a`.
    pub unsafe fn from_raw_parts(
        ptr: NonNull<u8>,
        len: usize,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Self {
        Self {
            ptr,
            len,
            width,
            height,
            format,
            _pixels: PhantomData,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.ptr.as_ptr().cast()
    }

    pub fn rect(&self) -> Rect {
        Rect::full(self.width, self.height)
    }

    /// Checks the geometry against the backing memory and returns the number
    /// of bytes to register with the driver.
    pub fn validate(&self, role: Role) -> Result<usize> {
        let invalid = Error::InvalidDimensions {
            role,
            width: self.width,
            height: self.height,
        };
        if self.width == 0 || self.height == 0 {
            return Err(invalid);
        }
        let required = match self.format.image_size(self.width, self.height) {
            // the driver takes the size as a C int
            Some(size) if i32::try_from(size).is_ok() => size,
            _ => return Err(invalid),
        };
        if self.len < required {
            return Err(Error::BufferTooSmall {
                role,
                required,
                actual: self.len,
            });
        }
        Ok(required)
    }
}

/// Heap-allocated, tightly packed image.
///
/// # Example
///
/// ```
/// use rga_resize::image::{Image, PixelFormat};
///
/// let img = Image::new(640, 480, PixelFormat::Bgra8888)?;
/// assert_eq!(img.size(), 640 * 480 * 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Image {
    /// Allocates a zeroed image.
    ///
    /// Fails without allocating if the image is larger than the driver can
    /// register, whose buffer sizes are C ints.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, Box<dyn StdError>> {
        let size = format
            .image_size(width, height)
            .filter(|&size| i32::try_from(size).is_ok())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{}x{} {} image is too large", width, height, format),
                )
            })?;
        Ok(Self {
            width,
            height,
            format,
            data: vec![0; size],
        })
    }

    /// Decodes a JPEG into an image of the requested packed format.
    pub fn from_jpeg(jpeg: &[u8], format: PixelFormat) -> Result<Self, Box<dyn StdError>> {
        let decoded = turbojpeg::decompress(jpeg, format.turbojpeg())?;
        let row = decoded.width * format.bytes_per_pixel();
        let data = if decoded.pitch == row {
            decoded.pixels
        } else {
            decoded
                .pixels
                .chunks(decoded.pitch)
                .take(decoded.height)
                .flat_map(|line| &line[..row])
                .copied()
                .collect()
        };
        debug!("decoded {}x{} JPEG", decoded.width, decoded.height);
        Ok(Self {
            width: decoded.width as u32,
            height: decoded.height as u32,
            format,
            data,
        })
    }

    /// Reads and decodes a JPEG file.
    pub fn load<P: AsRef<Path>>(path: P, format: PixelFormat) -> Result<Self, Box<dyn StdError>> {
        let jpeg = fs::read(path)?;
        Self::from_jpeg(&jpeg, format)
    }

    /// Encodes the image to JPEG at the given quality (1-100).
    pub fn encode_jpeg(&self, quality: i32) -> Result<OwnedBuf, Box<dyn StdError>> {
        if self.data.is_empty() {
            return Err(Box::new(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot encode an empty image",
            )));
        }
        let img = turbojpeg::Image {
            width: self.width as usize,
            height: self.height as usize,
            format: self.format.turbojpeg(),
            pixels: self.data.as_slice(),
            pitch: self.width as usize * self.format.bytes_per_pixel(),
        };
        Ok(turbojpeg::compress(img, quality, turbojpeg::Subsamp::Sub2x2)?)
    }

    /// Encodes the image and writes it to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P, quality: i32) -> Result<(), Box<dyn StdError>> {
        let jpeg = self.encode_jpeg(quality)?;
        fs::write(path, &jpeg)?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Borrows the image as a resize source.
    pub fn surface(&self) -> Surface<'_> {
        Surface::new(&self.data, self.width, self.height, self.format)
    }

    /// Borrows the image as a resize destination.
    pub fn surface_mut(&mut self) -> Surface<'_> {
        Surface::new_mut(&mut self.data, self.width, self.height, self.format)
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_tags_round_trip() {
        for fmt in [
            PixelFormat::Rgba8888,
            PixelFormat::Rgbx8888,
            PixelFormat::Rgb888,
            PixelFormat::Bgra8888,
            PixelFormat::Bgr888,
            PixelFormat::Bgrx8888,
        ] {
            assert_eq!(PixelFormat::from_raw(fmt.to_raw()), Some(fmt));
        }
        assert_eq!(PixelFormat::from_raw(0x300), Some(PixelFormat::Bgra8888));
        assert_eq!(PixelFormat::from_raw(0xa00), None);
    }

    #[test]
    fn size_follows_format() {
        assert_eq!(PixelFormat::Bgra8888.image_size(640, 480), Some(1228800));
        assert_eq!(PixelFormat::Bgr888.image_size(640, 480), Some(921600));
        assert_eq!(
            Image::new(1920, 1080, PixelFormat::Rgba8888).unwrap().size(),
            8294400
        );
    }

    #[test]
    fn oversized_image_is_refused() {
        // 2^66 bytes overflows usize
        let err = Image::new(u32::MAX, u32::MAX, PixelFormat::Bgra8888).unwrap_err();
        assert!(err.to_string().contains("too large"), "{}", err);

        // fits usize but not the driver's int
        assert!(Image::new(40000, 40000, PixelFormat::Bgra8888).is_err());
    }

    #[test]
    fn validate_rejects_bad_geometry() {
        let pixels = vec![0u8; 16];

        let zero = Surface::new(&pixels, 0, 4, PixelFormat::Bgra8888);
        assert!(matches!(
            zero.validate(Role::Source),
            Err(Error::InvalidDimensions { role: Role::Source, .. })
        ));

        let short = Surface::new(&pixels, 4, 4, PixelFormat::Bgra8888);
        assert!(matches!(
            short.validate(Role::Source),
            Err(Error::BufferTooSmall {
                required: 64,
                actual: 16,
                ..
            })
        ));

        let huge = Surface::new(&pixels, 65536, 65536, PixelFormat::Bgra8888);
        assert!(matches!(
            huge.validate(Role::Destination),
            Err(Error::InvalidDimensions { .. })
        ));

        let ok = Surface::new(&pixels, 2, 2, PixelFormat::Bgra8888);
        assert_eq!(ok.validate(Role::Source).unwrap(), 16);
    }

    #[test]
    fn jpeg_encode_decode() {
        let mut img = Image::new(64, 48, PixelFormat::Bgra8888).unwrap();
        for px in img.as_slice_mut().chunks_mut(4) {
            px.copy_from_slice(&[40, 80, 160, 255]);
        }
        let jpeg = img.encode_jpeg(95).unwrap();
        let back = Image::from_jpeg(&jpeg, PixelFormat::Bgra8888).unwrap();
        assert_eq!((back.width(), back.height()), (64, 48));
        assert_eq!(back.size(), img.size());

        let px = &back.as_slice()[..4];
        assert!(px[0].abs_diff(40) < 8 && px[1].abs_diff(80) < 8 && px[2].abs_diff(160) < 8);
    }

    #[test]
    fn encoding_empty_image_fails() {
        let img = Image::new(0, 0, PixelFormat::Bgra8888).unwrap();
        assert!(img.encode_jpeg(90).is_err());
    }
}
