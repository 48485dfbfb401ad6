// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use rga_resize::{
    error::Role,
    image::{Image, PixelFormat, Rect},
};
use std::error::Error;

#[test]
fn test_formats() -> Result<(), Box<dyn Error>> {
    let mut img = Image::new(1920, 1080, PixelFormat::Bgra8888)?;
    println!("{}", img);
    assert_eq!(img.size(), 8294400);

    img = Image::new(1920, 1080, PixelFormat::Rgbx8888)?;
    assert_eq!(img.size(), 8294400);

    img = Image::new(1920, 1080, PixelFormat::Rgb888)?;
    println!("{}", img);
    assert_eq!(img.size(), 6220800);

    img = Image::new(1920, 1080, PixelFormat::Bgr888)?;
    assert_eq!(img.size(), 6220800);
    assert_eq!(img.to_string(), "1920x1080 BGR888");
    Ok(())
}

#[test]
fn test_surface_geometry() -> Result<(), Box<dyn Error>> {
    let mut img = Image::new(640, 480, PixelFormat::Bgra8888)?;
    let surface = img.surface_mut();
    assert_eq!(surface.len(), 640 * 480 * 4);
    assert_eq!(
        surface.rect(),
        Rect {
            x: 0,
            y: 0,
            width: 640,
            height: 480
        }
    );
    assert_eq!(surface.validate(Role::Destination)?, 1228800);
    Ok(())
}

#[test]
fn test_jpeg_file() -> Result<(), Box<dyn Error>> {
    let mut img = Image::new(320, 240, PixelFormat::Bgra8888)?;
    for (i, px) in img.as_slice_mut().chunks_mut(4).enumerate() {
        let shade = ((i % 320) * 255 / 319) as u8;
        px.copy_from_slice(&[shade, shade, shade, 255]);
    }

    let path = std::env::temp_dir().join(format!("rga-resize-{}.jpg", std::process::id()));
    img.save(&path, 95)?;
    let back = Image::load(&path, PixelFormat::Bgra8888)?;
    std::fs::remove_file(&path)?;

    assert_eq!((back.width(), back.height()), (320, 240));
    assert_eq!(back.format(), PixelFormat::Bgra8888);
    let right = &back.as_slice()[(120 * 320 + 319) * 4..][..4];
    assert!(right[0] > 240, "{:?}", right);
    assert_eq!(right[3], 255);
    Ok(())
}

#[test]
fn test_load_missing_file() {
    assert!(Image::load("/nonexistent/input.jpg", PixelFormat::Bgra8888).is_err());
}
