/// Grid rasterizer
///
/// Draws the grid the way the view shows it (white frames, images
/// cropped to cover their frame, black frame borders, grey outer border)
/// into an RGBA canvas and encodes it as PNG.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{GenericImageView, ImageFormat, Rgba, RgbaImage};

use super::ExportError;
use crate::layout::{
    frame_rect, PixelRect, FRAME_BORDER, FRAME_BORDER_RGB, GRID_BORDER, GRID_BORDER_RGB,
    GRID_HEIGHT, GRID_WIDTH,
};
use crate::state::data::{FrameIndex, FRAME_COUNT};
use crate::state::drag::FrameTint;
use crate::state::grid::GridAssignment;
use crate::state::images::{Fidelity, ImageStore, LoadedImage};

/// Largest canvas side we agree to allocate
const MAX_CANVAS_SIDE: u32 = 16384;

/// Snapshot of what the grid displays at export time
#[derive(Debug, Clone, Default)]
pub struct Scene {
    frames: [Option<LoadedImage>; FRAME_COUNT],
}

impl Scene {
    /// Capture the full-resolution image of every filled frame
    ///
    /// Frames whose image is missing or broken stay blank. Pixels are
    /// shared with the store, not copied.
    pub fn capture(grid: &GridAssignment, images: &ImageStore) -> Self {
        let mut scene = Scene::default();
        for (frame, reference) in grid.displayed() {
            scene.frames[frame.get()] = images.loaded(reference, Fidelity::Full).cloned();
        }
        scene
    }

    pub fn frame(&self, frame: FrameIndex) -> Option<&LoadedImage> {
        self.frames[frame.get()].as_ref()
    }

    pub fn filled_count(&self) -> usize {
        self.frames.iter().flatten().count()
    }
}

/// Converts a scene into encoded image bytes
pub trait Rasterizer {
    fn rasterize(&self, scene: &Scene) -> Result<Vec<u8>, ExportError>;
}

/// PNG rasterizer using the `image` crate
#[derive(Debug, Clone, Copy)]
pub struct PngRasterizer {
    /// Output pixels per logical pixel (3 gives a 1080x1920 story)
    pub scale: u32,
}

impl PngRasterizer {
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }

    fn canvas_size(&self) -> Result<(u32, u32), ExportError> {
        let width = GRID_WIDTH.checked_mul(self.scale);
        let height = GRID_HEIGHT.checked_mul(self.scale);
        match (width, height) {
            (Some(w), Some(h)) if w > 0 && h > 0 && w <= MAX_CANVAS_SIDE && h <= MAX_CANVAS_SIDE => {
                Ok((w, h))
            }
            _ => Err(ExportError::Canvas(format!(
                "scale {} gives an unsupported canvas size",
                self.scale
            ))),
        }
    }

    /// Draw the scene without encoding it
    pub fn render(&self, scene: &Scene) -> Result<RgbaImage, ExportError> {
        let (width, height) = self.canvas_size()?;
        let [r, g, b] = FrameTint::Idle.rgb();
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));

        for frame in FrameIndex::all() {
            let rect = frame_rect(frame, self.scale);
            if let Some(source) = scene.frame(frame).and_then(LoadedImage::pixels) {
                if let Some(cover) = cover(&source, rect.width, rect.height) {
                    imageops::overlay(&mut canvas, &cover, rect.x as i64, rect.y as i64);
                }
            }
            stroke_rect(&mut canvas, rect, FRAME_BORDER * self.scale, FRAME_BORDER_RGB);
        }

        let outer = PixelRect { x: 0, y: 0, width, height };
        stroke_rect(&mut canvas, outer, GRID_BORDER * self.scale, GRID_BORDER_RGB);

        Ok(canvas)
    }
}

impl Rasterizer for PngRasterizer {
    fn rasterize(&self, scene: &Scene) -> Result<Vec<u8>, ExportError> {
        let canvas = self.render(scene)?;

        let mut out = Cursor::new(Vec::new());
        canvas
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| ExportError::Encode(e.to_string()))?;

        log::info!(
            "🖼️  Rasterized {} frames into {}x{} PNG ({}KB)",
            scene.filled_count(),
            canvas.width(),
            canvas.height(),
            out.get_ref().len() / 1024
        );
        Ok(out.into_inner())
    }
}

/// Scale `source` to cover `width` x `height` and crop the centre
fn cover<I>(source: &I, width: u32, height: u32) -> Option<RgbaImage>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (src_w, src_h) = source.dimensions();
    if src_w == 0 || src_h == 0 || width == 0 || height == 0 {
        return None;
    }

    let factor = f64::max(
        width as f64 / src_w as f64,
        height as f64 / src_h as f64,
    );
    let scaled_w = ((src_w as f64 * factor).ceil() as u32).max(width);
    let scaled_h = ((src_h as f64 * factor).ceil() as u32).max(height);

    let scaled = imageops::resize(source, scaled_w, scaled_h, FilterType::Triangle);
    let x = (scaled_w - width) / 2;
    let y = (scaled_h - height) / 2;
    Some(imageops::crop_imm(&scaled, x, y, width, height).to_image())
}

/// Draw a border of `thickness` along the inside edge of `rect`
fn stroke_rect(canvas: &mut RgbaImage, rect: PixelRect, thickness: u32, rgb: [u8; 3]) {
    let color = Rgba([rgb[0], rgb[1], rgb[2], 255]);
    let t = thickness.min(rect.width / 2).min(rect.height / 2);

    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            let on_edge = x < rect.x + t
                || x >= rect.x + rect.width - t
                || y < rect.y + t
                || y >= rect.y + rect.height - t;
            if on_edge {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::ImageRef;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const GREY: Rgba<u8> = Rgba([0xcc, 0xcc, 0xcc, 255]);

    fn scene_with(frame: usize, image: RgbaImage) -> Scene {
        let reference = ImageRef::new("red.png");
        let mut store = ImageStore::new();
        store.request(&reference, Fidelity::Full);
        store.finish(reference.clone(), Fidelity::Full, Ok(LoadedImage::from_rgba(image)));
        let grid = GridAssignment::new().assign(FrameIndex::new(frame).unwrap(), reference);
        Scene::capture(&grid, &store)
    }

    #[test]
    fn test_render_draws_frames_and_borders() {
        let scene = scene_with(0, RgbaImage::from_pixel(2, 2, RED));
        let canvas = PngRasterizer::new(1).render(&scene).unwrap();

        assert_eq!(canvas.dimensions(), (GRID_WIDTH, GRID_HEIGHT));
        assert_eq!(canvas.get_pixel(60, 160), &RED);
        assert_eq!(canvas.get_pixel(180, 160), &WHITE);
        assert_eq!(canvas.get_pixel(119, 160), &BLACK);
        assert_eq!(canvas.get_pixel(0, 160), &GREY);
    }

    #[test]
    fn test_wide_image_stays_inside_its_frame() {
        let scene = scene_with(0, RgbaImage::from_pixel(40, 1, RED));
        let canvas = PngRasterizer::new(1).render(&scene).unwrap();

        assert_eq!(canvas.get_pixel(60, 10), &RED);
        assert_eq!(canvas.get_pixel(60, 310), &RED);
        assert_eq!(canvas.get_pixel(130, 160), &WHITE);
        assert_eq!(canvas.get_pixel(60, 330), &WHITE);
    }

    #[test]
    fn test_thumbnail_only_frame_stays_blank() {
        let reference = ImageRef::new("preview.png");
        let mut store = ImageStore::new();
        store.request(&reference, Fidelity::Thumbnail);
        store.finish(
            reference.clone(),
            Fidelity::Thumbnail,
            Ok(LoadedImage::from_rgba(RgbaImage::from_pixel(2, 2, RED))),
        );
        let grid = GridAssignment::new().assign(FrameIndex::new(0).unwrap(), reference);

        assert_eq!(Scene::capture(&grid, &store).filled_count(), 0);
    }

    #[test]
    fn test_cover_crops_to_target() {
        let tall = RgbaImage::from_pixel(10, 100, RED);
        let covered = cover(&tall, 30, 20).unwrap();
        assert_eq!(covered.dimensions(), (30, 20));
        assert!(cover(&tall, 0, 20).is_none());
    }

    #[test]
    fn test_rasterize_produces_png() {
        let scene = Scene::default();
        let bytes = PngRasterizer::new(1).rasterize(&scene).unwrap();

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (GRID_WIDTH, GRID_HEIGHT));
    }

    #[test]
    fn test_story_scale_dimensions() {
        let canvas = PngRasterizer::new(3).render(&Scene::default()).unwrap();
        assert_eq!(canvas.dimensions(), (1080, 1920));
    }

    #[test]
    fn test_invalid_scale_is_rejected() {
        assert!(matches!(
            PngRasterizer::new(0).rasterize(&Scene::default()),
            Err(ExportError::Canvas(_))
        ));
        assert!(matches!(
            PngRasterizer::new(100).rasterize(&Scene::default()),
            Err(ExportError::Canvas(_))
        ));
    }
}
