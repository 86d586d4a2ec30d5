use std::io::Cursor;

use egui::{Color32, Rect};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

use super::{CompositeOp, ExportFormat, LineCap, PaintState, Path, PixelRegion, Surface};
use crate::error::ArtboardResult;
use crate::geometry::{Point, calculate_bounds, distance_to_segment};

/// Software [`Surface`] over an unpremultiplied RGBA buffer.
///
/// Strokes are anti-aliased by distance coverage. Caps follow
/// [`PaintState::line_cap`]; joins are always rendered round.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
    state: PaintState,
    saved: Vec<PaintState>,
    path: Path,
}

/// Per-pixel coverage over a clipped rectangle of the surface
struct Coverage {
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl Coverage {
    /// `None` if the bounds miss the surface entirely
    fn new(bounds: Rect, surface_width: u32, surface_height: u32) -> Option<Self> {
        let x0 = bounds.min.x.floor().max(0.0) as u32;
        let y0 = bounds.min.y.floor().max(0.0) as u32;
        let x1 = bounds.max.x.ceil().min(surface_width as f32).max(0.0) as u32;
        let y1 = bounds.max.y.ceil().min(surface_height as f32).max(0.0) as u32;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let width = x1 - x0;
        let height = y1 - y0;
        Some(Self {
            x0,
            y0,
            width,
            height,
            values: vec![0.0; (width * height) as usize],
        })
    }

    fn get(&self, x: u32, y: u32) -> f32 {
        self.values[(y * self.width + x) as usize]
    }

    /// Two-pass box blur with the given radius
    fn blurred(&self, radius: u32) -> Coverage {
        let r = radius as i64;
        let (w, h) = (self.width as i64, self.height as i64);
        let span = (2 * r + 1) as f32;

        let mut horizontal = vec![0.0; self.values.len()];
        for y in 0..h {
            for x in 0..w {
                let mut sum = 0.0;
                for dx in -r..=r {
                    let sx = x + dx;
                    if (0..w).contains(&sx) {
                        sum += self.values[(y * w + sx) as usize];
                    }
                }
                horizontal[(y * w + x) as usize] = sum / span;
            }
        }

        let mut values = vec![0.0; self.values.len()];
        for y in 0..h {
            for x in 0..w {
                let mut sum = 0.0;
                for dy in -r..=r {
                    let sy = y + dy;
                    if (0..h).contains(&sy) {
                        sum += horizontal[(sy * w + x) as usize];
                    }
                }
                values[(y * w + x) as usize] = sum / span;
            }
        }

        Coverage {
            x0: self.x0,
            y0: self.y0,
            width: self.width,
            height: self.height,
            values,
        }
    }
}

impl RasterSurface {
    /// A fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    pub fn filled(width: u32, height: u32, color: Color32) -> Self {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        Self::from_image(RgbaImage::from_pixel(width, height, Rgba([r, g, b, a])))
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            state: PaintState::default(),
            saved: Vec::new(),
            path: Path::new(),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Unpremultiplied RGBA at a pixel, `None` outside the surface
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.pixels.width() && y < self.pixels.height() {
            Some(self.pixels.get_pixel(x, y).0)
        } else {
            None
        }
    }

    /// Depth of the saved state stack
    pub fn saved_depth(&self) -> usize {
        self.saved.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn stroke_coverage(&self, pad: f32) -> Option<Coverage> {
        let half = self.state.line_width.max(0.0) / 2.0;
        if half <= 0.0 || self.path.is_empty() && !self.has_round_dots() {
            return None;
        }

        let points: Vec<Point> = self.path.subpaths().iter().flatten().copied().collect();
        let cap_extension = match self.state.line_cap {
            LineCap::Square => half * std::f32::consts::SQRT_2,
            _ => half,
        };
        let bounds = calculate_bounds(&points, cap_extension + 1.0 + pad);
        let mut coverage = Coverage::new(bounds, self.pixels.width(), self.pixels.height())?;

        for subpath in self.path.subpaths() {
            for (index, segment) in subpath.windows(2).enumerate() {
                let interior_start = index > 0;
                self.accumulate_segment(&mut coverage, segment[0], segment[1], half, interior_start);
            }
            if subpath.len() == 1 && self.state.line_cap == LineCap::Round {
                self.accumulate_disc(&mut coverage, subpath[0], half);
            }
        }
        Some(coverage)
    }

    fn has_round_dots(&self) -> bool {
        self.state.line_cap == LineCap::Round
            && self.path.subpaths().iter().any(|s| s.len() == 1)
    }

    fn accumulate_segment(
        &self,
        coverage: &mut Coverage,
        start: Point,
        end: Point,
        half: f32,
        round_join_at_start: bool,
    ) {
        let cap = self.state.line_cap;
        let direction = end - start;
        let length = direction.length();
        let (a, b) = match cap {
            LineCap::Square if length > 0.0 => {
                let unit = direction / length;
                (start - unit * half, end + unit * half)
            }
            _ => (start, end),
        };
        let axis = b - a;
        let axis_len = axis.length();

        for y in 0..coverage.height {
            for x in 0..coverage.width {
                let p = Point::new(
                    (coverage.x0 + x) as f32 + 0.5,
                    (coverage.y0 + y) as f32 + 0.5,
                );
                let mut value = match cap {
                    LineCap::Round => {
                        (half + 0.5 - distance_to_segment(p, a, b)).clamp(0.0, 1.0)
                    }
                    LineCap::Butt | LineCap::Square => {
                        if axis_len == 0.0 {
                            0.0
                        } else {
                            let rel = p - a;
                            let along = rel.dot(axis) / axis_len;
                            let perpendicular = (rel.x * axis.y - rel.y * axis.x).abs() / axis_len;
                            // Negative inside the segment's span
                            let outside = (-along).max(along - axis_len);
                            (0.5 - (perpendicular - half).max(outside)).clamp(0.0, 1.0)
                        }
                    }
                };
                if round_join_at_start && cap != LineCap::Round {
                    let join = (half + 0.5 - (p - start).length()).clamp(0.0, 1.0);
                    value = value.max(join);
                }
                let slot = &mut coverage.values[(y * coverage.width + x) as usize];
                *slot = slot.max(value);
            }
        }
    }

    fn accumulate_disc(&self, coverage: &mut Coverage, center: Point, radius: f32) {
        for y in 0..coverage.height {
            for x in 0..coverage.width {
                let p = Point::new(
                    (coverage.x0 + x) as f32 + 0.5,
                    (coverage.y0 + y) as f32 + 0.5,
                );
                let value = (radius + 0.5 - (p - center).length()).clamp(0.0, 1.0);
                let slot = &mut coverage.values[(y * coverage.width + x) as usize];
                *slot = slot.max(value);
            }
        }
    }

    /// Paint `color` through a coverage mask with the ambient alpha and compositing
    fn paint_coverage(&mut self, coverage: &Coverage, color: Color32) {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        let source = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];
        let base_alpha = a as f32 / 255.0 * self.state.global_alpha.clamp(0.0, 1.0);
        let op = self.state.composite;

        for y in 0..coverage.height {
            for x in 0..coverage.width {
                let alpha = base_alpha * coverage.get(x, y);
                let pixel = self.pixels.get_pixel_mut(coverage.x0 + x, coverage.y0 + y);
                composite(pixel, source, alpha, op);
            }
        }
    }
}

/// Blend one source colour into a destination pixel (W3C compositing, unpremultiplied storage)
fn composite(dst: &mut Rgba<u8>, src: [f32; 3], alpha: f32, op: CompositeOp) {
    if alpha <= 0.0 {
        return;
    }
    let alpha = alpha.min(1.0);
    let [dr, dg, db, da] = dst.0;
    let d = [dr as f32 / 255.0, dg as f32 / 255.0, db as f32 / 255.0];
    let ab = da as f32 / 255.0;
    let to_u8 = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;

    match op {
        CompositeOp::DestinationOut => {
            dst.0[3] = to_u8(ab * (1.0 - alpha));
        }
        CompositeOp::SourceOver | CompositeOp::Multiply => {
            let out_alpha = alpha + ab * (1.0 - alpha);
            if out_alpha <= 0.0 {
                dst.0 = [0, 0, 0, 0];
                return;
            }
            let mut out = [0u8; 4];
            for i in 0..3 {
                let s = if op == CompositeOp::Multiply {
                    (1.0 - ab) * src[i] + ab * src[i] * d[i]
                } else {
                    src[i]
                };
                out[i] = to_u8((s * alpha + d[i] * ab * (1.0 - alpha)) / out_alpha);
            }
            out[3] = to_u8(out_alpha);
            dst.0 = out;
        }
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn state(&self) -> &PaintState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PaintState {
        &mut self.state
    }

    fn save(&mut self) {
        self.saved.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, point: Point) {
        self.path.move_to(point);
    }

    fn line_to(&mut self, point: Point) {
        self.path.line_to(point);
    }

    fn quadratic_curve_to(&mut self, control: Point, to: Point) {
        self.path.quadratic_curve_to(control, to);
    }

    fn bezier_curve_to(&mut self, control1: Point, control2: Point, to: Point) {
        self.path.bezier_curve_to(control1, control2, to);
    }

    fn stroke(&mut self) {
        let blur = self.state.shadow_blur.max(0.0).ceil() as u32;
        let shadow_visible = blur > 0 && self.state.shadow_color.a() > 0;
        let pad = if shadow_visible { blur as f32 } else { 0.0 };

        let Some(coverage) = self.stroke_coverage(pad) else {
            return;
        };
        if shadow_visible {
            let shadow = coverage.blurred(blur);
            self.paint_coverage(&shadow, self.state.shadow_color);
        }
        self.paint_coverage(&coverage, self.state.stroke_color);
    }

    fn fill_rect(&mut self, rect: Rect) {
        let Some(mut coverage) = Coverage::new(rect, self.pixels.width(), self.pixels.height())
        else {
            return;
        };
        for y in 0..coverage.height {
            for x in 0..coverage.width {
                let px = (coverage.x0 + x) as f32;
                let py = (coverage.y0 + y) as f32;
                let overlap_x = (rect.max.x.min(px + 1.0) - rect.min.x.max(px)).max(0.0);
                let overlap_y = (rect.max.y.min(py + 1.0) - rect.min.y.max(py)).max(0.0);
                coverage.values[(y * coverage.width + x) as usize] = overlap_x * overlap_y;
            }
        }
        self.paint_coverage(&coverage, self.state.fill_color);
    }

    fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32) -> PixelRegion {
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + width as i64).min(self.pixels.width() as i64);
        let y1 = (y as i64 + height as i64).min(self.pixels.height() as i64);
        if x1 <= x0 || y1 <= y0 {
            return PixelRegion::new(0, 0);
        }
        imageops::crop_imm(
            &self.pixels,
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        )
        .to_image()
    }

    fn put_image_data(&mut self, region: &PixelRegion, x: i32, y: i32) {
        imageops::replace(&mut self.pixels, region, x as i64, y as i64);
    }

    fn draw_image(&mut self, region: &PixelRegion, dest: Rect) {
        if region.width() == 0 || region.height() == 0 {
            return;
        }
        let dest_width = dest.width().round();
        let dest_height = dest.height().round();
        if dest_width < 1.0 || dest_height < 1.0 {
            return;
        }
        let (dest_width, dest_height) = (dest_width as u32, dest_height as u32);

        let scaled;
        let source = if region.dimensions() == (dest_width, dest_height) {
            region
        } else {
            scaled = imageops::resize(region, dest_width, dest_height, FilterType::Triangle);
            &scaled
        };

        let left = dest.min.x.round() as i64;
        let top = dest.min.y.round() as i64;
        let global_alpha = self.state.global_alpha.clamp(0.0, 1.0);
        let op = self.state.composite;
        let (surface_width, surface_height) = self.pixels.dimensions();

        for (sx, sy, src) in source.enumerate_pixels() {
            let tx = left + sx as i64;
            let ty = top + sy as i64;
            if tx < 0 || ty < 0 || tx >= surface_width as i64 || ty >= surface_height as i64 {
                continue;
            }
            let [r, g, b, a] = src.0;
            let color = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];
            let alpha = a as f32 / 255.0 * global_alpha;
            composite(self.pixels.get_pixel_mut(tx as u32, ty as u32), color, alpha, op);
        }
    }

    fn encode(&self, format: ExportFormat) -> ArtboardResult<Vec<u8>> {
        let mut bytes = Vec::new();
        let image = DynamicImage::ImageRgba8(self.pixels.clone());
        let image = match format {
            ExportFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
            ExportFormat::Png | ExportFormat::Bmp => image,
        };
        image.write_to(&mut Cursor::new(&mut bytes), format.image_format())?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(size: u32) -> RasterSurface {
        RasterSurface::filled(size, size, Color32::WHITE)
    }

    #[test]
    fn test_stroke_paints_along_segment() {
        let mut surface = white(20);
        surface.state_mut().line_width = 4.0;
        surface.state_mut().line_cap = LineCap::Round;
        surface.begin_path();
        surface.move_to(Point::new(2.0, 10.0));
        surface.line_to(Point::new(18.0, 10.0));
        surface.stroke();

        assert_eq!(surface.pixel(10, 10), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(10, 2), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_butt_cap_does_not_extend_past_end() {
        let mut surface = white(20);
        surface.state_mut().line_width = 4.0;
        surface.begin_path();
        surface.move_to(Point::new(5.0, 10.0));
        surface.line_to(Point::new(15.0, 10.0));
        surface.stroke();

        assert_eq!(surface.pixel(10, 10), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(2, 10), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_global_alpha_blends() {
        let mut surface = white(10);
        surface.state_mut().global_alpha = 0.5;
        surface.state_mut().fill_color = Color32::BLACK;
        surface.fill_rect(Rect::from_min_max(Point::new(0.0, 0.0), Point::new(10.0, 10.0)));
        let [r, _, _, a] = surface.pixel(5, 5).unwrap();
        assert!((126..=129).contains(&r), "got {r}");
        assert_eq!(a, 255);
    }

    #[test]
    fn test_multiply_darkens_only() {
        let mut surface = RasterSurface::filled(4, 4, Color32::from_rgb(200, 100, 50));
        surface.state_mut().composite = CompositeOp::Multiply;
        surface.state_mut().fill_color = Color32::WHITE;
        surface.fill_rect(Rect::from_min_max(Point::new(0.0, 0.0), Point::new(4.0, 4.0)));
        assert_eq!(surface.pixel(1, 1), Some([200, 100, 50, 255]));
    }

    #[test]
    fn test_destination_out_erases() {
        let mut surface = white(4);
        surface.state_mut().composite = CompositeOp::DestinationOut;
        surface.fill_rect(Rect::from_min_max(Point::new(0.0, 0.0), Point::new(4.0, 4.0)));
        assert_eq!(surface.pixel(2, 2).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_save_restore() {
        let mut surface = white(4);
        surface.save();
        surface.state_mut().global_alpha = 0.2;
        surface.restore();
        assert_eq!(surface.state().global_alpha, 1.0);
        // Unbalanced restore is ignored
        surface.restore();
        assert_eq!(surface.saved_depth(), 0);
    }

    #[test]
    fn test_image_data_round_trip_is_clamped() {
        let mut surface = white(10);
        let region = surface.get_image_data(-5, -5, 10, 10);
        assert_eq!(region.dimensions(), (5, 5));
        assert_eq!(surface.get_image_data(20, 20, 5, 5).dimensions(), (0, 0));

        let red = PixelRegion::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        surface.put_image_data(&red, 3, 3);
        assert_eq!(surface.pixel(4, 4), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(5, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_draw_image_scales_into_dest() {
        let mut surface = white(10);
        let red = PixelRegion::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        surface.draw_image(&red, Rect::from_min_max(Point::new(0.0, 0.0), Point::new(4.0, 4.0)));
        assert_eq!(surface.pixel(3, 3), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(6, 6), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_shadow_spreads_beyond_line() {
        let mut plain = white(30);
        let mut shadowed = white(30);
        for surface in [&mut plain, &mut shadowed] {
            surface.state_mut().line_width = 2.0;
            surface.state_mut().line_cap = LineCap::Round;
        }
        shadowed.state_mut().shadow_color = Color32::BLACK;
        shadowed.state_mut().shadow_blur = 3.0;
        for surface in [&mut plain, &mut shadowed] {
            surface.begin_path();
            surface.move_to(Point::new(5.0, 15.0));
            surface.line_to(Point::new(25.0, 15.0));
            surface.stroke();
        }
        assert_eq!(plain.pixel(15, 18), Some([255, 255, 255, 255]));
        assert!(shadowed.pixel(15, 18).unwrap()[0] < 255);
    }

    #[test]
    fn test_encode_png_signature() {
        let surface = white(4);
        let bytes = surface.encode(ExportFormat::Png).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let jpeg = surface.encode(ExportFormat::Jpeg).unwrap();
        assert_eq!(&jpeg[0..2], &[0xff, 0xd8]);
    }
}
