/// Orthographic ASCII wireframe renderer for terminal output
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use meshview_core::{Bounds, Face};
use nalgebra::Point3;
use std::io::Write;

/// Character ramp for depth (farthest to nearest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 0.5;

/// Fraction of the screen the model occupies when first fitted
const FIT_MARGIN: f32 = 0.8;

/// Fixed mapping from model XY to screen cells.
///
/// Fitted once per loaded model so later transforms visibly move the model
/// instead of being re-centered away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    center: Point3<f32>,
    /// Screen cells per model unit, horizontally
    zoom: f32,
    /// Depth range mapped onto the ramp
    near: f32,
    far: f32,
}

impl Viewport {
    pub fn fit(bounds: &Bounds, width: usize, height: usize) -> Self {
        let extent = bounds.extent();
        let span_x = extent.x.max(f32::EPSILON);
        let span_y = (extent.y * CELL_ASPECT).max(f32::EPSILON);
        let zoom = FIT_MARGIN * (width as f32 / span_x).min(height as f32 / span_y);

        let center = bounds.center();
        let half_depth = extent.norm().max(1.0);
        Self {
            center,
            zoom,
            near: center.z + half_depth,
            far: center.z - half_depth,
        }
    }

    fn project(&self, p: &Point3<f32>, width: usize, height: usize) -> (f32, f32, f32) {
        let x = (p.x - self.center.x) * self.zoom + width as f32 / 2.0;
        let y = height as f32 / 2.0 - (p.y - self.center.y) * self.zoom * CELL_ASPECT;
        (x, y, p.z)
    }

    /// Ramp character for a depth; larger z is nearer the viewer
    fn shade(&self, z: f32) -> char {
        let t = ((z - self.far) / (self.near - self.far)).clamp(0.0, 1.0);
        let index = (t * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
        LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
    }
}

/// ASCII renderer that draws mesh edges into a character grid
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::NEG_INFINITY; size],
            char_buffer: vec![' '; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::NEG_INFINITY);
        self.char_buffer.fill(' ');
    }

    pub fn render_wireframe(&mut self, vertices: &[Point3<f32>], faces: &[Face], viewport: &Viewport) {
        let projected: Vec<_> = vertices
            .iter()
            .map(|p| viewport.project(p, self.width, self.height))
            .collect();

        if faces.is_empty() {
            for &p in &projected {
                self.plot(p, viewport);
            }
            return;
        }

        for face in faces {
            for (a, b) in face.edges() {
                if let (Some(&pa), Some(&pb)) = (projected.get(a), projected.get(b)) {
                    self.draw_line(pa, pb, viewport);
                }
            }
        }
    }

    /// Sample the segment once per cell along its longer screen axis
    fn draw_line(&mut self, a: (f32, f32, f32), b: (f32, f32, f32), viewport: &Viewport) {
        let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil().max(1.0);
        // Guard against absurd spans after extreme zoom
        let steps = steps.min(4.0 * (self.width + self.height) as f32) as usize;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.plot(
                (
                    a.0 + (b.0 - a.0) * t,
                    a.1 + (b.1 - a.1) * t,
                    a.2 + (b.2 - a.2) * t,
                ),
                viewport,
            );
        }
    }

    fn plot(&mut self, (x, y, z): (f32, f32, f32), viewport: &Viewport) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = y * self.width + x;
        if z > self.depth_buffer[idx] {
            self.depth_buffer[idx] = z;
            self.char_buffer[idx] = viewport.shade(z);
        }
    }

    /// Rows of the current frame, for inspection without a terminal
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.char_buffer
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect())
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];

                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_core::MeshData;

    #[test]
    fn test_fit_centers_model() {
        let cube = MeshData::cube(2.0);
        let viewport = Viewport::fit(&cube.bounds(), 80, 40);
        let (x, y, _) = viewport.project(&Point3::origin(), 80, 40);
        assert!((x - 40.0).abs() < 1e-4);
        assert!((y - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_cube_wireframe_is_drawn_inside_screen() {
        let cube = MeshData::cube(2.0);
        let viewport = Viewport::fit(&cube.bounds(), 40, 20);
        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.render_wireframe(cube.vertices(), cube.faces(), &viewport);

        let rows: Vec<String> = renderer.rows().collect();
        assert_eq!(rows.len(), 20);
        assert!(rows.iter().all(|r| r.chars().count() == 40));

        let drawn = rows.iter().flat_map(|r| r.chars()).filter(|&c| c != ' ').count();
        assert!(drawn > 0);
        // Outer border stays blank because of the fit margin
        assert!(rows[0].trim().is_empty());
        assert!(rows[19].trim().is_empty());
    }

    #[test]
    fn test_shade_by_depth() {
        let cube = MeshData::cube(2.0);
        let viewport = Viewport::fit(&cube.bounds(), 40, 20);
        assert_ne!(viewport.shade(1.0), viewport.shade(-1.0));
        assert_eq!(viewport.shade(100.0), '@');
        assert_eq!(viewport.shade(-100.0), '.');
    }

    #[test]
    fn test_clear_resets_buffers() {
        let cube = MeshData::cube(2.0);
        let viewport = Viewport::fit(&cube.bounds(), 20, 10);
        let mut renderer = AsciiRenderer::new(20, 10);
        renderer.render_wireframe(cube.vertices(), cube.faces(), &viewport);
        renderer.clear();
        assert!(renderer.rows().all(|r| r.trim().is_empty()));
    }
}
