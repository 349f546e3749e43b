//! ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Point3, Vector3};
use pickview_core::transform::project;
use pickview_core::{Frame, Model, Viewport};
use std::io::Write;
use std::ops::Range;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];
const EDGE_CHAR: char = 'o';
/// Pulls edges slightly towards the viewer so they win against their faces.
const EDGE_DEPTH_BIAS: f32 = 1e-4;
/// Height of a terminal cell in viewport units; cells are one unit wide.
pub const CELL_ASPECT: u32 = 2;
/// Triangles with less doubled screen area than this are not filled.
const MIN_DOUBLED_AREA: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    color: Color,
}

const BLANK: Cell = Cell {
    ch: ' ',
    color: Color::Reset,
};

/// Screen-space vertex: column, row (top-down) and window depth
type ScreenPoint = (f32, f32, f32);

/// Viewport for a terminal of `columns` x `rows` cells, in units where a
/// cell is one wide and [`CELL_ASPECT`] tall.
pub fn cell_viewport(columns: u16, rows: u16) -> Viewport {
    Viewport::new(columns as u32, rows as u32 * CELL_ASPECT)
}

/// ASCII renderer that converts models to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![BLANK; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(BLANK);
    }

    /// Rasterize every face, then every edge, of every model.
    pub fn render(&mut self, models: &[Model], frame: &Frame) {
        for (model_index, model) in models.iter().enumerate() {
            for face_index in 0..model.faces().len() {
                let highlighted = frame
                    .highlighted
                    .is_some_and(|h| h.id() == (model_index, face_index));
                self.render_face(model, face_index, frame, highlighted);
            }
        }
        for model in models {
            for &[a, b] in model.edges() {
                let vertices = model.vertices();
                if let (Some(p), Some(q)) = (
                    self.to_screen(&vertices[a], frame),
                    self.to_screen(&vertices[b], frame),
                ) {
                    self.draw_line(p, q);
                }
            }
        }
    }

    /// Project into top-down cell coordinates, dropping points outside the
    /// depth range.
    fn to_screen(&self, point: &Point3<f64>, frame: &Frame) -> Option<ScreenPoint> {
        let window = project(point, &frame.modelview, &frame.projection, &frame.viewport)?;
        if !(0.0..=1.0).contains(&window.z) {
            return None;
        }
        let row = (frame.viewport.height as f64 - window.y) / CELL_ASPECT as f64;
        Some((window.x as f32, row as f32, window.z as f32))
    }

    fn render_face(&mut self, model: &Model, face_index: usize, frame: &Frame, highlighted: bool) {
        let Some(normal) = model.face_normal(face_index) else {
            return;
        };
        let eye_normal = frame.modelview.transform_vector(&normal);
        // positive when the normal points back at the viewer
        let facing = eye_normal.dot(&Vector3::z()) as f32;

        // Map brightness to character
        let brightness = facing.abs();
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let ch = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];
        let color = if highlighted {
            Color::Yellow
        } else if facing > 0.0 {
            Color::Green
        } else {
            Color::DarkRed
        };

        for triangle in model.face_triangles(face_index) {
            let mut coords = [(0.0, 0.0, 0.0); 3];
            for (slot, vertex) in coords.iter_mut().zip(&triangle) {
                match self.to_screen(vertex, frame) {
                    Some(p) => *slot = p,
                    None => return, // clipped
                }
            }
            self.rasterize_triangle(&coords, Cell { ch, color });
        }
    }

    /// Cells whose centers lie in the triangle, either winding.
    fn rasterize_triangle(&mut self, &[a, b, c]: &[ScreenPoint; 3], cell: Cell) {
        let doubled_area = edge(a, b, (c.0, c.1));
        if doubled_area.abs() < MIN_DOUBLED_AREA {
            return;
        }
        let Some((columns, rows)) = self.cell_bounds(&[a, b, c]) else {
            return;
        };
        for y in rows {
            for x in columns.clone() {
                let center = (x as f32 + 0.5, y as f32 + 0.5);
                let wa = edge(b, c, center) / doubled_area;
                let wb = edge(c, a, center) / doubled_area;
                let wc = 1.0 - wa - wb;
                if wa >= 0.0 && wb >= 0.0 && wc >= 0.0 {
                    self.plot(x, y, wa * a.2 + wb * b.2 + wc * c.2, cell);
                }
            }
        }
    }

    /// Column and row ranges covering `points`, clipped to the buffer.
    fn cell_bounds(&self, points: &[ScreenPoint]) -> Option<(Range<i32>, Range<i32>)> {
        let (mut lo_x, mut hi_x) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut lo_y, mut hi_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for &(x, y, _) in points {
            lo_x = lo_x.min(x);
            hi_x = hi_x.max(x);
            lo_y = lo_y.min(y);
            hi_y = hi_y.max(y);
        }
        let columns = (lo_x.floor() as i32).max(0)..(hi_x.ceil() as i32).min(self.width as i32);
        let rows = (lo_y.floor() as i32).max(0)..(hi_y.ceil() as i32).min(self.height as i32);
        (!columns.is_empty() && !rows.is_empty()).then_some((columns, rows))
    }

    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint) {
        let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as i32;
        let cell = Cell {
            ch: EDGE_CHAR,
            color: Color::White,
        };
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = from.0 + (to.0 - from.0) * t;
            let y = from.1 + (to.1 - from.1) * t;
            let depth = from.2 + (to.2 - from.2) * t - EDGE_DEPTH_BIAS;
            self.plot(x.floor() as i32, y.floor() as i32, depth, cell);
        }
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, cell: Cell) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.cells[idx] = cell;
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        // no line break after the last row, or the terminal would scroll
        for (y, row) in self.cells.chunks(self.width.max(1)).enumerate() {
            if y > 0 {
                writer.queue(Print("\r\n"))?;
            }
            for cell in row {
                writer.queue(SetForegroundColor(cell.color))?;
                writer.queue(Print(cell.ch))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Twice the signed area of `(from, to, p)`, positive when `p` lies to the
/// left of `from -> to`.
fn edge(from: ScreenPoint, to: ScreenPoint, p: (f32, f32)) -> f32 {
    (to.0 - from.0) * (p.1 - from.1) - (to.1 - from.1) * (p.0 - from.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pickview_core::{Viewer, ViewerConfig};

    fn cube_frame(width: u16, height: u16, click: Option<(f64, f64)>) -> (Viewer, Frame) {
        let mut viewer = Viewer::new(ViewerConfig {
            viewport: cell_viewport(width, height),
            ..ViewerConfig::default()
        });
        viewer.add_model(Model::cube());
        if let Some((x, y)) = click {
            viewer.queue_click(x, y);
        }
        let frame = viewer.begin_frame();
        (viewer, frame)
    }

    fn filled(renderer: &AsciiRenderer) -> usize {
        renderer.cells.iter().filter(|c| **c != BLANK).count()
    }

    #[test]
    fn test_triangle_fill_ignores_winding() {
        let cell = Cell {
            ch: '#',
            color: Color::Green,
        };
        let (a, b, c) = ((1.0, 1.0, 0.5), (9.0, 1.0, 0.5), (1.0, 7.0, 0.5));
        let mut ccw = AsciiRenderer::new(10, 8);
        ccw.rasterize_triangle(&[a, b, c], cell);
        let mut cw = AsciiRenderer::new(10, 8);
        cw.rasterize_triangle(&[a, c, b], cell);
        assert!(filled(&ccw) > 0);
        assert_eq!(ccw.cells, cw.cells);

        let mut sliver = AsciiRenderer::new(10, 8);
        sliver.rasterize_triangle(&[(0.0, 0.0, 0.5), (4.0, 4.0, 0.5), (8.0, 8.0, 0.5)], cell);
        assert_eq!(filled(&sliver), 0);
    }

    #[test]
    fn test_cells_keep_cube_square() {
        let (viewer, frame) = cube_frame(80, 40, None);
        let mut renderer = AsciiRenderer::new(80, 40);
        renderer.render(viewer.models(), &frame);

        let rows = (0..40)
            .filter(|y| (0..80).any(|x| renderer.cells[y * 80 + x] != BLANK))
            .count();
        let columns = (0..80)
            .filter(|x| (0..40).any(|y| renderer.cells[y * 80 + x] != BLANK))
            .count();
        // a facing square spans twice as many columns as rows
        assert!((columns as f64 / rows as f64 - 2.0).abs() < 0.5, "{columns}x{rows}");
    }

    #[test]
    fn test_cube_fills_center_only() {
        let (viewer, frame) = cube_frame(80, 40, None);
        let mut renderer = AsciiRenderer::new(80, 40);
        renderer.render(viewer.models(), &frame);

        // the z = +1 face winds counter-clockwise towards the viewer
        assert_eq!(renderer.cells[20 * 80 + 40].color, Color::Green);
        assert_eq!(renderer.cells[0], BLANK);
        assert_eq!(renderer.cells[39 * 80 + 79], BLANK);

        renderer.clear();
        assert!(renderer.cells.iter().all(|c| *c == BLANK));
    }

    #[test]
    fn test_picked_face_is_yellow() {
        let (viewer, frame) = cube_frame(80, 40, Some((41.5, 39.0)));
        assert!(frame.highlighted.is_some());
        let mut renderer = AsciiRenderer::new(80, 40);
        renderer.render(viewer.models(), &frame);
        assert!(renderer.cells.iter().any(|c| c.color == Color::Yellow));
    }

    #[test]
    fn test_draw_emits_every_row() {
        let renderer = AsciiRenderer::new(4, 3);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches("\r\n").count(), 2);
    }
}
