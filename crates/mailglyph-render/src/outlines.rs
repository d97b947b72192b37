// this_file: crates/mailglyph-render/src/outlines.rs

//! Glyph outline recording and placement.

use kurbo::{Affine, BezPath, Point};
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use ttf_parser::{GlyphId, OutlineBuilder};

/// Recorded outline commands for a glyph, in font units (y up).
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineCommand {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    QuadTo {
        ctrl_x: f32,
        ctrl_y: f32,
        x: f32,
        y: f32,
    },
    CurveTo {
        ctrl1_x: f32,
        ctrl1_y: f32,
        ctrl2_x: f32,
        ctrl2_y: f32,
        x: f32,
        y: f32,
    },
    Close,
}

/// Geometry container for a recorded glyph outline.
#[derive(Debug, Clone, Default)]
pub struct GlyphOutline {
    commands: Vec<OutlineCommand>,
}

impl GlyphOutline {
    pub fn commands(&self) -> &[OutlineCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Scale into pixels with y pointing down, origin on the baseline at `pen`.
    pub fn place(&self, scale: f64, pen: Point) -> BezPath {
        let mut path = BezPath::new();
        if self.commands.is_empty() || scale <= 0.0 {
            return path;
        }

        let to_px = |x: f32, y: f32| Point::new(f64::from(x) * scale, -f64::from(y) * scale);
        for command in &self.commands {
            match *command {
                OutlineCommand::MoveTo(x, y) => path.move_to(to_px(x, y)),
                OutlineCommand::LineTo(x, y) => path.line_to(to_px(x, y)),
                OutlineCommand::QuadTo {
                    ctrl_x,
                    ctrl_y,
                    x,
                    y,
                } => path.quad_to(to_px(ctrl_x, ctrl_y), to_px(x, y)),
                OutlineCommand::CurveTo {
                    ctrl1_x,
                    ctrl1_y,
                    ctrl2_x,
                    ctrl2_y,
                    x,
                    y,
                } => path.curve_to(to_px(ctrl1_x, ctrl1_y), to_px(ctrl2_x, ctrl2_y), to_px(x, y)),
                OutlineCommand::Close => path.close_path(),
            }
        }

        path.apply_affine(Affine::translate(pen.to_vec2()));
        path
    }
}

/// Record the outline for `glyph_id`, or `None` for blank glyphs such as space.
pub fn glyph_outline(face: &OwnedFace, glyph_id: GlyphId) -> Option<GlyphOutline> {
    let mut recorder = RecordingOutline::default();
    face.as_face_ref().outline_glyph(glyph_id, &mut recorder)?;
    let outline = recorder.finish();
    (!outline.is_empty()).then_some(outline)
}

#[derive(Default)]
struct RecordingOutline {
    commands: Vec<OutlineCommand>,
}

impl RecordingOutline {
    fn finish(self) -> GlyphOutline {
        GlyphOutline {
            commands: self.commands,
        }
    }
}

impl OutlineBuilder for RecordingOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(OutlineCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(OutlineCommand::LineTo(x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.commands.push(OutlineCommand::QuadTo {
            ctrl_x: x1,
            ctrl_y: y1,
            x,
            y,
        });
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.commands.push(OutlineCommand::CurveTo {
            ctrl1_x: x1,
            ctrl1_y: y1,
            ctrl2_x: x2,
            ctrl2_y: y2,
            x,
            y,
        });
    }

    fn close(&mut self) {
        self.commands.push(OutlineCommand::Close);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use kurbo::Shape;
    use std::fs;
    use std::path::PathBuf;

    pub(crate) fn dejavu_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/fonts/DejaVuSans.ttf")
    }

    fn dejavu_face() -> OwnedFace {
        let data = fs::read(dejavu_path()).expect("Test font readable");
        OwnedFace::from_vec(data, 0).expect("Test font parsed")
    }

    #[test]
    fn captures_outline_for_known_glyph() {
        let face = dejavu_face();
        let glyph_id = face.as_face_ref().glyph_index('A').expect("glyph 'A'");
        let outline = glyph_outline(&face, glyph_id).expect("outline recorded");
        assert!(outline.commands().len() > 4);
    }

    #[test]
    fn records_quadratic_segments() {
        let face = dejavu_face();
        let glyph_id = face.as_face_ref().glyph_index('g').expect("glyph 'g'");
        let outline = glyph_outline(&face, glyph_id).expect("outline recorded");
        assert!(outline
            .commands()
            .iter()
            .any(|cmd| matches!(cmd, OutlineCommand::QuadTo { .. })));
    }

    #[test]
    fn space_has_no_outline() {
        let face = dejavu_face();
        let glyph_id = face.as_face_ref().glyph_index(' ').expect("glyph ' '");
        assert!(glyph_outline(&face, glyph_id).is_none());
    }

    #[test]
    fn placed_outline_sits_above_baseline() {
        let face = dejavu_face();
        let glyph_id = face.as_face_ref().glyph_index('H').unwrap();
        let outline = glyph_outline(&face, glyph_id).unwrap();
        let baseline = 40.0;
        let path = outline.place(32.0 / 2048.0, Point::new(10.0, baseline));
        let bounds = path.bounding_box();
        assert!(bounds.width() > 0.0 && bounds.height() > 0.0);
        assert!(bounds.x0 >= 10.0);
        assert!(bounds.y1 <= baseline + 0.01);
        assert!(bounds.y0 < baseline);
    }
}
