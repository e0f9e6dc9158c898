use ggez::{
    graphics::{self, Color, DrawMode, DrawParam, Mesh, MeshBuilder, Rect},
    Context, GameResult,
};
use glam::Vec2;

/// Axis-aligned box centered on `pos`.
pub fn centered(pos: Vec2, size: Vec2) -> Rect {
    Rect::new(pos.x - size.x * 0.5, pos.y - size.y * 0.5, size.x, size.y)
}

/// A flat colored box. Entities keep their own position; the sprite
/// only knows its footprint and color.
pub struct Sprite {
    pub size: Vec2,
    pub color: Color,
}

impl Sprite {
    pub fn new(size: Vec2, color: Color) -> Self {
        Sprite { size, color }
    }

    pub fn rect(&self, pos: Vec2) -> Rect {
        centered(pos, self.size)
    }

    pub fn draw(
        &self,
        ctx: &mut Context,
        canvas: &mut graphics::Canvas,
        pos: Vec2,
    ) -> GameResult<()> {
        let mut mb = MeshBuilder::new();
        let mesh = mb
            .rectangle(DrawMode::fill(), self.rect(pos), self.color)?
            .build();
        let mesh = Mesh::from_data(ctx, mesh);
        canvas.draw(&mesh, DrawParam::default());

        Ok(())
    }
}

#[cfg(test)]
mod sprite_test {
    use super::*;

    #[test]
    fn rects_center_on_the_position() {
        let rect = centered(Vec2::new(100.0, 50.0), Vec2::new(40.0, 20.0));
        assert_eq!((rect.x, rect.y, rect.w, rect.h), (80.0, 40.0, 40.0, 20.0));
    }

    #[test]
    fn overlap_matches_box_intersection() {
        let a = centered(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = centered(Vec2::new(9.0, 0.0), Vec2::new(10.0, 10.0));
        let c = centered(Vec2::new(20.0, 0.0), Vec2::new(10.0, 10.0));

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
