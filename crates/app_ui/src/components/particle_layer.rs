//! Painting the ambient particle field behind the UI

use crate::Theme;
use app_core::Particle;
use egui::{Context, LayerId, Pos2};

pub struct ParticleLayer;

impl ParticleLayer {
    /// Paint `particles` on the background layer, offset by `origin`
    pub fn paint(ctx: &Context, particles: &[Particle], origin: Pos2, theme: &Theme) {
        let painter = ctx.layer_painter(LayerId::background());
        for p in particles {
            painter.circle_filled(
                Pos2::new(origin.x + p.x, origin.y + p.y),
                p.size / 2.0,
                theme.particle.gamma_multiply(p.opacity),
            );
        }
    }
}
