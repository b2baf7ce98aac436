//! Ambient particle field
//!
//! [`ParticleField`] is the pure simulation. [`ParticleAnimation`] drives it
//! from one tokio task that owns both the tick timer and the viewport
//! subscription; dropping the animation aborts that task.

use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const SIZE_RANGE: std::ops::Range<f32> = 1.0..4.0;
const VELOCITY_RANGE: std::ops::Range<f32> = -0.25..0.25;
const OPACITY_RANGE: std::ops::Range<f32> = 0.1..0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub vx: f32,
    pub vy: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(count: usize, width: f32, height: f32, rng: &mut R) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);

        let particles = (0..count)
            .map(|id| Particle {
                id,
                x: random_coord(rng, width),
                y: random_coord(rng, height),
                size: rng.gen_range(SIZE_RANGE),
                vx: rng.gen_range(VELOCITY_RANGE),
                vy: rng.gen_range(VELOCITY_RANGE),
                opacity: rng.gen_range(OPACITY_RANGE),
            })
            .collect();

        Self { particles, width, height }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Advance every particle by its velocity, wrapping at the edges
    pub fn step(&mut self) {
        let (w, h) = (self.width, self.height);
        for p in &mut self.particles {
            p.x = wrap(p.x + p.vx, w);
            p.y = wrap(p.y + p.vy, h);
        }
    }

    /// Clamp positions into the new bounds
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        for p in &mut self.particles {
            p.x = p.x.clamp(0.0, self.width);
            p.y = p.y.clamp(0.0, self.height);
        }
    }
}

fn random_coord<R: Rng + ?Sized>(rng: &mut R, extent: f32) -> f32 {
    if extent > 0.0 {
        rng.gen_range(0.0..extent)
    } else {
        0.0
    }
}

fn wrap(v: f32, extent: f32) -> f32 {
    if v > extent {
        0.0
    } else if v < 0.0 {
        extent
    } else {
        v
    }
}

/// Running animation; the background task stops when this is dropped
pub struct ParticleAnimation {
    field: Arc<Mutex<ParticleField>>,
    viewport: watch::Sender<(f32, f32)>,
    task: JoinHandle<()>,
}

impl ParticleAnimation {
    /// Spawn the tick task on `handle`
    pub fn start(handle: &tokio::runtime::Handle, field: ParticleField, tick: Duration) -> Self {
        let field = Arc::new(Mutex::new(field));
        let (viewport, mut viewport_rx) = watch::channel(field.lock().size());

        let shared = field.clone();
        let task = handle.spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        shared.lock().step();
                    }
                    changed = viewport_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let (w, h) = *viewport_rx.borrow_and_update();
                        shared.lock().resize(w, h);
                    }
                }
            }
            tracing::debug!("Particle task finished");
        });

        tracing::debug!(?tick, "Particle animation started");
        Self { field, viewport, task }
    }

    /// Report a new viewport size to the task
    pub fn resize(&self, width: f32, height: f32) {
        self.viewport.send_replace((width, height));
    }

    /// Copy of the current particles for painting
    pub fn snapshot(&self) -> Vec<Particle> {
        self.field.lock().particles().to_vec()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    #[cfg(test)]
    fn shared_field(&self) -> std::sync::Weak<Mutex<ParticleField>> {
        Arc::downgrade(&self.field)
    }
}

impl Drop for ParticleAnimation {
    fn drop(&mut self) {
        self.task.abort();
    }
}
