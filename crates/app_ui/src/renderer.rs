//! GPU rendering with wgpu

use egui_wgpu::ScreenDescriptor;
use std::sync::Arc;
use wgpu::*;
use winit::window::Window;

/// Main renderer managing GPU resources
pub struct Renderer {
    pub surface: Surface<'static>,
    pub device: Device,
    pub queue: Queue,
    pub config: SurfaceConfiguration,
    pub size: (u32, u32),
    egui: egui_wgpu::Renderer,
}

impl Renderer {
    /// Create a new renderer for a window
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = Instance::new(InstanceDescriptor {
            backends: Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No suitable GPU adapter found"))?;

        tracing::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("ImageGallery Device"),
                    required_features: Features::empty(),
                    required_limits: Limits::default(),
                    memory_hints: MemoryHints::Performance,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Surface reports no formats"))?;

        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        let egui = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size: (size.width, size.height),
            egui,
        })
    }

    /// Handle window resize
    pub fn resize(&mut self, new_size: (u32, u32)) {
        if new_size.0 > 0 && new_size.1 > 0 {
            self.size = new_size;
            self.config.width = new_size.0;
            self.config.height = new_size.1;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Paint one egui frame onto the window surface
    pub fn render_egui(
        &mut self,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        pixels_per_point: f32,
        clear: egui::Color32,
    ) {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                tracing::debug!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output.texture.create_view(&TextureViewDescriptor::default());
        let frame = EguiFrame {
            primitives,
            textures_delta,
            size_in_pixels: [self.size.0, self.size.1],
            pixels_per_point,
            clear,
        };
        let commands = encode_egui(&mut self.egui, &self.device, &self.queue, &view, &frame);

        self.queue.submit(std::iter::once(commands));
        output.present();
    }
}

/// Everything egui produced for one frame
struct EguiFrame<'a> {
    primitives: &'a [egui::ClippedPrimitive],
    textures_delta: &'a egui::TexturesDelta,
    size_in_pixels: [u32; 2],
    pixels_per_point: f32,
    clear: egui::Color32,
}

/// Record the egui draw into a command buffer targeting `view`
fn encode_egui(
    egui: &mut egui_wgpu::Renderer,
    device: &Device,
    queue: &Queue,
    view: &TextureView,
    frame: &EguiFrame<'_>,
) -> CommandBuffer {
    let screen_descriptor = ScreenDescriptor {
        size_in_pixels: frame.size_in_pixels,
        pixels_per_point: frame.pixels_per_point,
    };

    let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
        label: Some("egui encoder"),
    });

    for (id, delta) in &frame.textures_delta.set {
        egui.update_texture(device, queue, *id, delta);
    }

    egui.update_buffers(device, queue, &mut encoder, frame.primitives, &screen_descriptor);

    {
        let clear = egui::Rgba::from(frame.clear);
        let mut render_pass = encoder
            .begin_render_pass(&RenderPassDescriptor {
                label: Some("egui render pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color {
                            r: clear.r() as f64,
                            g: clear.g() as f64,
                            b: clear.b() as f64,
                            a: clear.a() as f64,
                        }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            // egui-wgpu 0.29 takes a 'static pass
            .forget_lifetime();

        egui.render(&mut render_pass, frame.primitives, &screen_descriptor);
    }

    for id in &frame.textures_delta.free {
        egui.free_texture(id);
    }

    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Headless device, or `None` on machines without any adapter
    fn headless() -> Option<(Device, Queue)> {
        let instance = Instance::new(InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            power_preference: PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))?;
        pollster::block_on(adapter.request_device(&DeviceDescriptor::default(), None)).ok()
    }

    #[test]
    fn test_encode_egui_offscreen() {
        let Some((device, queue)) = headless() else {
            eprintln!("no GPU adapter, skipping");
            return;
        };

        let format = TextureFormat::Rgba8UnormSrgb;
        let target = device.create_texture(&TextureDescriptor {
            label: Some("offscreen"),
            size: Extent3d { width: 64, height: 48, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format,
            usage: TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&TextureViewDescriptor::default());

        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.label("gallery");
            });
        });
        let primitives = ctx.tessellate(output.shapes, output.pixels_per_point);

        let mut egui = egui_wgpu::Renderer::new(&device, format, None, 1, false);
        let frame = EguiFrame {
            primitives: &primitives,
            textures_delta: &output.textures_delta,
            size_in_pixels: [64, 48],
            pixels_per_point: output.pixels_per_point,
            clear: egui::Color32::BLACK,
        };

        // Two frames through the same renderer, as the event loop does
        for _ in 0..2 {
            let commands = encode_egui(&mut egui, &device, &queue, &view, &frame);
            queue.submit(std::iter::once(commands));
        }
        device.poll(Maintain::Wait);
    }
}
