use egui_wgpu::ScreenDescriptor;

/// Owns the GPU-side resources that paint the egui overlay into the surface.
pub struct Renderer {
    egui: egui_wgpu::Renderer,
}

impl Renderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        Self {
            egui: egui_wgpu::Renderer::new(device, surface_format, None, 1, false),
        }
    }

    /// Encode a render pass that clears the frame and paints the tessellated
    /// primitives of one egui frame.
    ///
    /// Texture deltas must come from the same frame as the primitives; freed
    /// textures are released only after the pass referencing them is encoded.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen: &ScreenDescriptor,
    ) {
        for (id, delta) in &textures_delta.set {
            self.egui.update_texture(device, queue, *id, delta);
        }
        let _ = self
            .egui
            .update_buffers(device, queue, encoder, primitives, screen);

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("UI Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: 0.03,
                                g: 0.03,
                                b: 0.05,
                                a: 1.0,
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            self.egui.render(&mut pass, primitives, screen);
        }

        for id in &textures_delta.free {
            self.egui.free_texture(id);
        }
    }
}
