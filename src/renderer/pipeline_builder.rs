// renderer/pipeline_builder.rs
//
// Fluent construction of the render pipelines every lesson needs: one WGSL
// module, a handful of vertex buffers and at most one depth-stencil target.

/// Depth test settings plus the stencil test that rides on the same attachment.
#[derive(Clone, Debug)]
struct DepthTest {
    format: wgpu::TextureFormat,
    write: bool,
    compare: wgpu::CompareFunction,
    stencil: wgpu::StencilState,
}

impl DepthTest {
    fn state(&self) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: self.format,
            depth_write_enabled: self.write,
            depth_compare: self.compare,
            stencil: self.stencil.clone(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

/// Starts from `vs_main`/`fs_main`, a triangle list with counter-clockwise
/// front faces, back faces culled and no depth test.
pub struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    label: Option<&'a str>,
    layout: &'a wgpu::PipelineLayout,
    module: &'a wgpu::ShaderModule,
    vertex_entry: &'a str,
    fragment_entry: &'a str,
    buffers: Vec<wgpu::VertexBufferLayout<'a>>,
    targets: Vec<Option<wgpu::ColorTargetState>>,
    depth: Option<DepthTest>,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    front_face: wgpu::FrontFace,
    samples: u32,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        layout: &'a wgpu::PipelineLayout,
        module: &'a wgpu::ShaderModule,
    ) -> Self {
        Self {
            device,
            label: None,
            layout,
            module,
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
            buffers: Vec::new(),
            targets: Vec::new(),
            depth: None,
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            front_face: wgpu::FrontFace::Ccw,
            samples: 1,
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_vertex_entry(mut self, entry: &'a str) -> Self {
        self.vertex_entry = entry;
        self
    }

    pub fn with_fragment_entry(mut self, entry: &'a str) -> Self {
        self.fragment_entry = entry;
        self
    }

    /// Buffers are bound in call order: the first is slot 0.
    pub fn with_vertex_buffer(mut self, layout: wgpu::VertexBufferLayout<'a>) -> Self {
        self.buffers.push(layout);
        self
    }

    pub fn with_color_target(
        mut self,
        format: wgpu::TextureFormat,
        blend: Option<wgpu::BlendState>,
    ) -> Self {
        self.targets.push(Some(wgpu::ColorTargetState {
            format,
            blend,
            write_mask: wgpu::ColorWrites::ALL,
        }));
        self
    }

    pub fn with_depth_stencil(
        mut self,
        format: wgpu::TextureFormat,
        depth_write: bool,
        depth_compare: wgpu::CompareFunction,
    ) -> Self {
        self.depth = Some(DepthTest {
            format,
            write: depth_write,
            compare: depth_compare,
            stencil: wgpu::StencilState::default(),
        });
        self
    }

    /// Needs a prior `with_depth_stencil`; the stencil lives in that attachment.
    pub fn with_stencil(mut self, stencil: wgpu::StencilState) -> Self {
        match self.depth.as_mut() {
            Some(depth) => depth.stencil = stencil,
            None => log::warn!(
                "Pipeline {:?} has no depth-stencil target, stencil state dropped",
                self.label
            ),
        }
        self
    }

    pub fn with_multisample(mut self, sample_count: u32) -> Self {
        self.samples = sample_count;
        self
    }

    pub fn with_cull_mode(mut self, cull_mode: Option<wgpu::Face>) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    pub fn with_no_culling(self) -> Self {
        self.with_cull_mode(None)
    }

    pub fn with_front_face(mut self, front_face: wgpu::FrontFace) -> Self {
        self.front_face = front_face;
        self
    }

    pub fn with_topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn build(self) -> wgpu::RenderPipeline {
        let primitive = wgpu::PrimitiveState {
            topology: self.topology,
            cull_mode: self.cull_mode,
            front_face: self.front_face,
            ..Default::default()
        };

        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: self.label,
            layout: Some(self.layout),
            vertex: wgpu::VertexState {
                module: self.module,
                entry_point: Some(self.vertex_entry),
                buffers: &self.buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: self.module,
                entry_point: Some(self.fragment_entry),
                targets: &self.targets,
                compilation_options: Default::default(),
            }),
            primitive,
            depth_stencil: self.depth.as_ref().map(DepthTest::state),
            multisample: wgpu::MultisampleState {
                count: self.samples,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        })
    }

    /// `build` inside a validation error scope, so a pipeline that does not
    /// match its shader is reported here rather than by the device.
    pub fn try_build(self) -> Result<wgpu::RenderPipeline, String> {
        let device = self.device;
        let label = self.label.unwrap_or("unnamed pipeline").to_string();

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self.build();
        match pollster::block_on(device.pop_error_scope()) {
            None => Ok(pipeline),
            Some(err) => {
                let message = format!("Failed to build {}: {}", label, err);
                log::error!("{}", message);
                Err(message)
            }
        }
    }
}

/// Pipeline layout whose bind group `i` is `bind_group_layouts[i]`.
pub fn pipeline_layout(
    device: &wgpu::Device,
    label: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    })
}
