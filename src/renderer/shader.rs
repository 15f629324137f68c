// renderer/shader.rs
//
// WGSL shader modules with compile diagnostics and hot reload. A failed
// (re)compile is logged and reported as an error; on reload the previous
// module stays in use.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::io;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryPoint {
    pub stage: ShaderStage,
    pub name: String,
}

#[derive(Debug)]
pub struct Shader {
    label: String,
    module: wgpu::ShaderModule,
    source_path: Option<PathBuf>,
    entry_points: Vec<EntryPoint>,
}

impl Shader {
    pub fn from_wgsl(device: &wgpu::Device, label: &str, source: &str) -> Result<Self, String> {
        let module = compile(device, label, source)?;
        Ok(Self {
            label: label.to_string(),
            module,
            source_path: None,
            entry_points: scan_entry_points(source),
        })
    }

    pub fn from_path(device: &wgpu::Device, path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let source = read_source(path)?;
        let label = path.display().to_string();
        let module = compile(device, &label, &source)?;

        log::info!("Compiled shader {:?}", path);

        Ok(Self {
            label,
            module,
            source_path: Some(path.to_path_buf()),
            entry_points: scan_entry_points(&source),
        })
    }

    /// Recompiles from the file this shader was loaded from. On failure the
    /// current module is kept and the diagnostic is returned.
    pub fn reload(&mut self, device: &wgpu::Device) -> Result<(), String> {
        let Some(path) = self.source_path.clone() else {
            return Err(format!("Shader {} was not loaded from a file", self.label));
        };

        let source = read_source(&path).inspect_err(|err| log::error!("{}", err))?;
        match compile(device, &self.label, &source) {
            Ok(module) => {
                self.module = module;
                self.entry_points = scan_entry_points(&source);
                log::info!("Reloaded shader {:?}", path);
                Ok(())
            }
            Err(err) => {
                log::warn!("Keeping previous version of {}", self.label);
                Err(err)
            }
        }
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    pub fn require_entry(&self, stage: ShaderStage, name: &str) -> Result<(), String> {
        if self
            .entry_points
            .iter()
            .any(|entry| entry.stage == stage && entry.name == name)
        {
            Ok(())
        } else {
            Err(format!(
                "Shader {} has no {} entry point named '{}'",
                self.label, stage, name
            ))
        }
    }
}

fn read_source(path: &Path) -> Result<String, String> {
    io::load_text(path).map_err(|err| format!("Couldn't read shader source: {}", err))
}

fn compile(device: &wgpu::Device, label: &str, source: &str) -> Result<wgpu::ShaderModule, String> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
    });
    let info = pollster::block_on(module.get_compilation_info());
    let scope_error = pollster::block_on(device.pop_error_scope());

    let mut diagnostics = Vec::new();
    for message in &info.messages {
        let location = message
            .location
            .as_ref()
            .map(|loc| (loc.line_number, loc.line_position));
        let text = format_diagnostic(label, source, location, &message.message);
        match message.message_type {
            wgpu::CompilationMessageType::Error => diagnostics.push(text),
            wgpu::CompilationMessageType::Warning => log::warn!("{}", text),
            wgpu::CompilationMessageType::Info => log::debug!("{}", text),
        }
    }

    if diagnostics.is_empty() {
        if let Some(err) = scope_error {
            diagnostics.push(format!("{}: {}", label, err));
        }
    }

    if diagnostics.is_empty() {
        Ok(module)
    } else {
        let report = format!("Couldn't compile shader {}\n{}", label, diagnostics.join("\n"));
        log::error!("{}", report);
        Err(report)
    }
}

/// `label:line:col: message`, followed by the offending source line and a caret.
pub fn format_diagnostic(
    label: &str,
    source: &str,
    location: Option<(u32, u32)>,
    message: &str,
) -> String {
    let Some((line, column)) = location else {
        return format!("{}: {}", label, message);
    };

    let mut text = format!("{}:{}:{}: {}", label, line, column, message);
    if let Some(code) = source.lines().nth(line.saturating_sub(1) as usize) {
        let caret_indent = " ".repeat(column.saturating_sub(1) as usize);
        text.push_str(&format!("\n    {}\n    {}^", code, caret_indent));
    }
    text
}

/// Lists `@vertex`, `@fragment` and `@compute` functions declared in WGSL source.
pub fn scan_entry_points(source: &str) -> Vec<EntryPoint> {
    let mut entries = Vec::new();
    let mut pending: Option<ShaderStage> = None;

    for line in source.lines() {
        let code = line.split("//").next().unwrap_or("");
        let mut tokens = code
            .split(|c: char| c.is_whitespace() || c == '(')
            .filter(|t| !t.is_empty())
            .peekable();

        while let Some(token) = tokens.next() {
            match token {
                "@vertex" => pending = Some(ShaderStage::Vertex),
                "@fragment" => pending = Some(ShaderStage::Fragment),
                "@compute" => pending = Some(ShaderStage::Compute),
                "fn" => {
                    if let (Some(stage), Some(name)) = (pending.take(), tokens.peek()) {
                        entries.push(EntryPoint {
                            stage,
                            name: name.to_string(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    entries
}
