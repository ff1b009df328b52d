//! Line-oriented report format, four spaces of indent per level.
use crate::enumerate::fixed_bytes;
use crate::ApiVersion;
use ash::vk;
use std::io::{self, Write};

const INDENT: &[u8] = b"    ";

fn indent<W: Write>(out: &mut W, level: usize) -> io::Result<()> {
    for _ in 0..level {
        out.write_all(INDENT)?;
    }
    Ok(())
}

/// `vk_instance_version: V.V.V.V`
pub fn write_version<W: Write>(out: &mut W, version: ApiVersion) -> io::Result<()> {
    writeln!(out, "vk_instance_version: {version}")
}

/// `vk_instance_layer_properties[N]:`
pub fn write_layer_header<W: Write>(out: &mut W, count: usize) -> io::Result<()> {
    writeln!(out, "vk_instance_layer_properties[{count}]:")
}

/// The layer name at level 1 and its metadata at level 2.
pub fn write_layer<W: Write>(out: &mut W, layer: &vk::LayerProperties) -> io::Result<()> {
    indent(out, 1)?;
    out.write_all(fixed_bytes(&layer.layer_name))?;
    out.write_all(b":\n")?;

    indent(out, 2)?;
    writeln!(out, "Spec version: {}", ApiVersion::from_raw(layer.spec_version))?;

    indent(out, 2)?;
    writeln!(out, "Implementation version: {}", layer.implementation_version)?;

    indent(out, 2)?;
    out.write_all(b"Description: ")?;
    out.write_all(fixed_bytes(&layer.description))?;
    out.write_all(b"\n")
}

/// `vk_instance_extension_properties[N]:` at `level`, then one
/// `name vVERSION` line per extension one level deeper.
pub fn write_extensions<W: Write>(
    out: &mut W,
    level: usize,
    extensions: &[vk::ExtensionProperties],
) -> io::Result<()> {
    indent(out, level)?;
    writeln!(out, "vk_instance_extension_properties[{}]:", extensions.len())?;

    for extension in extensions {
        indent(out, level + 1)?;
        out.write_all(fixed_bytes(&extension.extension_name))?;
        writeln!(out, " v{}", extension.spec_version)?;
    }

    Ok(())
}
