//! VMT material document generation
//!
//! Plain string templating; nothing here computes anything. Two variants:
//! the full phong material, and the "normalized" variant emitted when the
//! exponent map's green channel was cleared.

use crate::config::Config;

/// The full VertexLitGeneric phong material
pub fn full_material(name: &str, config: &Config) -> String {
    let mut lines = vec![
        format!(
            "// Generated by {} v{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ),
        format!(
            "// METALNESS: {} GAMMA: {}",
            config.metalness, config.gamma_midtone
        ),
        "\"VertexLitGeneric\"".to_string(),
        "{".to_string(),
        format!("\t\"$basetexture\" \"{}\"", texture_path(config, name, "_c")),
        format!("\t\"$bumpmap\" \"{}\"", texture_path(config, name, "_n")),
        format!(
            "\t\"$phongexponenttexture\" \"{}\"",
            texture_path(config, name, "_m")
        ),
        "\t\"$color2\" \"[ .1 .1 .1 ]\"".to_string(),
        "\t\"$blendtintbybasealpha\" \"1\"".to_string(),
        "\t\"$phong\" \"1\"".to_string(),
        "\t\"$phongboost\" \"10\"".to_string(),
        "\t\"$phongalbedotint\" \"1\"".to_string(),
    ];
    if config.phong_warps {
        lines.push(format!(
            "\t\"$phongwarptexture\" \"{}\"",
            texture_path(config, "phongwarp_steel", "")
        ));
    } else {
        lines.push("\t\"$PhongFresnelRanges\" \"[ 4 3 10 ]\"".to_string());
    }
    lines.push("\t\"$envmap\" \"env_cubemap\"".to_string());
    lines.push("\t\"$basemapalphaenvmapmask\" \"1\"".to_string());
    lines.push("\t\"$envmapfresnel\" \"0.4\"".to_string());
    lines.push("\t\"$envmaptint\" \"[ .1 .1 .1 ]\"".to_string());
    if config.material_proxies {
        lines.extend(proxy_block());
    }
    lines.push("}".to_string());
    lines.join("\n") + "\n"
}

/// The normalized material, paired with a cleared exponent map
pub fn normalized_material(name: &str, config: &Config) -> String {
    let mut lines = vec![
        format!(
            "// Generated by {} v{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ),
        "// NORMALIZED MATERIAL".to_string(),
        "\"VertexLitGeneric\"".to_string(),
        "{".to_string(),
        format!("\t\"$basetexture\" \"{}\"", texture_path(config, name, "_c")),
        format!("\t\"$bumpmap\" \"{}\"", texture_path(config, name, "_n")),
        format!(
            "\t\"$phongexponenttexture\" \"{}\"",
            texture_path(config, name, "_m")
        ),
        "\t\"$phong\" \"1\"".to_string(),
        "\t\"$phongboost\" \"1\"".to_string(),
        "\t\"$color2\" \"[ 0 0 0 ]\"".to_string(),
        "\t\"$phongexponent\" \"24\"".to_string(),
        "\t\"$phongalbedotint\" \"1\"".to_string(),
        "\t\"$additive\" \"1\"".to_string(),
        "\t\"$PhongFresnelRanges\" \"[ 2 4 6 ]\"".to_string(),
    ];
    if config.material_proxies {
        lines.extend(proxy_block());
    }
    lines.push("}".to_string());
    lines.join("\n") + "\n"
}

/// Engine-relative texture path written into the document
fn texture_path(config: &Config, name: &str, suffix: &str) -> String {
    let dir = config.output_dir.to_string_lossy();
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        format!("{name}{suffix}")
    } else {
        format!("{dir}/{name}{suffix}")
    }
}

fn proxy_block() -> Vec<String> {
    [
        "\t\"Proxies\"",
        "\t{",
        "\t\t\"MwEnvMapTint\"",
        "\t\t{",
        "\t\t\t\"min\" \"0\"",
        "\t\t\t\"max\" \"0.015\"",
        "\t\t}",
        "\t}",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
