//! Mesh fixtures written on the fly for integration tests

use std::path::Path;

/// Unit quad in the XY plane facing +Z, UVs covering the unit square
const QUAD_POSITIONS: [[f32; 3]; 4] = [
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
    [0.5, 0.5, 0.0],
    [-0.5, 0.5, 0.0],
];
const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Quad as a single OBJ polygon
pub fn generate_quad_obj(path: &Path) -> std::io::Result<()> {
    let mut obj = String::from("# unit quad\n");
    for [x, y, z] in QUAD_POSITIONS {
        obj.push_str(&format!("v {x} {y} {z}\n"));
    }
    for [u, v] in QUAD_UVS {
        obj.push_str(&format!("vt {u} {v}\n"));
    }
    obj.push_str("vn 0 0 1\n");
    obj.push_str("f 1/1/1 2/2/1 3/3/1 4/4/1\n");
    std::fs::write(path, obj)
}

/// Triangle without texture coordinates
pub fn generate_no_uv_obj(path: &Path) -> std::io::Result<()> {
    std::fs::write(
        path,
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n",
    )
}

/// Quad as an indexed glTF primitive with an external .bin buffer
pub fn generate_quad_gltf(path: &Path) -> std::io::Result<()> {
    let bin_name = format!(
        "{}.bin",
        path.file_stem().and_then(|s| s.to_str()).unwrap_or("quad")
    );

    let mut bin: Vec<u8> = Vec::new();
    for p in QUAD_POSITIONS {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    for _ in 0..4 {
        for c in [0.0f32, 0.0, 1.0] {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    for uv in QUAD_UVS {
        for c in uv {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in QUAD_INDICES {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    assert_eq!(bin.len(), 152);

    let json = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "buffers": [{{ "uri": "{bin_name}", "byteLength": 152 }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 48, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 48, "byteLength": 48, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 96, "byteLength": 32, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 128, "byteLength": 24, "target": 34963 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
       "min": [-0.5, -0.5, 0.0], "max": [0.5, 0.5, 0.0] }},
    {{ "bufferView": 1, "componentType": 5126, "count": 4, "type": "VEC3" }},
    {{ "bufferView": 2, "componentType": 5126, "count": 4, "type": "VEC2" }},
    {{ "bufferView": 3, "componentType": 5125, "count": 6, "type": "SCALAR" }}
  ],
  "meshes": [{{
    "name": "quad",
    "primitives": [{{
      "attributes": {{ "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2 }},
      "indices": 3
    }}]
  }}],
  "nodes": [{{ "mesh": 0 }}],
  "scenes": [{{ "nodes": [0] }}],
  "scene": 0
}}
"#
    );

    std::fs::write(path.with_file_name(bin_name), bin)?;
    std::fs::write(path, json)
}
